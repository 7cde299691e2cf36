use crate::domain::models::booking::BookingStatus;
use crate::domain::models::driver::DriverStatus;
use crate::domain::models::rating::RatingType;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub email: String,
    pub phone: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub scheduled_time: DateTime<Utc>,
    pub trip_type: String,
    pub vehicle_type: String,
    /// Cents, priced upstream at checkout.
    pub total_cost: i64,
}

#[derive(Deserialize)]
pub struct AdvanceStatusRequest {
    pub status: BookingStatus,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelBookingRequest {
    pub reason: String,
}

#[derive(Deserialize)]
pub struct DisputeRequest {
    pub note: String,
}

#[derive(Deserialize)]
pub struct RateBookingRequest {
    pub rating_type: RatingType,
    pub stars: i64,
    pub reasons: Option<Vec<String>>,
    pub comment: Option<String>,
    pub tip: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateDriverRequest {
    pub user_id: Option<String>,
    pub name: String,
    pub vehicle_plate: String,
    pub vehicle_type: String,
}

#[derive(Deserialize)]
pub struct UpdateDriverStatusRequest {
    pub status: DriverStatus,
}

#[derive(Deserialize)]
pub struct UpdateLocationRequest {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
pub struct ListBookingsQuery {
    #[serde(default)]
    pub all: bool,
}

#[derive(Deserialize)]
pub struct ListDriversQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteDriverQuery {
    #[serde(default)]
    pub hard: bool,
}
