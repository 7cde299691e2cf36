use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

/// Customer-visible booking lifecycle. Transitions are validated against the
/// edge table in `domain::services::transitions`, never by string comparison
/// at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    DriverAssigned,
    DriverEnRoute,
    InProgress,
    Completed,
    Cancelled,
    Noshow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::DriverAssigned => "driver_assigned",
            BookingStatus::DriverEnRoute => "driver_en_route",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Noshow => "noshow",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "driver_assigned" => Some(BookingStatus::DriverAssigned),
            "driver_en_route" => Some(BookingStatus::DriverEnRoute),
            "in_progress" => Some(BookingStatus::InProgress),
            "completed" => Some(BookingStatus::Completed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "noshow" => Some(BookingStatus::Noshow),
            _ => None,
        }
    }

    /// Statuses in which the booking must carry a driver snapshot.
    pub fn requires_driver(&self) -> bool {
        matches!(
            self,
            BookingStatus::DriverAssigned
                | BookingStatus::DriverEnRoute
                | BookingStatus::InProgress
                | BookingStatus::Completed
        )
    }

    /// Statuses that keep the assigned driver busy.
    pub fn holds_driver_busy(&self) -> bool {
        matches!(
            self,
            BookingStatus::DriverAssigned | BookingStatus::DriverEnRoute | BookingStatus::InProgress
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::Noshow
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        BookingStatus::parse(&value).ok_or_else(|| format!("unknown booking status '{}'", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(format!("unknown payment status '{}'", value)),
        }
    }
}

pub const TRIP_TYPES: &[&str] = &["one_way", "round_trip", "hourly"];
pub const VEHICLE_TYPES: &[&str] = &["sedan", "suv", "van", "luxury"];

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub scheduled_time: DateTime<Utc>,
    pub trip_type: String,
    pub vehicle_type: String,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    /// Denormalized snapshot taken at assignment time. All three are set
    /// together or all null; the driver record stays the source of current
    /// availability.
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub driver_plate: Option<String>,
    pub total_cost: i64,
    pub customer_rated: bool,
    pub driver_rated: bool,
    pub disputed: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub user_id: String,
    pub email: String,
    pub phone: String,
    pub pickup: String,
    pub dropoff: String,
    pub scheduled_time: DateTime<Utc>,
    pub trip_type: String,
    pub vehicle_type: String,
    pub total_cost: i64,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            customer_email: params.email,
            customer_phone: params.phone,
            pickup_location: params.pickup,
            dropoff_location: params.dropoff,
            scheduled_time: params.scheduled_time,
            trip_type: params.trip_type,
            vehicle_type: params.vehicle_type,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            driver_id: None,
            driver_name: None,
            driver_plate: None,
            total_cost: params.total_cost,
            customer_rated: false,
            driver_rated: false,
            disputed: false,
            created_at: Utc::now(),
        }
    }
}

/// Append-only audit row. `seq` is assigned by the store and fixes the commit
/// order; rows are never rewritten.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct StatusHistoryEntry {
    pub seq: i64,
    pub booking_id: String,
    pub status: String,
    pub note: Option<String>,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
}

/// History payload for a transition about to be committed. The timestamp is
/// generated server-side inside the repository transaction.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub status: BookingStatus,
    pub note: Option<String>,
    pub updated_by: String,
}

impl NewHistoryEntry {
    pub fn new(status: BookingStatus, updated_by: &str, note: Option<String>) -> Self {
        Self {
            status,
            note,
            updated_by: updated_by.to_string(),
        }
    }
}
