use axum::{extract::{Path, State}, response::IntoResponse};
use axum::Json;
use crate::api::dtos::requests::RateBookingRequest;
use crate::api::dtos::responses::ok;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking::BookingStatus;
use crate::domain::models::rating::{Rating, RatingType};
use crate::domain::services::rating::validate_rating;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn rate_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<RateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .booking_repo
        .find_by_id(&booking_id)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.status != BookingStatus::Completed {
        return Err(AppError::Conflict("Only completed bookings can be rated".into()));
    }

    // The rater must belong to this specific booking: its customer for
    // customer_to_driver, its assigned driver for driver_to_customer.
    match payload.rating_type {
        RatingType::CustomerToDriver => {
            if booking.user_id != user.user_id {
                return Err(AppError::Forbidden("Only the booking's customer can rate the driver".into()));
            }
        }
        RatingType::DriverToCustomer => {
            let driver = state
                .driver_repo
                .find_by_user_id(&user.user_id)
                .await?
                .ok_or(AppError::Forbidden("Only the assigned driver can rate the customer".into()))?;
            if booking.driver_id.as_deref() != Some(driver.id.as_str()) {
                return Err(AppError::Forbidden("Only the assigned driver can rate the customer".into()));
            }
        }
    }

    let already = match payload.rating_type {
        RatingType::CustomerToDriver => booking.customer_rated,
        RatingType::DriverToCustomer => booking.driver_rated,
    };
    if already {
        return Err(AppError::Conflict("This booking side has already been rated".into()));
    }

    let validated = validate_rating(
        payload.rating_type,
        payload.stars,
        payload.reasons,
        payload.comment,
        payload.tip,
    )?;

    let rating = Rating::new(
        booking.id.clone(),
        payload.rating_type,
        user.user_id.clone(),
        validated.stars,
        validated.reasons,
        validated.comment,
        validated.tip,
    );

    // Aggregates only move for the driver side being rated.
    let driver_id = match payload.rating_type {
        RatingType::CustomerToDriver => booking.driver_id.as_deref(),
        RatingType::DriverToCustomer => None,
    };

    state.booking_repo.submit_rating(&rating, driver_id).await?;

    info!("Rating {} recorded for booking {}", rating.rating_type, booking_id);
    Ok(ok(rating))
}
