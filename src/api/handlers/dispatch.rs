use axum::{extract::{Path, State}, response::IntoResponse};
use crate::api::dtos::responses::ok;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::booking::{BookingStatus, NewHistoryEntry};
use crate::domain::models::notification::Notification;
use crate::domain::services::dispatch::select_driver;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::{info, warn};

/// Dispatch assignment: picks the eligible driver and commits the paired
/// booking+driver write as one transaction. A second call on the same booking
/// observes the snapshot and writes nothing.
pub async fn assign_driver(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let booking = state
        .booking_repo
        .find_by_id(&booking_id)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;

    if booking.driver_id.is_some() {
        return Err(AppError::Conflict("Booking already has a driver assigned".into()));
    }
    if !matches!(booking.status, BookingStatus::Pending | BookingStatus::Confirmed) {
        return Err(AppError::Conflict(format!(
            "Booking is {} and cannot be dispatched",
            booking.status
        )));
    }

    let candidates = state.driver_repo.list_available().await?;
    let Some(driver) = select_driver(&candidates, &booking.user_id) else {
        warn!("No driver available for booking {}", booking_id);
        return Err(AppError::Conflict("No driver available".into()));
    };

    let entry = NewHistoryEntry::new(
        BookingStatus::DriverAssigned,
        &user.user_id,
        Some(format!("Driver {} ({}) assigned", driver.name, driver.vehicle_plate)),
    );

    let mut notifications = vec![Notification::driver_assigned(&booking, &driver.name, &driver.vehicle_plate)];
    if let Some(driver_user) = &driver.user_id {
        notifications.push(Notification::new_job(driver_user, &booking));
    }

    let updated = state
        .booking_repo
        .assign_driver(&booking_id, driver, entry, notifications)
        .await?;

    info!("Driver {} assigned to booking {}", driver.id, booking_id);
    Ok(ok(updated))
}
