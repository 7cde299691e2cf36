use axum::{extract::{Path, Query, State}, response::IntoResponse};
use axum::Json;
use crate::api::dtos::requests::{
    AdvanceStatusRequest, CancelBookingRequest, CreateBookingRequest, DisputeRequest, ListBookingsQuery,
};
use crate::api::dtos::responses::ok;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::auth::ActorRole;
use crate::domain::models::booking::{
    Booking, BookingStatus, NewBookingParams, NewHistoryEntry, TRIP_TYPES, VEHICLE_TYPES,
};
use crate::domain::models::notification::Notification;
use crate::domain::services::transitions::{plan_transition, TransitionAction};
use crate::error::AppError;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !TRIP_TYPES.contains(&payload.trip_type.as_str()) {
        return Err(AppError::Validation(format!("Unknown trip type '{}'", payload.trip_type)));
    }
    if !VEHICLE_TYPES.contains(&payload.vehicle_type.as_str()) {
        return Err(AppError::Validation(format!("Unknown vehicle type '{}'", payload.vehicle_type)));
    }
    if payload.total_cost <= 0 {
        return Err(AppError::Validation("Total cost must be positive".into()));
    }
    if !payload.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".into()));
    }
    if payload.phone.trim().is_empty() {
        return Err(AppError::Validation("Phone number is required".into()));
    }
    if payload.pickup_location.trim().is_empty() || payload.dropoff_location.trim().is_empty() {
        return Err(AppError::Validation("Pickup and dropoff locations are required".into()));
    }
    if payload.scheduled_time <= Utc::now() {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }

    let booking = Booking::new(NewBookingParams {
        user_id: user.user_id.clone(),
        email: payload.email,
        phone: payload.phone,
        pickup: payload.pickup_location,
        dropoff: payload.dropoff_location,
        scheduled_time: payload.scheduled_time,
        trip_type: payload.trip_type,
        vehicle_type: payload.vehicle_type,
        total_cost: payload.total_cost,
    });

    let created = state.booking_repo.create(&booking, vec![]).await?;
    info!("Booking created: {} for user {}", created.id, user.user_id);
    Ok(ok(created))
}

/// Owner, assigned driver and admin may read a booking.
async fn authorize_read(state: &AppState, user: &AuthUser, booking: &Booking) -> Result<(), AppError> {
    if user.is_admin() || booking.user_id == user.user_id {
        return Ok(());
    }
    if user.role == ActorRole::Driver {
        if let Some(driver) = state.driver_repo.find_by_user_id(&user.user_id).await? {
            if booking.driver_id.as_deref() == Some(driver.id.as_str()) {
                return Ok(());
            }
        }
    }
    Err(AppError::Forbidden("Not your booking".into()))
}

async fn load_booking(state: &AppState, id: &str) -> Result<Booking, AppError> {
    state
        .booking_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Booking not found".into()))
}

pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = load_booking(&state, &booking_id).await?;
    authorize_read(&state, &user, &booking).await?;
    Ok(ok(booking))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListBookingsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bookings = if query.all {
        user.require_admin()?;
        state.booking_repo.list_all().await?
    } else {
        state.booking_repo.list_by_user(&user.user_id).await?
    };
    Ok(ok(bookings))
}

pub async fn get_history(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = load_booking(&state, &booking_id).await?;
    authorize_read(&state, &user, &booking).await?;
    let history = state.booking_repo.history(&booking_id).await?;
    Ok(ok(history))
}

/// Signal from the payment collaborator, authenticated as the booking owner.
/// Flips unpaid -> paid and pending -> confirmed under one guard.
pub async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let booking = load_booking(&state, &booking_id).await?;

    if booking.user_id != user.user_id && !user.is_admin() {
        return Err(AppError::Forbidden("Not your booking".into()));
    }
    if booking.payment_status != crate::domain::models::booking::PaymentStatus::Unpaid {
        return Err(AppError::Conflict("Booking is already paid".into()));
    }
    if booking.status != BookingStatus::Pending {
        return Err(AppError::Conflict("Booking is no longer awaiting payment".into()));
    }

    let entry = NewHistoryEntry::new(BookingStatus::Confirmed, &user.user_id, Some("Payment confirmed".into()));
    let notifications = vec![Notification::status_changed(&booking, BookingStatus::Confirmed)];
    let updated = state.booking_repo.confirm_payment(&booking_id, entry, notifications).await?;

    info!("Payment confirmed for booking {}", booking_id);
    Ok(ok(updated))
}

/// advanceStatus: validates the edge and actor against the transition table,
/// then commits the matching repository plan under a status CAS.
pub async fn advance_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<AdvanceStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = load_booking(&state, &booking_id).await?;

    if user.role == ActorRole::Customer && booking.user_id != user.user_id {
        return Err(AppError::Forbidden("Not your booking".into()));
    }

    let is_assigned_driver = if user.role == ActorRole::Driver {
        match state.driver_repo.find_by_user_id(&user.user_id).await? {
            Some(driver) => booking.driver_id.as_deref() == Some(driver.id.as_str()),
            None => false,
        }
    } else {
        false
    };

    let plan = plan_transition(&booking, payload.status, user.role, is_assigned_driver, payload.note.as_deref())?;
    let entry = NewHistoryEntry::new(plan.to, &user.user_id, payload.note.clone());
    let notifications = vec![Notification::status_changed(&booking, plan.to)];

    let updated = match plan.action {
        TransitionAction::Advance => {
            state.booking_repo.advance(&booking_id, plan.from, entry, notifications).await?
        }
        TransitionAction::Complete => {
            let driver_id = booking
                .driver_id
                .as_deref()
                .ok_or(AppError::InternalWithMsg(format!("Booking {} in progress without driver", booking_id)))?;
            state.booking_repo.complete(&booking_id, driver_id, entry, notifications).await?
        }
        TransitionAction::Cancel => {
            state
                .booking_repo
                .terminate(
                    &booking_id,
                    &[plan.from],
                    BookingStatus::Cancelled,
                    booking.driver_id.as_deref(),
                    false,
                    entry,
                    notifications,
                )
                .await?
        }
        TransitionAction::Noshow => {
            state
                .booking_repo
                .terminate(
                    &booking_id,
                    &[plan.from],
                    BookingStatus::Noshow,
                    booking.driver_id.as_deref(),
                    true,
                    entry,
                    notifications,
                )
                .await?
        }
    };

    info!("Booking {} moved {} -> {}", booking_id, plan.from, plan.to);
    Ok(ok(updated))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.reason.trim().is_empty() {
        return Err(AppError::Validation("Cancellation reason is required".into()));
    }

    let booking = load_booking(&state, &booking_id).await?;

    if user.role == ActorRole::Customer && booking.user_id != user.user_id {
        return Err(AppError::Forbidden("Not your booking".into()));
    }

    let plan = plan_transition(&booking, BookingStatus::Cancelled, user.role, false, Some(&payload.reason))?;
    let entry = NewHistoryEntry::new(BookingStatus::Cancelled, &user.user_id, Some(payload.reason));
    let notifications = vec![Notification::status_changed(&booking, BookingStatus::Cancelled)];

    // Cancellation and driver release commit together; readers never observe
    // a cancelled booking whose driver is still busy.
    let updated = state
        .booking_repo
        .terminate(
            &booking_id,
            &[plan.from],
            BookingStatus::Cancelled,
            booking.driver_id.as_deref(),
            false,
            entry,
            notifications,
        )
        .await?;

    info!("Booking cancelled: {}", booking_id);
    Ok(ok(updated))
}

/// Admin side channel; flags the dispute without touching the visible status.
pub async fn flag_dispute(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<DisputeRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    if payload.note.trim().is_empty() {
        return Err(AppError::Validation("A dispute note is required".into()));
    }

    let booking = load_booking(&state, &booking_id).await?;
    if booking.status == BookingStatus::Cancelled {
        return Err(AppError::Conflict("Cancelled bookings cannot be disputed".into()));
    }

    let entry = NewHistoryEntry::new(booking.status, &user.user_id, Some(format!("Disputed: {}", payload.note)));
    let updated = state.booking_repo.flag_disputed(&booking_id, entry).await?;
    Ok(ok(updated))
}

/// Explicit maintenance purge; the only path that physically deletes.
pub async fn purge_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;
    state.booking_repo.purge(&booking_id).await?;
    info!("Booking purged: {}", booking_id);
    Ok(ok(serde_json::json!({ "status": "purged" })))
}
