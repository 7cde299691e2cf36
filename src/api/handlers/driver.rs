use axum::{extract::{Path, Query, State}, response::IntoResponse};
use axum::Json;
use crate::api::dtos::requests::{
    CreateDriverRequest, DeleteDriverQuery, ListDriversQuery, UpdateDriverStatusRequest, UpdateLocationRequest,
};
use crate::api::dtos::responses::ok;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::auth::ActorRole;
use crate::domain::models::booking::VEHICLE_TYPES;
use crate::domain::models::driver::{Driver, DriverStatus};
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

/// Driver approval; creates the driver record offline until the driver goes
/// available themselves.
pub async fn create_driver(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<CreateDriverRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    if payload.name.trim().is_empty() || payload.vehicle_plate.trim().is_empty() {
        return Err(AppError::Validation("Name and vehicle plate are required".into()));
    }
    if !VEHICLE_TYPES.contains(&payload.vehicle_type.as_str()) {
        return Err(AppError::Validation(format!("Unknown vehicle type '{}'", payload.vehicle_type)));
    }
    if let Some(user_id) = &payload.user_id {
        if state.driver_repo.find_by_user_id(user_id).await?.is_some() {
            return Err(AppError::Conflict("User already has a driver profile".into()));
        }
    }

    let driver = Driver::new(payload.user_id, payload.name, payload.vehicle_plate, payload.vehicle_type);
    let created = state.driver_repo.create(&driver).await?;
    info!("Driver approved: {}", created.id);
    Ok(ok(created))
}

pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListDriversQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let status = match query.status.as_deref() {
        None => None,
        Some(s) => Some(
            DriverStatus::parse(s).ok_or_else(|| AppError::Validation(format!("Unknown driver status '{}'", s)))?,
        ),
    };

    let drivers = state.driver_repo.list(status).await?;
    Ok(ok(drivers))
}

async fn own_driver(state: &AppState, user: &AuthUser) -> Result<Driver, AppError> {
    if user.role != ActorRole::Driver {
        return Err(AppError::Forbidden("Driver access required".into()));
    }
    state
        .driver_repo
        .find_by_user_id(&user.user_id)
        .await?
        .ok_or(AppError::NotFound("No driver profile for this account".into()))
}

/// Drivers toggle themselves available/offline. `busy` is owned by dispatch
/// and trip completion; suspension is owned by admins.
pub async fn set_my_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<UpdateDriverStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let driver = own_driver(&state, &user).await?;

    if !matches!(payload.status, DriverStatus::Available | DriverStatus::Offline) {
        return Err(AppError::Validation("Drivers can only go available or offline".into()));
    }

    let updated = state
        .driver_repo
        .set_status(&driver.id, &[DriverStatus::Available, DriverStatus::Offline], payload.status)
        .await?;
    Ok(ok(updated))
}

pub async fn update_my_location(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let driver = own_driver(&state, &user).await?;

    if !(-90.0..=90.0).contains(&payload.lat) || !(-180.0..=180.0).contains(&payload.lng) {
        return Err(AppError::Validation("Coordinates out of range".into()));
    }

    state.driver_repo.update_location(&driver.id, payload.lat, payload.lng).await?;
    Ok(ok(serde_json::json!({ "status": "updated" })))
}

pub async fn suspend_driver(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(driver_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    // A busy driver finishes (or loses) its trip first; suspending mid-trip
    // would break the busy-iff-active-booking invariant.
    let updated = state
        .driver_repo
        .set_status(&driver_id, &[DriverStatus::Available, DriverStatus::Offline], DriverStatus::Suspended)
        .await?;
    info!("Driver suspended: {}", driver_id);
    Ok(ok(updated))
}

pub async fn reinstate_driver(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(driver_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let updated = state
        .driver_repo
        .set_status(&driver_id, &[DriverStatus::Suspended], DriverStatus::Offline)
        .await?;
    info!("Driver reinstated: {}", driver_id);
    Ok(ok(updated))
}

/// Soft delete by default; `?hard=true` detaches the linked user and removes
/// the record in one transaction.
pub async fn delete_driver(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(driver_id): Path<String>,
    Query(query): Query<DeleteDriverQuery>,
) -> Result<impl IntoResponse, AppError> {
    user.require_admin()?;

    let driver = state
        .driver_repo
        .find_by_id(&driver_id)
        .await?
        .ok_or(AppError::NotFound("Driver not found".into()))?;

    let active = state.booking_repo.count_active_for_driver(&driver.id).await?;
    if active > 0 {
        return Err(AppError::Conflict("Driver has an active booking".into()));
    }

    if query.hard {
        state.driver_repo.delete_detaching_user(&driver_id).await?;
        info!("Driver hard-deleted: {}", driver_id);
    } else {
        state.driver_repo.deactivate(&driver_id).await?;
        info!("Driver deactivated: {}", driver_id);
    }
    Ok(ok(serde_json::json!({ "status": "deleted" })))
}
