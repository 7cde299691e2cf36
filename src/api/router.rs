use axum::{
    body::Body,
    extract::Request,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::api::handlers::{booking, dispatch, driver, health, rating};
use crate::api::rate_limit::rate_limit_middleware;
use crate::state::AppState;
use tower_http::{
    classify::ServerErrorsFailureClass,
    trace::TraceLayer,
};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    let limiters = state.rate_limiters.clone();

    let standard = Router::new()
        // Booking flow
        .route("/api/v1/bookings", post(booking::create_booking).get(booking::list_bookings))
        .route("/api/v1/bookings/{booking_id}", get(booking::get_booking))
        .route("/api/v1/bookings/{booking_id}/history", get(booking::get_history))
        .route("/api/v1/bookings/{booking_id}/status", post(booking::advance_status))
        .route("/api/v1/bookings/{booking_id}/cancel", post(booking::cancel_booking))
        .route("/api/v1/bookings/{booking_id}/rate", post(rating::rate_booking))

        // Driver management
        .route("/api/v1/drivers", post(driver::create_driver).get(driver::list_drivers))
        .route("/api/v1/drivers/me/status", put(driver::set_my_status))
        .route("/api/v1/drivers/{driver_id}/suspend", put(driver::suspend_driver))
        .route("/api/v1/drivers/{driver_id}/reinstate", put(driver::reinstate_driver))
        .route_layer(middleware::from_fn_with_state(limiters.standard.clone(), rate_limit_middleware));

    let payment = Router::new()
        .route("/api/v1/bookings/{booking_id}/confirm-payment", post(booking::confirm_payment))
        .route_layer(middleware::from_fn_with_state(limiters.payment.clone(), rate_limit_middleware));

    let sensitive = Router::new()
        .route("/api/v1/bookings/{booking_id}/assign", post(dispatch::assign_driver))
        .route("/api/v1/bookings/{booking_id}/dispute", post(booking::flag_dispute))
        .route("/api/v1/bookings/{booking_id}", delete(booking::purge_booking))
        .route("/api/v1/drivers/{driver_id}", delete(driver::delete_driver))
        .route_layer(middleware::from_fn_with_state(limiters.sensitive.clone(), rate_limit_middleware));

    let location = Router::new()
        .route("/api/v1/drivers/me/location", put(driver::update_my_location))
        .route_layer(middleware::from_fn_with_state(limiters.location.clone(), rate_limit_middleware));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(standard)
        .merge(payment)
        .merge(sensitive)
        .merge(location)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
