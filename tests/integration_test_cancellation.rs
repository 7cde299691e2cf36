mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use transfer_backend::domain::models::auth::ActorRole;

fn cancel_url(booking_id: &str) -> String {
    format!("/api/v1/bookings/{}/cancel", booking_id)
}

#[tokio::test]
async fn customer_cancels_before_assignment() {
    let app = TestApp::new().await;
    let customer = app.token("cust-1", ActorRole::Customer);
    let booking_id = app.seed_booking("cust-1").await;

    let (status, body) = app
        .request(
            "POST",
            &cancel_url(&booking_id),
            Some(&customer),
            Some(json!({ "reason": "flight moved" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    // The reason lands in the trail.
    let (_, body) = app
        .request("GET", &format!("/api/v1/bookings/{}/history", booking_id), Some(&customer), None)
        .await;
    let last = body["data"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["status"], "cancelled");
    assert_eq!(last["note"], "flight moved");
}

#[tokio::test]
async fn cancellation_needs_a_reason() {
    let app = TestApp::new().await;
    let customer = app.token("cust-1", ActorRole::Customer);
    let booking_id = app.seed_booking("cust-1").await;

    let (status, _) = app
        .request(
            "POST",
            &cancel_url(&booking_id),
            Some(&customer),
            Some(json!({ "reason": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_cannot_cancel_once_a_driver_is_assigned() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    let customer = app.token("cust-1", ActorRole::Customer);
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;

    let booking_id = app.seed_booking("cust-1").await;
    app.request("POST", &format!("/api/v1/bookings/{}/assign", booking_id), Some(&admin), None)
        .await;

    let (status, _) = app
        .request(
            "POST",
            &cancel_url(&booking_id),
            Some(&customer),
            Some(json!({ "reason": "changed my mind" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn strangers_cannot_cancel_someone_elses_booking() {
    let app = TestApp::new().await;
    let stranger = app.token("cust-2", ActorRole::Customer);
    let booking_id = app.seed_booking("cust-1").await;

    let (status, _) = app
        .request(
            "POST",
            &cancel_url(&booking_id),
            Some(&stranger),
            Some(json!({ "reason": "not mine" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn strangers_cannot_move_someone_elses_booking_via_status() {
    let app = TestApp::new().await;
    let stranger = app.token("cust-2", ActorRole::Customer);
    let admin = app.token("admin-1", ActorRole::Admin);
    let booking_id = app.seed_booking("cust-1").await;

    // The status route enforces ownership too, not just /cancel.
    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/bookings/{}/status", booking_id),
            Some(&stranger),
            Some(json!({ "status": "cancelled" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/bookings/{}/status", booking_id),
            Some(&stranger),
            Some(json!({ "status": "driver_en_route" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app
        .request("GET", &format!("/api/v1/bookings/{}", booking_id), Some(&admin), None)
        .await;
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn admin_cancel_releases_the_driver_atomically() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    let driver_id = app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;

    let booking_id = app.seed_booking("cust-1").await;
    app.request("POST", &format!("/api/v1/bookings/{}/assign", booking_id), Some(&admin), None)
        .await;

    let (status, body) = app
        .request(
            "POST",
            &cancel_url(&booking_id),
            Some(&admin),
            Some(json!({ "reason": "customer unreachable, cancelled by support" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
    assert!(body["data"]["driver_id"].is_null());
    assert!(body["data"]["driver_name"].is_null());

    let (_, body) = app.request("GET", "/api/v1/drivers", Some(&admin), None).await;
    let row = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["id"] == json!(driver_id.clone()))
        .unwrap();
    assert_eq!(row["status"], "available");
    // No trip settled for a cancelled booking.
    assert_eq!(row["total_trips"], 0);
    assert_eq!(row["total_earnings"], 0);
}

#[tokio::test]
async fn drivers_cannot_cancel() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    let driver = app.token("drv-user-1", ActorRole::Driver);

    let booking_id = app.seed_booking("cust-1").await;
    app.request("POST", &format!("/api/v1/bookings/{}/assign", booking_id), Some(&admin), None)
        .await;

    let (status, _) = app
        .request(
            "POST",
            &cancel_url(&booking_id),
            Some(&driver),
            Some(json!({ "reason": "too far" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
