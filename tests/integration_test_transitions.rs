mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use transfer_backend::domain::models::auth::ActorRole;

fn status_url(booking_id: &str) -> String {
    format!("/api/v1/bookings/{}/status", booking_id)
}

#[tokio::test]
async fn illegal_edges_are_rejected_and_leave_the_booking_untouched() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    let booking_id = app.seed_booking("cust-1").await;

    // pending -> in_progress skips two steps.
    let (status, body) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&admin),
            Some(json!({ "status": "in_progress", "note": "forcing it" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    // Nothing may return to pending.
    let (status, _) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&admin),
            Some(json!({ "status": "pending", "note": "rewind" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app
        .request("GET", &format!("/api/v1/bookings/{}", booking_id), Some(&admin), None)
        .await;
    assert_eq!(body["data"]["status"], "pending");
}

#[tokio::test]
async fn assignment_is_not_reachable_through_status_updates() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    let booking_id = app.seed_booking("cust-1").await;

    let (status, _) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&admin),
            Some(json!({ "status": "driver_assigned", "note": "shortcut" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_cannot_drive_the_trip_forward() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    let customer = app.token("cust-1", ActorRole::Customer);
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;

    let booking_id = app.seed_booking("cust-1").await;
    let (status, _) = app
        .request("POST", &format!("/api/v1/bookings/{}/assign", booking_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&customer),
            Some(json!({ "status": "driver_en_route" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn only_the_assigned_driver_may_advance() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    app.seed_available_driver("drv-user-2", "Ben Okafor", "B-TX 5678").await;

    let booking_id = app.seed_booking("cust-1").await;
    app.request("POST", &format!("/api/v1/bookings/{}/assign", booking_id), Some(&admin), None)
        .await;

    // Exactly one of the two drivers holds the booking.
    let (_, body) = app
        .request("GET", &format!("/api/v1/bookings/{}", booking_id), Some(&admin), None)
        .await;
    let assigned_driver_id = body["data"]["driver_id"].as_str().unwrap().to_string();
    let (_, body) = app.request("GET", "/api/v1/drivers", Some(&admin), None).await;
    let other_user = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["id"] != json!(assigned_driver_id.clone()))
        .unwrap()["user_id"]
        .as_str()
        .unwrap()
        .to_string();

    let other_driver = app.token(&other_user, ActorRole::Driver);
    let (status, _) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&other_driver),
            Some(json!({ "status": "driver_en_route" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_overrides_require_a_note() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;

    let booking_id = app.seed_booking("cust-1").await;
    app.request("POST", &format!("/api/v1/bookings/{}/assign", booking_id), Some(&admin), None)
        .await;

    let (status, _) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&admin),
            Some(json!({ "status": "driver_en_route" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&admin),
            Some(json!({ "status": "driver_en_route", "note": "driver phone dead, confirmed by call" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn noshow_is_reserved_for_the_assigned_driver() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    let driver_id = app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    let driver = app.token("drv-user-1", ActorRole::Driver);

    let booking_id = app.seed_booking("cust-1").await;
    app.request("POST", &format!("/api/v1/bookings/{}/assign", booking_id), Some(&admin), None)
        .await;
    app.request(
        "POST",
        &status_url(&booking_id),
        Some(&driver),
        Some(json!({ "status": "driver_en_route" })),
    )
    .await;

    let customer = app.token("cust-1", ActorRole::Customer);
    let (status, _) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&customer),
            Some(json!({ "status": "noshow" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&driver),
            Some(json!({ "status": "noshow", "note": "waited 20 minutes at pickup" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "noshow");
    assert_eq!(body["data"]["disputed"], true);
    assert!(body["data"]["driver_id"].is_null());

    // Driver is back in the pool after the no-show.
    let (_, body) = app.request("GET", "/api/v1/drivers", Some(&admin), None).await;
    let row = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["id"] == json!(driver_id.clone()))
        .unwrap();
    assert_eq!(row["status"], "available");
}

#[tokio::test]
async fn terminal_states_accept_no_further_moves() {
    let app = TestApp::new().await;
    let admin = app.token("admin-1", ActorRole::Admin);
    let customer = app.token("cust-1", ActorRole::Customer);
    let booking_id = app.seed_booking("cust-1").await;

    let (status, _) = app
        .request(
            "POST",
            &format!("/api/v1/bookings/{}/cancel", booking_id),
            Some(&customer),
            Some(json!({ "reason": "plans changed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            "POST",
            &status_url(&booking_id),
            Some(&admin),
            Some(json!({ "status": "confirmed", "note": "reviving" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
