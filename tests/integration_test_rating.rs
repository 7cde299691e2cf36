mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use transfer_backend::domain::models::auth::ActorRole;

/// Runs a booking for `customer` all the way to completed, using the already
/// seeded driver account `driver_user`.
async fn complete_trip(app: &TestApp, customer: &str, driver_user: &str) -> String {
    let admin = app.token("admin-1", ActorRole::Admin);
    let driver = app.token(driver_user, ActorRole::Driver);

    let booking_id = app.seed_booking(customer).await;
    let (status, body) = app
        .request("POST", &format!("/api/v1/bookings/{}/assign", booking_id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK, "assign failed: {}", body);

    for next in ["driver_en_route", "in_progress", "completed"] {
        let (status, body) = app
            .request(
                "POST",
                &format!("/api/v1/bookings/{}/status", booking_id),
                Some(&driver),
                Some(json!({ "status": next })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "advance to {} failed: {}", next, body);
    }
    booking_id
}

fn rate_url(booking_id: &str) -> String {
    format!("/api/v1/bookings/{}/rate", booking_id)
}

#[tokio::test]
async fn only_completed_bookings_take_ratings() {
    let app = TestApp::new().await;
    let customer = app.token("cust-1", ActorRole::Customer);
    let booking_id = app.seed_booking("cust-1").await;

    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&customer),
            Some(json!({ "rating_type": "customer_to_driver", "stars": 5 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn low_star_ratings_require_reasons() {
    let app = TestApp::new().await;
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    let booking_id = complete_trip(&app, "cust-1", "drv-user-1").await;
    let customer = app.token("cust-1", ActorRole::Customer);

    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&customer),
            Some(json!({ "rating_type": "customer_to_driver", "stars": 2, "reasons": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&customer),
            Some(json!({ "rating_type": "customer_to_driver", "stars": 2, "reasons": ["friendly"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&customer),
            Some(json!({ "rating_type": "customer_to_driver", "stars": 2, "reasons": ["late", "rude"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stars"], 2);
}

#[tokio::test]
async fn stars_must_stay_in_range() {
    let app = TestApp::new().await;
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    let booking_id = complete_trip(&app, "cust-1", "drv-user-1").await;
    let customer = app.token("cust-1", ActorRole::Customer);

    for stars in [0, 6, -1] {
        let (status, _) = app
            .request(
                "POST",
                &rate_url(&booking_id),
                Some(&customer),
                Some(json!({ "rating_type": "customer_to_driver", "stars": stars })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "stars={} accepted", stars);
    }
}

#[tokio::test]
async fn each_side_rates_exactly_once() {
    let app = TestApp::new().await;
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    let booking_id = complete_trip(&app, "cust-1", "drv-user-1").await;
    let customer = app.token("cust-1", ActorRole::Customer);
    let driver = app.token("drv-user-1", ActorRole::Driver);
    let admin = app.token("admin-1", ActorRole::Admin);

    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&customer),
            Some(json!({ "rating_type": "customer_to_driver", "stars": 5, "tip": 500 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&customer),
            Some(json!({ "rating_type": "customer_to_driver", "stars": 1, "reasons": ["late"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Both directions coexist on one booking.
    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&driver),
            Some(json!({ "rating_type": "driver_to_customer", "stars": 4 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The duplicate never reached the aggregates.
    let (_, body) = app.request("GET", "/api/v1/drivers", Some(&admin), None).await;
    let row = &body["data"][0];
    assert_eq!(row["rating"], 5.0);
    assert_eq!(row["rating_count"], 1);
    assert_eq!(row["pending_earnings"], 500);
}

#[tokio::test]
async fn driver_rating_average_is_weighted() {
    let app = TestApp::new().await;
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    let admin = app.token("admin-1", ActorRole::Admin);
    let customer = app.token("cust-1", ActorRole::Customer);

    let first = complete_trip(&app, "cust-1", "drv-user-1").await;
    let second = complete_trip(&app, "cust-1", "drv-user-1").await;

    for (booking_id, stars) in [(&first, 5), (&second, 4)] {
        let (status, _) = app
            .request(
                "POST",
                &rate_url(booking_id),
                Some(&customer),
                Some(json!({ "rating_type": "customer_to_driver", "stars": stars })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = app.request("GET", "/api/v1/drivers", Some(&admin), None).await;
    let row = &body["data"][0];
    assert_eq!(row["rating"], 4.5);
    assert_eq!(row["rating_count"], 2);
}

#[tokio::test]
async fn tips_are_capped_and_one_directional() {
    let app = TestApp::new().await;
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    let booking_id = complete_trip(&app, "cust-1", "drv-user-1").await;
    let customer = app.token("cust-1", ActorRole::Customer);
    let driver = app.token("drv-user-1", ActorRole::Driver);

    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&customer),
            Some(json!({ "rating_type": "customer_to_driver", "stars": 5, "tip": 10001 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&customer),
            Some(json!({ "rating_type": "customer_to_driver", "stars": 5, "tip": -5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&driver),
            Some(json!({ "rating_type": "driver_to_customer", "stars": 5, "tip": 200 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ratings_are_tied_to_the_booking_parties() {
    let app = TestApp::new().await;
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    let booking_id = complete_trip(&app, "cust-1", "drv-user-1").await;

    let stranger = app.token("cust-2", ActorRole::Customer);
    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&stranger),
            Some(json!({ "rating_type": "customer_to_driver", "stars": 1, "reasons": ["other"] })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // A driver account not on this booking cannot rate the customer.
    app.seed_available_driver("drv-user-2", "Ben Okafor", "B-TX 5678").await;
    let other_driver = app.token("drv-user-2", ActorRole::Driver);
    let (status, _) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&other_driver),
            Some(json!({ "rating_type": "driver_to_customer", "stars": 1, "reasons": ["other"] })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn comments_are_sanitized() {
    let app = TestApp::new().await;
    app.seed_available_driver("drv-user-1", "Ana Petrov", "B-TX 1234").await;
    let booking_id = complete_trip(&app, "cust-1", "drv-user-1").await;
    let customer = app.token("cust-1", ActorRole::Customer);

    let (status, body) = app
        .request(
            "POST",
            &rate_url(&booking_id),
            Some(&customer),
            Some(json!({
                "rating_type": "customer_to_driver",
                "stars": 5,
                "comment": "  great ride <script>alert(1)</script>  "
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let comment = body["data"]["comment"].as_str().unwrap();
    assert!(!comment.contains('<'));
    assert!(!comment.contains('>'));
    assert!(comment.starts_with("great ride"));
}
