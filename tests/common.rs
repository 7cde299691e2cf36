use transfer_backend::{
    api::router::create_router,
    state::{AppState, RateLimiters},
    config::Config,
    domain::models::auth::{ActorRole, Claims},
    domain::models::notification::Notification,
    domain::ports::PushService,
    error::AppError,
    infra::repositories::{
        sqlite_booking_repo::SqliteBookingRepo,
        sqlite_driver_repo::SqliteDriverRepo,
        sqlite_notification_repo::SqliteNotificationRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

pub struct MockPushService;

#[async_trait]
impl PushService for MockPushService {
    async fn send(&self, _notification: &Notification) -> Result<(), AppError> {
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

pub struct TestLimits {
    pub standard: u32,
    pub payment: u32,
    pub sensitive: u32,
    pub location: u32,
}

impl Default for TestLimits {
    fn default() -> Self {
        // High enough that ordinary tests never trip the limiter.
        Self { standard: 10_000, payment: 10_000, sensitive: 10_000, location: 10_000 }
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::new_with_limits(TestLimits::default()).await
    }

    pub async fn new_with_limits(limits: TestLimits) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            push_service_url: "http://localhost".to_string(),
            push_service_token: "token".to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            rate_limit_standard: limits.standard,
            rate_limit_payment: limits.payment,
            rate_limit_sensitive: limits.sensitive,
            rate_limit_location: limits.location,
        };

        let state = Arc::new(AppState {
            config: config.clone(),
            booking_repo: Arc::new(SqliteBookingRepo::new(pool.clone())),
            driver_repo: Arc::new(SqliteDriverRepo::new(pool.clone())),
            notification_repo: Arc::new(SqliteNotificationRepo::new(pool.clone())),
            push_service: Arc::new(MockPushService),
            rate_limiters: RateLimiters::from_config(&config),
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Mints a token the way the identity provider would.
    pub fn token(&self, user_id: &str, role: ActorRole) -> String {
        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iss: "test-issuer".to_string(),
            exp: Utc::now().timestamp() + 3600,
        };
        encode(
            &Header::new(Algorithm::EdDSA),
            &claims,
            &EncodingKey::from_ed_pem(priv_key_pem.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Creates a driver profile via the admin API and brings it online as
    /// available through its own user account.
    pub async fn seed_available_driver(&self, user_id: &str, name: &str, plate: &str) -> String {
        let admin = self.token("admin-1", ActorRole::Admin);
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/drivers",
                Some(&admin),
                Some(serde_json::json!({
                    "user_id": user_id,
                    "name": name,
                    "vehicle_plate": plate,
                    "vehicle_type": "sedan"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "driver seeding failed: {}", body);
        let driver_id = body["data"]["id"].as_str().unwrap().to_string();

        let driver_token = self.token(user_id, ActorRole::Driver);
        let (status, body) = self
            .request(
                "PUT",
                "/api/v1/drivers/me/status",
                Some(&driver_token),
                Some(serde_json::json!({ "status": "available" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "driver go-online failed: {}", body);

        driver_id
    }

    /// Booking for `user_id`, scheduled tomorrow, priced at 5000 cents.
    pub async fn seed_booking(&self, user_id: &str) -> String {
        let token = self.token(user_id, ActorRole::Customer);
        let scheduled = Utc::now() + chrono::Duration::days(1);
        let (status, body) = self
            .request(
                "POST",
                "/api/v1/bookings",
                Some(&token),
                Some(serde_json::json!({
                    "email": "rider@example.com",
                    "phone": "+4915112345678",
                    "pickup_location": "Berlin Hbf",
                    "dropoff_location": "BER Airport T1",
                    "scheduled_time": scheduled.to_rfc3339(),
                    "trip_type": "one_way",
                    "vehicle_type": "sedan",
                    "total_cost": 5000
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "booking seeding failed: {}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
