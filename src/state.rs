use std::sync::Arc;
use crate::api::rate_limit::RateLimiter;
use crate::config::Config;
use crate::domain::ports::{BookingRepository, DriverRepository, NotificationRepository, PushService};

#[derive(Clone)]
pub struct RateLimiters {
    pub standard: Arc<RateLimiter>,
    pub payment: Arc<RateLimiter>,
    pub sensitive: Arc<RateLimiter>,
    pub location: Arc<RateLimiter>,
}

impl RateLimiters {
    pub fn from_config(config: &Config) -> Self {
        Self {
            standard: RateLimiter::per_minute(config.rate_limit_standard),
            payment: RateLimiter::per_minute(config.rate_limit_payment),
            sensitive: RateLimiter::per_minute(config.rate_limit_sensitive),
            location: RateLimiter::per_minute(config.rate_limit_location),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub driver_repo: Arc<dyn DriverRepository>,
    pub notification_repo: Arc<dyn NotificationRepository>,
    pub push_service: Arc<dyn PushService>,
    pub rate_limiters: RateLimiters,
}
