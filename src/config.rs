use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub push_service_url: String,
    pub push_service_token: String,
    pub jwt_public_key: String, // Identity provider public key (PEM)
    pub auth_issuer: String,
    pub rate_limit_standard: u32,
    pub rate_limit_payment: u32,
    pub rate_limit_sensitive: u32,
    pub rate_limit_location: u32,
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            push_service_url: env::var("PUSH_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8100/api/v1/push".to_string()),
            push_service_token: env::var("PUSH_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://id.transfer-platform.local".to_string()),
            rate_limit_standard: env_u32("RATE_LIMIT_STANDARD", 10),
            rate_limit_payment: env_u32("RATE_LIMIT_PAYMENT", 10),
            rate_limit_sensitive: env_u32("RATE_LIMIT_SENSITIVE", 3),
            rate_limit_location: env_u32("RATE_LIMIT_LOCATION", 60),
        }
    }
}
