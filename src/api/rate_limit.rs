use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::AppError;

#[derive(Debug, Clone)]
struct WindowInfo {
    requests: u32,
    window_start: Instant,
}

/// Fixed-window request counter, keyed per caller. Advisory in-process state:
/// created at startup, entries expire with their window, nothing persisted,
/// resets on restart. Multi-instance deployments need an external shared
/// counter for this to be a correctness mechanism; here it only throttles
/// abusive callers hitting one instance.
#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<RwLock<HashMap<String, WindowInfo>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    pub fn per_minute(max_requests: u32) -> Arc<Self> {
        Arc::new(Self::new(max_requests, Duration::from_secs(60)))
    }

    pub async fn check(&self, key: &str) -> Result<(), AppError> {
        let mut requests = self.requests.write().await;
        let now = Instant::now();

        requests.retain(|_, info| now.duration_since(info.window_start) < self.window);

        let info = requests.entry(key.to_string()).or_insert(WindowInfo {
            requests: 0,
            window_start: now,
        });

        if now.duration_since(info.window_start) >= self.window {
            info.requests = 1;
            info.window_start = now;
            return Ok(());
        }

        if info.requests >= self.max_requests {
            return Err(AppError::RateLimited);
        }

        info.requests += 1;
        Ok(())
    }
}

/// Throttle key: the bearer token when one is present (per-identity), else the
/// forwarded client IP. The token is opaque here; the auth extractor verifies
/// it later.
fn caller_key(request: &Request) -> String {
    if let Some(auth) = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        return format!("token:{}", auth);
    }

    let ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .split(',')
        .next()
        .unwrap_or("unknown")
        .trim();
    format!("ip:{}", ip)
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limiter.check(&caller_key(&request)).await?;
    Ok(next.run(request).await)
}
