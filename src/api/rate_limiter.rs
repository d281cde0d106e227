//! Rate limiting middleware for the REST API
//!
//! Token bucket rate limiting per endpoint category:
//! - Login: admin login and setup (default 5/s)
//! - Diagnosis: diagnosis submissions (default 20/s)
//! - General: everything else (default 100/s)

use crate::config::RateLimitConfig;
use crate::error::AppError;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rate limit type for different endpoint categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateLimitType {
    /// Reference data, history, health
    General,
    /// Diagnosis submissions
    Diagnosis,
    /// Credential checks
    Login,
}

impl RateLimitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitType::General => "general",
            RateLimitType::Diagnosis => "diagnosis",
            RateLimitType::Login => "login",
        }
    }
}

/// Token bucket rate limiter
#[derive(Debug)]
pub struct TokenBucket {
    /// Maximum tokens (requests) allowed per period
    capacity: u32,
    /// Current available tokens
    tokens: f64,
    /// Tokens added per second
    refill_rate: f64,
    /// Last refill time
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(rate_per_second: u32) -> Self {
        Self {
            capacity: rate_per_second,
            tokens: rate_per_second as f64,
            refill_rate: rate_per_second as f64,
            last_refill: Instant::now(),
        }
    }

    /// Try to consume a token, returns true if allowed
    pub fn try_acquire(&mut self) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);
        let refill_amount = elapsed.as_secs_f64() * self.refill_rate;

        self.tokens = (self.tokens + refill_amount).min(self.capacity as f64);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Get time until a token will be available
    pub fn time_until_available(&self) -> Duration {
        if self.tokens >= 1.0 || self.refill_rate <= 0.0 {
            Duration::ZERO
        } else {
            let tokens_needed = 1.0 - self.tokens;
            Duration::from_secs_f64(tokens_needed / self.refill_rate)
        }
    }
}

/// Shared rate limiter state
#[derive(Debug)]
pub struct RateLimiterState {
    limiters: Mutex<HashMap<RateLimitType, TokenBucket>>,
}

impl RateLimiterState {
    pub fn new(config: RateLimitConfig) -> Self {
        let mut limiters = HashMap::new();
        limiters.insert(RateLimitType::General, TokenBucket::new(config.general));
        limiters.insert(RateLimitType::Diagnosis, TokenBucket::new(config.diagnosis));
        limiters.insert(RateLimitType::Login, TokenBucket::new(config.login));

        Self {
            limiters: Mutex::new(limiters),
        }
    }

    /// Acquire a token or report how long to wait
    pub fn check(&self, rate_type: RateLimitType) -> Result<(), Duration> {
        let mut limiters = self.limiters.lock();
        match limiters.get_mut(&rate_type) {
            Some(limiter) => {
                if limiter.try_acquire() {
                    Ok(())
                } else {
                    Err(limiter.time_until_available())
                }
            }
            None => Ok(()),
        }
    }
}

/// Determine rate limit type based on request path
pub fn get_rate_limit_type(path: &str) -> RateLimitType {
    if path.ends_with("/admin/login") || path.ends_with("/admin/setup") {
        return RateLimitType::Login;
    }

    if path.ends_with("/diagnosis") {
        return RateLimitType::Diagnosis;
    }

    RateLimitType::General
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let rate_type = get_rate_limit_type(&path);

    if let Err(retry_after) = state.check(rate_type) {
        tracing::warn!(
            "Rate limit exceeded for {:?}, path: {}, retry after {:?}ms",
            rate_type,
            path,
            retry_after.as_millis()
        );
        return AppError::RateLimited {
            category: rate_type.as_str().to_string(),
            retry_after,
        }
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_bucket_basic() {
        let mut bucket = TokenBucket::new(10);

        for _ in 0..10 {
            assert!(bucket.try_acquire());
        }

        assert!(!bucket.try_acquire());
    }

    #[test]
    fn test_token_bucket_refill() {
        let mut bucket = TokenBucket::new(100);

        for _ in 0..100 {
            bucket.try_acquire();
        }
        assert!(!bucket.try_acquire());

        // Simulate time passing (force refill)
        bucket.last_refill = Instant::now() - Duration::from_millis(100);

        // ~10 tokens now (100/s * 0.1s)
        for _ in 0..9 {
            assert!(bucket.try_acquire());
        }
    }

    #[test]
    fn test_rate_limit_type_detection() {
        assert_eq!(get_rate_limit_type("/api/v1/admin/login"), RateLimitType::Login);
        assert_eq!(get_rate_limit_type("/api/v1/admin/setup"), RateLimitType::Login);
        assert_eq!(get_rate_limit_type("/api/v1/diagnosis"), RateLimitType::Diagnosis);
        assert_eq!(get_rate_limit_type("/api/v1/industries"), RateLimitType::General);
        assert_eq!(get_rate_limit_type("/api/v1/admin/history"), RateLimitType::General);
    }

    #[test]
    fn test_categories_are_independent() {
        let state = RateLimiterState::new(RateLimitConfig {
            general: 100,
            diagnosis: 20,
            login: 1,
        });

        assert!(state.check(RateLimitType::Login).is_ok());
        let wait = state.check(RateLimitType::Login).unwrap_err();
        assert!(wait <= Duration::from_secs(1));

        assert!(state.check(RateLimitType::General).is_ok());
        assert!(state.check(RateLimitType::Diagnosis).is_ok());
    }

    #[test]
    fn test_check_reports_wait_until_refill() {
        let state = RateLimiterState::new(RateLimitConfig {
            general: 2,
            diagnosis: 20,
            login: 5,
        });

        assert_eq!(state.check(RateLimitType::General), Ok(()));
        assert_eq!(state.check(RateLimitType::General), Ok(()));

        let wait = state.check(RateLimitType::General).unwrap_err();
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_millis(500));
    }
}
