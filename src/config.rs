//! Server configuration
//!
//! Read from `FINDIAG_*` environment variables, falling back to defaults
//! suitable for local use.

use crate::error::{AppError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Longest accepted admin session lifetime
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the SQLite file and the pepper
    pub data_dir: PathBuf,
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub rate_limits: RateLimitConfig,
}

/// Requests per second for each rate limit category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub general: u32,
    pub diagnosis: u32,
    pub login: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general: 100,
            diagnosis: 20,
            login: 5,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            session_ttl: Duration::from_secs(480 * 60),
            session_sweep_interval: Duration::from_secs(300),
            rate_limits: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("FINDIAG_HOST").unwrap_or(defaults.host);
        let port = parse_var(&lookup, "FINDIAG_PORT", defaults.port)?;
        let data_dir = lookup("FINDIAG_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let ttl_minutes: u64 = parse_var(
            &lookup,
            "FINDIAG_SESSION_TTL_MINUTES",
            defaults.session_ttl.as_secs() / 60,
        )?;
        let sweep_seconds: u64 = parse_var(
            &lookup,
            "FINDIAG_SESSION_SWEEP_SECONDS",
            defaults.session_sweep_interval.as_secs(),
        )?;

        let rate_limits = RateLimitConfig {
            general: parse_var(&lookup, "FINDIAG_RATE_LIMIT_GENERAL", defaults.rate_limits.general)?,
            diagnosis: parse_var(
                &lookup,
                "FINDIAG_RATE_LIMIT_DIAGNOSIS",
                defaults.rate_limits.diagnosis,
            )?,
            login: parse_var(&lookup, "FINDIAG_RATE_LIMIT_LOGIN", defaults.rate_limits.login)?,
        };

        let ttl_seconds = ttl_minutes.checked_mul(60).ok_or_else(|| {
            AppError::Config(format!(
                "FINDIAG_SESSION_TTL_MINUTES={} is out of range",
                ttl_minutes
            ))
        })?;

        let config = Self {
            host,
            port,
            data_dir,
            session_ttl: Duration::from_secs(ttl_seconds),
            session_sweep_interval: Duration::from_secs(sweep_seconds),
            rate_limits,
        };
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.session_ttl.is_zero() {
            return Err(AppError::Config(
                "FINDIAG_SESSION_TTL_MINUTES must be greater than 0".to_string(),
            ));
        }
        if self.session_ttl > MAX_SESSION_TTL {
            return Err(AppError::Config(format!(
                "FINDIAG_SESSION_TTL_MINUTES must be at most {}",
                MAX_SESSION_TTL.as_secs() / 60
            )));
        }
        if self.session_sweep_interval.is_zero() {
            return Err(AppError::Config(
                "FINDIAG_SESSION_SWEEP_SECONDS must be greater than 0".to_string(),
            ));
        }
        let limits = self.rate_limits;
        if limits.general == 0 || limits.diagnosis == 0 || limits.login == 0 {
            return Err(AppError::Config(
                "Rate limits must be greater than 0".to_string(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Listen address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address {}:{}: {}", self.host, self.port, e)))
    }

    /// SQLite database file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("findiag.db")
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid {}='{}': {}", key, raw, e))),
        _ => Ok(default),
    }
}
