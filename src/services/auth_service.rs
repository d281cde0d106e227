//! Auth Service
//!
//! Admin account bootstrap, login/logout and bearer token resolution.

use crate::error::{AppError, Result};
use crate::state::{AdminSession, AppState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Special characters accepted by the password policy
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*";
pub const MIN_PASSWORD_LEN: usize = 8;

/// Issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Auth service for business logic
pub struct AuthService;

impl AuthService {
    /// Create the first admin; refused once any admin exists
    pub fn setup(state: &AppState, username: &str, password: &str) -> Result<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("username is required".to_string()));
        }
        // Skip hashing when setup is clearly done; the insert re-checks atomically
        if state.sqlite.has_user()? {
            return Err(already_configured());
        }
        validate_password(password)?;

        let user = state
            .sqlite
            .create_first_user(username, password, &state.security)?
            .ok_or_else(already_configured)?;
        info!("Admin account created: {}", user.username);
        Ok(())
    }

    /// Verify credentials and issue a session token
    pub fn login(state: &AppState, username: &str, password: &str) -> Result<LoginResult> {
        let user = state
            .sqlite
            .verify_user(username.trim(), password, &state.security)?
            .ok_or_else(|| {
                warn!("Failed login attempt for {}", username);
                AppError::Auth("Invalid username or password".to_string())
            })?;

        let token = state.security.generate_session_token();
        let session = state
            .sessions
            .create(state.security.hash_token(&token), &user, Utc::now())?;

        info!("Admin logged in: {}", session.username);

        Ok(LoginResult {
            token,
            username: session.username,
            expires_at: session.expires_at,
        })
    }

    pub fn logout(state: &AppState, token: &str) -> bool {
        state.sessions.revoke(&state.security.hash_token(token))
    }

    /// Resolve a bearer token to a live session
    pub fn authenticate(state: &AppState, token: &str) -> Result<AdminSession> {
        if token.is_empty() {
            return Err(AppError::Auth("Missing session token".to_string()));
        }
        state
            .sessions
            .validate(&state.security.hash_token(token), Utc::now())
            .ok_or_else(|| AppError::Auth("Invalid or expired session".to_string()))
    }
}

fn already_configured() -> AppError {
    warn!("Setup attempted after admin already configured");
    AppError::Validation("Admin account already configured".to_string())
}

/// Length, upper, lower, digit and one special character
pub fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::Validation(
            "Password must contain an uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::Validation(
            "Password must contain a lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::Validation("Password must contain a digit".to_string()));
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(AppError::Validation(format!(
            "Password must contain one of {}",
            PASSWORD_SPECIALS
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::db::SqliteDb;
    use crate::security::{HashingManager, SecurityManager};
    use std::sync::Arc;

    fn state() -> AppState {
        let sqlite = Arc::new(SqliteDb::open_in_memory().unwrap());
        let security = Arc::new(SecurityManager::with_pepper(&HashingManager::generate_pepper()));
        AppState::from_parts(sqlite, security, ServerConfig::default())
    }

    #[test]
    fn test_password_policy() {
        assert!(validate_password("Admin#2024").is_ok());
        assert!(validate_password("Ad#1").is_err());
        assert!(validate_password("admin#2024").is_err());
        assert!(validate_password("ADMIN#2024").is_err());
        assert!(validate_password("Admin#abcd").is_err());
        assert!(validate_password("Admin2024x").is_err());
    }

    #[test]
    fn test_setup_only_once() {
        let state = state();
        AuthService::setup(&state, "admin", "Admin#2024").unwrap();
        assert!(matches!(
            AuthService::setup(&state, "second", "Admin#2024"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_login_authenticate_logout() {
        let state = state();
        AuthService::setup(&state, "admin", "Admin#2024").unwrap();

        assert!(matches!(
            AuthService::login(&state, "admin", "wrong"),
            Err(AppError::Auth(_))
        ));

        let login = AuthService::login(&state, "admin", "Admin#2024").unwrap();
        assert_eq!(login.token.len(), 64);

        let session = AuthService::authenticate(&state, &login.token).unwrap();
        assert_eq!(session.username, "admin");

        assert!(AuthService::logout(&state, &login.token));
        assert!(AuthService::authenticate(&state, &login.token).is_err());
    }

    #[test]
    fn test_concurrent_setup_admits_one_admin() {
        let state = Arc::new(state());

        let handles: Vec<_> = ["first", "second", "third"]
            .into_iter()
            .map(|name| {
                let state = state.clone();
                std::thread::spawn(move || AuthService::setup(&state, name, "Admin#2024"))
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(AppError::Validation(_)))));
    }

    #[test]
    fn test_login_fails_cleanly_when_expiry_overflows() {
        let sqlite = Arc::new(SqliteDb::open_in_memory().unwrap());
        let security = Arc::new(SecurityManager::with_pepper(&HashingManager::generate_pepper()));
        let config = ServerConfig {
            session_ttl: std::time::Duration::from_secs(u64::MAX / 2),
            ..ServerConfig::default()
        };
        let state = AppState::from_parts(sqlite, security, config);
        AuthService::setup(&state, "admin", "Admin#2024").unwrap();

        assert!(matches!(
            AuthService::login(&state, "admin", "Admin#2024"),
            Err(AppError::Internal(_))
        ));
        assert!(state.sessions.is_empty());
    }

    #[test]
    fn test_raw_token_not_stored() {
        let state = state();
        AuthService::setup(&state, "admin", "Admin#2024").unwrap();
        let login = AuthService::login(&state, "admin", "Admin#2024").unwrap();

        assert!(state.sessions.validate(&login.token, Utc::now()).is_none());
        assert!(state
            .sessions
            .validate(&state.security.hash_token(&login.token), Utc::now())
            .is_some());
    }
}
