//! Periodic removal of expired admin sessions
//!
//! Expired sessions are already rejected on access; the sweep only keeps
//! the store from growing with tokens nobody presents again.

use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Session sweeper running on a fixed interval
pub struct SessionSweeper {
    state: Arc<AppState>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(state: Arc<AppState>) -> Self {
        let interval = state.config.session_sweep_interval;
        Self { state, interval }
    }

    /// Remove expired sessions now, returns how many were dropped
    pub fn sweep(&self) -> usize {
        let removed = self.state.sessions.purge_expired(Utc::now());
        if removed > 0 {
            info!("Purged {} expired admin sessions", removed);
        } else {
            debug!("Session sweep: nothing expired");
        }
        removed
    }

    /// Spawn the sweep loop; abort the handle to stop it
    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Session sweeper started, interval {:?}", self.interval);

            let mut ticker = tokio::time::interval(self.interval);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep();
            }
        })
    }
}
