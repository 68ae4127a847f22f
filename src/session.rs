// Session store
// Client-side belief about whether the user is signed in, derived only from token validation

use crate::api::{RemoteApi, TokenValidation};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    // No validation has completed yet
    Unknown,
    Authenticated { user_id: String },
    Unauthenticated,
}

impl AuthStatus {
    /// `None` while the first validation is still outstanding, so callers
    /// can hold off rendering logged-out UI.
    pub fn is_authenticated(&self) -> Option<bool> {
        match self {
            AuthStatus::Unknown => None,
            AuthStatus::Authenticated { .. } => Some(true),
            AuthStatus::Unauthenticated => Some(false),
        }
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            AuthStatus::Authenticated { user_id } => Some(user_id),
            _ => None,
        }
    }
}

/// `refresh` is the only write path. Each refresh takes a generation number;
/// a response that arrives after a newer refresh has started is dropped.
pub struct SessionStore {
    status: RwLock<AuthStatus>,
    generation: AtomicU64,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            status: RwLock::new(AuthStatus::Unknown),
            generation: AtomicU64::new(0),
        }
    }

    pub fn status(&self) -> AuthStatus {
        self.status.read().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.status.read().is_authenticated() == Some(true)
    }

    /// Re-validates the stored credential against the Remote API. A
    /// transport failure counts as unauthenticated.
    pub async fn refresh(&self, api: &dyn RemoteApi) -> AuthStatus {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "validating session token");

        let status = match api.validate_token().await {
            Ok(TokenValidation::Authenticated { user_id }) => AuthStatus::Authenticated { user_id },
            Ok(TokenValidation::Unauthenticated) => AuthStatus::Unauthenticated,
            Err(e) => {
                warn!(error = %e, "token validation failed");
                AuthStatus::Unauthenticated
            }
        };

        let mut current = self.status.write();
        let latest = self.generation.load(Ordering::SeqCst);
        if generation != latest {
            debug!(generation, latest, "discarding stale token validation");
            return current.clone();
        }

        if *current != status {
            info!(from = ?*current, to = ?status, "session status changed");
        }
        *current = status.clone();
        status
    }
}
