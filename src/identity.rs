//! Identity resolution for the current user.
//!
//! The sync engine never opens a push subscription for an anonymous user,
//! so identity is resolved before subscribing. `Ok(None)` from
//! [`IdentityProvider::current_user_id`] means "not yet authenticated" and
//! is a normal state, not an error; the engine degrades to pull-only.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Error type for identity resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The auth service could not be reached.
    Unavailable(String),
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityError::Unavailable(msg) => write!(f, "identity unavailable: {}", msg),
        }
    }
}

impl Error for IdentityError {}

/// Source of the current user's identity and credentials.
pub trait IdentityProvider: Send + Sync {
    /// Resolve the current user id. `Ok(None)` means not authenticated.
    fn current_user_id(&self) -> Result<Option<String>, IdentityError>;

    /// Bearer token for authenticated backends, when available.
    fn access_token(&self) -> Result<Option<String>, IdentityError> {
        Ok(None)
    }
}

#[derive(Debug, Default)]
struct IdentityState {
    user_id: Option<String>,
    access_token: Option<String>,
}

/// In-memory identity provider for testing and single-process scenarios.
///
/// Sign-in state can be changed at any time; clones share the same state.
#[derive(Clone, Default)]
pub struct StaticIdentity {
    state: Arc<RwLock<IdentityState>>,
    fail_next: Arc<AtomicBool>,
}

impl StaticIdentity {
    /// An identity that resolves to "not authenticated".
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An identity signed in as the given user.
    pub fn user(user_id: impl Into<String>) -> Self {
        let identity = Self::default();
        identity.sign_in(user_id);
        identity
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.state.write().unwrap().access_token = Some(token.into());
        self
    }

    pub fn sign_in(&self, user_id: impl Into<String>) {
        self.state.write().unwrap().user_id = Some(user_id.into());
    }

    pub fn sign_out(&self) {
        let mut state = self.state.write().unwrap();
        state.user_id = None;
        state.access_token = None;
    }

    /// Make the next resolution fail, to exercise degraded paths.
    pub fn fail_next_resolution(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user_id(&self) -> Result<Option<String>, IdentityError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(IdentityError::Unavailable(
                "injected resolution failure".to_string(),
            ));
        }
        Ok(self.state.read().unwrap().user_id.clone())
    }

    fn access_token(&self) -> Result<Option<String>, IdentityError> {
        Ok(self.state.read().unwrap().access_token.clone())
    }
}
