//! Session state machine.
//!
//! [`AuthState`] is a plain value with a pure transition function,
//! [`AuthState::reduce`]. [`AuthStore`] owns the current state plus a
//! [`Storage`] backend and persists each transition after it is applied.
//!
//! ```text
//!              Login / Register
//!  anonymous ────────────────────▶ authenticated ──┐ ProfileUpdate
//!      ▲                                │  ▲───────┘ (user only)
//!      └────────────── Logout ──────────┘
//! ```
//!
//! The state is authenticated only when both a user and a token are present.
//! A half-written session found in storage is discarded on load.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::storage::{Storage, TOKEN_KEY, USER_KEY};
use crate::api::types::UserProfile;
use crate::errors::StorageError;

/// Current session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub user: Option<UserProfile>,
    pub token: Option<String>,
    pub is_authenticated: bool,
}

/// Transitions accepted by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    Login { user: UserProfile, token: String },
    Register { user: UserProfile, token: String },
    Logout,
    /// Replace the profile; the token is untouched.
    ProfileUpdate { user: UserProfile },
}

impl AuthState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: UserProfile, token: impl Into<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token.into()),
            is_authenticated: true,
        }
    }

    /// Apply `action` to this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use coderev::api::types::UserProfile;
    /// use coderev::auth::{AuthAction, AuthState};
    ///
    /// let state = AuthState::anonymous().reduce(&AuthAction::Login {
    ///     user: UserProfile::named("A"),
    ///     token: "T".into(),
    /// });
    /// assert!(state.is_authenticated);
    /// assert_eq!(state.token.as_deref(), Some("T"));
    ///
    /// let state = state.reduce(&AuthAction::Logout);
    /// assert_eq!(state, AuthState::anonymous());
    /// ```
    pub fn reduce(&self, action: &AuthAction) -> Self {
        match action {
            AuthAction::Login { user, token } | AuthAction::Register { user, token } => {
                Self::authenticated(user.clone(), token.clone())
            }
            AuthAction::Logout => Self::anonymous(),
            AuthAction::ProfileUpdate { user } if self.is_authenticated => Self {
                user: Some(user.clone()),
                ..self.clone()
            },
            AuthAction::ProfileUpdate { .. } => self.clone(),
        }
    }

    /// Id of the signed-in user, when known.
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.id.as_deref())
    }
}

/// Session state plus its durable storage.
pub struct AuthStore<S: Storage> {
    state: AuthState,
    storage: S,
}

impl<S: Storage> AuthStore<S> {
    /// Build the initial state from `storage`.
    ///
    /// Both a token and a parseable user must be present; anything less is
    /// treated as a corrupted session, cleared, and loaded as anonymous.
    pub fn load(storage: S) -> Self {
        let raw_token = read_or_warn(&storage, TOKEN_KEY);
        let raw_user = read_or_warn(&storage, USER_KEY);
        let user = raw_user
            .as_deref()
            .and_then(|raw| match serde_json::from_str::<UserProfile>(raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "stored user profile is not valid JSON");
                    None
                }
            });

        let state = match (user, raw_token.clone().filter(|t| !t.is_empty())) {
            (Some(user), Some(token)) => AuthState::authenticated(user, token),
            (None, None) if raw_user.is_none() && raw_token.is_none() => AuthState::anonymous(),
            _ => {
                warn!("discarding incomplete stored session");
                for key in [USER_KEY, TOKEN_KEY] {
                    if let Err(e) = storage.remove(key) {
                        warn!(key, error = %e, "failed to clear stored session key");
                    }
                }
                AuthState::anonymous()
            }
        };
        debug!(authenticated = state.is_authenticated, "session loaded");
        Self { state, storage }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply `action`, then persist the resulting state.
    ///
    /// The in-memory state is updated even if persisting fails.
    pub fn dispatch(&mut self, action: AuthAction) -> Result<(), StorageError> {
        let next = self.state.reduce(&action);
        let changed = next != self.state;
        self.state = next;

        match &action {
            AuthAction::Login { .. } | AuthAction::Register { .. } => {
                self.persist_user()?;
                if let Some(token) = &self.state.token {
                    self.storage.set(TOKEN_KEY, token)?;
                }
            }
            AuthAction::Logout => {
                self.storage.remove(USER_KEY)?;
                self.storage.remove(TOKEN_KEY)?;
            }
            AuthAction::ProfileUpdate { .. } if changed => self.persist_user()?,
            AuthAction::ProfileUpdate { .. } => {
                debug!("profile update ignored for anonymous session");
            }
        }
        Ok(())
    }

    fn persist_user(&self) -> Result<(), StorageError> {
        if let Some(user) = &self.state.user {
            // UserProfile contains only strings, serialization cannot fail.
            let json = serde_json::to_string(user).unwrap_or_default();
            self.storage.set(USER_KEY, &json)?;
        }
        Ok(())
    }
}

fn read_or_warn<S: Storage>(storage: &S, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(v) => v,
        Err(e) => {
            warn!(key, error = %e, "failed to read stored session");
            None
        }
    }
}
