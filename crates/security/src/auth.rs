//! Auth token and session keys
//!
//! [`AuthStore`] is a typed view over [`SessionStorage`] for the three keys
//! the client persists. It is cheap to clone; clones share the storage.

use scholar_core::{AuthScheme, EntityId};
use std::sync::Arc;

use crate::storage::{SessionStorage, StorageError};
use crate::user::UserInfo;

/// Storage key of the auth token
pub const TOKEN_KEY: &str = "token";
/// Storage key of the serialized current-user record
pub const USER_INFO_KEY: &str = "userInfo";
/// Storage key of the most recent experiment booking id
pub const CURRENT_BOOKING_KEY: &str = "currentBookingId";

const BEARER_PREFIX: &str = "Bearer ";

/// Render an `Authorization` header value for a stored token
///
/// A token that already carries the `Bearer ` prefix is never prefixed
/// twice; with [`AuthScheme::Raw`] such a prefix is stripped.
pub fn render_authorization(token: &str, scheme: AuthScheme) -> String {
    let bare = token.strip_prefix(BEARER_PREFIX).unwrap_or(token);
    match scheme {
        AuthScheme::Bearer => format!("{}{}", BEARER_PREFIX, bare),
        AuthScheme::Raw => bare.to_string(),
    }
}

/// Typed access to the persisted auth state
#[derive(Clone)]
pub struct AuthStore {
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl AuthStore {
    /// Wrap a storage backend
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Underlying storage
    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    /// Stored token; blank tokens count as absent
    pub fn token(&self) -> Option<String> {
        self.storage
            .get(TOKEN_KEY)
            .filter(|t| !t.trim().is_empty())
    }

    /// Persist the token
    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, token)
    }

    /// `Authorization` header value for the stored token, if there is one
    pub fn authorization(&self, scheme: AuthScheme) -> Option<String> {
        self.token().map(|t| render_authorization(&t, scheme))
    }

    /// Current-user record
    ///
    /// A record that no longer parses is removed and reported as absent.
    pub fn current_user(&self) -> Option<UserInfo> {
        let raw = self.storage.get(USER_INFO_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(target: "scholar::session", error = %e, "Discarding unreadable user record");
                if let Err(e) = self.storage.remove(USER_INFO_KEY) {
                    tracing::warn!(target: "scholar::session", error = %e, "Failed to remove user record");
                }
                None
            }
        }
    }

    /// Persist the current-user record
    pub fn set_current_user(&self, user: &UserInfo) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        self.storage.set(USER_INFO_KEY, &raw)
    }

    /// Persist a login: the token (when the backend sent one) and the user
    ///
    /// Both are written or neither is. If the user record cannot be stored,
    /// the token is put back to what it was before.
    pub fn sign_in(&self, token: Option<&str>, user: &UserInfo) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user)?;
        let Some(token) = token else {
            return self.storage.set(USER_INFO_KEY, &raw);
        };
        let previous = self.storage.get(TOKEN_KEY);
        self.storage.set(TOKEN_KEY, token)?;
        if let Err(e) = self.storage.set(USER_INFO_KEY, &raw) {
            let restored = match previous.as_deref() {
                Some(old) => self.storage.set(TOKEN_KEY, old),
                None => self.storage.remove(TOKEN_KEY),
            };
            if let Err(undo) = restored {
                tracing::warn!(target: "scholar::session", error = %undo, "Failed to roll back token");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Whether a current-user record is stored
    pub fn is_authenticated(&self) -> bool {
        self.current_user().is_some()
    }

    /// Most recent experiment booking id
    pub fn current_booking_id(&self) -> Option<EntityId> {
        self.storage
            .get(CURRENT_BOOKING_KEY)
            .filter(|v| !v.trim().is_empty())
            .map(EntityId::new)
    }

    /// Persist the most recent experiment booking id
    pub fn set_current_booking_id(&self, id: &EntityId) -> Result<(), StorageError> {
        self.storage.set(CURRENT_BOOKING_KEY, id.as_str())
    }

    /// Forget the most recent experiment booking id
    pub fn clear_current_booking_id(&self) -> Result<(), StorageError> {
        self.storage.remove(CURRENT_BOOKING_KEY)
    }

    /// Remove every persisted auth key
    ///
    /// All keys are attempted even if one removal fails; the first failure
    /// is returned.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_err = None;
        for key in [TOKEN_KEY, USER_INFO_KEY, CURRENT_BOOKING_KEY] {
            if let Err(e) = self.storage.remove(key) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
