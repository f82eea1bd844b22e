//! Persistent client state for the scholar client.
//!
//! This crate owns everything the client keeps between runs:
//! - [`SessionStorage`]: the key-value store itself ([`MemoryStorage`], [`FileStorage`])
//! - [`AuthStore`]: the auth token, current-user record and current booking id
//! - [`UserInfo`]: the current-user record with role and status helpers

#![warn(missing_docs)]

pub mod auth;
pub mod storage;
pub mod user;

pub use auth::{
    render_authorization, AuthStore, CURRENT_BOOKING_KEY, TOKEN_KEY, USER_INFO_KEY,
};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use user::{UserInfo, UserRole, UserStatus};
