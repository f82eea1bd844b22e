//! Client contract test suite
//!
//! End-to-end checks of the client against a scripted backend: every call
//! resolves to one canonical envelope or one classified error, side effects
//! fire exactly once, and the caches only change after accepted writes.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test client_contract
//! ```

mod support;

mod cache;
mod normalizer;
mod session;
mod transport;
