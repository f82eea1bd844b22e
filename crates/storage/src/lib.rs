//! Client cache store for the scholar client.
//!
//! A [`CacheCollection`] holds one entity type for the lifetime of a
//! session: cache-then-fetch reads, optimistic patches after successful
//! writes, and per-identifier write serialization through [`MutationSlots`].

#![warn(missing_docs)]

pub mod collection;
pub mod slots;

pub use collection::{CacheCollection, Entity, EntryState};
pub use slots::{MutationSlots, SlotGuard};
