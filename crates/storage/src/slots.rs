//! Per-identifier mutation slots
//!
//! Writes against the same entity are serialized; writes against different
//! entities never contend.
//!
//! # Design
//!
//! - DashMap keyed by `EntityId`, one `Mutex<()>` per identifier
//! - Guards own an `Arc` to their mutex, so a held slot never borrows the map
//! - Multi-slot acquisition locks in sorted identifier order, so two batch
//!   writes over overlapping ids cannot deadlock
//!
//! A slot is created on first write to an id, cached or not, and stays until
//! [`MutationSlots::prune_idle`] runs while nobody holds it. Collections
//! prune on reset, so the table grows with the ids written in one session.

use dashmap::DashMap;
use parking_lot::{Mutex, RawMutex};
use scholar_core::EntityId;
use std::sync::Arc;

type ArcGuard = parking_lot::lock_api::ArcMutexGuard<RawMutex, ()>;

/// Held mutation slot; released on drop
pub struct SlotGuard {
    id: EntityId,
    _guard: ArcGuard,
}

impl SlotGuard {
    /// Identifier this slot serializes
    pub fn id(&self) -> &EntityId {
        &self.id
    }
}

impl std::fmt::Debug for SlotGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotGuard").field("id", &self.id).finish()
    }
}

/// Mutation slots for one collection
#[derive(Default)]
pub struct MutationSlots {
    slots: DashMap<EntityId, Arc<Mutex<()>>>,
}

impl MutationSlots {
    /// Create an empty slot table
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the slot for `id` is free, then hold it
    pub fn acquire(&self, id: &EntityId) -> SlotGuard {
        // clone the Arc out so the shard lock is released before blocking
        let slot = self
            .slots
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();
        SlotGuard {
            id: id.clone(),
            _guard: slot.lock_arc(),
        }
    }

    /// Hold the slots for every id, acquired in sorted order
    pub fn acquire_many(&self, ids: &[EntityId]) -> Vec<SlotGuard> {
        let mut ordered: Vec<&EntityId> = ids.iter().collect();
        ordered.sort();
        ordered.dedup();
        ordered.into_iter().map(|id| self.acquire(id)).collect()
    }

    /// Drop every slot nobody holds or waits on; returns how many went
    pub fn prune_idle(&self) -> usize {
        let before = self.slots.len();
        // a holder or waiter owns a clone of the Arc
        self.slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        before.saturating_sub(self.slots.len())
    }

    /// Number of slots currently held
    pub fn in_flight(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.value().is_locked())
            .count()
    }

    /// Number of slots ever created
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot was ever created
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl std::fmt::Debug for MutationSlots {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationSlots")
            .field("slots", &self.len())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
