//! Cached entity collection
//!
//! An ordered list of records keyed by [`EntityId`], owned by exactly one
//! store. Callers get `Arc` read handles; every write goes through the
//! collection's methods.
//!
//! # Design
//!
//! - Records are `Arc<E>`: reads hand out cheap clones, and a patch swaps
//!   only the target's `Arc`, so every other record keeps its allocation
//! - The lock is never held across a load or write closure; those run the
//!   network call
//! - A failed load leaves the collection exactly as it was
//! - Writes to the same id serialize through [`MutationSlots`]
//!
//! # Entry states
//!
//! ```text
//! Absent --fetch--> Loading --ok--> Present
//!                   Loading --err-> Absent
//! Present --refresh/mutate--> Loading --> Present'
//! ```
//!
//! There is no expiry. Entries live until the collection is reset or a
//! forced refresh replaces them.
//!
//! # Reset
//!
//! [`reset`](CacheCollection::reset) bumps a generation counter. A load or
//! write that started before the reset still returns its result to its
//! caller, but never lands in the cache.

use parking_lot::RwLock;
use scholar_core::EntityId;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::slots::MutationSlots;

/// A record that can live in a [`CacheCollection`]
pub trait Entity: Clone + Send + Sync + 'static {
    /// Canonical identifier
    fn entity_id(&self) -> EntityId;
}

/// Load state of one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Not cached and not being loaded
    Absent,
    /// A fetch or write for it is in flight
    Loading,
    /// Cached
    Present,
}

struct State<E> {
    records: Vec<Arc<E>>,
    generation: u64,
    // in-flight counts; overlapping loads each hold their own mark
    loading_all: usize,
    loading_ids: HashMap<EntityId, usize>,
}

impl<E> Default for State<E> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            generation: 0,
            loading_all: 0,
            loading_ids: HashMap::new(),
        }
    }
}

impl<E: Entity> State<E> {
    fn position(&self, id: &EntityId) -> Option<usize> {
        self.records.iter().position(|r| &r.entity_id() == id)
    }

    fn begin_id(&mut self, id: &EntityId) -> u64 {
        *self.loading_ids.entry(id.clone()).or_insert(0) += 1;
        self.generation
    }

    /// Drop one in-flight mark for `id`; returns whether `generation` is
    /// still current
    fn end_id(&mut self, id: &EntityId, generation: u64) -> bool {
        if self.generation != generation {
            // reset already cleared every mark
            return false;
        }
        if let Some(count) = self.loading_ids.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                self.loading_ids.remove(id);
            }
        }
        true
    }
}

/// Session-scoped cache of one entity type
pub struct CacheCollection<E: Entity> {
    name: &'static str,
    state: RwLock<State<E>>,
    slots: MutationSlots,
}

impl<E: Entity> CacheCollection<E> {
    /// Create an empty collection; `name` labels its log events
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: RwLock::new(State::default()),
            slots: MutationSlots::new(),
        }
    }

    /// Collection name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of cached records
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    /// Every cached record, in order
    pub fn snapshot(&self) -> Vec<Arc<E>> {
        self.state.read().records.clone()
    }

    /// Cached records matching `pred`, in order
    pub fn filter(&self, mut pred: impl FnMut(&E) -> bool) -> Vec<Arc<E>> {
        self.state
            .read()
            .records
            .iter()
            .filter(|r| pred(r))
            .cloned()
            .collect()
    }

    /// Cached record by id
    pub fn get(&self, id: &EntityId) -> Option<Arc<E>> {
        let state = self.state.read();
        state.position(id).map(|i| Arc::clone(&state.records[i]))
    }

    /// Whether a record with `id` is cached
    pub fn contains(&self, id: &EntityId) -> bool {
        self.state.read().position(id).is_some()
    }

    /// Load state of one entry
    pub fn state(&self, id: &EntityId) -> EntryState {
        let state = self.state.read();
        if state.loading_ids.contains_key(id) {
            EntryState::Loading
        } else if state.position(id).is_some() {
            EntryState::Present
        } else if state.loading_all > 0 {
            EntryState::Loading
        } else {
            EntryState::Absent
        }
    }

    /// Whether any load or write is in flight
    pub fn is_loading(&self) -> bool {
        let state = self.state.read();
        state.loading_all > 0 || !state.loading_ids.is_empty()
    }

    /// Resets so far
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Cached records, loading them when the cache is empty or `force` is set
    ///
    /// A non-empty cache without `force` is returned without calling `load`.
    /// On success the loaded records replace the cache; on failure the cache
    /// is left untouched and the error is returned. Records loaded across a
    /// [`reset`](Self::reset) are returned but not cached.
    pub fn fetch_all<X>(
        &self,
        force: bool,
        load: impl FnOnce() -> Result<Vec<E>, X>,
    ) -> Result<Vec<Arc<E>>, X> {
        let generation = {
            let mut state = self.state.write();
            if !force && !state.records.is_empty() {
                tracing::debug!(target: "scholar::cache", collection = self.name, len = state.records.len(), "Cache hit");
                return Ok(state.records.clone());
            }
            state.loading_all += 1;
            state.generation
        };

        tracing::debug!(target: "scholar::cache", collection = self.name, force, "Loading collection");
        let loaded = load();

        let mut state = self.state.write();
        let current = state.generation == generation;
        if current {
            state.loading_all -= 1;
        }
        match loaded {
            Ok(records) if current => {
                state.records = records.into_iter().map(Arc::new).collect();
                Ok(state.records.clone())
            }
            Ok(records) => {
                tracing::debug!(target: "scholar::cache", collection = self.name, "Collection reset during load, result not cached");
                Ok(records.into_iter().map(Arc::new).collect())
            }
            Err(e) => {
                tracing::debug!(target: "scholar::cache", collection = self.name, "Load failed, cache unchanged");
                Err(e)
            }
        }
    }

    /// Cached record by id, loading and appending it on a miss
    ///
    /// A hit returns the cached `Arc` itself, so repeated lookups yield the
    /// same reference.
    pub fn fetch_by_id<X>(
        &self,
        id: &EntityId,
        load: impl FnOnce() -> Result<E, X>,
    ) -> Result<Arc<E>, X> {
        if let Some(hit) = self.get(id) {
            return Ok(hit);
        }
        self.load_entry(id, load)
    }

    /// Load one record and store it, replacing any cached copy
    pub fn refresh_by_id<X>(
        &self,
        id: &EntityId,
        load: impl FnOnce() -> Result<E, X>,
    ) -> Result<Arc<E>, X> {
        self.load_entry(id, load)
    }

    fn load_entry<X>(
        &self,
        id: &EntityId,
        load: impl FnOnce() -> Result<E, X>,
    ) -> Result<Arc<E>, X> {
        let generation = self.state.write().begin_id(id);
        tracing::debug!(target: "scholar::cache", collection = self.name, id = %id, "Loading entry");
        let loaded = load();

        let mut state = self.state.write();
        let current = state.end_id(id, generation);
        let record = Arc::new(loaded?);
        if !current {
            tracing::debug!(target: "scholar::cache", collection = self.name, id = %id, "Collection reset during load, entry not cached");
            return Ok(record);
        }
        match state.position(id) {
            // another caller landed first; last response wins
            Some(i) => state.records[i] = Arc::clone(&record),
            None => state.records.push(Arc::clone(&record)),
        }
        Ok(record)
    }

    /// Replace the whole collection
    pub fn replace_all(&self, records: Vec<E>) {
        self.state.write().records = records.into_iter().map(Arc::new).collect();
    }

    /// Insert a record at the front, replacing any cached record with its id
    pub fn insert_front(&self, record: E) -> Arc<E> {
        let record = Arc::new(record);
        let id = record.entity_id();
        let mut state = self.state.write();
        if let Some(i) = state.position(&id) {
            state.records.remove(i);
        }
        state.records.insert(0, Arc::clone(&record));
        record
    }

    /// Replace the cached record with the same id in place, or append
    pub fn upsert(&self, record: E) -> Arc<E> {
        let record = Arc::new(record);
        let id = record.entity_id();
        let mut state = self.state.write();
        match state.position(&id) {
            Some(i) => state.records[i] = Arc::clone(&record),
            None => state.records.push(Arc::clone(&record)),
        }
        record
    }

    /// Remove a record
    pub fn remove(&self, id: &EntityId) -> Option<Arc<E>> {
        let mut state = self.state.write();
        state.position(id).map(|i| state.records.remove(i))
    }

    /// Apply `f` to a copy of the record with `id` and swap it in
    ///
    /// Returns `false` when no such record is cached. No other record is
    /// touched.
    pub fn patch(&self, id: &EntityId, f: impl FnOnce(&mut E)) -> bool {
        let mut state = self.state.write();
        Self::patch_locked(&mut state, id, f)
    }

    fn patch_locked(state: &mut State<E>, id: &EntityId, f: impl FnOnce(&mut E)) -> bool {
        let Some(i) = state.position(id) else {
            return false;
        };
        let mut updated = E::clone(&state.records[i]);
        f(&mut updated);
        state.records[i] = Arc::new(updated);
        true
    }

    /// [`patch`](Self::patch) every record whose id is in `ids`; returns how
    /// many were patched
    pub fn patch_many(&self, ids: &[EntityId], f: impl FnMut(&mut E)) -> usize {
        let mut state = self.state.write();
        Self::patch_many_locked(&mut state, ids, f)
    }

    fn patch_many_locked(
        state: &mut State<E>,
        ids: &[EntityId],
        mut f: impl FnMut(&mut E),
    ) -> usize {
        let wanted: HashSet<&EntityId> = ids.iter().collect();
        let mut patched = 0;
        for slot in state.records.iter_mut() {
            if wanted.contains(&slot.entity_id()) {
                let mut updated = E::clone(slot);
                f(&mut updated);
                *slot = Arc::new(updated);
                patched += 1;
            }
        }
        patched
    }

    /// Run a write for `id`, then patch the cached record with its result
    ///
    /// Writes to the same id are serialized. The patch is applied only when
    /// the write succeeds; a failed write leaves the cache untouched. A
    /// successful write for a record that is not cached patches nothing, and
    /// neither does one that straddles a [`reset`](Self::reset).
    pub fn mutate<T, X>(
        &self,
        id: &EntityId,
        write: impl FnOnce() -> Result<T, X>,
        patch: impl FnOnce(&mut E, &T),
    ) -> Result<T, X> {
        let _slot = self.slots.acquire(id);
        let generation = self.state.write().begin_id(id);
        let outcome = write();

        let mut state = self.state.write();
        let current = state.end_id(id, generation);
        let value = outcome?;
        let applied = current && Self::patch_locked(&mut state, id, |record| patch(record, &value));
        tracing::debug!(target: "scholar::cache", collection = self.name, id = %id, applied, "Write succeeded");
        Ok(value)
    }

    /// [`mutate`](Self::mutate) over several ids with one write
    pub fn mutate_many<T, X>(
        &self,
        ids: &[EntityId],
        write: impl FnOnce() -> Result<T, X>,
        mut patch: impl FnMut(&mut E, &T),
    ) -> Result<T, X> {
        let _slots = self.slots.acquire_many(ids);
        let generation = self.generation();
        let value = write()?;

        let mut state = self.state.write();
        let applied = if state.generation == generation {
            Self::patch_many_locked(&mut state, ids, |record| patch(record, &value))
        } else {
            0
        };
        tracing::debug!(target: "scholar::cache", collection = self.name, requested = ids.len(), applied, "Batch write succeeded");
        Ok(value)
    }

    /// Writes currently holding a slot
    pub fn writes_in_flight(&self) -> usize {
        self.slots.in_flight()
    }

    /// Drop every cached record and idle write slot
    ///
    /// Loads and writes still in flight finish for their callers but leave
    /// the cache empty.
    pub fn reset(&self) {
        let mut state = self.state.write();
        state.records.clear();
        state.loading_all = 0;
        state.loading_ids.clear();
        state.generation += 1;
        let pruned = self.slots.prune_idle();
        tracing::debug!(target: "scholar::cache", collection = self.name, generation = state.generation, pruned, "Collection reset");
    }
}

impl<E: Entity> std::fmt::Debug for CacheCollection<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheCollection")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("loading", &self.is_loading())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: EntityId,
        status: i64,
        label: String,
    }

    impl Entity for Item {
        fn entity_id(&self) -> EntityId {
            self.id.clone()
        }
    }

    fn item(id: i64, status: i64) -> Item {
        Item {
            id: EntityId::from(id),
            status,
            label: format!("item-{}", id),
        }
    }

    fn seeded(n: i64) -> CacheCollection<Item> {
        let c = CacheCollection::new("items");
        c.replace_all((1..=n).map(|i| item(i, 0)).collect());
        c
    }

    #[test]
    fn test_fetch_all_uses_cache_unless_forced() {
        let c = CacheCollection::new("items");
        let calls = Cell::new(0);
        let load = || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(vec![item(1, 0), item(2, 0)])
        };

        assert_eq!(c.fetch_all(false, load).unwrap().len(), 2);
        assert_eq!(c.fetch_all(false, load).unwrap().len(), 2);
        assert_eq!(calls.get(), 1);

        c.fetch_all(true, load).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_fetch_all_failure_leaves_cache() {
        let c = seeded(2);
        let before = c.snapshot();
        let err = c.fetch_all(true, || Err::<Vec<Item>, _>("offline")).unwrap_err();
        assert_eq!(err, "offline");

        let after = c.snapshot();
        assert_eq!(before.len(), after.len());
        assert!(before.iter().zip(&after).all(|(a, b)| Arc::ptr_eq(a, b)));
        assert!(!c.is_loading());
    }

    #[test]
    fn test_fetch_by_id_miss_then_hit() {
        let c: CacheCollection<Item> = CacheCollection::new("items");
        let id = EntityId::from(42);
        let calls = Cell::new(0);

        let first = c
            .fetch_by_id(&id, || {
                calls.set(calls.get() + 1);
                Ok::<_, ()>(item(42, 1))
            })
            .unwrap();
        let second = c
            .fetch_by_id(&id, || {
                calls.set(calls.get() + 1);
                Ok::<_, ()>(item(42, 2))
            })
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(c.state(&id), EntryState::Present);
    }

    #[test]
    fn test_fetch_by_id_string_and_number_ids_match() {
        let c = seeded(3);
        let hit = c
            .fetch_by_id(&EntityId::from("2"), || Err::<Item, _>("should not load"))
            .unwrap();
        assert_eq!(hit.label, "item-2");
    }

    #[test]
    fn test_failed_initial_load_leaves_no_entry() {
        let c: CacheCollection<Item> = CacheCollection::new("items");
        let id = EntityId::from(7);
        assert_eq!(c.state(&id), EntryState::Absent);
        assert!(c.fetch_by_id(&id, || Err::<Item, _>("404")).is_err());
        assert_eq!(c.state(&id), EntryState::Absent);
        assert!(c.is_empty());
    }

    #[test]
    fn test_state_is_loading_during_load() {
        let c: CacheCollection<Item> = CacheCollection::new("items");
        let id = EntityId::from(5);
        c.fetch_by_id(&id, || {
            assert_eq!(c.state(&EntityId::from(5)), EntryState::Loading);
            Ok::<_, ()>(item(5, 0))
        })
        .unwrap();
    }

    #[test]
    fn test_mutate_patches_only_target() {
        let c = seeded(4);
        let before = c.snapshot();

        let result = c.mutate(
            &EntityId::from(3),
            || Ok::<_, ()>(9),
            |record, status| record.status = *status,
        );
        assert_eq!(result, Ok(9));

        let after = c.snapshot();
        for (a, b) in before.iter().zip(&after) {
            if a.id == EntityId::from(3) {
                assert!(!Arc::ptr_eq(a, b));
                assert_eq!(b.status, 9);
            } else {
                assert!(Arc::ptr_eq(a, b));
            }
        }
    }

    #[test]
    fn test_failed_mutate_applies_nothing() {
        let c = seeded(2);
        let before = c.snapshot();
        let result = c.mutate(
            &EntityId::from(1),
            || Err::<i64, _>("rejected"),
            |record, status| record.status = *status,
        );
        assert_eq!(result, Err("rejected"));
        assert!(before.iter().zip(&c.snapshot()).all(|(a, b)| Arc::ptr_eq(a, b)));
        assert_eq!(c.writes_in_flight(), 0);
    }

    #[test]
    fn test_mutate_many() {
        let c = seeded(4);
        let ids = vec![EntityId::from(1), EntityId::from(4), EntityId::from(99)];
        c.mutate_many(&ids, || Ok::<_, ()>(()), |record, _| record.status = 1)
            .unwrap();
        let statuses: Vec<i64> = c.snapshot().iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_insert_front_and_upsert() {
        let c = seeded(2);
        c.insert_front(item(10, 0));
        c.insert_front(item(2, 5));
        let ids: Vec<String> = c.snapshot().iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["2", "10", "1"]);

        c.upsert(item(1, 7));
        c.upsert(item(11, 0));
        assert_eq!(c.get(&EntityId::from(1)).unwrap().status, 7);
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn test_remove_filter_reset() {
        let c = seeded(3);
        assert!(c.remove(&EntityId::from(2)).is_some());
        assert!(c.remove(&EntityId::from(2)).is_none());
        assert_eq!(c.filter(|r| r.status == 0).len(), 2);
        c.reset();
        assert!(c.is_empty());
    }

    #[test]
    fn test_reset_during_fetch_all_is_not_cached() {
        let c: CacheCollection<Item> = CacheCollection::new("items");
        let loaded = c
            .fetch_all(false, || {
                c.reset();
                Ok::<_, ()>(vec![item(1, 0)])
            })
            .unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(c.len(), 0);
        assert!(!c.is_loading());
        assert_eq!(c.generation(), 1);
    }

    #[test]
    fn test_reset_during_fetch_by_id_is_not_cached() {
        let c: CacheCollection<Item> = CacheCollection::new("items");
        let id = EntityId::from(3);
        c.fetch_by_id(&id, || {
            c.reset();
            Ok::<_, ()>(item(3, 0))
        })
        .unwrap();

        assert!(c.is_empty());
        assert_eq!(c.state(&id), EntryState::Absent);
    }

    #[test]
    fn test_reset_during_mutate_patches_nothing() {
        let c = seeded(2);
        c.mutate(
            &EntityId::from(1),
            || {
                c.reset();
                c.replace_all(vec![item(1, 0)]);
                Ok::<_, ()>(5)
            },
            |record, status| record.status = *status,
        )
        .unwrap();

        assert_eq!(c.get(&EntityId::from(1)).unwrap().status, 0);
    }

    #[test]
    fn test_overlapping_loads_keep_loading_mark() {
        let c: CacheCollection<Item> = CacheCollection::new("items");
        let id = EntityId::from(5);
        c.fetch_by_id(&id, || {
            c.refresh_by_id(&id, || Ok::<_, ()>(item(5, 1))).unwrap();
            assert_eq!(c.state(&id), EntryState::Loading);
            Ok::<_, ()>(item(5, 2))
        })
        .unwrap();

        assert_eq!(c.state(&id), EntryState::Present);
        assert_eq!(c.get(&id).unwrap().status, 2);
        assert!(!c.is_loading());
    }

    #[test]
    fn test_reset_prunes_idle_slots() {
        let c = seeded(2);
        c.mutate(&EntityId::from(99), || Ok::<_, ()>(()), |_, _| {})
            .unwrap();
        assert_eq!(c.slots.len(), 1);
        c.reset();
        assert!(c.slots.is_empty());
    }
}
