use scholar_core::{EntityId, Result};
use scholar_security::AuthStore;
use scholar_storage::CacheCollection;
use std::sync::Arc;

use crate::endpoints::ExperimentApi;
use crate::models::{BookExperiment, Experiment, ExperimentBooking};

/// Experiments and the current user's experiment bookings
#[derive(Debug)]
pub struct ExperimentStore {
    api: ExperimentApi,
    auth: AuthStore,
    experiments: CacheCollection<Experiment>,
    bookings: CacheCollection<ExperimentBooking>,
}

impl ExperimentStore {
    /// Create an empty store
    pub fn new(api: ExperimentApi, auth: AuthStore) -> Self {
        Self {
            api,
            auth,
            experiments: CacheCollection::new("experiments"),
            bookings: CacheCollection::new("experiment_bookings"),
        }
    }

    /// Endpoints behind this store, for uncached calls
    pub fn api(&self) -> &ExperimentApi {
        &self.api
    }

    /// All experiments; served from cache unless empty or `force_refresh`
    pub fn fetch_all(&self, force_refresh: bool) -> Result<Vec<Arc<Experiment>>> {
        self.experiments
            .fetch_all(force_refresh, || self.api.list_projects())
    }

    /// One experiment; a cache hit makes no request unless `force_refresh`
    pub fn fetch_by_id(&self, id: &EntityId, force_refresh: bool) -> Result<Arc<Experiment>> {
        if force_refresh {
            self.experiments.refresh_by_id(id, || self.api.get(id))
        } else {
            self.experiments.fetch_by_id(id, || self.api.get(id))
        }
    }

    /// Book an experiment
    ///
    /// The new booking goes to the front of the bookings list and becomes the
    /// persisted current booking.
    pub fn book(&self, request: &BookExperiment) -> Result<Arc<ExperimentBooking>> {
        let booking = self.api.book(request)?;
        if let Err(e) = self.auth.set_current_booking_id(&booking.id) {
            tracing::warn!(
                target: "scholar::session",
                booking = %booking.id,
                error = %e,
                "Failed to persist current booking"
            );
        }
        Ok(self.bookings.insert_front(booking))
    }

    /// Change an experiment's status, then patch the cached record
    pub fn update_status(&self, id: &EntityId, status: i64) -> Result<()> {
        self.experiments
            .mutate(
                id,
                || self.api.update_status(id, status),
                |experiment, _| experiment.status = status,
            )
            .map(|_| ())
    }

    /// Cached experiments of one subject
    pub fn by_subject(&self, subject: &str) -> Vec<Arc<Experiment>> {
        self.experiments
            .filter(|e| e.subject.as_deref() == Some(subject))
    }

    /// Cached experiments open for booking
    pub fn available(&self) -> Vec<Arc<Experiment>> {
        self.experiments.filter(Experiment::is_available)
    }

    /// Cached experiment
    pub fn get(&self, id: &EntityId) -> Option<Arc<Experiment>> {
        self.experiments.get(id)
    }

    /// Bookings made through this store, newest first
    pub fn bookings(&self) -> Vec<Arc<ExperimentBooking>> {
        self.bookings.snapshot()
    }

    /// Whether a full load is in flight
    pub fn is_loading(&self) -> bool {
        self.experiments.is_loading()
    }

    /// Drop everything cached
    pub fn reset(&self) {
        self.experiments.reset();
        self.bookings.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::ErrorKind;
    use scholar_transport::testing::TestHarness;
    use serde_json::json;

    fn store(h: &TestHarness) -> ExperimentStore {
        ExperimentStore::new(ExperimentApi::new(h.client.clone()), h.auth.clone())
    }

    #[test]
    fn test_fetch_all_caches() {
        let h = TestHarness::new();
        h.backend.push_json(
            200,
            json!({"success": true, "data": [
                {"id": 1, "subject": "physics", "status": 1},
                {"id": 2, "subject": "chemistry", "status": "0"},
                {"id": 3, "subject": "physics"}
            ]}),
        );
        let store = store(&h);

        assert_eq!(store.fetch_all(false).unwrap().len(), 3);
        assert_eq!(store.fetch_all(false).unwrap().len(), 3);
        assert_eq!(h.backend.calls(), 1);

        assert_eq!(store.by_subject("physics").len(), 2);
        let available: Vec<EntityId> = store.available().iter().map(|e| e.id.clone()).collect();
        assert_eq!(available, vec![EntityId::from(1)]);
    }

    #[test]
    fn test_force_refresh_failure_keeps_cache() {
        let h = TestHarness::new();
        h.backend
            .push_json(200, json!({"success": true, "data": [{"id": 1}]}));
        h.backend.push_json(500, json!({"message": "boom"}));
        let store = store(&h);

        store.fetch_all(false).unwrap();
        let err = store.fetch_all(true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ServerError);
        assert_eq!(store.fetch_all(false).unwrap().len(), 1);
        assert_eq!(h.backend.calls(), 2);
    }

    #[test]
    fn test_fetch_by_id_hit_returns_same_arc() {
        let h = TestHarness::new();
        h.backend
            .push_json(200, json!({"success": true, "data": {"id": "7", "status": "1"}}));
        let store = store(&h);

        let first = store.fetch_by_id(&EntityId::from(7), false).unwrap();
        let second = store.fetch_by_id(&EntityId::from("7"), false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.status, 1);
        assert_eq!(h.backend.calls(), 1);
    }

    #[test]
    fn test_fetch_by_id_force_refresh_replaces_record() {
        let h = TestHarness::new();
        h.backend
            .push_json(200, json!({"success": true, "data": {"id": 7, "status": 0}}));
        h.backend
            .push_json(200, json!({"success": true, "data": {"id": 7, "status": 1}}));
        let store = store(&h);

        let stale = store.fetch_by_id(&EntityId::from(7), false).unwrap();
        let fresh = store.fetch_by_id(&EntityId::from(7), true).unwrap();
        assert_eq!(stale.status, 0);
        assert_eq!(fresh.status, 1);
        assert_eq!(store.get(&EntityId::from(7)).unwrap().status, 1);
        assert_eq!(h.backend.calls(), 2);
    }

    #[test]
    fn test_book_sets_current_booking() {
        let h = TestHarness::new();
        h.backend
            .push_json(200, json!({"success": true, "data": {"id": 70, "experimentId": 1}}));
        h.backend
            .push_json(200, json!({"success": true, "data": {"id": 71, "experimentId": 2}}));
        let store = store(&h);

        let request = |exp: i64| BookExperiment {
            experiment_id: EntityId::from(exp),
            user_id: EntityId::from(5),
            time_slot_id: None,
            start_time: Some("2026-10-20T09:00:00Z".into()),
            end_time: Some("2026-10-20T10:00:00Z".into()),
        };
        store.book(&request(1)).unwrap();
        store.book(&request(2)).unwrap();

        let ids: Vec<EntityId> = store.bookings().iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec![EntityId::from(71), EntityId::from(70)]);
        assert_eq!(h.auth.current_booking_id(), Some(EntityId::from(71)));
    }

    #[test]
    fn test_update_status_patches_only_on_success() {
        let h = TestHarness::new();
        h.backend.push_json(
            200,
            json!({"success": true, "data": [{"id": 1, "status": 0}, {"id": 2, "status": 0}]}),
        );
        h.backend.push_json(200, json!({"code": 403, "message": "not yours"}));
        h.backend.push_json(200, json!({"code": 200}));
        let store = store(&h);
        store.fetch_all(false).unwrap();
        let untouched = store.get(&EntityId::from(2)).unwrap();

        let err = store.update_status(&EntityId::from(1), 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(store.get(&EntityId::from(1)).unwrap().status, 0);

        store.update_status(&EntityId::from(1), 1).unwrap();
        assert_eq!(store.get(&EntityId::from(1)).unwrap().status, 1);
        assert!(Arc::ptr_eq(&untouched, &store.get(&EntityId::from(2)).unwrap()));
    }

    #[test]
    fn test_reset() {
        let h = TestHarness::new();
        h.backend
            .push_json(200, json!({"success": true, "data": [{"id": 1}]}));
        let store = store(&h);
        store.fetch_all(false).unwrap();
        store.reset();
        assert!(store.get(&EntityId::from(1)).is_none());
        assert!(store.bookings().is_empty());
    }
}
