use chrono::{SecondsFormat, Utc};
use scholar_core::{ClassifiedError, EntityId, Envelope, ErrorCause, ErrorKind, Result};
use scholar_storage::CacheCollection;
use std::sync::Arc;

use crate::endpoints::ExamBookingApi;
use crate::models::{Notification, NOTIFICATION_READ};

/// The current user's notifications
#[derive(Debug)]
pub struct NotificationStore {
    api: ExamBookingApi,
    notifications: CacheCollection<Notification>,
}

impl NotificationStore {
    /// Create an empty store
    pub fn new(api: ExamBookingApi) -> Self {
        Self {
            api,
            notifications: CacheCollection::new("notifications"),
        }
    }

    /// All notifications; served from cache unless empty or `force_refresh`
    pub fn fetch_all(&self, force_refresh: bool) -> Result<Vec<Arc<Notification>>> {
        self.notifications
            .fetch_all(force_refresh, || self.api.notifications())
    }

    /// One notification; a cache hit makes no request unless `force_refresh`
    ///
    /// There is no single-notification endpoint, so a miss reloads the whole
    /// list. An id that is not in the reloaded list is NotFound.
    pub fn fetch_by_id(
        &self,
        id: &EntityId,
        force_refresh: bool,
    ) -> Result<Arc<Notification>> {
        if !force_refresh {
            if let Some(hit) = self.notifications.get(id) {
                return Ok(hit);
            }
        }
        self.notifications
            .fetch_all(true, || self.api.notifications())?
            .into_iter()
            .find(|n| &n.id == id)
            .ok_or_else(|| {
                self.api.client().classifier().reject_payload(
                    ClassifiedError::new(
                        ErrorKind::NotFound,
                        format!("notification {} does not exist", id),
                        ErrorCause::Payload(serde_json::Value::Null),
                    ),
                    false,
                )
            })
    }

    /// Mark one notification read, then patch it in the cache
    pub fn mark_as_read(&self, id: &EntityId) -> Result<()> {
        let read_at = now();
        self.notifications
            .mutate(id, || self.api.mark_read(id), |n, _| mark_read(n, &read_at))
            .map(|_| ())
    }

    /// Mark several notifications read in one request
    ///
    /// An empty id list sends nothing.
    pub fn batch_mark_as_read(&self, ids: &[EntityId]) -> Result<Envelope> {
        if ids.is_empty() {
            return Ok(Envelope::no_content());
        }
        let read_at = now();
        self.notifications.mutate_many(
            ids,
            || self.api.batch_mark_read(ids),
            |n, _| mark_read(n, &read_at),
        )
    }

    /// Cached unread notifications
    pub fn unread(&self) -> Vec<Arc<Notification>> {
        self.notifications.filter(|n| !n.is_read())
    }

    /// Number of cached unread notifications
    pub fn unread_count(&self) -> usize {
        self.unread().len()
    }

    /// Every cached notification
    pub fn notifications(&self) -> Vec<Arc<Notification>> {
        self.notifications.snapshot()
    }

    /// Cached notification
    pub fn get(&self, id: &EntityId) -> Option<Arc<Notification>> {
        self.notifications.get(id)
    }

    /// Drop everything cached
    pub fn reset(&self) {
        self.notifications.reset();
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn mark_read(notification: &mut Notification, read_at: &str) {
    notification.send_status = Some(NOTIFICATION_READ.to_string());
    notification.read_time = Some(read_at.to_string());
}
