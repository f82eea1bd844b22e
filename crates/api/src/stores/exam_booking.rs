use parking_lot::RwLock;
use scholar_core::{ClassifiedError, EntityId, Result};
use scholar_security::AuthStore;
use scholar_storage::CacheCollection;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::endpoints::ExamBookingApi;
use crate::models::{booking_status, BookExam, ExamBooking, TimeSlot};

/// The current user's exam bookings and per-exam time slots
#[derive(Debug)]
pub struct ExamBookingStore {
    api: ExamBookingApi,
    auth: AuthStore,
    bookings: CacheCollection<ExamBooking>,
    time_slots: RwLock<BTreeMap<EntityId, Vec<Arc<TimeSlot>>>>,
}

impl ExamBookingStore {
    /// Create an empty store
    pub fn new(api: ExamBookingApi, auth: AuthStore) -> Self {
        Self {
            api,
            auth,
            bookings: CacheCollection::new("exam_bookings"),
            time_slots: RwLock::new(BTreeMap::new()),
        }
    }

    /// The current user's bookings
    ///
    /// A status filter always goes to the backend, and its result replaces
    /// the cached list.
    pub fn fetch_user_bookings(
        &self,
        status: Option<&str>,
        force_refresh: bool,
    ) -> Result<Vec<Arc<ExamBooking>>> {
        let status = status.filter(|s| !s.is_empty());
        self.bookings
            .fetch_all(force_refresh || status.is_some(), || {
                self.api.user_bookings(status)
            })
    }

    /// One booking; a cache hit makes no request unless `force_refresh`
    pub fn fetch_by_id(
        &self,
        booking_id: &EntityId,
        force_refresh: bool,
    ) -> Result<Arc<ExamBooking>> {
        if force_refresh {
            self.bookings
                .refresh_by_id(booking_id, || self.api.booking(booking_id))
        } else {
            self.bookings
                .fetch_by_id(booking_id, || self.api.booking(booking_id))
        }
    }

    /// Open slots for an exam, always fetched fresh
    pub fn fetch_time_slots(&self, exam_id: &EntityId) -> Result<Vec<Arc<TimeSlot>>> {
        let slots: Vec<Arc<TimeSlot>> = self
            .api
            .available_time_slots(exam_id)?
            .into_iter()
            .map(Arc::new)
            .collect();
        self.time_slots
            .write()
            .insert(exam_id.clone(), slots.clone());
        Ok(slots)
    }

    /// Slots last fetched for an exam
    pub fn time_slots(&self, exam_id: &EntityId) -> Vec<Arc<TimeSlot>> {
        self.time_slots
            .read()
            .get(exam_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Book an exam slot, then reload the booking list
    ///
    /// A failed reload is logged and the new booking is kept at the front of
    /// the cached list instead.
    pub fn book(&self, request: &BookExam) -> Result<Arc<ExamBooking>> {
        let booking = self.api.book(request)?;
        if let Err(e) = self.fetch_user_bookings(None, true) {
            tracing::debug!(
                target: "scholar::cache",
                kind = %e.kind(),
                "Booking list reload failed after booking"
            );
        }
        Ok(match self.bookings.get(&booking.id) {
            Some(cached) => cached,
            None => self.bookings.insert_front(booking),
        })
    }

    /// Cancel a booking on behalf of the logged-in user
    pub fn cancel_booking(&self, booking_id: &EntityId, reason: &str) -> Result<()> {
        let user_id = self.current_user_id()?;
        self.bookings
            .mutate(
                booking_id,
                || self.api.cancel(booking_id, &user_id, reason),
                |booking, _| {
                    booking.booking_status = Some(booking_status::CANCELLED.to_string());
                    booking.cancel_reason = Some(reason.to_string());
                },
            )
            .map(|_| ())
    }

    /// Confirm a booking
    pub fn confirm_booking(&self, booking_id: &EntityId) -> Result<()> {
        self.bookings
            .mutate(
                booking_id,
                || self.api.confirm(booking_id),
                |booking, _| {
                    booking.booking_status = Some(booking_status::CONFIRMED.to_string());
                },
            )
            .map(|_| ())
    }

    /// Cached bookings that are booked or confirmed
    pub fn active_bookings(&self) -> Vec<Arc<ExamBooking>> {
        self.bookings.filter(ExamBooking::is_active)
    }

    /// Cached booking
    pub fn get(&self, booking_id: &EntityId) -> Option<Arc<ExamBooking>> {
        self.bookings.get(booking_id)
    }

    /// Every cached booking
    pub fn bookings(&self) -> Vec<Arc<ExamBooking>> {
        self.bookings.snapshot()
    }

    /// Drop everything cached
    pub fn reset(&self) {
        self.bookings.reset();
        self.time_slots.write().clear();
    }

    fn current_user_id(&self) -> Result<EntityId> {
        self.auth
            .current_user()
            .and_then(|user| user.id)
            .ok_or_else(|| {
                self.api
                    .client()
                    .reject_request(ClassifiedError::encode("no user is logged in"))
            })
    }
}
