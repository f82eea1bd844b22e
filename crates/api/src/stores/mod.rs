//! Domain stores
//!
//! Each store pairs an endpoint wrapper with one or more
//! [`CacheCollection`](scholar_storage::CacheCollection)s. Reads are
//! cache-then-fetch; writes go to the backend first and patch the cache only
//! once the backend accepted them.

mod exam_booking;
mod experiment;
mod notification;

pub use exam_booking::ExamBookingStore;
pub use experiment::ExperimentStore;
pub use notification::NotificationStore;
