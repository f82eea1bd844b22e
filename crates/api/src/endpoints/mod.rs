//! Endpoint wrappers
//!
//! Thin, stateless functions over [`scholar_transport::ApiClient`]: each one
//! builds a request descriptor, sends it, and decodes the payload. None of
//! them cache anything; the stores in [`crate::stores`] do.

mod exam_booking;
mod experiment;
mod user;

pub use exam_booking::ExamBookingApi;
pub use experiment::ExperimentApi;
pub use user::UserApi;
