//! `/api/exam-booking` endpoints
//!
//! This backend module reads the token without a `Bearer ` prefix, so every
//! request here goes out with [`AuthScheme::Raw`].

use scholar_core::{AuthScheme, EntityId, Envelope, Method, RequestDescriptor, Result};
use scholar_transport::ApiClient;
use serde_json::json;
use std::sync::Arc;

use crate::models::{BookExam, ExamBooking, Notification, TimeSlot};

const BASE: &str = "/api/exam-booking";

/// Exam booking and notification endpoints
#[derive(Debug, Clone)]
pub struct ExamBookingApi {
    client: Arc<ApiClient>,
}

impl ExamBookingApi {
    /// Wrap a client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.client
    }

    fn request(method: Method, path: impl AsRef<str>) -> RequestDescriptor {
        RequestDescriptor::new(method, format!("{}{}", BASE, path.as_ref()))
            .with_auth(AuthScheme::Raw)
    }

    /// Open slots for an exam
    pub fn available_time_slots(&self, exam_id: &EntityId) -> Result<Vec<TimeSlot>> {
        self.client
            .call_list(&Self::request(Method::Get, format!("/time-slots/{}", exam_id)))
    }

    /// Book an exam slot
    pub fn book(&self, request: &BookExam) -> Result<ExamBooking> {
        let descriptor = Self::request(Method::Post, "/bookings")
            .with_json_body(request)
            .map_err(|e| self.client.reject_request(e))?;
        self.client.call_as(&descriptor)
    }

    /// Cancel a booking
    pub fn cancel(&self, booking_id: &EntityId, user_id: &EntityId, reason: &str) -> Result<Envelope> {
        let descriptor = Self::request(Method::Post, format!("/bookings/{}/cancel", booking_id))
            .with_json(json!({
                "userId": user_id.to_json(),
                "cancelReason": reason,
            }));
        self.client.call(&descriptor)
    }

    /// Confirm a booking
    pub fn confirm(&self, booking_id: &EntityId) -> Result<Envelope> {
        let descriptor = Self::request(Method::Post, format!("/bookings/{}/confirm", booking_id))
            .with_json(json!({}));
        self.client.call(&descriptor)
    }

    /// The current user's bookings, optionally filtered by status
    pub fn user_bookings(&self, status: Option<&str>) -> Result<Vec<ExamBooking>> {
        let descriptor =
            Self::request(Method::Get, "/bookings/user").with_optional_query("status", status);
        self.client.call_list(&descriptor)
    }

    /// One booking
    pub fn booking(&self, booking_id: &EntityId) -> Result<ExamBooking> {
        self.client
            .call_as(&Self::request(Method::Get, format!("/bookings/{}", booking_id)))
    }

    /// Every notification for the current user
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        self.client
            .call_list(&Self::request(Method::Get, "/notifications"))
    }

    /// Unread notifications only
    pub fn unread_notifications(&self) -> Result<Vec<Notification>> {
        self.client
            .call_list(&Self::request(Method::Get, "/notifications/unread"))
    }

    /// Mark one notification read
    pub fn mark_read(&self, notification_id: &EntityId) -> Result<Envelope> {
        let descriptor =
            Self::request(Method::Post, format!("/notifications/{}/read", notification_id))
                .with_json(json!({}));
        self.client.call(&descriptor)
    }

    /// Mark several notifications read in one request
    pub fn batch_mark_read(&self, notification_ids: &[EntityId]) -> Result<Envelope> {
        let ids: Vec<serde_json::Value> = notification_ids.iter().map(EntityId::to_json).collect();
        let descriptor = Self::request(Method::Post, "/notifications/batch-read")
            .with_json(serde_json::Value::Array(ids));
        self.client.call(&descriptor)
    }

    /// Booking statistics for the current user
    pub fn user_stats(&self) -> Result<serde_json::Value> {
        self.client
            .call_as(&Self::request(Method::Get, "/stats/user"))
    }
}
