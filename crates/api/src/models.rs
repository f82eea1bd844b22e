//! Domain records
//!
//! Every record keeps the fields the client does not interpret in `extra`,
//! so nothing the backend sends is lost when a record is cached and printed.
//! Integer status fields go through [`lenient_int`]: the backend sends them
//! as numbers, numeric strings or not at all, and the client always sees an
//! integer (0 when missing or unreadable).

use scholar_core::json::lenient_int;
use scholar_core::EntityId;
use scholar_security::UserInfo;
use scholar_storage::Entity;
use serde::{Deserialize, Serialize};

type Extra = serde_json::Map<String, serde_json::Value>;

/// Experiment status meaning "open for booking"
pub const EXPERIMENT_AVAILABLE: i64 = 1;

/// Exam booking states
pub mod booking_status {
    /// Booked, awaiting confirmation
    pub const BOOKED: &str = "BOOKED";
    /// Confirmed
    pub const CONFIRMED: &str = "CONFIRMED";
    /// Cancelled by the user
    pub const CANCELLED: &str = "CANCELLED";
}

/// Notification delivery state once read
pub const NOTIFICATION_READ: &str = "READ";

/// Experiment project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiment {
    /// Experiment id
    pub id: EntityId,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Subject the experiment belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Availability status; 1 is open for booking
    #[serde(default, deserialize_with = "lenient_int")]
    pub status: i64,
    /// Approval status
    #[serde(
        rename = "approvalStatus",
        alias = "approval_status",
        default,
        deserialize_with = "lenient_int"
    )]
    pub approval_status: i64,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Extra,
}

impl Experiment {
    /// Open for booking
    pub fn is_available(&self) -> bool {
        self.status == EXPERIMENT_AVAILABLE
    }
}

impl Entity for Experiment {
    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}

/// Booking of an experiment slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentBooking {
    /// Booking id
    pub id: EntityId,
    /// Booked experiment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<EntityId>,
    /// Booking user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    /// Slot start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Slot end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Approval status
    #[serde(
        rename = "approvalStatus",
        alias = "approval_status",
        default,
        deserialize_with = "lenient_int"
    )]
    pub approval_status: i64,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for ExperimentBooking {
    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}

/// Exam booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamBooking {
    /// Booking id
    pub id: EntityId,
    /// Booked exam
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_id: Option<EntityId>,
    /// Booking user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<EntityId>,
    /// Human-readable booking number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_number: Option<String>,
    /// `BOOKED`, `CONFIRMED`, `CANCELLED`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_status: Option<String>,
    /// Reason given on cancellation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Extra,
}

impl ExamBooking {
    /// Booked or confirmed
    pub fn is_active(&self) -> bool {
        matches!(
            self.booking_status.as_deref(),
            Some(booking_status::BOOKED) | Some(booking_status::CONFIRMED)
        )
    }
}

impl Entity for ExamBooking {
    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}

/// User notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification id
    pub id: EntityId,
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Delivery state; `READ` once read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_status: Option<String>,
    /// When it was read, RFC 3339
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Extra,
}

impl Notification {
    /// Whether it has been read
    pub fn is_read(&self) -> bool {
        self.send_status.as_deref() == Some(NOTIFICATION_READ)
    }
}

impl Entity for Notification {
    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}

/// Bookable time slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Slot id
    pub id: EntityId,
    /// Start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// End
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Uninterpreted fields
    #[serde(flatten)]
    pub extra: Extra,
}

impl Entity for TimeSlot {
    fn entity_id(&self) -> EntityId {
        self.id.clone()
    }
}

/// Experiment booking request
///
/// With a `time_slot_id` the booking goes to the slot endpoint; otherwise
/// `start_time` and `end_time` describe the requested range.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookExperiment {
    /// Experiment to book
    pub experiment_id: EntityId,
    /// Booking user
    pub user_id: EntityId,
    /// Predefined slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slot_id: Option<EntityId>,
    /// Requested start
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Requested end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// Exam booking request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookExam {
    /// Exam to book
    pub exam_id: EntityId,
    /// Booking user
    pub user_id: EntityId,
    /// Chosen slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slot_id: Option<EntityId>,
}

/// Account registration
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Any other registration fields
    #[serde(flatten)]
    pub extra: Extra,
}

/// What a successful login returns
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    /// Auth token, when the backend issues one
    pub token: Option<String>,
    /// The logged-in user
    pub user: UserInfo,
}

impl LoginGrant {
    /// Read a login payload
    ///
    /// Accepts `{token, user}` (or `userInfo`) as well as a bare user record
    /// that carries its token inline.
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut map = match payload {
            serde_json::Value::Object(map) => map,
            other => {
                return Ok(Self {
                    token: None,
                    user: serde_json::from_value(other)?,
                })
            }
        };
        let token = ["token", "accessToken"]
            .iter()
            .find_map(|key| map.remove(*key))
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|t| !t.trim().is_empty());
        let user_value = ["user", "userInfo"]
            .iter()
            .find_map(|key| map.remove(*key))
            .unwrap_or(serde_json::Value::Object(map));
        Ok(Self {
            token,
            user: serde_json::from_value(user_value)?,
        })
    }
}
