//! `/api/experiment` endpoints
//!
//! Experiment projects, experiment bookings, step records and reports. These
//! requests carry the token as `Bearer`. Report export is the one binary
//! response in the client and goes through [`ApiClient::download`].

use scholar_core::{
    ClassifiedError, EntityId, Envelope, ErrorCause, ErrorKind, FormPayload, RequestDescriptor,
    Result,
};
use scholar_transport::ApiClient;
use std::sync::Arc;

use crate::models::{BookExperiment, Experiment, ExperimentBooking, TimeSlot};

const BASE: &str = "/api/experiment";

/// `/api/experiment` endpoints
#[derive(Debug, Clone)]
pub struct ExperimentApi {
    client: Arc<ApiClient>,
}

impl ExperimentApi {
    /// Wrap a client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Every experiment project
    pub fn list_projects(&self) -> Result<Vec<Experiment>> {
        self.client
            .call_list(&RequestDescriptor::get(format!("{}/projects", BASE)))
    }

    /// One experiment; a null payload is NotFound
    pub fn get(&self, id: &EntityId) -> Result<Experiment> {
        let found: Option<Experiment> = self
            .client
            .call_as(&RequestDescriptor::get(format!("{}/{}", BASE, id)))?;
        found.ok_or_else(|| {
            self.client.classifier().reject_payload(
                ClassifiedError::new(
                    ErrorKind::NotFound,
                    format!("experiment {} does not exist", id),
                    ErrorCause::Payload(serde_json::Value::Null),
                ),
                false,
            )
        })
    }

    /// Book an experiment, by slot when one is given
    pub fn book(&self, request: &BookExperiment) -> Result<ExperimentBooking> {
        let path = if request.time_slot_id.is_some() {
            format!("{}/book-with-slot", BASE)
        } else {
            format!("{}/book", BASE)
        };
        let descriptor = RequestDescriptor::post(path)
            .with_json_body(request)
            .map_err(|e| self.client.reject_request(e))?;
        self.client.call_as(&descriptor)
    }

    /// One experiment booking
    pub fn booking(&self, booking_id: &EntityId) -> Result<ExperimentBooking> {
        self.client
            .call_as(&RequestDescriptor::get(format!("{}/bookings/{}", BASE, booking_id)))
    }

    /// Start an experiment
    pub fn start(&self, id: &EntityId) -> Result<Envelope> {
        let descriptor = RequestDescriptor::post(format!("{}/{}/start", BASE, id))
            .with_json(serde_json::json!({}));
        self.client.call(&descriptor)
    }

    /// Save progress on one experiment step
    pub fn save_step_record(&self, record: &serde_json::Value) -> Result<Envelope> {
        let descriptor =
            RequestDescriptor::put(format!("{}/step-record", BASE)).with_json(record.clone());
        self.client.call(&descriptor)
    }

    /// Finish an experiment
    pub fn complete(&self, record: &serde_json::Value) -> Result<Envelope> {
        let descriptor =
            RequestDescriptor::post(format!("{}/complete", BASE)).with_json(record.clone());
        self.client.call(&descriptor)
    }

    /// Set an experiment's availability status
    pub fn update_status(&self, id: &EntityId, status: i64) -> Result<Envelope> {
        let descriptor =
            RequestDescriptor::put(format!("{}/{}/status", BASE, id)).with_query("status", status);
        self.client.call(&descriptor)
    }

    /// Bookable slots for an experiment
    pub fn time_slots(&self, id: &EntityId) -> Result<Vec<TimeSlot>> {
        self.client
            .call_list(&RequestDescriptor::get(format!("{}/{}/time-slots", BASE, id)))
    }

    /// The current user's experiment records
    pub fn user_records(&self) -> Result<Vec<serde_json::Value>> {
        self.client
            .call_list(&RequestDescriptor::get(format!("{}/user-records", BASE)))
    }

    /// The current user's final report for an experiment
    pub fn final_report(&self, id: &EntityId) -> Result<serde_json::Value> {
        self.client
            .call_as(&RequestDescriptor::get(format!("{}/reports/{}", BASE, id)))
    }

    /// Exported report file, returned byte for byte
    pub fn export_report(&self, report_id: &EntityId, format: &str) -> Result<Vec<u8>> {
        let descriptor = RequestDescriptor::get(format!("{}/reports/{}/export", BASE, report_id))
            .with_query("format", format)
            .expecting_blob();
        self.client.download(&descriptor)
    }

    /// Upload a data file into an experiment record
    pub fn import_data(
        &self,
        record_id: &EntityId,
        file_name: &str,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<Envelope> {
        let form = FormPayload::new().file("file", file_name, content_type, bytes);
        let descriptor =
            RequestDescriptor::post(format!("{}/record/{}/import", BASE, record_id)).with_form(form);
        self.client.call(&descriptor)
    }
}
