//! `/api/users` endpoints
//!
//! Login and avatar upload are multipart forms; everything else is JSON.

use scholar_core::{
    ClassifiedError, EntityId, Envelope, FormPayload, RequestDescriptor, Result,
};
use scholar_security::UserInfo;
use scholar_transport::ApiClient;
use std::sync::Arc;

use crate::models::{LoginGrant, Registration};

const BASE: &str = "/api/users";

/// `/api/users` endpoints
#[derive(Debug, Clone)]
pub struct UserApi {
    client: Arc<ApiClient>,
}

impl UserApi {
    /// Wrap a client
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token and user record
    ///
    /// The backend reads the credentials from a multipart form, not JSON.
    /// Nothing is persisted here; see `Session::login`.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginGrant> {
        let form = FormPayload::new()
            .text("username", username)
            .text("password", password);
        let descriptor = RequestDescriptor::post(format!("{}/login", BASE)).with_form(form);
        let envelope = self.client.call(&descriptor)?;
        LoginGrant::from_payload(envelope.payload).map_err(|e| {
            self.client
                .classifier()
                .reject_payload(ClassifiedError::decode(e), descriptor.inline_errors())
        })
    }

    /// Create an account
    pub fn register(&self, registration: &Registration) -> Result<Envelope> {
        let descriptor = RequestDescriptor::post(format!("{}/register", BASE))
            .with_json_body(registration)
            .map_err(|e| self.client.reject_request(e))?;
        self.client.call(&descriptor)
    }

    /// One user
    pub fn get(&self, id: &EntityId) -> Result<UserInfo> {
        self.client
            .call_as(&RequestDescriptor::get(format!("{}/{}", BASE, id)))
    }

    /// Replace profile fields
    pub fn update_profile(&self, id: &EntityId, profile: &UserInfo) -> Result<UserInfo> {
        let descriptor = RequestDescriptor::put(format!("{}/{}", BASE, id))
            .with_json_body(profile)
            .map_err(|e| self.client.reject_request(e))?;
        self.client.call_as(&descriptor)
    }

    /// Change a password; both passwords travel as query parameters
    pub fn change_password(&self, id: &EntityId, old: &str, new: &str) -> Result<Envelope> {
        let descriptor = RequestDescriptor::put(format!("{}/{}/password", BASE, id))
            .with_query("oldPassword", old)
            .with_query("newPassword", new);
        self.client.call(&descriptor)
    }

    /// Upload a new avatar along with the profile's username and email
    pub fn upload_avatar(
        &self,
        user: &UserInfo,
        file_name: &str,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<UserInfo> {
        let Some(id) = user.id.as_ref() else {
            return Err(self
                .client
                .reject_request(ClassifiedError::encode("avatar upload needs a user id")));
        };
        let mut form = FormPayload::new();
        if let Some(username) = user.username.as_deref() {
            form = form.text("username", username);
        }
        if let Some(email) = user.email.as_deref() {
            form = form.text("email", email);
        }
        let form = form.file("avatarFile", file_name, content_type, bytes);
        let descriptor = RequestDescriptor::put(format!("{}/{}", BASE, id)).with_form(form);
        self.client.call_as(&descriptor)
    }
}
