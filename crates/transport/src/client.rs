//! Transport adapter
//!
//! [`ApiClient::send`] turns a [`RequestDescriptor`] into exactly one
//! canonical [`Envelope`] (or raw bytes for blob requests), or into exactly
//! one [`ClassifiedError`]. A raw backend body never reaches the caller.
//!
//! # Request preparation
//!
//! - Relative paths are joined to the configured base URL; `http://` and
//!   `https://` paths are used as given.
//! - Query parameters are appended in insertion order, URL-encoded.
//! - `Authorization` is attached when a token is stored. No token is not an
//!   error; the server decides.
//! - JSON bodies are sent only with POST and PUT, with
//!   `Content-Type: application/json`. Forms carry no explicit content type
//!   so the HTTP layer can add the multipart boundary. A file part whose
//!   content type does not parse as a MIME type is rejected here.
//!
//! Requests that fail locally (bad URL, unserializable body, bad content
//! type, wrong response kind) are `ValidationFailed` and go through the
//! [`ErrorClassifier`] like any other failure.

use scholar_core::{
    AuthScheme, ClassifiedError, Envelope, FormPayload, FormValue, RequestBody,
    RequestDescriptor, ResponseKind, Result,
};
use scholar_security::AuthStore;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::backend::{HttpBackend, PreparedBody, PreparedRequest};
use crate::classify::ErrorClassifier;
use crate::config::ClientConfig;
use crate::effects::{Navigator, Notifier};

/// Result of a successful call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Normalized JSON response
    Json(Envelope),
    /// Raw body of a blob request
    Blob(Vec<u8>),
}

/// Blocking API client
///
/// Cheap to share behind an `Arc`; holds no per-call state.
pub struct ApiClient {
    config: ClientConfig,
    backend: Arc<dyn HttpBackend>,
    auth: AuthStore,
    classifier: ErrorClassifier,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client
    pub fn new(
        config: ClientConfig,
        backend: Arc<dyn HttpBackend>,
        auth: AuthStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let classifier =
            ErrorClassifier::new(auth.clone(), notifier, navigator, config.login_route.clone());
        Self {
            config,
            backend,
            auth,
            classifier,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Persisted auth state
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    /// Error classifier
    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Report a locally rejected request through the classifier
    ///
    /// For failures found before a descriptor exists, such as a body that
    /// does not serialize.
    pub fn reject_request(&self, err: ClassifiedError) -> ClassifiedError {
        self.classifier.reject_request(err, false)
    }

    /// Send a request
    pub fn send(&self, request: &RequestDescriptor) -> Result<ApiResponse> {
        let prepared = self.prepare(request)?;
        tracing::debug!(
            target: "scholar::transport",
            method = %prepared.method,
            url = %prepared.url,
            "Sending request"
        );

        let response = match self.backend.execute(prepared) {
            Ok(response) => response,
            Err(failure) => return Err(self.classifier.classify_transport(&failure)),
        };

        if !response.is_success() {
            return Err(self.classifier.classify_status(
                response.status,
                &response.body,
                request.inline_errors(),
            ));
        }

        match request.response_kind() {
            ResponseKind::Blob => Ok(ApiResponse::Blob(response.body)),
            ResponseKind::Json => scholar_wire::decode_body(&response.body)
                .map(ApiResponse::Json)
                .map_err(|failure| self.classifier.classify_wire(failure, request.inline_errors())),
        }
    }

    /// Send a JSON request and return its envelope
    pub fn call(&self, request: &RequestDescriptor) -> Result<Envelope> {
        match self.send(request)? {
            ApiResponse::Json(envelope) => Ok(envelope),
            ApiResponse::Blob(_) => Err(self.classifier.reject_request(
                ClassifiedError::encode(format!(
                    "{} expects a binary response; use download()",
                    request.path()
                )),
                request.inline_errors(),
            )),
        }
    }

    /// Send a JSON request and decode its payload
    pub fn call_as<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<T> {
        self.call(request)?
            .into_payload()
            .map_err(|e| self.classifier.reject_payload(e, request.inline_errors()))
    }

    /// Send a JSON request and decode a list payload; a null payload is empty
    pub fn call_list<T: DeserializeOwned>(&self, request: &RequestDescriptor) -> Result<Vec<T>> {
        self.call(request)?
            .into_list()
            .map_err(|e| self.classifier.reject_payload(e, request.inline_errors()))
    }

    /// Send a request and return the raw response body
    pub fn download(&self, request: &RequestDescriptor) -> Result<Vec<u8>> {
        let request = if request.response_kind() == ResponseKind::Blob {
            request.clone()
        } else {
            request.clone().expecting_blob()
        };
        match self.send(&request)? {
            ApiResponse::Blob(bytes) => Ok(bytes),
            ApiResponse::Json(_) => Err(self.classifier.reject_request(
                ClassifiedError::encode("blob request produced JSON"),
                request.inline_errors(),
            )),
        }
    }

    /// Absolute URL for a request, including its query string
    pub fn resolve_url(&self, request: &RequestDescriptor) -> Result<String> {
        self.url_for(request)
            .map_err(|e| self.classifier.reject_request(e, request.inline_errors()))
    }

    /// Resolve URL, headers and body without sending
    pub fn prepare(&self, request: &RequestDescriptor) -> Result<PreparedRequest> {
        self.build(request)
            .map_err(|e| self.classifier.reject_request(e, request.inline_errors()))
    }

    fn url_for(&self, request: &RequestDescriptor) -> Result<String> {
        let base = if request.is_absolute() {
            request.path().to_string()
        } else {
            format!(
                "{}/{}",
                self.config.base_url.trim_end_matches('/'),
                request.path().trim_start_matches('/')
            )
        };

        if request.query().is_empty() {
            return Ok(base);
        }

        let mut url = reqwest::Url::parse(&base)
            .map_err(|e| ClassifiedError::encode(format!("invalid url {:?}: {}", base, e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in request.query() {
                pairs.append_pair(key, &value.to_string());
            }
        }
        Ok(url.to_string())
    }

    fn build(&self, request: &RequestDescriptor) -> Result<PreparedRequest> {
        let url = self.url_for(request)?;
        let mut headers = Vec::new();

        if let Some(value) = self.auth.authorization(request.auth()) {
            if request.auth() == AuthScheme::Raw {
                tracing::debug!(
                    target: "scholar::transport",
                    path = request.path(),
                    "Sending raw token without Bearer prefix"
                );
            }
            headers.push(("Authorization".to_string(), value));
        }

        let body = match request.body() {
            RequestBody::Empty => PreparedBody::Empty,
            RequestBody::Json(value) if request.method().carries_json_body() => {
                PreparedBody::Json(serde_json::to_vec(value).map_err(ClassifiedError::encode)?)
            }
            RequestBody::Json(_) => {
                tracing::debug!(
                    target: "scholar::transport",
                    method = %request.method(),
                    path = request.path(),
                    "Dropping JSON body on a method that does not carry one"
                );
                PreparedBody::Empty
            }
            RequestBody::Form(form) => {
                check_content_types(form)?;
                PreparedBody::Form(form.clone())
            }
        };

        if !matches!(body, PreparedBody::Form(_)) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        Ok(PreparedRequest {
            method: request.method(),
            url,
            headers,
            body,
        })
    }
}

fn check_content_types(form: &FormPayload) -> Result<()> {
    for part in form.parts() {
        if let FormValue::File {
            content_type: Some(ct),
            ..
        } = &part.value
        {
            reqwest::blocking::multipart::Part::bytes(Vec::new())
                .mime_str(ct)
                .map_err(|e| {
                    ClassifiedError::encode(format!(
                        "form field {:?} has invalid content type {:?}: {}",
                        part.name, ct, e
                    ))
                })?;
        }
    }
    Ok(())
}
