//! HTTP backend seam
//!
//! [`HttpBackend`] executes one fully prepared request and returns the raw
//! status and body. It knows nothing about envelopes, auth or
//! classification; that all happens in [`crate::ApiClient`]. The production
//! implementation is [`ReqwestBackend`]; tests script responses instead.

use scholar_core::{FormPayload, FormValue, Method};
use std::time::Duration;
use thiserror::Error;

/// Body ready to be put on the wire
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedBody {
    /// No body
    Empty,
    /// Serialized JSON
    Json(Vec<u8>),
    /// Multipart form; the backend generates the boundary
    Form(FormPayload),
}

impl PreparedBody {
    /// Parse a JSON body back into a value
    pub fn json(&self) -> Option<serde_json::Value> {
        match self {
            PreparedBody::Json(bytes) => serde_json::from_slice(bytes).ok(),
            _ => None,
        }
    }
}

/// A request with URL, headers and body resolved
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL including the query string
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Body
    pub body: PreparedBody,
}

impl PreparedRequest {
    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a response that was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Build a response
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// No response was received
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failure: {0}")]
pub struct TransportFailure(pub String);

/// Executes prepared requests
pub trait HttpBackend: Send + Sync {
    /// Send the request and wait for the full response
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportFailure>;
}

/// Blocking HTTP backend on `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::blocking::Client,
}

impl ReqwestBackend {
    /// Build a backend; `None` means requests never time out
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportFailure> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportFailure(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl HttpBackend for ReqwestBackend {
    fn execute(&self, request: PreparedRequest) -> Result<RawResponse, TransportFailure> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            PreparedBody::Empty => builder,
            PreparedBody::Json(bytes) => builder.body(bytes),
            PreparedBody::Form(form) => builder.multipart(multipart_form(form)?),
        };

        let response = builder
            .send()
            .map_err(|e| TransportFailure(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| TransportFailure(format!("failed to read response body: {}", e)))?;
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

fn multipart_form(form: FormPayload) -> Result<reqwest::blocking::multipart::Form, TransportFailure> {
    use reqwest::blocking::multipart::{Form, Part};

    let mut out = Form::new();
    for part in form.parts().iter().cloned() {
        out = match part.value {
            FormValue::Text(text) => out.text(part.name, text),
            FormValue::File {
                file_name,
                content_type,
                bytes,
            } => {
                let mut file = Part::bytes(bytes).file_name(file_name);
                if let Some(ct) = content_type {
                    file = file
                        .mime_str(&ct)
                        .map_err(|e| TransportFailure(format!("invalid content type {:?}: {}", ct, e)))?;
                }
                out.part(part.name, file)
            }
        };
    }
    Ok(out)
}
