//! Request descriptors
//!
//! A [`RequestDescriptor`] describes one HTTP call: path, method, query
//! parameters, body, the kind of response expected, and how the auth token
//! is presented. Descriptors are built fresh per call with consuming `with_*`
//! methods and are not modified once handed to the transport.

use serde::Serialize;
use std::fmt;

use crate::error::{ClassifiedError, Result};
use crate::id::EntityId;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Method {
    /// Upper-case method name
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Whether a JSON body is sent with this method
    ///
    /// Only POST and PUT carry JSON bodies; a JSON body attached to a GET or
    /// DELETE descriptor is dropped by the transport.
    pub fn carries_json_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar query parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Text value
    Text(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
}

impl QueryValue {
    /// Empty text values are omitted from the query string
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Text(s) => f.write_str(s),
            QueryValue::Int(n) => write!(f, "{}", n),
            QueryValue::Float(x) => write!(f, "{}", x),
            QueryValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Text(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Text(v)
    }
}

impl From<&String> for QueryValue {
    fn from(v: &String) -> Self {
        QueryValue::Text(v.clone())
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        QueryValue::Int(v.into())
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        QueryValue::Int(v.into())
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<&EntityId> for QueryValue {
    fn from(v: &EntityId) -> Self {
        match v.as_i64() {
            Some(n) => QueryValue::Int(n),
            None => QueryValue::Text(v.as_str().to_string()),
        }
    }
}

/// One value in a multipart form
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Plain text field
    Text(String),
    /// File upload
    File {
        /// File name reported to the server
        file_name: String,
        /// MIME type, if known
        content_type: Option<String>,
        /// Raw file contents
        bytes: Vec<u8>,
    },
}

/// Named multipart form field
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    /// Field name
    pub name: String,
    /// Field value
    pub value: FormValue,
}

/// Binary form payload, sent as `multipart/form-data`
///
/// The transport generates the boundary and the content-type header; a
/// descriptor carrying a form never sets one explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    parts: Vec<FormPart>,
}

impl FormPayload {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text field
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    /// Append a file field
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart {
            name: name.into(),
            value: FormValue::File {
                file_name: file_name.into(),
                content_type,
                bytes,
            },
        });
        self
    }

    /// Form fields in insertion order
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Whether the form has no fields
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Request body
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON document
    Json(serde_json::Value),
    /// Multipart form
    Form(FormPayload),
}

/// What the caller expects back
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseKind {
    /// A JSON body, normalized into an [`crate::Envelope`]
    #[default]
    Json,
    /// Raw bytes returned untouched (report exports, downloads)
    Blob,
}

/// How the stored auth token is presented in the `Authorization` header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `Authorization: <token>`
    ///
    /// Legacy endpoints that read the header verbatim. Every use is logged
    /// by the transport so the divergent endpoints stay visible.
    Raw,
}

/// Description of a single API call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    path: String,
    method: Method,
    query: Vec<(String, QueryValue)>,
    body: RequestBody,
    response_kind: ResponseKind,
    auth: AuthScheme,
    inline_errors: bool,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` on `path`
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            query: Vec::new(),
            body: RequestBody::Empty,
            response_kind: ResponseKind::Json,
            auth: AuthScheme::Bearer,
            inline_errors: false,
        }
    }

    /// GET descriptor
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// POST descriptor
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// PUT descriptor
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    /// DELETE descriptor
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Add a query parameter; empty text values are skipped
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.query.push((key.into(), value));
        }
        self
    }

    /// Add a query parameter only when a value is present
    pub fn with_optional_query<V: Into<QueryValue>>(
        self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(v) => self.with_query(key, v),
            None => self,
        }
    }

    /// Attach a JSON body
    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Serialize `body` and attach it as JSON
    pub fn with_json_body<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(ClassifiedError::encode)?;
        Ok(self.with_json(value))
    }

    /// Attach a multipart form
    pub fn with_form(mut self, form: FormPayload) -> Self {
        self.body = RequestBody::Form(form);
        self
    }

    /// Expect a raw binary response
    pub fn expecting_blob(mut self) -> Self {
        self.response_kind = ResponseKind::Blob;
        self
    }

    /// Present the token with the given scheme
    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    /// Let the caller render failures inline
    ///
    /// Suppresses the global notification for every kind except
    /// `Unauthorized` and `NetworkError`, which always surface globally.
    pub fn with_inline_errors(mut self) -> Self {
        self.inline_errors = true;
        self
    }

    /// Request path, relative or absolute
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP method
    pub fn method(&self) -> Method {
        self.method
    }

    /// Query parameters in insertion order
    pub fn query(&self) -> &[(String, QueryValue)] {
        &self.query
    }

    /// Request body
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Expected response kind
    pub fn response_kind(&self) -> ResponseKind {
        self.response_kind
    }

    /// Token presentation scheme
    pub fn auth(&self) -> AuthScheme {
        self.auth
    }

    /// Whether the caller renders failures inline
    pub fn inline_errors(&self) -> bool {
        self.inline_errors
    }

    /// Whether the path is an absolute URL
    pub fn is_absolute(&self) -> bool {
        self.path.starts_with("http://") || self.path.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_query_values_are_omitted() {
        let desc = RequestDescriptor::get("/api/exam-booking/list")
            .with_query("status", "")
            .with_optional_query("startDate", None::<&str>)
            .with_query("pageNum", 1)
            .with_query("examMode", "ONLINE");

        let keys: Vec<&str> = desc.query().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["pageNum", "examMode"]);
    }

    #[test]
    fn test_query_value_display() {
        assert_eq!(QueryValue::from(3).to_string(), "3");
        assert_eq!(QueryValue::from(true).to_string(), "true");
        assert_eq!(QueryValue::from("pdf").to_string(), "pdf");
        assert_eq!(QueryValue::from(&EntityId::from("12")), QueryValue::Int(12));
    }

    #[test]
    fn test_builder_defaults() {
        let desc = RequestDescriptor::post("/api/users/register");
        assert_eq!(desc.method(), Method::Post);
        assert_eq!(desc.response_kind(), ResponseKind::Json);
        assert_eq!(desc.auth(), AuthScheme::Bearer);
        assert_eq!(desc.body(), &RequestBody::Empty);
        assert!(!desc.inline_errors());
    }

    #[test]
    fn test_json_body_serialization() {
        #[derive(Serialize)]
        struct Cancel<'a> {
            reason: &'a str,
        }

        let desc = RequestDescriptor::post("/cancel")
            .with_json_body(&Cancel { reason: "ill" })
            .unwrap();
        assert_eq!(desc.body(), &RequestBody::Json(json!({"reason": "ill"})));
    }

    #[test]
    fn test_absolute_paths() {
        assert!(RequestDescriptor::get("https://cdn.example.com/x").is_absolute());
        assert!(!RequestDescriptor::get("/api/x").is_absolute());
    }

    #[test]
    fn test_form_payload_keeps_order() {
        let form = FormPayload::new()
            .text("username", "alice")
            .file("file", "data.csv", Some("text/csv".into()), b"a,b".to_vec());
        assert_eq!(form.parts().len(), 2);
        assert_eq!(form.parts()[0].name, "username");
        assert!(matches!(form.parts()[1].value, FormValue::File { .. }));
    }

    #[test]
    fn test_only_post_and_put_carry_json() {
        assert!(Method::Post.carries_json_body());
        assert!(Method::Put.carries_json_body());
        assert!(!Method::Get.carries_json_body());
        assert!(!Method::Delete.carries_json_body());
    }
}
