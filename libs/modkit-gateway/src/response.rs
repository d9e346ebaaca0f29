use std::borrow::Cow;

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::body::MessageBody;
use crate::value_object::StatusCode;

/// What came back from the endpoint, independent of the transport
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResponse {
    status: StatusCode,
    body: MessageBody,
    headers: HeaderMap,
}

impl EndpointResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: MessageBody, headers: HeaderMap) -> Self {
        Self {
            status,
            body,
            headers,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }

    /// Same status and headers with a different body
    #[must_use]
    pub fn with_body(&self, body: MessageBody) -> Self {
        Self {
            status: self.status,
            body,
            headers: self.headers.clone(),
        }
    }
}

/// Caller-facing result of a gateway call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainResponse {
    /// Endpoint response passed through 1:1
    Simple(SimpleResponse),
    /// Recognized failure; never successful
    Error(ErrorResponse),
    /// Shape produced by a custom mapper
    Mapped(MappedResponse),
}

impl DomainResponse {
    #[must_use]
    pub fn is_successful(&self) -> bool {
        match self {
            Self::Simple(response) => response.is_successful(),
            Self::Error(_) => false,
            Self::Mapped(response) => response.successful,
        }
    }

    /// Body as text: raw body, error message, or JSON
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        match self {
            Self::Simple(response) => response.body.to_text(),
            Self::Error(response) => Cow::Borrowed(response.message.as_str()),
            Self::Mapped(response) => match &response.body {
                Value::String(text) => Cow::Borrowed(text.as_str()),
                other => Cow::Owned(other.to_string()),
            },
        }
    }

    #[must_use]
    pub fn as_simple(&self) -> Option<&SimpleResponse> {
        match self {
            Self::Simple(response) => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Error(response) => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_mapped(&self) -> Option<&MappedResponse> {
        match self {
            Self::Mapped(response) => Some(response),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleResponse {
    status: StatusCode,
    body: MessageBody,
}

impl SimpleResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: MessageBody) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn from_endpoint_response(response: &EndpointResponse) -> Self {
        Self::new(response.status(), response.body().clone())
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    message: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        Self::new(error.to_string())
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedResponse {
    successful: bool,
    body: Value,
}

impl MappedResponse {
    #[must_use]
    pub fn new(successful: bool, body: Value) -> Self {
        Self { successful, body }
    }

    #[must_use]
    pub fn successful(body: Value) -> Self {
        Self::new(true, body)
    }

    #[must_use]
    pub fn failed(body: Value) -> Self {
        Self::new(false, body)
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.successful
    }

    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }
}

impl From<SimpleResponse> for DomainResponse {
    fn from(value: SimpleResponse) -> Self {
        Self::Simple(value)
    }
}

impl From<ErrorResponse> for DomainResponse {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

impl From<MappedResponse> for DomainResponse {
    fn from(value: MappedResponse) -> Self {
        Self::Mapped(value)
    }
}
