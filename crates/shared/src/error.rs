use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TRANSPORT_CODE: &str = "transport";
pub const DECODE_CODE: &str = "decode";
pub const NOT_FOUND_CODE: &str = "not_found";

/// Error raised by any gateway operation.
///
/// Mirrors the JSON error body returned by the hosted data API, so the
/// optional `code`, `hint` and `details` fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            hint: None,
            details: None,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(message).with_code(TRANSPORT_CODE)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(message).with_code(DECODE_CODE)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message).with_code(NOT_FOUND_CODE)
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn is_transport(&self) -> bool {
        self.code.as_deref() == Some(TRANSPORT_CODE)
    }
}
