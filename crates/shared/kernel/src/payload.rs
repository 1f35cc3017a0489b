//! Helpers for unpacking JSON payloads inside operations.

use crate::error::OperationError;
use crate::checks::FieldViolation;
use chub_database::Document;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes a payload into a typed request.
///
/// # Errors
/// [`OperationError::Validation`] with the decoder's message.
pub fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, OperationError> {
    serde_json::from_value(payload).map_err(|e| OperationError::validation(e.to_string()))
}

/// Unwraps an object payload; `null` is an empty object.
///
/// # Errors
/// [`OperationError::Validation`] for any other non-object payload.
pub fn object(payload: Value) -> Result<Document, OperationError> {
    match payload {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Document::new()),
        _ => Err(OperationError::validation("payload must be an object")),
    }
}

/// # Errors
/// [`OperationError::Validation`] if `field` is absent or not a string.
pub fn require_str<'a>(payload: &'a Document, field: &str) -> Result<&'a str, OperationError> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| OperationError::validation(format!("'{field}' must be a string")))
}

#[must_use]
pub fn optional_str<'a>(payload: &'a Document, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(Value::as_str)
}

impl From<FieldViolation> for OperationError {
    fn from(violation: FieldViolation) -> Self {
        Self::validation(violation.to_string())
    }
}
