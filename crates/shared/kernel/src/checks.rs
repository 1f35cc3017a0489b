//! Type-check and sanitize primitives shared by the configuration validator, the baseline
//! `validate`/`sanitize` operations and module input checks.

use chub_domain::fields::{FieldType, RequiredFields};
use serde_json::{Map, Value};
use std::fmt;
use validator::ValidateEmail;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Why a value failed a [`RequiredFields`] check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    NotAnObject,
    Missing { field: String, expected: FieldType },
    Mismatch { field: String, expected: FieldType },
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => f.write_str("expected an object"),
            Self::Missing { field, expected } => write!(f, "missing field '{field}' ({expected})"),
            Self::Mismatch { field, expected } => write!(f, "field '{field}' must be {expected}"),
        }
    }
}

#[must_use]
pub fn is_email(value: &str) -> bool {
    value.validate_email()
}

/// At least eight characters with a lowercase letter, an uppercase letter and a digit.
#[must_use]
pub fn is_strong_password(value: &str) -> bool {
    value.chars().count() >= MIN_PASSWORD_LENGTH
        && value.chars().any(char::is_lowercase)
        && value.chars().any(char::is_uppercase)
        && value.chars().any(|c| c.is_ascii_digit())
}

/// Whether `value` satisfies the type tag `ty`.
#[must_use]
pub fn check_field(ty: FieldType, value: &Value) -> bool {
    match ty {
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Email => value.as_str().is_some_and(is_email),
        FieldType::Password => value.as_str().is_some_and(is_strong_password),
        FieldType::Object => value.is_object(),
        FieldType::List => value.is_array(),
        FieldType::NonEmptyList => value.as_array().is_some_and(|items| !items.is_empty()),
        FieldType::FieldMap => value.as_object().is_some_and(|map| {
            map.values().all(|tag| tag.as_str().and_then(FieldType::parse).is_some())
        }),
    }
}

/// Checks every required field of `value`, reporting the first violation in field-name order.
///
/// # Errors
/// The first [`FieldViolation`] found.
pub fn check_input(fields: &RequiredFields, value: &Value) -> Result<(), FieldViolation> {
    let object = value.as_object().ok_or(FieldViolation::NotAnObject)?;
    check_object(fields, object)
}

/// [`check_input`] over an already unwrapped object.
///
/// # Errors
/// The first [`FieldViolation`] found.
pub fn check_object(
    fields: &RequiredFields,
    object: &Map<String, Value>,
) -> Result<(), FieldViolation> {
    for (field, expected) in fields.iter() {
        match object.get(field) {
            None | Some(Value::Null) => {
                return Err(FieldViolation::Missing { field: field.to_owned(), expected });
            },
            Some(value) if !check_field(expected, value) => {
                return Err(FieldViolation::Mismatch { field: field.to_owned(), expected });
            },
            Some(_) => {},
        }
    }
    Ok(())
}

/// Parses a `field_map` value into [`RequiredFields`]; `None` if any tag is unknown.
#[must_use]
pub fn parse_field_map(value: &Value) -> Option<RequiredFields> {
    value
        .as_object()?
        .iter()
        .map(|(name, tag)| Some((name.clone(), tag.as_str().and_then(FieldType::parse)?)))
        .collect()
}

/// Trims and drops control characters.
#[must_use]
pub fn sanitize_string(value: &str) -> String {
    value.trim().chars().filter(|c| !c.is_control()).collect()
}

#[must_use]
pub fn sanitize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Escapes `& < > " '` for embedding in HTML.
#[must_use]
pub fn sanitize_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
