//! Descriptors merged into every hub before any domain module.

use crate::checks::{self, check_input, is_email, is_strong_password, parse_field_map};
use crate::error::OperationError;
use crate::infra::Infrastructure;
use crate::module::ModuleDescriptor;
use crate::registry::{Operation, OperationResult};
use chub_domain::constants::{noun, verb};
use serde_json::{Value, json};

pub const PRIMITIVES: &str = "primitives";
pub const INFRASTRUCTURE: &str = "infrastructure";

/// `validate.*` and `sanitize.*` primitives.
#[must_use]
pub fn primitives() -> ModuleDescriptor {
    ModuleDescriptor::new(PRIMITIVES)
        .check(verb::VALIDATE, noun::EMAIL, |payload| {
            let value = string_field(payload, "value")?;
            verdict(is_email(value), || format!("'{value}' is not a valid email address"))
        })
        .check(verb::VALIDATE, noun::EQUAL, |payload| {
            let (value, other) = (field(payload, "value")?, field(payload, "other")?);
            verdict(value == other, || "values differ".to_owned())
        })
        .check(verb::VALIDATE, noun::PASSWORD, |payload| {
            let value = string_field(payload, "value")?;
            verdict(is_strong_password(value), || {
                format!(
                    "password needs at least {} characters with a lowercase letter, an uppercase \
                     letter and a digit",
                    checks::MIN_PASSWORD_LENGTH
                )
            })
        })
        .check(verb::VALIDATE, noun::FIELDS, |payload| {
            let fields = parse_field_map(field(payload, "fields")?)
                .ok_or_else(|| OperationError::validation("'fields' must be a field map"))?;
            check_input(&fields, field(payload, "input")?)?;
            Ok(json!({ "valid": true }))
        })
        .check(verb::SANITIZE, noun::STRING, |payload| {
            Ok(json!({ "value": checks::sanitize_string(string_field(payload, "value")?) }))
        })
        .check(verb::SANITIZE, noun::EMAIL, |payload| {
            Ok(json!({ "value": checks::sanitize_email(string_field(payload, "value")?) }))
        })
        .check(verb::SANITIZE, noun::HTML, |payload| {
            Ok(json!({ "value": checks::sanitize_html(string_field(payload, "value")?) }))
        })
}

/// `get`/`set` accessors for databases and mailers bound to `infra`.
#[must_use]
pub fn infrastructure(infra: &Infrastructure) -> ModuleDescriptor {
    let (db, mail, set_db, set_mail) = (infra.clone(), infra.clone(), infra.clone(), infra.clone());

    ModuleDescriptor::new(INFRASTRUCTURE)
        .register(
            verb::GET,
            noun::DATABASE,
            Operation::database(move |name| {
                let infra = db.clone();
                async move { infra.database(name.as_deref()).await }
            }),
        )
        .register(
            verb::GET,
            noun::MAILER,
            Operation::mailer(move |name| {
                let infra = mail.clone();
                async move { infra.mailer(name.as_deref()).await }
            }),
        )
        .register(
            verb::SET,
            noun::DATABASE,
            Operation::select(move |name| set_db.set_default_database(name)),
        )
        .register(
            verb::SET,
            noun::MAILER,
            Operation::select(move |name| set_mail.set_default_mailer(name)),
        )
}

fn field<'a>(payload: &'a Value, name: &str) -> Result<&'a Value, OperationError> {
    payload.get(name).ok_or_else(|| OperationError::validation(format!("missing field '{name}'")))
}

fn string_field<'a>(payload: &'a Value, name: &str) -> Result<&'a str, OperationError> {
    field(payload, name)?
        .as_str()
        .ok_or_else(|| OperationError::validation(format!("'{name}' must be a string")))
}

fn verdict(valid: bool, reason: impl FnOnce() -> String) -> OperationResult {
    if valid { Ok(json!({ "valid": true })) } else { Err(OperationError::validation(reason())) }
}
