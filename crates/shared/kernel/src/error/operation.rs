use crate::error::{ConfigError, InfraError};
use chub_database::DatabaseError;
use chub_mailer::MailerError;
use std::borrow::Cow;

/// Result error of every published operation.
#[chub_derive::hub_error]
pub enum OperationError {
    /// The payload is missing a field or carries a wrong type.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Conflict{}: {message}", format_context(.context))]
    Conflict { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Credentials were rejected.
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Store error{}: {source}", format_context(.context))]
    Store { source: DatabaseError, context: Option<Cow<'static, str>> },

    #[error("Mail error{}: {source}", format_context(.context))]
    Mail { source: MailerError, context: Option<Cow<'static, str>> },

    #[error("Infrastructure error{}: {source}", format_context(.context))]
    Infra { source: InfraError, context: Option<Cow<'static, str>> },

    #[error("Configuration error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl OperationError {
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict { message: message.into(), context: None }
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Unauthorized { message: message.into(), context: None }
    }

    /// Whether the error means "no such document", raised here or by the store.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Store { source: DatabaseError::NotFound { .. }, .. }
        )
    }

    /// Whether the error means "already exists", raised here or by the store.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::Conflict { .. } | Self::Store { source: DatabaseError::Conflict { .. }, .. }
        )
    }
}
