use crate::error::ConfigError;
use std::borrow::Cow;

/// Failures of a single resolver call. Never cached.
#[chub_derive::hub_error]
#[derive(Clone)]
pub enum InfraError {
    #[error("Failed to connect '{name}'{}: {message}", format_context(.context))]
    ConnectFailed { name: String, message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Timed out connecting '{name}'{}: {message}", format_context(.context))]
    ConnectTimeout { name: String, message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Infrastructure config error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },
}

impl InfraError {
    /// Logical name the failed establishment was for.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::ConnectFailed { name, .. } | Self::ConnectTimeout { name, .. } => Some(name),
            Self::Config { source: ConfigError::UnknownLogicalName { name, .. }, .. } => Some(name),
            Self::Config { .. } => None,
        }
    }
}
