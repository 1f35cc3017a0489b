use chub_domain::modules::ModuleName;
use std::borrow::Cow;

/// Configuration failures. Always fatal to [`configure`](crate::hub::HubBuilder::configure).
#[chub_derive::hub_error]
#[derive(Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The tree, or one of its sections, has the wrong shape.
    #[error("Malformed configuration{}: {message}", format_context(.context))]
    Malformed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// `database.default.uri` is absent or not a string.
    #[error("Missing default database{}: {message}", format_context(.context))]
    MissingDatabaseDefault { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// `mailer.default` is absent or not an object.
    #[error("Missing default mailer{}: {message}", format_context(.context))]
    MissingMailerDefault { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An enabled module's subtree fails its structural check or cannot be decoded.
    #[error("Invalid configuration for module '{module}'{}: {message}", format_context(.context))]
    InvalidModuleConfig {
        module: ModuleName,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// A logical database or mailer name that is not configured.
    #[error("Unknown {kind} '{name}'{}", format_context(.context))]
    UnknownLogicalName { kind: &'static str, name: String, context: Option<Cow<'static, str>> },
}

impl ConfigError {
    pub fn malformed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Malformed { message: message.into(), context: None }
    }

    pub fn invalid_module(module: ModuleName, message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidModuleConfig { module, message: message.into(), context: None }
    }

    pub fn unknown_name(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownLogicalName { kind, name: name.into(), context: None }
    }

    /// The module an [`InvalidModuleConfig`](Self::InvalidModuleConfig) refers to.
    #[must_use]
    pub const fn module(&self) -> Option<ModuleName> {
        match self {
            Self::InvalidModuleConfig { module, .. } => Some(*module),
            _ => None,
        }
    }
}
