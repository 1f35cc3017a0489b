use chub_kernel::config::LoadError;
use chub_kernel::error::ConfigError;
use std::borrow::Cow;

/// Failure to build a hub from a configuration file.
#[chub_derive::hub_error]
pub enum SetupError {
    #[error("Failed to load configuration{}: {source}", format_context(.context))]
    Load { source: LoadError, context: Option<Cow<'static, str>> },

    #[error("Invalid configuration{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },
}
