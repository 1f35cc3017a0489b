use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Prefix of environment overrides (`HUB__DATABASE__DEFAULT__URI` maps to
/// `database.default.uri`).
pub const ENV_PREFIX: &str = "HUB";

/// Failure to read or decode a configuration source.
#[chub_derive::hub_error]
pub enum LoadError {
    #[error("Config load error{}: {source}", format_context(.context))]
    Load { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration file overlaid with `HUB__`-prefixed environment variables.
///
/// The file format follows the extension (`.toml`, `.json`, `.yaml`, ...). Nested keys in
/// environment variables are separated by `__`; values are parsed as numbers or booleans
/// where possible. Loading into [`serde_json::Value`] yields the tree
/// [`HubBuilder::configure`](crate::hub::HubBuilder::configure) consumes.
///
/// # Errors
/// [`LoadError::Load`] if the file is missing or the merged tree does not decode into `T`.
///
/// # Example
/// ```rust,no_run
/// use chub_kernel::config::load_config;
///
/// let tree: serde_json::Value = load_config("hub.toml").unwrap();
/// assert!(tree.get("database").is_some());
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T, LoadError>
where
    T: DeserializeOwned,
{
    load_layered(path.as_ref(), environment())
}

/// [`load_config`] with `vars` in place of the process environment, for embedders that
/// keep overrides elsewhere (a `.env` file, a secret store). Only `HUB__` keys apply.
///
/// # Errors
/// Same as [`load_config`].
pub fn load_config_with_vars<T, I>(path: impl AsRef<Path>, vars: I) -> Result<T, LoadError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (String, String)>,
{
    let vars = vars.into_iter().collect::<config::Map<_, _>>();
    load_layered(path.as_ref(), environment().source(Some(vars)))
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__").try_parsing(true)
}

fn load_layered<T>(path: &Path, environment: Environment) -> Result<T, LoadError>
where
    T: DeserializeOwned,
{
    info!("Loading config from {}", path.display());

    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(environment)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
