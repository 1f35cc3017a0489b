//! Facade crate for `ContentHub`.
//! Re-exports domain/kernel primitives and assembles the catalog of domain modules.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! ```rust
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), chub::ConfigError> {
//! let hub = chub::configure(&json!({
//!     "modules": { "scout": true },
//!     "database": { "default": { "uri": "mem://site" } },
//!     "mailer": { "default": { "service": "memory", "address": "hub@example.com" } },
//!     "scout": { "visits": "visits", "rules": "rules" },
//! }))
//! .await?;
//!
//! hub.call("add", "visit", json!({ "address": "10.0.0.1", "path": "/" })).await.ok();
//! assert!(hub.contains("authorize", "address"));
//! # Ok(())
//! # }
//! ```

mod error;

pub use crate::error::{SetupError, SetupErrorExt};
pub use chub_domain as domain;
pub use chub_kernel as kernel;
pub use chub_kernel::error::{ConfigError, InfraError, OperationError};
pub use chub_kernel::hub::{Hub, HubBuilder};

use chub_domain::modules::ModuleName;
use chub_kernel::config::load_config;
use chub_kernel::module::ModuleCatalog;
use serde_json::Value;
use std::path::Path;
use tracing::instrument;

/// Domain module crates.
pub mod features {
    pub use chub_admin as admin;
    pub use chub_author as author;
    pub use chub_merchant as merchant;
    pub use chub_scout as scout;
}

/// Every domain module, keyed and ordered by [`ModuleName`].
#[must_use]
pub fn catalog() -> ModuleCatalog {
    ModuleName::ALL.into_iter().fold(ModuleCatalog::new(), |catalog, name| match name {
        ModuleName::Admin => catalog.register(features::admin::Admin),
        ModuleName::Author => catalog.register(features::author::Author),
        ModuleName::Merchant => catalog.register(features::merchant::Merchant),
        ModuleName::Scout => catalog.register(features::scout::Scout),
    })
}

/// A [`HubBuilder`] preloaded with [`catalog`].
#[must_use]
pub fn builder() -> HubBuilder {
    Hub::builder().catalog(catalog())
}

/// Validates `config` and composes a [`Hub`] with the default connectors.
///
/// # Errors
/// The first [`ConfigError`] found; no hub is built.
pub async fn configure(config: &Value) -> Result<Hub, ConfigError> {
    builder().configure(config).await
}

/// Loads a configuration file (with `HUB__` environment overrides) and composes a [`Hub`].
///
/// # Errors
/// [`SetupError::Load`] if the file cannot be read or parsed, [`SetupError::Config`] if
/// the tree is rejected.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub async fn configure_file(path: impl AsRef<Path>) -> Result<Hub, SetupError> {
    let tree: Value = load_config(path)?;
    Ok(configure(&tree).await?)
}
