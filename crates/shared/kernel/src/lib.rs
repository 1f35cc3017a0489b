//! # Hub Kernel
//!
//! The composition core shared by every hub module:
//!
//! - [`registry`]: the verb → noun → operation surface and its last-writer-wins merge.
//! - [`module`]: the [`HubModule`](module::HubModule) contract, descriptors and the catalog.
//! - [`validator`]: structural configuration checks run before any module exists.
//! - [`infra`]: the per-hub resolver for document stores and mail transports.
//! - [`hub`]: the composition root tying the above together.
//!
//! ## Example
//! ```rust
//! use chub_kernel::hub::Hub;
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let hub = Hub::builder()
//!     .configure(&json!({
//!         "database": { "default": { "uri": "mem://main" } },
//!         "mailer": { "default": { "service": "memory", "address": "hub@example.com" } },
//!     }))
//!     .await?;
//!
//! let verdict = hub.call("validate", "email", json!({ "value": "ann@example.com" })).await?;
//! assert_eq!(verdict, json!({ "valid": true }));
//!
//! let db = hub.database(None).await?;
//! assert_eq!(db.uri(), "mem://main");
//! # Ok(())
//! # }
//! ```

pub mod baseline;
pub mod checks;
pub mod config;
pub mod error;
pub mod hub;
pub mod infra;
pub mod module;
pub mod payload;
pub mod registry;
pub mod validator;

/// Everything a module crate needs to implement [`HubModule`](module::HubModule).
pub mod prelude {
    pub use crate::checks::{
        FieldViolation, check_input, check_object, is_email, is_strong_password,
    };
    pub use crate::error::{ConfigError, InfraError, OperationError, OperationErrorExt};
    pub use crate::infra::Infrastructure;
    pub use crate::module::{HubModule, ModuleCatalog, ModuleContext, ModuleDescriptor};
    pub use crate::payload::{decode, object, optional_str, require_str};
    pub use crate::registry::{Operation, OperationResult};
    pub use chub_database::{Database, Document, DocumentStore, ID_FIELD, document};
    pub use chub_domain::constants::{noun, verb};
    pub use chub_domain::fields::{FieldType, RequiredFields};
    pub use chub_domain::lookup::Lookup;
    pub use chub_domain::modules::ModuleName;
    pub use chub_mailer::{Mail, Mailer};
}

pub use chub_database as database;
pub use chub_domain as domain;
pub use chub_mailer as mailer;
