//! The composition root.

use crate::baseline;
use crate::error::ConfigError;
use crate::infra::{DEFAULT_CONNECT_TIMEOUT, Infrastructure};
use crate::module::{ModuleCatalog, ModuleContext};
use crate::registry::{Capabilities, CapabilityRegistry};
use crate::validator::ConfigValidator;
use chub_database::{DatabaseConnector, UriConnector};
use chub_domain::modules::ModuleSet;
use chub_mailer::{MailerConnector, ServiceConnector};
use serde_json::Value;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Inner state of the [`Hub`].
#[derive(Debug)]
pub struct HubInner {
    capabilities: Capabilities,
    modules: ModuleSet,
}

/// A fully composed, immutable capability surface.
///
/// Dereferences to [`Capabilities`]; cloning is cheap and shares the same resolver.
#[derive(Debug, Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    #[must_use]
    pub fn builder() -> HubBuilder {
        HubBuilder::default()
    }

    /// Modules that were loaded.
    #[must_use]
    pub fn modules(&self) -> ModuleSet {
        self.inner.modules
    }

    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.inner.capabilities
    }
}

impl Deref for Hub {
    type Target = Capabilities;

    fn deref(&self) -> &Self::Target {
        &self.inner.capabilities
    }
}

/// Collects the catalog and infrastructure connectors a [`Hub`] is composed from.
#[derive(Debug)]
pub struct HubBuilder {
    catalog: ModuleCatalog,
    database_connector: Arc<dyn DatabaseConnector>,
    mailer_connector: Arc<dyn MailerConnector>,
    connect_timeout: Duration,
}

impl Default for HubBuilder {
    fn default() -> Self {
        Self {
            catalog: ModuleCatalog::default(),
            database_connector: Arc::new(UriConnector),
            mailer_connector: Arc::new(ServiceConnector::default()),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl HubBuilder {
    #[must_use]
    pub fn catalog(mut self, catalog: ModuleCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn database_connector(mut self, connector: impl DatabaseConnector + 'static) -> Self {
        self.database_connector = Arc::new(connector);
        self
    }

    #[must_use]
    pub fn mailer_connector(mut self, connector: impl MailerConnector + 'static) -> Self {
        self.mailer_connector = Arc::new(connector);
        self
    }

    /// Upper bound on establishing one database or mailer handle.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Validates `config` and composes a hub from it.
    ///
    /// The baseline descriptors are merged first, then every enabled catalog module in
    /// catalog order, so a later module wins any `(verb, noun)` collision.
    ///
    /// # Errors
    /// The first [`ConfigError`] from validation or module initialization. No hub exists
    /// on failure.
    #[instrument(skip_all, fields(catalog = self.catalog.len()))]
    pub async fn configure(self, config: &Value) -> Result<Hub, ConfigError> {
        let validated = ConfigValidator::for_catalog(&self.catalog).validate(config)?;

        let infra = Infrastructure::builder(&validated)
            .database_connector(self.database_connector)
            .mailer_connector(self.mailer_connector)
            .timeout(self.connect_timeout)
            .build();

        let mut registry = CapabilityRegistry::new();
        registry.merge(baseline::primitives());
        registry.merge(baseline::infrastructure(&infra));

        let mut loaded = ModuleSet::empty();
        for name in validated.modules.modules() {
            let Some(module) = self.catalog.get(name) else {
                warn!(module = %name, "Enabled module is not in the catalog, skipping");
                continue;
            };
            let ctx = ModuleContext::new(name, infra.clone(), validated.section(name).clone());
            let descriptor = module.init(ctx).await?;
            info!(module = %name, operations = descriptor.len(), "Module loaded");
            registry.merge(descriptor);
            loaded |= name.flag();
        }

        let capabilities = registry.snapshot();
        info!(modules = ?loaded, operations = capabilities.len(), "Hub ready");
        Ok(Hub { inner: Arc::new(HubInner { capabilities, modules: loaded }) })
    }
}
