//! Lazily established, per-hub document-store and mail-transport handles.

use crate::error::{ConfigError, InfraError};
use crate::validator::ValidatedConfig;
use chub_database::{Database, DatabaseConnector, UriConnector};
use chub_domain::config::{DatabaseDescriptor, MailerDescriptor};
use chub_domain::constants::DEFAULT;
use chub_mailer::{Mailer, MailerConnector, ServiceConnector};
use moka::future::Cache;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const DATABASE: &str = "database";
const MAILER: &str = "mailer";

/// Inner state of the [`Infrastructure`] resolver.
pub struct InfrastructureInner {
    databases: BTreeMap<String, DatabaseDescriptor>,
    mailers: BTreeMap<String, MailerDescriptor>,
    database_connector: Arc<dyn DatabaseConnector>,
    mailer_connector: Arc<dyn MailerConnector>,
    database_cache: Cache<String, Database>,
    mailer_cache: Cache<String, Mailer>,
    default_database: RwLock<String>,
    default_mailer: RwLock<String>,
    timeout: Duration,
}

impl fmt::Debug for InfrastructureInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfrastructureInner")
            .field("databases", &self.databases.keys().collect::<Vec<_>>())
            .field("mailers", &self.mailers.keys().collect::<Vec<_>>())
            .field("default_database", &*self.default_database.read())
            .field("default_mailer", &*self.default_mailer.read())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// The infrastructure resolver owned by one hub.
///
/// Handles are cached per logical name for the resolver's lifetime. Concurrent first
/// requests for one name share a single establishment; failed establishments are not
/// cached.
#[derive(Debug, Clone)]
pub struct Infrastructure {
    inner: Arc<InfrastructureInner>,
}

impl Infrastructure {
    #[must_use]
    pub fn builder(config: &ValidatedConfig) -> InfrastructureBuilder {
        InfrastructureBuilder {
            databases: config.databases.clone(),
            mailers: config.mailers.clone(),
            database_connector: Arc::new(UriConnector),
            mailer_connector: Arc::new(ServiceConnector::default()),
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Resolves the document store for `name`, or the `default` alias when `name` is
    /// `None` or `"default"`.
    ///
    /// # Errors
    /// - [`InfraError::Config`] if the logical name is not configured.
    /// - [`InfraError::ConnectFailed`] if the connector fails.
    /// - [`InfraError::ConnectTimeout`] if the connector does not finish in time.
    #[instrument(skip(self))]
    pub async fn database(&self, name: Option<&str>) -> Result<Database, InfraError> {
        let name = Self::alias(name, &self.inner.default_database);
        let descriptor = self
            .inner
            .databases
            .get(&name)
            .ok_or_else(|| ConfigError::unknown_name(DATABASE, name.clone()))?;

        self.inner
            .database_cache
            .try_get_with(name.clone(), async {
                let connect = self.inner.database_connector.connect(descriptor);
                let store = self.bounded(&name, connect).await?.map_err(|e| {
                    warn!(%name, error = %e, "Database establishment failed");
                    InfraError::ConnectFailed {
                        name: name.clone(),
                        message: e.to_string().into(),
                        context: Some(descriptor.uri.clone().into()),
                    }
                })?;
                info!(%name, uri = %descriptor.uri, "Database connection established");
                Ok::<_, InfraError>(Database::new(name.as_str(), descriptor.uri.as_str(), store))
            })
            .await
            .map_err(Arc::unwrap_or_clone)
    }

    /// Resolves the mail transport for `name`, or the `default` alias.
    ///
    /// # Errors
    /// Same as [`Infrastructure::database`].
    #[instrument(skip(self))]
    pub async fn mailer(&self, name: Option<&str>) -> Result<Mailer, InfraError> {
        let name = Self::alias(name, &self.inner.default_mailer);
        let descriptor = self
            .inner
            .mailers
            .get(&name)
            .ok_or_else(|| ConfigError::unknown_name(MAILER, name.clone()))?;

        self.inner
            .mailer_cache
            .try_get_with(name.clone(), async {
                let connect = self.inner.mailer_connector.connect(descriptor);
                let transport = self.bounded(&name, connect).await?.map_err(|e| {
                    warn!(%name, error = %e, "Mailer establishment failed");
                    InfraError::ConnectFailed {
                        name: name.clone(),
                        message: e.to_string().into(),
                        context: Some(descriptor.service.clone().into()),
                    }
                })?;
                info!(%name, service = %descriptor.service, "Mail transport established");
                Ok::<_, InfraError>(Mailer::new(name.as_str(), descriptor, transport))
            })
            .await
            .map_err(Arc::unwrap_or_clone)
    }

    /// Points the `default` database alias at `name`. Handles already resolved are kept.
    ///
    /// # Errors
    /// [`ConfigError::UnknownLogicalName`] if `name` is not configured.
    pub fn set_default_database(&self, name: &str) -> Result<(), ConfigError> {
        if !self.inner.databases.contains_key(name) {
            return Err(ConfigError::unknown_name(DATABASE, name));
        }
        *self.inner.default_database.write() = name.to_owned();
        info!(name, "Default database repointed");
        Ok(())
    }

    /// Points the `default` mailer alias at `name`.
    ///
    /// # Errors
    /// [`ConfigError::UnknownLogicalName`] if `name` is not configured.
    pub fn set_default_mailer(&self, name: &str) -> Result<(), ConfigError> {
        if !self.inner.mailers.contains_key(name) {
            return Err(ConfigError::unknown_name(MAILER, name));
        }
        *self.inner.default_mailer.write() = name.to_owned();
        info!(name, "Default mailer repointed");
        Ok(())
    }

    /// Logical name the `default` database alias currently points at.
    #[must_use]
    pub fn default_database(&self) -> String {
        self.inner.default_database.read().clone()
    }

    #[must_use]
    pub fn default_mailer(&self) -> String {
        self.inner.default_mailer.read().clone()
    }

    #[must_use]
    pub fn database_names(&self) -> Vec<&str> {
        self.inner.databases.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn mailer_names(&self) -> Vec<&str> {
        self.inner.mailers.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.inner.timeout
    }

    fn alias(name: Option<&str>, default: &RwLock<String>) -> String {
        match name {
            None | Some(DEFAULT) => default.read().clone(),
            Some(name) => name.to_owned(),
        }
    }

    async fn bounded<T>(
        &self,
        name: &str,
        establish: impl Future<Output = T>,
    ) -> Result<T, InfraError> {
        tokio::time::timeout(self.inner.timeout, establish).await.map_err(|_| {
            warn!(name, timeout = ?self.inner.timeout, "Establishment timed out");
            InfraError::ConnectTimeout {
                name: name.to_owned(),
                message: format!("no connection after {:?}", self.inner.timeout).into(),
                context: None,
            }
        })
    }
}

/// Wires connectors and the establishment timeout into an [`Infrastructure`].
#[derive(Debug)]
pub struct InfrastructureBuilder {
    databases: BTreeMap<String, DatabaseDescriptor>,
    mailers: BTreeMap<String, MailerDescriptor>,
    database_connector: Arc<dyn DatabaseConnector>,
    mailer_connector: Arc<dyn MailerConnector>,
    timeout: Duration,
}

impl InfrastructureBuilder {
    #[must_use]
    pub fn database_connector(mut self, connector: Arc<dyn DatabaseConnector>) -> Self {
        self.database_connector = connector;
        self
    }

    #[must_use]
    pub fn mailer_connector(mut self, connector: Arc<dyn MailerConnector>) -> Self {
        self.mailer_connector = connector;
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn build(self) -> Infrastructure {
        Infrastructure {
            inner: Arc::new(InfrastructureInner {
                databases: self.databases,
                mailers: self.mailers,
                database_connector: self.database_connector,
                mailer_connector: self.mailer_connector,
                database_cache: Cache::builder().build(),
                mailer_cache: Cache::builder().build(),
                default_database: RwLock::new(DEFAULT.to_owned()),
                default_mailer: RwLock::new(DEFAULT.to_owned()),
                timeout: self.timeout,
            }),
        }
    }
}
