//! The verb → noun → operation capability surface.

use crate::error::{ConfigError, InfraError, OperationError};
use crate::module::ModuleDescriptor;
use chub_database::Database;
use chub_domain::constants::{noun, verb};
use chub_mailer::Mailer;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type OperationResult = Result<Value, OperationError>;

type ActionFn = dyn Fn(Value) -> BoxFuture<'static, OperationResult> + Send + Sync;
type CheckFn = dyn Fn(&Value) -> OperationResult + Send + Sync;
type DatabaseFn =
    dyn Fn(Option<String>) -> BoxFuture<'static, Result<Database, InfraError>> + Send + Sync;
type MailerFn =
    dyn Fn(Option<String>) -> BoxFuture<'static, Result<Mailer, InfraError>> + Send + Sync;
type SelectFn = dyn Fn(&str) -> Result<(), ConfigError> + Send + Sync;

/// A published operation.
///
/// Every variant is callable with a JSON payload through [`Operation::call`]; the accessor
/// variants additionally hand out typed handles through [`Capabilities::database`] and
/// [`Capabilities::mailer`].
#[derive(Clone)]
pub enum Operation {
    /// Asynchronous operation, usually backed by the document store.
    Action(Arc<ActionFn>),
    /// Pure synchronous check or transformation.
    Check(Arc<CheckFn>),
    /// Resolves a document-store handle by logical name.
    Database(Arc<DatabaseFn>),
    /// Resolves a mail transport by logical name.
    Mailer(Arc<MailerFn>),
    /// Repoints a `default` alias.
    Select(Arc<SelectFn>),
}

/// Discriminant of an [`Operation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Action,
    Check,
    Database,
    Mailer,
    Select,
}

#[derive(Deserialize)]
struct NamePayload {
    #[serde(default)]
    name: Option<String>,
}

impl Operation {
    pub fn action<F, Fut>(f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OperationResult> + Send + 'static,
    {
        Self::Action(Arc::new(move |payload| -> BoxFuture<'static, OperationResult> {
            Box::pin(f(payload))
        }))
    }

    pub fn check<F>(f: F) -> Self
    where
        F: Fn(&Value) -> OperationResult + Send + Sync + 'static,
    {
        Self::Check(Arc::new(f))
    }

    pub fn database<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Database, InfraError>> + Send + 'static,
    {
        Self::Database(Arc::new(
            move |name: Option<String>| -> BoxFuture<'static, Result<Database, InfraError>> {
                Box::pin(f(name))
            },
        ))
    }

    pub fn mailer<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Mailer, InfraError>> + Send + 'static,
    {
        Self::Mailer(Arc::new(
            move |name: Option<String>| -> BoxFuture<'static, Result<Mailer, InfraError>> {
                Box::pin(f(name))
            },
        ))
    }

    pub fn select<F>(f: F) -> Self
    where
        F: Fn(&str) -> Result<(), ConfigError> + Send + Sync + 'static,
    {
        Self::Select(Arc::new(f))
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Action(_) => OperationKind::Action,
            Self::Check(_) => OperationKind::Check,
            Self::Database(_) => OperationKind::Database,
            Self::Mailer(_) => OperationKind::Mailer,
            Self::Select(_) => OperationKind::Select,
        }
    }

    /// Whether both values are the same registered operation.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Action(a), Self::Action(b)) => Arc::ptr_eq(a, b),
            (Self::Check(a), Self::Check(b)) => Arc::ptr_eq(a, b),
            (Self::Database(a), Self::Database(b)) => Arc::ptr_eq(a, b),
            (Self::Mailer(a), Self::Mailer(b)) => Arc::ptr_eq(a, b),
            (Self::Select(a), Self::Select(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Invokes the operation with a JSON payload.
    ///
    /// Accessors take `{"name"?: string}` and describe the resolved handle; selectors take
    /// `{"name": string}`.
    ///
    /// # Errors
    /// Whatever the operation reports.
    pub async fn call(&self, payload: Value) -> OperationResult {
        match self {
            Self::Action(f) => f(payload).await,
            Self::Check(f) => f(&payload),
            Self::Database(f) => {
                let handle = f(name_of(payload)?).await?;
                Ok(json!({ "name": handle.name(), "uri": handle.uri() }))
            },
            Self::Mailer(f) => {
                let handle = f(name_of(payload)?).await?;
                Ok(json!({
                    "name": handle.name(),
                    "service": handle.service(),
                    "address": handle.address(),
                }))
            },
            Self::Select(f) => {
                let name = name_of(payload)?
                    .ok_or_else(|| OperationError::validation("'name' must be a string"))?;
                f(&name)?;
                Ok(json!({ "default": name }))
            },
        }
    }
}

fn name_of(payload: Value) -> Result<Option<String>, OperationError> {
    if payload.is_null() {
        return Ok(None);
    }
    crate::payload::decode::<NamePayload>(payload).map(|p| p.name)
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Operation").field(&self.kind()).finish()
    }
}

/// A registry slot: the operation and the descriptor that registered it.
#[derive(Debug, Clone)]
pub struct Capability {
    pub owner: String,
    pub operation: Operation,
}

type Table = BTreeMap<String, BTreeMap<String, Capability>>;

/// Mutable registry used while a hub is being composed.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    table: Table,
}

impl CapabilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts every entry of `descriptor`, overwriting identical (verb, noun) slots.
    pub fn merge(&mut self, descriptor: ModuleDescriptor) {
        let owner = descriptor.name().to_owned();
        for (verb, noun, operation) in descriptor.into_entries() {
            let slot = Capability { owner: owner.clone(), operation };
            let nouns = self.table.entry(verb.clone()).or_default();
            if let Some(previous) = nouns.insert(noun.clone(), slot) {
                let previous = previous.owner;
                debug!(%verb, %noun, %previous, current = %owner, "Capability overwritten");
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Capabilities {
        Capabilities { table: Arc::new(self.table.clone()) }
    }
}

/// The published, read-only capability surface.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    table: Arc<Table>,
}

impl Capabilities {
    #[must_use]
    pub fn get(&self, verb: &str, noun: &str) -> Option<&Capability> {
        self.table.get(verb)?.get(noun)
    }

    #[must_use]
    pub fn operation(&self, verb: &str, noun: &str) -> Option<&Operation> {
        self.get(verb, noun).map(|c| &c.operation)
    }

    #[must_use]
    pub fn contains(&self, verb: &str, noun: &str) -> bool {
        self.get(verb, noun).is_some()
    }

    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.table.keys().map(String::as_str)
    }

    pub fn nouns<'a>(&'a self, verb: &str) -> impl Iterator<Item = &'a str> {
        self.table.get(verb).into_iter().flat_map(|nouns| nouns.keys().map(String::as_str))
    }

    /// Every `(verb, noun, capability)` in verb then noun order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, &Capability)> {
        self.table.iter().flat_map(|(verb, nouns)| {
            nouns.iter().map(move |(noun, cap)| (verb.as_str(), noun.as_str(), cap))
        })
    }

    /// Number of registered (verb, noun) pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.values().map(BTreeMap::len).sum()
    }

    /// # Errors
    /// [`OperationError::NotFound`] if nothing is registered at `verb.noun`, otherwise the
    /// operation's own result.
    pub async fn call(&self, verb: &str, noun: &str, payload: Value) -> OperationResult {
        let operation = self
            .operation(verb, noun)
            .ok_or_else(|| OperationError::not_found(format!("no operation {verb}.{noun}")))?;
        operation.call(payload).await
    }

    /// Resolves a document-store handle through `get.database`.
    ///
    /// # Errors
    /// [`OperationError::Infra`] when resolution fails, [`OperationError::Internal`] if
    /// `get.database` is not an accessor.
    pub async fn database(&self, name: Option<&str>) -> Result<Database, OperationError> {
        match self.operation(verb::GET, noun::DATABASE) {
            Some(Operation::Database(f)) => Ok(f(name.map(str::to_owned)).await?),
            _ => Err("get.database is not a database accessor".into()),
        }
    }

    /// Resolves a mail transport through `get.mailer`.
    ///
    /// # Errors
    /// [`OperationError::Infra`] when resolution fails, [`OperationError::Internal`] if
    /// `get.mailer` is not an accessor.
    pub async fn mailer(&self, name: Option<&str>) -> Result<Mailer, OperationError> {
        match self.operation(verb::GET, noun::MAILER) {
            Some(Operation::Mailer(f)) => Ok(f(name.map(str::to_owned)).await?),
            _ => Err("get.mailer is not a mailer accessor".into()),
        }
    }

    /// Repoints the `default` alias of `noun` (`database` or `mailer`) through `set.<noun>`.
    ///
    /// # Errors
    /// [`OperationError::Config`] for an unknown logical name.
    pub fn select(&self, noun: &str, name: &str) -> Result<(), OperationError> {
        match self.operation(verb::SET, noun) {
            Some(Operation::Select(f)) => Ok(f(name)?),
            _ => Err(OperationError::not_found(format!("no selector set.{noun}"))),
        }
    }
}
