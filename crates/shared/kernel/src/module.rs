//! The contract every domain module implements, and the catalog the hub loads from.

use crate::error::ConfigError;
use crate::infra::Infrastructure;
use crate::registry::{Operation, OperationResult};
use async_trait::async_trait;
use chub_domain::fields::RequiredFields;
use chub_domain::modules::ModuleName;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

/// The (verb, noun, operation) triples one module contributes.
#[derive(Debug)]
pub struct ModuleDescriptor {
    name: Cow<'static, str>,
    entries: Vec<(String, String, Operation)>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self { name: name.into(), entries: Vec::new() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn register(
        mut self,
        verb: impl Into<String>,
        noun: impl Into<String>,
        operation: Operation,
    ) -> Self {
        self.entries.push((verb.into(), noun.into(), operation));
        self
    }

    /// Registers an async operation that receives a clone of `state` on every call.
    #[must_use]
    pub fn bind<S, F, Fut>(self, verb: &str, noun: &str, state: &S, f: F) -> Self
    where
        S: Clone + Send + Sync + 'static,
        F: Fn(S, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OperationResult> + Send + 'static,
    {
        let state = state.clone();
        self.register(verb, noun, Operation::action(move |payload| f(state.clone(), payload)))
    }

    /// Registers a synchronous check.
    #[must_use]
    pub fn check<F>(self, verb: &str, noun: &str, f: F) -> Self
    where
        F: Fn(&Value) -> OperationResult + Send + Sync + 'static,
    {
        self.register(verb, noun, Operation::check(f))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(verb, noun)` pairs in registration order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(verb, noun, _)| (verb.as_str(), noun.as_str()))
    }

    pub(crate) fn into_entries(self) -> Vec<(String, String, Operation)> {
        self.entries
    }
}

/// What a module receives when it is instantiated.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    module: ModuleName,
    infra: Infrastructure,
    section: Value,
}

impl ModuleContext {
    #[must_use]
    pub const fn new(module: ModuleName, infra: Infrastructure, section: Value) -> Self {
        Self { module, infra, section }
    }

    #[must_use]
    pub const fn module(&self) -> ModuleName {
        self.module
    }

    /// The hub's resolver; modules keep a clone and resolve handles per call.
    #[must_use]
    pub const fn infra(&self) -> &Infrastructure {
        &self.infra
    }

    /// The module's validated configuration subtree.
    #[must_use]
    pub const fn section(&self) -> &Value {
        &self.section
    }

    /// Decodes the subtree into the module's typed settings.
    ///
    /// # Errors
    /// [`ConfigError::InvalidModuleConfig`] when decoding fails.
    pub fn settings<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        T::deserialize(&self.section)
            .map_err(|e| ConfigError::invalid_module(self.module, e.to_string()))
    }
}

/// A pluggable domain module.
#[async_trait]
pub trait HubModule: Debug + Send + Sync {
    fn name(&self) -> ModuleName;

    /// Structural requirements on the module's configuration subtree, checked before
    /// [`init`](Self::init) runs.
    fn requirements(&self) -> RequiredFields;

    /// Builds the module's descriptor.
    ///
    /// # Errors
    /// [`ConfigError::InvalidModuleConfig`] if the subtree cannot be decoded.
    async fn init(&self, ctx: ModuleContext) -> Result<ModuleDescriptor, ConfigError>;
}

/// The modules a hub may load, iterated in [`ModuleName`] order.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    modules: BTreeMap<ModuleName, Arc<dyn HubModule>>,
}

impl ModuleCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `module`, replacing any module registered under the same name.
    #[must_use]
    pub fn register(mut self, module: impl HubModule + 'static) -> Self {
        self.modules.insert(module.name(), Arc::new(module));
        self
    }

    #[must_use]
    pub fn get(&self, name: ModuleName) -> Option<&Arc<dyn HubModule>> {
        self.modules.get(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModuleName, &Arc<dyn HubModule>)> {
        self.modules.iter().map(|(name, module)| (*name, module))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
