use async_trait::async_trait;
use chub_database::{DatabaseConnector, DatabaseError, DocumentStore, UriConnector};
use chub_domain::config::DatabaseDescriptor;
use chub_domain::fields::{FieldType, RequiredFields};
use chub_domain::modules::{ModuleName, ModuleSet};
use chub_kernel::error::ConfigError;
use chub_kernel::hub::Hub;
use chub_kernel::module::{HubModule, ModuleCatalog, ModuleContext, ModuleDescriptor};
use chub_kernel::registry::Operation;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Registers `get.widget` answering with its own module name.
#[derive(Debug)]
struct WidgetModule(ModuleName);

#[async_trait]
impl HubModule for WidgetModule {
    fn name(&self) -> ModuleName {
        self.0
    }

    fn requirements(&self) -> RequiredFields {
        RequiredFields::new()
    }

    async fn init(&self, ctx: ModuleContext) -> Result<ModuleDescriptor, ConfigError> {
        let owner = ctx.module().as_str();
        Ok(ModuleDescriptor::new(owner)
            .check("get", "widget", move |_| Ok(json!({ "owner": owner })))
            .check("get", owner, move |_| Ok(json!({ "owner": owner }))))
    }
}

#[derive(Debug, Deserialize)]
struct StrictSettings {
    #[allow(dead_code)]
    limit: u32,
}

/// Requires `limit` to be a number and decodes it as `u32`.
#[derive(Debug)]
struct StrictModule;

#[async_trait]
impl HubModule for StrictModule {
    fn name(&self) -> ModuleName {
        ModuleName::Scout
    }

    fn requirements(&self) -> RequiredFields {
        RequiredFields::new().with("limit", FieldType::Number)
    }

    async fn init(&self, ctx: ModuleContext) -> Result<ModuleDescriptor, ConfigError> {
        let _settings: StrictSettings = ctx.settings()?;
        Ok(ModuleDescriptor::new("strict"))
    }
}

/// Shadows the baseline `get.database` accessor.
#[derive(Debug)]
struct ShadowModule;

#[async_trait]
impl HubModule for ShadowModule {
    fn name(&self) -> ModuleName {
        ModuleName::Merchant
    }

    fn requirements(&self) -> RequiredFields {
        RequiredFields::new()
    }

    async fn init(&self, _ctx: ModuleContext) -> Result<ModuleDescriptor, ConfigError> {
        Ok(ModuleDescriptor::new("shadow").register(
            "get",
            "database",
            Operation::check(|_| Ok(json!("shadowed"))),
        ))
    }
}

#[derive(Debug, Default, Clone)]
struct CountingConnector(Arc<AtomicUsize>);

#[async_trait]
impl DatabaseConnector for CountingConnector {
    async fn connect(
        &self,
        descriptor: &DatabaseDescriptor,
    ) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        UriConnector.connect(descriptor).await
    }
}

fn config(modules: Value) -> Value {
    json!({
        "modules": modules,
        "database": { "default": { "uri": "mem://main" } },
        "mailer": {
            "default": { "service": "memory", "address": "hub@example.com", "password": "" }
        },
    })
}

fn widgets() -> ModuleCatalog {
    ModuleCatalog::new()
        .register(WidgetModule(ModuleName::Author))
        .register(WidgetModule(ModuleName::Admin))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

#[tokio::test]
async fn later_module_wins_regardless_of_key_order() {
    init_tracing();
    let admin_first = json!({ "admin": true, "author": true });
    let author_first = json!({ "author": true, "admin": true });
    for modules in [admin_first, author_first] {
        let hub = Hub::builder().catalog(widgets()).configure(&config(modules)).await.unwrap();

        assert_eq!(hub.get("get", "widget").unwrap().owner, "author");
        let out = hub.call("get", "widget", Value::Null).await.unwrap();
        assert_eq!(out, json!({ "owner": "author" }));
        assert!(hub.contains("get", "admin"));
        assert_eq!(hub.modules(), ModuleSet::ADMIN | ModuleSet::AUTHOR);
    }
}

#[tokio::test]
async fn disabled_modules_are_not_loaded() {
    let hub = Hub::builder()
        .catalog(widgets())
        .configure(&config(json!({ "admin": true, "author": false, "billing": true })))
        .await
        .unwrap();

    assert_eq!(hub.get("get", "widget").unwrap().owner, "admin");
    assert!(!hub.contains("get", "author"));
}

#[tokio::test]
async fn empty_module_set_publishes_only_the_baseline() {
    let hub = Hub::builder().catalog(widgets()).configure(&config(json!({}))).await.unwrap();

    let mut slots: Vec<_> = hub.entries().map(|(verb, noun, _)| format!("{verb}.{noun}")).collect();
    slots.sort();
    assert_eq!(
        slots,
        [
            "get.database",
            "get.mailer",
            "sanitize.email",
            "sanitize.html",
            "sanitize.string",
            "set.database",
            "set.mailer",
            "validate.email",
            "validate.equal",
            "validate.fields",
            "validate.password",
        ]
    );
    assert!(hub.modules().is_empty());
}

#[tokio::test]
async fn missing_default_database_performs_no_establishment() {
    let connector = CountingConnector::default();
    let mut broken = config(json!({ "admin": true }));
    broken["database"] = json!({ "default": { "url": "mem://main" } });

    let err = Hub::builder()
        .catalog(widgets())
        .database_connector(connector.clone())
        .configure(&broken)
        .await
        .unwrap_err();

    assert!(matches!(err, ConfigError::MissingDatabaseDefault { .. }));
    assert_eq!(connector.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn accessors_resolve_once_and_are_identity_equal() {
    let connector = CountingConnector::default();
    let hub = Hub::builder()
        .database_connector(connector.clone())
        .configure(&config(json!({})))
        .await
        .unwrap();

    let first = hub.database(Some("default")).await.unwrap();
    let second = hub.database(Some("default")).await.unwrap();
    assert!(first.same_as(&second));
    assert_eq!(connector.0.load(Ordering::SeqCst), 1);

    let described = hub.call("get", "database", json!({})).await.unwrap();
    assert_eq!(described, json!({ "name": "default", "uri": "mem://main" }));
}

#[tokio::test]
async fn hubs_share_nothing() {
    let mut other = config(json!({}));
    other["database"]["default"]["uri"] = json!("mem://other");

    let a = Hub::builder().configure(&config(json!({}))).await.unwrap();
    let b = Hub::builder().configure(&other).await.unwrap();

    let (da, db) = (a.database(None).await.unwrap(), b.database(None).await.unwrap());
    assert!(!da.same_as(&db));
    assert_eq!(da.uri(), "mem://main");
    assert_eq!(db.uri(), "mem://other");
}

#[tokio::test]
async fn undecodable_settings_fail_composition() {
    let catalog = ModuleCatalog::new().register(StrictModule);
    let mut cfg = config(json!({ "scout": true }));

    let err = Hub::builder().catalog(catalog.clone()).configure(&cfg).await.unwrap_err();
    assert_eq!(err.module(), Some(ModuleName::Scout));

    cfg["scout"] = json!({ "limit": -1 });
    let err = Hub::builder().catalog(catalog.clone()).configure(&cfg).await.unwrap_err();
    assert_eq!(err.module(), Some(ModuleName::Scout));

    cfg["scout"] = json!({ "limit": 10 });
    assert!(Hub::builder().catalog(catalog).configure(&cfg).await.is_ok());
}

#[tokio::test]
async fn modules_may_shadow_baseline_entries() {
    let hub = Hub::builder()
        .catalog(ModuleCatalog::new().register(ShadowModule))
        .configure(&config(json!({ "merchant": true })))
        .await
        .unwrap();

    assert_eq!(hub.get("get", "database").unwrap().owner, "shadow");
    assert_eq!(hub.call("get", "database", Value::Null).await.unwrap(), json!("shadowed"));
    assert!(hub.database(None).await.is_err());
}

#[tokio::test]
async fn selectors_repoint_defaults() {
    let mut cfg = config(json!({}));
    cfg["database"]["archive"] = json!({ "uri": "mem://archive" });
    let hub = Hub::builder().configure(&cfg).await.unwrap();

    let out = hub.call("set", "database", json!({ "name": "archive" })).await.unwrap();
    assert_eq!(out, json!({ "default": "archive" }));
    assert_eq!(hub.database(None).await.unwrap().uri(), "mem://archive");

    assert!(hub.select("database", "missing").is_err());
    assert!(hub.call("set", "database", json!({})).await.is_err());
}

#[tokio::test]
async fn unknown_operations_are_not_found() {
    let hub = Hub::builder().configure(&config(json!({}))).await.unwrap();
    let err = hub.call("get", "widget", Value::Null).await.unwrap_err();
    assert!(err.is_not_found());
}
