use async_trait::async_trait;
use chub::domain::config::DatabaseDescriptor;
use chub::domain::modules::{ModuleName, ModuleSet};
use chub::kernel::baseline;
use chub::kernel::database::{DatabaseConnector, DatabaseError, DocumentStore, UriConnector};
use chub::{ConfigError, SetupError};
use serde_json::{Value, json};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default)]
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

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn full_config(uri: &str) -> Value {
    json!({
        "modules": { "scout": true, "merchant": true, "author": true, "admin": true },
        "database": { "default": { "uri": uri } },
        "mailer": { "default": { "service": "memory", "address": "hub@example.com" } },
        "admin": { "collection": "admins", "roles": ["owner", "viewer"], "fields": {} },
        "author": { "posts": "posts", "pages": "pages", "fields": {} },
        "merchant": {
            "products": "products",
            "carts": "carts",
            "charges": "charges",
            "currency": "USD"
        },
        "scout": { "visits": "visits", "rules": "rules" },
    })
}

#[test]
fn catalog_holds_every_module_in_load_order() {
    let catalog = chub::catalog();
    let names: Vec<_> = catalog.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ModuleName::ALL.to_vec());
}

#[tokio::test]
async fn every_module_publishes_its_operations() {
    init_tracing();
    let hub = chub::configure(&full_config("mem://full")).await.unwrap();

    assert_eq!(hub.modules(), ModuleSet::ALL);
    for (verb, noun) in [
        ("login", "admin"),
        ("publish", "post"),
        ("publish", "page"),
        ("complete", "charge"),
        ("add", "cart"),
        ("authorize", "address"),
        ("get", "rule"),
        ("validate", "email"),
        ("get", "database"),
    ] {
        assert!(hub.contains(verb, noun), "{verb}.{noun}");
    }
    assert_eq!(hub.get("add", "visit").unwrap().owner, "scout");
}

#[tokio::test]
async fn missing_default_database_establishes_nothing() {
    init_tracing();
    let counter = CountingConnector::default();
    let mut config = full_config("mem://none");
    config["database"] = json!({ "reports": { "uri": "mem://reports" } });

    let err = chub::builder()
        .database_connector(counter.clone())
        .configure(&config)
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::MissingDatabaseDefault { .. }));
    assert_eq!(counter.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn admin_without_roles_is_rejected() {
    let mut config = full_config("mem://roles");
    config["admin"]["roles"] = json!([]);
    let err = chub::configure(&config).await.unwrap_err();
    assert_eq!(err.module(), Some(ModuleName::Admin));

    let mut config = full_config("mem://roles");
    config.as_object_mut().unwrap().remove("admin");
    let err = chub::configure(&config).await.unwrap_err();
    assert!(matches!(err, ConfigError::InvalidModuleConfig { module: ModuleName::Admin, .. }));
}

#[tokio::test]
async fn no_modules_leaves_the_baseline_only() {
    let mut config = full_config("mem://bare");
    config["modules"] = json!({});
    let hub = chub::configure(&config).await.unwrap();

    assert!(hub.modules().is_empty());
    let verbs: Vec<_> = hub.verbs().collect();
    assert_eq!(verbs, vec!["get", "sanitize", "set", "validate"]);
    assert!(hub.entries().all(|(_, _, capability)| {
        [baseline::PRIMITIVES, baseline::INFRASTRUCTURE].contains(&capability.owner.as_str())
    }));
}

#[tokio::test]
async fn hubs_are_isolated_from_each_other() {
    init_tracing();
    let (left_config, right_config) = (full_config("mem://left"), full_config("mem://right"));
    let (left, right) = tokio::join!(chub::configure(&left_config), chub::configure(&right_config));
    let (left, right) = (left.unwrap(), right.unwrap());

    let (l, r) = (left.database(None).await.unwrap(), right.database(None).await.unwrap());
    assert!(!l.same_as(&r));
    assert_eq!((l.uri(), r.uri()), ("mem://left", "mem://right"));

    left.call("create", "post", json!({ "title": "Only left" })).await.unwrap();
    let posts = right.call("get", "post", Value::Null).await.unwrap();
    assert!(posts.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn configure_file_reads_toml() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[modules]
scout = true

[database.default]
uri = "mem://file"

[mailer.default]
service = "memory"
address = "hub@example.com"

[scout]
visits = "visits"
rules = "rules"
"#
    )
    .unwrap();

    let hub = chub::configure_file(file.path()).await.unwrap();
    assert!(hub.modules().has(ModuleName::Scout));

    let err = chub::configure_file(file.path().with_extension("missing.toml")).await.unwrap_err();
    assert!(matches!(err, SetupError::Load { .. }));
}
