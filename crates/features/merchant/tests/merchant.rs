use async_trait::async_trait;
use chub_kernel::domain::config::MailerDescriptor;
use chub_kernel::error::OperationError;
use chub_kernel::hub::{Hub, HubBuilder};
use chub_kernel::mailer::{Mail, MailTransport, MailerConnector, MailerError, MemoryTransport};
use chub_kernel::module::ModuleCatalog;
use chub_merchant::Merchant;
use serde_json::{Value, json};
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Refuses every mail while `down` is set.
#[derive(Debug, Default)]
struct FlakyTransport {
    down: AtomicBool,
    delivered: AtomicUsize,
}

#[async_trait]
impl MailTransport for FlakyTransport {
    async fn send(&self, _mail: &Mail) -> Result<(), MailerError> {
        if self.down.load(Ordering::SeqCst) {
            let message = "connection refused".into();
            return Err(MailerError::Transport { message, context: None });
        }
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Default)]
struct FlakyConnector(Arc<FlakyTransport>);

#[async_trait]
impl MailerConnector for FlakyConnector {
    async fn connect(
        &self,
        _descriptor: &MailerDescriptor,
    ) -> Result<Arc<dyn MailTransport>, MailerError> {
        Ok(self.0.clone())
    }
}

async fn hub() -> Hub {
    hub_with(Hub::builder()).await
}

async fn hub_with(builder: HubBuilder) -> Hub {
    builder
        .catalog(ModuleCatalog::new().register(Merchant))
        .configure(&json!({
            "modules": { "merchant": true },
            "database": { "default": { "uri": "mem://shop" } },
            "mailer": {
                "default": { "service": "memory", "address": "hub@example.com" },
                "receipts": { "service": "memory", "address": "billing@example.com" },
            },
            "merchant": {
                "products": "products",
                "carts": "carts",
                "charges": "charges",
                "currency": "EUR",
                "mailer": "receipts",
            },
        }))
        .await
        .expect("merchant hub")
}

async fn product(hub: &Hub, name: &str, price: f64) -> String {
    let created = hub
        .call("create", "product", json!({ "name": name, "price": price }))
        .await
        .unwrap();
    created["_id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn products_need_a_unique_name_and_valid_price() {
    let hub = hub().await;
    product(&hub, "Mug", 4.5).await;

    let err = hub
        .call("create", "product", json!({ "name": "Mug", "price": 1 }))
        .await
        .unwrap_err();
    assert!(err.is_conflict());

    for price in [json!(-1), json!("free"), Value::Null] {
        let err = hub
            .call("create", "product", json!({ "name": "Tee", "price": price }))
            .await
            .unwrap_err();
        assert!(matches!(err, OperationError::Validation { .. }), "{price}");
    }

    let edited = hub.call("edit", "product", json!({ "name": "Mug", "price": 5 })).await.unwrap();
    assert_eq!(edited, json!({ "edited": 1 }));
    let found = hub.call("get", "product", json!({ "name": "Mug" })).await.unwrap();
    assert_eq!(found[0]["price"], 5);

    assert!(
        hub.call("remove", "product", json!({ "name": "Tee" })).await.unwrap_err().is_not_found()
    );
}

#[tokio::test]
async fn renaming_onto_an_existing_product_conflicts() {
    let hub = hub().await;
    let mug = product(&hub, "Mug", 4.5).await;
    product(&hub, "Tee", 20.0).await;

    let err = hub.call("edit", "product", json!({ "_id": mug, "name": "Tee" })).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn cart_is_created_on_first_add_and_accumulates() {
    let hub = hub().await;
    let mug = product(&hub, "Mug", 4.5).await;

    hub.call("add", "cart", json!({ "cart": "c1", "product": mug })).await.unwrap();
    let cart = hub
        .call("add", "cart", json!({ "cart": "c1", "product": mug, "quantity": 2 }))
        .await
        .unwrap();
    assert_eq!(cart["items"], json!([{ "product": mug, "quantity": 3 }]));

    let carts = hub.call("get", "cart", json!({ "cart": "c1" })).await.unwrap();
    assert_eq!(carts.as_array().unwrap().len(), 1);

    let err = hub
        .call("add", "cart", json!({ "cart": "c1", "product": "nope" }))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    let err = hub
        .call("add", "cart", json!({ "cart": "c1", "product": mug, "quantity": 0 }))
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::Validation { .. }));
}

#[tokio::test]
async fn remove_cart_drops_a_line_or_the_whole_cart() {
    let hub = hub().await;
    let mug = product(&hub, "Mug", 4.5).await;
    hub.call("add", "cart", json!({ "cart": "c1", "product": mug })).await.unwrap();

    assert_eq!(
        hub.call("remove", "cart", json!({ "cart": "c1", "product": mug })).await.unwrap(),
        json!({ "removed": 1 })
    );
    let err = hub
        .call("remove", "cart", json!({ "cart": "c1", "product": mug }))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(
        hub.call("remove", "cart", json!({ "cart": "c1" })).await.unwrap(),
        json!({ "removed": 1 })
    );
    let carts = hub.call("get", "cart", json!({ "cart": "c1" })).await.unwrap();
    assert!(carts.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn charge_totals_the_cart_and_completion_mails_a_receipt() {
    let hub = hub().await;
    let mug = product(&hub, "Mug", 4.5).await;
    let tee = product(&hub, "Tee", 20.0).await;
    hub.call("add", "cart", json!({ "cart": "c1", "product": mug, "quantity": 2 })).await.unwrap();
    hub.call("add", "cart", json!({ "cart": "c1", "product": tee })).await.unwrap();

    let charge = hub.call("create", "charge", json!({ "cart": "c1" })).await.unwrap();
    assert_eq!(charge["total"], 29.0);
    assert_eq!(charge["currency"], "EUR");
    assert_eq!(charge["status"], "pending");
    let id = charge["_id"].as_str().unwrap();

    let err = hub
        .call("complete", "charge", json!({ "_id": id, "email": "not-an-email" }))
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::Validation { .. }));

    let done = hub
        .call("complete", "charge", json!({ "_id": id, "email": "ann@example.com" }))
        .await
        .unwrap();
    assert_eq!(done["status"], "complete");

    let receipts = hub.mailer(Some("receipts")).await.unwrap();
    let sent = receipts.downcast_ref::<MemoryTransport>().unwrap().sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ann@example.com");
    assert!(sent[0].body.contains("Total: 29.00 EUR"));

    let default = hub.mailer(None).await.unwrap();
    assert!(default.downcast_ref::<MemoryTransport>().unwrap().sent().is_empty());

    let err = hub
        .call("complete", "charge", json!({ "_id": id, "email": "ann@example.com" }))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn charges_need_a_non_empty_cart() {
    let hub = hub().await;
    assert!(
        hub.call("create", "charge", json!({ "cart": "ghost" })).await.unwrap_err().is_not_found()
    );
    let ghost = json!({ "_id": "ghost", "email": "a@b.io" });
    assert!(hub.call("complete", "charge", ghost).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn failed_receipt_leaves_the_charge_pending_for_a_retry() {
    let connector = FlakyConnector::default();
    connector.0.down.store(true, Ordering::SeqCst);
    let hub = hub_with(Hub::builder().mailer_connector(connector.clone())).await;

    let mug = product(&hub, "Mug", 4.5).await;
    hub.call("add", "cart", json!({ "cart": "c1", "product": mug })).await.unwrap();
    let charge = hub.call("create", "charge", json!({ "cart": "c1" })).await.unwrap();
    let complete = json!({ "_id": charge["_id"], "email": "ann@example.com" });

    let err = hub.call("complete", "charge", complete.clone()).await.unwrap_err();
    assert!(matches!(err, OperationError::Mail { .. }));
    let stored = hub.call("get", "charge", json!({ "_id": charge["_id"] })).await.unwrap();
    assert_eq!(stored[0]["status"], "pending");

    connector.0.down.store(false, Ordering::SeqCst);
    let done = hub.call("complete", "charge", complete).await.unwrap();
    assert_eq!(done["status"], "complete");
    assert_eq!(connector.0.delivered.load(Ordering::SeqCst), 1);
}
