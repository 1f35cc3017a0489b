use chub_author::Author;
use chub_kernel::error::OperationError;
use chub_kernel::hub::Hub;
use chub_kernel::module::ModuleCatalog;
use serde_json::{Value, json};

async fn hub() -> Hub {
    Hub::builder()
        .catalog(ModuleCatalog::new().register(Author))
        .configure(&json!({
            "modules": { "author": true },
            "database": { "default": { "uri": "mem://author" } },
            "mailer": { "default": { "service": "memory", "address": "hub@example.com" } },
            "author": { "posts": "posts", "pages": "pages", "fields": { "title": "string" } },
        }))
        .await
        .expect("author hub")
}

#[tokio::test]
async fn create_derives_label_and_starts_unpublished() {
    let hub = hub().await;
    let post = hub
        .call("create", "post", json!({ "title": "Hello, World!", "body": "hi" }))
        .await
        .unwrap();

    assert_eq!(post["label"], "hello-world");
    assert_eq!(post["published"], false);
    assert!(post["_id"].is_string());

    let err = hub.call("create", "post", json!({ "title": "hello world" })).await.unwrap_err();
    assert!(err.is_conflict());

    // Same label in another collection is fine.
    assert!(hub.call("create", "page", json!({ "title": "Hello, World!" })).await.is_ok());
}

#[tokio::test]
async fn lookups_prefer_id_then_label_then_title() {
    let hub = hub().await;
    let post = hub
        .call("create", "post", json!({ "title": "First", "label": "one" }))
        .await
        .unwrap();
    hub.call("create", "post", json!({ "title": "Second" })).await.unwrap();

    let by_id = hub
        .call("get", "post", json!({ "_id": post["_id"], "title": "Second" }))
        .await
        .unwrap();
    assert_eq!(by_id[0]["title"], "First");

    let by_label = hub.call("get", "post", json!({ "label": "one" })).await.unwrap();
    assert_eq!(by_label[0]["title"], "First");

    let by_title = hub.call("get", "post", json!({ "title": "Second" })).await.unwrap();
    assert_eq!(by_title[0]["label"], "second");

    let all = hub.call("get", "post", Value::Null).await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);
    let limited = hub.call("get", "post", json!({ "limit": 1 })).await.unwrap();
    assert_eq!(limited.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn publish_edit_and_remove_need_a_lookup() {
    let hub = hub().await;
    hub.call("create", "page", json!({ "title": "About" })).await.unwrap();

    let err = hub.call("publish", "page", json!({})).await.unwrap_err();
    assert!(matches!(err, OperationError::Validation { .. }));

    assert_eq!(
        hub.call("publish", "page", json!({ "label": "about" })).await.unwrap(),
        json!({ "published": 1 })
    );
    let page = hub.call("get", "page", json!({ "label": "about" })).await.unwrap();
    assert_eq!(page[0]["published"], true);

    let edited = hub.call("edit", "page", json!({ "label": "about", "body": "Us" })).await.unwrap();
    assert_eq!(edited, json!({ "edited": 1 }));

    assert_eq!(
        hub.call("remove", "page", json!({ "title": "About" })).await.unwrap(),
        json!({ "removed": 1 })
    );
    assert!(
        hub.call("remove", "page", json!({ "title": "About" })).await.unwrap_err().is_not_found()
    );
}

#[tokio::test]
async fn create_checks_configured_fields() {
    let hub = hub().await;
    let err = hub.call("create", "post", json!({ "body": "untitled" })).await.unwrap_err();
    assert!(err.to_string().contains("title"));
}

#[tokio::test]
async fn edited_labels_are_slugged_and_stay_unique() {
    let hub = hub().await;
    hub.call("create", "post", json!({ "title": "First" })).await.unwrap();
    let second = hub.call("create", "post", json!({ "title": "Second" })).await.unwrap();

    let err = hub
        .call("edit", "post", json!({ "_id": second["_id"], "label": "First" }))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    let firsts = hub.call("get", "post", json!({ "label": "first" })).await.unwrap();
    assert_eq!(firsts.as_array().unwrap().len(), 1);

    let edited = hub
        .call("edit", "post", json!({ "_id": second["_id"], "label": "Second Post!!" }))
        .await
        .unwrap();
    assert_eq!(edited, json!({ "edited": 1 }));
    let renamed = hub.call("get", "post", json!({ "_id": second["_id"] })).await.unwrap();
    assert_eq!(renamed[0]["label"], "second-post");

    // Re-saving a document under its own label is not a conflict.
    let same = hub
        .call("edit", "post", json!({ "_id": second["_id"], "label": "second-post" }))
        .await;
    assert!(same.is_ok());

    let err = hub
        .call("edit", "post", json!({ "_id": second["_id"], "label": "!!" }))
        .await
        .unwrap_err();
    assert!(matches!(err, OperationError::Validation { .. }));
}

#[tokio::test]
async fn a_label_cannot_be_given_to_several_documents_at_once() {
    let hub = hub().await;
    hub.call("create", "page", json!({ "title": "Twin", "label": "twin-a" })).await.unwrap();
    hub.call("create", "page", json!({ "title": "Twin", "label": "twin-b" })).await.unwrap();

    let err = hub
        .call("edit", "page", json!({ "title": "Twin", "label": "twin" }))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}
