use crate::{
    DatabaseError, Document, DocumentStore, ID_FIELD, ensure_collection, matches, new_id,
};
use async_trait::async_trait;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::trace;

/// In-process document store backing `mem://` URIs.
///
/// Every instance is an isolated database; collections are created on first insert.
#[derive(Debug, Default)]
pub struct MemoryStore {
    label: String,
    collections: RwLock<FxHashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), collections: RwLock::default() }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of documents currently stored in `collection`.
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create(
        &self,
        collection: &str,
        mut document: Document,
        unique: &Document,
    ) -> Result<Document, DatabaseError> {
        ensure_collection(collection)?;

        let mut collections = self.collections.write();
        let documents = collections.entry(collection.to_owned()).or_default();

        if !unique.is_empty() && documents.iter().any(|doc| matches(doc, unique)) {
            return Err(DatabaseError::Conflict {
                message: format!("{} in '{collection}'", Value::Object(unique.clone())).into(),
                context: None,
            });
        }

        if !document.get(ID_FIELD).is_some_and(Value::is_string) {
            document.insert(ID_FIELD.to_owned(), Value::String(new_id()));
        }
        documents.push(document.clone());
        trace!(store = %self.label, collection, "Document created");

        Ok(document)
    }

    async fn get(
        &self,
        collection: &str,
        criteria: &Document,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, DatabaseError> {
        ensure_collection(collection)?;

        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        Ok(documents
            .iter()
            .filter(|doc| matches(doc, criteria))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn edit(
        &self,
        collection: &str,
        criteria: &Document,
        patch: &Document,
    ) -> Result<usize, DatabaseError> {
        ensure_collection(collection)?;

        let mut collections = self.collections.write();
        let mut edited = 0;
        if let Some(documents) = collections.get_mut(collection) {
            for doc in documents.iter_mut().filter(|doc| matches(doc, criteria)) {
                for (key, value) in patch.iter().filter(|(key, _)| key.as_str() != ID_FIELD) {
                    doc.insert(key.clone(), value.clone());
                }
                edited += 1;
            }
        }

        if edited == 0 {
            return Err(not_found(collection, criteria));
        }
        trace!(store = %self.label, collection, edited, "Documents edited");
        Ok(edited)
    }

    async fn remove(&self, collection: &str, criteria: &Document) -> Result<usize, DatabaseError> {
        ensure_collection(collection)?;

        let mut collections = self.collections.write();
        let removed = collections.get_mut(collection).map_or(0, |documents| {
            let before = documents.len();
            documents.retain(|doc| !matches(doc, criteria));
            before - documents.len()
        });

        if removed == 0 {
            return Err(not_found(collection, criteria));
        }
        trace!(store = %self.label, collection, removed, "Documents removed");
        Ok(removed)
    }
}

fn not_found(collection: &str, criteria: &Document) -> DatabaseError {
    DatabaseError::NotFound {
        message: format!("{} in '{collection}'", Value::Object(criteria.clone())).into(),
        context: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        document(value).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_ids_and_enforces_uniqueness() {
        let store = MemoryStore::new("test");
        let created = store
            .create("users", doc(json!({ "email": "a@b.io" })), &doc(json!({ "email": "a@b.io" })))
            .await
            .unwrap();
        assert!(created.get(ID_FIELD).and_then(Value::as_str).is_some());

        let err = store
            .create("users", doc(json!({ "email": "a@b.io" })), &doc(json!({ "email": "a@b.io" })))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict { .. }));
        assert_eq!(store.count("users"), 1);
    }

    #[tokio::test]
    async fn empty_unique_criteria_skip_the_check() {
        let store = MemoryStore::new("test");
        for _ in 0..2 {
            store.create("visits", doc(json!({ "path": "/" })), &Document::new()).await.unwrap();
        }
        assert_eq!(store.count("visits"), 2);
    }

    #[tokio::test]
    async fn edit_never_rewrites_ids() {
        let store = MemoryStore::new("test");
        let created =
            store.create("posts", doc(json!({ "title": "A" })), &Document::new()).await.unwrap();

        store
            .edit("posts", &doc(json!({ "title": "A" })), &doc(json!({ "_id": "x", "title": "B" })))
            .await
            .unwrap();

        let found = store.get("posts", &Document::new(), None).await.unwrap();
        assert_eq!(found[0].get(ID_FIELD), created.get(ID_FIELD));
        assert_eq!(found[0].get("title"), Some(&json!("B")));
    }
}
