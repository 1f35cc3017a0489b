//! # Database Infrastructure
//!
//! The document-store contract consumed by every hub module, plus the pieces needed to turn
//! a [`DatabaseDescriptor`] into a live connection.
//!
//! ## Key Features
//! - **Four generic operations**: `create`, `get`, `edit`, `remove` over JSON documents
//!   grouped in named collections.
//! - **Pluggable engines**: a [`DatabaseConnector`] maps a descriptor to a store.
//!   [`UriConnector`] ships the in-process `mem://` engine.
//! - **Cheap handles**: [`Database`] is an `Arc` wrapper that dereferences to the store.
//!
//! ## Example
//!
//! ```rust
//! use chub_database::{
//!     Database, DatabaseConnector, DatabaseError, DocumentStore, UriConnector, document,
//! };
//! use chub_domain::config::DatabaseDescriptor;
//! use serde_json::json;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), DatabaseError> {
//!     let descriptor = DatabaseDescriptor::new("mem://blog");
//!     let store = UriConnector.connect(&descriptor).await?;
//!     let db = Database::new("default", &descriptor.uri, store);
//!
//!     let post = document(json!({ "title": "Hello" }))?;
//!     let unique = document(json!({ "title": "Hello" }))?;
//!     db.create("posts", post, &unique).await?;
//!
//!     let found = db.get("posts", &unique, None).await?;
//!     assert_eq!(found.len(), 1);
//!     Ok(())
//! }
//! ```

mod error;
mod memory;

pub use crate::error::{DatabaseError, DatabaseErrorExt};
pub use crate::memory::MemoryStore;

use async_trait::async_trait;
use chub_domain::config::DatabaseDescriptor;
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;
use tracing::{info, instrument};

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Field holding the store-generated document identifier.
pub const ID_FIELD: &str = "_id";

const ID_LENGTH: usize = 12;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Generates an unambiguous, URL-safe document identifier.
#[must_use]
pub fn new_id() -> String {
    nanoid::nanoid!(ID_LENGTH, SAFE_ALPHABET)
}

/// The generic document-store contract.
///
/// Criteria match documents whose top-level fields equal every criteria entry; empty
/// criteria match every document of the collection.
#[async_trait]
pub trait DocumentStore: Debug + Send + Sync {
    /// Inserts `document`, assigning `_id` when absent.
    ///
    /// # Errors
    /// [`DatabaseError::Conflict`] if a document matches a non-empty `unique`.
    async fn create(
        &self,
        collection: &str,
        document: Document,
        unique: &Document,
    ) -> Result<Document, DatabaseError>;

    /// Returns matching documents in insertion order; an empty result is not an error.
    ///
    /// # Errors
    /// [`DatabaseError::Validation`] on an empty collection name.
    async fn get(
        &self,
        collection: &str,
        criteria: &Document,
        limit: Option<usize>,
    ) -> Result<Vec<Document>, DatabaseError>;

    /// Merges `patch` into every matching document and returns how many were edited.
    ///
    /// # Errors
    /// [`DatabaseError::NotFound`] if nothing matches.
    async fn edit(
        &self,
        collection: &str,
        criteria: &Document,
        patch: &Document,
    ) -> Result<usize, DatabaseError>;

    /// Deletes every matching document and returns how many were removed.
    ///
    /// # Errors
    /// [`DatabaseError::NotFound`] if nothing matches.
    async fn remove(&self, collection: &str, criteria: &Document) -> Result<usize, DatabaseError>;
}

/// Establishes document-store connections from descriptors.
#[async_trait]
pub trait DatabaseConnector: Debug + Send + Sync {
    /// # Errors
    /// [`DatabaseError::Connection`] when the store cannot be reached.
    async fn connect(
        &self,
        descriptor: &DatabaseDescriptor,
    ) -> Result<Arc<dyn DocumentStore>, DatabaseError>;
}

/// Picks an engine from the URI scheme. Only `mem://` is built in.
#[derive(Debug, Default, Clone, Copy)]
pub struct UriConnector;

#[async_trait]
impl DatabaseConnector for UriConnector {
    #[instrument(skip(self), fields(uri = %descriptor.uri))]
    async fn connect(
        &self,
        descriptor: &DatabaseDescriptor,
    ) -> Result<Arc<dyn DocumentStore>, DatabaseError> {
        match descriptor.uri.split_once("://") {
            Some(("mem", label)) => Ok(Arc::new(MemoryStore::new(label))),
            Some((scheme, _)) => Err(DatabaseError::Connection {
                message: format!("Unsupported engine '{scheme}'").into(),
                context: Some(descriptor.uri.clone().into()),
            }),
            None => Err(DatabaseError::Validation {
                message: format!("URI '{}' has no scheme", descriptor.uri).into(),
                context: None,
            }),
        }
    }
}

/// Inner state of the [`Database`] handle.
#[derive(Debug)]
pub struct DatabaseInner {
    name: String,
    uri: String,
    store: Arc<dyn DocumentStore>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(name = %self.name, uri = %self.uri, "Document store handle dropped");
    }
}

/// An established document-store connection bound to a logical name.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self { inner: Arc::new(DatabaseInner { name: name.into(), uri: uri.into(), store }) }
    }

    /// Logical name the handle was resolved under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn uri(&self) -> &str {
        &self.inner.uri
    }

    /// Whether both handles share one underlying connection.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for Database {
    type Target = dyn DocumentStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner.store
    }
}

/// Converts a JSON value into a [`Document`].
///
/// # Errors
/// [`DatabaseError::Validation`] if `value` is not an object.
pub fn document(value: Value) -> Result<Document, DatabaseError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::Validation {
            message: format!("expected an object, got {}", kind_of(&other)).into(),
            context: None,
        }),
    }
}

/// Rejects empty collection names.
///
/// # Errors
/// [`DatabaseError::Validation`] if `collection` is blank.
pub fn ensure_collection(collection: &str) -> Result<(), DatabaseError> {
    if collection.trim().is_empty() {
        return Err(DatabaseError::Validation {
            message: "collection name is required".into(),
            context: None,
        });
    }
    Ok(())
}

/// Top-level equality match of `criteria` against `document`.
#[must_use]
pub fn matches(document: &Document, criteria: &Document) -> bool {
    criteria.iter().all(|(key, expected)| document.get(key) == Some(expected))
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
