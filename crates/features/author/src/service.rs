use crate::slug::slugify;
use chub_kernel::database::matches;
use chub_kernel::prelude::*;
use chub_kernel::domain::lookup::{LABEL_FIELD, TITLE_FIELD};
use serde_json::{Value, json};
use tracing::{info, instrument};

pub(crate) const PUBLISHED_FIELD: &str = "published";
const LIMIT_FIELD: &str = "limit";

/// One kind of content (posts or pages) stored in its own collection.
#[chub_derive::hub_slice]
pub struct Content {
    pub kind: &'static str,
    pub collection: String,
    pub fields: RequiredFields,
    database: Option<String>,
    infra: Infrastructure,
}

impl Content {
    #[must_use]
    pub fn with(
        kind: &'static str,
        collection: String,
        fields: RequiredFields,
        database: Option<String>,
        infra: Infrastructure,
    ) -> Self {
        Self::new(ContentInner { kind, collection, fields, database, infra })
    }

    async fn database(&self) -> Result<Database, OperationError> {
        Ok(self.infra.database(self.database.as_deref()).await?)
    }

    /// Stores a new unpublished document, deriving `label` from `title` when absent.
    #[instrument(skip_all, fields(kind = self.kind))]
    pub async fn create(&self, payload: Value) -> OperationResult {
        let mut doc = object(payload)?;
        check_object(&self.fields, &doc)?;
        let title = require_str(&doc, TITLE_FIELD)?;

        let label = match optional_str(&doc, LABEL_FIELD) {
            Some(label) => slugify(label),
            None => slugify(title),
        };
        if label.is_empty() {
            let message = format!("cannot derive a label for this {}", self.kind);
            return Err(OperationError::validation(message));
        }
        doc.insert(LABEL_FIELD.to_owned(), Value::String(label.clone()));
        doc.insert(PUBLISHED_FIELD.to_owned(), Value::Bool(false));
        doc.remove(ID_FIELD);

        let unique = document(json!({ LABEL_FIELD: label }))?;
        let created = self.database().await?.create(&self.collection, doc, &unique).await?;
        info!(%label, "Content created");
        Ok(Value::Object(created))
    }

    /// One document by lookup, or the whole collection (up to `limit`) without one.
    #[instrument(skip_all, fields(kind = self.kind))]
    pub async fn get(&self, payload: Value) -> OperationResult {
        let payload = object(payload)?;
        let limit =
            payload.get(LIMIT_FIELD).and_then(Value::as_u64).and_then(|l| usize::try_from(l).ok());
        let criteria = lookup(&payload).map(criteria).transpose()?.unwrap_or_default();

        let found = self.database().await?.get(&self.collection, &criteria, limit).await?;
        Ok(Value::Array(found.into_iter().map(Value::Object).collect()))
    }

    #[instrument(skip_all, fields(kind = self.kind))]
    pub async fn edit(&self, payload: Value) -> OperationResult {
        let mut patch = object(payload)?;
        let lookup = self.require_lookup(&patch)?;
        patch.remove(lookup.field());
        patch.remove(ID_FIELD);
        if patch.is_empty() {
            return Err(OperationError::validation("nothing to edit"));
        }

        let db = self.database().await?;
        let criteria = criteria(lookup)?;
        if patch.contains_key(LABEL_FIELD) {
            let label = slugify(require_str(&patch, LABEL_FIELD)?);
            if label.is_empty() {
                let message = format!("'label' of a {} cannot be empty", self.kind);
                return Err(OperationError::validation(message));
            }
            let targets = db.get(&self.collection, &criteria, None).await?;
            if targets.len() > 1 {
                let shared = targets.len();
                let message = format!("label '{label}' would be shared by {shared} documents");
                return Err(OperationError::conflict(message));
            }
            let taken = document(json!({ LABEL_FIELD: label }))?;
            let holders = db.get(&self.collection, &taken, None).await?;
            if holders.iter().any(|holder| !matches(holder, &criteria)) {
                let message = format!("{} label '{label}' already exists", self.kind);
                return Err(OperationError::conflict(message));
            }
            patch.insert(LABEL_FIELD.to_owned(), Value::String(label));
        }

        let edited = db.edit(&self.collection, &criteria, &patch).await?;
        Ok(json!({ "edited": edited }))
    }

    #[instrument(skip_all, fields(kind = self.kind))]
    pub async fn remove(&self, payload: Value) -> OperationResult {
        let lookup = self.require_lookup(&object(payload)?)?;
        let removed = self.database().await?.remove(&self.collection, &criteria(lookup)?).await?;
        Ok(json!({ "removed": removed }))
    }

    #[instrument(skip_all, fields(kind = self.kind))]
    pub async fn publish(&self, payload: Value) -> OperationResult {
        let lookup = self.require_lookup(&object(payload)?)?;
        let patch = document(json!({ PUBLISHED_FIELD: true }))?;
        let db = self.database().await?;
        let published = db.edit(&self.collection, &criteria(lookup)?, &patch).await?;
        Ok(json!({ "published": published }))
    }

    fn require_lookup(&self, payload: &Document) -> Result<Lookup, OperationError> {
        lookup(payload).ok_or_else(|| {
            OperationError::validation(format!("a {} needs '_id', 'label' or 'title'", self.kind))
        })
    }
}

fn lookup(payload: &Document) -> Option<Lookup> {
    Lookup::from_keys(|key| optional_str(payload, key))
}

fn criteria(lookup: Lookup) -> Result<Document, OperationError> {
    Ok(document(json!({ lookup.field(): lookup.value() }))?)
}
