use crate::service::{Shop, criteria_by, listing};
use chub_kernel::database::matches;
use chub_kernel::prelude::*;
use serde_json::{Value, json};
use tracing::{info, instrument};

pub(crate) const NAME_FIELD: &str = "name";
pub(crate) const PRICE_FIELD: &str = "price";

impl Shop {
    /// Stores a product; `name` is unique and `price` a non-negative number.
    #[instrument(skip_all)]
    pub async fn create_product(&self, payload: Value) -> OperationResult {
        let mut product = object(payload)?;
        let name = require_str(&product, NAME_FIELD)?.to_owned();
        price(&product)?;
        product.remove(ID_FIELD);

        let unique = document(json!({ NAME_FIELD: name }))?;
        let db = self.database().await?;
        let created = db.create(&self.settings.products, product, &unique).await?;
        info!(%name, "Product created");
        Ok(Value::Object(created))
    }

    /// Products by `_id` or `name`, or the whole catalog.
    #[instrument(skip_all)]
    pub async fn get_product(&self, payload: Value) -> OperationResult {
        let criteria = criteria_by(&object(payload)?, &[ID_FIELD, NAME_FIELD])?.unwrap_or_default();
        let found = self.database().await?.get(&self.settings.products, &criteria, None).await?;
        Ok(listing(found))
    }

    #[instrument(skip_all)]
    pub async fn edit_product(&self, payload: Value) -> OperationResult {
        let mut patch = object(payload)?;
        let criteria = require_product(&patch)?;
        for key in criteria.keys() {
            patch.remove(key);
        }
        patch.remove(ID_FIELD);
        if patch.contains_key(PRICE_FIELD) {
            price(&patch)?;
        }
        if patch.is_empty() {
            return Err(OperationError::validation("nothing to edit"));
        }

        let db = self.database().await?;
        if let Some(name) = optional_str(&patch, NAME_FIELD) {
            let taken = document(json!({ NAME_FIELD: name }))?;
            let holders = db.get(&self.settings.products, &taken, None).await?;
            if holders.iter().any(|holder| !matches(holder, &criteria)) {
                return Err(OperationError::conflict(format!("product '{name}' already exists")));
            }
        }

        let edited = db.edit(&self.settings.products, &criteria, &patch).await?;
        Ok(json!({ "edited": edited }))
    }

    #[instrument(skip_all)]
    pub async fn remove_product(&self, payload: Value) -> OperationResult {
        let criteria = require_product(&object(payload)?)?;
        let removed = self.database().await?.remove(&self.settings.products, &criteria).await?;
        Ok(json!({ "removed": removed }))
    }
}

fn require_product(payload: &Document) -> Result<Document, OperationError> {
    criteria_by(payload, &[ID_FIELD, NAME_FIELD])?
        .ok_or_else(|| OperationError::validation("'_id' or 'name' is required"))
}

/// The product's `price`, rejecting negative and non-numeric values.
pub(crate) fn price(product: &Document) -> Result<f64, OperationError> {
    product
        .get(PRICE_FIELD)
        .and_then(Value::as_f64)
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or_else(|| OperationError::validation("'price' must be a non-negative number"))
}
