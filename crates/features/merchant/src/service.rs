use crate::settings::MerchantSettings;
use chub_kernel::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Shared state of every merchant operation.
#[chub_derive::hub_slice]
pub struct Shop {
    pub settings: MerchantSettings,
    infra: Infrastructure,
}

impl Shop {
    #[must_use]
    pub fn with(settings: MerchantSettings, infra: Infrastructure) -> Self {
        Self::new(ShopInner { settings, infra })
    }

    pub(crate) async fn database(&self) -> Result<Database, OperationError> {
        Ok(self.infra.database(self.settings.database.as_deref()).await?)
    }

    pub(crate) async fn mailer(&self) -> Result<Mailer, OperationError> {
        Ok(self.infra.mailer(self.settings.mailer.as_deref()).await?)
    }

    /// First document of `collection` whose `field` equals `value`.
    pub(crate) async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Document>, OperationError> {
        let criteria = document(json!({ field: value }))?;
        let found = self.database().await?.get(collection, &criteria, Some(1)).await?;
        Ok(found.into_iter().next())
    }
}

/// Criteria on the first of `keys` present in `payload`.
pub(crate) fn criteria_by(
    payload: &Document,
    keys: &[&str],
) -> Result<Option<Document>, OperationError> {
    let Some(key) = keys.iter().find(|key| payload.contains_key(**key)) else {
        return Ok(None);
    };
    let value = require_str(payload, key)?;
    Ok(Some(document(json!({ *key: value }))?))
}

/// Decodes a stored field, treating malformed data as an internal error.
pub(crate) fn stored<T: DeserializeOwned + Default>(
    doc: &Document,
    field: &str,
) -> Result<T, OperationError> {
    doc.get(field).map_or_else(
        || Ok(T::default()),
        |value| {
            serde_json::from_value(value.clone())
                .map_err(|e| OperationError::from(format!("stored '{field}' is malformed: {e}")))
        },
    )
}

pub(crate) fn listing(found: Vec<Document>) -> Value {
    Value::Array(found.into_iter().map(Value::Object).collect())
}
