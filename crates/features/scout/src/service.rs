use crate::settings::ScoutSettings;
use chub_kernel::database::DatabaseError;
use chub_kernel::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument};

pub(crate) const ADDRESS_FIELD: &str = "address";
pub(crate) const COUNT_FIELD: &str = "count";
pub(crate) const PATHS_FIELD: &str = "paths";
pub(crate) const ALLOWED_FIELD: &str = "allowed";

/// Visit counters and access rules keyed by client address.
#[chub_derive::hub_slice]
pub struct Tracker {
    pub settings: ScoutSettings,
    infra: Infrastructure,
}

#[derive(Deserialize)]
struct VisitRequest {
    address: String,
    path: String,
}

#[derive(Deserialize)]
struct AddressRequest {
    address: String,
}

impl Tracker {
    #[must_use]
    pub fn with(settings: ScoutSettings, infra: Infrastructure) -> Self {
        Self::new(TrackerInner { settings, infra })
    }

    async fn database(&self) -> Result<Database, OperationError> {
        Ok(self.infra.database(self.settings.database.as_deref()).await?)
    }

    /// Counts a visit to `path`, keeping a total and a per-path tally for the address.
    ///
    /// Repeat visits are read-modify-write, so concurrent repeats of one address are
    /// last-writer-wins. A first visit that loses the create to a concurrent one is
    /// counted on the record that won.
    #[instrument(skip_all)]
    pub async fn add_visit(&self, payload: Value) -> OperationResult {
        let VisitRequest { address, path } = decode(payload)?;
        let key = address_key(&address)?;
        let db = self.database().await?;

        let found = db.get(&self.settings.visits, &key, Some(1)).await?;
        let mut visit = match found.into_iter().next() {
            Some(visit) => visit,
            None => {
                let visit = document(json!({
                    ADDRESS_FIELD: address,
                    COUNT_FIELD: 1,
                    PATHS_FIELD: { path.as_str(): 1 },
                }))?;
                match db.create(&self.settings.visits, visit, &key).await {
                    Ok(created) => {
                        debug!(%address, "First visit recorded");
                        return Ok(Value::Object(created));
                    }
                    Err(DatabaseError::Conflict { .. }) => {
                        debug!(%address, "First visit already recorded, counting a repeat");
                        let found = db.get(&self.settings.visits, &key, Some(1)).await?;
                        found.into_iter().next().ok_or_else(|| {
                            OperationError::not_found(format!("visits of '{address}'"))
                        })?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        let count = visit.get(COUNT_FIELD).and_then(Value::as_u64).unwrap_or(0) + 1;
        let mut paths = match visit.remove(PATHS_FIELD) {
            Some(Value::Object(paths)) => paths,
            _ => Map::new(),
        };
        let hits = paths.get(&path).and_then(Value::as_u64).unwrap_or(0) + 1;
        paths.insert(path, json!(hits));

        let patch = document(json!({ COUNT_FIELD: count, PATHS_FIELD: paths }))?;
        db.edit(&self.settings.visits, &key, &patch).await?;
        visit.extend(patch);
        Ok(Value::Object(visit))
    }

    /// Visit records for one `address`, or all of them.
    #[instrument(skip_all)]
    pub async fn get_visit(&self, payload: Value) -> OperationResult {
        self.list(&self.settings.visits, payload).await
    }

    #[instrument(skip_all)]
    pub async fn allow(&self, payload: Value) -> OperationResult {
        self.set_rule(payload, true).await
    }

    #[instrument(skip_all)]
    pub async fn restrict(&self, payload: Value) -> OperationResult {
        self.set_rule(payload, false).await
    }

    /// `{"allowed": bool}`; an address without a rule is allowed.
    #[instrument(skip_all)]
    pub async fn authorize(&self, payload: Value) -> OperationResult {
        let AddressRequest { address } = decode(payload)?;
        let key = address_key(&address)?;
        let found = self.database().await?.get(&self.settings.rules, &key, Some(1)).await?;

        let allowed = found
            .first()
            .and_then(|rule| rule.get(ALLOWED_FIELD))
            .and_then(Value::as_bool)
            .unwrap_or(true);
        if !allowed {
            debug!(%address, "Address restricted");
        }
        Ok(json!({ ALLOWED_FIELD: allowed }))
    }

    /// Rules for one `address`, or all of them.
    #[instrument(skip_all)]
    pub async fn get_rule(&self, payload: Value) -> OperationResult {
        self.list(&self.settings.rules, payload).await
    }

    async fn set_rule(&self, payload: Value, allowed: bool) -> OperationResult {
        let AddressRequest { address } = decode(payload)?;
        let key = address_key(&address)?;
        let db = self.database().await?;

        let patch = document(json!({ ALLOWED_FIELD: allowed }))?;
        let rule = match db.edit(&self.settings.rules, &key, &patch).await {
            Ok(_) => {
                let mut rule = key;
                rule.extend(patch);
                rule
            }
            Err(DatabaseError::NotFound { .. }) => {
                let rule = document(json!({ ADDRESS_FIELD: address, ALLOWED_FIELD: allowed }))?;
                db.create(&self.settings.rules, rule, &key).await?
            }
            Err(e) => return Err(e.into()),
        };
        info!(%address, allowed, "Access rule set");
        Ok(Value::Object(rule))
    }

    async fn list(&self, collection: &str, payload: Value) -> OperationResult {
        let payload = object(payload)?;
        let criteria = match optional_str(&payload, ADDRESS_FIELD) {
            Some(address) => address_key(address)?,
            None => Document::new(),
        };
        let found = self.database().await?.get(collection, &criteria, None).await?;
        Ok(Value::Array(found.into_iter().map(Value::Object).collect()))
    }
}

fn address_key(address: &str) -> Result<Document, OperationError> {
    if address.trim().is_empty() {
        return Err(OperationError::validation("'address' must not be blank"));
    }
    Ok(document(json!({ ADDRESS_FIELD: address }))?)
}
