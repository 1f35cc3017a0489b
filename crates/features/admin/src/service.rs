use crate::password;
use crate::settings::AdminSettings;
use chub_kernel::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

pub(crate) const EMAIL_FIELD: &str = "email";
pub(crate) const PASSWORD_FIELD: &str = "password";
pub(crate) const ROLE_FIELD: &str = "role";

/// Administrator accounts stored in one collection.
#[chub_derive::hub_slice]
pub struct Admins {
    pub settings: AdminSettings,
    infra: Infrastructure,
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct Authorization {
    #[serde(rename = "_id")]
    id: String,
    role: String,
}

impl Admins {
    #[must_use]
    pub fn with(settings: AdminSettings, infra: Infrastructure) -> Self {
        Self::new(AdminsInner { settings, infra })
    }

    async fn database(&self) -> Result<Database, OperationError> {
        Ok(self.infra.database(self.settings.database.as_deref()).await?)
    }

    #[instrument(skip_all)]
    pub async fn create(&self, payload: Value) -> OperationResult {
        let mut admin = object(payload)?;
        check_object(&self.settings.fields, &admin)?;

        let email = require_str(&admin, EMAIL_FIELD)?.to_owned();
        if !is_email(&email) {
            let message = format!("'{email}' is not a valid email address");
            return Err(OperationError::validation(message));
        }
        let secret = require_str(&admin, PASSWORD_FIELD)?;
        if !is_strong_password(secret) {
            return Err(OperationError::validation("password is too weak"));
        }
        let digest = password::hash(secret)?;
        admin.insert(PASSWORD_FIELD.to_owned(), Value::String(digest));

        let role = match optional_str(&admin, ROLE_FIELD) {
            Some(role) => self.checked_role(role)?.to_owned(),
            None => self.settings.default_role().unwrap_or_default().to_owned(),
        };
        admin.insert(ROLE_FIELD.to_owned(), Value::String(role));
        admin.remove(ID_FIELD);

        let unique = document(json!({ EMAIL_FIELD: email }))?;
        let db = self.database().await?;
        let created = db.create(&self.settings.collection, admin, &unique).await?;
        info!(%email, "Admin created");
        Ok(public(created))
    }

    #[instrument(skip_all)]
    pub async fn get(&self, payload: Value) -> OperationResult {
        let criteria = identity(&object(payload)?)?.unwrap_or_default();
        let found = self.database().await?.get(&self.settings.collection, &criteria, None).await?;
        Ok(Value::Array(found.into_iter().map(public).collect()))
    }

    #[instrument(skip_all)]
    pub async fn edit(&self, payload: Value) -> OperationResult {
        let mut patch = object(payload)?;
        let criteria = self.require_identity(&patch)?;
        patch.remove(ID_FIELD);
        if criteria.contains_key(EMAIL_FIELD) {
            patch.remove(EMAIL_FIELD);
        }

        if let Some(secret) = patch.get(PASSWORD_FIELD) {
            let secret = secret
                .as_str()
                .filter(|s| is_strong_password(s))
                .ok_or_else(|| OperationError::validation("password is too weak"))?;
            let digest = password::hash(secret)?;
            patch.insert(PASSWORD_FIELD.to_owned(), Value::String(digest));
        }
        if let Some(role) = patch.get(ROLE_FIELD) {
            let role = role
                .as_str()
                .ok_or_else(|| OperationError::validation("'role' must be a string"))?;
            self.checked_role(role)?;
        }
        if patch.is_empty() {
            return Err(OperationError::validation("nothing to edit"));
        }

        let db = self.database().await?;

        let edited = db.edit(&self.settings.collection, &criteria, &patch).await?;
        Ok(json!({ "edited": edited }))
    }

    #[instrument(skip_all)]
    pub async fn remove(&self, payload: Value) -> OperationResult {
        let criteria = self.require_identity(&object(payload)?)?;
        let removed = self.database().await?.remove(&self.settings.collection, &criteria).await?;
        Ok(json!({ "removed": removed }))
    }

    /// Returns the admin without its digest, or `Unauthorized` for any mismatch.
    #[instrument(skip_all)]
    pub async fn login(&self, payload: Value) -> OperationResult {
        let Credentials { email, password: secret } = decode(payload)?;
        let criteria = document(json!({ EMAIL_FIELD: email }))?;
        let db = self.database().await?;
        let found = db.get(&self.settings.collection, &criteria, Some(1)).await?;

        let admin = found
            .into_iter()
            .next()
            .filter(|admin| {
                admin
                    .get(PASSWORD_FIELD)
                    .and_then(Value::as_str)
                    .is_some_and(|stored| password::verify(&secret, stored))
            })
            .ok_or_else(|| {
                debug!(%email, "Login rejected");
                OperationError::unauthorized("invalid email or password")
            })?;
        Ok(public(admin))
    }

    /// `{"authorized": true}` when the admin's role is at least as privileged as `role`.
    #[instrument(skip_all)]
    pub async fn authorize(&self, payload: Value) -> OperationResult {
        let Authorization { id, role } = decode(payload)?;
        let required = self.rank(&role)?;

        let criteria = document(json!({ ID_FIELD: id }))?;
        let db = self.database().await?;
        let found = db.get(&self.settings.collection, &criteria, Some(1)).await?;
        let admin =
            found.first().ok_or_else(|| OperationError::not_found(format!("admin '{id}'")))?;

        let held =
            admin.get(ROLE_FIELD).and_then(Value::as_str).and_then(|r| self.settings.rank(r));
        Ok(json!({ "authorized": held.is_some_and(|held| held <= required) }))
    }

    fn rank(&self, role: &str) -> Result<usize, OperationError> {
        self.settings
            .rank(role)
            .ok_or_else(|| OperationError::validation(format!("unknown role '{role}'")))
    }

    fn checked_role<'a>(&self, role: &'a str) -> Result<&'a str, OperationError> {
        self.rank(role).map(|_| role)
    }

    fn require_identity(&self, payload: &Document) -> Result<Document, OperationError> {
        identity(payload)?.ok_or_else(|| OperationError::validation("'_id' or 'email' is required"))
    }
}

/// Criteria selecting one admin by `_id`, else by `email`.
fn identity(payload: &Document) -> Result<Option<Document>, OperationError> {
    let key = [ID_FIELD, EMAIL_FIELD].into_iter().find(|key| payload.contains_key(*key));
    let Some(key) = key else {
        return Ok(None);
    };
    let value = require_str(payload, key)?;
    Ok(Some(document(json!({ key: value }))?))
}

fn public(mut admin: Document) -> Value {
    admin.remove(PASSWORD_FIELD);
    Value::Object(admin)
}
