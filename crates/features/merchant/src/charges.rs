use crate::carts::{CART_FIELD, CartItem, ITEMS_FIELD};
use crate::products::{NAME_FIELD, price};
use crate::receipt;
use crate::service::{Shop, criteria_by, listing, stored};
use chub_kernel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};

pub(crate) const STATUS_FIELD: &str = "status";
pub(crate) const TOTAL_FIELD: &str = "total";
pub(crate) const CURRENCY_FIELD: &str = "currency";
pub(crate) const EMAIL_FIELD: &str = "email";

pub const PENDING: &str = "pending";
pub const COMPLETE: &str = "complete";

/// A cart line frozen with the product's name and price at charge time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeLine {
    pub product: String,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    pub quantity: u64,
    pub amount: f64,
}

#[derive(Deserialize)]
struct ChargeRequest {
    cart: String,
}

#[derive(Deserialize)]
struct CompleteRequest {
    #[serde(rename = "_id")]
    id: String,
    email: String,
}

impl Shop {
    /// Totals a cart into a pending charge in the configured currency.
    #[instrument(skip_all)]
    pub async fn create_charge(&self, payload: Value) -> OperationResult {
        let ChargeRequest { cart } = decode(payload)?;
        let existing = self
            .find_one(&self.settings.carts, CART_FIELD, &cart)
            .await?
            .ok_or_else(|| OperationError::not_found(format!("cart '{cart}'")))?;
        let items: Vec<CartItem> = stored(&existing, ITEMS_FIELD)?;
        if items.is_empty() {
            return Err(OperationError::validation(format!("cart '{cart}' is empty")));
        }

        let mut lines = Vec::with_capacity(items.len());
        for CartItem { product, quantity } in items {
            let found = self
                .find_one(&self.settings.products, ID_FIELD, &product)
                .await?
                .ok_or_else(|| OperationError::not_found(format!("product '{product}'")))?;
            let unit = price(&found)?;
            let name = optional_str(&found, NAME_FIELD).unwrap_or_default().to_owned();
            #[allow(clippy::cast_precision_loss)]
            let amount = unit * quantity as f64;
            lines.push(ChargeLine { product, name, price: unit, quantity, amount });
        }
        let total: f64 = lines.iter().map(|line| line.amount).sum();

        let charge = document(json!({
            CART_FIELD: cart,
            ITEMS_FIELD: lines,
            TOTAL_FIELD: total,
            CURRENCY_FIELD: self.settings.currency,
            STATUS_FIELD: PENDING,
        }))?;
        let db = self.database().await?;
        let created = db.create(&self.settings.charges, charge, &Document::new()).await?;
        info!(%cart, total, currency = %self.settings.currency, "Charge created");
        Ok(Value::Object(created))
    }

    /// Charges by `_id` or `cart`, or every charge.
    #[instrument(skip_all)]
    pub async fn get_charge(&self, payload: Value) -> OperationResult {
        let payload = object(payload)?;
        let criteria = criteria_by(&payload, &[ID_FIELD, CART_FIELD])?.unwrap_or_default();
        let found = self.database().await?.get(&self.settings.charges, &criteria, None).await?;
        Ok(listing(found))
    }

    /// Mails a receipt to `email`, then marks the pending charge complete.
    #[instrument(skip_all)]
    pub async fn complete_charge(&self, payload: Value) -> OperationResult {
        let CompleteRequest { id, email } = decode(payload)?;
        if !is_email(&email) {
            let message = format!("'{email}' is not a valid email address");
            return Err(OperationError::validation(message));
        }

        let mut charge = self
            .find_one(&self.settings.charges, ID_FIELD, &id)
            .await?
            .ok_or_else(|| OperationError::not_found(format!("charge '{id}'")))?;
        if optional_str(&charge, STATUS_FIELD) == Some(COMPLETE) {
            return Err(OperationError::conflict(format!("charge '{id}' is already complete")));
        }
        let lines: Vec<ChargeLine> = stored(&charge, ITEMS_FIELD)?;
        let mailer = self.mailer().await?;

        // The charge stays pending until the receipt is out, so a failed send can be retried.
        mailer.send(&receipt::compose(&id, &email, &lines, &self.settings.currency)).await?;

        let key = document(json!({ ID_FIELD: id }))?;
        let patch = document(json!({ STATUS_FIELD: COMPLETE, EMAIL_FIELD: email }))?;
        self.database().await?.edit(&self.settings.charges, &key, &patch).await?;
        charge.extend(patch);
        info!(%id, mailer = mailer.name(), "Charge completed");
        Ok(Value::Object(charge))
    }
}
