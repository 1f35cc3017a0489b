use crate::service::{Shop, listing, stored};
use chub_kernel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

pub(crate) const CART_FIELD: &str = "cart";
pub(crate) const ITEMS_FIELD: &str = "items";

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// `_id` of the product.
    pub product: String,
    pub quantity: u64,
}

#[derive(Deserialize)]
struct AddRequest {
    cart: String,
    product: String,
    quantity: Option<u64>,
}

#[derive(Deserialize)]
struct RemoveRequest {
    cart: String,
    product: Option<String>,
}

impl Shop {
    /// Adds `quantity` (default 1) of a product, creating the cart on first add.
    #[instrument(skip_all)]
    pub async fn add_to_cart(&self, payload: Value) -> OperationResult {
        let AddRequest { cart, product, quantity } = decode(payload)?;
        let quantity = quantity.unwrap_or(1);
        if quantity == 0 {
            return Err(OperationError::validation("'quantity' must be positive"));
        }
        if self.find_one(&self.settings.products, ID_FIELD, &product).await?.is_none() {
            return Err(OperationError::not_found(format!("product '{product}'")));
        }

        let db = self.database().await?;
        let key = document(json!({ CART_FIELD: cart }))?;
        let found = self.find_one(&self.settings.carts, CART_FIELD, &cart).await?;
        let Some(mut existing) = found else {
            let items = vec![CartItem { product, quantity }];
            let created = document(json!({ CART_FIELD: cart, ITEMS_FIELD: items }))?;
            let created = db.create(&self.settings.carts, created, &key).await?;
            debug!(%cart, "Cart created");
            return Ok(Value::Object(created));
        };

        let mut items: Vec<CartItem> = stored(&existing, ITEMS_FIELD)?;
        match items.iter_mut().find(|item| item.product == product) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => items.push(CartItem { product, quantity }),
        }
        self.store_items(&key, &items).await?;
        existing.insert(ITEMS_FIELD.to_owned(), json!(items));
        Ok(Value::Object(existing))
    }

    /// One cart by `cart`, or every cart.
    #[instrument(skip_all)]
    pub async fn get_cart(&self, payload: Value) -> OperationResult {
        let payload = object(payload)?;
        let criteria = match optional_str(&payload, CART_FIELD) {
            Some(cart) => document(json!({ CART_FIELD: cart }))?,
            None => Document::new(),
        };
        let found = self.database().await?.get(&self.settings.carts, &criteria, None).await?;
        Ok(listing(found))
    }

    /// Drops one product line when `product` is given, otherwise the whole cart.
    #[instrument(skip_all)]
    pub async fn remove_from_cart(&self, payload: Value) -> OperationResult {
        let RemoveRequest { cart, product } = decode(payload)?;
        let key = document(json!({ CART_FIELD: cart }))?;

        let Some(product) = product else {
            let removed = self.database().await?.remove(&self.settings.carts, &key).await?;
            return Ok(json!({ "removed": removed }));
        };

        let existing = self
            .find_one(&self.settings.carts, CART_FIELD, &cart)
            .await?
            .ok_or_else(|| OperationError::not_found(format!("cart '{cart}'")))?;
        let mut items: Vec<CartItem> = stored(&existing, ITEMS_FIELD)?;
        let before = items.len();
        items.retain(|item| item.product != product);
        if items.len() == before {
            return Err(OperationError::not_found(format!("product '{product}' in cart '{cart}'")));
        }
        self.store_items(&key, &items).await?;
        Ok(json!({ "removed": before - items.len() }))
    }

    async fn store_items(&self, key: &Document, items: &[CartItem]) -> Result<(), OperationError> {
        let patch = document(json!({ ITEMS_FIELD: items }))?;
        self.database().await?.edit(&self.settings.carts, key, &patch).await?;
        Ok(())
    }
}
