use serde::Deserialize;

/// The `merchant` configuration subtree.
#[derive(Debug, Clone, Deserialize)]
pub struct MerchantSettings {
    pub products: String,
    pub carts: String,
    pub charges: String,
    /// ISO code stamped on every charge, e.g. `USD`.
    pub currency: String,
    #[serde(default)]
    pub database: Option<String>,
    /// Logical mailer receipts are sent through.
    #[serde(default)]
    pub mailer: Option<String>,
}
