//! Merchant module: a product catalog, shopping carts and charges.
//!
//! Completing a charge mails a plain-text receipt through the mailer named by the
//! `merchant.mailer` setting (the default mailer when absent).

mod carts;
mod charges;
mod products;
mod receipt;
mod service;
mod settings;

pub use crate::carts::CartItem;
pub use crate::charges::{COMPLETE, ChargeLine, PENDING};
pub use crate::service::Shop;
pub use crate::settings::MerchantSettings;

use async_trait::async_trait;
use chub_kernel::prelude::*;
use tracing::info;

/// The merchant [`HubModule`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Merchant;

#[async_trait]
impl HubModule for Merchant {
    fn name(&self) -> ModuleName {
        ModuleName::Merchant
    }

    fn requirements(&self) -> RequiredFields {
        RequiredFields::new()
            .with("products", FieldType::String)
            .with("carts", FieldType::String)
            .with("charges", FieldType::String)
            .with("currency", FieldType::String)
    }

    async fn init(&self, ctx: ModuleContext) -> Result<ModuleDescriptor, ConfigError> {
        let settings: MerchantSettings = ctx.settings()?;
        info!(currency = %settings.currency, "Merchant module initialized");
        let shop = Shop::with(settings, ctx.infra().clone());

        Ok(ModuleDescriptor::new(ModuleName::Merchant.as_str())
            .bind(verb::CREATE, noun::PRODUCT, &shop, |s, p| async move {
                s.create_product(p).await
            })
            .bind(verb::GET, noun::PRODUCT, &shop, |s, p| async move { s.get_product(p).await })
            .bind(verb::EDIT, noun::PRODUCT, &shop, |s, p| async move { s.edit_product(p).await })
            .bind(verb::REMOVE, noun::PRODUCT, &shop, |s, p| async move {
                s.remove_product(p).await
            })
            .bind(verb::ADD, noun::CART, &shop, |s, p| async move { s.add_to_cart(p).await })
            .bind(verb::GET, noun::CART, &shop, |s, p| async move { s.get_cart(p).await })
            .bind(verb::REMOVE, noun::CART, &shop, |s, p| async move {
                s.remove_from_cart(p).await
            })
            .bind(verb::CREATE, noun::CHARGE, &shop, |s, p| async move { s.create_charge(p).await })
            .bind(verb::GET, noun::CHARGE, &shop, |s, p| async move { s.get_charge(p).await })
            .bind(verb::COMPLETE, noun::CHARGE, &shop, |s, p| async move {
                s.complete_charge(p).await
            }))
    }
}
