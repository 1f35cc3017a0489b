//! Admin module: administrator accounts with salted password digests, login and
//! role-ordered authorization.
//!
//! Registers `create`, `get`, `edit`, `remove`, `login` and `authorize` on the `admin`
//! noun. Requires an `admin` subtree with `collection`, a non-empty `roles` list (most
//! privileged first) and an optional `fields` map describing `create.admin` payloads.

mod password;
mod service;
mod settings;

pub use crate::service::Admins;
pub use crate::settings::AdminSettings;

use async_trait::async_trait;
use chub_kernel::prelude::*;
use tracing::info;

/// The admin [`HubModule`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Admin;

#[async_trait]
impl HubModule for Admin {
    fn name(&self) -> ModuleName {
        ModuleName::Admin
    }

    fn requirements(&self) -> RequiredFields {
        RequiredFields::new()
            .with("collection", FieldType::String)
            .with("roles", FieldType::NonEmptyList)
    }

    async fn init(&self, ctx: ModuleContext) -> Result<ModuleDescriptor, ConfigError> {
        let settings: AdminSettings = ctx.settings()?;
        let roles = settings.roles.len();
        info!(collection = %settings.collection, roles, "Admin module initialized");
        let admins = Admins::with(settings, ctx.infra().clone());

        Ok(ModuleDescriptor::new(ModuleName::Admin.as_str())
            .bind(verb::CREATE, noun::ADMIN, &admins, |admins, p| async move {
                admins.create(p).await
            })
            .bind(verb::GET, noun::ADMIN, &admins, |admins, p| async move { admins.get(p).await })
            .bind(verb::EDIT, noun::ADMIN, &admins, |admins, p| async move { admins.edit(p).await })
            .bind(verb::REMOVE, noun::ADMIN, &admins, |admins, p| async move {
                admins.remove(p).await
            })
            .bind(verb::LOGIN, noun::ADMIN, &admins, |admins, p| async move {
                admins.login(p).await
            })
            .bind(verb::AUTHORIZE, noun::ADMIN, &admins, |admins, p| async move {
                admins.authorize(p).await
            }))
    }
}
