//! Author module: posts and pages.
//!
//! Both nouns support `create`, `get`, `edit`, `remove` and `publish`. Documents are
//! addressed by `_id`, `label` or `title` (in that order of preference) and are unique by
//! `label`.

mod service;
mod settings;
mod slug;

pub use crate::service::Content;
pub use crate::settings::AuthorSettings;
pub use crate::slug::slugify;

use async_trait::async_trait;
use chub_kernel::prelude::*;
use tracing::info;

/// The author [`HubModule`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Author;

#[async_trait]
impl HubModule for Author {
    fn name(&self) -> ModuleName {
        ModuleName::Author
    }

    fn requirements(&self) -> RequiredFields {
        RequiredFields::new()
            .with("posts", FieldType::String)
            .with("pages", FieldType::String)
            .with("fields", FieldType::FieldMap)
    }

    async fn init(&self, ctx: ModuleContext) -> Result<ModuleDescriptor, ConfigError> {
        let settings: AuthorSettings = ctx.settings()?;
        info!(posts = %settings.posts, pages = %settings.pages, "Author module initialized");

        let posts = Content::with(
            noun::POST,
            settings.posts,
            settings.fields.clone(),
            settings.database.clone(),
            ctx.infra().clone(),
        );
        let pages = Content::with(
            noun::PAGE,
            settings.pages,
            settings.fields,
            settings.database,
            ctx.infra().clone(),
        );

        let descriptor = [posts, pages].iter().fold(
            ModuleDescriptor::new(ModuleName::Author.as_str()),
            |descriptor, content| {
                descriptor
                    .bind(verb::CREATE, content.kind, content, |c, p| async move {
                        c.create(p).await
                    })
                    .bind(verb::GET, content.kind, content, |c, p| async move { c.get(p).await })
                    .bind(verb::EDIT, content.kind, content, |c, p| async move { c.edit(p).await })
                    .bind(verb::REMOVE, content.kind, content, |c, p| async move {
                        c.remove(p).await
                    })
                    .bind(verb::PUBLISH, content.kind, content, |c, p| async move {
                        c.publish(p).await
                    })
            },
        );
        Ok(descriptor)
    }
}
