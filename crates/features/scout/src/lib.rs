//! Scout module: per-address visit counters and allow/restrict access rules.

mod service;
mod settings;

pub use crate::service::Tracker;
pub use crate::settings::ScoutSettings;

use async_trait::async_trait;
use chub_kernel::prelude::*;
use tracing::info;

/// The scout [`HubModule`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Scout;

#[async_trait]
impl HubModule for Scout {
    fn name(&self) -> ModuleName {
        ModuleName::Scout
    }

    fn requirements(&self) -> RequiredFields {
        RequiredFields::new().with("visits", FieldType::String).with("rules", FieldType::String)
    }

    async fn init(&self, ctx: ModuleContext) -> Result<ModuleDescriptor, ConfigError> {
        let settings: ScoutSettings = ctx.settings()?;
        info!(visits = %settings.visits, rules = %settings.rules, "Scout module initialized");
        let scout = Tracker::with(settings, ctx.infra().clone());

        Ok(ModuleDescriptor::new(ModuleName::Scout.as_str())
            .bind(verb::ADD, noun::VISIT, &scout, |s, p| async move { s.add_visit(p).await })
            .bind(verb::GET, noun::VISIT, &scout, |s, p| async move { s.get_visit(p).await })
            .bind(verb::ALLOW, noun::ADDRESS, &scout, |s, p| async move { s.allow(p).await })
            .bind(verb::RESTRICT, noun::ADDRESS, &scout, |s, p| async move { s.restrict(p).await })
            .bind(verb::AUTHORIZE, noun::ADDRESS, &scout, |s, p| async move {
                s.authorize(p).await
            })
            .bind(verb::GET, noun::RULE, &scout, |s, p| async move { s.get_rule(p).await }))
    }
}
