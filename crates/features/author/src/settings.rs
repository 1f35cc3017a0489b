use chub_kernel::prelude::*;
use serde::Deserialize;

/// The `author` configuration subtree.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorSettings {
    /// Collection holding posts.
    pub posts: String,
    /// Collection holding pages.
    pub pages: String,
    /// Required fields of `create.post` and `create.page` payloads.
    pub fields: RequiredFields,
    #[serde(default)]
    pub database: Option<String>,
}
