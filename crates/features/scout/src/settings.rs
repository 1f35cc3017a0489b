use serde::Deserialize;

/// The `scout` configuration subtree.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoutSettings {
    pub visits: String,
    pub rules: String,
    #[serde(default)]
    pub database: Option<String>,
}
