use chub_kernel::prelude::*;
use serde::Deserialize;

/// The `admin` configuration subtree.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSettings {
    pub collection: String,
    /// Most privileged first.
    pub roles: Vec<String>,
    /// Required fields of `create.admin` payloads; none when omitted.
    #[serde(default)]
    pub fields: RequiredFields,
    #[serde(default)]
    pub database: Option<String>,
}

impl AdminSettings {
    /// Position of `role` in the privilege order; lower is more privileged.
    #[must_use]
    pub fn rank(&self, role: &str) -> Option<usize> {
        self.roles.iter().position(|r| r == role)
    }

    /// Role given to admins created without one: the least privileged.
    #[must_use]
    pub fn default_role(&self) -> Option<&str> {
        self.roles.last().map(String::as_str)
    }
}
