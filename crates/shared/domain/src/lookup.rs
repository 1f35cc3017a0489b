use serde::{Deserialize, Serialize};

pub const ID_FIELD: &str = "_id";
pub const TITLE_FIELD: &str = "title";
pub const LABEL_FIELD: &str = "label";

/// How a single content document is addressed.
///
/// Built once where a request enters a module, so store queries match on the variant
/// instead of probing the payload for keys again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookup {
    ById(String),
    ByTitle(String),
    ByLabel(String),
}

impl Lookup {
    /// Picks the most specific key present: `_id`, then `label`, then `title`.
    pub fn from_keys<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Option<Self> {
        if let Some(id) = get(ID_FIELD) {
            return Some(Self::ById(id.to_owned()));
        }
        if let Some(label) = get(LABEL_FIELD) {
            return Some(Self::ByLabel(label.to_owned()));
        }
        get(TITLE_FIELD).map(|title| Self::ByTitle(title.to_owned()))
    }

    /// Document field the lookup matches on.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::ById(_) => ID_FIELD,
            Self::ByTitle(_) => TITLE_FIELD,
            Self::ByLabel(_) => LABEL_FIELD,
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::ById(v) | Self::ByTitle(v) | Self::ByLabel(v) => v,
        }
    }
}
