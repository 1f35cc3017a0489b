use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

/// Expected type of a configuration or input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Email,
    Password,
    Object,
    List,
    NonEmptyList,
    /// An object whose values are themselves field type tags.
    FieldMap,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Email => "email",
            Self::Password => "password",
            Self::Object => "object",
            Self::List => "list",
            Self::NonEmptyList => "non_empty_list",
            Self::FieldMap => "field_map",
        }
    }

    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "email" => Self::Email,
            "password" => Self::Password,
            "object" => Self::Object,
            "list" => Self::List,
            "non_empty_list" => Self::NonEmptyList,
            "field_map" => Self::FieldMap,
            _ => return None,
        })
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to expected type, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredFields(BTreeMap<String, FieldType>);

impl RequiredFields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.0.insert(name.into(), ty);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.0.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.0.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldType)> for RequiredFields {
    fn from_iter<I: IntoIterator<Item = (K, FieldType)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, ty)| (k.into(), ty)).collect())
    }
}

impl IntoIterator for RequiredFields {
    type Item = (String, FieldType);
    type IntoIter = btree_map::IntoIter<String, FieldType>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
