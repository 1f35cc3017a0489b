use crate::constants::module::{ADMIN, AUTHOR, MERCHANT, SCOUT};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of optional domain modules.
///
/// Declaration order is the load order: when two modules register the same
/// `(verb, noun)` slot, the one declared later wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleName {
    Admin,
    Author,
    Merchant,
    Scout,
}

impl ModuleName {
    /// Every known module, in load order.
    pub const ALL: [Self; 4] = [Self::Admin, Self::Author, Self::Merchant, Self::Scout];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ADMIN,
            Self::Author => AUTHOR,
            Self::Merchant => MERCHANT,
            Self::Scout => SCOUT,
        }
    }

    /// Resolves a configuration key. Unknown names yield `None` and are meant to be ignored.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            ADMIN => Some(Self::Admin),
            AUTHOR => Some(Self::Author),
            MERCHANT => Some(Self::Merchant),
            SCOUT => Some(Self::Scout),
            _ => None,
        }
    }

    #[must_use]
    pub const fn flag(self) -> ModuleSet {
        match self {
            Self::Admin => ModuleSet::ADMIN,
            Self::Author => ModuleSet::AUTHOR,
            Self::Merchant => ModuleSet::MERCHANT,
            Self::Scout => ModuleSet::SCOUT,
        }
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// A set of enabled modules.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct ModuleSet: u8 {
        const ADMIN = 1 << 0;
        const AUTHOR = 1 << 1;
        const MERCHANT = 1 << 2;
        const SCOUT = 1 << 3;

        const ALL = Self::ADMIN.bits()
            | Self::AUTHOR.bits()
            | Self::MERCHANT.bits()
            | Self::SCOUT.bits();
    }
}

impl ModuleSet {
    #[must_use]
    pub const fn has(self, module: ModuleName) -> bool {
        self.contains(module.flag())
    }

    /// Members of the set in load order.
    pub fn modules(self) -> impl Iterator<Item = ModuleName> {
        ModuleName::ALL.into_iter().filter(move |m| self.has(*m))
    }
}

impl From<&str> for ModuleSet {
    fn from(s: &str) -> Self {
        match s {
            "all" | "*" => Self::ALL,
            other => ModuleName::parse(other).map_or_else(Self::empty, ModuleName::flag),
        }
    }
}

impl FromIterator<ModuleName> for ModuleSet {
    fn from_iter<I: IntoIterator<Item = ModuleName>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, m| set | m.flag())
    }
}
