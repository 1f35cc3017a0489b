//! Structural validation of the configuration tree, run before any module is instantiated.

use crate::checks::{FieldViolation, check_input};
use crate::error::ConfigError;
use crate::module::ModuleCatalog;
use chub_domain::config::{DatabaseDescriptor, MailerDescriptor};
use chub_domain::constants::{DEFAULT, section};
use chub_domain::fields::RequiredFields;
use chub_domain::modules::{ModuleName, ModuleSet};
use fxhash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// A configuration that passed [`ConfigValidator::validate`].
#[derive(Debug, Clone, Default)]
pub struct ValidatedConfig {
    pub databases: BTreeMap<String, DatabaseDescriptor>,
    pub mailers: BTreeMap<String, MailerDescriptor>,
    pub modules: ModuleSet,
    /// Subtree of every enabled module (`null` when the module requires nothing and the
    /// key is absent).
    pub sections: BTreeMap<ModuleName, Value>,
}

impl ValidatedConfig {
    #[must_use]
    pub fn section(&self, module: ModuleName) -> &Value {
        self.sections.get(&module).unwrap_or(&Value::Null)
    }
}

/// Per-module structural checks keyed by module name.
#[derive(Debug, Clone, Default)]
pub struct ConfigValidator {
    checks: FxHashMap<ModuleName, RequiredFields>,
}

impl ConfigValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One check per catalog module, taken from
    /// [`HubModule::requirements`](crate::module::HubModule::requirements).
    #[must_use]
    pub fn for_catalog(catalog: &ModuleCatalog) -> Self {
        catalog.iter().fold(Self::new(), |validator, (name, module)| {
            validator.require(name, module.requirements())
        })
    }

    #[must_use]
    pub fn require(mut self, module: ModuleName, fields: RequiredFields) -> Self {
        self.checks.insert(module, fields);
        self
    }

    /// Validates `config`, stopping at the first violation.
    ///
    /// Order: the tree is an object, `database.default.uri` is a string, `mailer.default`
    /// is an object, the remaining sections are well-formed, then every enabled module's
    /// subtree passes its check.
    ///
    /// # Errors
    /// The first [`ConfigError`] found.
    #[instrument(skip_all)]
    pub fn validate(&self, config: &Value) -> Result<ValidatedConfig, ConfigError> {
        let root = config
            .as_object()
            .ok_or_else(|| ConfigError::malformed("configuration must be an object"))?;

        let databases = root.get(section::DATABASE).and_then(Value::as_object);
        let default_uri = databases.and_then(|d| d.get(DEFAULT)).and_then(|d| d.get("uri"));
        if !default_uri.is_some_and(Value::is_string) {
            return Err(ConfigError::MissingDatabaseDefault {
                message: "database.default.uri must be a string".into(),
                context: None,
            });
        }

        let mailers = root.get(section::MAILER).and_then(Value::as_object);
        if !mailers.and_then(|m| m.get(DEFAULT)).is_some_and(Value::is_object) {
            return Err(ConfigError::MissingMailerDefault {
                message: "mailer.default must be an object".into(),
                context: None,
            });
        }

        let databases = databases.map(database_descriptors).transpose()?.unwrap_or_default();
        let mailers = mailers.map(mailer_descriptors).transpose()?.unwrap_or_default();
        let enabled = enabled_modules(root)?;

        let mut sections = BTreeMap::new();
        for module in enabled.modules() {
            let subtree = root.get(module.as_str()).cloned().unwrap_or(Value::Null);
            if let Some(fields) = self.checks.get(&module).filter(|f| !f.is_empty()) {
                check_input(fields, &subtree).map_err(|violation| match violation {
                    FieldViolation::NotAnObject => ConfigError::invalid_module(
                        module,
                        format!("top-level '{module}' section must be an object"),
                    ),
                    other => ConfigError::invalid_module(module, other.to_string()),
                })?;
            }
            sections.insert(module, subtree);
        }

        Ok(ValidatedConfig { databases, mailers, modules: enabled, sections })
    }
}

fn database_descriptors(
    section: &Map<String, Value>,
) -> Result<BTreeMap<String, DatabaseDescriptor>, ConfigError> {
    section
        .iter()
        .map(|(name, entry)| {
            let uri = entry.get("uri").and_then(Value::as_str).ok_or_else(|| {
                ConfigError::Malformed {
                    message: "uri must be a string".into(),
                    context: Some(format!("database.{name}").into()),
                }
            })?;
            Ok((name.clone(), DatabaseDescriptor::new(uri)))
        })
        .collect()
}

fn mailer_descriptors(
    section: &Map<String, Value>,
) -> Result<BTreeMap<String, MailerDescriptor>, ConfigError> {
    section
        .iter()
        .map(|(name, entry)| {
            let malformed = |message: String| ConfigError::Malformed {
                message: message.into(),
                context: Some(format!("mailer.{name}").into()),
            };
            if !entry.is_object() {
                return Err(malformed("entry must be an object".to_owned()));
            }
            let descriptor =
                MailerDescriptor::deserialize(entry).map_err(|e| malformed(e.to_string()))?;
            Ok((name.clone(), descriptor))
        })
        .collect()
}

/// Known module keys whose value is not literally `false`.
fn enabled_modules(root: &Map<String, Value>) -> Result<ModuleSet, ConfigError> {
    let Some(modules) = root.get(section::MODULES) else {
        return Ok(ModuleSet::empty());
    };
    let modules =
        modules.as_object().ok_or_else(|| ConfigError::malformed("modules must be an object"))?;

    let mut enabled = ModuleSet::empty();
    for (key, flag) in modules {
        if *flag == Value::Bool(false) {
            continue;
        }
        match ModuleName::parse(key) {
            Some(module) => enabled |= module.flag(),
            None => debug!(module = %key, "Ignoring unknown module"),
        }
    }
    Ok(enabled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chub_domain::fields::FieldType;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "database": { "default": { "uri": "mem://main" } },
            "mailer": {
                "default": { "service": "memory", "address": "hub@example.com", "password": "" }
            },
        })
    }

    fn admin_validator() -> ConfigValidator {
        ConfigValidator::new().require(
            ModuleName::Admin,
            RequiredFields::new()
                .with("collection", FieldType::String)
                .with("roles", FieldType::NonEmptyList),
        )
    }

    #[test]
    fn checks_run_in_order() {
        let validator = ConfigValidator::new();
        assert!(matches!(validator.validate(&json!(null)), Err(ConfigError::Malformed { .. })));
        assert!(matches!(validator.validate(&json!([])), Err(ConfigError::Malformed { .. })));
        assert!(matches!(
            validator.validate(&json!({ "modules": 1 })),
            Err(ConfigError::MissingDatabaseDefault { .. })
        ));
        assert!(matches!(
            validator.validate(&json!({ "database": { "default": { "uri": "mem://x" } } })),
            Err(ConfigError::MissingMailerDefault { .. })
        ));
    }

    #[test]
    fn non_object_modules_is_malformed() {
        let mut config = base();
        config["modules"] = json!(["admin"]);
        let result = ConfigValidator::new().validate(&config);
        assert!(matches!(result, Err(ConfigError::Malformed { .. })));
    }

    #[test]
    fn secondary_entries_must_be_well_formed() {
        let mut config = base();
        config["database"]["other"] = json!({ "url": "mem://x" });
        let result = ConfigValidator::new().validate(&config);
        assert!(matches!(result, Err(ConfigError::Malformed { .. })));

        let mut config = base();
        config["mailer"]["other"] = json!("smtp");
        let result = ConfigValidator::new().validate(&config);
        assert!(matches!(result, Err(ConfigError::Malformed { .. })));
    }

    #[test]
    fn disabled_and_unknown_modules_are_skipped() {
        let mut config = base();
        config["modules"] = json!({ "admin": false, "billing": true });
        let validated = admin_validator().validate(&config).unwrap();
        assert!(validated.modules.is_empty());
    }

    #[test]
    fn any_value_but_false_enables() {
        let mut config = base();
        config["modules"] = json!({ "admin": null });
        let err = admin_validator().validate(&config).unwrap_err();
        assert_eq!(err.module(), Some(ModuleName::Admin));
    }

    #[test]
    fn module_subtree_is_checked() {
        let mut config = base();
        config["modules"] = json!({ "admin": true });
        config["admin"] = json!({ "collection": "admins", "roles": [] });
        let err = admin_validator().validate(&config).unwrap_err();
        assert_eq!(err.module(), Some(ModuleName::Admin));
        assert!(err.to_string().contains("roles"));

        config["admin"]["roles"] = json!(["owner"]);
        let validated = admin_validator().validate(&config).unwrap();
        assert!(validated.modules.has(ModuleName::Admin));
        assert_eq!(validated.section(ModuleName::Admin)["collection"], "admins");
    }

    #[test]
    fn descriptors_are_typed() {
        let mut config = base();
        config["database"]["archive"] = json!({ "uri": "mem://archive" });
        let validated = ConfigValidator::new().validate(&config).unwrap();
        assert_eq!(validated.databases["archive"].uri, "mem://archive");
        assert_eq!(validated.mailers["default"].service, "memory");
    }
}
