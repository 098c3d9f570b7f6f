//! YAML registry configuration
//!
//! ```yaml
//! options:
//!   datashield.privacyLevel: "5"
//! environments:
//!   aggregate:
//!     - name: meanDS
//!       function: dsBase::meanDS
//!   assign:
//!     - name: helper
//!       script: "function(x) x"
//! ```
//!
//! Option values are strings; quote numeric values. Each method carries
//! exactly one non-empty `function` or `script`, and names are unique within
//! a category.

use super::{ConfigError, MethodCategory, Registry, ResolvedMethod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    options: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    environments: BTreeMap<String, Vec<MethodConfig>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MethodConfig {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    script: Option<String>,
}

impl MethodConfig {
    fn into_method(self) -> Result<ResolvedMethod, ConfigError> {
        let invalid = |name: &str, reason: &str| ConfigError::InvalidMethod {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid(&self.name, "name must not be empty"));
        }

        match (self.function, self.script) {
            (Some(function), None) if function.trim().is_empty() => {
                Err(invalid(&self.name, "function must not be empty"))
            }
            (Some(function), None) => Ok(ResolvedMethod::packaged(self.name, function)),
            (None, Some(body)) if body.trim().is_empty() => {
                Err(invalid(&self.name, "script must not be empty"))
            }
            (None, Some(body)) => Ok(ResolvedMethod::script(self.name, body)),
            (Some(_), Some(_)) => Err(invalid(
                &self.name,
                "exactly one of 'function' or 'script' is allowed",
            )),
            (None, None) => Err(invalid(&self.name, "missing 'function' or 'script'")),
        }
    }

    fn from_method(method: &ResolvedMethod) -> Self {
        match method {
            ResolvedMethod::Packaged(f) => MethodConfig {
                name: f.name.clone(),
                function: Some(f.function.clone()),
                script: None,
            },
            ResolvedMethod::Script(f) => MethodConfig {
                name: f.name.clone(),
                function: None,
                script: Some(f.body.clone()),
            },
        }
    }
}

impl Registry {
    /// Build a registry from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RegistryConfig = serde_yaml::from_str(text)?;
        let mut registry = Registry::new();

        for (name, value) in config.options {
            registry.add_or_update_option(name, value);
        }

        for (key, methods) in config.environments {
            let category: MethodCategory = key.parse()?;
            let env = registry.environment_mut(category);
            for method in methods {
                let method = method.into_method()?;
                let name = method.name().to_string();
                if env.add_method(method).is_some() {
                    return Err(ConfigError::InvalidMethod {
                        name,
                        reason: "duplicate method name".to_string(),
                    });
                }
            }
        }

        info!(
            aggregate = registry.method_count(MethodCategory::Aggregate),
            assign = registry.method_count(MethodCategory::Assign),
            "registry loaded"
        );
        Ok(registry)
    }

    /// Read and build a registry from a YAML file
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "reading registry configuration");
        Self::from_yaml_str(&text)
    }

    /// Serialize to the same YAML shape [`Registry::from_yaml_str`] reads
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        let mut config = RegistryConfig::default();

        for option in self.options().list() {
            config
                .options
                .insert(option.name.clone(), option.value.clone());
        }

        for category in MethodCategory::ALL {
            if let Some(env) = self.environment(category) {
                let methods = env.methods().into_iter().map(MethodConfig::from_method).collect();
                config.environments.insert(category.to_string(), methods);
            }
        }

        Ok(serde_yaml::to_string(&config)?)
    }

    fn method_count(&self, category: MethodCategory) -> usize {
        self.environment(category).map_or(0, |env| env.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MethodResolver;

    const CONFIG: &str = r#"
options:
  datashield.privacyLevel: "5"
environments:
  aggregate:
    - name: meanDS
      function: dsBase::meanDS
  Assign:
    - name: helper
      script: "function(x) x"
"#;

    #[test]
    fn test_load_yaml() {
        let registry = Registry::from_yaml_str(CONFIG).unwrap();

        assert_eq!(
            registry.resolve("meanDS", MethodCategory::Aggregate),
            Some(ResolvedMethod::packaged("meanDS", "dsBase::meanDS"))
        );
        assert_eq!(
            registry.resolve("helper", MethodCategory::Assign),
            Some(ResolvedMethod::script("helper", "function(x) x"))
        );
        assert_eq!(registry.option("datashield.privacyLevel").unwrap().value, "5");
    }

    #[test]
    fn test_empty_document_is_empty_registry() {
        let registry = Registry::from_yaml_str("{}").unwrap();
        assert!(registry.environment(MethodCategory::Aggregate).is_none());
        assert!(!registry.has_options());
    }

    #[test]
    fn test_unknown_category_rejected() {
        let err = Registry::from_yaml_str("environments:\n  eval: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownCategory(ref c) if c == "eval"));
    }

    #[test]
    fn test_method_needs_exactly_one_target() {
        let both = "environments:\n  aggregate:\n    - name: f\n      function: pkg::f\n      script: x\n";
        let neither = "environments:\n  aggregate:\n    - name: f\n";

        assert!(matches!(
            Registry::from_yaml_str(both),
            Err(ConfigError::InvalidMethod { .. })
        ));
        assert!(matches!(
            Registry::from_yaml_str(neither),
            Err(ConfigError::InvalidMethod { .. })
        ));
    }

    #[test]
    fn test_empty_script_rejected() {
        for body in ["\"\"", "\"   \""] {
            let text = format!("environments:\n  assign:\n    - name: f\n      script: {body}\n");
            let err = Registry::from_yaml_str(&text).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidMethod { ref reason, .. } if reason.contains("script")),
                "{text:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let text = "environments:\n  aggregate:\n    - name: f\n      function: pkg::f\n    - name: f\n      function: other::f\n";
        let err = Registry::from_yaml_str(text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidMethod { ref name, ref reason } if name == "f" && reason == "duplicate method name"
        ));
    }

    #[test]
    fn test_same_name_in_both_categories() {
        let text = "environments:\n  aggregate:\n    - name: f\n      function: pkg::f\n  assign:\n    - name: f\n      function: pkg::g\n";
        let registry = Registry::from_yaml_str(text).unwrap();
        assert_eq!(
            registry.resolve("f", MethodCategory::Assign),
            Some(ResolvedMethod::packaged("f", "pkg::g"))
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Registry::from_yaml_str("methods: []\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_yaml_round_trip() {
        let registry = Registry::from_yaml_str(CONFIG).unwrap();
        let text = registry.to_yaml_string().unwrap();
        let reloaded = Registry::from_yaml_str(&text).unwrap();

        assert_eq!(
            reloaded.resolve("meanDS", MethodCategory::Aggregate),
            registry.resolve("meanDS", MethodCategory::Aggregate)
        );
        assert_eq!(
            reloaded.resolve("helper", MethodCategory::Assign),
            registry.resolve("helper", MethodCategory::Assign)
        );
        assert_eq!(reloaded.option("datashield.privacyLevel").unwrap().value, "5");
    }

    #[test]
    fn test_missing_file() {
        let err = Registry::from_yaml_path("/nonexistent/registry.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
