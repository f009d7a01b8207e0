//! Resolved rule configuration.
//!
//! The caller resolves and merges configuration layers; this crate only
//! consumes the final map of rule name to settings:
//!
//! ```yaml
//! page-title-required:
//!   enabled: false
//! page-component-limit:
//!   severity: error
//!   settings:
//!     max_components: 80
//! script-debug-statement: false   # shorthand for enabled: false
//! ```

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::finding::Severity;
use crate::model::canonical::filter_commented_keys;

/// Configuration for one rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleConfig {
    pub enabled: bool,
    pub severity: Option<Severity>,
    pub settings: Map<String, Value>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            severity: None,
            settings: Map::new(),
        }
    }
}

impl RuleConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_setting(mut self, key: &str, value: Value) -> Self {
        self.settings.insert(key.to_string(), value);
        self
    }

    /// Read one entry leniently: malformed fields are warned about and
    /// left at their defaults.
    fn from_value(rule: &str, value: &Value) -> Self {
        let mut config = RuleConfig::default();

        let entry = match value {
            Value::Bool(enabled) => {
                config.enabled = *enabled;
                return config;
            }
            Value::Null => return config,
            Value::Object(entry) => entry,
            other => {
                log::warn!(
                    "ignoring configuration for rule {}: expected a map, found {}",
                    rule,
                    crate::model::json_kind(other)
                );
                return config;
            }
        };

        match entry.get("enabled") {
            Some(Value::Bool(enabled)) => config.enabled = *enabled,
            Some(other) => log::warn!("rule {}: `enabled` must be a boolean, got {}", rule, other),
            None => {}
        }

        if let Some(raw) = entry.get("severity").or_else(|| entry.get("severity_override")) {
            match raw.as_str().map(str::parse::<Severity>) {
                Some(Ok(severity)) => config.severity = Some(severity),
                Some(Err(e)) => log::warn!("rule {}: {}", rule, e),
                None if raw.is_null() => {}
                None => log::warn!("rule {}: `severity` must be a string, got {}", rule, raw),
            }
        }

        if let Some(raw) = entry.get("settings").or_else(|| entry.get("custom_settings")) {
            match raw {
                Value::Object(settings) => config.settings = settings.clone(),
                Value::Null => {}
                other => log::warn!("rule {}: `settings` must be a map, got {}", rule, other),
            }
        }

        config
    }
}

/// Resolved per-rule configuration. Rules absent from the map are enabled
/// with their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
    rules: HashMap<String, RuleConfig>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value. Only the container shape is fatal: it must
    /// be a map (or null, meaning empty).
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(ConfigError::NotAMap {
                    found: crate::model::json_kind(other),
                })
            }
        };

        let rules = map
            .iter()
            .map(|(name, entry)| (name.clone(), RuleConfig::from_value(name, entry)))
            .collect();
        Ok(Self { rules })
    }

    /// Parse YAML (or JSON, a YAML subset) text.
    ///
    /// Commented-out keys follow the document convention and are dropped.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(content)?;
        Self::from_value(&filter_commented_keys(value))
    }

    /// Read a single, already-resolved configuration file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn set(&mut self, rule: &str, config: RuleConfig) -> &mut Self {
        self.rules.insert(rule.to_string(), config);
        self
    }

    pub fn with_rule(mut self, rule: &str, config: RuleConfig) -> Self {
        self.set(rule, config);
        self
    }

    pub fn rule(&self, name: &str) -> Option<&RuleConfig> {
        self.rules.get(name)
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.rules.get(name).map(|c| c.enabled).unwrap_or(true)
    }

    pub fn severity_override(&self, name: &str) -> Option<Severity> {
        self.rules.get(name).and_then(|c| c.severity)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
