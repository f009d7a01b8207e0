//! Rule engine: discovery, configuration and execution of rules.
//!
//! ```text
//! built-in table ─┐
//! register_rule ──┼─▶ RuleEntry ─▶ Configuration ─▶ ActiveRule ─▶ Runner ─▶ Vec<Finding>
//! manifests dir ──┘     (skip example/disabled, instantiate, configure)
//! ```

mod declarative;
mod registry;
mod rule;
mod runner;

pub use declarative::{load_rules_dir, DeclarativeRule, ManifestRule, RuleManifest};
pub use registry::{discover_entries, register_rule, registered_rules};
pub use rule::{ActiveRule, ConfigurableRule, Rule, RuleEntry, RuleFactory};
pub use runner::{Runner, MAX_WORKERS, SERIAL_THRESHOLD};

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;

use crate::config::Configuration;
use crate::error::{panic_message, ConfigError, DocumentParseError, RuleDiscoveryError};
use crate::finding::Finding;
use crate::model::{FileType, ProjectModel};

/// Everything the output layer needs from one analysis.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub findings: Vec<Finding>,
    pub file_counts: BTreeMap<FileType, usize>,
    /// Number of active rules.
    pub rules_run: usize,
    pub parse_errors: Vec<DocumentParseError>,
    pub completeness: Value,
}

/// A configured set of rules ready to run.
#[derive(Debug)]
pub struct Engine {
    rules: Vec<ActiveRule>,
}

impl Engine {
    /// Built-in and registered rules, configured by `config`.
    pub fn new(config: &Configuration) -> Self {
        Self::from_entries(config, discover_entries(None))
    }

    /// As [`Engine::new`], plus declarative rules from `rules_dir`.
    pub fn with_rules_dir<P: AsRef<Path>>(config: &Configuration, rules_dir: P) -> Self {
        Self::from_entries(config, discover_entries(Some(rules_dir.as_ref())))
    }

    /// Build from a raw configuration value. A value that is not a map is
    /// the only fatal configuration problem.
    pub fn from_config_value(value: &Value, rules_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Configuration::from_value(value)?;
        Ok(Self::from_entries(&config, discover_entries(rules_dir)))
    }

    /// Build from an explicit list of entries, in discovery order.
    pub fn from_entries(config: &Configuration, entries: Vec<RuleEntry>) -> Self {
        let mut rules: Vec<ActiveRule> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for entry in &entries {
            let name = entry.name();

            if entry.is_example() {
                log::debug!("skipping example rule {}", name);
                continue;
            }
            if !config.is_enabled(name) {
                log::debug!("rule {} disabled by configuration", name);
                continue;
            }

            let mut rule = match instantiate(entry) {
                Ok(rule) => rule,
                Err(err) => {
                    log::warn!("{}", err);
                    continue;
                }
            };

            let id = rule.id().to_string();
            if seen.contains(&id) {
                log::warn!("duplicate rule id {:?}, keeping the first one discovered", id);
                continue;
            }

            if let Some(settings) = config.rule(name).map(|c| &c.settings) {
                if !settings.is_empty() {
                    match rule.as_configurable() {
                        Some(configurable) => {
                            if let Err(e) = configurable.configure(settings) {
                                log::warn!("rule {} rejected its settings ({}), excluding it", id, e);
                                continue;
                            }
                        }
                        None => log::debug!(
                            "rule {} does not accept settings, ignoring {} keys",
                            id,
                            settings.len()
                        ),
                    }
                }
            }

            let severity = config
                .severity_override(name)
                .unwrap_or_else(|| rule.default_severity());

            seen.insert(id);
            rules.push(ActiveRule { rule, severity });
        }

        log::info!("{} of {} discovered rules active", rules.len(), entries.len());
        Self { rules }
    }

    pub fn rules(&self) -> &[ActiveRule] {
        &self.rules
    }

    /// Active rule ids in discovery order.
    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(ActiveRule::id).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every active rule. Above [`SERIAL_THRESHOLD`] rules the order of
    /// findings is not deterministic; see [`crate::sort_findings`].
    pub fn run(&self, model: &ProjectModel) -> Vec<Finding> {
        Runner::new(&self.rules).run(model)
    }

    /// Run every active rule and bundle the results for reporting.
    pub fn analyze(&self, model: &ProjectModel) -> AnalysisReport {
        let findings = self.run(model);
        AnalysisReport {
            findings,
            file_counts: model.file_counts(),
            rules_run: self.rules.len(),
            parse_errors: model.parse_errors().to_vec(),
            completeness: model.completeness().to_dict(),
        }
    }
}

fn instantiate(entry: &RuleEntry) -> Result<Box<dyn Rule>, RuleDiscoveryError> {
    match catch_unwind(AssertUnwindSafe(|| entry.instantiate())) {
        Ok(Ok(rule)) => Ok(rule),
        Ok(Err(e)) => Err(RuleDiscoveryError::Instantiate {
            rule: entry.name().to_string(),
            message: format!("{:#}", e),
        }),
        Err(payload) => Err(RuleDiscoveryError::Instantiate {
            rule: entry.name().to_string(),
            message: format!("factory panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}
