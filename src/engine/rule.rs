//! The rule interface and the entries rules are discovered through.

use serde_json::{Map, Value};

use crate::error::SettingsError;
use crate::finding::{Finding, Severity};
use crate::model::ProjectModel;

/// One independent check against the project model.
///
/// Rules may run concurrently on worker threads and must not depend on
/// each other's results. Findings are returned, never shared.
pub trait Rule: Send + Sync {
    /// Stable rule identifier, used for configuration and reporting.
    fn id(&self) -> &str;

    fn description(&self) -> &str;

    /// Severity used when the configuration does not override it.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Run the rule. Returning `Err` discards this rule's findings only.
    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>>;

    /// Rules that accept custom settings expose them here.
    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableRule> {
        None
    }
}

/// Capability for rules that accept custom settings.
pub trait ConfigurableRule {
    /// Apply settings. On `Err` the rule must be left as it was; the engine
    /// then excludes it from the run.
    fn configure(&mut self, settings: &Map<String, Value>) -> Result<(), SettingsError>;
}

/// Factory function type for creating rule instances.
pub type RuleFactory = fn() -> Box<dyn Rule>;

type BuildFn = Box<dyn Fn() -> anyhow::Result<Box<dyn Rule>> + Send + Sync>;

/// A discoverable rule: a name plus a way to build an instance.
pub struct RuleEntry {
    name: String,
    example: bool,
    build: BuildFn,
}

impl RuleEntry {
    pub fn new(name: &str, factory: RuleFactory) -> Self {
        Self {
            name: name.to_string(),
            example: false,
            build: Box::new(move || Ok(factory())),
        }
    }

    /// An entry whose construction can fail.
    pub fn fallible<F>(name: &str, build: F) -> Self
    where
        F: Fn() -> anyhow::Result<Box<dyn Rule>> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            example: false,
            build: Box::new(build),
        }
    }

    /// Mark this entry as an authoring template that never runs.
    pub fn example(mut self) -> Self {
        self.example = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_example(&self) -> bool {
        self.example
    }

    pub(crate) fn instantiate(&self) -> anyhow::Result<Box<dyn Rule>> {
        (self.build)()
    }
}

impl std::fmt::Debug for RuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEntry")
            .field("name", &self.name)
            .field("example", &self.example)
            .finish()
    }
}

/// An instantiated, configured rule with its effective severity.
pub struct ActiveRule {
    pub rule: Box<dyn Rule>,
    pub severity: Severity,
}

impl ActiveRule {
    pub fn id(&self) -> &str {
        self.rule.id()
    }
}

impl std::fmt::Debug for ActiveRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRule")
            .field("id", &self.id())
            .field("severity", &self.severity)
            .finish()
    }
}
