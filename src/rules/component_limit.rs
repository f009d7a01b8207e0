//! Pages with too many components.

use serde_json::{Map, Value};

use crate::engine::{ConfigurableRule, Rule};
use crate::error::SettingsError;
use crate::finding::{Finding, Severity};
use crate::model::{JsonDocument, ProjectModel};

use super::{check_keys, positive_int};

const DEFAULT_MAX_COMPONENTS: usize = 50;

/// Counts every component of a page, nested children included.
#[derive(Debug)]
pub struct PageComponentLimit {
    max_components: usize,
}

impl Default for PageComponentLimit {
    fn default() -> Self {
        Self {
            max_components: DEFAULT_MAX_COMPONENTS,
        }
    }
}

impl PageComponentLimit {
    pub const ID: &'static str = "page-component-limit";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self::default())
    }

    pub fn max_components(&self) -> usize {
        self.max_components
    }
}

impl Rule for PageComponentLimit {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Pages stay under a component budget"
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for page in model.pages().values() {
            let count = page.components().len();
            if count > self.max_components {
                findings.push(
                    Finding::new(
                        Self::ID,
                        Severity::Warning,
                        format!(
                            "page {:?} has {} components (limit {})",
                            page.id, count, self.max_components
                        ),
                    )
                    .at(page.path(), page.line_of_string(&page.id)),
                );
            }
        }
        Ok(findings)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableRule> {
        Some(self)
    }
}

impl ConfigurableRule for PageComponentLimit {
    fn configure(&mut self, settings: &Map<String, Value>) -> Result<(), SettingsError> {
        check_keys(settings, &["max_components"])?;
        if let Some(max) = positive_int(settings, "max_components")? {
            self.max_components = max;
        }
        Ok(())
    }
}
