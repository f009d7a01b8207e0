//! `{{ }}` interpolations referring to variables the runtime does not bind.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

use crate::engine::{ConfigurableRule, Rule};
use crate::error::SettingsError;
use crate::finding::{Finding, Severity};
use crate::model::ProjectModel;
use crate::template::{is_identifier, TemplateNode};

use super::{check_keys, string_list};

/// Variables the runtime binds for every template.
const DEFAULT_ROOTS: &[&str] = &[
    "app", "data", "env", "item", "page", "params", "session", "site", "user",
];

#[derive(Debug)]
pub struct TemplateUnknownVariable {
    known_roots: BTreeSet<String>,
}

impl Default for TemplateUnknownVariable {
    fn default() -> Self {
        Self {
            known_roots: DEFAULT_ROOTS.iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl TemplateUnknownVariable {
    pub const ID: &'static str = "template-unknown-variable";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self::default())
    }
}

impl Rule for TemplateUnknownVariable {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Template interpolations start from a variable the runtime provides"
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for script in model.scripts().values() {
            for template in &script.templates {
                for node in &template.nodes {
                    let TemplateNode::Interpolation { expr } = node else {
                        continue;
                    };
                    // Unparsed expressions fall back to raw text; skip those.
                    for name in expr.identifiers() {
                        if is_identifier(name) && !self.known_roots.contains(name) {
                            findings.push(
                                Finding::new(
                                    Self::ID,
                                    Severity::Warning,
                                    format!("unknown template variable {:?}", name),
                                )
                                .at(&script.path, template.line),
                            );
                        }
                    }
                }
            }
        }
        Ok(findings)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableRule> {
        Some(self)
    }
}

impl ConfigurableRule for TemplateUnknownVariable {
    /// `known_roots` adds to the default roots.
    fn configure(&mut self, settings: &Map<String, Value>) -> Result<(), SettingsError> {
        check_keys(settings, &["known_roots"])?;
        if let Some(roots) = string_list(settings, "known_roots")? {
            if let Some(bad) = roots.iter().find(|r| !is_identifier(r)) {
                return Err(SettingsError::invalid(
                    "known_roots",
                    format!("{:?} is not an identifier", bad),
                ));
            }
            self.known_roots.extend(roots);
        }
        Ok(())
    }
}
