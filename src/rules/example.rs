//! Template for writing a new rule.
//!
//! Copy this file, rename the type and `ID`, and add a line to
//! [`super::builtin_entries`]. The entry for this rule is flagged as an
//! example, so the engine never runs it.
//!
//! A rule:
//! - reads the model through `&ProjectModel` only and returns its findings;
//! - returns `Err` for failures it cannot handle (the engine logs it and the
//!   run continues without this rule's findings);
//! - registers skipped checks on the completeness tracker when a file type
//!   it needs was not supplied, instead of reporting false positives.
//!
//! Implement [`ConfigurableRule`] and return `Some(self)` from
//! `as_configurable` when the rule takes settings. `configure` must either
//! accept all settings or leave the rule untouched and return `Err`.

use serde_json::{Map, Value};

use crate::engine::{ConfigurableRule, Rule};
use crate::error::SettingsError;
use crate::finding::{Finding, Severity};
use crate::model::{FileType, JsonDocument, ProjectModel};

use super::{check_keys, string_list};

#[derive(Debug, Default)]
pub struct ExampleRule {
    forbidden_ids: Vec<String>,
}

impl ExampleRule {
    pub const ID: &'static str = "example-rule";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self::default())
    }
}

impl Rule for ExampleRule {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Example: pages whose id is on a forbidden list"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        if !model.completeness().has(FileType::Page) {
            model.completeness().register_skipped_check(
                Self::ID,
                "forbidden-ids",
                "PAGE files not supplied",
            );
            return Ok(Vec::new());
        }

        Ok(model
            .pages()
            .values()
            .filter(|page| self.forbidden_ids.contains(&page.id))
            .map(|page| {
                Finding::new(Self::ID, Severity::Info, format!("page id {:?} is forbidden", page.id))
                    .at(page.path(), page.line_of_string(&page.id))
            })
            .collect())
    }

    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableRule> {
        Some(self)
    }
}

impl ConfigurableRule for ExampleRule {
    fn configure(&mut self, settings: &Map<String, Value>) -> Result<(), SettingsError> {
        check_keys(settings, &["forbidden_ids"])?;
        if let Some(ids) = string_list(settings, "forbidden_ids")? {
            self.forbidden_ids = ids;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::engine::Engine;
    use crate::model::Loader;
    use serde_json::json;

    #[test]
    fn test_example_rule_works_when_called_directly() {
        let model = Loader::default().load(vec![("tmp.page", r#"{"id": "tmp"}"#)]);
        let mut rule = ExampleRule::default();
        rule.configure(json!({"forbidden_ids": ["tmp"]}).as_object().unwrap())
            .unwrap();
        assert_eq!(rule.analyze(&model).unwrap().len(), 1);
    }

    #[test]
    fn test_example_rule_never_active() {
        let engine = Engine::from_entries(&Configuration::new(), super::super::builtin_entries());
        assert!(!engine.rule_ids().contains(&ExampleRule::ID));
    }
}
