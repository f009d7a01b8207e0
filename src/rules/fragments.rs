//! Fragment references between pages and fragments.

use std::collections::BTreeSet;

use crate::engine::Rule;
use crate::finding::{Finding, Severity};
use crate::model::{FileType, JsonDocument, ProjectModel};

/// Fragment ids embedded anywhere in pages or other fragments.
fn referenced_fragments(model: &ProjectModel) -> BTreeSet<&str> {
    let mut refs: BTreeSet<&str> = BTreeSet::new();
    for page in model.pages().values() {
        refs.extend(page.fragment_refs());
    }
    for fragment in model.fragments().values() {
        refs.extend(fragment.components().iter().filter_map(|c| c.fragment_ref()));
    }
    refs
}

/// Pages and fragments must only embed fragments that exist.
#[derive(Debug, Default)]
pub struct FragmentReference;

impl FragmentReference {
    pub const ID: &'static str = "fragment-reference";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for FragmentReference {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Embedded fragments refer to a supplied fragment"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        if referenced_fragments(model).is_empty() {
            return Ok(Vec::new());
        }

        if !model.completeness().has(FileType::Fragment) {
            model.completeness().register_skipped_check(
                Self::ID,
                "fragment-exists",
                "FRAGMENT files not supplied: fragment references cannot be verified",
            );
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        let mut check = |doc: &dyn JsonDocument, refs: Vec<&str>| {
            for id in refs {
                if model.fragment(id).is_none() {
                    findings.push(
                        Finding::new(Self::ID, Severity::Error, format!("unknown fragment {:?}", id))
                            .at(doc.path(), doc.line_of_entry("ref", id)),
                    );
                }
            }
        };

        for page in model.pages().values() {
            check(page, page.fragment_refs());
        }
        for fragment in model.fragments().values() {
            let refs = fragment
                .components()
                .iter()
                .filter_map(|c| c.fragment_ref())
                .collect();
            check(fragment, refs);
        }

        Ok(findings)
    }
}

/// Fragments no page or fragment embeds.
#[derive(Debug, Default)]
pub struct FragmentUnused;

impl FragmentUnused {
    pub const ID: &'static str = "fragment-unused";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for FragmentUnused {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Every fragment is embedded somewhere"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        if model.fragments().is_empty() {
            return Ok(Vec::new());
        }

        if !model.completeness().has(FileType::Page) {
            model.completeness().register_skipped_check(
                Self::ID,
                "fragment-usage",
                "PAGE files not supplied: fragment usage cannot be verified",
            );
            return Ok(Vec::new());
        }

        let refs = referenced_fragments(model);
        let findings = model
            .fragments()
            .values()
            .filter(|fragment| !refs.contains(fragment.id.as_str()))
            .map(|fragment| {
                Finding::new(
                    Self::ID,
                    Severity::Info,
                    format!("fragment {:?} is never used", fragment.id),
                )
                .at(fragment.path(), fragment.line_of_entry("id", &fragment.id))
            })
            .collect();
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Loader;

    const HOME: &str = r#"{"id": "home", "components": [
  {"type": "fragment", "ref": "header"},
  {"type": "fragment", "ref": "footer"}
]}"#;

    #[test]
    fn test_unknown_fragment_reported() {
        let model = Loader::default().load(vec![
            ("home.page", HOME),
            ("header.fragment", r#"{"id": "header", "components": [{"type": "fragment", "ref": "logo"}]}"#),
        ]);

        let mut messages: Vec<String> = FragmentReference
            .analyze(&model)
            .unwrap()
            .into_iter()
            .map(|f| format!("{}:{} {}", f.file_path, f.line, f.message))
            .collect();
        messages.sort();
        assert_eq!(
            messages,
            vec![
                "header.fragment:1 unknown fragment \"logo\"",
                "home.page:3 unknown fragment \"footer\"",
            ]
        );
    }

    #[test]
    fn test_reference_check_skipped_without_fragments() {
        let model = Loader::default().load(vec![("home.page", HOME)]);
        assert!(FragmentReference.analyze(&model).unwrap().is_empty());

        let partial = model.completeness().rules_partially_executed();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[0].rule, FragmentReference::ID);
        assert_eq!(partial[0].checks, vec!["fragment-exists"]);
    }

    #[test]
    fn test_unused_fragment() {
        let model = Loader::default().load(vec![
            ("home.page", HOME),
            ("header.fragment", r#"{"id": "header"}"#),
            ("sidebar.fragment", r#"{"id": "sidebar"}"#),
        ]);
        let findings = FragmentUnused.analyze(&model).unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].file_path, "sidebar.fragment");
    }

    #[test]
    fn test_unused_check_skipped_without_pages() {
        let model = Loader::default().load(vec![("header.fragment", r#"{"id": "header"}"#)]);
        assert!(FragmentUnused.analyze(&model).unwrap().is_empty());
        assert_eq!(model.completeness().skipped_checks().len(), 1);
    }
}
