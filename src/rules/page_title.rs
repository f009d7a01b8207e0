//! Pages must carry a non-empty title.

use crate::engine::Rule;
use crate::finding::{Finding, Severity};
use crate::model::{JsonDocument, ProjectModel};

#[derive(Debug, Default)]
pub struct PageTitleRequired;

impl PageTitleRequired {
    pub const ID: &'static str = "page-title-required";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for PageTitleRequired {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Every page declares a non-empty title"
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        let findings = model
            .pages()
            .values()
            .filter(|page| page.title.as_deref().map(str::trim).unwrap_or("").is_empty())
            .map(|page| {
                Finding::new(
                    Self::ID,
                    Severity::Warning,
                    format!("page {:?} has no title", page.id),
                )
                .at(page.path(), page.line_of_entry("id", &page.id))
            })
            .collect();
        Ok(findings)
    }
}
