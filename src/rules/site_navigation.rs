//! Site home page and navigation targets.

use crate::engine::Rule;
use crate::finding::{Finding, Severity};
use crate::model::{FileType, JsonDocument, ProjectModel};

#[derive(Debug, Default)]
pub struct SiteNavigation;

impl SiteNavigation {
    pub const ID: &'static str = "site-navigation";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for SiteNavigation {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "The site home page and navigation entries point at existing pages"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        let Some(site) = model.site() else {
            model.completeness().register_skipped_check(
                Self::ID,
                "navigation-targets",
                "SITE file not supplied: home page and navigation targets cannot be verified",
            );
            return Ok(Vec::new());
        };

        if !model.completeness().has(FileType::Page) {
            model.completeness().register_skipped_check(
                Self::ID,
                "page-targets",
                "PAGE files not supplied: navigation targets cannot be resolved",
            );
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        let finding = |message: String, line: usize| {
            Finding::new(Self::ID, Severity::Error, message).at(site.path(), line)
        };

        match site.home_page.as_deref() {
            Some(home) if model.page(home).is_none() => findings.push(finding(
                format!("home page {:?} does not exist", home),
                site.line_of_entry("homePage", home),
            )),
            Some(_) => {}
            None => findings.push(finding("site declares no home page".to_string(), 0)),
        }

        for entry in &site.navigation {
            let label = entry.label.as_deref().unwrap_or("<unlabelled>");
            match entry.page.as_deref() {
                Some(page) if model.page(page).is_none() => findings.push(finding(
                    format!("navigation entry {:?} targets unknown page {:?}", label, page),
                    site.line_of_entry("page", page),
                )),
                Some(_) => {}
                None => findings.push(finding(
                    format!("navigation entry {:?} has no target page", label),
                    entry
                        .label
                        .as_deref()
                        .map(|l| site.line_of_entry("label", l))
                        .unwrap_or(0),
                )),
            }
        }

        Ok(findings)
    }
}
