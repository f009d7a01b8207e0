//! Component `dataSource` bindings must name a declared provider.

use crate::engine::Rule;
use crate::finding::{Finding, Severity};
use crate::model::{Component, JsonDocument, ProjectModel};

#[derive(Debug, Default)]
pub struct DataBinding;

impl DataBinding {
    pub const ID: &'static str = "data-binding";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

fn bound_components(model: &ProjectModel) -> Vec<(&dyn JsonDocument, Vec<Component<'_>>)> {
    let mut out: Vec<(&dyn JsonDocument, Vec<Component<'_>>)> = Vec::new();
    for page in model.pages().values() {
        out.push((page, page.components()));
    }
    for fragment in model.fragments().values() {
        out.push((fragment, fragment.components()));
    }
    out.retain(|(_, components)| components.iter().any(|c| c.data_source().is_some()));
    out
}

impl Rule for DataBinding {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Component data sources refer to a declared data provider"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        let bound = bound_components(model);
        if bound.is_empty() {
            return Ok(Vec::new());
        }

        let Some(providers) = model.data_provider() else {
            model.completeness().register_skipped_check(
                Self::ID,
                "provider-exists",
                "DATA_PROVIDER file not supplied: data bindings cannot be verified",
            );
            return Ok(Vec::new());
        };

        let mut findings = Vec::new();
        for (doc, components) in bound {
            for source in components.iter().filter_map(|c| c.data_source()) {
                if providers.provider(source).is_none() {
                    findings.push(
                        Finding::new(
                            Self::ID,
                            Severity::Error,
                            format!("data source {:?} is not a declared provider", source),
                        )
                        .at(doc.path(), doc.line_of_entry("dataSource", source)),
                    );
                }
            }
        }
        Ok(findings)
    }
}
