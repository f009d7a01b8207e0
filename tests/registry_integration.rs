//! Runtime rule registration and user rule directories.
//!
//! Kept in its own test binary: `register_rule` is process-wide.

use std::fs;

use lcaudit::engine::registered_rules;
use lcaudit::{
    register_rule, AnalysisUnit, Configuration, Engine, Finding, Loader, ProjectModel, Rule,
    RuleConfig, Severity,
};
use tempfile::TempDir;

struct HomePageRequired;

impl Rule for HomePageRequired {
    fn id(&self) -> &str {
        "home-page-required"
    }

    fn description(&self) -> &str {
        "a page with id `home` exists"
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        if model.page("home").is_some() {
            return Ok(Vec::new());
        }
        Ok(vec![Finding::new(self.id(), Severity::Error, "no home page")])
    }
}

fn home_page_required() -> Box<dyn Rule> {
    Box::new(HomePageRequired)
}

#[test]
fn test_registered_rule_runs() {
    register_rule("home-page-required", home_page_required);
    assert!(registered_rules().contains(&"home-page-required".to_string()));

    let model = Loader::new(AnalysisUnit::IndividualFiles)
        .load(vec![("about.page", r#"{"id": "about", "title": "About"}"#)]);

    let engine = Engine::new(&Configuration::new());
    assert!(engine.rule_ids().contains(&"home-page-required"));

    let findings = engine.run(&model);
    let hits: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.rule_id == "home-page-required")
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].severity, Severity::Error);

    let disabled = Configuration::new().with_rule("home-page-required", RuleConfig::disabled());
    assert!(!Engine::new(&disabled).rule_ids().contains(&"home-page-required"));
}

#[test]
fn test_user_rules_dir() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("copy.yaml"),
        r#"
rules:
  - id: no-draft-titles
    message: draft title
    pattern: "^DRAFT"
    key: title
    applies_to: [PAGE]
    severity: error
"#,
    )
    .unwrap();
    fs::write(temp.path().join("broken.yaml"), "rules:\n  - id: [oops\n").unwrap();

    let model = Loader::new(AnalysisUnit::IndividualFiles).load(vec![
        ("a.page", r#"{"id": "a", "title": "DRAFT pricing"}"#),
        ("b.page", r#"{"id": "b", "title": "Pricing"}"#),
    ]);

    let engine = Engine::with_rules_dir(&Configuration::new(), temp.path());
    let findings: Vec<Finding> = engine
        .run(&model)
        .into_iter()
        .filter(|f| f.rule_id == "no-draft-titles")
        .collect();

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].file_path, "a.page");
    assert_eq!(findings[0].line, 1);
    assert_eq!(findings[0].severity, Severity::Error);
}

#[test]
fn test_declarative_rule_severity_override() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("rules.json"),
        r#"{"rules": [{"id": "no-http", "message": "plain http", "pattern": "^http://"}]}"#,
    )
    .unwrap();

    let config = Configuration::new().with_rule(
        "no-http",
        RuleConfig::default().with_severity(Severity::Info),
    );
    let model = Loader::default().load(vec![(
        "app.dataprovider",
        r#"{"providers": [{"id": "x", "url": "http://example.com"}]}"#,
    )]);

    let findings: Vec<Finding> = Engine::with_rules_dir(&config, temp.path())
        .run(&model)
        .into_iter()
        .filter(|f| f.rule_id == "no-http")
        .collect();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].severity, Severity::Info);
}
