//! Integration tests for the rule engine against the shop fixture.

use std::path::{Path, PathBuf};

use lcaudit::rules::builtin_entries;
use lcaudit::{
    sort_findings, AnalysisUnit, ConfigError, Configuration, Engine, Finding, Loader,
    ProjectModel, Rule, RuleEntry, Severity, SERIAL_THRESHOLD,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use walkdir::WalkDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn read_app(dir: &Path) -> Vec<(String, String)> {
    let mut files: Vec<(String, String)> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e
                .path()
                .strip_prefix(dir)
                .expect("path under app dir")
                .to_string_lossy()
                .replace('\\', "/");
            (rel, std::fs::read_to_string(e.path()).expect("fixture is utf-8"))
        })
        .collect();
    files.sort();
    files
}

fn load_shop() -> ProjectModel {
    Loader::new(AnalysisUnit::FullApp).load(read_app(&testdata_path().join("shop")))
}

/// `(rule, file, line)` triples, sorted.
fn located(mut findings: Vec<Finding>) -> Vec<(String, String, usize)> {
    sort_findings(&mut findings);
    findings
        .into_iter()
        .map(|f| (f.rule_id, f.file_path, f.line))
        .collect()
}

fn triple(rule: &str, file: &str, line: usize) -> (String, String, usize) {
    (rule.to_string(), file.to_string(), line)
}

fn builtin_engine(config: &Configuration) -> Engine {
    Engine::from_entries(config, builtin_entries())
}

#[test]
fn test_shop_default_findings() {
    let model = load_shop();
    let engine = builtin_engine(&Configuration::new());
    assert_eq!(engine.len(), 10);

    let findings = located(engine.run(&model));
    assert_eq!(
        findings,
        vec![
            triple("data-provider-insecure-endpoint", "app.dataprovider.json", 4),
            triple("fragment-unused", "fragments/promo.fragment", 2),
            triple("data-binding", "pages/catalog.page", 5),
            triple("fragment-reference", "pages/catalog.page", 6),
            triple("page-title-required", "pages/catalog.page", 2),
            triple("script-debug-statement", "scripts/app.js", 4),
            triple("script-hardcoded-secret", "scripts/app.js", 1),
            triple("template-unknown-variable", "scripts/app.js", 5),
            triple("site-navigation", "shop.site", 7),
        ]
    );
}

#[test]
fn test_shop_default_severities() {
    let model = load_shop();
    let mut findings = builtin_engine(&Configuration::new()).run(&model);
    sort_findings(&mut findings);

    let severity = |rule: &str| {
        findings
            .iter()
            .find(|f| f.rule_id == rule)
            .map(|f| f.severity)
            .unwrap()
    };
    assert_eq!(severity("fragment-reference"), Severity::Error);
    assert_eq!(severity("fragment-unused"), Severity::Info);
    assert_eq!(severity("page-title-required"), Severity::Warning);
}

#[test]
fn test_shop_with_configuration_file() {
    let model = load_shop();
    let config = Configuration::parse_file(testdata_path().join("config.yaml")).unwrap();
    let engine = builtin_engine(&config);

    assert!(!engine.rule_ids().contains(&"script-debug-statement"));
    assert!(!engine.rule_ids().contains(&"fragment-unused"));
    // The commented-out entry leaves data-binding enabled.
    assert!(engine.rule_ids().contains(&"data-binding"));

    let findings = engine.run(&model);
    let limits: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.rule_id == "page-component-limit")
        .collect();
    assert_eq!(limits.len(), 2);

    let title = findings
        .iter()
        .find(|f| f.rule_id == "page-title-required")
        .unwrap();
    assert_eq!(title.severity, Severity::Error);
}

#[test]
fn test_shop_with_rules_dir() {
    let model = load_shop();
    let engine = Engine::from_config_value(&json!({}), Some(testdata_path().join("rules").as_path()))
        .unwrap();

    let ids = engine.rule_ids();
    assert!(ids.contains(&"no-placeholder-text"));
    assert!(ids.contains(&"no-todo-in-scripts"));
    assert!(!ids.contains(&"template-only"));

    let report = engine.analyze(&model);
    let placeholders: Vec<&Finding> = report
        .findings
        .iter()
        .filter(|f| f.rule_id == "no-placeholder-text")
        .collect();
    assert_eq!(placeholders.len(), 1);
    assert_eq!(placeholders[0].file_path, "pages/home.page.json");
    assert_eq!(placeholders[0].line, 8);
    assert_eq!(placeholders[0].severity, Severity::Info);
}

#[test]
fn test_report_serializes() {
    let model = load_shop();
    let report = builtin_engine(&Configuration::new()).analyze(&model);
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["rules_run"], 10);
    assert_eq!(value["file_counts"]["FRAGMENT"], 2);
    assert_eq!(value["parse_errors"][0]["path"], "scripts/broken.js");
    assert_eq!(value["completeness"]["is_complete"], true);
    assert_eq!(value["completeness"]["analysis_type"], "full_app");
}

#[test]
fn test_skips_reported_for_partial_upload() {
    let model = Loader::new(AnalysisUnit::IndividualFiles).load(read_app(
        &testdata_path().join("shop").join("pages"),
    ));
    let report = builtin_engine(&Configuration::new()).analyze(&model);

    let mut partial: Vec<&str> = report.completeness["rules_partially_executed"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["rule"].as_str().unwrap())
        .collect();
    partial.sort();
    assert_eq!(partial, vec!["data-binding", "fragment-reference"]);
    assert_eq!(
        report.completeness["rules_not_executed"][0]["rule"],
        "site-navigation"
    );
    assert_eq!(report.completeness["is_complete"], false);
}

#[test]
fn test_repeated_runs_do_not_grow_skipped_checks() {
    let model = Loader::new(AnalysisUnit::IndividualFiles).load(read_app(
        &testdata_path().join("shop").join("pages"),
    ));
    let engine = builtin_engine(&Configuration::new());

    engine.run(&model);
    let first = model.completeness().skipped_checks();
    engine.run(&model);
    assert_eq!(model.completeness().skipped_checks(), first);
}

#[test]
fn test_fatal_configuration() {
    let err = Engine::from_config_value(&json!([1, 2]), None).unwrap_err();
    assert!(matches!(err, ConfigError::NotAMap { .. }));
}

// Rule isolation

struct Emits;

impl Rule for Emits {
    fn id(&self) -> &str {
        "a-emits"
    }

    fn description(&self) -> &str {
        "emits one finding"
    }

    fn analyze(&self, _model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        Ok(vec![Finding::new("a-emits", Severity::Warning, "F1").at("home.page", 1)])
    }
}

struct Fails;

impl Rule for Fails {
    fn id(&self) -> &str {
        "b-fails"
    }

    fn description(&self) -> &str {
        "returns an error"
    }

    fn analyze(&self, _model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        anyhow::bail!("rule bug")
    }
}

struct Panics;

impl Rule for Panics {
    fn id(&self) -> &str {
        "b-panics"
    }

    fn description(&self) -> &str {
        "panics"
    }

    fn analyze(&self, _model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        panic!("rule bug")
    }
}

struct Quiet(&'static str);

impl Rule for Quiet {
    fn id(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "never reports"
    }

    fn analyze(&self, _model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        Ok(Vec::new())
    }
}

fn emits() -> Box<dyn Rule> {
    Box::new(Emits)
}

fn fails() -> Box<dyn Rule> {
    Box::new(Fails)
}

fn panics() -> Box<dyn Rule> {
    Box::new(Panics)
}

fn quiet() -> Box<dyn Rule> {
    Box::new(Quiet("c-quiet"))
}

/// A, the broken rule B, C, then `padding` no-op rules.
fn isolation_entries(broken: fn() -> Box<dyn Rule>, padding: usize) -> Vec<RuleEntry> {
    let mut entries = vec![
        RuleEntry::new("a-emits", emits),
        RuleEntry::new("b", broken),
        RuleEntry::new("c-quiet", quiet),
    ];
    let names = ["pad-1", "pad-2", "pad-3", "pad-4", "pad-5", "pad-6"];
    for &name in names.iter().take(padding) {
        entries.push(RuleEntry::fallible(name, move || {
            Ok(Box::new(Quiet(name)) as Box<dyn Rule>)
        }));
    }
    entries
}

fn messages(engine: &Engine) -> Vec<String> {
    engine
        .run(&ProjectModel::default())
        .into_iter()
        .map(|f| f.message)
        .collect()
}

#[test]
fn test_failing_rule_isolated_serial_and_parallel() {
    for broken in [fails as fn() -> Box<dyn Rule>, panics] {
        let serial = Engine::from_entries(&Configuration::new(), isolation_entries(broken, 0));
        assert!(serial.len() <= SERIAL_THRESHOLD);
        assert_eq!(messages(&serial), vec!["F1".to_string()]);

        let parallel = Engine::from_entries(&Configuration::new(), isolation_entries(broken, 5));
        assert!(parallel.len() > SERIAL_THRESHOLD);
        assert_eq!(messages(&parallel), vec!["F1".to_string()]);
    }
}

#[test]
fn test_threshold_equivalence() {
    let model = load_shop();
    let config = Configuration::new();

    let serial_entries: Vec<RuleEntry> = builtin_entries().into_iter().take(SERIAL_THRESHOLD).collect();
    let serial = Engine::from_entries(&config, serial_entries);
    assert_eq!(serial.len(), SERIAL_THRESHOLD);

    let mut padded: Vec<RuleEntry> = builtin_entries().into_iter().take(SERIAL_THRESHOLD).collect();
    padded.push(RuleEntry::new("c-quiet", quiet));
    let parallel = Engine::from_entries(&config, padded);
    assert_eq!(parallel.len(), SERIAL_THRESHOLD + 1);

    assert_eq!(located(serial.run(&model)), located(parallel.run(&model)));
}

#[test]
fn test_serial_order_is_discovery_order() {
    let model = load_shop();
    let entries: Vec<RuleEntry> = builtin_entries().into_iter().take(3).collect();
    let findings = Engine::from_entries(&Configuration::new(), entries).run(&model);

    let ids: Vec<&str> = findings.iter().map(|f| f.rule_id.as_str()).collect();
    assert_eq!(ids, vec!["page-title-required", "fragment-reference"]);
}
