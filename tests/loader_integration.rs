//! Integration tests for loading documents into a project model.
//!
//! These tests load the `testdata/shop` application and small inline
//! batches, then check the model and the completeness report.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use lcaudit::model::JsonDocument;
use lcaudit::{AnalysisUnit, FileType, Loader, ProjectModel};
use pretty_assertions::assert_eq;
use walkdir::WalkDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Read every file under `dir` as `(relative path, text)`, sorted by path.
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
            let text = std::fs::read_to_string(e.path()).expect("fixture is utf-8");
            (rel, text)
        })
        .collect();
    files.sort();
    files
}

fn load_shop() -> ProjectModel {
    Loader::new(AnalysisUnit::FullApp).load(read_app(&testdata_path().join("shop")))
}

fn tags(set: &BTreeSet<FileType>) -> Vec<&'static str> {
    set.iter().map(|t| t.as_str()).collect()
}

#[test]
fn test_shop_documents_loaded() {
    let model = load_shop();

    assert_eq!(
        model.pages().keys().cloned().collect::<Vec<_>>(),
        vec!["catalog".to_string(), "home".to_string()]
    );
    assert_eq!(
        model.fragments().keys().cloned().collect::<Vec<_>>(),
        vec!["header".to_string(), "promo".to_string()]
    );
    assert_eq!(model.scripts().len(), 1);
    assert_eq!(model.data_provider().map(|d| d.providers.len()), Some(2));
    assert_eq!(
        model.site().and_then(|s| s.home_page.clone()),
        Some("home".to_string())
    );
}

#[test]
fn test_shop_parse_errors_recorded() {
    let model = load_shop();

    let failed: Vec<&str> = model.parse_errors().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(failed, vec!["scripts/broken.js", "settings.json"]);
    assert!(model.parse_errors()[0].message.contains("syntax error at line"));
    assert_eq!(model.parse_errors()[1].message, "unsupported file type");

    // Every supplied file is listed, including the failed ones.
    assert_eq!(model.completeness().files_analyzed().len(), 9);
}

#[test]
fn test_shop_commented_keys_removed() {
    let model = load_shop();

    let home = model.page("home").unwrap();
    assert!(home.tree().get("_notes").is_none());

    // `_components` is dropped, so promo embeds nothing.
    let promo = model.fragment("promo").unwrap();
    assert!(promo.components().iter().all(|c| c.fragment_ref().is_none()));
}

#[test]
fn test_shop_templates_parsed() {
    let model = load_shop();

    let script = &model.scripts()["scripts/app.js"];
    assert_eq!(script.templates.len(), 1);
    assert_eq!(script.templates[0].line, 5);

    let roots: Vec<&str> = script.templates[0]
        .nodes
        .iter()
        .filter_map(|n| match n {
            lcaudit::TemplateNode::Interpolation { expr } => Some(expr.identifiers()),
            _ => None,
        })
        .flatten()
        .collect();
    assert_eq!(roots, vec!["user", "cart"]);
}

#[test]
fn test_shop_is_complete() {
    let model = load_shop();
    let tracker = model.completeness();

    assert!(tracker.is_complete());
    assert!(tracker.files_missing().is_empty());
    assert!(tracker.rules_not_executed().is_empty());
}

#[test]
fn test_page_and_script_only() {
    let model = Loader::new(AnalysisUnit::IndividualFiles).load(vec![
        ("home.page", r#"{"id": "home", "title": "Home"}"#),
        ("app.js", "const x = `{{user.name}}`;\n"),
    ]);
    let tracker = model.completeness();

    assert_eq!(tags(tracker.files_present()), vec!["PAGE", "SCRIPT"]);
    assert_eq!(
        tags(&tracker.files_missing()),
        vec!["DATA_PROVIDER", "FRAGMENT", "SITE"]
    );
    assert!(!tracker.is_complete());

    let report = tracker.to_dict();
    assert_eq!(report["analysis_type"], "individual_files");
    assert_eq!(report["is_complete"], false);
    assert_eq!(report["rules_not_executed"][0]["rule"], "site-navigation");
}

#[test]
fn test_page_data_provider_and_site_complete() {
    let model = Loader::new(AnalysisUnit::IndividualFiles).load(vec![
        ("home.page", r#"{"id": "home"}"#),
        ("app.dataprovider", r#"{"providers": []}"#),
        ("app.site", r#"{"name": "Shop", "homePage": "home"}"#),
    ]);
    let tracker = model.completeness();

    assert!(tracker.is_complete());
    assert!(tracker.rules_not_executed().is_empty());
    assert_eq!(tags(&tracker.files_missing()), vec!["FRAGMENT", "SCRIPT"]);
}

#[test]
fn test_duplicate_page_id_is_a_parse_error() {
    let model = Loader::default().load(vec![
        ("a/home.page", r#"{"id": "home", "title": "A"}"#),
        ("b/home.page", r#"{"id": "home", "title": "B"}"#),
    ]);

    assert_eq!(model.pages().len(), 1);
    assert_eq!(model.page("home").unwrap().title.as_deref(), Some("A"));
    assert_eq!(model.parse_errors().len(), 1);
    assert_eq!(model.parse_errors()[0].path, "b/home.page");
}
