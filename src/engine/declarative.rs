//! Declarative rules loaded from YAML or JSON manifests.
//!
//! A manifest lists pattern rules that run without writing Rust:
//!
//! ```yaml
//! rules:
//!   - id: no-placeholder-text
//!     message: placeholder text left in document
//!     pattern: "(?i)lorem ipsum"
//!     severity: info
//!     applies_to: [PAGE, FRAGMENT]
//!     key: text
//!     files: ["pages/**"]
//! ```
//!
//! JSON documents are matched on the string values of their canonical
//! trees, scripts line by line.

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::RuleDiscoveryError;
use crate::finding::{Finding, Severity};
use crate::model::{FileType, JsonDocument, ProjectModel};

use super::rule::{Rule, RuleEntry};

/// Top level of a manifest file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleManifest {
    #[serde(default)]
    pub rules: Vec<ManifestRule>,
}

/// One rule as written in a manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestRule {
    pub id: String,
    pub message: String,
    pub pattern: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// File type tags; empty means every type.
    #[serde(default)]
    pub applies_to: Vec<String>,
    /// Only match JSON strings stored under this key.
    #[serde(default)]
    pub key: Option<String>,
    /// Glob filter on document paths; empty means every path.
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub example: bool,
}

impl RuleManifest {
    /// Parse manifest text. YAML and JSON are both accepted.
    pub fn parse(content: &str, path: &Path) -> Result<Self, RuleDiscoveryError> {
        serde_yaml::from_str(content).map_err(|e| RuleDiscoveryError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, RuleDiscoveryError> {
        let content = fs::read_to_string(path).map_err(|source| RuleDiscoveryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }
}

/// A compiled pattern rule.
#[derive(Debug, Clone)]
pub struct DeclarativeRule {
    id: String,
    description: String,
    message: String,
    severity: Severity,
    pattern: Regex,
    applies_to: Vec<FileType>,
    key: Option<String>,
    files: Option<GlobSet>,
}

impl DeclarativeRule {
    /// Validate and compile a manifest rule.
    pub fn compile(def: &ManifestRule) -> Result<Self, RuleDiscoveryError> {
        let invalid = |message: String| RuleDiscoveryError::InvalidRule {
            rule: def.id.clone(),
            message,
        };

        if def.id.trim().is_empty() {
            return Err(invalid("rule id must not be empty".to_string()));
        }

        let pattern =
            Regex::new(&def.pattern).map_err(|e| invalid(format!("invalid pattern: {}", e)))?;

        let severity = match &def.severity {
            Some(s) => s.parse::<Severity>().map_err(invalid)?,
            None => Severity::Warning,
        };

        let applies_to = if def.applies_to.is_empty() {
            FileType::ALL.to_vec()
        } else {
            def.applies_to
                .iter()
                .map(|tag| {
                    FileType::parse(tag).ok_or_else(|| invalid(format!("unknown file type {:?}", tag)))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        let files = if def.files.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &def.files {
                let glob = Glob::new(pattern)
                    .map_err(|e| invalid(format!("invalid glob {:?}: {}", pattern, e)))?;
                builder.add(glob);
            }
            Some(
                builder
                    .build()
                    .map_err(|e| invalid(format!("invalid globs: {}", e)))?,
            )
        };

        Ok(Self {
            id: def.id.clone(),
            description: def
                .description
                .clone()
                .unwrap_or_else(|| def.message.clone()),
            message: def.message.clone(),
            severity,
            pattern,
            applies_to,
            key: def.key.clone(),
            files,
        })
    }

    fn applies(&self, file_type: FileType, path: &str) -> bool {
        self.applies_to.contains(&file_type)
            && self.files.as_ref().map(|set| set.is_match(path)).unwrap_or(true)
    }

    fn check_document(&self, doc: &dyn JsonDocument, findings: &mut Vec<Finding>) {
        let mut matched: Vec<&str> = Vec::new();
        walk_strings(doc.tree(), None, &mut |key, value| {
            let key_matches = match &self.key {
                Some(wanted) => key == Some(wanted.as_str()),
                None => true,
            };
            if key_matches && self.pattern.is_match(value) {
                matched.push(value);
            }
        });

        for value in matched {
            findings.push(
                Finding::new(&self.id, self.severity, self.message.as_str())
                    .at(doc.path(), doc.line_of_string(value)),
            );
        }
    }
}

/// Visit every string in a tree with the nearest enclosing map key.
fn walk_strings<'a>(
    value: &'a Value,
    key: Option<&'a str>,
    visit: &mut dyn FnMut(Option<&'a str>, &'a str),
) {
    match value {
        Value::String(s) => visit(key, s),
        Value::Array(items) => {
            for item in items {
                walk_strings(item, key, visit);
            }
        }
        Value::Object(map) => {
            for (k, v) in map {
                walk_strings(v, Some(k.as_str()), visit);
            }
        }
        _ => {}
    }
}

impl Rule for DeclarativeRule {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();

        for doc in model.json_documents() {
            if self.applies(doc.file_type(), doc.path()) {
                self.check_document(doc, &mut findings);
            }
        }

        if self.key.is_none() {
            for script in model.scripts().values() {
                if !self.applies(FileType::Script, &script.path) {
                    continue;
                }
                for (line, text) in script.lines() {
                    if self.pattern.is_match(text) {
                        findings.push(
                            Finding::new(&self.id, self.severity, self.message.as_str())
                                .at(&script.path, line),
                        );
                    }
                }
            }
        }

        Ok(findings)
    }
}

fn is_manifest(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml" | "json")
    )
}

/// Load every manifest under `dir`, recursively, in sorted path order.
///
/// Unreadable manifests and invalid rules are logged and skipped.
pub fn load_rules_dir(dir: &Path) -> Vec<RuleEntry> {
    let mut entries = Vec::new();

    if !dir.is_dir() {
        log::warn!("rule directory {:?} does not exist", dir);
        return entries;
    }

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let err = RuleDiscoveryError::Walk {
                    path: dir.to_path_buf(),
                    source,
                };
                log::warn!("{}", err);
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !is_manifest(path) {
            continue;
        }

        let manifest = match RuleManifest::from_file(path) {
            Ok(manifest) => manifest,
            Err(err) => {
                log::warn!("{}", err);
                continue;
            }
        };

        log::debug!("rule manifest {:?}: {} rules", path, manifest.rules.len());

        for def in &manifest.rules {
            let rule = match DeclarativeRule::compile(def) {
                Ok(rule) => rule,
                Err(err) => {
                    log::warn!("{} (in {:?})", err, path);
                    continue;
                }
            };

            let entry = RuleEntry::fallible(&def.id, move || {
                Ok(Box::new(rule.clone()) as Box<dyn Rule>)
            });
            entries.push(if def.example { entry.example() } else { entry });
        }
    }

    entries
}
