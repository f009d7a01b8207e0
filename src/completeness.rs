//! Cross-file completeness tracking.
//!
//! Many checks need a companion document: a data binding can only be
//! verified against the data provider file, navigation only against the site
//! file. The tracker records which file types were supplied and which checks
//! rules skipped because of what was missing, so a partial upload yields a
//! "partial" result instead of silently passing.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use crate::model::{AnalysisUnit, FileType};

/// A check a rule could not perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCheck {
    pub rule_name: String,
    pub check_name: String,
    pub reason: String,
}

/// A rule that cannot run at all without a missing file type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleNotExecuted {
    pub rule: String,
    pub reason: String,
}

/// Checks skipped by one rule that otherwise ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialRule {
    pub rule: String,
    pub checks: Vec<String>,
    /// Reason of the first check recorded for this rule.
    pub reason: String,
}

/// Rules that need a specific file type to run at all.
const RULES_REQUIRING_FILE_TYPE: &[(&str, FileType, &str)] = &[(
    "site-navigation",
    FileType::Site,
    "SITE file not supplied: home page and navigation targets cannot be verified",
)];

/// Which file types were analysed and which checks were skipped.
#[derive(Debug, Default)]
pub struct CompletenessTracker {
    analysis_type: AnalysisUnit,
    files_analyzed: Vec<String>,
    files_present: BTreeSet<FileType>,
    skipped: Mutex<Vec<SkippedCheck>>,
}

impl CompletenessTracker {
    pub fn new(analysis_type: AnalysisUnit) -> Self {
        Self {
            analysis_type,
            ..Self::default()
        }
    }

    pub fn analysis_type(&self) -> AnalysisUnit {
        self.analysis_type
    }

    /// Record an attempted file, whether or not it parsed.
    pub fn record_file(&mut self, path: &str) {
        self.files_analyzed.push(path.to_string());
    }

    /// Record that a file of this type parsed successfully.
    pub fn mark_present(&mut self, file_type: FileType) {
        self.files_present.insert(file_type);
    }

    /// Register a check a rule had to skip.
    ///
    /// Takes `&self`: rules running concurrently on the worker pool append
    /// through a shared reference to the model. An identical entry is
    /// recorded once, so running a model again does not grow the list.
    pub fn register_skipped_check(&self, rule_name: &str, check_name: &str, reason: &str) {
        let check = SkippedCheck {
            rule_name: rule_name.to_string(),
            check_name: check_name.to_string(),
            reason: reason.to_string(),
        };
        let mut skipped = self.skipped.lock().unwrap_or_else(PoisonError::into_inner);
        if skipped.contains(&check) {
            return;
        }
        log::debug!("{}: skipped check {} ({})", rule_name, check_name, reason);
        skipped.push(check);
    }

    pub fn files_analyzed(&self) -> &[String] {
        &self.files_analyzed
    }

    pub fn files_present(&self) -> &BTreeSet<FileType> {
        &self.files_present
    }

    pub fn has(&self, file_type: FileType) -> bool {
        self.files_present.contains(&file_type)
    }

    /// The canonical tags not supplied.
    pub fn files_missing(&self) -> BTreeSet<FileType> {
        FileType::ALL
            .iter()
            .copied()
            .filter(|t| !self.files_present.contains(t))
            .collect()
    }

    /// Complete when both companion documents were supplied.
    pub fn is_complete(&self) -> bool {
        self.has(FileType::DataProvider) && self.has(FileType::Site)
    }

    /// Snapshot of the skipped checks in registration order.
    pub fn skipped_checks(&self) -> Vec<SkippedCheck> {
        self.skipped
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn rules_not_executed(&self) -> Vec<RuleNotExecuted> {
        RULES_REQUIRING_FILE_TYPE
            .iter()
            .filter(|(_, file_type, _)| !self.has(*file_type))
            .map(|(rule, _, reason)| RuleNotExecuted {
                rule: rule.to_string(),
                reason: reason.to_string(),
            })
            .collect()
    }

    /// Skipped checks grouped by rule, in first-registration order.
    ///
    /// Rules listed by [`CompletenessTracker::rules_not_executed`] are left
    /// out; their checks stay visible in the raw skipped-check list.
    pub fn rules_partially_executed(&self) -> Vec<PartialRule> {
        let not_executed: Vec<String> =
            self.rules_not_executed().into_iter().map(|r| r.rule).collect();
        let mut grouped: Vec<PartialRule> = Vec::new();
        for skipped in self.skipped_checks() {
            if not_executed.contains(&skipped.rule_name) {
                continue;
            }
            match grouped.iter_mut().find(|p| p.rule == skipped.rule_name) {
                Some(entry) => {
                    if !entry.checks.contains(&skipped.check_name) {
                        entry.checks.push(skipped.check_name);
                    }
                }
                None => grouped.push(PartialRule {
                    rule: skipped.rule_name,
                    checks: vec![skipped.check_name],
                    reason: skipped.reason,
                }),
            }
        }
        grouped
    }

    /// Render the tracker for the output layer. Tags are sorted alphabetically.
    pub fn to_dict(&self) -> Value {
        let tags = |set: &BTreeSet<FileType>| -> Vec<&'static str> {
            set.iter().map(|t| t.as_str()).collect()
        };

        json!({
            "analysis_type": self.analysis_type.as_str(),
            "is_complete": self.is_complete(),
            "files_analyzed": self.files_analyzed,
            "files_present": tags(&self.files_present),
            "files_missing": tags(&self.files_missing()),
            "rules_not_executed": self.rules_not_executed(),
            "rules_partially_executed": self.rules_partially_executed(),
            "skipped_checks": self.skipped_checks(),
        })
    }
}
