//! Core types for rule results.

use serde::{Deserialize, Serialize};

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" | "warn" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// A single reported rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    pub file_path: String,
    /// 1-based line, 0 when the rule cannot point at one.
    pub line: usize,
}

impl Finding {
    /// Create a finding that is not tied to a file yet.
    pub fn new(rule_id: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
            message: message.into(),
            file_path: String::new(),
            line: 0,
        }
    }

    /// Attach the file path and line.
    pub fn at(mut self, file_path: &str, line: usize) -> Self {
        self.file_path = file_path.to_string();
        self.line = line;
        self
    }
}

/// Sort findings by file path, then rule id, then line.
///
/// The engine's parallel path merges findings in completion order; callers
/// that diff output across runs sort with this first.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        (&a.file_path, &a.rule_id, a.line, &a.message)
            .cmp(&(&b.file_path, &b.rule_id, b.line, &b.message))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse() {
        assert_eq!("ERROR".parse::<Severity>(), Ok(Severity::Error));
        assert_eq!("warn".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!(" info ".parse::<Severity>(), Ok(Severity::Info));
        assert!("critical".parse::<Severity>().is_err());
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn test_sort_findings() {
        let mut findings = vec![
            Finding::new("b-rule", Severity::Info, "x").at("pages/b.page", 3),
            Finding::new("a-rule", Severity::Info, "x").at("pages/b.page", 9),
            Finding::new("a-rule", Severity::Info, "x").at("pages/b.page", 2),
            Finding::new("z-rule", Severity::Info, "x").at("pages/a.page", 1),
        ];
        sort_findings(&mut findings);

        let order: Vec<_> = findings
            .iter()
            .map(|f| (f.file_path.as_str(), f.rule_id.as_str(), f.line))
            .collect();
        assert_eq!(
            order,
            vec![
                ("pages/a.page", "z-rule", 1),
                ("pages/b.page", "a-rule", 2),
                ("pages/b.page", "a-rule", 9),
                ("pages/b.page", "b-rule", 3),
            ]
        );
    }
}
