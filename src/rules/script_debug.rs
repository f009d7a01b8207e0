//! Debug statements left in scripts.

use lazy_static::lazy_static;
use regex::Regex;

use crate::engine::Rule;
use crate::finding::{Finding, Severity};
use crate::model::ProjectModel;

lazy_static! {
    static ref CONSOLE_CALL: Regex =
        Regex::new(r"\bconsole\s*\.\s*(log|debug|trace|dir)\s*\(").unwrap();
    static ref DEBUGGER: Regex = Regex::new(r"^\s*debugger\s*;?\s*$").unwrap();
}

#[derive(Debug, Default)]
pub struct ScriptDebugStatement;

impl ScriptDebugStatement {
    pub const ID: &'static str = "script-debug-statement";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self)
    }
}

impl Rule for ScriptDebugStatement {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Scripts do not ship console logging or debugger statements"
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        let mut findings = Vec::new();
        for script in model.scripts().values() {
            for (line_no, line) in script.lines() {
                if line.trim_start().starts_with("//") {
                    continue;
                }
                let message = if DEBUGGER.is_match(line) {
                    "debugger statement"
                } else if let Some(caps) = CONSOLE_CALL.captures(line) {
                    match &caps[1] {
                        "log" => "console.log call",
                        "debug" => "console.debug call",
                        "trace" => "console.trace call",
                        _ => "console.dir call",
                    }
                } else {
                    continue;
                };
                findings.push(
                    Finding::new(Self::ID, Severity::Info, message).at(&script.path, line_no),
                );
            }
        }
        Ok(findings)
    }
}
