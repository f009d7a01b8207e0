//! Data provider endpoints served over plain HTTP.

use serde_json::{Map, Value};

use crate::engine::{ConfigurableRule, Rule};
use crate::error::SettingsError;
use crate::finding::{Finding, Severity};
use crate::model::{JsonDocument, ProjectModel};

use super::{check_keys, string_list};

const DEFAULT_ALLOWED_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

#[derive(Debug)]
pub struct InsecureEndpoint {
    allowed_hosts: Vec<String>,
}

impl Default for InsecureEndpoint {
    fn default() -> Self {
        Self {
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
        }
    }
}

impl InsecureEndpoint {
    pub const ID: &'static str = "data-provider-insecure-endpoint";

    pub fn factory() -> Box<dyn Rule> {
        Box::new(Self::default())
    }
}

/// Host part of an `http://` URL, lowercased. `None` for any other scheme.
fn insecure_host(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let scheme = trimmed.get(..7)?;
    if !scheme.eq_ignore_ascii_case("http://") {
        return None;
    }
    let rest = &trimmed[7..];
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let host = host.split(':').next().unwrap_or(host);
    Some(host.to_lowercase())
}

impl Rule for InsecureEndpoint {
    fn id(&self) -> &str {
        Self::ID
    }

    fn description(&self) -> &str {
        "Data providers use HTTPS outside local development hosts"
    }

    fn analyze(&self, model: &ProjectModel) -> anyhow::Result<Vec<Finding>> {
        let Some(doc) = model.data_provider() else {
            return Ok(Vec::new());
        };

        let mut findings = Vec::new();
        for provider in &doc.providers {
            let Some(url) = provider.url.as_deref() else {
                continue;
            };
            let Some(host) = insecure_host(url) else {
                continue;
            };
            if self.allowed_hosts.iter().any(|allowed| *allowed == host) {
                continue;
            }
            findings.push(
                Finding::new(
                    Self::ID,
                    Severity::Warning,
                    format!("provider {:?} uses an unencrypted endpoint {}", provider.id, url),
                )
                .at(doc.path(), doc.line_of_entry("url", url)),
            );
        }
        Ok(findings)
    }

    fn as_configurable(&mut self) -> Option<&mut dyn ConfigurableRule> {
        Some(self)
    }
}

impl ConfigurableRule for InsecureEndpoint {
    fn configure(&mut self, settings: &Map<String, Value>) -> Result<(), SettingsError> {
        check_keys(settings, &["allowed_hosts"])?;
        if let Some(hosts) = string_list(settings, "allowed_hosts")? {
            self.allowed_hosts = hosts.into_iter().map(|h| h.to_lowercase()).collect();
        }
        Ok(())
    }
}
