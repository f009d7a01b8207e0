//! Rule discovery: the built-in table, the process-wide registry and
//! declarative manifests from a user directory.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use super::declarative::load_rules_dir;
use super::rule::{RuleEntry, RuleFactory};

lazy_static::lazy_static! {
    /// Rules registered at runtime, in registration order.
    static ref REGISTRY: RwLock<Vec<(String, RuleFactory)>> = RwLock::new(Vec::new());
}

/// Register a rule factory under `name` for every engine built afterwards.
pub fn register_rule(name: &str, factory: RuleFactory) {
    let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    registry.push((name.to_string(), factory));
}

/// Names of all runtime-registered rules.
pub fn registered_rules() -> Vec<String> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    registry.iter().map(|(name, _)| name.clone()).collect()
}

fn registered_entries() -> Vec<RuleEntry> {
    let registry = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    registry
        .iter()
        .map(|(name, factory)| RuleEntry::new(name, *factory))
        .collect()
}

/// Every rule entry in discovery order: built-ins, then registered rules,
/// then declarative rules from `rules_dir`.
pub fn discover_entries(rules_dir: Option<&Path>) -> Vec<RuleEntry> {
    let mut entries = crate::rules::builtin_entries();
    let builtin = entries.len();

    entries.extend(registered_entries());
    let registered = entries.len() - builtin;

    if let Some(dir) = rules_dir {
        entries.extend(load_rules_dir(dir));
    }
    let declarative = entries.len() - builtin - registered;

    log::info!(
        "discovered {} rules ({} built-in, {} registered, {} declarative)",
        entries.len(),
        builtin,
        registered,
        declarative
    );

    entries
}
