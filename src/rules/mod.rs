//! Built-in rules.
//!
//! Each rule lives in its own module and is listed once in
//! [`builtin_entries`]. A new rule needs a module, a factory function and a
//! line in that table; `example.rs` is the template to copy.

mod component_limit;
mod data_binding;
mod data_provider;
mod example;
mod fragments;
mod page_title;
mod script_debug;
mod script_secret;
mod site_navigation;
mod template_vars;

pub use component_limit::PageComponentLimit;
pub use data_binding::DataBinding;
pub use data_provider::InsecureEndpoint;
pub use example::ExampleRule;
pub use fragments::{FragmentReference, FragmentUnused};
pub use page_title::PageTitleRequired;
pub use script_debug::ScriptDebugStatement;
pub use script_secret::HardcodedSecret;
pub use site_navigation::SiteNavigation;
pub use template_vars::TemplateUnknownVariable;

use serde_json::{Map, Value};

use crate::engine::RuleEntry;
use crate::error::SettingsError;

/// The built-in rule table, in discovery order.
pub fn builtin_entries() -> Vec<RuleEntry> {
    vec![
        RuleEntry::new(PageTitleRequired::ID, PageTitleRequired::factory),
        RuleEntry::new(PageComponentLimit::ID, PageComponentLimit::factory),
        RuleEntry::new(FragmentReference::ID, FragmentReference::factory),
        RuleEntry::new(FragmentUnused::ID, FragmentUnused::factory),
        RuleEntry::new(DataBinding::ID, DataBinding::factory),
        RuleEntry::new(InsecureEndpoint::ID, InsecureEndpoint::factory),
        RuleEntry::new(SiteNavigation::ID, SiteNavigation::factory),
        RuleEntry::new(HardcodedSecret::ID, HardcodedSecret::factory),
        RuleEntry::new(ScriptDebugStatement::ID, ScriptDebugStatement::factory),
        RuleEntry::new(TemplateUnknownVariable::ID, TemplateUnknownVariable::factory),
        RuleEntry::new(ExampleRule::ID, ExampleRule::factory).example(),
    ]
}

/// Reject keys a rule does not understand.
pub(crate) fn check_keys(settings: &Map<String, Value>, known: &[&str]) -> Result<(), SettingsError> {
    match settings.keys().find(|k| !known.contains(&k.as_str())) {
        Some(key) => Err(SettingsError::UnknownKey { key: key.clone() }),
        None => Ok(()),
    }
}

pub(crate) fn positive_int(settings: &Map<String, Value>, key: &str) -> Result<Option<usize>, SettingsError> {
    match settings.get(key) {
        None => Ok(None),
        Some(value) => match value.as_u64() {
            Some(n) if n > 0 => Ok(Some(n as usize)),
            _ => Err(SettingsError::invalid(key, format!("expected a positive integer, got {}", value))),
        },
    }
}

pub(crate) fn string_list(settings: &Map<String, Value>, key: &str) -> Result<Option<Vec<String>>, SettingsError> {
    let Some(value) = settings.get(key) else {
        return Ok(None);
    };
    let items = value
        .as_array()
        .ok_or_else(|| SettingsError::invalid(key, "expected a list of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| SettingsError::invalid(key, format!("expected a string, got {}", item)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}
