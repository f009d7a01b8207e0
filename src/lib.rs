//! lcaudit - static analysis core for low-code application documents.
//!
//! lcaudit loads the JSON documents (pages, fragments, data provider, site)
//! and scripts of a low-code application into one project model, then runs
//! independent rules over it. It also reports which file types were
//! supplied, so a partial upload is never mistaken for a clean one.
//!
//! # Architecture
//!
//! - `model`: document loading, canonicalization and the project model
//! - `template`: the `{{ }}` interpolation parser for script templates
//! - `completeness`: tracks supplied file types and skipped checks
//! - `engine`: rule discovery, configuration and (parallel) execution
//! - `rules`: built-in rules
//! - `config`: resolved per-rule configuration
//!
//! # Adding a New Rule
//!
//! See `src/rules/example.rs`. Implement the `Rule` trait and list the
//! factory in `rules/mod.rs`, or call [`register_rule`] at startup.
//!
//! ```no_run
//! use lcaudit::{AnalysisUnit, Configuration, Engine, Loader};
//!
//! let files = vec![("pages/home.page", r#"{"id": "home", "title": "Home"}"#)];
//! let model = Loader::new(AnalysisUnit::IndividualFiles).load(files);
//! let report = Engine::new(&Configuration::new()).analyze(&model);
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! ```

pub mod completeness;
pub mod config;
pub mod engine;
pub mod error;
pub mod finding;
pub mod model;
pub mod rules;
pub mod template;

pub use completeness::CompletenessTracker;
pub use config::{Configuration, RuleConfig};
pub use engine::{
    register_rule, ActiveRule, AnalysisReport, ConfigurableRule, Engine, Rule, RuleEntry,
    RuleFactory, MAX_WORKERS, SERIAL_THRESHOLD,
};
pub use error::{
    ConfigError, DocumentParseError, RuleDiscoveryError, RuleExecutionError, SettingsError,
};
pub use finding::{sort_findings, Finding, Severity};
pub use model::{AnalysisUnit, FileType, Loader, ProjectModel};
pub use template::{parse_expression, parse_template, Expr, TemplateNode};

/// Install `env_logger` as the log backend.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects `debug` over
/// `warn`. Calling this more than once is harmless.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "lcaudit=debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}
