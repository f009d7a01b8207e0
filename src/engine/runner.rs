//! Executes active rules against a project model.

use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;

use crate::error::{panic_message, RuleExecutionError};
use crate::finding::Finding;
use crate::model::ProjectModel;

use super::rule::ActiveRule;

/// At or below this many rules, the run stays on the calling thread.
pub const SERIAL_THRESHOLD: usize = 5;

/// Upper bound on worker threads for the parallel path.
pub const MAX_WORKERS: usize = 8;

/// Runs rules serially or on a bounded worker pool.
pub struct Runner<'r> {
    rules: &'r [ActiveRule],
}

impl<'r> Runner<'r> {
    pub fn new(rules: &'r [ActiveRule]) -> Self {
        Self { rules }
    }

    /// Whether a run with this many rules takes the parallel path.
    pub fn is_parallel(&self) -> bool {
        self.rules.len() > SERIAL_THRESHOLD
    }

    /// Run every rule. Serial runs return findings in rule order; parallel
    /// runs return them in completion order.
    pub fn run(&self, model: &ProjectModel) -> Vec<Finding> {
        if !self.is_parallel() {
            return self.run_serial(model);
        }

        let workers = self.rules.len().min(MAX_WORKERS);
        match ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("lcaudit-rule-{}", i))
            .build()
        {
            Ok(pool) => self.run_parallel(&pool, model),
            Err(e) => {
                log::warn!("could not start rule worker pool ({}), running serially", e);
                self.run_serial(model)
            }
        }
    }

    fn run_serial(&self, model: &ProjectModel) -> Vec<Finding> {
        log::debug!("running {} rules serially", self.rules.len());
        self.rules
            .iter()
            .flat_map(|rule| collect(rule, execute(rule, model)))
            .collect()
    }

    fn run_parallel(&self, pool: &ThreadPool, model: &ProjectModel) -> Vec<Finding> {
        log::debug!(
            "running {} rules on {} workers",
            self.rules.len(),
            pool.current_num_threads()
        );

        let (tx, rx) = mpsc::channel();
        pool.scope(|scope| {
            for rule in self.rules {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let findings = collect(rule, execute(rule, model));
                    // The receiver outlives the scope.
                    let _ = tx.send(findings);
                });
            }
        });
        drop(tx);

        rx.into_iter().flatten().collect()
    }
}

/// Run one rule, turning both `Err` and panics into a `RuleExecutionError`.
/// Findings are stamped with the rule's effective severity.
fn execute(active: &ActiveRule, model: &ProjectModel) -> Result<Vec<Finding>, RuleExecutionError> {
    let id = active.id();
    log::debug!("running rule {}", id);

    match catch_unwind(AssertUnwindSafe(|| active.rule.analyze(model))) {
        Ok(Ok(mut findings)) => {
            for finding in &mut findings {
                finding.severity = active.severity;
            }
            Ok(findings)
        }
        Ok(Err(source)) => Err(RuleExecutionError::Failed {
            rule: id.to_string(),
            source,
        }),
        Err(payload) => Err(RuleExecutionError::Panicked {
            rule: id.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn collect(active: &ActiveRule, result: Result<Vec<Finding>, RuleExecutionError>) -> Vec<Finding> {
    match result {
        Ok(findings) => {
            log::debug!("rule {} produced {} findings", active.id(), findings.len());
            findings
        }
        Err(err) => {
            log::error!("{}", err);
            Vec::new()
        }
    }
}
