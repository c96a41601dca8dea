//! Step timing and step reports.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info_span};

/// Warnings kept verbatim before the rest are summarized.
pub const MAX_STEP_WARNINGS: usize = 20;

/// A step's return value together with its wall-clock duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<T> {
    pub value: T,
    pub duration_ms: u64,
}

/// Invokes `f` exactly once and measures how long it took.
///
/// Errors from `f` are returned unchanged; nothing is retried.
pub fn measure_step<T, E>(
    step_name: &str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<Measured<T>, E> {
    let span = info_span!("step", step = %step_name);
    let _guard = span.enter();
    let start = Instant::now();

    let value = f()?;

    let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    debug!(step = %step_name, duration_ms, "step complete");
    Ok(Measured { value, duration_ms })
}

/// What a step reports about its own work.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepReport {
    pub description: String,
    pub counts: BTreeMap<String, u64>,
    pub warnings: Vec<String>,
}

impl StepReport {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Records a named counter.
    #[must_use]
    pub fn count(mut self, name: &str, value: usize) -> Self {
        self.counts.insert(name.to_string(), value as u64);
        self
    }

    /// Adds a single warning.
    #[must_use]
    pub fn warn(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Adds warnings, keeping the first [`MAX_STEP_WARNINGS`] and
    /// summarizing the rest as `... and N more`.
    #[must_use]
    pub fn warnings_capped(mut self, warnings: Vec<String>) -> Self {
        let total = warnings.len();
        self.warnings
            .extend(warnings.into_iter().take(MAX_STEP_WARNINGS));
        if total > MAX_STEP_WARNINGS {
            self.warnings
                .push(format!("... and {} more", total - MAX_STEP_WARNINGS));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_runs_closure_once() {
        let mut calls = 0;
        let measured = measure_step("count", || -> Result<u8, String> {
            calls += 1;
            Ok(7)
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(measured.value, 7);
    }

    #[test]
    fn measure_propagates_error() {
        let result = measure_step("fail", || -> Result<(), String> { Err("boom".into()) });
        assert_eq!(result, Err("boom".to_string()));
    }

    #[test]
    fn warnings_are_capped() {
        let warnings = (1..=25).map(|n| format!("row {n}: bad")).collect();
        let report = StepReport::new("x").warnings_capped(warnings);
        assert_eq!(report.warnings.len(), MAX_STEP_WARNINGS + 1);
        assert_eq!(report.warnings[0], "row 1: bad");
        assert_eq!(report.warnings[MAX_STEP_WARNINGS], "... and 5 more");
    }

    #[test]
    fn short_warning_lists_are_kept_whole() {
        let report = StepReport::new("x").warnings_capped(vec!["a".into(), "b".into()]);
        assert_eq!(report.warnings, vec!["a", "b"]);
    }
}
