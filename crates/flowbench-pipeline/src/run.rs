//! Per-invocation run state.

use std::time::Instant;

use flowbench_model::{Artifact, Summary, SummaryValue, ToolId};
use tracing::{info, warn};

use crate::audit::{AuditDocument, AuditStep};
use crate::error::Result;
use crate::step::{StepReport, measure_step};

/// Name of the audit artifact appended to every run's output.
pub const AUDIT_ARTIFACT: &str = "audit.json";

/// One named input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Input handed to a tool: one table or a batch of documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInput {
    Single(InputFile),
    Batch(Vec<InputFile>),
}

impl ToolInput {
    pub fn files(&self) -> &[InputFile] {
        match self {
            Self::Single(file) => std::slice::from_ref(file),
            Self::Batch(files) => files,
        }
    }
}

/// Everything a finished run hands back to its caller.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub tool: ToolId,
    /// Output buffers; the last one is always `audit.json`.
    pub artifacts: Vec<Artifact>,
    pub summary: Summary,
    pub audit: AuditDocument,
}

impl PipelineOutput {
    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|artifact| artifact.name == name)
    }

    /// Artifact contents as text, for CSV and JSON outputs.
    pub fn artifact_text(&self, name: &str) -> Option<&str> {
        self.artifact(name)
            .and_then(|artifact| std::str::from_utf8(&artifact.bytes).ok())
    }
}

/// State of one tool invocation.
///
/// Steps are appended strictly in execution order. [`PipelineRun::finish`]
/// consumes the run, so it is finalized exactly once.
#[derive(Debug)]
pub struct PipelineRun {
    tool: ToolId,
    steps: Vec<AuditStep>,
    summary: Summary,
    started: Instant,
}

impl PipelineRun {
    pub fn new(tool: ToolId) -> Self {
        info!(tool = %tool, "pipeline run started");
        Self {
            tool,
            steps: Vec::new(),
            summary: Summary::new(),
            started: Instant::now(),
        }
    }

    pub fn tool(&self) -> ToolId {
        self.tool
    }

    pub fn steps(&self) -> &[AuditStep] {
        &self.steps
    }

    /// Runs one step and records it as the next audit entry.
    ///
    /// An error leaves the audit untouched and is returned as is.
    pub fn step<T>(
        &mut self,
        name: &str,
        f: impl FnOnce() -> Result<(T, StepReport)>,
    ) -> Result<T> {
        let measured = measure_step(name, f)?;
        let (value, report) = measured.value;
        if !report.warnings.is_empty() {
            warn!(
                tool = %self.tool,
                step = %name,
                warning_count = report.warnings.len(),
                "step reported warnings"
            );
        }
        let step_number = u32::try_from(self.steps.len() + 1).unwrap_or(u32::MAX);
        self.steps
            .push(AuditStep::new(step_number, name, report, measured.duration_ms));
        Ok(value)
    }

    pub fn summary_mut(&mut self) -> &mut Summary {
        &mut self.summary
    }

    /// Sets one summary counter.
    pub fn record(&mut self, key: &str, value: impl Into<SummaryValue>) {
        self.summary.insert(key.to_string(), value.into());
    }

    /// Builds the audit document and appends `audit.json` to the artifacts.
    pub fn finish(self, mut artifacts: Vec<Artifact>) -> Result<PipelineOutput> {
        let Self {
            tool,
            steps,
            mut summary,
            started,
        } = self;
        let audit = AuditDocument::build(steps);
        summary.insert(
            "totalDurationMs".to_string(),
            SummaryValue::Count(audit.total_duration_ms()),
        );
        artifacts.push(Artifact::json(AUDIT_ARTIFACT, audit.to_json_bytes()?));

        info!(
            tool = %tool,
            steps = audit.steps().len(),
            artifacts = artifacts.len(),
            warnings = audit.total_warnings(),
            duration_ms = started.elapsed().as_millis(),
            "pipeline run finished"
        );
        Ok(PipelineOutput {
            tool,
            artifacts,
            summary,
            audit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn steps_are_numbered_in_execution_order() {
        let mut run = PipelineRun::new(ToolId::ExcelFixIt);
        let a = run
            .step("first", || Ok((1, StepReport::new("one"))))
            .unwrap();
        let b = run
            .step("second", || Ok((a + 1, StepReport::new("two"))))
            .unwrap();
        assert_eq!(b, 2);
        let numbers: Vec<_> = run.steps().iter().map(AuditStep::step_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn failed_step_is_not_recorded() {
        let mut run = PipelineRun::new(ToolId::LeadScrubber);
        let result: Result<()> = run.step("explode", || {
            Err(PipelineError::ColumnNotFound {
                column: "email".into(),
            })
        });
        assert!(matches!(result, Err(PipelineError::ColumnNotFound { .. })));
        assert!(run.steps().is_empty());
    }

    #[test]
    fn finish_appends_audit_artifact_last() {
        let mut run = PipelineRun::new(ToolId::QrGenerator);
        run.step("only", || Ok(((), StepReport::new("done"))))
            .unwrap();
        run.record("rowsIn", 3usize);
        let output = run
            .finish(vec![Artifact::csv("out.csv", "a\n".to_string())])
            .unwrap();
        let last = output.artifacts.last().unwrap();
        assert_eq!(last.name, AUDIT_ARTIFACT);
        assert_eq!(last.bytes, output.audit.to_json_bytes().unwrap());
        assert_eq!(output.summary.get("rowsIn"), Some(&SummaryValue::Count(3)));
        assert!(output.summary.contains_key("totalDurationMs"));
    }
}
