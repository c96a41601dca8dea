//! Audit trail records and their canonical serialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

use crate::step::StepReport;

/// Immutable record of one executed step.
///
/// Field names are a compatibility surface for audit viewers:
/// `stepNumber, stepName, description, counts?, warnings?, durationMs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStep {
    step_number: u32,
    step_name: String,
    description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    counts: BTreeMap<String, u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    duration_ms: u64,
}

impl AuditStep {
    pub(crate) fn new(
        step_number: u32,
        step_name: &str,
        report: StepReport,
        duration_ms: u64,
    ) -> Self {
        Self {
            step_number,
            step_name: step_name.to_string(),
            description: report.description,
            counts: report.counts,
            warnings: report.warnings,
            duration_ms,
        }
    }

    pub fn step_number(&self) -> u32 {
        self.step_number
    }

    pub fn step_name(&self) -> &str {
        &self.step_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Counter value, if the step recorded it.
    pub fn count(&self, name: &str) -> Option<u64> {
        self.counts.get(name).copied()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// The ordered audit trail of one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuditDocument {
    steps: Vec<AuditStep>,
    total_duration_ms: u64,
}

impl AuditDocument {
    /// Keeps the steps in the given order and totals their durations.
    pub fn build(steps: Vec<AuditStep>) -> Self {
        let total_duration_ms = steps.iter().map(AuditStep::duration_ms).sum();
        Self {
            steps,
            total_duration_ms,
        }
    }

    pub fn steps(&self) -> &[AuditStep] {
        &self.steps
    }

    /// Looks up a step by name.
    pub fn step(&self, name: &str) -> Option<&AuditStep> {
        self.steps.iter().find(|step| step.step_name == name)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.total_duration_ms
    }

    pub fn total_warnings(&self) -> usize {
        self.steps.iter().map(|step| step.warnings.len()).sum()
    }

    /// The canonical serialization: a pretty-printed JSON array of steps.
    ///
    /// The `audit.json` artifact holds exactly these bytes.
    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

impl Serialize for AuditDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.steps.serialize(serializer)
    }
}
