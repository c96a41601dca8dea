//! Step-sequenced, audited pipelines for the Flowbench tools.
//!
//! Every tool run is a fixed sequence of named steps. Each executed step is
//! timed and recorded as an [`AuditStep`]; the finished run returns its
//! artifacts, a summary, and the audit trail (also emitted as `audit.json`).
//!
//! - **Step runner**: [`measure_step`] and [`StepReport`]
//! - **Run state**: [`PipelineRun`] numbers steps and finalizes the output
//! - **Audit**: [`AuditDocument`] and its canonical JSON serialization
//! - **Tools**: one module per tool, dispatched by [`run_tool`]
//!
//! # Example
//!
//! ```ignore
//! use flowbench_model::{LeadScrubberOptions, ToolConfig};
//! use flowbench_pipeline::{InputFile, ToolInput, run_tool};
//!
//! let input = ToolInput::Single(InputFile::new("leads.csv", "name,email\nAda,ada@acme.io\n"));
//! let config = ToolConfig::LeadScrubber(LeadScrubberOptions::default());
//! let output = run_tool(&input, &config)?;
//! for step in output.audit.steps() {
//!     println!("{} {}", step.step_number(), step.step_name());
//! }
//! ```

pub mod audit;
pub mod error;
pub mod run;
pub mod step;
pub mod tools;

// === Errors ===
pub use error::{ItemFailure, PipelineError, Result};

// === Steps ===
pub use step::{MAX_STEP_WARNINGS, Measured, StepReport, measure_step};

// === Audit ===
pub use audit::{AuditDocument, AuditStep};

// === Runs ===
pub use run::{AUDIT_ARTIFACT, InputFile, PipelineOutput, PipelineRun, ToolInput};
pub use tools::{run_tool, step_order};
