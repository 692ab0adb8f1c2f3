//! Per-patient outcomes and run identity.
//!
//! `OutcomeRecord` is what the orchestrator appends to the outcome sink,
//! exactly once per patient and in input order. Records are never modified
//! after they are appended.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RxError;

/// Unique identifier for one run of the tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub uuid::Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The steps of the per-patient pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStep {
    NavigateToForm,
    LocatePatient,
    ApplyCoverageAndType,
    ResolveFormula,
    ComposeText,
    SubmitText,
    GenerateAndDownload,
    Complete,
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStep::NavigateToForm => "navigate-to-form",
            PipelineStep::LocatePatient => "locate-patient",
            PipelineStep::ApplyCoverageAndType => "apply-coverage-and-type",
            PipelineStep::ResolveFormula => "resolve-formula",
            PipelineStep::ComposeText => "compose-text",
            PipelineStep::SubmitText => "submit-text",
            PipelineStep::GenerateAndDownload => "generate-and-download",
            PipelineStep::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Why a patient ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FailureReason {
    /// The "generated" signal did not arrive within the bound.
    GenerationTimeout { waited_ms: u64 },
    /// Any other error raised while talking to the remote application or
    /// while preparing the patient's data.
    RemoteInteraction { step: PipelineStep, message: String },
}

impl FailureReason {
    /// Classify an error raised during `step`.
    pub fn from_error(step: PipelineStep, error: &RxError) -> Self {
        match error {
            RxError::GenerationTimeout { waited_ms } => FailureReason::GenerationTimeout {
                waited_ms: *waited_ms,
            },
            other => FailureReason::RemoteInteraction {
                step,
                message: other.to_string(),
            },
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::GenerationTimeout { waited_ms } => {
                write!(f, "prescription was not generated within {} ms", waited_ms)
            }
            FailureReason::RemoteInteraction { step, message } => {
                write!(f, "[{}] {}", step, message)
            }
        }
    }
}

/// Terminal classification of one patient's processing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum OutcomeStatus {
    Success,
    /// The patient's formula reference matched no formula. Not an error.
    SkippedNoFormula,
    Failed { reason: FailureReason },
}

impl OutcomeStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Success)
    }
}

/// An immutable record of one patient's outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Zero-based position of the patient in the input sequence.
    pub sequence: u64,
    /// Patient display name at the time of processing.
    pub patient: String,
    /// Spreadsheet row the patient came from.
    pub row: usize,
    pub status: OutcomeStatus,
    /// The text submitted to the remote form, when the pipeline got that far.
    pub composed_text: Option<String>,
    /// Where the downloaded document landed, if downloading was enabled.
    pub artifact_path: Option<PathBuf>,
    pub finished_at: DateTime<Utc>,
}
