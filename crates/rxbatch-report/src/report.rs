//! The append-only outcome log for one run.
//!
//! `RunReport` is the reference implementation of `OutcomeSink`. It keeps the
//! outcomes in a `Vec` in the order they were recorded and refuses records
//! that would break that order. Use `summarize()` for the counts and
//! `export_json()` to persist the whole log.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use rxbatch_contracts::{
    error::{RxError, RxResult},
    outcome::{OutcomeRecord, RunId},
};
use rxbatch_core::traits::OutcomeSink;

use crate::summary::RunSummary;

/// A sealed copy of the report, as written by `export_json()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDocument {
    pub summary: RunSummary,
    pub outcomes: Vec<OutcomeRecord>,
}

/// Ordered outcomes of one run.
#[derive(Debug, Clone)]
pub struct RunReport {
    run_id: RunId,
    download_dir: Option<PathBuf>,
    started_at: DateTime<Utc>,
    outcomes: Vec<OutcomeRecord>,
}

impl RunReport {
    /// Start an empty report. `download_dir` is echoed in the summary.
    pub fn new(run_id: RunId, download_dir: Option<PathBuf>) -> Self {
        Self {
            run_id,
            download_dir,
            started_at: Utc::now(),
            outcomes: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    /// All outcomes recorded so far, in input order.
    pub fn outcomes(&self) -> &[OutcomeRecord] {
        &self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Count the recorded outcomes by status.
    pub fn summarize(&self) -> RunSummary {
        RunSummary::from_outcomes(
            self.run_id.clone(),
            &self.outcomes,
            self.download_dir.clone(),
            self.started_at,
        )
    }

    pub fn export(&self) -> ReportDocument {
        ReportDocument {
            summary: self.summarize(),
            outcomes: self.outcomes.clone(),
        }
    }

    /// Write the report as pretty-printed JSON to `path`.
    pub fn export_json(&self, path: &Path) -> RxResult<()> {
        let write_failed = |reason: String| RxError::ReportWrite { reason };

        let json = serde_json::to_string_pretty(&self.export())
            .map_err(|e| write_failed(format!("cannot serialize report: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| write_failed(format!("cannot create '{}': {}", parent.display(), e)))?;
        }
        fs::write(path, json)
            .map_err(|e| write_failed(format!("cannot write '{}': {}", path.display(), e)))?;

        info!(
            run_id = %self.run_id,
            path = %path.display(),
            outcomes = self.outcomes.len(),
            "run report written"
        );
        Ok(())
    }
}

impl OutcomeSink for RunReport {
    /// Append one outcome.
    ///
    /// The outcome's `sequence` must equal the number of outcomes already
    /// recorded; anything else means a patient was skipped or recorded twice.
    fn record(&mut self, outcome: OutcomeRecord) -> RxResult<()> {
        let expected = self.outcomes.len() as u64;
        if outcome.sequence != expected {
            return Err(RxError::ReportWrite {
                reason: format!(
                    "outcome for '{}' has sequence {}, expected {}",
                    outcome.patient, outcome.sequence, expected
                ),
            });
        }

        debug!(
            run_id = %self.run_id,
            sequence = outcome.sequence,
            patient = %outcome.patient,
            "outcome recorded"
        );
        self.outcomes.push(outcome);
        Ok(())
    }
}
