//! Run summary derived from the outcome log.
//!
//! A `RunSummary` is always recomputed from the full, ordered list of
//! outcomes. Nothing keeps running counters, so the counts cannot drift from
//! the log they describe.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rxbatch_contracts::outcome::{OutcomeRecord, OutcomeStatus, RunId};

/// Aggregate counts for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub total: usize,
    pub succeeded: usize,
    pub skipped_no_formula: usize,
    pub failed: usize,
    /// Where documents were downloaded; `None` when downloading was disabled.
    pub download_dir: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub summarized_at: DateTime<Utc>,
}

impl RunSummary {
    /// Count `outcomes` by status.
    pub fn from_outcomes(
        run_id: RunId,
        outcomes: &[OutcomeRecord],
        download_dir: Option<PathBuf>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let count = |wanted: fn(&OutcomeStatus) -> bool| {
            outcomes.iter().filter(|o| wanted(&o.status)).count()
        };

        Self {
            run_id,
            total: outcomes.len(),
            succeeded: count(|s| matches!(s, OutcomeStatus::Success)),
            skipped_no_formula: count(|s| matches!(s, OutcomeStatus::SkippedNoFormula)),
            failed: count(|s| matches!(s, OutcomeStatus::Failed { .. })),
            download_dir,
            started_at,
            summarized_at: Utc::now(),
        }
    }

    /// True when no patient failed.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary")?;
        writeln!(f, "  Patients processed:      {}", self.total)?;
        writeln!(f, "  Prescriptions generated: {}", self.succeeded)?;
        writeln!(f, "  Skipped (no formula):    {}", self.skipped_no_formula)?;
        write!(f, "  Failed:                  {}", self.failed)?;
        if let Some(dir) = &self.download_dir {
            write!(f, "\n  Documents saved to:      {}", dir.display())?;
        }
        Ok(())
    }
}
