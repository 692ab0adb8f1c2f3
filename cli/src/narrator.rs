//! Prints each outcome as it is recorded and forwards it to the run report.

use rxbatch_contracts::{
    error::RxResult,
    outcome::{OutcomeRecord, OutcomeStatus},
};
use rxbatch_core::traits::OutcomeSink;
use rxbatch_report::RunReport;

pub struct Narrator {
    report: RunReport,
}

impl Narrator {
    pub fn new(report: RunReport) -> Self {
        Self { report }
    }

    pub fn into_report(self) -> RunReport {
        self.report
    }
}

impl OutcomeSink for Narrator {
    fn record(&mut self, outcome: OutcomeRecord) -> RxResult<()> {
        println!("{}", describe(&outcome));
        self.report.record(outcome)
    }
}

fn describe(outcome: &OutcomeRecord) -> String {
    let head = format!("  [{}] {}", outcome.sequence + 1, outcome.patient);
    match &outcome.status {
        OutcomeStatus::Success => match &outcome.artifact_path {
            Some(path) => format!("{head}: generated ({})", path.display()),
            None => format!("{head}: generated"),
        },
        OutcomeStatus::SkippedNoFormula => format!("{head}: skipped, formula not found"),
        OutcomeStatus::Failed { reason } => format!("{head}: FAILED, {reason}"),
    }
}
