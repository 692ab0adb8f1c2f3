//! The run orchestrator.
//!
//! Order of a run:
//!
//!   prompt paths → load records → prompt credentials → connect
//!     → authenticate → pipeline per patient → close session
//!
//! Loading happens before the credentials are asked for so an unreadable
//! spreadsheet aborts the run before anything touches the remote side. Once
//! the actor is connected, `close()` runs on every exit path that returns.

use std::future::Future;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use rxbatch_contracts::{
    error::{RxError, RxResult},
    records::{Credentials, LoadedRecords},
};

use crate::pipeline::PrescriptionPipeline;
use crate::resolver::FormulaResolver;
use crate::session::SessionDriver;
use crate::traits::{LoginDetector, OutcomeSink, Prompter, RecordSource, RemoteActor};

pub const PATIENTS_PROMPT: &str = "Patients spreadsheet path: ";
pub const FORMULAS_PROMPT: &str = "Formulas spreadsheet path: ";
pub const USERNAME_PROMPT: &str = "Username: ";
pub const PASSWORD_PROMPT: &str = "Password: ";

/// Values already known before prompting. `None` means "ask".
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    pub patients_path: Option<PathBuf>,
    pub formulas_path: Option<PathBuf>,
    pub username: Option<String>,
}

/// What a finished run processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTotals {
    pub patients: usize,
    pub formulas: usize,
}

/// Wires the record source, session and pipeline together for one run.
pub struct Orchestrator<S: RecordSource> {
    source: S,
    pipeline: PrescriptionPipeline,
}

impl<S: RecordSource> Orchestrator<S> {
    pub fn new(source: S, pipeline: PrescriptionPipeline) -> Self {
        Self { source, pipeline }
    }

    /// Run the whole batch.
    ///
    /// `connect` creates the remote actor; it is only called once the records
    /// are loaded and the credentials known. Outcomes go to `sink`, one per
    /// patient, in input order.
    ///
    /// # Errors
    ///
    /// Returns the fatal kinds only: `SourceUnreadable`, `InputError`,
    /// `DriverUnavailable` (from `connect`), `AuthenticationFailed`, and
    /// login interaction errors. Per-patient failures never surface here.
    pub async fn run<A, F, Fut>(
        &self,
        inputs: RunInputs,
        prompter: &mut dyn Prompter,
        connect: F,
        detector: Box<dyn LoginDetector>,
        sink: &mut dyn OutcomeSink,
    ) -> RxResult<RunTotals>
    where
        A: RemoteActor,
        F: FnOnce() -> Fut,
        Fut: Future<Output = RxResult<A>>,
    {
        let records = self.load(&inputs, prompter)?;
        let credentials = ask_credentials(&inputs, prompter)?;

        let actor = connect().await?;
        let settings = self.pipeline.settings();
        info!(
            downloads = settings.downloads_enabled(),
            "remote session connected"
        );
        let mut driver =
            SessionDriver::new(actor, detector).with_wait_timeout(settings.remote_wait_timeout);

        let result = self
            .process_all(&mut driver, &credentials, &records, sink)
            .await;

        if let Err(e) = driver.close().await {
            warn!(error = %e, "failed to close remote session");
        }

        match &result {
            Err(e) if e.is_fatal() => error!(error = %e, "run aborted"),
            Err(e) => error!(error = %e, "run stopped before all outcomes were recorded"),
            Ok(()) => {}
        }
        result.map(|()| RunTotals {
            patients: records.patients.len(),
            formulas: records.formulas.len(),
        })
    }

    fn load(&self, inputs: &RunInputs, prompter: &mut dyn Prompter) -> RxResult<LoadedRecords> {
        let patients = match &inputs.patients_path {
            Some(path) => path.clone(),
            None => PathBuf::from(prompter.read_line(PATIENTS_PROMPT)?.trim()),
        };
        let formulas = match &inputs.formulas_path {
            Some(path) => path.clone(),
            None => PathBuf::from(prompter.read_line(FORMULAS_PROMPT)?.trim()),
        };

        info!(
            patients = %patients.display(),
            formulas = %formulas.display(),
            "loading spreadsheets"
        );
        let records = self.source.load(&patients, &formulas)?;
        info!(
            patients = records.patients.len(),
            formulas = records.formulas.len(),
            "spreadsheets loaded"
        );
        Ok(records)
    }

    async fn process_all<A: RemoteActor>(
        &self,
        driver: &mut SessionDriver<A>,
        credentials: &Credentials,
        records: &LoadedRecords,
        sink: &mut dyn OutcomeSink,
    ) -> RxResult<()> {
        let mut session = driver.authenticate(credentials).await?;
        let resolver = FormulaResolver::new(&records.formulas);
        if resolver.is_empty() {
            warn!("no formulas loaded; every patient will be skipped");
        } else {
            debug!(formulas = resolver.len(), "formula table ready");
        }
        let total = records.patients.len();

        for (index, patient) in records.patients.iter().enumerate() {
            info!(
                "patient {}/{}: {}",
                index + 1,
                total,
                patient.display_name()
            );
            let outcome = self
                .pipeline
                .process(&mut session, index as u64, patient, &resolver)
                .await;
            sink.record(outcome)?;

            if index + 1 < total {
                self.pipeline.pace().await;
            }
        }

        info!(patients = total, "all patients processed");
        Ok(())
    }
}

fn ask_credentials(inputs: &RunInputs, prompter: &mut dyn Prompter) -> RxResult<Credentials> {
    let username = match &inputs.username {
        Some(name) => name.clone(),
        None => prompter.read_line(USERNAME_PROMPT)?.trim().to_string(),
    };
    if username.is_empty() {
        return Err(RxError::InputError {
            reason: "username must not be empty".to_string(),
        });
    }
    let password = prompter.read_secret(PASSWORD_PROMPT)?;
    Ok(Credentials::new(username, password))
}

// ── Tests ────────────────────────────────────────────────────────────────────
