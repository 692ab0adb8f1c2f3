//! The per-patient prescription pipeline.
//!
//! One call to `process()` drives one patient through the remote form:
//!
//!   NavigateToForm → LocatePatient → ApplyCoverageAndType → ResolveFormula
//!     → ComposeText → SubmitText → GenerateAndDownload → Complete
//!
//! `process()` never fails. A missing formula ends the patient as
//! `SkippedNoFormula` before anything is typed into the form; every error
//! raised by any other step is caught here and becomes `Failed`, tagged with
//! the step that raised it. The caller always moves on to the next patient.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use rxbatch_contracts::{
    error::{RxError, RxResult},
    outcome::{FailureReason, OutcomeRecord, OutcomeStatus, PipelineStep},
    records::PatientRecord,
    settings::PipelineSettings,
};

use crate::resolver::{compose_prescription, FormulaResolver};
use crate::session::Session;
use crate::traits::RemoteActor;

/// How far a patient got before `drive()` returned.
#[derive(Debug, Default)]
struct Progress {
    step: Option<PipelineStep>,
    composed_text: Option<String>,
}

impl Progress {
    fn enter(&mut self, step: PipelineStep, patient: &str) {
        debug!(patient = %patient, step = %step, "pipeline step");
        self.step = Some(step);
    }

    fn current(&self) -> PipelineStep {
        self.step.unwrap_or(PipelineStep::NavigateToForm)
    }
}

/// Terminal results that are not failures.
#[derive(Debug)]
enum Completion {
    Submitted { artifact: Option<PathBuf> },
    NoFormula,
}

/// Drives single patients through the remote prescription form.
#[derive(Debug, Clone)]
pub struct PrescriptionPipeline {
    settings: PipelineSettings,
}

impl PrescriptionPipeline {
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process one patient and classify the result.
    ///
    /// `sequence` is the patient's zero-based position in the input.
    pub async fn process<A: RemoteActor>(
        &self,
        session: &mut Session<'_, A>,
        sequence: u64,
        patient: &PatientRecord,
        resolver: &FormulaResolver<'_>,
    ) -> OutcomeRecord {
        let name = patient.display_name();
        info!(patient = %name, row = patient.row, sequence, "processing patient");

        let mut progress = Progress::default();
        let result = self
            .drive(session.actor(), patient, resolver, &mut progress)
            .await;

        let (status, artifact_path) = match result {
            Ok(Completion::Submitted { artifact }) => {
                info!(
                    patient = %name,
                    kind = patient.prescription_type.as_deref().unwrap_or("Principal"),
                    "prescription generated"
                );
                (OutcomeStatus::Success, artifact)
            }
            Ok(Completion::NoFormula) => {
                warn!(
                    patient = %name,
                    formula = %patient
                        .formula_ref
                        .as_ref()
                        .map(|r| r.to_string())
                        .unwrap_or_default(),
                    "no formula matches reference, skipping"
                );
                (OutcomeStatus::SkippedNoFormula, None)
            }
            Err(e) => {
                let reason = FailureReason::from_error(progress.current(), &e);
                warn!(patient = %name, reason = %reason, "prescription failed");
                (OutcomeStatus::Failed { reason }, None)
            }
        };

        OutcomeRecord {
            sequence,
            patient: name,
            row: patient.row,
            status,
            composed_text: progress.composed_text,
            artifact_path,
            finished_at: Utc::now(),
        }
    }

    /// Sleep for the configured pause between two patients.
    pub async fn pace(&self) {
        if !self.settings.pacing_delay.is_zero() {
            tokio::time::sleep(self.settings.pacing_delay).await;
        }
    }

    async fn drive<A: RemoteActor>(
        &self,
        actor: &mut A,
        patient: &PatientRecord,
        resolver: &FormulaResolver<'_>,
        progress: &mut Progress,
    ) -> RxResult<Completion> {
        let name = patient.display_name();

        // ── 1. NavigateToForm ────────────────────────────────────────────────
        progress.enter(PipelineStep::NavigateToForm, &name);
        self.bounded(actor.open_prescription_form()).await?;

        // ── 2. LocatePatient ─────────────────────────────────────────────────
        progress.enter(PipelineStep::LocatePatient, &name);
        let identity = patient
            .identity
            .as_deref()
            .ok_or_else(|| RxError::MissingField {
                row: patient.row,
                field: "identity".to_string(),
            })?;
        self.bounded(actor.search_patient(identity)).await?;
        self.bounded(actor.wait_for_results()).await?;
        self.bounded(actor.select_first_result()).await?;

        // ── 3. ApplyCoverageAndType ──────────────────────────────────────────
        progress.enter(PipelineStep::ApplyCoverageAndType, &name);
        if let Some(kind) = patient.prescription_type.as_deref() {
            actor.select_prescription_type(kind).await?;
        }
        actor.select_default_coverage().await?;

        // ── 4. ResolveFormula ────────────────────────────────────────────────
        progress.enter(PipelineStep::ResolveFormula, &name);
        let Some(formula) = resolver.resolve(patient.formula_ref.as_ref()) else {
            return Ok(Completion::NoFormula);
        };

        // ── 5. ComposeText ───────────────────────────────────────────────────
        progress.enter(PipelineStep::ComposeText, &name);
        let prescription = compose_prescription(patient, formula)?;
        progress.composed_text = Some(prescription.composed_text.clone());

        // ── 6. SubmitText ────────────────────────────────────────────────────
        progress.enter(PipelineStep::SubmitText, &name);
        actor.switch_to_free_text().await?;
        actor.clear_free_text().await?;
        actor.type_free_text(&prescription.composed_text).await?;

        // ── 7. GenerateAndDownload ───────────────────────────────────────────
        progress.enter(PipelineStep::GenerateAndDownload, &name);
        actor.trigger_generation().await?;
        let limit = self.settings.generation_timeout;
        match tokio::time::timeout(limit, actor.wait_for_generated()).await {
            Ok(signal) => signal?,
            Err(_elapsed) => {
                return Err(RxError::GenerationTimeout {
                    waited_ms: millis(limit),
                })
            }
        }

        let artifact = match &self.settings.download_dir {
            Some(dir) => {
                actor.trigger_download().await?;
                if !self.settings.download_settle_delay.is_zero() {
                    tokio::time::sleep(self.settings.download_settle_delay).await;
                }
                let file = actor.last_download().await?;
                Some(file.unwrap_or_else(|| dir.clone()))
            }
            None => None,
        };

        // ── 8. Complete ──────────────────────────────────────────────────────
        progress.enter(PipelineStep::Complete, &name);
        Ok(Completion::Submitted { artifact })
    }

    /// Apply the optional remote wait bound to `wait`.
    async fn bounded<F>(&self, wait: F) -> RxResult<()>
    where
        F: Future<Output = RxResult<()>>,
    {
        match self.settings.remote_wait_timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                RxError::remote(format!("remote did not respond within {} ms", millis(limit)))
            })?,
            None => wait.await,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ── Tests ────────────────────────────────────────────────────────────────────
