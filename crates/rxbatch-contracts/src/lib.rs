//! # rxbatch-contracts
//!
//! Shared types, settings and errors for rxbatch.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod outcome;
pub mod records;
pub mod settings;

#[cfg(test)]
mod tests {
    use super::*;
    use error::RxError;
    use outcome::{FailureReason, OutcomeStatus, PipelineStep, RunId};
    use records::{CellValue, Credentials, PatientRecord};

    // ── CellValue loose equality ─────────────────────────────────────────────

    #[test]
    fn cell_value_text_matches_number() {
        assert!(CellValue::from("1").loosely_equals(&CellValue::from(1_i64)));
        assert!(CellValue::from(1_i64).loosely_equals(&CellValue::from("1")));
        assert!(CellValue::from(" 2 ").loosely_equals(&CellValue::from(2.0)));
        assert!(CellValue::from("1.0").loosely_equals(&CellValue::from(1_i64)));
    }

    #[test]
    fn cell_value_text_vs_text_is_exact() {
        assert!(CellValue::from("F-1").loosely_equals(&CellValue::from("F-1")));
        // Two texts are never compared numerically.
        assert!(!CellValue::from("1").loosely_equals(&CellValue::from("1.0")));
    }

    #[test]
    fn cell_value_non_numeric_text_never_equals_number() {
        assert!(!CellValue::from("abc").loosely_equals(&CellValue::from(0_i64)));
        assert!(!CellValue::from("").loosely_equals(&CellValue::from(0_i64)));
    }

    #[test]
    fn cell_value_display_drops_integral_decimal() {
        assert_eq!(CellValue::from(12.0).to_string(), "12");
        assert_eq!(CellValue::from(2.5).to_string(), "2.5");
        assert_eq!(CellValue::from("Ana").to_string(), "Ana");
    }

    // ── Records ──────────────────────────────────────────────────────────────

    #[test]
    fn patient_display_name_falls_back_to_row() {
        let mut patient = PatientRecord {
            row: 7,
            identity: None,
            formula_ref: None,
            quantity: None,
            vial_count: None,
            prescription_type: None,
        };
        assert_eq!(patient.display_name(), "<row 7>");

        patient.identity = Some("Ana Perez".to_string());
        assert_eq!(patient.display_name(), "Ana Perez");
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("dr.house", "hunter2");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("dr.house"));
        assert!(!rendered.contains("hunter2"));
    }

    // ── Outcomes ─────────────────────────────────────────────────────────────

    #[test]
    fn failure_reason_classifies_generation_timeout() {
        let reason = FailureReason::from_error(
            PipelineStep::GenerateAndDownload,
            &RxError::GenerationTimeout { waited_ms: 30_000 },
        );
        assert_eq!(reason, FailureReason::GenerationTimeout { waited_ms: 30_000 });
    }

    #[test]
    fn failure_reason_keeps_step_and_message() {
        let reason = FailureReason::from_error(
            PipelineStep::LocatePatient,
            &RxError::remote("element #resultado-busqueda not found"),
        );
        match reason {
            FailureReason::RemoteInteraction { step, message } => {
                assert_eq!(step, PipelineStep::LocatePatient);
                assert!(message.contains("#resultado-busqueda"));
            }
            other => panic!("expected RemoteInteraction, got {:?}", other),
        }
    }

    #[test]
    fn outcome_status_serializes_with_tag() {
        let status = OutcomeStatus::Failed {
            reason: FailureReason::GenerationTimeout { waited_ms: 5 },
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"]["kind"], "generation-timeout");

        let skipped = serde_json::to_value(OutcomeStatus::SkippedNoFormula).unwrap();
        assert_eq!(skipped["status"], "skipped-no-formula");
    }

    #[test]
    fn run_id_new_produces_unique_values() {
        let unique: std::collections::HashSet<String> =
            (0..50).map(|_| RunId::new().to_string()).collect();
        assert_eq!(unique.len(), 50);
    }

    // ── RxError ──────────────────────────────────────────────────────────────

    #[test]
    fn error_source_unreadable_display() {
        let err = RxError::SourceUnreadable {
            path: "pacientes.xlsx".into(),
            reason: "no such file".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("pacientes.xlsx"));
        assert!(msg.contains("no such file"));
        assert!(err.is_fatal());
    }

    #[test]
    fn error_authentication_failed_is_fatal() {
        let err = RxError::AuthenticationFailed {
            location: "https://app.example/login".to_string(),
        };
        assert!(err.to_string().contains("authentication failed"));
        assert!(err.is_fatal());
    }

    #[test]
    fn error_per_patient_kinds_are_not_fatal() {
        assert!(!RxError::GenerationTimeout { waited_ms: 1 }.is_fatal());
        assert!(!RxError::remote("boom").is_fatal());
        assert!(!RxError::MissingField { row: 2, field: "quantity".to_string() }.is_fatal());
    }

    #[test]
    fn error_missing_field_display() {
        let err = RxError::MissingField { row: 4, field: "quantity".to_string() };
        assert_eq!(err.to_string(), "row 4: missing field 'quantity'");
    }
}
