//! Runtime knobs for the pipeline and the spreadsheet reader.
//!
//! Built from the TOML configuration by `rxbatch-config`; kept here so the
//! core and records crates do not depend on the configuration format.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Delays, bounds and download behaviour for the prescription pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Pause between two consecutive patients.
    pub pacing_delay: Duration,
    /// Upper bound for the "generated" signal after triggering generation.
    pub generation_timeout: Duration,
    /// Pause after triggering a download before the file is considered written.
    pub download_settle_delay: Duration,
    /// Optional bound for the login, navigation, search and patient-load
    /// waits. `None` waits indefinitely.
    pub remote_wait_timeout: Option<Duration>,
    /// Download destination. `None` disables downloading.
    pub download_dir: Option<PathBuf>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            pacing_delay: Duration::from_millis(1_000),
            generation_timeout: Duration::from_millis(30_000),
            download_settle_delay: Duration::from_millis(3_000),
            remote_wait_timeout: None,
            download_dir: Some(PathBuf::from("./recetas-generadas")),
        }
    }
}

impl PipelineSettings {
    /// Settings with every delay set to zero, for tests and dry runs.
    pub fn immediate() -> Self {
        Self {
            pacing_delay: Duration::ZERO,
            generation_timeout: Duration::from_millis(30_000),
            download_settle_delay: Duration::ZERO,
            remote_wait_timeout: None,
            download_dir: None,
        }
    }

    pub fn downloads_enabled(&self) -> bool {
        self.download_dir.is_some()
    }
}

/// Header names of the patients sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientColumns {
    pub identity: String,
    pub formula_ref: String,
    pub quantity: String,
    pub vial_count: String,
    pub prescription_type: String,
}

impl Default for PatientColumns {
    fn default() -> Self {
        Self {
            identity: "Paciente".to_string(),
            formula_ref: "Formula".to_string(),
            quantity: "Cantidad_comp".to_string(),
            vial_count: "Nr_de_Frasco".to_string(),
            prescription_type: "Receta".to_string(),
        }
    }
}

/// Header names of the formulas sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulaColumns {
    pub id: String,
    pub detail: String,
}

impl Default for FormulaColumns {
    fn default() -> Self {
        Self {
            id: "Nº".to_string(),
            detail: "Detalle".to_string(),
        }
    }
}
