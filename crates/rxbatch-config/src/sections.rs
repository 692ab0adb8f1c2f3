//! The sections of a `RunConfig` document.
//!
//! Every struct is `#[serde(default)]`, so any key (or whole table) may be
//! left out and the built-in value is used instead.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use rxbatch_contracts::settings::{FormulaColumns, PatientColumns};

/// Where the remote application and the WebDriver server live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSection {
    /// Page that shows the login form.
    pub login_url: String,
    /// Page that shows a fresh prescription form.
    pub form_url: String,
    /// WebDriver endpoint (chromedriver, geckodriver, selenium).
    pub webdriver_url: String,
    /// A post-login location containing this text is treated as the login
    /// page. Empty disables the check.
    pub login_marker: String,
    pub headless: bool,
}

impl Default for RemoteSection {
    fn default() -> Self {
        Self {
            login_url: "https://app.rcta.me/AddPrescription".to_string(),
            form_url: "https://app.rcta.me/AddPrescription".to_string(),
            webdriver_url: "http://localhost:4444".to_string(),
            login_marker: "login".to_string(),
            headless: false,
        }
    }
}

/// CSS selectors of the remote form elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub username: String,
    pub password: String,
    pub login_button: String,
    pub search_open: String,
    pub search_modal: String,
    pub search_input: String,
    pub search_submit: String,
    pub search_results: String,
    pub first_result: String,
    pub patient_loaded: String,
    pub prescription_type: String,
    pub default_coverage: String,
    pub free_text_tab: String,
    pub free_text_field: String,
    pub generate: String,
    pub generated: String,
    pub download: String,
}

impl Default for Selectors {
    fn default() -> Self {
        let s = |css: &str| css.to_string();
        Self {
            username: s("#username"),
            password: s("#password"),
            login_button: s("#login-button"),
            search_open: s("#buscar-paciente-btn"),
            search_modal: s("#modal-buscar-paciente"),
            search_input: s("#input-buscar-paciente"),
            search_submit: s("#btn-buscar"),
            search_results: s("#resultado-busqueda"),
            first_result: s("#tabla-resultados tr:first-child"),
            patient_loaded: s("#datos-paciente-cargados"),
            prescription_type: s("#tipo-receta"),
            default_coverage: s("#cobertura-hominis"),
            free_text_tab: s("#tab-texto-libre"),
            free_text_field: s("#campo-texto-libre"),
            generate: s("#btn-generar-prescripcion"),
            generated: s("#receta-generada"),
            download: s("#btn-descargar-pdf"),
        }
    }
}

/// Downloading of the generated documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSection {
    pub enabled: bool,
    /// Relative paths are resolved against the working directory.
    pub directory: PathBuf,
    /// Pause after clicking download before the file is considered written.
    pub settle_delay_ms: u64,
}

impl Default for DownloadSection {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("./recetas-generadas"),
            settle_delay_ms: 3_000,
        }
    }
}

/// Delays and bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSection {
    pub between_patients_ms: u64,
    pub generation_timeout_ms: u64,
    /// Bound for the login, navigation, search and patient-load waits.
    /// Absent means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_wait_timeout_ms: Option<u64>,
    /// How long to wait for the page to navigate away after submitting the
    /// login form.
    pub post_login_settle_ms: u64,
}

impl Default for TimingSection {
    fn default() -> Self {
        Self {
            between_patients_ms: 1_000,
            generation_timeout_ms: 30_000,
            remote_wait_timeout_ms: None,
            post_login_settle_ms: 10_000,
        }
    }
}

/// Spreadsheet header names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsSection {
    pub patients: PatientColumns,
    pub formulas: FormulaColumns,
}
