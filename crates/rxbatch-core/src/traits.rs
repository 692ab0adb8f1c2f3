//! Trait definitions for the collaborators the orchestrator drives.
//!
//! - `RemoteActor`  : the prescription web application, one page at a time
//! - `LoginDetector`: decides whether a location is still the login surface
//! - `RecordSource` : loads the patients and formulas tables
//! - `Prompter`     : line and secret input from the operator
//! - `OutcomeSink`  : append-only destination for per-patient outcomes
//!
//! The orchestrator and pipeline only ever talk to these traits, so the
//! browser, the spreadsheet reader and the console can be swapped for test
//! doubles.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use rxbatch_contracts::{
    error::RxResult,
    outcome::OutcomeRecord,
    records::{Credentials, LoadedRecords},
};

/// The remote prescription application, driven strictly sequentially.
///
/// Every method suspends until the remote side has finished the action. Waits
/// are unbounded unless the implementation documents otherwise; the pipeline
/// applies its own bounds where it needs one.
#[async_trait]
pub trait RemoteActor: Send {
    /// Navigate to the login surface.
    async fn open_login(&mut self) -> RxResult<()>;

    /// Type the credentials, submit them and wait for the page to settle.
    async fn submit_credentials(&mut self, credentials: &Credentials) -> RxResult<()>;

    /// The current location (URL) of the page.
    async fn current_location(&mut self) -> RxResult<String>;

    /// Load a fresh, empty prescription form.
    async fn open_prescription_form(&mut self) -> RxResult<()>;

    /// Open the patient search and submit `query`.
    async fn search_patient(&mut self, query: &str) -> RxResult<()>;

    /// Wait until the search results are shown.
    async fn wait_for_results(&mut self) -> RxResult<()>;

    /// Pick the first search result and wait for the patient's data to load.
    async fn select_first_result(&mut self) -> RxResult<()>;

    /// Choose the prescription type (A, B, C, ...).
    async fn select_prescription_type(&mut self, kind: &str) -> RxResult<()>;

    /// Choose the fixed default coverage.
    async fn select_default_coverage(&mut self) -> RxResult<()>;

    /// Switch the prescription body to free-text entry.
    async fn switch_to_free_text(&mut self) -> RxResult<()>;

    /// Remove whatever the free-text field currently holds.
    async fn clear_free_text(&mut self) -> RxResult<()>;

    /// Type `text` into the free-text field.
    async fn type_free_text(&mut self, text: &str) -> RxResult<()>;

    /// Ask the remote application to generate the prescription.
    async fn trigger_generation(&mut self) -> RxResult<()>;

    /// Wait for the "generated" signal. May never return.
    async fn wait_for_generated(&mut self) -> RxResult<()>;

    /// Ask the remote application to download the generated document.
    async fn trigger_download(&mut self) -> RxResult<()>;

    /// The file produced by the last download, if the actor can tell.
    async fn last_download(&mut self) -> RxResult<Option<PathBuf>> {
        Ok(None)
    }

    /// Release the underlying session. Called at most once by `SessionDriver`.
    async fn close(&mut self) -> RxResult<()>;
}

/// Decides whether the post-login location means the login was rejected.
///
/// The remote application gives no explicit success flag; implementations
/// infer failure from where the browser ended up.
pub trait LoginDetector: Send + Sync {
    fn is_login_surface(&self, location: &str) -> bool;
}

/// Loads the two input tables.
pub trait RecordSource {
    /// Read patients and formulas, preserving row order.
    ///
    /// Fails with `RxError::SourceUnreadable` when either file cannot be
    /// opened or read as a table.
    fn load(&self, patients: &Path, formulas: &Path) -> RxResult<LoadedRecords>;
}

/// Operator input.
pub trait Prompter {
    /// Print `prompt` and read one line, without the trailing newline.
    fn read_line(&mut self, prompt: &str) -> RxResult<String>;

    /// Print `prompt` and read one line without echoing the typed characters.
    fn read_secret(&mut self, prompt: &str) -> RxResult<String>;
}

/// Append-only destination for outcomes.
///
/// The orchestrator calls `record` exactly once per patient, in input order.
pub trait OutcomeSink {
    fn record(&mut self, outcome: OutcomeRecord) -> RxResult<()>;
}
