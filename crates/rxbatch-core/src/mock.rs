//! Test doubles shared by the session, pipeline and orchestrator tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use rxbatch_contracts::{
    error::{RxError, RxResult},
    outcome::OutcomeRecord,
    records::{CellValue, Credentials, FormulaRecord, LoadedRecords, PatientRecord},
};

use crate::traits::{OutcomeSink, Prompter, RecordSource, RemoteActor};

pub const LOGIN_URL: &str = "https://rx.example/AddPrescription";
pub const HOME_URL: &str = "https://rx.example/Home";

/// A remote actor that records every call and can be told to misbehave for
/// specific patients.
pub struct MockActor {
    pub calls: Arc<Mutex<Vec<String>>>,
    /// Location reported after credentials are submitted.
    pub location_after_login: String,
    /// Patients whose search never produces results.
    pub no_results: HashSet<String>,
    /// Patients whose generation signal never arrives.
    pub never_generates: HashSet<String>,
    /// Patients whose free-text field cannot be typed into.
    pub typing_fails: HashSet<String>,
    /// Patients whose search form never opens.
    pub search_hangs: HashSet<String>,
    /// The login page never finishes loading.
    pub login_hangs: bool,
    pub download_file: Option<PathBuf>,
    current_query: String,
}

impl MockActor {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(vec![])),
            location_after_login: HOME_URL.to_string(),
            no_results: HashSet::new(),
            never_generates: HashSet::new(),
            typing_fails: HashSet::new(),
            search_hangs: HashSet::new(),
            login_hangs: false,
            download_file: None,
            current_query: String::new(),
        }
    }

    pub fn rejecting_login() -> Self {
        Self {
            location_after_login: format!("{}?login=failed", LOGIN_URL),
            ..Self::new()
        }
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait]
impl RemoteActor for MockActor {
    async fn open_login(&mut self) -> RxResult<()> {
        self.log("open_login");
        if self.login_hangs {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn submit_credentials(&mut self, credentials: &Credentials) -> RxResult<()> {
        self.log(format!("submit_credentials:{}", credentials.username));
        Ok(())
    }

    async fn current_location(&mut self) -> RxResult<String> {
        self.log("current_location");
        Ok(self.location_after_login.clone())
    }

    async fn open_prescription_form(&mut self) -> RxResult<()> {
        self.log("open_prescription_form");
        Ok(())
    }

    async fn search_patient(&mut self, query: &str) -> RxResult<()> {
        self.current_query = query.to_string();
        self.log(format!("search_patient:{}", query));
        if self.search_hangs.contains(query) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn wait_for_results(&mut self) -> RxResult<()> {
        self.log("wait_for_results");
        if self.no_results.contains(&self.current_query) {
            return Err(RxError::remote("search returned no results"));
        }
        Ok(())
    }

    async fn select_first_result(&mut self) -> RxResult<()> {
        self.log("select_first_result");
        Ok(())
    }

    async fn select_prescription_type(&mut self, kind: &str) -> RxResult<()> {
        self.log(format!("select_prescription_type:{}", kind));
        Ok(())
    }

    async fn select_default_coverage(&mut self) -> RxResult<()> {
        self.log("select_default_coverage");
        Ok(())
    }

    async fn switch_to_free_text(&mut self) -> RxResult<()> {
        self.log("switch_to_free_text");
        Ok(())
    }

    async fn clear_free_text(&mut self) -> RxResult<()> {
        self.log("clear_free_text");
        Ok(())
    }

    async fn type_free_text(&mut self, text: &str) -> RxResult<()> {
        self.log(format!("type_free_text:{}", text));
        if self.typing_fails.contains(&self.current_query) {
            return Err(RxError::remote("free-text field is read-only"));
        }
        Ok(())
    }

    async fn trigger_generation(&mut self) -> RxResult<()> {
        self.log("trigger_generation");
        Ok(())
    }

    async fn wait_for_generated(&mut self) -> RxResult<()> {
        self.log("wait_for_generated");
        if self.never_generates.contains(&self.current_query) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn trigger_download(&mut self) -> RxResult<()> {
        self.log("trigger_download");
        Ok(())
    }

    async fn last_download(&mut self) -> RxResult<Option<PathBuf>> {
        Ok(self.download_file.clone())
    }

    async fn close(&mut self) -> RxResult<()> {
        self.log("close");
        Ok(())
    }
}

/// A record source serving fixed records, or failing like an unreadable file.
pub struct MockSource {
    pub records: Option<LoadedRecords>,
}

impl RecordSource for MockSource {
    fn load(&self, patients: &Path, _formulas: &Path) -> RxResult<LoadedRecords> {
        self.records.clone().ok_or_else(|| RxError::SourceUnreadable {
            path: patients.to_path_buf(),
            reason: "not a spreadsheet".to_string(),
        })
    }
}

/// A prompter answering from a script.
pub struct ScriptedPrompter {
    pub lines: Vec<String>,
    pub secret: String,
    pub prompts: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(lines: &[&str], secret: &str) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            secret: secret.to_string(),
            prompts: vec![],
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> RxResult<String> {
        self.prompts.push(prompt.to_string());
        if self.lines.is_empty() {
            return Err(RxError::InputError {
                reason: "script exhausted".to_string(),
            });
        }
        Ok(self.lines.remove(0))
    }

    fn read_secret(&mut self, prompt: &str) -> RxResult<String> {
        self.prompts.push(prompt.to_string());
        Ok(self.secret.clone())
    }
}

/// Collects outcomes in memory.
#[derive(Default)]
pub struct VecSink {
    pub outcomes: Vec<OutcomeRecord>,
}

impl OutcomeSink for VecSink {
    fn record(&mut self, outcome: OutcomeRecord) -> RxResult<()> {
        self.outcomes.push(outcome);
        Ok(())
    }
}

pub fn patient(row: usize, name: &str, formula: i64, quantity: u32, vials: u32) -> PatientRecord {
    PatientRecord {
        row,
        identity: Some(name.to_string()),
        formula_ref: Some(CellValue::from(formula)),
        quantity: Some(quantity),
        vial_count: Some(vials),
        prescription_type: None,
    }
}

pub fn formula(row: usize, id: i64, detail: &str) -> FormulaRecord {
    FormulaRecord {
        row,
        id: Some(CellValue::from(id)),
        detail: Some(detail.to_string()),
    }
}

/// Calls recorded after `search_patient:<name>` and before the next search.
pub fn calls_for(calls: &[String], name: &str) -> Vec<String> {
    let marker = format!("search_patient:{}", name);
    calls
        .iter()
        .skip_while(|c| **c != marker)
        .skip(1)
        .take_while(|c| !c.starts_with("search_patient:") && *c != "open_prescription_form")
        .cloned()
        .collect()
}
