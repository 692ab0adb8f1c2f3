//! # rxbatch-report
//!
//! Append-only outcome log and run summary for rxbatch.
//!
//! ## Overview
//!
//! The orchestrator records one `OutcomeRecord` per patient into a
//! [`RunReport`]. The [`RunSummary`] is derived from the full log whenever it
//! is requested, and the whole report can be exported as JSON.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rxbatch_report::RunReport;
//! use rxbatch_core::traits::OutcomeSink;
//!
//! let mut report = RunReport::new(run_id, Some(download_dir));
//! report.record(outcome)?;
//!
//! println!("{}", report.summarize());
//! report.export_json(Path::new("run.json"))?;
//! ```

pub mod report;
pub mod summary;

pub use report::{ReportDocument, RunReport};
pub use summary::RunSummary;

// ── Tests ─────────────────────────────────────────────────────────────────────
