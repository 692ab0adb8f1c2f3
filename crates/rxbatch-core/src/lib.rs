//! # rxbatch-core
//!
//! The orchestration sequencer for rxbatch.
//!
//! This crate provides:
//! - The collaborator traits (`RemoteActor`, `LoginDetector`, `RecordSource`,
//!   `Prompter`, `OutcomeSink`)
//! - `FormulaResolver` and prescription text composition
//! - `SessionDriver`, which owns the single remote session of a run
//! - `PrescriptionPipeline`, which drives one patient through the remote form
//! - `Orchestrator`, which ties them together for a whole batch
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rxbatch_core::{Orchestrator, PrescriptionPipeline, RunInputs};
//!
//! let orchestrator = Orchestrator::new(store, PrescriptionPipeline::new(settings));
//! orchestrator.run(RunInputs::default(), &mut console, connect, detector, &mut report).await?;
//! ```

pub mod orchestrator;
pub mod pipeline;
pub mod resolver;
pub mod session;
pub mod traits;

#[cfg(test)]
mod mock;

pub use orchestrator::{Orchestrator, RunInputs, RunTotals};
pub use pipeline::PrescriptionPipeline;
pub use resolver::{compose_text, FormulaResolver};
pub use session::{LocationHeuristic, Session, SessionDriver, SessionState};
