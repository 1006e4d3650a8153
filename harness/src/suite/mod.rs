//! Test suite orchestration.
//!
//! [`Case`] lists every case with its category. [`Runner`] executes a
//! [`Selection`] of them in order, each with a generator seeded from the run
//! seed and the case's position, and collects a [`RunReport`].

mod case;
mod cases;
mod error;
mod report;
mod runner;

pub use case::{Case, Category, Selection, UnknownCase};
pub use error::{check, ensure, CaseError};
pub use report::{CaseOutcome, CaseStatus, RunReport, Totals};
pub use runner::Runner;
