use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::case::{Case, Category};
use super::error::CaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of one case, as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseOutcome {
    pub name: Case,
    pub category: Category,
    pub status: CaseStatus,
    pub duration_ms: u64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl CaseOutcome {
    #[must_use]
    pub fn from_result(case: Case, elapsed: Duration, result: Result<String, CaseError>) -> Self {
        let (status, message, errors) = match result {
            Ok(message) => (CaseStatus::Passed, message, Vec::new()),
            Err(CaseError::Skipped(reason)) => (CaseStatus::Skipped, reason, Vec::new()),
            Err(e) => (CaseStatus::Failed, e.to_string(), e.details()),
        };
        Self {
            name: case,
            category: case.category(),
            status,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            message,
            errors,
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == CaseStatus::Passed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Everything a run produced. Written as JSON for CI tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub seed: u64,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub totals: Totals,
    pub outcomes: Vec<CaseOutcome>,
}

impl RunReport {
    #[must_use]
    pub fn new(seed: u64, base_url: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            seed,
            base_url: base_url.into(),
            started_at: Utc::now(),
            duration_ms: 0,
            totals: Totals::default(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: CaseOutcome) {
        self.totals.total += 1;
        match outcome.status {
            CaseStatus::Passed => self.totals.passed += 1,
            CaseStatus::Failed => self.totals.failed += 1,
            CaseStatus::Skipped => self.totals.skipped += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn finish(&mut self) {
        let elapsed = Utc::now() - self.started_at;
        self.duration_ms = u64::try_from(elapsed.num_milliseconds()).unwrap_or_default();
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == CaseStatus::Failed)
    }

    /// 0 when no case failed, 1 otherwise. Skipped cases do not fail a run.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.totals.failed == 0 {
            0
        } else {
            1
        }
    }

    /// Default report location: `<dir>/report-<run_id>.json`.
    #[must_use]
    pub fn default_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("report-{}.json", self.run_id))
    }

    /// # Errors
    /// Returns an I/O error if the directory or file cannot be written.
    pub fn write_json(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), "report written");
        Ok(())
    }

    /// Human-readable summary: totals, then one line per failed case.
    #[must_use]
    pub fn summary(&self) -> String {
        let Totals {
            total,
            passed,
            failed,
            skipped,
        } = self.totals;
        let mut out = format!(
            "{total} cases: {passed} passed, {failed} failed, {skipped} skipped (seed {}, {} ms)\n",
            self.seed, self.duration_ms
        );
        for outcome in self.failures() {
            out.push_str(&format!("FAILED {} [{}]\n", outcome.name, outcome.category));
            for error in &outcome.errors {
                out.push_str(&format!("    {error}\n"));
            }
        }
        out
    }
}
