use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{GeneratedPayload, InvalidKind, TestDataGenerator};

#[derive(Debug, thiserror::Error)]
pub enum DataSetError {
    #[error("failed to {action} test data at {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("test data at {} is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A reusable bundle of generated payloads, persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDataSet {
    pub seed: u64,
    pub valid_books: Vec<GeneratedPayload>,
    pub invalid_books: Vec<GeneratedPayload>,
    pub edge_cases: Vec<GeneratedPayload>,
}

impl TestDataSet {
    /// Five valid books, three invalid ones and the full edge-case set.
    #[must_use]
    pub fn generate(seed: u64) -> Self {
        let mut generator = TestDataGenerator::from_seed(seed);
        Self {
            seed,
            valid_books: generator.multiple_books(5),
            invalid_books: vec![
                generator.invalid_book(InvalidKind::MissingRequired),
                generator.invalid_book(InvalidKind::WrongTypes),
                generator.invalid_book(InvalidKind::EmptyValues),
            ],
            edge_cases: generator.edge_cases(),
        }
    }

    /// Smaller set used when a saved file cannot be read.
    #[must_use]
    pub fn fallback(seed: u64) -> Self {
        let mut generator = TestDataGenerator::from_seed(seed);
        let mut edge_cases = generator.edge_cases();
        edge_cases.truncate(2);
        Self {
            seed,
            valid_books: generator.multiple_books(3),
            invalid_books: vec![
                generator.invalid_book(InvalidKind::MissingRequired),
                generator.invalid_book(InvalidKind::WrongTypes),
            ],
            edge_cases,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.valid_books.len() + self.invalid_books.len() + self.edge_cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes the set as pretty JSON, creating parent directories.
    ///
    /// # Errors
    /// Returns [`DataSetError`] if the directory or file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), DataSetError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| DataSetError::Io {
                action: "create directory for",
                path: path.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| DataSetError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| DataSetError::Io {
            action: "write",
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), payloads = self.len(), "test data saved");
        Ok(())
    }

    /// # Errors
    /// Returns [`DataSetError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, DataSetError> {
        let raw = fs::read_to_string(path).map_err(|source| DataSetError::Io {
            action: "read",
            path: path.to_path_buf(),
            source,
        })?;
        let set: Self = serde_json::from_str(&raw).map_err(|source| DataSetError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), payloads = set.len(), "test data loaded");
        Ok(set)
    }

    /// Loads `path`, generating and saving a fresh set when it does not exist.
    /// Any other failure falls back to [`TestDataSet::fallback`] without touching the file.
    #[must_use]
    pub fn load_or_generate(path: &Path, seed: u64) -> Self {
        if !path.exists() {
            tracing::info!(path = %path.display(), "test data file not found, generating");
            let set = Self::generate(seed);
            if let Err(e) = set.save(path) {
                tracing::warn!(error = %e, "could not save generated test data");
            }
            return set;
        }

        match Self::load(path) {
            Ok(set) => set,
            Err(e) => {
                tracing::error!(error = %e, "using fallback test data");
                Self::fallback(seed)
            }
        }
    }
}
