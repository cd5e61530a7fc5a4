//! Error taxonomy for a rating run.

use std::path::PathBuf;
use thiserror::Error;

use crate::validator::ValidationError;

/// Result type alias using [`RaterError`]
pub type Result<T> = std::result::Result<T, RaterError>;

/// Errors raised while rating a batch of survey files.
///
/// `FileRead`, `StructuralValidation` and `DataValidation` are scoped to one
/// file: the file is skipped and the run continues. The rest end the run.
#[derive(Debug, Error)]
pub enum RaterError {
    /// The file could not be opened or decoded
    #[error("cannot read {}: {reason}", path.display())]
    FileRead { path: PathBuf, reason: String },

    /// The sheet layout does not match the survey template
    #[error("{}: {source}", path.display())]
    StructuralValidation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// A weight or score is missing, not numeric, or out of range
    #[error("{}: {source}", path.display())]
    DataValidation {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    /// No file survived to be aggregated
    #[error("no processable files in {} ({skipped} skipped)", dir.display())]
    Aggregation { dir: PathBuf, skipped: usize },

    /// The report could not be written
    #[error("cannot write report {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    /// The input directory could not be scanned
    #[error("cannot scan input directory {}", dir.display())]
    InputDirectory {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RaterError {
    /// Wraps a validation failure, classifying it as structural or data.
    pub fn validation(path: impl Into<PathBuf>, source: ValidationError) -> Self {
        let path = path.into();
        if source.is_structural() {
            RaterError::StructuralValidation { path, source }
        } else {
            RaterError::DataValidation { path, source }
        }
    }

    /// Short machine-readable kind, used in the error log.
    pub fn kind(&self) -> &'static str {
        match self {
            RaterError::FileRead { .. } => "file_read",
            RaterError::StructuralValidation { .. } => "structural_validation",
            RaterError::DataValidation { .. } => "data_validation",
            RaterError::Aggregation { .. } => "aggregation",
            RaterError::Write { .. } => "write",
            RaterError::InputDirectory { .. } => "input_directory",
        }
    }

    /// Whether the run can continue with the next file.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            RaterError::FileRead { .. }
                | RaterError::StructuralValidation { .. }
                | RaterError::DataValidation { .. }
        )
    }
}
