//! Error taxonomy shared by every pipeline stage.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by loading, splitting, scaling and running procedures.
///
/// `DataUnavailable`, `InvalidRatio`, `SchemaMismatch` and `Config` abort the
/// pipeline. `FitFailure` is local to one procedure: the panel records it as a
/// skipped entry and keeps going. `DegenerateFeature` is fatal or local depending
/// on whether any procedure needs scaled inputs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The named dataset could not be produced.
    #[error("Dataset {dataset} is unavailable: {reason}")]
    DataUnavailable { dataset: String, reason: String },
    /// The split ratio is outside `(0, 1)` or leaves one side empty.
    #[error("Invalid split ratio {ratio}: {reason}")]
    InvalidRatio { ratio: f64, reason: String },
    /// A feature has zero variance in the training subset.
    #[error("Feature {feature} has zero variance; standardization is undefined")]
    DegenerateFeature { feature: String },
    /// A procedure's numeric fit failed.
    #[error("{procedure} failed to fit: {reason}")]
    FitFailure { procedure: String, reason: String },
    /// Two datasets (or a dataset and a transform) disagree on shape or feature names.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failure raised by a numeric routine before it is attributed to a procedure.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{reason}")]
pub struct FitError {
    pub reason: String,
}

impl FitError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Attach the procedure name, producing the pipeline-level error.
    pub fn for_procedure(self, procedure: &str) -> PipelineError {
        PipelineError::FitFailure {
            procedure: procedure.to_string(),
            reason: self.reason,
        }
    }
}

impl PipelineError {
    /// Whether this error only affects the procedure that raised it.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PipelineError::FitFailure { .. } | PipelineError::DegenerateFeature { .. }
        )
    }
}
