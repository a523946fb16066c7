//! Analysis error taxonomy.

use thiserror::Error;

use crate::domain::forces::{AggregationMethod, Force};
use crate::domain::foundation::{ErrorCode, ValidationError};

/// Failure of an analysis run. An analysis either fully succeeds or fails
/// with exactly one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Invalid analysis input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Insufficient data for {force}: {actual} valid responses, {required} required")]
    InsufficientData {
        force: Force,
        required: u32,
        actual: u32,
    },

    #[error("Computation failed for {force} using {method}: {reason}")]
    Computation {
        force: Force,
        method: AggregationMethod,
        reason: String,
    },

    #[error("Analysis task failed: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Creates an insufficient data error.
    pub fn insufficient(force: Force, required: u32, actual: u32) -> Self {
        AnalysisError::InsufficientData {
            force,
            required,
            actual,
        }
    }

    /// Creates a computation error.
    pub fn computation(force: Force, method: AggregationMethod, reason: impl Into<String>) -> Self {
        AnalysisError::Computation {
            force,
            method,
            reason: reason.into(),
        }
    }

    /// Returns the stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::Validation(_) => ErrorCode::ValidationFailed,
            AnalysisError::InsufficientData { .. } => ErrorCode::InsufficientData,
            AnalysisError::Computation { .. } => ErrorCode::ComputationFailed,
            AnalysisError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Returns true if retrying with relaxed thresholds could succeed.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AnalysisError::InsufficientData { .. })
    }
}
