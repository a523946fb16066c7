//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and error types that form the
//! vocabulary shared by every analysis component.

mod errors;
mod ids;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{AnalysisId, QuestionId, SessionId, SurveyId};
pub use timestamp::Timestamp;
