//! Forces Module - JTBD force vocabulary and the data flowing through analysis.
//!
//! # Components
//!
//! - `Force` - The five forces, their kinds and tie-break priority
//! - `Response`, `SurveyQuestion` - Inputs owned by the survey system
//! - `QuestionForceMapping` - Which force a question measures, and how reliably
//! - `ForceStrength`, `ForceDistribution`, `ConfidenceInterval` - Derived measurements
//! - `KeywordDictionary`, `IntensityLexicon` - Versioned word lists
//! - `AnalysisOptions` - Per-request settings

mod force;
mod lexicon;
mod mapping;
mod options;
mod response;
mod strength;

pub use force::{
    is_valid_strength, rank_by_strength, AggregationMethod, Force, ForceKind, MAX_FORCE_STRENGTH,
    MIN_FORCE_STRENGTH, NEUTRAL_FORCE_STRENGTH,
};
pub use lexicon::{
    AnchorTerm, IntensityLexicon, KeywordDictionary, LexiconError, ModifierTerm, NormalizedText,
    DEFAULT_MIN_HIT_DENSITY, LEXICON_VERSION,
};
pub use mapping::{MappingSource, QuestionForceMapping, DEFAULT_MAPPING_WEIGHT, MAX_MAPPING_WEIGHT};
pub use options::AnalysisOptions;
pub use response::{Response, ResponseValue, SurveyQuestion};
pub use strength::{ConfidenceInterval, ForceDistribution, ForceStrength};
