//! Question to force mappings.

use serde::{Deserialize, Serialize};

use super::Force;
use crate::domain::foundation::{QuestionId, SurveyId, ValidationError};

/// Largest allowed mapping weight.
pub const MAX_MAPPING_WEIGHT: f64 = 2.0;

/// Weight given to questions mapped without an explicit weight.
pub const DEFAULT_MAPPING_WEIGHT: f64 = 1.0;

/// Where a mapping came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingSource {
    /// Supplied by a survey administrator.
    #[default]
    Explicit,
    /// Produced by the keyword classifier.
    Classified,
}

/// Associates a survey question with the force it measures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMapping")]
pub struct QuestionForceMapping {
    survey_id: SurveyId,
    question_id: QuestionId,
    force: Force,
    weight: f64,
    confidence: f64,
    source: MappingSource,
}

impl QuestionForceMapping {
    /// Creates an explicit mapping, validating weight and confidence.
    ///
    /// # Errors
    /// - `weight` outside `(0, 2]`
    /// - `confidence` outside `[0, 1]`
    pub fn new(
        survey_id: SurveyId,
        question_id: QuestionId,
        force: Force,
        weight: f64,
        confidence: f64,
    ) -> Result<Self, ValidationError> {
        if !(weight > 0.0 && weight <= MAX_MAPPING_WEIGHT) {
            return Err(ValidationError::out_of_range("weight", 0.0, MAX_MAPPING_WEIGHT, weight));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::out_of_range("confidence", 0.0, 1.0, confidence));
        }

        Ok(Self {
            survey_id,
            question_id,
            force,
            weight,
            confidence,
            source: MappingSource::Explicit,
        })
    }

    /// Marks this mapping as produced by the classifier.
    pub fn classified(mut self) -> Self {
        self.source = MappingSource::Classified;
        self
    }

    pub fn survey_id(&self) -> &SurveyId {
        &self.survey_id
    }

    pub fn question_id(&self) -> &QuestionId {
        &self.question_id
    }

    pub fn force(&self) -> Force {
        self.force
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn source(&self) -> MappingSource {
        self.source
    }

    /// Returns true if the mapping was produced by the classifier.
    pub fn is_classified(&self) -> bool {
        self.source == MappingSource::Classified
    }
}

/// Unvalidated wire form of a mapping.
#[derive(Deserialize)]
struct RawMapping {
    survey_id: SurveyId,
    question_id: QuestionId,
    force: Force,
    #[serde(default = "default_weight")]
    weight: f64,
    confidence: f64,
    #[serde(default)]
    source: MappingSource,
}

fn default_weight() -> f64 {
    DEFAULT_MAPPING_WEIGHT
}

impl TryFrom<RawMapping> for QuestionForceMapping {
    type Error = ValidationError;

    fn try_from(raw: RawMapping) -> Result<Self, Self::Error> {
        let mut mapping =
            QuestionForceMapping::new(raw.survey_id, raw.question_id, raw.force, raw.weight, raw.confidence)?;
        mapping.source = raw.source;
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(weight: f64, confidence: f64) -> Result<QuestionForceMapping, ValidationError> {
        QuestionForceMapping::new(
            SurveyId::new("s1").unwrap(),
            QuestionId::new("q1").unwrap(),
            Force::PainOfOld,
            weight,
            confidence,
        )
    }

    #[test]
    fn mapping_accepts_boundary_values() {
        assert!(mapping(2.0, 0.0).is_ok());
        assert!(mapping(0.01, 1.0).is_ok());
    }

    #[test]
    fn mapping_rejects_zero_weight() {
        let err = mapping(0.0, 0.5).unwrap_err();
        assert_eq!(err.field(), "weight");
    }

    #[test]
    fn mapping_rejects_weight_above_two() {
        assert!(mapping(2.5, 0.5).is_err());
    }

    #[test]
    fn mapping_rejects_out_of_range_confidence() {
        let err = mapping(1.0, 1.2).unwrap_err();
        assert_eq!(err.field(), "confidence");
        assert!(mapping(1.0, -0.1).is_err());
        assert!(mapping(1.0, f64::NAN).is_err());
    }

    #[test]
    fn mapping_defaults_to_explicit_source() {
        let m = mapping(1.0, 0.9).unwrap();
        assert_eq!(m.source(), MappingSource::Explicit);
        assert!(m.classified().is_classified());
    }

    #[test]
    fn mapping_deserialization_validates() {
        let ok = r#"{"survey_id":"s1","question_id":"q1","force":"pull_of_new","confidence":0.8}"#;
        let bad = r#"{"survey_id":"s1","question_id":"q1","force":"pull_of_new","weight":3.0,"confidence":0.8}"#;

        let parsed: QuestionForceMapping = serde_json::from_str(ok).unwrap();
        assert_eq!(parsed.weight(), DEFAULT_MAPPING_WEIGHT);
        assert_eq!(parsed.force(), Force::PullOfNew);
        assert!(serde_json::from_str::<QuestionForceMapping>(bad).is_err());
    }
}
