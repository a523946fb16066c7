//! Question Force Classifier - Keyword heuristics mapping question wording to a force.

use serde::{Deserialize, Serialize};

use crate::domain::forces::{Force, KeywordDictionary, NormalizedText, QuestionForceMapping, DEFAULT_MAPPING_WEIGHT};
use crate::domain::foundation::{QuestionId, SurveyId, ValidationError};

/// Ceiling on classifier confidence; keyword matching is never certain.
pub const MAX_CLASSIFIER_CONFIDENCE: f64 = 0.95;

/// Confidence ceiling for ambiguous questions.
const AMBIGUOUS_CONFIDENCE_CAP: f64 = 0.49;

/// Steepness of the density to confidence curve.
const DENSITY_STEEPNESS: f64 = 8.0;

/// Keyword evidence for one force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordHits {
    pub force: Force,
    /// Distinct dictionary entries found in the text.
    pub matched_keywords: Vec<String>,
    /// Hits divided by the number of tokens in the text.
    pub density: f64,
}

impl KeywordHits {
    pub fn hits(&self) -> usize {
        self.matched_keywords.len()
    }
}

/// Classifies survey questions into forces by keyword density.
#[derive(Debug, Clone)]
pub struct QuestionForceClassifier {
    dictionary: KeywordDictionary,
}

impl Default for QuestionForceClassifier {
    fn default() -> Self {
        Self::new(KeywordDictionary::builtin().clone())
    }
}

impl QuestionForceClassifier {
    /// Creates a classifier over the given dictionary.
    pub fn new(dictionary: KeywordDictionary) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &KeywordDictionary {
        &self.dictionary
    }

    /// Scores text against every force, in tie-break priority order.
    pub fn score(&self, text: &str) -> Vec<KeywordHits> {
        let normalized = NormalizedText::new(text);
        let token_count = normalized.token_count();

        Force::BY_PRIORITY
            .iter()
            .map(|&force| {
                let matched_keywords: Vec<String> = self
                    .dictionary
                    .keywords_for(force)
                    .iter()
                    .filter(|keyword| normalized.contains(keyword))
                    .cloned()
                    .collect();
                let density = if token_count == 0 {
                    0.0
                } else {
                    (matched_keywords.len() as f64 / token_count as f64).min(1.0)
                };
                KeywordHits {
                    force,
                    matched_keywords,
                    density,
                }
            })
            .collect()
    }

    /// Maps a question to the force its wording most likely measures.
    ///
    /// The highest hit density wins; equal densities resolve by force
    /// priority. A question matching nothing falls back to the highest
    /// priority force with zero confidence.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if either identifier is blank.
    pub fn classify(
        &self,
        question_text: &str,
        question_id: &str,
        survey_id: &str,
    ) -> Result<QuestionForceMapping, ValidationError> {
        let question_id = QuestionId::new(question_id)?;
        let survey_id = SurveyId::new(survey_id)?;
        self.classify_question(question_text, question_id, survey_id)
    }

    /// Same as [`classify`](Self::classify) for already validated identifiers.
    pub fn classify_question(
        &self,
        question_text: &str,
        question_id: QuestionId,
        survey_id: SurveyId,
    ) -> Result<QuestionForceMapping, ValidationError> {
        let scores = self.score(question_text);

        // Scores come in priority order, so a strict comparison keeps the
        // higher-priority force on ties.
        let mut best: Option<&KeywordHits> = None;
        for candidate in &scores {
            if best.map_or(true, |b| candidate.density > b.density) {
                best = Some(candidate);
            }
        }

        let (force, density) = match best {
            Some(hits) if hits.hits() > 0 => (hits.force, hits.density),
            _ => (Force::BY_PRIORITY[0], 0.0),
        };
        let confidence = self.confidence_for_density(density);

        tracing::debug!(
            question_id = %question_id,
            force = %force,
            density,
            confidence,
            "Classified question"
        );

        Ok(QuestionForceMapping::new(survey_id, question_id, force, DEFAULT_MAPPING_WEIGHT, confidence)?.classified())
    }

    /// Converts hit density to a confidence in `[0, 0.95]`.
    ///
    /// Monotonic non-decreasing; densities at or below the dictionary's
    /// minimum stay under 0.5.
    pub fn confidence_for_density(&self, density: f64) -> f64 {
        if density <= 0.0 {
            return 0.0;
        }
        let confidence = (1.0 - (-DENSITY_STEEPNESS * density).exp()).min(MAX_CLASSIFIER_CONFIDENCE);
        if density <= self.dictionary.min_hit_density {
            confidence.min(AMBIGUOUS_CONFIDENCE_CAP)
        } else {
            confidence
        }
    }
}
