//! Response Normalizer - Turns raw answers into 1-5 intensities per force.
//!
//! Each (response, mapping) pair produces at most one [`NormalizedResponse`].
//! Answers are scored in this order:
//!
//! 1. Blank answers and placeholder tokens ("N/A", "skip", ...) are dropped
//! 2. Numbers inside the 1-5 scale are used directly, others are dropped
//! 3. Whole-answer coded choices ("strongly agree") use their coded score
//! 4. Free text is scored from charged words, negations and adverbs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::forces::{
    is_valid_strength, AnchorTerm, Force, IntensityLexicon, MappingSource, NormalizedText,
    QuestionForceMapping, Response, ResponseValue, MAX_FORCE_STRENGTH, MIN_FORCE_STRENGTH,
    NEUTRAL_FORCE_STRENGTH,
};
use crate::domain::foundation::{QuestionId, SessionId};

/// Tokens before a charged word that are searched for a negation.
const NEGATION_WINDOW: usize = 3;

/// Extra intensity per additional charged word pointing the same way.
const REINFORCEMENT_STEP: f64 = 0.25;

/// A response scored against one of the forces its question maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    /// Position of the raw response in the analysed input.
    pub response_index: usize,
    pub question_id: QuestionId,
    pub session_id: SessionId,
    pub force: Force,
    /// Intensity on the 1-5 scale.
    pub intensity: f64,
    pub weight: f64,
    pub mapping_confidence: f64,
    pub source: MappingSource,
    pub matched_keywords: Vec<String>,
}

/// Intensity extracted from one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityScore {
    pub intensity: f64,
    pub matched_keywords: Vec<String>,
}

impl IntensityScore {
    fn neutral() -> Self {
        Self {
            intensity: NEUTRAL_FORCE_STRENGTH,
            matched_keywords: Vec::new(),
        }
    }
}

/// Filters non-answers and extracts intensities from survey responses.
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    lexicon: IntensityLexicon,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new(IntensityLexicon::builtin().clone())
    }
}

impl ResponseNormalizer {
    pub fn new(lexicon: IntensityLexicon) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &IntensityLexicon {
        &self.lexicon
    }

    /// Normalizes every response that has at least one mapping.
    ///
    /// Responses to unmapped questions and unusable answers are skipped.
    /// A question mapped to several forces yields one entry per mapping.
    pub fn normalize(
        &self,
        responses: &[Response],
        mappings: &[QuestionForceMapping],
    ) -> Vec<NormalizedResponse> {
        let mut by_question: HashMap<&QuestionId, Vec<&QuestionForceMapping>> = HashMap::new();
        for mapping in mappings {
            by_question.entry(mapping.question_id()).or_default().push(mapping);
        }

        let mut normalized = Vec::new();
        let mut dropped = 0usize;

        for (index, response) in responses.iter().enumerate() {
            let Some(question_mappings) = by_question.get(&response.question_id) else {
                dropped += 1;
                continue;
            };

            let mut kept = false;
            for mapping in question_mappings {
                let Some(score) = self.intensity_for(&response.value, mapping.force()) else {
                    continue;
                };
                kept = true;
                normalized.push(NormalizedResponse {
                    response_index: index,
                    question_id: response.question_id.clone(),
                    session_id: response.session_id.clone(),
                    force: mapping.force(),
                    intensity: score.intensity,
                    weight: mapping.weight(),
                    mapping_confidence: mapping.confidence(),
                    source: mapping.source(),
                    matched_keywords: score.matched_keywords,
                });
            }
            if !kept {
                dropped += 1;
            }
        }

        tracing::debug!(
            responses = responses.len(),
            normalized = normalized.len(),
            dropped,
            "Normalized responses"
        );

        normalized
    }

    /// Scores one answer against a force, or `None` if it carries no signal.
    pub fn intensity_for(&self, value: &ResponseValue, force: Force) -> Option<IntensityScore> {
        match value {
            ResponseValue::Number(n) => scale_answer(*n),
            ResponseValue::Text(text) => {
                if self.lexicon.is_non_answer(text) {
                    return None;
                }
                if let Ok(n) = text.trim().parse::<f64>() {
                    return scale_answer(n);
                }
                if let Some(score) = self.lexicon.likert_score(text) {
                    return Some(IntensityScore {
                        intensity: score,
                        matched_keywords: vec![NormalizedText::new(text).joined()],
                    });
                }
                Some(self.score_text(text, force))
            }
        }
    }

    fn score_text(&self, text: &str, force: Force) -> IntensityScore {
        let normalized = NormalizedText::new(text);
        if normalized.is_empty() {
            return IntensityScore::neutral();
        }

        let mut candidates: Vec<&AnchorTerm> = self
            .lexicon
            .anchors_for(force)
            .iter()
            .chain(self.lexicon.common_anchors.iter())
            .collect();
        // Longer phrases claim their tokens first so "not at all" is not
        // also read as a negated anchor.
        candidates.sort_by_key(|anchor| std::cmp::Reverse(anchor.term.split_whitespace().count()));

        let mut covered = vec![false; normalized.token_count()];
        let mut scores = Vec::new();
        let mut matched_keywords = Vec::new();

        for anchor in candidates {
            let Some(start) = normalized.find(&anchor.term) else {
                continue;
            };
            let end = start + anchor.term.split_whitespace().count();
            if covered[start..end].iter().any(|c| *c) {
                continue;
            }
            covered[start..end].iter_mut().for_each(|c| *c = true);

            let negated = self.is_negated(&normalized, start);
            scores.push(if negated {
                MAX_FORCE_STRENGTH + MIN_FORCE_STRENGTH - anchor.score
            } else {
                anchor.score
            });
            matched_keywords.push(if negated {
                format!("not {}", anchor.term)
            } else {
                anchor.term.clone()
            });
        }

        let mut intensity = base_intensity(&scores);

        let shift: f64 = self
            .lexicon
            .modifiers
            .iter()
            .filter(|modifier| normalized.contains(&modifier.term))
            .map(|modifier| {
                matched_keywords.push(modifier.term.clone());
                modifier.shift
            })
            .sum();
        intensity = apply_shift(intensity, shift);

        IntensityScore {
            intensity: intensity.clamp(MIN_FORCE_STRENGTH, MAX_FORCE_STRENGTH),
            matched_keywords,
        }
    }

    fn is_negated(&self, text: &NormalizedText, anchor_start: usize) -> bool {
        let from = anchor_start.saturating_sub(NEGATION_WINDOW);
        text.tokens()[from..anchor_start]
            .iter()
            .any(|token| self.lexicon.negations.iter().any(|neg| neg == token))
    }
}

fn scale_answer(value: f64) -> Option<IntensityScore> {
    if is_valid_strength(value) {
        Some(IntensityScore {
            intensity: value,
            matched_keywords: Vec::new(),
        })
    } else {
        tracing::debug!(value, "Dropping numeric answer outside the 1-5 scale");
        None
    }
}

/// Mean anchor score, reinforced by each extra anchor on the same side.
fn base_intensity(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return NEUTRAL_FORCE_STRENGTH;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    if mean > NEUTRAL_FORCE_STRENGTH {
        let agreeing = scores.iter().filter(|s| **s > NEUTRAL_FORCE_STRENGTH).count();
        mean + REINFORCEMENT_STEP * agreeing.saturating_sub(1) as f64
    } else if mean < NEUTRAL_FORCE_STRENGTH {
        let agreeing = scores.iter().filter(|s| **s < NEUTRAL_FORCE_STRENGTH).count();
        mean - REINFORCEMENT_STEP * agreeing.saturating_sub(1) as f64
    } else {
        mean
    }
}

/// Moves an intensity away from neutral by `shift`; a negative shift moves
/// toward neutral without crossing it.
fn apply_shift(intensity: f64, shift: f64) -> f64 {
    if shift == 0.0 {
        return intensity;
    }
    if intensity > NEUTRAL_FORCE_STRENGTH {
        (intensity + shift).max(NEUTRAL_FORCE_STRENGTH)
    } else if intensity < NEUTRAL_FORCE_STRENGTH {
        (intensity - shift).min(NEUTRAL_FORCE_STRENGTH)
    } else if shift > 0.0 {
        intensity + shift
    } else {
        intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SurveyId;

    fn normalizer() -> ResponseNormalizer {
        ResponseNormalizer::default()
    }

    fn mapping(question: &str, force: Force) -> QuestionForceMapping {
        QuestionForceMapping::new(
            SurveyId::new("s1").unwrap(),
            QuestionId::new(question).unwrap(),
            force,
            1.0,
            0.9,
        )
        .unwrap()
    }

    fn response(question: &str, session: &str, value: impl Into<ResponseValue>) -> Response {
        Response::new(QuestionId::new(question).unwrap(), SessionId::new(session).unwrap(), value)
    }

    fn text_intensity(text: &str, force: Force) -> f64 {
        normalizer()
            .intensity_for(&ResponseValue::from(text), force)
            .unwrap()
            .intensity
    }

    #[test]
    fn reinforcing_pain_words_exceed_neutral() {
        let score = normalizer()
            .intensity_for(&"Current system is slow and unreliable".into(), Force::PainOfOld)
            .unwrap();
        assert!((score.intensity - 4.25).abs() < 1e-9);
        assert!(score.matched_keywords.contains(&"slow".to_string()));
        assert!(score.matched_keywords.contains(&"unreliable".to_string()));
    }

    #[test]
    fn pull_words_exceed_neutral() {
        assert!((text_intensity("Need faster performance", Force::PullOfNew) - 4.25).abs() < 1e-9);
    }

    #[test]
    fn intensifiers_push_away_from_neutral() {
        let plain = text_intensity("It is frustrating", Force::PainOfOld);
        let strong = text_intensity("It is extremely frustrating", Force::PainOfOld);
        let weak = text_intensity("It is slightly frustrating", Force::PainOfOld);
        assert!(strong > plain);
        assert!(weak < plain);
        assert!(weak >= NEUTRAL_FORCE_STRENGTH);
    }

    #[test]
    fn negation_dampens_charged_words() {
        let negated = text_intensity("Honestly not frustrating", Force::PainOfOld);
        assert!(negated < NEUTRAL_FORCE_STRENGTH);
    }

    #[test]
    fn phrases_are_not_double_counted() {
        // "not at all" is a low-intensity phrase, not a negated anchor.
        let score = normalizer()
            .intensity_for(&"not at all".into(), Force::AnxietyOfNew)
            .unwrap();
        assert_eq!(score.intensity, 1.0);
        assert_eq!(score.matched_keywords, vec!["not at all".to_string()]);
    }

    #[test]
    fn text_without_signal_is_neutral() {
        assert_eq!(text_intensity("we use spreadsheets", Force::PainOfOld), 3.0);
    }

    #[test]
    fn intensity_stays_on_scale() {
        let value = text_intensity(
            "extremely incredibly absolutely broken terrible awful nightmare crash",
            Force::PainOfOld,
        );
        assert_eq!(value, MAX_FORCE_STRENGTH);
    }

    #[test]
    fn numeric_answers_are_used_or_dropped() {
        let n = normalizer();
        assert_eq!(n.intensity_for(&ResponseValue::Number(4.0), Force::PullOfNew).unwrap().intensity, 4.0);
        assert!(n.intensity_for(&ResponseValue::Number(7.0), Force::PullOfNew).is_none());
        assert!(n.intensity_for(&ResponseValue::Number(0.0), Force::PullOfNew).is_none());
        assert_eq!(n.intensity_for(&" 2 ".into(), Force::PullOfNew).unwrap().intensity, 2.0);
    }

    #[test]
    fn likert_choices_map_to_scale() {
        assert_eq!(text_intensity("Strongly agree", Force::PullOfNew), 5.0);
        assert_eq!(text_intensity("strongly_disagree", Force::PullOfNew), 1.0);
        assert_eq!(text_intensity("Neutral", Force::PullOfNew), 3.0);
    }

    #[test]
    fn normalize_drops_non_answers_and_unmapped_questions() {
        let responses = vec![
            response("q1", "r1", "N/A"),
            response("q1", "r2", "   "),
            response("q1", "r3", "It is slow"),
            response("q9", "r4", "It is slow"),
        ];
        let normalized = normalizer().normalize(&responses, &[mapping("q1", Force::PainOfOld)]);

        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].response_index, 2);
        assert_eq!(normalized[0].session_id.as_str(), "r3");
        assert_eq!(normalized[0].force, Force::PainOfOld);
    }

    #[test]
    fn multi_mapped_question_yields_one_entry_per_force() {
        let responses = vec![response("q1", "r1", "I need it, but I worry about the risk")];
        let mappings = vec![mapping("q1", Force::PullOfNew), mapping("q1", Force::AnxietyOfNew)];
        let normalized = normalizer().normalize(&responses, &mappings);

        assert_eq!(normalized.len(), 2);
        assert!(normalized.iter().all(|n| n.response_index == 0));
        let forces: Vec<Force> = normalized.iter().map(|n| n.force).collect();
        assert_eq!(forces, vec![Force::PullOfNew, Force::AnxietyOfNew]);
        assert!(normalized.iter().all(|n| n.intensity > 3.0));
    }

    #[test]
    fn normalized_entries_carry_mapping_metadata() {
        let classified = mapping("q1", Force::PullOfNew).classified();
        let normalized = normalizer().normalize(&[response("q1", "r1", 5.0)], &[classified]);
        assert_eq!(normalized[0].source, MappingSource::Classified);
        assert_eq!(normalized[0].weight, 1.0);
        assert_eq!(normalized[0].mapping_confidence, 0.9);
    }
}
