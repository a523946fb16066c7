//! Cache key derivation for forces analyses.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::analysis::{AnalysisError, AnalysisInput};
use crate::ports::CacheKey;

/// Derives the cache key for an analysis input.
///
/// The key is the survey id followed by a SHA-256 fingerprint over the
/// response set, the mapping set, the question texts and the options.
/// Sets are fingerprinted order-independently, so reordering responses
/// reuses the cached result while any changed value produces a new key.
pub fn analysis_cache_key(input: &AnalysisInput) -> Result<CacheKey, AnalysisError> {
    let mut hasher = Sha256::new();

    hasher.update(input.survey_id.as_str().as_bytes());
    hash_set(&mut hasher, "responses", &input.responses)?;
    hash_set(&mut hasher, "mappings", &input.question_mappings)?;
    hash_set(&mut hasher, "questions", &input.questions)?;
    hasher.update(b"\x1eoptions\x1f");
    hasher.update(canonical_json(&input.options)?.as_bytes());

    let digest = hasher.finalize();
    Ok(CacheKey::new(format!("forces:{}:{:x}", input.survey_id, digest)))
}

fn hash_set<T: Serialize>(hasher: &mut Sha256, label: &str, items: &[T]) -> Result<(), AnalysisError> {
    let mut encoded = items.iter().map(canonical_json).collect::<Result<Vec<_>, _>>()?;
    encoded.sort();

    hasher.update(b"\x1e");
    hasher.update(label.as_bytes());
    hasher.update(b"\x1f");
    for item in encoded {
        hasher.update(item.as_bytes());
        hasher.update(b"\x1f");
    }
    Ok(())
}

fn canonical_json<T: Serialize>(value: &T) -> Result<String, AnalysisError> {
    serde_json::to_string(value).map_err(|e| AnalysisError::Internal(format!("failed to fingerprint input: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forces::{
        AggregationMethod, AnalysisOptions, Force, QuestionForceMapping, Response, SurveyQuestion,
    };
    use crate::domain::foundation::{QuestionId, SessionId, SurveyId};

    fn response(session: &str, text: &str) -> Response {
        let mut response = Response::new(QuestionId::new("q1").unwrap(), SessionId::new(session).unwrap(), text);
        response.answered_at = serde_json::from_str("\"2024-01-01T00:00:00Z\"").unwrap();
        response
    }

    fn input() -> AnalysisInput {
        AnalysisInput {
            survey_id: SurveyId::new("survey-1").unwrap(),
            responses: vec![response("r1", "slow"), response("r2", "unreliable")],
            question_mappings: vec![QuestionForceMapping::new(
                SurveyId::new("survey-1").unwrap(),
                QuestionId::new("q1").unwrap(),
                Force::PainOfOld,
                1.0,
                0.9,
            )
            .unwrap()],
            questions: Vec::new(),
            options: AnalysisOptions::default(),
        }
    }

    #[test]
    fn key_is_stable_and_prefixed_by_survey() {
        let a = analysis_cache_key(&input()).unwrap();
        let b = analysis_cache_key(&input()).unwrap();
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("forces:survey-1:"));
    }

    #[test]
    fn response_order_does_not_matter() {
        let mut reordered = input();
        reordered.responses.reverse();
        assert_eq!(analysis_cache_key(&input()).unwrap(), analysis_cache_key(&reordered).unwrap());
    }

    #[test]
    fn any_input_change_changes_the_key() {
        let base = analysis_cache_key(&input()).unwrap();

        let mut changed_response = input();
        changed_response.responses[0] = response("r1", "fast");
        assert_ne!(base, analysis_cache_key(&changed_response).unwrap());

        let mut changed_options = input();
        changed_options.options = changed_options.options.with_method(AggregationMethod::Median);
        assert_ne!(base, analysis_cache_key(&changed_options).unwrap());

        let mut changed_mapping = input();
        changed_mapping.question_mappings[0] = changed_mapping.question_mappings[0].clone().classified();
        assert_ne!(base, analysis_cache_key(&changed_mapping).unwrap());

        let mut with_question = input();
        with_question.questions = vec![SurveyQuestion::new(QuestionId::new("q2").unwrap(), "Why?")];
        assert_ne!(base, analysis_cache_key(&with_question).unwrap());

        let mut other_survey = input();
        other_survey.survey_id = SurveyId::new("survey-2").unwrap();
        assert_ne!(base, analysis_cache_key(&other_survey).unwrap());
    }

    #[test]
    fn moving_an_item_between_sets_changes_the_key() {
        let mut a = input();
        a.responses.truncate(1);
        let mut b = input();
        b.responses.truncate(1);
        b.questions = vec![SurveyQuestion::new(QuestionId::new("q1").unwrap(), "slow")];
        assert_ne!(analysis_cache_key(&a).unwrap(), analysis_cache_key(&b).unwrap());
    }
}
