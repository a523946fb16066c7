//! Survey responses and question texts consumed by the engine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{QuestionId, SessionId, Timestamp};

/// The raw answer a respondent gave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// A numeric scale answer.
    Number(f64),
    /// Free text or a coded choice.
    Text(String),
}

impl From<&str> for ResponseValue {
    fn from(value: &str) -> Self {
        ResponseValue::Text(value.to_string())
    }
}

impl From<String> for ResponseValue {
    fn from(value: String) -> Self {
        ResponseValue::Text(value)
    }
}

impl From<f64> for ResponseValue {
    fn from(value: f64) -> Self {
        ResponseValue::Number(value)
    }
}

/// One respondent's answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub question_id: QuestionId,
    pub session_id: SessionId,
    pub value: ResponseValue,
    pub answered_at: Timestamp,
    /// Seconds the respondent spent on the question.
    #[serde(default)]
    pub time_spent: u32,
}

impl Response {
    /// Creates a response answered now.
    pub fn new(question_id: QuestionId, session_id: SessionId, value: impl Into<ResponseValue>) -> Self {
        Self {
            question_id,
            session_id,
            value: value.into(),
            answered_at: Timestamp::now(),
            time_spent: 0,
        }
    }

    /// Sets the time spent answering.
    pub fn with_time_spent(mut self, secs: u32) -> Self {
        self.time_spent = secs;
        self
    }
}

/// Wording of a survey question, used to classify unmapped questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub question_id: QuestionId,
    pub text: String,
}

impl SurveyQuestion {
    pub fn new(question_id: QuestionId, text: impl Into<String>) -> Self {
        Self {
            question_id,
            text: text.into(),
        }
    }
}
