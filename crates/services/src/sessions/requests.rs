//! Typed request bodies for the session operations.
//!
//! Transports deserialize these instead of poking at loose JSON; every
//! violation surfaces as `SessionError::InvalidRequest`.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use interview_core::model::QuestionId;

use super::sampler::SelectionCriteria;
use crate::error::SessionError;

pub const MAX_ANSWER_CHARS: usize = 20_000;
pub const MAX_TIME_SPENT_SECONDS: u32 = 24 * 60 * 60;

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, SessionError> {
    serde_json::from_str(body).map_err(|e| SessionError::InvalidRequest(e.to_string()))
}

fn check_seconds(name: &str, value: u32) -> Result<(), SessionError> {
    if value > MAX_TIME_SPENT_SECONDS {
        return Err(SessionError::InvalidRequest(format!(
            "{name} must be at most {MAX_TIME_SPENT_SECONDS} seconds"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateSessionRequest {
    pub criteria: SelectionCriteria,
}

impl CreateSessionRequest {
    /// # Errors
    ///
    /// Returns `SessionError::InvalidRequest` for malformed JSON.
    pub fn from_json(body: &str) -> Result<Self, SessionError> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        parse_json(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordAnswerRequest {
    pub question_id: QuestionId,
    pub answer_text: String,
    pub time_spent: u32,
}

impl RecordAnswerRequest {
    /// # Errors
    ///
    /// Returns `SessionError::InvalidRequest` for malformed JSON, missing
    /// fields, or values outside the accepted bounds.
    pub fn from_json(body: &str) -> Result<Self, SessionError> {
        parse_json::<Self>(body)?.validate()
    }

    /// # Errors
    ///
    /// Returns `SessionError::InvalidRequest` if the answer is too long or the
    /// time spent is implausible.
    pub fn validate(self) -> Result<Self, SessionError> {
        if self.answer_text.chars().count() > MAX_ANSWER_CHARS {
            return Err(SessionError::InvalidRequest(format!(
                "answer_text must be at most {MAX_ANSWER_CHARS} characters"
            )));
        }
        check_seconds("time_spent", self.time_spent)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinishSessionRequest {
    pub total_time: Option<u32>,
}

impl FinishSessionRequest {
    /// # Errors
    ///
    /// Returns `SessionError::InvalidRequest` for malformed JSON or an
    /// implausible total time.
    pub fn from_json(body: &str) -> Result<Self, SessionError> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        let request: Self = parse_json(body)?;
        if let Some(total) = request.total_time {
            check_seconds("total_time", total)?;
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_answer_requires_question_and_text() {
        let err = RecordAnswerRequest::from_json(r#"{"answer_text": "x"}"#).unwrap_err();
        assert!(matches!(err, SessionError::InvalidRequest(msg) if msg.contains("question_id")));

        let ok = RecordAnswerRequest::from_json(
            r#"{"question_id": 3, "answer_text": "x", "time_spent": 0}"#,
        )
        .unwrap();
        assert_eq!(ok.question_id, QuestionId::new(3));
        assert_eq!(ok.time_spent, 0);
    }

    #[test]
    fn record_answer_requires_time_spent() {
        let err = RecordAnswerRequest::from_json(r#"{"question_id": 3, "answer_text": "x"}"#)
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidRequest(msg) if msg.contains("time_spent")));
    }

    #[test]
    fn record_answer_rejects_negative_and_huge_times() {
        let negative =
            RecordAnswerRequest::from_json(r#"{"question_id": 1, "answer_text": "x", "time_spent": -4}"#);
        assert!(matches!(negative, Err(SessionError::InvalidRequest(_))));

        let huge = RecordAnswerRequest::from_json(
            r#"{"question_id": 1, "answer_text": "x", "time_spent": 90000}"#,
        );
        assert!(matches!(huge, Err(SessionError::InvalidRequest(_))));
    }

    #[test]
    fn record_answer_rejects_oversized_text() {
        let request = RecordAnswerRequest {
            question_id: QuestionId::new(1),
            answer_text: "a".repeat(MAX_ANSWER_CHARS + 1),
            time_spent: 1,
        };
        assert!(matches!(
            request.validate(),
            Err(SessionError::InvalidRequest(_))
        ));
    }

    #[test]
    fn empty_bodies_use_defaults() {
        assert_eq!(
            CreateSessionRequest::from_json("").unwrap(),
            CreateSessionRequest::default()
        );
        assert_eq!(FinishSessionRequest::from_json("  ").unwrap().total_time, None);
        assert_eq!(
            FinishSessionRequest::from_json(r#"{"total_time": 120}"#)
                .unwrap()
                .total_time,
            Some(120)
        );
    }

    #[test]
    fn create_request_carries_criteria() {
        let request = CreateSessionRequest::from_json(
            r#"{"criteria": {"count": 2, "preferred_field": "backend"}}"#,
        )
        .unwrap();
        assert_eq!(request.criteria.count, Some(2));
        assert_eq!(request.criteria.preferred_field.as_deref(), Some("backend"));
    }
}
