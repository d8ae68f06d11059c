//! Shared error types for the services crate.

use thiserror::Error;

use interview_core::model::{QuestionError, QuestionId, SessionRuleError, SessionStatus};
use storage::repository::StorageError;

/// Errors emitted by the session manager.
///
/// Mapping these onto transport status codes is the caller's job.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
    #[error("session belongs to another user")]
    Forbidden,
    #[error("session is {status} and can no longer change")]
    Conflict { status: SessionStatus },
    #[error("no questions matched the selection")]
    InvalidSelection,
    #[error("question {0} is not part of this session")]
    InvalidQuestion(QuestionId),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Internal(StorageError),
}

impl From<SessionRuleError> for SessionError {
    fn from(err: SessionRuleError) -> Self {
        match err {
            SessionRuleError::Forbidden => SessionError::Forbidden,
            SessionRuleError::Conflict(status) => SessionError::Conflict { status },
            SessionRuleError::InvalidQuestion(id) => SessionError::InvalidQuestion(id),
            SessionRuleError::NoQuestions | SessionRuleError::DuplicateQuestion(_) => {
                SessionError::InvalidSelection
            }
            other => SessionError::Internal(StorageError::Rejected(other)),
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => SessionError::NotFound,
            StorageError::Rejected(rule) => rule.into(),
            other => SessionError::Internal(other),
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_rules_map_to_public_kinds() {
        let err: SessionError = StorageError::Rejected(SessionRuleError::Forbidden).into();
        assert!(matches!(err, SessionError::Forbidden));

        let err: SessionError =
            StorageError::Rejected(SessionRuleError::Conflict(SessionStatus::Completed)).into();
        assert!(matches!(
            err,
            SessionError::Conflict {
                status: SessionStatus::Completed
            }
        ));

        let err: SessionError = SessionRuleError::NoQuestions.into();
        assert!(matches!(err, SessionError::InvalidSelection));
    }

    #[test]
    fn lock_failures_are_internal() {
        let err: SessionError = StorageError::Lock("poisoned".into()).into();
        assert!(matches!(err, SessionError::Internal(_)));
        assert_eq!(err.to_string(), "lock poisoned: poisoned");
    }
}
