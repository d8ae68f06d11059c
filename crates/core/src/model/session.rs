use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::{Question, QuestionId, SessionId, UserId};

/// Rules a session transition can violate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionRuleError {
    #[error("session has no questions")]
    NoQuestions,

    #[error("question {0} appears more than once in the session")]
    DuplicateQuestion(QuestionId),

    #[error("session belongs to another user")]
    Forbidden,

    #[error("session is {0} and can no longer change")]
    Conflict(SessionStatus),

    #[error("question {0} is not part of this session")]
    InvalidQuestion(QuestionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Abandoned,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Abandoned => "abandoned",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored answer to one of the session's questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub answer_text: String,
    pub time_spent_seconds: u32,
    pub score: u8,
    pub feedback: String,
    pub recorded_at: DateTime<Utc>,
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// A session that has not been given an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDraft {
    user_id: UserId,
    questions: Vec<Question>,
    started_at: DateTime<Utc>,
}

impl SessionDraft {
    /// Freeze a question set for a new session.
    ///
    /// # Errors
    ///
    /// Returns `SessionRuleError::NoQuestions` for an empty set and
    /// `SessionRuleError::DuplicateQuestion` if an id repeats.
    pub fn new(
        user_id: UserId,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionRuleError> {
        if questions.is_empty() {
            return Err(SessionRuleError::NoQuestions);
        }
        let mut seen = HashSet::with_capacity(questions.len());
        for q in &questions {
            if !seen.insert(q.id()) {
                return Err(SessionRuleError::DuplicateQuestion(q.id()));
            }
        }
        Ok(Self {
            user_id,
            questions,
            started_at,
        })
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn assign_id(self, id: SessionId) -> InterviewSession {
        InterviewSession {
            id,
            user_id: self.user_id,
            questions: self.questions,
            status: SessionStatus::InProgress,
            started_at: self.started_at,
            finished_at: None,
            answers: BTreeMap::new(),
            total_time: None,
            score: None,
            feedback: None,
            version: 0,
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a mock interview.
///
/// The question list is frozen at creation. Answers are keyed by question id so
/// re-answering replaces the previous entry. `finished_at`, `total_time`,
/// `score` and `feedback` are present exactly when the status is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewSession {
    id: SessionId,
    user_id: UserId,
    questions: Vec<Question>,
    status: SessionStatus,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    answers: BTreeMap<QuestionId, Answer>,
    total_time: Option<u32>,
    score: Option<u8>,
    feedback: Option<String>,
    #[serde(skip)]
    version: u64,
}

impl InterviewSession {
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id() == id)
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Answers ordered by question id.
    pub fn answers(&self) -> impl ExactSizeIterator<Item = &Answer> {
        self.answers.values()
    }

    #[must_use]
    pub fn answer(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.get(&question_id)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn total_time(&self) -> Option<u32> {
        self.total_time
    }

    #[must_use]
    pub fn score(&self) -> Option<u8> {
        self.score
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    /// Number of committed changes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Storage backends call this once per committed change.
    pub fn advance_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    /// Seconds spent per answered question.
    #[must_use]
    pub fn per_question_time(&self) -> BTreeMap<QuestionId, u32> {
        self.answers
            .iter()
            .map(|(id, a)| (*id, a.time_spent_seconds))
            .collect()
    }

    /// Sum of the time recorded on every answer.
    #[must_use]
    pub fn answered_time(&self) -> u32 {
        self.answers
            .values()
            .fold(0_u32, |acc, a| acc.saturating_add(a.time_spent_seconds))
    }

    /// # Errors
    ///
    /// Returns `SessionRuleError::Forbidden` when `user_id` is not the owner.
    pub fn ensure_owner(&self, user_id: UserId) -> Result<(), SessionRuleError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(SessionRuleError::Forbidden)
        }
    }

    /// Look up the question `user_id` is about to answer, checking every precondition
    /// of `record_answer`.
    ///
    /// # Errors
    ///
    /// `Forbidden` for a foreign user, `Conflict` once terminal, `InvalidQuestion`
    /// if the id is not in the frozen set.
    pub fn answerable_question(
        &self,
        user_id: UserId,
        question_id: QuestionId,
    ) -> Result<&Question, SessionRuleError> {
        self.ensure_owner(user_id)?;
        if self.status.is_terminal() {
            return Err(SessionRuleError::Conflict(self.status));
        }
        self.question(question_id)
            .ok_or(SessionRuleError::InvalidQuestion(question_id))
    }

    /// Insert or replace the answer for its question.
    ///
    /// # Errors
    ///
    /// Same as [`InterviewSession::answerable_question`].
    pub fn record_answer(&mut self, user_id: UserId, answer: Answer) -> Result<(), SessionRuleError> {
        self.answerable_question(user_id, answer.question_id)?;
        self.answers.insert(answer.question_id, answer);
        Ok(())
    }

    /// Move to `Completed`. `grade` sees the session as it stands and returns
    /// `(score, feedback)`.
    ///
    /// Returns `Ok(false)` without touching anything if the session is already
    /// completed.
    ///
    /// # Errors
    ///
    /// `Forbidden` for a foreign user, `Conflict` if the session was abandoned.
    pub fn complete<F>(
        &mut self,
        user_id: UserId,
        finished_at: DateTime<Utc>,
        total_time: Option<u32>,
        grade: F,
    ) -> Result<bool, SessionRuleError>
    where
        F: FnOnce(&Self) -> (u8, String),
    {
        self.ensure_owner(user_id)?;
        match self.status {
            SessionStatus::Completed => return Ok(false),
            SessionStatus::Abandoned => return Err(SessionRuleError::Conflict(self.status)),
            SessionStatus::InProgress => {}
        }

        let (score, feedback) = grade(self);
        self.close(SessionStatus::Completed, finished_at, total_time, score, feedback);
        Ok(true)
    }

    /// Move to `Abandoned`, keeping whatever answers were recorded. `grade` works
    /// as in [`InterviewSession::complete`]. Returns `Ok(false)` if already abandoned.
    ///
    /// # Errors
    ///
    /// `Forbidden` for a foreign user, `Conflict` if the session was completed.
    pub fn abandon<F>(
        &mut self,
        user_id: UserId,
        finished_at: DateTime<Utc>,
        grade: F,
    ) -> Result<bool, SessionRuleError>
    where
        F: FnOnce(&Self) -> (u8, String),
    {
        self.ensure_owner(user_id)?;
        match self.status {
            SessionStatus::Abandoned => return Ok(false),
            SessionStatus::Completed => return Err(SessionRuleError::Conflict(self.status)),
            SessionStatus::InProgress => {}
        }

        let (score, feedback) = grade(self);
        self.close(SessionStatus::Abandoned, finished_at, None, score, feedback);
        Ok(true)
    }

    fn close(
        &mut self,
        status: SessionStatus,
        finished_at: DateTime<Utc>,
        total_time: Option<u32>,
        score: u8,
        feedback: String,
    ) {
        self.total_time = Some(total_time.unwrap_or_else(|| self.answered_time()));
        self.score = Some(score);
        self.feedback = Some(feedback);
        self.finished_at = Some(finished_at.max(self.started_at));
        self.status = status;
    }
}
