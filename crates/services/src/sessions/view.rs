use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use interview_core::model::{
    Answer, InterviewSession, Question, QuestionId, SessionId, SessionStatus, UserId,
};

/// Answer-trail totals for a session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub total_questions: usize,
    pub total_time_spent: u32,
    /// Seconds per recorded answer; `0` when nothing was answered.
    pub average_time_per_answer: f64,
    pub answers: Vec<Answer>,
}

/// Aggregated view of session progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
}

/// Read model handed back to callers for every session operation.
///
/// Built from a store snapshot, so two views of the same unchanged session
/// serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub user_id: UserId,
    pub status: SessionStatus,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub questions: Vec<Question>,
    pub score: Option<u8>,
    pub feedback: Option<String>,
    pub total_time: Option<u32>,
    pub per_question_time: BTreeMap<QuestionId, u32>,
    pub summary: SessionSummary,
    pub progress: SessionProgress,
}

impl SessionView {
    #[must_use]
    pub fn from_session(session: &InterviewSession) -> Self {
        let answers: Vec<Answer> = session.answers().cloned().collect();
        let total_time_spent = session.answered_time();
        let average_time_per_answer = if answers.is_empty() {
            0.0
        } else {
            f64::from(total_time_spent) / answers.len() as f64
        };
        let total = session.questions().len();
        let answered = answers.len();

        Self {
            id: session.id(),
            user_id: session.user_id(),
            status: session.status(),
            is_completed: session.is_completed(),
            created_at: session.started_at(),
            finished_at: session.finished_at(),
            questions: session.questions().to_vec(),
            score: session.score(),
            feedback: session.feedback().map(str::to_owned),
            total_time: session.total_time(),
            per_question_time: session.per_question_time(),
            summary: SessionSummary {
                total_questions: total,
                total_time_spent,
                average_time_per_answer,
                answers,
            },
            progress: SessionProgress {
                total,
                answered,
                remaining: total.saturating_sub(answered),
            },
        }
    }
}

impl From<&InterviewSession> for SessionView {
    fn from(session: &InterviewSession) -> Self {
        Self::from_session(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::model::{Difficulty, QuestionDraft, SessionDraft};
    use interview_core::time::fixed_now;

    fn session() -> InterviewSession {
        let questions = (1..=3)
            .map(|id| {
                QuestionDraft {
                    title: format!("Q{id}"),
                    category: "behavioral".into(),
                    difficulty: Difficulty::Easy,
                    field: "common".into(),
                    company: None,
                    tags: Vec::new(),
                }
                .validate(QuestionId::new(id), fixed_now())
                .unwrap()
            })
            .collect();
        SessionDraft::new(UserId::new(1), questions, fixed_now())
            .unwrap()
            .assign_id(SessionId::new(4))
    }

    fn answer(qid: u64, secs: u32) -> Answer {
        Answer {
            question_id: QuestionId::new(qid),
            answer_text: "because".into(),
            time_spent_seconds: secs,
            score: 80,
            feedback: String::new(),
            recorded_at: fixed_now(),
        }
    }

    #[test]
    fn empty_session_has_zero_average() {
        let view = SessionView::from_session(&session());
        assert_eq!(view.summary.total_questions, 3);
        assert_eq!(view.summary.average_time_per_answer, 0.0);
        assert_eq!(view.progress.remaining, 3);
        assert!(!view.is_completed);
        assert_eq!(view.created_at, fixed_now());
    }

    #[test]
    fn summary_reflects_answers() {
        let mut s = session();
        s.record_answer(UserId::new(1), answer(1, 30)).unwrap();
        s.record_answer(UserId::new(1), answer(3, 45)).unwrap();

        let view = SessionView::from(&s);
        assert_eq!(view.summary.total_time_spent, 75);
        assert_eq!(view.summary.average_time_per_answer, 37.5);
        assert_eq!(view.summary.answers.len(), 2);
        assert_eq!(view.per_question_time.get(&QuestionId::new(3)), Some(&45));
        assert_eq!(
            view.progress,
            SessionProgress {
                total: 3,
                answered: 2,
                remaining: 1
            }
        );
    }
}
