use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use interview_core::model::{
    Answer, InterviewSession, Question, QuestionId, SessionDraft, SessionId, SessionRuleError,
    UserId,
};
use storage::repository::{QuestionCatalog, SessionRepository};

use super::sampler::{Sampler, SelectionCriteria};
use super::view::SessionView;
use crate::Clock;
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::scoring::AnswerScorer;

fn grade(scorer: &dyn AnswerScorer, session: &InterviewSession) -> (u8, String) {
    let answers: Vec<&Answer> = session.answers().collect();
    let score = scorer.aggregate(&answers).min(100);
    (score, scorer.summarize(answers.len(), score))
}

fn abandon_note(session: &InterviewSession) -> String {
    format!(
        "Session abandoned after answering {} of {} questions.",
        session.answered_count(),
        session.questions().len()
    )
}

fn rejected(session_id: SessionId, user_id: UserId, err: impl Into<SessionError>) -> SessionError {
    let err = err.into();
    match &err {
        SessionError::Forbidden => {
            warn!(%session_id, %user_id, "session access by non-owner rejected");
        }
        SessionError::Conflict { status } => {
            debug!(%session_id, %status, "change to terminal session rejected");
        }
        _ => {}
    }
    err
}

/// Drives the interview session lifecycle.
///
/// Never locks sessions itself: every read is one store call and every
/// change is a single `update_session` closure.
pub struct SessionManager {
    clock: Clock,
    config: SessionConfig,
    sessions: Arc<dyn SessionRepository>,
    catalog: Arc<dyn QuestionCatalog>,
    scorer: Arc<dyn AnswerScorer>,
    rng: Mutex<StdRng>,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        clock: Clock,
        config: SessionConfig,
        sessions: Arc<dyn SessionRepository>,
        catalog: Arc<dyn QuestionCatalog>,
        scorer: Arc<dyn AnswerScorer>,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            clock,
            config,
            sessions,
            catalog,
            scorer,
            rng: Mutex::new(rng),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Draw a question set for `criteria` without starting a session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidRequest` if the count exceeds the
    /// configured maximum, or `SessionError::Internal` on catalog failures.
    pub async fn sample_questions(
        &self,
        criteria: &SelectionCriteria,
    ) -> Result<Vec<Question>, SessionError> {
        let count = criteria
            .count
            .unwrap_or(self.config.default_question_count);
        if count > self.config.max_question_count {
            return Err(SessionError::InvalidRequest(format!(
                "count must be at most {}",
                self.config.max_question_count
            )));
        }

        let candidates = self
            .catalog
            .list_questions(&criteria.catalog_filter())
            .await?;
        let filters = criteria.sample_filters();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let selected = Sampler::new(&filters)
            .with_preferred_field(criteria.preferred_field.as_deref())
            .with_universal_field(&self.config.universal_field)
            .sample(&candidates, count, &mut *rng);
        debug!(candidates = candidates.len(), selected = selected.len(), "questions sampled");
        Ok(selected)
    }

    /// Sample questions and start a session owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidRequest` if the count exceeds the
    /// configured maximum, `SessionError::InvalidSelection` if nothing matches,
    /// or `SessionError::Internal` on storage failures.
    pub async fn create_session(
        &self,
        user_id: UserId,
        criteria: &SelectionCriteria,
    ) -> Result<InterviewSession, SessionError> {
        let selected = self.sample_questions(criteria).await?;
        if selected.is_empty() {
            debug!(%user_id, "no questions matched selection");
            return Err(SessionError::InvalidSelection);
        }

        let draft = SessionDraft::new(user_id, selected, self.clock.now())?;
        let session = self.sessions.create_session(draft).await?;
        info!(
            session_id = %session.id(),
            %user_id,
            questions = session.questions().len(),
            "interview session created"
        );
        Ok(session)
    }

    /// Ownership-checked read.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` for an unknown id and
    /// `SessionError::Forbidden` when `user_id` does not own the session.
    pub async fn get_session(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<SessionView, SessionError> {
        let session = self
            .sessions
            .get_session(session_id)
            .await?
            .ok_or(SessionError::NotFound)?;
        session
            .ensure_owner(user_id)
            .map_err(|e| rejected(session_id, user_id, e))?;
        Ok(SessionView::from_session(&session))
    }

    /// Every session owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Internal` on storage failures.
    pub async fn list_sessions(&self, user_id: UserId) -> Result<Vec<SessionView>, SessionError> {
        let sessions = self.sessions.list_sessions_by_user(user_id).await?;
        Ok(sessions.iter().rev().map(SessionView::from_session).collect())
    }

    /// Score and store an answer, replacing any earlier answer to the same question.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, `Conflict` once the session is terminal, or
    /// `InvalidQuestion` if `question_id` is not in the session.
    pub async fn record_answer(
        &self,
        session_id: SessionId,
        user_id: UserId,
        question_id: QuestionId,
        answer_text: String,
        time_spent_seconds: u32,
    ) -> Result<SessionView, SessionError> {
        let scorer = self.scorer.as_ref();
        let recorded_at = self.clock.now();

        let mut mutate = |session: &mut InterviewSession| -> Result<(), SessionRuleError> {
            let scored = {
                let question = session.answerable_question(user_id, question_id)?;
                scorer.score_answer(question, &answer_text, time_spent_seconds)
            };
            session.record_answer(
                user_id,
                Answer {
                    question_id,
                    answer_text: answer_text.clone(),
                    time_spent_seconds,
                    score: scored.score.min(100),
                    feedback: scored.feedback,
                    recorded_at,
                },
            )
        };

        let session = self
            .sessions
            .update_session(session_id, &mut mutate)
            .await
            .map_err(|e| rejected(session_id, user_id, e))?;
        debug!(
            %session_id,
            %question_id,
            answered = session.answered_count(),
            "answer recorded"
        );
        Ok(SessionView::from_session(&session))
    }

    /// Complete the session. Finishing an already completed session returns it
    /// unchanged.
    ///
    /// `total_time` defaults to the sum of the recorded answer times.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, or `Conflict` if the session was abandoned.
    pub async fn finish_session(
        &self,
        session_id: SessionId,
        user_id: UserId,
        total_time: Option<u32>,
    ) -> Result<SessionView, SessionError> {
        let scorer = self.scorer.as_ref();
        let finished_at = self.clock.now();
        let mut transitioned = false;

        let mut mutate = |session: &mut InterviewSession| -> Result<(), SessionRuleError> {
            transitioned =
                session.complete(user_id, finished_at, total_time, |s| grade(scorer, s))?;
            Ok(())
        };

        let session = self
            .sessions
            .update_session(session_id, &mut mutate)
            .await
            .map_err(|e| rejected(session_id, user_id, e))?;
        if transitioned {
            info!(
                %session_id,
                score = session.score().unwrap_or_default(),
                answered = session.answered_count(),
                "interview session completed"
            );
        } else {
            debug!(%session_id, "session already completed");
        }
        Ok(SessionView::from_session(&session))
    }

    /// Give up on an in-progress session, keeping the answers recorded so far.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Forbidden`, or `Conflict` if the session was completed.
    pub async fn abandon_session(
        &self,
        session_id: SessionId,
        user_id: UserId,
    ) -> Result<SessionView, SessionError> {
        let scorer = self.scorer.as_ref();
        let finished_at = self.clock.now();
        let mut transitioned = false;

        let mut mutate = |session: &mut InterviewSession| -> Result<(), SessionRuleError> {
            transitioned = session.abandon(user_id, finished_at, |s| {
                (grade(scorer, s).0, abandon_note(s))
            })?;
            Ok(())
        };

        let session = self
            .sessions
            .update_session(session_id, &mut mutate)
            .await
            .map_err(|e| rejected(session_id, user_id, e))?;
        if transitioned {
            info!(%session_id, answered = session.answered_count(), "interview session abandoned");
        }
        Ok(SessionView::from_session(&session))
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
