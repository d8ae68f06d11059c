use std::sync::Arc;

use interview_core::model::{QuestionDraft, QuestionId};
use storage::repository::{QuestionCatalog, Storage};

use crate::Clock;
use crate::config::SessionConfig;
use crate::error::AppServicesError;
use crate::scoring::AnswerScorer;
use crate::sessions::SessionManager;

/// Process-wide service graph. Built once at startup and shared by handlers.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    catalog: Arc<dyn QuestionCatalog>,
    sessions: Arc<SessionManager>,
}

impl AppServices {
    /// Wire the session manager over the given storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Config` if `config` is invalid.
    pub fn new(
        storage: &Storage,
        clock: Clock,
        config: SessionConfig,
        scorer: Arc<dyn AnswerScorer>,
    ) -> Result<Self, AppServicesError> {
        let config = config.validate()?;
        let sessions = Arc::new(SessionManager::new(
            clock,
            config,
            Arc::clone(&storage.sessions),
            Arc::clone(&storage.questions),
            scorer,
        ));
        Ok(Self {
            clock,
            catalog: Arc::clone(&storage.questions),
            sessions,
        })
    }

    /// Services over fresh in-memory storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Config` if `config` is invalid.
    pub fn in_memory(
        clock: Clock,
        config: SessionConfig,
        scorer: Arc<dyn AnswerScorer>,
    ) -> Result<Self, AppServicesError> {
        Self::new(&Storage::in_memory(), clock, config, scorer)
    }

    /// Load questions into the catalog, numbering them from 1 in input order.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Question` for an invalid draft or
    /// `AppServicesError::Storage` if the catalog rejects a write.
    pub async fn seed_questions(
        &self,
        drafts: impl IntoIterator<Item = QuestionDraft>,
    ) -> Result<usize, AppServicesError> {
        let now = self.clock.now();
        let mut seeded = 0_u64;
        for draft in drafts {
            seeded += 1;
            let question = draft.validate(QuestionId::new(seeded), now)?;
            self.catalog.upsert_question(question).await?;
        }
        Ok(usize::try_from(seeded).unwrap_or(usize::MAX))
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionManager> {
        Arc::clone(&self.sessions)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<dyn QuestionCatalog> {
        Arc::clone(&self.catalog)
    }
}
