use async_trait::async_trait;
use interview_core::model::{
    Difficulty, InterviewSession, Question, QuestionId, SessionDraft, SessionId, SessionRuleError,
    UserId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    /// The mutation passed to `update_session` refused to apply.
    #[error(transparent)]
    Rejected(#[from] SessionRuleError),

    #[error("lock poisoned: {0}")]
    Lock(String),
}

impl<T> From<PoisonError<T>> for StorageError {
    fn from(err: PoisonError<T>) -> Self {
        StorageError::Lock(err.to_string())
    }
}

/// Mutation applied to a session inside the store's critical section.
///
/// Returning an error discards every change the closure made.
pub type SessionMutation<'a> =
    &'a mut (dyn FnMut(&mut InterviewSession) -> Result<(), SessionRuleError> + Send);

/// Keyed storage for interview sessions. The only place sessions change.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Assign the next session id and store the draft.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the session cannot be stored.
    async fn create_session(&self, draft: SessionDraft) -> Result<InterviewSession, StorageError>;

    /// Fetch a snapshot of a session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures. A missing id is `Ok(None)`.
    async fn get_session(&self, id: SessionId) -> Result<Option<InterviewSession>, StorageError>;

    /// Apply `mutate` atomically and return the resulting snapshot.
    ///
    /// Concurrent updates of the same id are serialized; the mutation always
    /// sees the latest committed state.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` for an unknown id and
    /// `StorageError::Rejected` if the mutation fails.
    async fn update_session(
        &self,
        id: SessionId,
        mutate: SessionMutation<'_>,
    ) -> Result<InterviewSession, StorageError>;

    /// Snapshots of every session owned by `user_id`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_sessions_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<InterviewSession>, StorageError>;
}

/// Exact-match filter understood by the question catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilter {
    pub field: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub company: Option<String>,
}

impl QuestionFilter {
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        self.field.as_deref().is_none_or(|f| f == question.field())
            && self.category.as_deref().is_none_or(|c| c == question.category())
            && self.difficulty.is_none_or(|d| d == question.difficulty())
            && self
                .company
                .as_deref()
                .is_none_or(|c| question.company() == Some(c))
    }
}

/// Read access to the question catalog.
#[async_trait]
pub trait QuestionCatalog: Send + Sync {
    /// Questions matching `filter`, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures. A missing id is `Ok(None)`.
    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError>;

    /// Insert or replace a question. Used for seeding; editing flows live elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: Question) -> Result<(), StorageError>;
}

/// Slot locks recover from poisoning: a panicking mutation only ever touched
/// the working copy.
type SessionSlot = Arc<Mutex<InterviewSession>>;

/// In-memory repository for tests and single-process deployments.
///
/// The session map lock is held only to find or insert a slot; each session
/// has its own mutex so updates on different ids do not contend.
#[derive(Clone)]
pub struct InMemoryRepository {
    next_session_id: Arc<AtomicU64>,
    sessions: Arc<RwLock<HashMap<SessionId, SessionSlot>>>,
    questions: Arc<RwLock<BTreeMap<QuestionId, Question>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_session_id: Arc::new(AtomicU64::new(1)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            questions: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    fn slot(&self, id: SessionId) -> Result<Option<SessionSlot>, StorageError> {
        let guard = self.sessions.read()?;
        Ok(guard.get(&id).map(Arc::clone))
    }

    fn all_slots(&self) -> Result<Vec<SessionSlot>, StorageError> {
        let guard = self.sessions.read()?;
        Ok(guard.values().map(Arc::clone).collect())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn create_session(&self, draft: SessionDraft) -> Result<InterviewSession, StorageError> {
        let id = SessionId::new(self.next_session_id.fetch_add(1, Ordering::Relaxed));
        let session = draft.assign_id(id);
        let mut guard = self.sessions.write()?;
        guard.insert(id, Arc::new(Mutex::new(session.clone())));
        Ok(session)
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<InterviewSession>, StorageError> {
        let Some(slot) = self.slot(id)? else {
            return Ok(None);
        };
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Some(guard.clone()))
    }

    async fn update_session(
        &self,
        id: SessionId,
        mutate: SessionMutation<'_>,
    ) -> Result<InterviewSession, StorageError> {
        let slot = self.slot(id)?.ok_or(StorageError::NotFound)?;
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

        let mut working = guard.clone();
        mutate(&mut working)?;
        if working != *guard {
            working.advance_version();
            *guard = working;
        }
        Ok(guard.clone())
    }

    async fn list_sessions_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<InterviewSession>, StorageError> {
        let mut found = Vec::new();
        for slot in self.all_slots()? {
            let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            if guard.user_id() == user_id {
                found.push(guard.clone());
            }
        }
        found.sort_by_key(InterviewSession::id);
        Ok(found)
    }
}

#[async_trait]
impl QuestionCatalog for InMemoryRepository {
    async fn list_questions(&self, filter: &QuestionFilter) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.read()?;
        Ok(guard.values().filter(|q| filter.matches(q)).cloned().collect())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let guard = self.questions.read()?;
        Ok(guard.get(&id).cloned())
    }

    async fn upsert_question(&self, question: Question) -> Result<(), StorageError> {
        let mut guard = self.questions.write()?;
        guard.insert(question.id(), question);
        Ok(())
    }
}

/// Repository handles behind trait objects, built once at startup and shared.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionRepository>,
    pub questions: Arc<dyn QuestionCatalog>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionCatalog> = Arc::new(repo);
        Self {
            sessions,
            questions,
        }
    }
}
