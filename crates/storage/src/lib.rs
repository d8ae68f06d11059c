#![forbid(unsafe_code)]

pub mod repository;

pub use repository::{
    InMemoryRepository, QuestionCatalog, QuestionFilter, SessionMutation, SessionRepository,
    Storage, StorageError,
};
