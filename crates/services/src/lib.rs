#![forbid(unsafe_code)]

pub mod app_services;
pub mod config;
pub mod error;
pub mod scoring;
pub mod sessions;

pub use interview_core::Clock;

pub use app_services::AppServices;
pub use config::SessionConfig;
pub use error::{AppServicesError, SessionError};
pub use scoring::{AnswerScore, AnswerScorer, FixedScorer, PlaceholderScorer};

pub use sessions::{
    CreateSessionRequest, FinishSessionRequest, RecordAnswerRequest, SelectionCriteria,
    SessionManager, SessionView,
};
