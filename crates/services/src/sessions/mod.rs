mod manager;
mod requests;
mod sampler;
mod view;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use manager::SessionManager;
pub use requests::{
    CreateSessionRequest, FinishSessionRequest, MAX_ANSWER_CHARS, MAX_TIME_SPENT_SECONDS,
    RecordAnswerRequest,
};
pub use sampler::{SampleFilters, Sampler, SelectionCriteria};
pub use view::{SessionProgress, SessionSummary, SessionView};
