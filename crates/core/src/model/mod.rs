mod ids;
mod question;
mod session;
mod tag;

pub use ids::{ParseIdError, QuestionId, SessionId, UserId};

pub use question::{Difficulty, ParseDifficultyError, Question, QuestionDraft, QuestionError};
pub use session::{Answer, InterviewSession, SessionDraft, SessionRuleError, SessionStatus};
pub use tag::{TagError, TagName, normalize_tags};
