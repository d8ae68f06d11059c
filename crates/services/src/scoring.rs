//! Answer scoring strategies.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use interview_core::model::{Answer, Question};

const PLACEHOLDER_FEEDBACK: &str =
    "Good effort! Keep practicing to sharpen the structure and depth of your answers.";

/// Score and feedback for a single answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerScore {
    pub score: u8,
    pub feedback: String,
}

/// Grades answers and whole sessions.
///
/// Implementations run inside the session store's critical section, so
/// `score_answer` must be synchronous and quick.
pub trait AnswerScorer: Send + Sync {
    /// Score one answer. The score is clamped to `0..=100` by callers.
    fn score_answer(
        &self,
        question: &Question,
        answer_text: &str,
        time_spent_seconds: u32,
    ) -> AnswerScore;

    /// Session score from its per-answer scores.
    fn aggregate(&self, answers: &[&Answer]) -> u8 {
        aggregate_scores(answers.iter().map(|a| a.score))
    }

    /// Session-level feedback.
    fn summarize(&self, answered_count: usize, aggregate_score: u8) -> String {
        summary_feedback(answered_count, aggregate_score)
    }
}

/// Mean of `scores`, rounded half up; `0` for no scores.
#[must_use]
pub fn aggregate_scores(scores: impl IntoIterator<Item = u8>) -> u8 {
    let (sum, count) = scores
        .into_iter()
        .fold((0_u64, 0_u64), |(sum, count), s| (sum + u64::from(s), count + 1));
    if count == 0 {
        return 0;
    }
    let rounded = (2 * sum + count) / (2 * count);
    u8::try_from(rounded).unwrap_or(u8::MAX)
}

/// Tiered feedback for a finished session.
#[must_use]
pub fn summary_feedback(answered_count: usize, aggregate_score: u8) -> String {
    if answered_count == 0 {
        return "No answers were recorded for this session.".to_owned();
    }
    let verdict = match aggregate_score {
        90.. => "Excellent work! You're well prepared.",
        80..=89 => "Good job! A little more polish and you'll be ready.",
        70..=79 => "Fair attempt. Review the weaker answers and try again.",
        _ => "Needs improvement. Focus on the fundamentals and practice more.",
    };
    let noun = if answered_count == 1 { "question" } else { "questions" };
    format!(
        "{verdict} You answered {answered_count} {noun} with an average score of {aggregate_score}."
    )
}

/// Stand-in grader: a uniform score in `70..=100` and a fixed encouragement.
pub struct PlaceholderScorer {
    rng: Mutex<StdRng>,
}

impl PlaceholderScorer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible scores for tests and demos.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for PlaceholderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerScorer for PlaceholderScorer {
    fn score_answer(
        &self,
        _question: &Question,
        _answer_text: &str,
        _time_spent_seconds: u32,
    ) -> AnswerScore {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        AnswerScore {
            score: rng.random_range(70..=100),
            feedback: PLACEHOLDER_FEEDBACK.to_owned(),
        }
    }
}

/// Deterministic grader that gives every answer the same result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedScorer {
    score: u8,
    feedback: String,
}

impl FixedScorer {
    #[must_use]
    pub fn new(score: u8, feedback: impl Into<String>) -> Self {
        Self {
            score: score.min(100),
            feedback: feedback.into(),
        }
    }
}

impl AnswerScorer for FixedScorer {
    fn score_answer(
        &self,
        _question: &Question,
        _answer_text: &str,
        _time_spent_seconds: u32,
    ) -> AnswerScore {
        AnswerScore {
            score: self.score,
            feedback: self.feedback.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::model::{Difficulty, QuestionDraft, QuestionId};
    use interview_core::time::fixed_now;

    fn question() -> Question {
        QuestionDraft {
            title: "Design a rate limiter".into(),
            category: "system-design".into(),
            difficulty: Difficulty::Hard,
            field: "backend".into(),
            company: None,
            tags: Vec::new(),
        }
        .validate(QuestionId::new(1), fixed_now())
        .unwrap()
    }

    #[test]
    fn aggregate_rounds_to_nearest() {
        assert_eq!(aggregate_scores(Vec::<u8>::new()), 0);
        assert_eq!(aggregate_scores([80, 85]), 83);
        assert_eq!(aggregate_scores([80, 81]), 81);
        assert_eq!(aggregate_scores([100, 100, 99]), 100);
        assert_eq!(aggregate_scores([70, 71, 71]), 71);
    }

    #[test]
    fn summary_feedback_is_tiered() {
        assert!(summary_feedback(3, 95).starts_with("Excellent"));
        assert!(summary_feedback(3, 90).starts_with("Excellent"));
        assert!(summary_feedback(3, 80).starts_with("Good"));
        assert!(summary_feedback(3, 70).starts_with("Fair"));
        assert!(summary_feedback(3, 69).starts_with("Needs improvement"));
        assert!(summary_feedback(1, 75).contains("1 question with"));
        assert_eq!(
            summary_feedback(0, 0),
            "No answers were recorded for this session."
        );
    }

    #[test]
    fn placeholder_scores_stay_in_range_and_repeat_under_seed() {
        let a = PlaceholderScorer::seeded(7);
        let b = PlaceholderScorer::seeded(7);
        let q = question();
        for _ in 0..50 {
            let sa = a.score_answer(&q, "answer", 10);
            let sb = b.score_answer(&q, "answer", 10);
            assert!((70..=100).contains(&sa.score));
            assert_eq!(sa, sb);
        }
    }

    #[test]
    fn fixed_scorer_clamps_and_repeats() {
        let scorer = FixedScorer::new(250, "ok");
        let score = scorer.score_answer(&question(), "", 0);
        assert_eq!(score.score, 100);
        assert_eq!(score.feedback, "ok");
    }
}
