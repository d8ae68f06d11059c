use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::tag::normalize_tags;

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty: {raw}")]
pub struct ParseDifficultyError {
    raw: String,
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError { raw: s.to_owned() }),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Unvalidated question input, e.g. as read from a catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionDraft {
    pub title: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub field: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QuestionDraft {
    /// Validate the draft and assign it an identifier.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the title, category or field is blank.
    pub fn validate(self, id: QuestionId, now: DateTime<Utc>) -> Result<Question, QuestionError> {
        let title = non_blank(self.title, QuestionError::EmptyTitle)?;
        let category = non_blank(self.category, QuestionError::EmptyCategory)?;
        let field = non_blank(self.field, QuestionError::EmptyField)?;
        let company = self
            .company
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());

        Ok(Question {
            id,
            title,
            category,
            difficulty: self.difficulty,
            field,
            company,
            tags: normalize_tags(self.tags),
            created_at: now,
            updated_at: now,
        })
    }
}

fn non_blank(value: String, err: QuestionError) -> Result<String, QuestionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(err);
    }
    Ok(trimmed.to_owned())
}

/// A catalog question. Immutable once handed to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    id: QuestionId,
    title: String,
    category: String,
    difficulty: Difficulty,
    field: String,
    company: Option<String>,
    tags: BTreeSet<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// True if the question carries at least one of `wanted` (already normalized).
    #[must_use]
    pub fn has_any_tag(&self, wanted: &BTreeSet<String>) -> bool {
        !self.tags.is_disjoint(wanted)
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question title cannot be empty")]
    EmptyTitle,

    #[error("question category cannot be empty")]
    EmptyCategory,

    #[error("question field cannot be empty")]
    EmptyField,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft() -> QuestionDraft {
        QuestionDraft {
            title: "  Explain ownership ".into(),
            category: "language".into(),
            difficulty: Difficulty::Medium,
            field: "backend".into(),
            company: Some("  ".into()),
            tags: vec!["Rust".into(), "memory".into()],
        }
    }

    #[test]
    fn validate_trims_and_normalizes() {
        let q = draft().validate(QuestionId::new(1), fixed_now()).unwrap();
        assert_eq!(q.title(), "Explain ownership");
        assert_eq!(q.company(), None);
        assert!(q.tags().contains("rust"));
        assert_eq!(q.created_at(), fixed_now());
    }

    #[test]
    fn validate_rejects_blank_field() {
        let mut d = draft();
        d.field = " ".into();
        let err = d.validate(QuestionId::new(1), fixed_now()).unwrap_err();
        assert_eq!(err, QuestionError::EmptyField);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn has_any_tag_matches_intersection() {
        let q = draft().validate(QuestionId::new(1), fixed_now()).unwrap();
        let wanted: BTreeSet<String> = ["sql".to_string(), "memory".to_string()].into();
        assert!(q.has_any_tag(&wanted));
        let other: BTreeSet<String> = ["sql".to_string()].into();
        assert!(!q.has_any_tag(&other));
    }
}
