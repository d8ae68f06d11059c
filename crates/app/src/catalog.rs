use std::path::Path;

use interview_core::model::{Difficulty, QuestionDraft};

/// Read a JSON array of question drafts.
pub fn load(path: &Path) -> Result<Vec<QuestionDraft>, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let drafts: Vec<QuestionDraft> = serde_json::from_str(&raw)
        .map_err(|e| format!("invalid catalog {}: {e}", path.display()))?;
    Ok(drafts)
}

fn draft(
    title: &str,
    category: &str,
    difficulty: Difficulty,
    field: &str,
    tags: &[&str],
) -> QuestionDraft {
    QuestionDraft {
        title: title.to_owned(),
        category: category.to_owned(),
        difficulty,
        field: field.to_owned(),
        company: None,
        tags: tags.iter().map(|t| (*t).to_owned()).collect(),
    }
}

/// Small built-in catalog used when no file is given.
pub fn builtin() -> Vec<QuestionDraft> {
    vec![
        draft(
            "Tell me about a time you disagreed with a teammate.",
            "behavioral",
            Difficulty::Easy,
            "common",
            &["communication"],
        ),
        draft(
            "Describe a project you are proud of and your role in it.",
            "behavioral",
            Difficulty::Easy,
            "common",
            &["ownership"],
        ),
        draft(
            "How would you design a URL shortener?",
            "system-design",
            Difficulty::Medium,
            "backend",
            &["scaling", "storage"],
        ),
        draft(
            "Explain the difference between optimistic and pessimistic locking.",
            "technical",
            Difficulty::Medium,
            "backend",
            &["databases", "concurrency"],
        ),
        draft(
            "How do you find and fix a slow SQL query?",
            "technical",
            Difficulty::Hard,
            "backend",
            &["databases", "performance"],
        ),
        draft(
            "What happens between typing a URL and the page rendering?",
            "technical",
            Difficulty::Medium,
            "frontend",
            &["browser", "networking"],
        ),
        draft(
            "How would you keep a large list view responsive?",
            "technical",
            Difficulty::Hard,
            "frontend",
            &["performance"],
        ),
        draft(
            "How do you decide between a feature store and ad-hoc features?",
            "technical",
            Difficulty::Hard,
            "data",
            &["ml", "storage"],
        ),
    ]
}
