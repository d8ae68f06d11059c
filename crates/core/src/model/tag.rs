use std::collections::BTreeSet;

use thiserror::Error;

/// Validated tag name (trimmed, lower-cased, non-empty).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagName(String);

impl TagName {
    /// Create a validated tag name.
    ///
    /// # Errors
    ///
    /// Returns `TagError::EmptyName` if the name is empty after trimming.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TagError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TagError::EmptyName);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TagName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagError {
    #[error("tag name cannot be empty")]
    EmptyName,
}

/// Normalize raw tag strings into a set, dropping blanks and duplicates.
#[must_use]
pub fn normalize_tags<I, S>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|tag| TagName::new(tag).ok())
        .map(TagName::into_string)
        .collect()
}
