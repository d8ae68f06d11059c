use crate::error::AppServicesError;

/// Tunables for session creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Questions drawn when a request does not say how many.
    pub default_question_count: usize,
    /// Upper bound on a requested count.
    pub max_question_count: usize,
    /// Catalog field treated as relevant to every preferred field.
    pub universal_field: String,
    /// Fixed seed for question sampling. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_question_count: 5,
            max_question_count: 50,
            universal_field: "common".to_owned(),
            seed: None,
        }
    }
}

impl SessionConfig {
    /// # Errors
    ///
    /// Returns `AppServicesError::Config` if the counts are zero or inverted,
    /// or the universal field is blank.
    pub fn validate(self) -> Result<Self, AppServicesError> {
        if self.default_question_count == 0 {
            return Err(AppServicesError::Config(
                "default question count must be positive".into(),
            ));
        }
        if self.default_question_count > self.max_question_count {
            return Err(AppServicesError::Config(format!(
                "default question count {} exceeds maximum {}",
                self.default_question_count, self.max_question_count
            )));
        }
        if self.universal_field.trim().is_empty() {
            return Err(AppServicesError::Config("universal field cannot be blank".into()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_counts_are_rejected() {
        let config = SessionConfig {
            default_question_count: 10,
            max_question_count: 3,
            ..SessionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AppServicesError::Config(_))
        ));
    }
}
