use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};

use interview_core::model::{Difficulty, Question, QuestionId, normalize_tags};
use storage::repository::QuestionFilter;

/// What a caller asks for when starting a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionCriteria {
    /// Number of questions; the configured default when absent.
    pub count: Option<usize>,
    pub field: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub company: Option<String>,
    /// A question matches if it carries at least one of these.
    pub tags: Vec<String>,
    pub exclude_ids: Vec<QuestionId>,
    /// Draw from this field (and the universal one) first. Ignored when `field` is set.
    pub preferred_field: Option<String>,
}

impl SelectionCriteria {
    /// Exact-match part of the criteria, pushed down to the catalog.
    #[must_use]
    pub fn catalog_filter(&self) -> QuestionFilter {
        QuestionFilter {
            field: self.field.clone(),
            category: self.category.clone(),
            difficulty: self.difficulty,
            company: self.company.clone(),
        }
    }

    #[must_use]
    pub fn sample_filters(&self) -> SampleFilters {
        SampleFilters {
            exact: self.catalog_filter(),
            tags: normalize_tags(&self.tags),
            exclude: self.exclude_ids.iter().copied().collect(),
        }
    }
}

/// Hard filters applied before any draw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleFilters {
    pub exact: QuestionFilter,
    pub tags: BTreeSet<String>,
    pub exclude: HashSet<QuestionId>,
}

impl SampleFilters {
    #[must_use]
    pub fn matches(&self, question: &Question) -> bool {
        !self.exclude.contains(&question.id())
            && self.exact.matches(question)
            && (self.tags.is_empty() || question.has_any_tag(&self.tags))
    }
}

/// Draws questions without replacement.
///
/// Pure: the random source is supplied by the caller and `candidates` is
/// never modified.
pub struct Sampler<'a> {
    filters: &'a SampleFilters,
    preferred_field: Option<&'a str>,
    universal_field: &'a str,
}

impl<'a> Sampler<'a> {
    #[must_use]
    pub fn new(filters: &'a SampleFilters) -> Self {
        Self {
            filters,
            preferred_field: None,
            universal_field: "common",
        }
    }

    /// Prefer questions from `field` or the universal field. Has no effect when
    /// the filters already pin a field.
    #[must_use]
    pub fn with_preferred_field(mut self, field: Option<&'a str>) -> Self {
        self.preferred_field = field.map(str::trim).filter(|f| !f.is_empty());
        self
    }

    #[must_use]
    pub fn with_universal_field(mut self, field: &'a str) -> Self {
        self.universal_field = field;
        self
    }

    fn is_preferred(&self, preferred: &str, question: &Question) -> bool {
        question.field() == preferred || question.field() == self.universal_field
    }

    /// Select `min(count, pool)` questions.
    ///
    /// When every filtered candidate is taken they come back in their original
    /// order. Otherwise each preference tier is shuffled and the preferred tier
    /// is drawn first.
    pub fn sample<R>(&self, candidates: &[Question], count: usize, rng: &mut R) -> Vec<Question>
    where
        R: Rng + ?Sized,
    {
        let pool: Vec<&Question> = candidates
            .iter()
            .filter(|q| self.filters.matches(q))
            .collect();

        if count >= pool.len() {
            return pool.into_iter().cloned().collect();
        }

        let preferred = self
            .preferred_field
            .filter(|_| self.filters.exact.field.is_none());

        let mut ordered = match preferred {
            Some(field) => {
                let (mut first, mut rest): (Vec<&Question>, Vec<&Question>) =
                    pool.into_iter().partition(|q| self.is_preferred(field, q));
                first.shuffle(rng);
                rest.shuffle(rng);
                first.extend(rest);
                first
            }
            None => {
                let mut all = pool;
                all.shuffle(rng);
                all
            }
        };

        ordered.truncate(count);
        ordered.into_iter().cloned().collect()
    }
}
