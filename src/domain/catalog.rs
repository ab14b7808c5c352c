//! Category resolution: free-text label -> canonical course or hobby.

use super::entities::{Category, CategoryKind};
use super::errors::DomainError;
use std::collections::HashMap;

/// Title-keyed lookup over the seeded categories.
///
/// Courses are indexed first; a hobby sharing a course title is never reachable
/// by label, so the course always wins the tie-break.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    ordered: Vec<Category>,
    by_title: HashMap<String, usize>,
}

impl CategoryCatalog {
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Self {
        let mut ordered: Vec<Category> = categories.into_iter().collect();
        // Stable: keeps seed order inside each kind.
        ordered.sort_by_key(|c| c.kind);

        let mut by_title = HashMap::with_capacity(ordered.len());
        for (idx, category) in ordered.iter().enumerate() {
            by_title.entry(category.title.clone()).or_insert(idx);
        }
        Self { ordered, by_title }
    }

    /// Exact, case-sensitive match against seeded titles.
    pub fn resolve(&self, label: &str) -> Result<&Category, DomainError> {
        self.by_title
            .get(label)
            .and_then(|&idx| self.ordered.get(idx))
            .ok_or_else(|| DomainError::CategoryNotFound(label.to_string()))
    }

    /// All titles, courses first, for pickers and filters.
    pub fn titles(&self) -> Vec<String> {
        self.ordered.iter().map(|c| c.title.clone()).collect()
    }

    pub fn of_kind(&self, kind: CategoryKind) -> impl Iterator<Item = &Category> {
        self.ordered.iter().filter(move |c| c.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
