//! Category seeding and resolution.
//!
//! - `initialize` is the one-time seed step, run at process start (not from a read path)
//! - `resolve` maps a label to its canonical course or hobby

use crate::domain::{Category, CategoryCatalog, DomainError};
use crate::ports::CategoryRepo;
use std::sync::Arc;
use tracing::{debug, info};

pub struct CategoryService {
    repo: Arc<dyn CategoryRepo>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepo>) -> Self {
        Self { repo }
    }

    /// Seed courses and hobbies unless any category already exists.
    /// Returns how many categories were inserted (0 on every run after the first).
    pub async fn initialize(&self) -> Result<usize, DomainError> {
        let inserted = self.repo.seed_if_empty(&Category::seed_set()).await?;
        if inserted > 0 {
            info!(inserted, "seeded categories");
        } else {
            debug!("categories present, seeding skipped");
        }
        Ok(inserted)
    }

    /// Current catalog, read from storage on each call.
    pub async fn catalog(&self) -> Result<CategoryCatalog, DomainError> {
        let catalog = CategoryCatalog::new(self.repo.list_categories().await?);
        debug!(categories = catalog.len(), "category catalog loaded");
        Ok(catalog)
    }

    pub async fn resolve(&self, label: &str) -> Result<Category, DomainError> {
        self.catalog().await?.resolve(label).cloned()
    }

    pub async fn titles(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.catalog().await?.titles())
    }
}
