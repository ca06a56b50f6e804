//! Discovery progress per fact and per category.

use crate::io::{self, keys, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub discovered_fact_ids: BTreeSet<String>,
    pub last_access_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgress {
    pub discovered_facts: BTreeSet<String>,
    pub category_progress: BTreeMap<String, CategoryProgress>,
    pub last_access_date: Option<DateTime<Utc>>,
    pub last_discovery_date: Option<DateTime<Utc>>,
}

impl UserProgress {
    pub fn total_discovered(&self) -> usize {
        self.discovered_facts.len()
    }
}

/// Where a user stands in one category. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryState {
    Locked,
    InProgress { discovered: usize, total: usize },
    Completed,
}

impl CategoryState {
    /// Classify `discovered` out of `total` facts.
    pub fn classify(discovered: usize, total: usize) -> Self {
        let discovered = discovered.min(total);
        if discovered == 0 {
            CategoryState::Locked
        } else if discovered == total {
            CategoryState::Completed
        } else {
            CategoryState::InProgress { discovered, total }
        }
    }
}

/// Tracks which facts have been discovered, persisted under [`keys::USER_PROGRESS`].
pub struct ProgressTracker {
    store: Arc<dyn KeyValueStore>,
    progress: UserProgress,
}

impl ProgressTracker {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let progress = io::load_or_default(store.as_ref(), keys::USER_PROGRESS);
        Self { store, progress }
    }

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    /// Record `fact_id` as discovered in `category`.
    ///
    /// Idempotent apart from refreshing access dates. Returns `true` when
    /// the fact had not been discovered before.
    pub fn mark_discovered(&mut self, fact_id: &str, category: &str) -> bool {
        self.mark_discovered_at(fact_id, category, Utc::now())
    }

    pub fn mark_discovered_at(&mut self, fact_id: &str, category: &str, now: DateTime<Utc>) -> bool {
        let is_new = self.progress.discovered_facts.insert(fact_id.to_string());

        let entry = self
            .progress
            .category_progress
            .entry(category.to_string())
            .or_default();
        entry.discovered_fact_ids.insert(fact_id.to_string());
        entry.last_access_date = Some(now);

        self.progress.last_access_date = Some(now);
        if is_new {
            self.progress.last_discovery_date = Some(now);
            debug!(fact_id, category, total = self.progress.total_discovered(), "Fact discovered");
        }

        self.save();
        is_new
    }

    pub fn is_discovered(&self, fact_id: &str) -> bool {
        self.progress.discovered_facts.contains(fact_id)
    }

    pub fn total_discovered(&self) -> usize {
        self.progress.total_discovered()
    }

    pub fn discovered_in(&self, category: &str) -> usize {
        self.progress
            .category_progress
            .get(category)
            .map_or(0, |p| p.discovered_fact_ids.len())
    }

    pub fn category_state(&self, category: &str, total_facts_in_category: usize) -> CategoryState {
        CategoryState::classify(self.discovered_in(category), total_facts_in_category)
    }

    /// Fraction of `total` facts in `category` discovered, in `0.0..=1.0`.
    pub fn category_progress(&self, category: &str, total: usize) -> f64 {
        ratio(self.discovered_in(category), total)
    }

    /// Fraction of all `total_facts` discovered, in `0.0..=1.0`.
    pub fn overall_progress(&self, total_facts: usize) -> f64 {
        ratio(self.total_discovered(), total_facts)
    }

    pub fn reset(&mut self) {
        self.progress = UserProgress::default();
        self.save();
    }

    fn save(&self) {
        io::persist(self.store.as_ref(), keys::USER_PROGRESS, &self.progress);
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64).min(1.0)
}
