//! Saved facts, persisted under [`keys::FAVORITES`] as a JSON list.

use crate::io::{self, keys, KeyValueStore};
use crate::Fact;
use std::sync::Arc;
use tracing::debug;

pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    favorites: Vec<Fact>,
}

impl FavoritesStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut favorites: Vec<Fact> = io::load_or_default(store.as_ref(), keys::FAVORITES);

        // A hand-edited blob could carry duplicates; keep the first of each id
        let mut seen = std::collections::HashSet::new();
        favorites.retain(|f| seen.insert(f.id.clone()));

        Self { store, favorites }
    }

    /// Favorites in the order they were added.
    pub fn list(&self) -> &[Fact] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    pub fn contains(&self, fact_id: &str) -> bool {
        self.favorites.iter().any(|f| f.id == fact_id)
    }

    /// Add `fact` unless a fact with the same id is already saved.
    pub fn add(&mut self, fact: Fact) -> bool {
        if self.contains(&fact.id) {
            return false;
        }
        debug!(id = %fact.id, "Favorite added");
        self.favorites.push(fact);
        self.save();
        true
    }

    pub fn remove(&mut self, fact_id: &str) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != fact_id);
        if self.favorites.len() == before {
            return false;
        }
        debug!(id = fact_id, "Favorite removed");
        self.save();
        true
    }

    /// Add `fact` if absent, remove it if present. Returns whether it is now a favorite.
    pub fn toggle(&mut self, fact: &Fact) -> bool {
        if self.remove(&fact.id) {
            false
        } else {
            self.add(fact.clone())
        }
    }

    pub fn clear_all(&mut self) {
        self.favorites.clear();
        self.save();
    }

    fn save(&self) {
        io::persist(self.store.as_ref(), keys::FAVORITES, &self.favorites);
    }
}
