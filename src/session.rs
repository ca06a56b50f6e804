//! One process's worth of app state.
//!
//! A [`Session`] owns every tracker, all sharing one persistence port. It is
//! built once at startup and handed to whatever drives the UI.

use crate::beliefs::BeliefTracker;
use crate::config::{Config, ConfigError};
use crate::favorites::FavoritesStore;
use crate::io::{FileStore, KeyValueStore, MemoryStore};
use crate::journey::{JourneyTracker, DEFAULT_WEEKLY_GOAL};
use crate::progress::ProgressTracker;
use crate::settings::SettingsStore;
use crate::store::FactStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to open data directory: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Session {
    facts: FactStore,
    progress: ProgressTracker,
    journey: JourneyTracker,
    favorites: FavoritesStore,
    beliefs: BeliefTracker,
    settings: SettingsStore,
}

impl Session {
    /// Open the data directory from `config`, load facts and trackers, and
    /// register today's visit.
    pub fn open(config: &Config) -> Result<Self, SessionError> {
        config.validate()?;
        let store = FileStore::open_with_timeout(&config.data_dir, config.lock_timeout)?;
        let facts = match &config.facts_path {
            Some(path) => FactStore::load_from_path(path),
            None => FactStore::with_defaults(),
        };
        info!(data_dir = %config.data_dir.display(), facts = facts.len(), "Session opened");
        Ok(Self::assemble(Arc::new(store), facts, config.weekly_goal, Utc::now()))
    }

    /// A session backed by memory and the default facts.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), FactStore::with_defaults(), Utc::now())
    }

    /// A session over an existing store, visiting at `now`.
    pub fn with_store(store: Arc<dyn KeyValueStore>, facts: FactStore, now: DateTime<Utc>) -> Self {
        Self::assemble(store, facts, DEFAULT_WEEKLY_GOAL, now)
    }

    fn assemble(
        store: Arc<dyn KeyValueStore>,
        facts: FactStore,
        weekly_goal: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let mut journey = JourneyTracker::load(store.clone(), weekly_goal, now);
        journey.check_visit(now);

        Self {
            facts,
            progress: ProgressTracker::load(store.clone()),
            journey,
            favorites: FavoritesStore::load(store.clone()),
            beliefs: BeliefTracker::load(store.clone()),
            settings: SettingsStore::load(store),
        }
    }

    /// Mark `fact_id` discovered, counting it towards the journey the first time.
    ///
    /// Returns `false` for unknown ids and facts already discovered.
    pub fn discover(&mut self, fact_id: &str) -> bool {
        self.discover_at(fact_id, Utc::now())
    }

    pub fn discover_at(&mut self, fact_id: &str, now: DateTime<Utc>) -> bool {
        let Some(fact) = self.facts.get(fact_id) else {
            return false;
        };
        let is_new = self.progress.mark_discovered_at(&fact.id, &fact.category, now);
        if is_new {
            self.journey.record_discovery(now);
        }
        is_new
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn facts_mut(&mut self) -> &mut FactStore {
        &mut self.facts
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    pub fn journey(&self) -> &JourneyTracker {
        &self.journey
    }

    pub fn journey_mut(&mut self) -> &mut JourneyTracker {
        &mut self.journey
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    pub fn beliefs(&self) -> &BeliefTracker {
        &self.beliefs
    }

    pub fn beliefs_mut(&mut self) -> &mut BeliefTracker {
        &mut self.beliefs
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::CategoryState;
    use tempfile::TempDir;

    fn at(timestamp: &str) -> DateTime<Utc> {
        timestamp.parse().unwrap()
    }

    #[test]
    fn discover_updates_progress_and_journey_once() {
        let store = Arc::new(MemoryStore::new());
        let now = at("2024-01-15T08:00:00Z");
        let mut session = Session::with_store(store, FactStore::with_defaults(), now);
        let fact = session.facts().facts()[0].clone();

        assert!(session.discover_at(&fact.id, now));
        assert!(!session.discover_at(&fact.id, now));

        assert_eq!(session.progress().total_discovered(), 1);
        assert_eq!(session.journey().state().lifetime_discoveries, 1);
        let total = session.facts().count_in(&fact.category);
        assert_ne!(
            session.progress().category_state(&fact.category, total),
            CategoryState::Locked
        );
    }

    #[test]
    fn unknown_fact_is_ignored() {
        let mut session = Session::in_memory();
        assert!(!session.discover("no-such-fact"));
        assert_eq!(session.progress().total_discovered(), 0);
    }

    #[test]
    fn opening_registers_a_visit() {
        let session = Session::in_memory();
        assert_eq!(session.journey().state().current_streak, 1);
        assert!(session.journey().has_achievement("first_visit"));
    }

    #[test]
    fn file_backed_session_persists() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());

        {
            let mut session = Session::open(&config).unwrap();
            let fact = session.facts().facts()[0].clone();
            session.discover(&fact.id);
            session.favorites_mut().toggle(&fact);
            session.settings_mut().set_dark_mode(true);
        }

        let session = Session::open(&config).unwrap();
        assert_eq!(session.progress().total_discovered(), 1);
        assert_eq!(session.favorites().len(), 1);
        assert!(session.settings().settings().dark_mode);
        assert!(dir.path().join("journey_state.json").exists());
    }

    #[test]
    fn invalid_config_rejected() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            weekly_goal: 0,
            ..Config::new(dir.path())
        };
        assert!(matches!(Session::open(&config), Err(SessionError::Config(_))));
    }
}
