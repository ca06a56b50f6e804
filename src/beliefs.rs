//! Beliefs the user tracks over time, with a history of how each one changed.

use crate::io::{self, keys, KeyValueStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BeliefError {
    #[error("Belief topic must not be empty")]
    EmptyTopic,

    #[error("Belief not found: {0}")]
    NotFound(Uuid),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeliefChange {
    pub from: String,
    pub to: String,
    pub changed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedBelief {
    pub id: Uuid,
    pub topic: String,
    pub initial_position: String,
    pub current_position: String,
    pub date_added: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<BeliefChange>,
}

impl TrackedBelief {
    /// Whether the current position differs from where the user started.
    pub fn has_evolved(&self) -> bool {
        self.current_position != self.initial_position
    }
}

/// Tracked beliefs, persisted under [`keys::TRACKED_BELIEFS`].
pub struct BeliefTracker {
    store: Arc<dyn KeyValueStore>,
    beliefs: Vec<TrackedBelief>,
}

impl BeliefTracker {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let beliefs = io::load_or_default(store.as_ref(), keys::TRACKED_BELIEFS);
        Self { store, beliefs }
    }

    pub fn beliefs(&self) -> &[TrackedBelief] {
        &self.beliefs
    }

    pub fn get(&self, id: Uuid) -> Option<&TrackedBelief> {
        self.beliefs.iter().find(|b| b.id == id)
    }

    pub fn history(&self, id: Uuid) -> Result<&[BeliefChange], BeliefError> {
        self.get(id)
            .map(|b| b.history.as_slice())
            .ok_or(BeliefError::NotFound(id))
    }

    /// Start tracking a belief. Returns its id.
    pub fn track(
        &mut self,
        topic: &str,
        initial_position: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, BeliefError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(BeliefError::EmptyTopic);
        }

        let belief = TrackedBelief {
            id: Uuid::new_v4(),
            topic: topic.to_string(),
            initial_position: initial_position.to_string(),
            current_position: initial_position.to_string(),
            date_added: now,
            last_updated: now,
            history: Vec::new(),
        };
        let id = belief.id;
        debug!(%id, topic, "Tracking belief");
        self.beliefs.push(belief);
        self.save();
        Ok(id)
    }

    /// Move a belief to `new_position`, recording the change.
    ///
    /// Returns `Ok(false)` when the position is unchanged.
    pub fn update_position(
        &mut self,
        id: Uuid,
        new_position: &str,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<bool, BeliefError> {
        let belief = self
            .beliefs
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(BeliefError::NotFound(id))?;

        if belief.current_position == new_position {
            return Ok(false);
        }

        belief.history.push(BeliefChange {
            from: std::mem::replace(&mut belief.current_position, new_position.to_string()),
            to: new_position.to_string(),
            changed_at: now,
            note: note.map(str::to_string),
        });
        belief.last_updated = now;
        debug!(%id, changes = belief.history.len(), "Belief position updated");

        self.save();
        Ok(true)
    }

    pub fn remove(&mut self, id: Uuid) -> Result<TrackedBelief, BeliefError> {
        let index = self
            .beliefs
            .iter()
            .position(|b| b.id == id)
            .ok_or(BeliefError::NotFound(id))?;
        let removed = self.beliefs.remove(index);
        self.save();
        Ok(removed)
    }

    fn save(&self) {
        io::persist(self.store.as_ref(), keys::TRACKED_BELIEFS, &self.beliefs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryStore;

    fn at(timestamp: &str) -> DateTime<Utc> {
        timestamp.parse().unwrap()
    }

    fn tracker() -> (Arc<MemoryStore>, BeliefTracker) {
        let store = Arc::new(MemoryStore::new());
        let tracker = BeliefTracker::load(store.clone());
        (store, tracker)
    }

    #[test]
    fn track_and_evolve() {
        let (_, mut tracker) = tracker();
        let id = tracker
            .track("Breakfast", "Most important meal", at("2024-01-15T10:00:00Z"))
            .unwrap();

        let changed = tracker
            .update_position(id, "Depends on the person", Some("read a study"), at("2024-02-01T10:00:00Z"))
            .unwrap();
        assert!(changed);

        let belief = tracker.get(id).unwrap();
        assert_eq!(belief.initial_position, "Most important meal");
        assert_eq!(belief.current_position, "Depends on the person");
        assert_eq!(belief.last_updated, at("2024-02-01T10:00:00Z"));
        assert_eq!(belief.date_added, at("2024-01-15T10:00:00Z"));
        assert!(belief.has_evolved());

        let history = tracker.history(id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].from, "Most important meal");
        assert_eq!(history[0].to, "Depends on the person");
        assert_eq!(history[0].note.as_deref(), Some("read a study"));
    }

    #[test]
    fn unchanged_position_is_noop() {
        let (_, mut tracker) = tracker();
        let now = at("2024-01-15T10:00:00Z");
        let id = tracker.track("Sugar", "Causes hyperactivity", now).unwrap();

        let changed = tracker
            .update_position(id, "Causes hyperactivity", None, at("2024-01-16T10:00:00Z"))
            .unwrap();

        assert!(!changed);
        assert!(tracker.history(id).unwrap().is_empty());
        assert_eq!(tracker.get(id).unwrap().last_updated, now);
    }

    #[test]
    fn empty_topic_rejected() {
        let (_, mut tracker) = tracker();
        let result = tracker.track("   ", "anything", at("2024-01-15T10:00:00Z"));
        assert_eq!(result, Err(BeliefError::EmptyTopic));
    }

    #[test]
    fn unknown_id() {
        let (_, mut tracker) = tracker();
        let id = Uuid::new_v4();
        let now = at("2024-01-15T10:00:00Z");

        assert_eq!(tracker.update_position(id, "x", None, now), Err(BeliefError::NotFound(id)));
        assert_eq!(tracker.remove(id), Err(BeliefError::NotFound(id)));
        assert!(tracker.history(id).is_err());
    }

    #[test]
    fn persisted_and_removable() {
        let (store, mut tracker) = tracker();
        let now = at("2024-01-15T10:00:00Z");
        let id = tracker.track("Vikings", "Horned helmets", now).unwrap();
        tracker.update_position(id, "No horns", None, now).unwrap();

        let reloaded = BeliefTracker::load(store.clone());
        assert_eq!(reloaded.beliefs(), tracker.beliefs());

        let removed = tracker.remove(id).unwrap();
        assert_eq!(removed.topic, "Vikings");
        assert!(BeliefTracker::load(store).beliefs().is_empty());
    }
}
