//! Core state for the Contrario app: contrarian facts, discovery progress,
//! streaks, levels and achievements, favorites, tracked beliefs, settings
//! and a Hacker News client.
//!
//! Each tracker owns a disjoint slice of persisted state and writes it
//! through a [`io::KeyValueStore`] right after every mutation. A
//! [`Session`] wires them together for one process.
//!
//! ```rust
//! use contrario_core::Session;
//!
//! let mut session = Session::in_memory();
//! let fact = session.facts_mut().random_fact("all").cloned().unwrap();
//! session.discover(&fact.id);
//! assert_eq!(session.progress().total_discovered(), 1);
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::hash::{Hash, Hasher};

pub mod beliefs;
pub mod category;
pub mod config;
pub mod favorites;
pub mod hn;
pub mod io;
pub mod journey;
pub mod progress;
pub mod session;
pub mod settings;
pub mod store;

#[cfg(feature = "tokio")]
mod async_store;

#[cfg(feature = "tokio")]
pub use async_store::try_load_facts_async;

pub use beliefs::{BeliefTracker, TrackedBelief};
pub use category::Category;
pub use config::Config;
pub use favorites::FavoritesStore;
pub use hn::HnClient;
pub use journey::{JourneyState, JourneyTracker};
pub use progress::{CategoryState, ProgressTracker};
pub use session::Session;
pub use settings::{Settings, SettingsStore};
pub use store::FactStore;

/// A short contrarian statement with its category, source and insight.
///
/// Identity is the `id` alone: two facts with the same id compare equal
/// even if their text differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    pub id: String,
    pub text: String,
    pub category: String,
    pub source: String,
    pub contrary_insight: String,
}

impl Fact {
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        category: impl Into<String>,
        source: impl Into<String>,
        contrary_insight: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: category.into(),
            source: source.into(),
            contrary_insight: contrary_insight.into(),
        }
    }

    /// Build a fact whose id is derived from its category and text.
    pub fn with_derived_id(
        text: impl Into<String>,
        category: impl Into<String>,
        source: impl Into<String>,
        contrary_insight: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let category = category.into();
        let id = content_id(&category, &text);
        Self::new(id, text, category, source, contrary_insight)
    }
}

impl PartialEq for Fact {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Fact {}

impl Hash for Fact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// First 16 hex chars of SHA-256 over `category \0 text`.
pub(crate) fn content_id(category: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(category.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::full(
        r#"{"id":"f1","text":"Bats are not blind","category":"animals","source":"Wiki","contraryInsight":"Most see well"}"#,
        Fact::new("f1", "Bats are not blind", "animals", "Wiki", "Most see well")
    )]
    fn deserialize(#[case] serialized: &str, #[case] expected: Fact) {
        let actual: Fact = serde_json::from_str(serialized).unwrap();
        assert_eq!(actual, expected);
        assert_eq!(actual.contrary_insight, expected.contrary_insight);
    }

    #[test]
    fn identity_is_by_id() {
        let a = Fact::new("same", "one text", "science", "", "");
        let b = Fact::new("same", "other text", "history", "", "");
        assert_eq!(a, b);
    }

    #[test]
    fn derived_id_is_stable_and_content_sensitive() {
        let a = Fact::with_derived_id("Glass is not a liquid", "science", "", "");
        let b = Fact::with_derived_id("Glass is not a liquid", "science", "other", "other");
        let c = Fact::with_derived_id("Glass is not a liquid", "history", "", "");

        assert_eq!(a.id, b.id);
        assert_ne!(a.id, c.id);
        assert_eq!(a.id.len(), 16);
    }
}
