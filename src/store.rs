//! The fact catalogue.
//!
//! Facts come from a bundled JSON file when one is available and valid,
//! otherwise from a hardcoded default set. Loading never fails: every
//! problem with the file is logged and answered with the defaults.

use crate::category::{self, Category};
use crate::Fact;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub const MAX_TEXT_CHARS: usize = 1000;
pub const MAX_INSIGHT_CHARS: usize = 500;
pub const MAX_SOURCE_CHARS: usize = 200;

/// How many random draws are tried before a repeat of the current fact is
/// resolved by choosing among the other candidates.
pub const MAX_REPEAT_ATTEMPTS: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Fact file contained no valid facts ({rejected} rejected)")]
    Empty { rejected: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidFact {
    #[error("text is empty")]
    EmptyText,

    #[error("category is empty")]
    EmptyCategory,

    #[error("{field} is {len} chars, max {max}")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

/// Check a fact against the content rules.
///
/// | Field | Constraint |
/// |-------|------------|
/// | `text` | Non-blank, max 1000 chars |
/// | `category` | Non-blank |
/// | `contrary_insight` | Max 500 chars |
/// | `source` | Max 200 chars |
pub fn validate_fact(fact: &Fact) -> Result<(), InvalidFact> {
    if fact.text.trim().is_empty() {
        return Err(InvalidFact::EmptyText);
    }
    if fact.category.trim().is_empty() {
        return Err(InvalidFact::EmptyCategory);
    }

    for (field, value, max) in [
        ("text", &fact.text, MAX_TEXT_CHARS),
        ("contrary_insight", &fact.contrary_insight, MAX_INSIGHT_CHARS),
        ("source", &fact.source, MAX_SOURCE_CHARS),
    ] {
        let len = value.chars().count();
        if len > max {
            return Err(InvalidFact::TooLong { field, len, max });
        }
    }

    Ok(())
}

/// One entry of the facts file. `id` is optional and derived from content when absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FactEntry {
    #[serde(default)]
    id: Option<String>,
    text: String,
    category: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    contrary_insight: String,
}

impl FactEntry {
    fn into_fact(self) -> Fact {
        match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Fact::new(id, self.text, self.category, self.source, self.contrary_insight),
            None => {
                Fact::with_derived_id(self.text, self.category, self.source, self.contrary_insight)
            }
        }
    }
}

/// Decode and validate a facts file, dropping invalid entries and duplicate ids.
pub(crate) fn parse_facts(bytes: &[u8]) -> Result<Vec<Fact>, StoreError> {
    let entries: Vec<FactEntry> = serde_json::from_slice(bytes)?;
    let total = entries.len();

    let mut seen = HashSet::new();
    let mut facts = Vec::with_capacity(total);
    for fact in entries.into_iter().map(FactEntry::into_fact) {
        if let Err(reason) = validate_fact(&fact) {
            debug!(id = %fact.id, %reason, "Dropping invalid fact");
            continue;
        }
        if !seen.insert(fact.id.clone()) {
            debug!(id = %fact.id, "Dropping duplicate fact id");
            continue;
        }
        facts.push(fact);
    }

    if facts.is_empty() {
        return Err(StoreError::Empty { rejected: total });
    }

    debug!(loaded = facts.len(), rejected = total - facts.len(), "Facts parsed");
    Ok(facts)
}

/// Read and validate a facts file, reporting why it could not be used.
pub fn try_load_facts(path: impl AsRef<Path>) -> Result<Vec<Fact>, StoreError> {
    let bytes = std::fs::read(path)?;
    parse_facts(&bytes)
}

/// The hardcoded fallback set.
pub fn default_facts() -> Vec<Fact> {
    [
        (
            "default-goldfish",
            "Goldfish do not have a three-second memory.",
            "nature",
            "Plymouth University, 2003",
            "Goldfish can be trained to respond to sounds and remember them for months.",
        ),
        (
            "default-great-wall",
            "The Great Wall of China is not visible from space with the naked eye.",
            "history",
            "NASA",
            "Astronauts report that it is too narrow and blends into the terrain.",
        ),
        (
            "default-sugar",
            "Sugar does not make children hyperactive.",
            "health",
            "JAMA meta-analysis, 1995",
            "Double-blind studies found no behavioural difference; parents' expectations did.",
        ),
        (
            "default-tongue-map",
            "There is no tongue map of separate taste zones.",
            "science",
            "Chemical Senses, 2006",
            "Every taste region can detect all five basic tastes.",
        ),
        (
            "default-ten-percent",
            "Humans use far more than 10% of their brains.",
            "psychology",
            "Scientific American",
            "Imaging shows activity across virtually the whole brain over a day.",
        ),
        (
            "default-vikings",
            "Vikings did not wear horned helmets in battle.",
            "history",
            "National Museum of Denmark",
            "The image comes from 19th-century opera costume design.",
        ),
        (
            "default-lightning",
            "Lightning often strikes the same place twice.",
            "science",
            "NOAA",
            "The Empire State Building is hit around 20 times a year.",
        ),
        (
            "default-bulls",
            "Bulls are not enraged by the colour red.",
            "nature",
            "Animal behaviour studies",
            "Cattle are red-green colour blind; the cape's movement provokes the charge.",
        ),
    ]
    .into_iter()
    .map(|(id, text, category, source, insight)| Fact::new(id, text, category, source, insight))
    .collect()
}

/// In-memory catalogue of facts with derived categories and a random picker.
#[derive(Debug, Clone)]
pub struct FactStore {
    facts: Vec<Fact>,
    categories: Vec<Category>,
    current: Option<String>,
}

impl Default for FactStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FactStore {
    pub fn with_defaults() -> Self {
        Self::with_facts(default_facts())
    }

    pub fn with_facts(facts: Vec<Fact>) -> Self {
        let mut store = Self {
            facts: Vec::new(),
            categories: Vec::new(),
            current: None,
        };
        store.set_facts(facts);
        store
    }

    /// Load facts from `path`, falling back to the defaults on any failure.
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self::from_load_result(path, try_load_facts(path))
    }

    pub(crate) fn from_load_result(path: &Path, result: Result<Vec<Fact>, StoreError>) -> Self {
        match result {
            Ok(facts) => Self::with_facts(facts),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using default facts");
                Self::with_defaults()
            }
        }
    }

    /// Replace the catalogue and recompute the category list.
    pub fn set_facts(&mut self, facts: Vec<Fact>) {
        self.facts = facts;
        self.categories = self
            .facts
            .iter()
            .map(|f| f.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(Category::from_key)
            .collect();

        if let Some(current) = &self.current {
            if !self.facts.iter().any(|f| &f.id == current) {
                self.current = None;
            }
        }
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Distinct categories of the loaded facts, ordered by key.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, id: &str) -> Option<&Fact> {
        self.facts.iter().find(|f| f.id == id)
    }

    pub fn facts_in<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.facts
            .iter()
            .filter(move |f| category == category::ALL || f.category == category)
    }

    pub fn count_in(&self, category: &str) -> usize {
        self.facts_in(category).count()
    }

    /// The fact most recently returned by [`random_fact`](Self::random_fact).
    pub fn current_fact(&self) -> Option<&Fact> {
        self.current.as_deref().and_then(|id| self.get(id))
    }

    /// Pick a random fact from `selected` (a category key or `"all"`).
    pub fn random_fact(&mut self, selected: &str) -> Option<&Fact> {
        let mut rng = rand::thread_rng();
        self.random_fact_with(selected, &mut rng)
    }

    /// Pick a random fact using the given RNG.
    ///
    /// With two or more candidates the current fact is not returned again:
    /// up to [`MAX_REPEAT_ATTEMPTS`] draws are made, and a repeat left after
    /// that is replaced by a draw from the other candidates.
    pub fn random_fact_with<R: Rng + ?Sized>(
        &mut self,
        selected: &str,
        rng: &mut R,
    ) -> Option<&Fact> {
        let candidates: Vec<usize> = self
            .facts
            .iter()
            .enumerate()
            .filter(|(_, f)| selected == category::ALL || f.category == selected)
            .map(|(i, _)| i)
            .collect();

        let mut pick = *candidates.choose(rng)?;

        if let Some(current) = self.current.clone() {
            if candidates.len() >= 2 {
                let mut attempts = 1;
                while self.facts[pick].id == current && attempts < MAX_REPEAT_ATTEMPTS {
                    pick = *candidates.choose(rng)?;
                    attempts += 1;
                }

                if self.facts[pick].id == current {
                    let others: Vec<usize> = candidates
                        .iter()
                        .copied()
                        .filter(|&i| self.facts[i].id != current)
                        .collect();
                    if let Some(&other) = others.choose(rng) {
                        pick = other;
                    }
                }
            }
        }

        self.current = Some(self.facts[pick].id.clone());
        Some(&self.facts[pick])
    }
}
