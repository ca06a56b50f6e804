//! Category metadata.
//!
//! Known category keys map to fixed display metadata through an exhaustive
//! `match`. Any other key still gets a [`Category`]: its display name is the
//! key title-cased with `_`/`-` read as spaces, its icon is
//! [`DEFAULT_ICON`] and its group is [`CategoryGroup::General`].

use serde::{Deserialize, Serialize};

/// Icon used for category keys without fixed metadata.
pub const DEFAULT_ICON: &str = "lightbulb";

/// The category filter value meaning "every category".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    Science,
    Society,
    Everyday,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownCategory {
    Science,
    Health,
    Psychology,
    Nature,
    Technology,
    History,
    Economics,
    Language,
    Food,
}

impl KnownCategory {
    pub const ALL: [KnownCategory; 9] = [
        KnownCategory::Science,
        KnownCategory::Health,
        KnownCategory::Psychology,
        KnownCategory::Nature,
        KnownCategory::Technology,
        KnownCategory::History,
        KnownCategory::Economics,
        KnownCategory::Language,
        KnownCategory::Food,
    ];

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub const fn key(self) -> &'static str {
        match self {
            KnownCategory::Science => "science",
            KnownCategory::Health => "health",
            KnownCategory::Psychology => "psychology",
            KnownCategory::Nature => "nature",
            KnownCategory::Technology => "technology",
            KnownCategory::History => "history",
            KnownCategory::Economics => "economics",
            KnownCategory::Language => "language",
            KnownCategory::Food => "food",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            KnownCategory::Science => "Science",
            KnownCategory::Health => "Health & Body",
            KnownCategory::Psychology => "Psychology",
            KnownCategory::Nature => "Nature",
            KnownCategory::Technology => "Technology",
            KnownCategory::History => "History",
            KnownCategory::Economics => "Economics",
            KnownCategory::Language => "Language",
            KnownCategory::Food => "Food & Drink",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            KnownCategory::Science => "atom",
            KnownCategory::Health => "heart.text.square",
            KnownCategory::Psychology => "brain.head.profile",
            KnownCategory::Nature => "leaf",
            KnownCategory::Technology => "cpu",
            KnownCategory::History => "building.columns",
            KnownCategory::Economics => "chart.line.uptrend.xyaxis",
            KnownCategory::Language => "character.book.closed",
            KnownCategory::Food => "fork.knife",
        }
    }

    pub const fn group(self) -> CategoryGroup {
        match self {
            KnownCategory::Science | KnownCategory::Nature | KnownCategory::Technology => {
                CategoryGroup::Science
            }
            KnownCategory::Psychology | KnownCategory::History | KnownCategory::Economics => {
                CategoryGroup::Society
            }
            KnownCategory::Health | KnownCategory::Language | KnownCategory::Food => {
                CategoryGroup::Everyday
            }
        }
    }
}

/// Display metadata for one category key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub display_name: String,
    pub icon: String,
    pub group: CategoryGroup,
}

impl Category {
    /// Metadata for `key`; unknown keys get the defaults described at module level.
    pub fn from_key(key: &str) -> Self {
        match KnownCategory::from_key(key) {
            Some(known) => Self {
                key: key.to_string(),
                display_name: known.display_name().to_string(),
                icon: known.icon().to_string(),
                group: known.group(),
            },
            None => Self {
                key: key.to_string(),
                display_name: title_case(key),
                icon: DEFAULT_ICON.to_string(),
                group: CategoryGroup::General,
            },
        }
    }
}

fn title_case(key: &str) -> String {
    key.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn known_keys_round_trip() {
        for known in KnownCategory::ALL {
            assert_eq!(KnownCategory::from_key(known.key()), Some(known));
        }
    }

    #[test]
    fn known_category_metadata() {
        let category = Category::from_key("psychology");
        assert_eq!(category.display_name, "Psychology");
        assert_eq!(category.icon, "brain.head.profile");
        assert_eq!(category.group, CategoryGroup::Society);
    }

    #[rstest]
    #[case::single("space", "Space")]
    #[case::underscore("pop_culture", "Pop Culture")]
    #[case::dash("urban-myths", "Urban Myths")]
    fn unknown_category_defaults(#[case] key: &str, #[case] display: &str) {
        let category = Category::from_key(key);
        assert_eq!(category.key, key);
        assert_eq!(category.display_name, display);
        assert_eq!(category.icon, DEFAULT_ICON);
        assert_eq!(category.group, CategoryGroup::General);
    }
}
