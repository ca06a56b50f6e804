//! The fixed achievement catalogue.

use super::UserLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Experience awarded when an achievement of this rarity unlocks.
    pub const fn xp_reward(self) -> u32 {
        match self {
            Rarity::Common => 25,
            Rarity::Rare => 50,
            Rarity::Epic => 100,
            Rarity::Legendary => 200,
        }
    }
}

/// A catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon_name: &'static str,
    pub rarity: Rarity,
}

impl AchievementDef {
    pub fn unlocked(&self, at: DateTime<Utc>) -> UnlockedAchievement {
        UnlockedAchievement {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon_name: self.icon_name.to_string(),
            unlocked_date: at,
            rarity: self.rarity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon_name: String,
    pub unlocked_date: DateTime<Utc>,
    pub rarity: Rarity,
}

const fn def(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon_name: &'static str,
    rarity: Rarity,
) -> AchievementDef {
    AchievementDef {
        id,
        name,
        description,
        icon_name,
        rarity,
    }
}

pub static FIRST_VISIT: AchievementDef = def(
    "first_visit",
    "First Steps",
    "Opened Contrario for the first time",
    "figure.walk",
    Rarity::Common,
);

/// Streak length milestones.
pub static STREAK: [(u32, AchievementDef); 4] = [
    (3, def("streak_3", "Warming Up", "Visited three days in a row", "flame", Rarity::Common)),
    (7, def("streak_7", "Week of Doubt", "Visited seven days in a row", "flame.fill", Rarity::Rare)),
    (30, def("streak_30", "Habitual Skeptic", "Visited thirty days in a row", "bolt.fill", Rarity::Epic)),
    (100, def("streak_100", "Relentless", "Visited one hundred days in a row", "crown.fill", Rarity::Legendary)),
];

/// Lifetime discovery milestones.
pub static DISCOVERIES: [(u32, AchievementDef); 5] = [
    (1, def("discoveries_1", "First Discovery", "Discovered your first fact", "sparkle", Rarity::Common)),
    (10, def("discoveries_10", "Curious Mind", "Discovered ten facts", "magnifyingglass", Rarity::Common)),
    (50, def("discoveries_50", "Myth Buster", "Discovered fifty facts", "hammer.fill", Rarity::Rare)),
    (100, def("discoveries_100", "Centurion", "Discovered one hundred facts", "shield.fill", Rarity::Epic)),
    (500, def("discoveries_500", "Walking Encyclopedia", "Discovered five hundred facts", "books.vertical.fill", Rarity::Legendary)),
];

/// Discoveries within a single day.
pub static DAILY: [(u32, AchievementDef); 3] = [
    (5, def("daily_5", "Busy Day", "Discovered five facts in one day", "sun.max", Rarity::Common)),
    (10, def("daily_10", "Binge Reader", "Discovered ten facts in one day", "sun.max.fill", Rarity::Rare)),
    (20, def("daily_20", "Unstoppable", "Discovered twenty facts in one day", "tornado", Rarity::Epic)),
];

/// Level-up achievements, one per level above the first.
pub static LEVELS: [(UserLevel, AchievementDef); 5] = [
    (UserLevel::Apprentice, def("level_apprentice", "Apprentice", "Reached the Apprentice level", "star", Rarity::Common)),
    (UserLevel::Explorer, def("level_explorer", "Explorer", "Reached the Explorer level", "star.leadinghalf.filled", Rarity::Rare)),
    (UserLevel::Scholar, def("level_scholar", "Scholar", "Reached the Scholar level", "star.fill", Rarity::Rare)),
    (UserLevel::Sage, def("level_sage", "Sage", "Reached the Sage level", "star.circle.fill", Rarity::Epic)),
    (UserLevel::Enlightened, def("level_enlightened", "Enlightened", "Reached the Enlightened level", "sun.and.horizon.fill", Rarity::Legendary)),
];

pub fn for_level(level: UserLevel) -> Option<&'static AchievementDef> {
    LEVELS.iter().find(|(l, _)| *l == level).map(|(_, d)| d)
}

/// Every catalogue entry.
pub fn all() -> impl Iterator<Item = &'static AchievementDef> {
    std::iter::once(&FIRST_VISIT)
        .chain(STREAK.iter().map(|(_, d)| d))
        .chain(DISCOVERIES.iter().map(|(_, d)| d))
        .chain(DAILY.iter().map(|(_, d)| d))
        .chain(LEVELS.iter().map(|(_, d)| d))
}

pub fn find(id: &str) -> Option<&'static AchievementDef> {
    all().find(|d| d.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalogue_ids_are_unique() {
        let ids: Vec<_> = all().map(|d| d.id).collect();
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn every_level_above_novice_has_an_achievement() {
        for level in UserLevel::ALL.into_iter().skip(1) {
            assert!(for_level(level).is_some(), "{level:?}");
        }
        assert!(for_level(UserLevel::Novice).is_none());
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find("streak_7").unwrap().rarity, Rarity::Rare);
        assert!(find("nope").is_none());
    }
}
