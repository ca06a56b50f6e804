//! Engagement bookkeeping: streaks, experience, levels, weekly goals and
//! achievements.
//!
//! # Rules
//!
//! | Event | Effect |
//! |-------|--------|
//! | First visit ever | streak 1, `first_visit` unlocked |
//! | Visit on the next calendar day | streak +1, streak milestones, +50 XP on a new longest streak |
//! | Visit after a gap of 2+ days | streak reset to 1, −20 XP if the broken streak was 7+ |
//! | Discovery | +10 XP, discovery and daily milestones, stage advance, weekly goal |
//! | Weekly goal reached | +100 XP, weekly progress reset |
//! | Level threshold crossed | next level, level achievement, +100 XP bonus |
//! | Achievement unlocked | +25/50/100/200 XP by rarity |
//!
//! Levels advance at most one step per award. The bonus XP granted on a
//! level-up is not checked against the following threshold until the next
//! award.
//!
//! Calendar days are UTC dates.

pub mod achievements;

pub use achievements::{AchievementDef, Rarity, UnlockedAchievement};

use crate::io::{self, keys, KeyValueStore};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_WEEKLY_GOAL: u32 = 21;
pub const DISCOVERY_XP: u32 = 10;
pub const NEW_RECORD_STREAK_XP: u32 = 50;
pub const STREAK_BREAK_PENALTY_XP: u32 = 20;
/// Broken streaks shorter than this cost nothing.
pub const STREAK_PENALTY_MIN_LENGTH: u32 = 7;
pub const WEEKLY_GOAL_XP: u32 = 100;
pub const LEVEL_UP_BONUS_XP: u32 = 100;

#[derive(Debug, Error)]
pub enum JourneyError {
    #[error("Unknown achievement: {0}")]
    UnknownAchievement(String),

    #[error("Weekly goal must be at least 1")]
    InvalidWeeklyGoal,
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum UserLevel {
    #[default]
    Novice,
    Apprentice,
    Explorer,
    Scholar,
    Sage,
    Enlightened,
}

impl UserLevel {
    pub const ALL: [UserLevel; 6] = [
        UserLevel::Novice,
        UserLevel::Apprentice,
        UserLevel::Explorer,
        UserLevel::Scholar,
        UserLevel::Sage,
        UserLevel::Enlightened,
    ];

    /// Experience needed to reach this level.
    pub const fn threshold(self) -> u32 {
        match self {
            UserLevel::Novice => 0,
            UserLevel::Apprentice => 100,
            UserLevel::Explorer => 300,
            UserLevel::Scholar => 600,
            UserLevel::Sage => 1000,
            UserLevel::Enlightened => 1500,
        }
    }

    pub const fn next(self) -> Option<UserLevel> {
        match self {
            UserLevel::Novice => Some(UserLevel::Apprentice),
            UserLevel::Apprentice => Some(UserLevel::Explorer),
            UserLevel::Explorer => Some(UserLevel::Scholar),
            UserLevel::Scholar => Some(UserLevel::Sage),
            UserLevel::Sage => Some(UserLevel::Enlightened),
            UserLevel::Enlightened => None,
        }
    }
}

/// Narrative stage derived from lifetime discoveries.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum JourneyStage {
    #[default]
    Curious,
    Questioning,
    Skeptical,
    OpenMinded,
    Contrarian,
    Enlightened,
}

impl JourneyStage {
    pub const ALL: [JourneyStage; 6] = [
        JourneyStage::Curious,
        JourneyStage::Questioning,
        JourneyStage::Skeptical,
        JourneyStage::OpenMinded,
        JourneyStage::Contrarian,
        JourneyStage::Enlightened,
    ];

    /// Lifetime discoveries needed to reach this stage.
    pub const fn milestone(self) -> u32 {
        match self {
            JourneyStage::Curious => 0,
            JourneyStage::Questioning => 5,
            JourneyStage::Skeptical => 20,
            JourneyStage::OpenMinded => 50,
            JourneyStage::Contrarian => 100,
            JourneyStage::Enlightened => 250,
        }
    }

    /// Highest stage whose milestone is at most `discoveries`.
    pub fn for_discoveries(discoveries: u32) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|stage| stage.milestone() <= discoveries)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_days_engaged: u32,
    pub last_visit_date: Option<DateTime<Utc>>,
    pub daily_discoveries: u32,
    pub lifetime_discoveries: u32,
    pub weekly_goal: u32,
    pub weekly_progress: u32,
    /// Monday of the week `weekly_progress` counts towards.
    pub week_start_date: Option<NaiveDate>,
    pub user_level: UserLevel,
    pub experience_points: u32,
    pub emotional_journey_stage: JourneyStage,
    /// Persisted separately under [`keys::ACHIEVEMENTS`].
    #[serde(skip)]
    pub achievement_history: Vec<UnlockedAchievement>,
}

impl Default for JourneyState {
    fn default() -> Self {
        Self {
            current_streak: 0,
            longest_streak: 0,
            total_days_engaged: 0,
            last_visit_date: None,
            daily_discoveries: 0,
            lifetime_discoveries: 0,
            weekly_goal: DEFAULT_WEEKLY_GOAL,
            weekly_progress: 0,
            week_start_date: None,
            user_level: UserLevel::Novice,
            experience_points: 0,
            emotional_journey_stage: JourneyStage::Curious,
            achievement_history: Vec::new(),
        }
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Owns the [`JourneyState`], persisted under [`keys::JOURNEY_STATE`] with the
/// achievement list under [`keys::ACHIEVEMENTS`].
pub struct JourneyTracker {
    store: Arc<dyn KeyValueStore>,
    state: JourneyState,
}

impl JourneyTracker {
    /// Load persisted state and roll the weekly window forward to `now`.
    ///
    /// `default_weekly_goal` only applies when nothing was persisted yet. A
    /// persisted goal of zero is raised to one.
    pub fn load(store: Arc<dyn KeyValueStore>, default_weekly_goal: u32, now: DateTime<Utc>) -> Self {
        let persisted: Option<JourneyState> = match io::load_json(store.as_ref(), keys::JOURNEY_STATE) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load journey state, starting fresh");
                None
            }
        };
        let mut state = persisted.unwrap_or_else(|| JourneyState {
            weekly_goal: default_weekly_goal.max(1),
            ..Default::default()
        });
        state.weekly_goal = state.weekly_goal.max(1);
        state.achievement_history = io::load_or_default(store.as_ref(), keys::ACHIEVEMENTS);

        let mut tracker = Self { store, state };
        if tracker.roll_week(now) {
            tracker.save_state();
        }
        tracker
    }

    pub fn state(&self) -> &JourneyState {
        &self.state
    }

    pub fn achievements(&self) -> &[UnlockedAchievement] {
        &self.state.achievement_history
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.state.achievement_history.iter().any(|a| a.id == id)
    }

    /// Evaluate a visit (app foreground) at `now`.
    pub fn check_visit(&mut self, now: DateTime<Utc>) {
        self.roll_week(now);
        let today = now.date_naive();

        match self.state.last_visit_date {
            None => {
                self.state.current_streak = 1;
                self.state.longest_streak = self.state.longest_streak.max(1);
                self.state.total_days_engaged = 1;
                self.state.daily_discoveries = 0;
                self.unlock_achievement(&achievements::FIRST_VISIT, now);
            }
            Some(last) => {
                let days = (today - last.date_naive()).num_days();
                match days {
                    // Same day, or a clock that went backwards
                    i64::MIN..=0 => {}
                    1 => {
                        self.state.current_streak += 1;
                        self.state.total_days_engaged += 1;
                        self.state.daily_discoveries = 0;

                        let streak = self.state.current_streak;
                        for (length, def) in &achievements::STREAK {
                            if streak >= *length {
                                self.unlock_achievement(def, now);
                            }
                        }

                        if streak > self.state.longest_streak {
                            self.state.longest_streak = streak;
                            self.award_experience(NEW_RECORD_STREAK_XP, now);
                        }
                    }
                    _ => {
                        let broken = self.state.current_streak;
                        if broken >= STREAK_PENALTY_MIN_LENGTH {
                            self.state.experience_points = self
                                .state
                                .experience_points
                                .saturating_sub(STREAK_BREAK_PENALTY_XP);
                            debug!(broken, days, "Streak broken, penalty applied");
                        }
                        self.state.current_streak = 1;
                        self.state.total_days_engaged += 1;
                        self.state.daily_discoveries = 0;
                    }
                }
            }
        }

        self.state.last_visit_date = Some(now);
        self.save_state();
    }

    /// Record one newly discovered fact at `now`.
    pub fn record_discovery(&mut self, now: DateTime<Utc>) {
        self.roll_week(now);
        self.state.daily_discoveries += 1;
        self.state.weekly_progress += 1;
        self.state.lifetime_discoveries += 1;

        self.award_experience(DISCOVERY_XP, now);

        let lifetime = self.state.lifetime_discoveries;
        for (count, def) in &achievements::DISCOVERIES {
            if lifetime >= *count {
                self.unlock_achievement(def, now);
            }
        }
        let daily = self.state.daily_discoveries;
        for (count, def) in &achievements::DAILY {
            if daily >= *count {
                self.unlock_achievement(def, now);
            }
        }

        let stage = JourneyStage::for_discoveries(lifetime);
        if stage > self.state.emotional_journey_stage {
            info!(?stage, lifetime, "Journey stage advanced");
            self.state.emotional_journey_stage = stage;
        }

        if self.state.weekly_progress >= self.state.weekly_goal {
            self.state.weekly_progress = 0;
            self.award_experience(WEEKLY_GOAL_XP, now);
        }

        self.save_state();
    }

    /// Add experience and advance at most one level.
    pub fn award_experience(&mut self, points: u32, now: DateTime<Utc>) {
        self.state.experience_points = self.state.experience_points.saturating_add(points);

        if let Some(next) = self.state.user_level.next() {
            if self.state.experience_points >= next.threshold() {
                self.state.user_level = next;
                info!(level = ?next, xp = self.state.experience_points, "Level up");
                // The bonus below is the reward for the level achievement
                if let Some(def) = achievements::for_level(next) {
                    self.record_achievement(def, now);
                }
                self.state.experience_points =
                    self.state.experience_points.saturating_add(LEVEL_UP_BONUS_XP);
            }
        }

        self.save_state();
    }

    /// Unlock `def` unless it is already unlocked. Returns `true` on a new unlock.
    pub fn unlock_achievement(&mut self, def: &AchievementDef, now: DateTime<Utc>) -> bool {
        if !self.record_achievement(def, now) {
            return false;
        }
        self.award_experience(def.rarity.xp_reward(), now);
        true
    }

    /// Unlock a catalogue achievement by id.
    pub fn unlock_by_id(&mut self, id: &str, now: DateTime<Utc>) -> Result<bool, JourneyError> {
        let def = achievements::find(id).ok_or_else(|| JourneyError::UnknownAchievement(id.to_string()))?;
        Ok(self.unlock_achievement(def, now))
    }

    pub fn set_weekly_goal(&mut self, goal: u32) -> Result<(), JourneyError> {
        if goal == 0 {
            return Err(JourneyError::InvalidWeeklyGoal);
        }
        self.state.weekly_goal = goal;
        self.save_state();
        Ok(())
    }

    /// Fraction of the way from the current level's threshold to the next, `1.0` at the top level.
    pub fn level_progress(&self) -> f64 {
        let level = self.state.user_level;
        match level.next() {
            None => 1.0,
            Some(next) => {
                let span = f64::from(next.threshold() - level.threshold());
                let gained = f64::from(self.state.experience_points.saturating_sub(level.threshold()));
                (gained / span).clamp(0.0, 1.0)
            }
        }
    }

    pub fn xp_to_next_level(&self) -> Option<u32> {
        self.state
            .user_level
            .next()
            .map(|next| next.threshold().saturating_sub(self.state.experience_points))
    }

    /// Append `def` to the history without any reward. Returns `false` if already present.
    fn record_achievement(&mut self, def: &AchievementDef, now: DateTime<Utc>) -> bool {
        if self.has_achievement(def.id) {
            return false;
        }
        info!(id = def.id, rarity = ?def.rarity, "Achievement unlocked");
        self.state.achievement_history.push(def.unlocked(now));
        io::persist(self.store.as_ref(), keys::ACHIEVEMENTS, &self.state.achievement_history);
        true
    }

    /// Reset weekly progress when `now` falls in a later ISO week. Returns whether anything changed.
    fn roll_week(&mut self, now: DateTime<Utc>) -> bool {
        let current = week_start(now.date_naive());
        match self.state.week_start_date {
            Some(start) if start >= current => false,
            Some(start) => {
                debug!(%start, %current, progress = self.state.weekly_progress, "New week, weekly progress reset");
                self.state.weekly_progress = 0;
                self.state.week_start_date = Some(current);
                true
            }
            None => {
                self.state.week_start_date = Some(current);
                true
            }
        }
    }

    fn save_state(&self) {
        io::persist(self.store.as_ref(), keys::JOURNEY_STATE, &self.state);
    }
}
