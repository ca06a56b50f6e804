//! User preferences, persisted under [`keys::SETTINGS`].

use crate::io::{self, keys, KeyValueStore};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications_enabled: bool,
    /// Local time of day for the daily reminder.
    pub notification_time: NaiveTime,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            notifications_enabled: true,
            notification_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
    settings: Settings,
}

impl SettingsStore {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let settings = io::load_or_default(store.as_ref(), keys::SETTINGS);
        Self { store, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.settings.dark_mode = enabled;
        self.save();
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.settings.notifications_enabled = enabled;
        self.save();
    }

    pub fn set_notification_time(&mut self, time: NaiveTime) {
        self.settings.notification_time = time;
        self.save();
    }

    fn save(&self) {
        io::persist(self.store.as_ref(), keys::SETTINGS, &self.settings);
    }
}
