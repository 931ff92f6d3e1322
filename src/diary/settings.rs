use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::{entities::WeightEntry, store::DiaryStoreImpl};

pub const USER_PROFILE_KEY: &str = "userProfile";
pub const WATER_SETTINGS_KEY: &str = "waterSettings";
pub const WEIGHT_HISTORY_KEY: &str = "weightHistory";
pub const DARK_MODE_KEY: &str = "isDarkMode";
pub const APP_LANGUAGE_KEY: &str = "appLanguage";

/// Water tracking configuration. `cup_size` is milliliters per logged cup.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy)]
pub struct WaterSettings {
    #[serde(default = "default_water_goal")]
    pub goal: u32,
    #[serde(default = "default_cup_size", rename = "cupSize")]
    pub cup_size: u32,
}

impl Default for WaterSettings {
    fn default() -> Self {
        Self {
            goal: default_water_goal(),
            cup_size: default_cup_size(),
        }
    }
}

fn default_water_goal() -> u32 {
    8
}

fn default_cup_size() -> u32 {
    250
}

impl WaterSettings {
    pub fn validate(&self) -> Result<()> {
        if !(1..=50).contains(&self.goal) {
            bail!("Daily water goal must be between 1 and 50 cups, got {}", self.goal);
        }
        if !(50..=2000).contains(&self.cup_size) {
            bail!("Cup size must be between 50 and 2000 ml, got {}", self.cup_size);
        }
        Ok(())
    }
}

/// Stored user profile. Only the calorie goal matters to the diary; the rest
/// of the blob is preserved for the UI layers that own it.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
pub struct UserProfile {
    #[serde(default, rename = "dailyGoal", skip_serializing_if = "Option::is_none")]
    pub daily_goal: Option<u32>,
    #[serde(default, rename = "profileImage", skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

/// Resolution order for the daily calorie goal: stored profile, then the value
/// the caller carried in, then session metadata from the identity provider,
/// then the 2000 kcal fallback.
pub fn resolve_daily_goal(
    profile: &UserProfile,
    passed: Option<u32>,
    session_goal: Option<u32>,
) -> u32 {
    profile
        .daily_goal
        .or(passed)
        .or(session_goal)
        .unwrap_or(2000)
}

impl DiaryStoreImpl {
    pub async fn water_settings(&self) -> Result<WaterSettings> {
        self.read_key(WATER_SETTINGS_KEY).await
    }

    /// Persists water settings after bounds validation.
    pub async fn set_water_settings(&self, settings: &WaterSettings) -> Result<()> {
        settings.validate()?;
        self.write_key(WATER_SETTINGS_KEY, settings).await
    }

    pub async fn user_profile(&self) -> Result<UserProfile> {
        self.read_key(USER_PROFILE_KEY).await
    }

    pub async fn set_user_profile(&self, profile: &UserProfile) -> Result<()> {
        self.write_key(USER_PROFILE_KEY, profile).await
    }

    pub async fn weight_history(&self) -> Result<Vec<WeightEntry>> {
        self.read_key(WEIGHT_HISTORY_KEY).await
    }

    /// Appends a weigh-in and keeps the history sorted ascending by date so
    /// projection lookups stay cheap.
    pub async fn log_weight(&self, entry: WeightEntry) -> Result<Vec<WeightEntry>> {
        let mut history = self.weight_history().await?;
        history.push(entry);
        history.sort_by_key(|e| e.date);
        self.write_key(WEIGHT_HISTORY_KEY, &history).await?;
        Ok(history)
    }

    pub async fn dark_mode(&self) -> Result<bool> {
        Ok(self.read_key::<String>(DARK_MODE_KEY).await? == "true")
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.write_key(DARK_MODE_KEY, &enabled.to_string()).await
    }

    pub async fn app_language(&self) -> Result<String> {
        let stored = self.read_key::<String>(APP_LANGUAGE_KEY).await?;
        Ok(if stored.is_empty() { "en".into() } else { stored })
    }

    pub async fn set_app_language(&self, language: &str) -> Result<()> {
        self.write_key(APP_LANGUAGE_KEY, language).await
    }
}
