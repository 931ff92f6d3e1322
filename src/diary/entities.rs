use std::{fmt::Display, sync::Arc};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The full persisted state for one calendar date. Stored as one JSON blob under
/// a `YYYY-MM-DD` key. A missing key is equivalent to [DayRecord::default].
///
/// Derived values (calorie/macro totals, projected weight) are never stored here,
/// they are recomputed from the arrays on every read.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone, Default)]
pub struct DayRecord {
    #[serde(default)]
    pub breakfast: Vec<FoodEntry>,
    #[serde(default)]
    pub lunch: Vec<FoodEntry>,
    #[serde(default)]
    pub dinner: Vec<FoodEntry>,
    #[serde(default)]
    pub snacks: Vec<FoodEntry>,
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
    #[serde(default)]
    pub water: u32,
}

impl DayRecord {
    pub fn meal(&self, slot: MealSlot) -> &Vec<FoodEntry> {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
            MealSlot::Snacks => &self.snacks,
        }
    }

    pub fn meal_mut(&mut self, slot: MealSlot) -> &mut Vec<FoodEntry> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
            MealSlot::Snacks => &mut self.snacks,
        }
    }

    /// All logged food for the day, in meal-slot order.
    pub fn all_food(&self) -> impl Iterator<Item = &FoodEntry> {
        self.breakfast
            .iter()
            .chain(self.lunch.iter())
            .chain(self.dinner.iter())
            .chain(self.snacks.iter())
    }
}

/// One of the four named food arrays of a [DayRecord].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MealSlot::Breakfast => write!(f, "breakfast"),
            MealSlot::Lunch => write!(f, "lunch"),
            MealSlot::Dinner => write!(f, "dinner"),
            MealSlot::Snacks => write!(f, "snacks"),
        }
    }
}

/// A single logged food item. Field names follow the stored wire format:
/// `p`/`c`/`f`/`fib`/`sug` are grams, `sod` is milligrams.
///
/// Entries are immutable once appended, there is no update or delete path.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct FoodEntry {
    pub name: Arc<str>,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub p: f64,
    #[serde(default)]
    pub c: f64,
    #[serde(default)]
    pub f: f64,
    #[serde(default)]
    pub fib: f64,
    #[serde(default)]
    pub sug: f64,
    #[serde(default)]
    pub sod: f64,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl FoodEntry {
    /// Checked at the append boundary so a bad entry can't poison day totals.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("calories", self.calories),
            ("protein", self.p),
            ("carbs", self.c),
            ("fat", self.f),
            ("fiber", self.fib),
            ("sugar", self.sug),
            ("sodium", self.sod),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                bail!("Food entry {:?} has invalid {field}: {value}", self.name);
            }
        }
        Ok(())
    }
}

/// A logged workout. Only the calorie contribution feeds aggregation.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct ExerciseEntry {
    pub name: Arc<str>,
    #[serde(default)]
    pub calories: f64,
}

/// One weigh-in. Kept in a separate unbounded history sequence rather than
/// per-day records; a day's displayed weight is projected from the history.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct WeightEntry {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,
    pub weight: f64,
}

/// Derived per-day nutrition totals. Pure function of the meal arrays,
/// never persisted.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Totals {
    pub food: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
    pub sugar: f64,
    pub sodium: f64,
}

/// Gram targets derived from a daily calorie goal.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct MacroGoals {
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

/// Outcome of a water-count update.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum WaterStatus {
    /// Count changed and was persisted.
    Ok,
    /// Daily goal already met, increment rejected without touching state.
    GoalReached,
    /// Update clamped to the hard cap; the clamped count was persisted.
    LimitReached,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct WaterUpdate {
    pub count: u32,
    pub status: WaterStatus,
}
