use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;

use crate::{
    diary::{
        aggregate::{aggregate, total_exercise_calories},
        entities::{DayRecord, ExerciseEntry, FoodEntry, MealSlot, WaterStatus, WeightEntry},
        store::{DiaryStore, DiaryStoreImpl},
    },
    sync::{spawn_mirror, RemoteSync},
    utils::clock::Clock,
};

use super::{
    day::{parse_day_arg, DateStyle},
    output,
};

#[derive(Debug, Parser)]
pub struct FoodCommand {
    #[arg(help = "Meal slot the entry goes into")]
    pub slot: MealSlot,
    #[arg(long, help = "Name of the food")]
    pub name: String,
    #[arg(long, help = "Calories (kcal)")]
    pub calories: f64,
    #[arg(short = 'p', long, default_value_t = 0.0, help = "Protein in grams")]
    pub protein: f64,
    #[arg(short = 'c', long, default_value_t = 0.0, help = "Carbs in grams")]
    pub carbs: f64,
    #[arg(short = 'f', long, default_value_t = 0.0, help = "Fat in grams")]
    pub fat: f64,
    #[arg(long, default_value_t = 0.0, help = "Fiber in grams")]
    pub fiber: f64,
    #[arg(long, default_value_t = 0.0, help = "Sugar in grams")]
    pub sugar: f64,
    #[arg(long, default_value_t = 0.0, help = "Sodium in milligrams")]
    pub sodium: f64,
    #[arg(long = "image-url", help = "Optional photo of the item")]
    pub image_url: Option<String>,
    #[command(flatten)]
    pub target: TargetDay,
}

/// Date selector shared by the mutating commands. Anything other than the
/// device-local today is refused: past days are read-only by design.
#[derive(Debug, Parser)]
pub struct TargetDay {
    #[arg(long = "date", short, help = "Day to edit, defaults to today. Past days are read-only")]
    pub date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    pub date_style: DateStyle,
}

impl TargetDay {
    fn resolve(&self, clock: &impl Clock) -> Result<NaiveDate> {
        let requested = parse_day_arg(self.date.as_deref(), self.date_style, clock)?;
        let today = clock.today();
        if requested != today {
            bail!(
                "The log for {requested} is read-only; only today ({today}) can be edited"
            );
        }
        Ok(requested)
    }
}

pub async fn process_food_command(
    store: &DiaryStoreImpl,
    clock: &impl Clock,
    remote: Option<Arc<dyn RemoteSync>>,
    command: FoodCommand,
) -> Result<()> {
    let date = command.target.resolve(clock)?;
    let entry = FoodEntry {
        name: command.name.as_str().into(),
        calories: command.calories,
        p: command.protein,
        c: command.carbs,
        f: command.fat,
        fib: command.fiber,
        sug: command.sugar,
        sod: command.sodium,
        image_url: command.image_url,
    };

    let record = store.append_food(date, command.slot, entry).await?;
    let totals = aggregate(&record);
    println!(
        "Added {} to {} ({} items, {} kcal logged today)",
        command.name,
        command.slot,
        record.meal(command.slot).len(),
        totals.food.round(),
    );

    mirror(remote, date, record).await;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct ExerciseCommand {
    #[arg(long, help = "Name of the workout")]
    pub name: String,
    #[arg(long, help = "Calories burned (kcal)")]
    pub calories: f64,
    #[command(flatten)]
    pub target: TargetDay,
}

pub async fn process_exercise_command(
    store: &DiaryStoreImpl,
    clock: &impl Clock,
    remote: Option<Arc<dyn RemoteSync>>,
    command: ExerciseCommand,
) -> Result<()> {
    if !command.calories.is_finite() || command.calories < 0.0 {
        bail!("Burned calories must be non-negative, got {}", command.calories);
    }
    let date = command.target.resolve(clock)?;

    let record = store
        .append_exercise(
            date,
            ExerciseEntry {
                name: command.name.as_str().into(),
                calories: command.calories,
            },
        )
        .await?;
    let burned = total_exercise_calories(&record);
    println!("Logged {} ({} kcal burned today)", command.name, burned.round());

    mirror(remote, date, record).await;
    Ok(())
}

#[derive(Debug, Parser)]
pub struct WaterCommand {
    #[arg(
        allow_hyphen_values = true,
        help = "Cups to add or remove, for example 1 or -1"
    )]
    pub delta: i32,
    #[command(flatten)]
    pub target: TargetDay,
}

pub async fn process_water_command(
    store: &DiaryStoreImpl,
    clock: &impl Clock,
    remote: Option<Arc<dyn RemoteSync>>,
    command: WaterCommand,
) -> Result<()> {
    let date = command.target.resolve(clock)?;
    let settings = store.water_settings().await?;

    let update = store.set_water(date, command.delta, settings.goal).await?;
    output::print_water_update(update, &settings);

    // A goal-reached rejection changed nothing, so there is nothing to mirror.
    if update.status != WaterStatus::GoalReached {
        let record = store.load(date).await?;
        mirror(remote, date, record).await;
    }
    Ok(())
}

#[derive(Debug, Parser)]
pub struct WeightCommand {
    #[arg(help = "Current weight in kilograms")]
    pub kg: f64,
}

pub async fn process_weight_command(
    store: &DiaryStoreImpl,
    clock: &impl Clock,
    command: WeightCommand,
) -> Result<()> {
    if !command.kg.is_finite() || command.kg <= 0.0 {
        bail!("Weight must be a positive number of kilograms, got {}", command.kg);
    }

    let history = store
        .log_weight(WeightEntry {
            date: clock.now(),
            weight: command.kg,
        })
        .await?;
    println!("Logged {:.1} kg ({} weigh-ins recorded)", command.kg, history.len());
    Ok(())
}

/// Detached best-effort mirror of the freshly saved record. The local result
/// was already reported; a failure here is logged inside the task and the
/// command outcome never changes.
async fn mirror(remote: Option<Arc<dyn RemoteSync>>, date: NaiveDate, record: DayRecord) {
    if let Some(remote) = remote {
        let _ = spawn_mirror(remote, date, record).await;
    }
}
