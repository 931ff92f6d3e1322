use ansi_term::{Colour, Style};
use chrono::NaiveDate;

use crate::diary::{
    entities::{DayRecord, MacroGoals, MealSlot, Totals, WaterStatus, WaterUpdate},
    settings::WaterSettings,
};

/// Fixed display targets for the secondary nutrients. Sodium is milligrams,
/// the rest grams.
const FIBER_GOAL: f64 = 30.0;
const SUGAR_GOAL: f64 = 50.0;
const SODIUM_GOAL: f64 = 2300.0;

/// Everything the dashboard needs for one day, assembled by the day command
/// from the stored record plus the derived values.
pub struct DayView {
    pub date: NaiveDate,
    pub is_today: bool,
    pub record: DayRecord,
    pub totals: Totals,
    pub exercise_calories: f64,
    pub daily_goal: u32,
    pub macro_goals: MacroGoals,
    pub water_settings: WaterSettings,
    pub projected_weight: f64,
}

pub fn print_day(view: &DayView) {
    let heading = Style::new().bold();
    let suffix = if view.is_today { " (today)" } else { " (read-only)" };
    println!("{}{suffix}", heading.paint(view.date.format("%Y-%m-%d").to_string()));

    let remaining = view.daily_goal as f64 - view.totals.food;
    println!(
        "Calories\t{} / {} kcal\t{} remaining",
        view.totals.food.round(),
        view.daily_goal,
        paint_remaining(remaining),
    );
    print_nutrient("Protein", view.totals.protein, view.macro_goals.protein as f64, "g");
    print_nutrient("Carbs", view.totals.carbs, view.macro_goals.carbs as f64, "g");
    print_nutrient("Fat", view.totals.fat, view.macro_goals.fat as f64, "g");
    print_nutrient("Fiber", view.totals.fiber, FIBER_GOAL, "g");
    print_nutrient("Sugar", view.totals.sugar, SUGAR_GOAL, "g");
    print_nutrient("Sodium", view.totals.sodium, SODIUM_GOAL, "mg");

    println!(
        "Water\t\t{} / {} cups ({} ml)",
        view.record.water,
        view.water_settings.goal,
        view.record.water * view.water_settings.cup_size,
    );
    if view.projected_weight > 0.0 {
        println!("Weight\t\t{:.1} kg", view.projected_weight);
    } else {
        println!("Weight\t\tnot logged");
    }
    println!("Exercise\t{} kcal burned", view.exercise_calories.round());

    for slot in [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snacks,
    ] {
        let entries = view.record.meal(slot);
        if entries.is_empty() {
            continue;
        }
        println!();
        println!("{}", heading.paint(slot.to_string()));
        for entry in entries {
            println!("\t{}\t{} kcal", entry.name, entry.calories.round());
        }
    }

    if !view.record.exercises.is_empty() {
        println!();
        println!("{}", heading.paint("workouts"));
        for exercise in &view.record.exercises {
            println!("\t{}\t{} kcal", exercise.name, exercise.calories.round());
        }
    }
}

fn print_nutrient(label: &str, consumed: f64, goal: f64, unit: &str) {
    let consumed_text = format!("{}{unit}", consumed.round());
    let painted = if consumed > goal {
        Colour::Red.paint(consumed_text)
    } else {
        Style::new().paint(consumed_text)
    };
    println!("{label}\t\t{painted} / {}{unit}", goal.round());
}

fn paint_remaining(remaining: f64) -> ansi_term::ANSIString<'static> {
    let text = format!("{}", remaining.round());
    if remaining < 0.0 {
        Colour::Red.paint(text)
    } else {
        Colour::Green.paint(text)
    }
}

pub fn print_water_update(update: WaterUpdate, settings: &WaterSettings) {
    match update.status {
        WaterStatus::Ok => println!(
            "Water: {} / {} cups ({} ml)",
            update.count,
            settings.goal,
            update.count * settings.cup_size,
        ),
        WaterStatus::GoalReached => println!(
            "{} You've completed your daily goal of {} cups.",
            Colour::Green.paint("Goal completed!"),
            settings.goal,
        ),
        WaterStatus::LimitReached => println!(
            "{} You cannot log more than {} cups a day.",
            Colour::Yellow.paint("Limit reached."),
            update.count,
        ),
    }
}

pub fn print_macro_goals(daily_goal: u32, goals: MacroGoals) {
    println!("Targets for {daily_goal} kcal/day:");
    println!("Protein\t{}g", goals.protein);
    println!("Carbs\t{}g", goals.carbs);
    println!("Fat\t{}g", goals.fat);
}
