use chrono::NaiveDate;

use crate::utils::time::end_of_day;

use super::entities::{DayRecord, MacroGoals, Totals, WeightEntry};

/// Calorie density per gram of each macro nutrient.
const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
const KCAL_PER_GRAM_CARBS: f64 = 4.0;
const KCAL_PER_GRAM_FAT: f64 = 9.0;

/// Fixed 30/40/30 protein/carbs/fat split of the daily calorie goal.
const SPLIT_PROTEIN: f64 = 0.30;
const SPLIT_CARBS: f64 = 0.40;
const SPLIT_FAT: f64 = 0.30;

/// Folds the four meal arrays into nutrition totals. Missing fields already
/// defaulted to zero at deserialization time.
pub fn aggregate(record: &DayRecord) -> Totals {
    record.all_food().fold(Totals::default(), |acc, item| Totals {
        food: acc.food + item.calories,
        protein: acc.protein + item.p,
        carbs: acc.carbs + item.c,
        fat: acc.fat + item.f,
        fiber: acc.fiber + item.fib,
        sugar: acc.sugar + item.sug,
        sodium: acc.sodium + item.sod,
    })
}

/// Total calories burned across the day's logged workouts.
pub fn total_exercise_calories(record: &DayRecord) -> f64 {
    record.exercises.iter().map(|e| e.calories).sum()
}

/// Converts a daily calorie goal into gram targets, rounded to the nearest gram.
pub fn derive_macro_goals(daily_calorie_goal: u32) -> MacroGoals {
    let goal = daily_calorie_goal as f64;
    MacroGoals {
        protein: (goal * SPLIT_PROTEIN / KCAL_PER_GRAM_PROTEIN).round() as u32,
        carbs: (goal * SPLIT_CARBS / KCAL_PER_GRAM_CARBS).round() as u32,
        fat: (goal * SPLIT_FAT / KCAL_PER_GRAM_FAT).round() as u32,
    }
}

/// Projects the weight shown for a day: the most recent weigh-in dated no later
/// than the end of that day, or 0 when the history holds nothing that early.
pub fn project_weight(history: &[WeightEntry], as_of: NaiveDate) -> f64 {
    let cutoff = end_of_day(as_of);
    let mut sorted: Vec<&WeightEntry> = history.iter().collect();
    sorted.sort_by_key(|e| e.date);
    sorted
        .iter()
        .rev()
        .find(|e| e.date <= cutoff)
        .map(|e| e.weight)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    use crate::diary::entities::{DayRecord, ExerciseEntry, FoodEntry, WeightEntry};

    use super::{aggregate, derive_macro_goals, project_weight, total_exercise_calories};

    fn food(calories: f64, p: f64, c: f64, f: f64) -> FoodEntry {
        FoodEntry {
            name: "test".into(),
            calories,
            p,
            c,
            f,
            fib: 1.0,
            sug: 2.0,
            sod: 10.0,
            image_url: None,
        }
    }

    fn weigh_in(date: &str, weight: f64) -> WeightEntry {
        let date = date.parse::<NaiveDate>().unwrap();
        WeightEntry {
            date: Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)),
            weight,
        }
    }

    #[test]
    fn empty_record_aggregates_to_zero() {
        let totals = aggregate(&DayRecord::default());
        assert_eq!(totals.food, 0.0);
        assert_eq!(totals.protein, 0.0);
        assert_eq!(totals.sodium, 0.0);
        assert_eq!(total_exercise_calories(&DayRecord::default()), 0.0);
    }

    #[test]
    fn aggregate_sums_across_all_slots() {
        let mut record = DayRecord::default();
        record.breakfast.push(food(300.0, 10.0, 40.0, 8.0));
        record.lunch.push(food(500.0, 30.0, 60.0, 15.0));
        record.snacks.push(food(150.0, 5.0, 20.0, 5.0));

        let totals = aggregate(&record);
        assert_eq!(totals.food, 950.0);
        assert_eq!(totals.protein, 45.0);
        assert_eq!(totals.carbs, 120.0);
        assert_eq!(totals.fat, 28.0);
        assert_eq!(totals.fiber, 3.0);
        assert_eq!(totals.sugar, 6.0);
        assert_eq!(totals.sodium, 30.0);
    }

    #[test]
    fn exercise_calories_fold_separately() {
        let mut record = DayRecord::default();
        record.exercises.push(ExerciseEntry {
            name: "run".into(),
            calories: 320.0,
        });
        record.exercises.push(ExerciseEntry {
            name: "rowing".into(),
            calories: 180.0,
        });
        assert_eq!(total_exercise_calories(&record), 500.0);
        // Workouts never leak into the food totals.
        assert_eq!(aggregate(&record).food, 0.0);
    }

    #[test]
    fn macro_goals_for_2000_kcal() {
        let goals = derive_macro_goals(2000);
        assert_eq!(goals.protein, 150);
        assert_eq!(goals.carbs, 200);
        // 2000 * 0.30 / 9 = 66.67, rounds up
        assert_eq!(goals.fat, 67);
    }

    #[test]
    fn weight_projects_latest_entry_before_cutoff() {
        let history = vec![weigh_in("2024-01-01", 70.0), weigh_in("2024-01-10", 71.0)];
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(project_weight(&history, as_of), 70.0);

        let later = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(project_weight(&history, later), 71.0);
    }

    #[test]
    fn weight_projection_sorts_unordered_history() {
        let history = vec![weigh_in("2024-01-10", 71.0), weigh_in("2024-01-01", 70.0)];
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(project_weight(&history, as_of), 70.0);
    }

    #[test]
    fn weight_defaults_to_zero_without_earlier_entries() {
        let history = vec![weigh_in("2024-01-10", 71.0)];
        let as_of = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(project_weight(&history, as_of), 0.0);
        assert_eq!(project_weight(&[], as_of), 0.0);
    }
}
