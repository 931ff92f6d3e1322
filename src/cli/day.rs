use std::fmt::Display;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    diary::{
        aggregate::{aggregate, derive_macro_goals, project_weight, total_exercise_calories},
        settings::resolve_daily_goal,
        store::{DiaryStore, DiaryStoreImpl},
    },
    utils::clock::Clock,
};

use super::{
    output::{self, DayView},
    Args,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Parses a human date argument into a calendar date, defaulting to today.
pub fn parse_day_arg(
    value: Option<&str>,
    date_style: DateStyle,
    clock: &impl Clock,
) -> Result<NaiveDate> {
    let Some(value) = value else {
        return Ok(clock.today());
    };
    match parse_date_string(value, Local::now(), date_style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {value:?}: {e}"),
            )
            .into()),
    }
}

#[derive(Debug, Parser)]
pub struct DayCommand {
    #[arg(
        long = "date",
        short,
        help = "Day to show. Examples are \"yesterday\", \"15/03/2025\", \"3 days ago\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Command to process the `day` command: the dashboard of one day's record
/// with all derived values recomputed from the stored arrays.
pub async fn process_day_command(
    store: &DiaryStoreImpl,
    clock: &impl Clock,
    DayCommand { date, date_style }: DayCommand,
) -> Result<()> {
    let date = parse_day_arg(date.as_deref(), date_style, clock)?;

    let record = store.load(date).await?;
    let profile = store.user_profile().await?;
    let water_settings = store.water_settings().await?;
    let weight_history = store.weight_history().await?;

    let daily_goal = resolve_daily_goal(&profile, None, None);

    let view = DayView {
        date,
        is_today: date == clock.today(),
        totals: aggregate(&record),
        exercise_calories: total_exercise_calories(&record),
        daily_goal,
        macro_goals: derive_macro_goals(daily_goal),
        water_settings,
        projected_weight: project_weight(&weight_history, date),
        record,
    };

    output::print_day(&view);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use crate::utils::clock::MockClock;

    use super::{parse_day_arg, DateStyle};

    fn clock_at(date: NaiveDate) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_today().return_const(date);
        clock.expect_now().returning(Utc::now);
        clock
    }

    #[test]
    fn missing_date_defaults_to_today() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let parsed = parse_day_arg(None, DateStyle::Uk, &clock_at(today)).unwrap();
        assert_eq!(parsed, today);
    }

    #[test]
    fn explicit_dates_respect_the_dialect() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let uk = parse_day_arg(Some("03/04/2024"), DateStyle::Uk, &clock_at(today)).unwrap();
        assert_eq!(uk, NaiveDate::from_ymd_opt(2024, 4, 3).unwrap());
        let us = parse_day_arg(Some("03/04/2024"), DateStyle::Us, &clock_at(today)).unwrap();
        assert_eq!(us, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
    }

    #[test]
    fn garbage_dates_error() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert!(parse_day_arg(Some("not a date"), DateStyle::Uk, &clock_at(today)).is_err());
    }
}
