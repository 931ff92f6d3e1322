pub mod day;
pub mod log;
pub mod output;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    diary::{
        aggregate::derive_macro_goals,
        settings::resolve_daily_goal,
        store::DiaryStoreImpl,
    },
    sync::{RemoteClient, RemoteConfig, RemoteSync},
    utils::{clock::DefaultClock, dir::create_application_default_path, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "Daylog", version)]
#[command(about = "Local-first daily nutrition and fitness diary", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Data directory. By default saves into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Show the diary dashboard for a day")]
    Day {
        #[command(flatten)]
        command: day::DayCommand,
    },
    #[command(about = "Log a food item into a meal slot for today")]
    Food {
        #[command(flatten)]
        command: log::FoodCommand,
    },
    #[command(about = "Log a workout for today")]
    Exercise {
        #[command(flatten)]
        command: log::ExerciseCommand,
    },
    #[command(about = "Add or remove cups of water for today")]
    Water {
        #[command(flatten)]
        command: log::WaterCommand,
    },
    #[command(about = "Record a weigh-in")]
    Weight {
        #[command(flatten)]
        command: log::WeightCommand,
    },
    #[command(about = "Show gram targets derived from a calorie goal")]
    Goals {
        #[arg(long, help = "Calorie goal to derive from, defaults to the stored profile goal")]
        calories: Option<u32>,
    },
    #[command(subcommand, about = "Adjust stored settings")]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    #[command(about = "Water goal and cup size")]
    Water {
        #[arg(long, help = "Daily goal in cups (1-50)")]
        goal: Option<u32>,
        #[arg(long = "cup-size", help = "Cup size in ml (50-2000)")]
        cup_size: Option<u32>,
    },
    #[command(about = "Daily calorie goal stored in the profile")]
    Goal {
        #[arg(help = "Daily goal in kcal")]
        calories: u32,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let data_dir = match args.dir {
        Some(v) => v,
        None => create_application_default_path()?,
    };
    enable_logging(&data_dir, logging_level, args.log)?;

    let store = DiaryStoreImpl::new(data_dir)?;
    let clock = DefaultClock;
    let remote: Option<Arc<dyn RemoteSync>> = match RemoteConfig::from_env() {
        Some(config) => Some(Arc::new(RemoteClient::new(config)?)),
        None => None,
    };

    match args.commands {
        Commands::Day { command } => day::process_day_command(&store, &clock, command).await,
        Commands::Food { command } => {
            log::process_food_command(&store, &clock, remote, command).await
        }
        Commands::Exercise { command } => {
            log::process_exercise_command(&store, &clock, remote, command).await
        }
        Commands::Water { command } => {
            log::process_water_command(&store, &clock, remote, command).await
        }
        Commands::Weight { command } => log::process_weight_command(&store, &clock, command).await,
        Commands::Goals { calories } => process_goals_command(&store, calories).await,
        Commands::Settings(command) => process_settings_command(&store, command).await,
    }
}

async fn process_goals_command(store: &DiaryStoreImpl, calories: Option<u32>) -> Result<()> {
    let profile = store.user_profile().await?;
    let daily_goal = resolve_daily_goal(&profile, calories, None);
    output::print_macro_goals(daily_goal, derive_macro_goals(daily_goal));
    Ok(())
}

async fn process_settings_command(store: &DiaryStoreImpl, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Water { goal, cup_size } => {
            let mut settings = store.water_settings().await?;
            if let Some(goal) = goal {
                settings.goal = goal;
            }
            if let Some(cup_size) = cup_size {
                settings.cup_size = cup_size;
            }
            store.set_water_settings(&settings).await?;
            println!(
                "Water settings saved: {} cups/day, {} ml per cup",
                settings.goal, settings.cup_size
            );
        }
        SettingsCommand::Goal { calories } => {
            let mut profile = store.user_profile().await?;
            profile.daily_goal = Some(calories);
            store.set_user_profile(&profile).await?;
            println!("Daily calorie goal saved: {calories} kcal");
        }
    }
    Ok(())
}
