use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::debug;

use fitdata::db::operations::{
    delete_user, list_users, top_exercises_since, workout_counts_by_date,
};
use fitdata::logging::{init_logger, set_log_level, verbosity_level};
use fitdata::{DbConfig, SessionFactory};

#[derive(Parser, Debug)]
#[command(version, about = "fitdata - fitness tracker data tool", long_about = None)]
struct Args {
    /// Database to open. Falls back to DATABASE_URL.
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log level by name (off, error, warn, info, debug, trace). Overrides -v.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// List all users
    Users {
        #[arg(long)]
        json: bool,
    },
    /// Delete a user and everything they own
    DeleteUser { id: i64 },
    /// Number of workouts per day
    WorkoutsByDate,
    /// Most used exercises over a recent window
    TopExercises {
        #[arg(
            long,
            default_value_t = 30,
            value_parser = clap::value_parser!(i64).range(0..=36500)
        )]
        days: i64,
        #[arg(
            long,
            default_value_t = 20,
            value_parser = clap::value_parser!(i64).range(1..=10_000)
        )]
        limit: i64,
    },
}

fn days_before(today: NaiveDate, days: i64) -> Result<NaiveDate> {
    TimeDelta::try_days(days)
        .and_then(|window| today.checked_sub_signed(window))
        .with_context(|| format!("--days {} reaches outside the supported date range", days))
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    init_logger(verbosity_level(args.verbose));
    if let Some(name) = &args.log_level {
        anyhow::ensure!(set_log_level(name), "Unknown log level '{}'", name);
    }

    let config = match args.database_url {
        Some(url) => Some(DbConfig::new(url)),
        None => DbConfig::from_env(),
    };
    let factory = SessionFactory::from_config(config.as_ref())?
        .context("No database configured: pass --database-url or set DATABASE_URL")?;

    debug!("Running {:?}", args.command);
    match args.command {
        Commands::Migrate => {
            factory.migrate()?;
            println!("Schema is up to date");
        }
        Commands::Users { json } => {
            let users = factory.with_session(list_users)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else if users.is_empty() {
                println!("No users found");
            } else {
                for user in &users {
                    println!("{}", user);
                }
            }
        }
        Commands::DeleteUser { id } => {
            let deleted = factory.with_session(|conn| delete_user(conn, id))?;
            if deleted == 0 {
                println!("No user with id {}", id);
            } else {
                println!("Deleted user {}", id);
            }
        }
        Commands::WorkoutsByDate => {
            for row in factory.with_session(workout_counts_by_date)? {
                println!("{}  {}", row.workout_date, row.count);
            }
        }
        Commands::TopExercises { days, limit } => {
            let since = days_before(Utc::now().date_naive(), days)?;
            let rows = factory.with_session(|conn| top_exercises_since(conn, since, limit))?;
            for (rank, row) in rows.iter().enumerate() {
                println!("{:>3}. {} ({})", rank + 1, row.exercise_name, row.count);
            }
        }
    }

    Ok(())
}
