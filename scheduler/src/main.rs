// Reminder job entry point
//
// Normally triggered once a day by an external cron. Every subcommand goes
// through the same planning code; the flags only decide whether and to whom
// messages are actually sent.

mod commands;
mod output;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use common::config::Settings;
use common::schedule::parse_civil_date;
use common::telemetry::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "send-reminders",
    about = "Reserve-order reminder and collections SMS job",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding default.toml / local.toml
    #[arg(long, global = true, env = "REMINDERS_CONFIG_DIR", default_value = "config")]
    config: PathBuf,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send today's reminders
    Run {
        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Log messages instead of sending them
        #[arg(long)]
        dry_run: bool,

        /// Only process orders for this phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// List pending reservations and today's action for each
    List {
        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Print which day offsets get which message, without touching any service
    Simulate {
        /// Treat this date (YYYY-MM-DD) as today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// First day offset (negative = overdue)
        #[arg(long, default_value_t = -30, allow_negative_numbers = true)]
        from: i64,

        /// Last day offset
        #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
        to: i64,
    },
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_civil_date(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from_path(&cli.config).with_context(|| {
        format!("Failed to load configuration from {}", cli.config.display())
    })?;

    init_logging(&settings.observability.log_level, settings.observability.json)?;

    match cli.command {
        Commands::Run {
            date,
            dry_run,
            phone,
        } => commands::run(&settings, date, dry_run, phone, cli.json).await,
        Commands::List { date } => commands::list(&settings, date, cli.json).await,
        Commands::Simulate { date, from, to } => {
            commands::simulate(&settings, date, from, to, cli.json)
        }
    }
}
