use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use homegym_schedule::client::HomegymClient;
use homegym_schedule::config::AppConfig;
use homegym_schedule::dates::{date_from_seconds, format_date_time};
use homegym_schedule::models::{Program, ProgramInstance};
use homegym_schedule::report::{schedule_rows, status_brief, write_schedule_csv};
use homegym_schedule::schedule::workout_coords;
use homegym_schedule::status::{instance_status_at, select_current_instance_at};
use homegym_schedule::stores::Stores;
use homegym_schedule::validate::validate_program;

#[derive(Parser)]
#[command(
    name = "homegym",
    about = "Program schedule and progress for the homegym workout log"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Progress and today's workout for the activity's current program.
    Status {
        #[arg(long)]
        activity: String,
    },

    /// Day-by-day schedule of the current program as CSV.
    Schedule {
        #[arg(long)]
        activity: String,

        /// Writes to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Events logged on the calendar day of a program day.
    Events {
        #[arg(long)]
        activity: String,

        #[arg(long)]
        day: usize,
    },

    /// Checks a program JSON file without contacting the service.
    Validate { program: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::load().context("Failed to load configuration")?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { program } => validate_file(&program),
        Command::Status { activity } => {
            let (_, stores) = connect(&config, &activity).await?;
            let Some(instance) = current_instance(&stores, &activity) else {
                println!("No program in progress for activity {}.", activity);
                return Ok(());
            };
            let now = Utc::now();
            let status = instance_status_at(instance, now);
            print!("{}", status_brief(instance, &status, now));
            Ok(())
        }
        Command::Schedule { activity, out } => {
            let (_, stores) = connect(&config, &activity).await?;
            let Some(instance) = current_instance(&stores, &activity) else {
                bail!("No program in progress for activity {}", activity);
            };
            let rows = schedule_rows(instance, Utc::now());
            match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_schedule_csv(&rows, file)?;
                    info!("wrote {} days to {}", rows.len(), path.display());
                }
                None => write_schedule_csv(&rows, io::stdout().lock())?,
            }
            Ok(())
        }
        Command::Events { activity, day } => {
            let (client, stores) = connect(&config, &activity).await?;
            let Some(instance) = current_instance(&stores, &activity) else {
                bail!("No program in progress for activity {}", activity);
            };
            let coords = workout_coords(instance, day)?;
            let events = client.events_on_workout_day(instance, coords).await?;
            if events.is_empty() {
                println!("No events logged for day {} {}.", day, coords);
            }
            for event in events {
                println!(
                    "{}  {}  overall {}  {}",
                    event.id,
                    format_date_time(&date_from_seconds(Some(event.date))),
                    event.overall,
                    event.notes
                );
            }
            Ok(())
        }
    }
}

fn current_instance<'a>(stores: &'a Stores, activity: &str) -> Option<&'a ProgramInstance> {
    select_current_instance_at(&stores.instances, activity, Utc::now())
}

/// Logs in and loads the activity's programs and active instances.
async fn connect(config: &AppConfig, activity: &str) -> Result<(HomegymClient, Stores)> {
    let base_url = config
        .base_url()
        .with_context(|| format!("Invalid base_url {}", config.base_url))?;
    let client = HomegymClient::new(base_url.as_str(), config.page_size)?;

    if config.username.is_empty() {
        bail!("No username configured; set HOMEGYM_USERNAME or username in Homegym.toml");
    }
    let password = match &config.password {
        Some(p) => p.clone(),
        None => rpassword::prompt_password(format!("Password for {}: ", config.username))
            .context("Failed to read password")?,
    };
    client
        .login(&config.username, &password)
        .await
        .context("Login failed")?;

    let mut stores = Stores::new(config.page_size);
    client
        .load_activity(&mut stores, activity)
        .await
        .with_context(|| format!("Failed to load activity {}", activity))?;
    Ok((client, stores))
}

fn validate_file(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let program: Program = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a program", path.display()))?;

    match validate_program(&program) {
        Ok(()) => {
            println!("{} is valid.", path.display());
            Ok(())
        }
        Err(e) => bail!("{} is invalid: {}", path.display(), e),
    }
}
