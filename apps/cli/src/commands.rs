//! CLI definition, tracing setup, and the daily run.

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use dailybread_core::{DailyPost, Delivery, RunOutcome};
use dailybread_discord::WebhookPublisher;
use dailybread_schedule::SheetsClient;
use dailybread_shared::{AppConfig, load_config, load_config_from, webhook_url};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Daily Bread: post the day's Bible reading to Discord.
#[derive(Parser, Debug)]
#[command(
    name = "daily-bread",
    version,
    about = "Post today's scheduled Bible reading in English and Korean to a Discord webhook.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.dailybread/dailybread.toml).
    #[arg(long, env = "DAILYBREAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run for this date (YYYY-MM-DD) instead of today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Print the message JSON instead of posting it.
    #[arg(long)]
    pub dry_run: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "dailybread=info,daily_bread=info",
        1 => "dailybread=debug,daily_bread=debug",
        _ => "dailybread=trace,daily_bread=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Daily run
// ---------------------------------------------------------------------------

/// Run the pipeline once.
///
/// Everything that can be checked locally (config file, webhook URL,
/// credentials file) is checked before the first request goes out.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_ref())?;
    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());

    let publisher = if cli.dry_run {
        None
    } else {
        Some(WebhookPublisher::new(webhook_url(&config)?)?)
    };
    let post = DailyPost::new(&config)?;
    let schedule = SheetsClient::from_config(&config)?;

    let delivery = match &publisher {
        Some(publisher) => Delivery::Publish(publisher),
        None => Delivery::DryRun,
    };

    match post.run(&schedule, date, delivery).await? {
        RunOutcome::NoReading => Ok(()),
        RunOutcome::Posted { reference, .. } => {
            println!("Posted {reference}");
            Ok(())
        }
        RunOutcome::DryRun { message, .. } => {
            println!("{}", serde_json::to_string_pretty(&message)?);
            Ok(())
        }
        RunOutcome::Rejected {
            reference, status, ..
        } => Err(eyre!("webhook rejected the post for {reference} (HTTP {status})")),
    }
}

fn resolve_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    debug!(sheet = %config.schedule.sheet_name, "configuration loaded");
    info!(
        english = %config.english.label,
        korean = %config.korean.label,
        "languages configured"
    );
    Ok(config)
}
