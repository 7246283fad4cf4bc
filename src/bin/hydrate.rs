//! Command-line session against a running hydration service.

use chrono::{Local, NaiveTime};
use clap::{Parser, Subcommand};
use hydration::fill::BOTTLE_LEVEL_HEIGHT;
use hydration::reminder::{AwakeWindow, Nudge, ReminderLedger, next_nudge};
use hydration::store::{HydrationState, NUDGE_ML};
use hydration::{ClientConfig, HttpRemote, HydrationStore, StoreError, WeeklySummary};
use std::process::ExitCode;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(
    name = "hydrate",
    version,
    about = "Track today's water intake against your goal"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the hydration service (overrides HYDRATION_API_BASE).
    #[arg(long = "api-base", value_name = "URL", global = true)]
    api_base: Option<String>,

    /// Opaque identity token sent with every request (overrides HYDRATION_INIT_DATA).
    #[arg(long = "init-data", value_name = "TOKEN", global = true)]
    init_data: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// Print the session snapshot as JSON instead of text.
    #[arg(long = "json", global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Show today's progress.
    Today,
    /// Log water drunk; defaults to one glass.
    Add { amount_ml: Option<u32> },
    /// Correct an over-count.
    Remove {
        #[arg(default_value_t = NUDGE_ML as u32)]
        amount_ml: u32,
    },
    /// Zero today's intake.
    Reset,
    /// Change the daily goal (500 to 10000 ml).
    Goal {
        #[arg(allow_negative_numbers = true)]
        goal_ml: i64,
    },
    /// Summarize the trailing days.
    Week {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Suggest when and how much to drink next.
    Nudge {
        /// Time of the last drink today (HH:MM).
        #[arg(long = "last-intake", value_name = "HH:MM", value_parser = parse_clock)]
        last_intake: Option<NaiveTime>,
        #[arg(long = "wake", value_name = "HH:MM", value_parser = parse_clock)]
        wake_at: Option<NaiveTime>,
        #[arg(long = "sleep", value_name = "HH:MM", value_parser = parse_clock)]
        sleep_at: Option<NaiveTime>,
    },
}

fn parse_clock(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|err| format!("expected HH:MM: {err}"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StoreError> {
    let mut config = ClientConfig::from_env();
    if let Some(api_base) = cli.api_base {
        config = config.with_api_base(api_base);
    }
    if let Some(init_data) = cli.init_data {
        config = config.with_init_data(init_data);
    }
    if let Some(secs) = cli.timeout.filter(|secs| *secs > 0) {
        config.timeout = Duration::from_secs(secs);
    }

    let store = HydrationStore::new(HttpRemote::new(config)?);
    let loaded = store.load().await?;

    match cli.command {
        Command::Today => {}
        Command::Add { amount_ml } => {
            let amount = amount_ml.unwrap_or(loaded.default_glass_ml);
            store.apply_delta(i64::from(amount)).await?;
        }
        Command::Remove { amount_ml } => {
            store.apply_delta(-i64::from(amount_ml)).await?;
        }
        Command::Reset => {
            store.reset().await?;
        }
        Command::Goal { goal_ml } => {
            store.set_goal(goal_ml).await?;
        }
        Command::Week { days } => {
            let summary = store.load_weekly(days).await?;
            if !cli.json {
                print_week(&summary);
                return Ok(());
            }
        }
        Command::Nudge {
            last_intake,
            wake_at,
            sleep_at,
        } => {
            let defaults = AwakeWindow::default();
            let window = AwakeWindow {
                wake_at: wake_at.unwrap_or(defaults.wake_at),
                sleep_at: sleep_at.unwrap_or(defaults.sleep_at),
            };
            let now = Local::now().naive_local();
            let last_intake = last_intake.map(|time| now.date().and_time(time));
            print_nudge(&loaded, next_nudge(&loaded, &window, now, last_intake));
            if let Some(period) = ReminderLedger::default().check(&loaded, now) {
                println!("{}", period.message(&loaded));
            }
            return Ok(());
        }
    }

    if cli.json {
        match serde_json::to_string_pretty(&store.snapshot()) {
            Ok(payload) => println!("{payload}"),
            Err(err) => error!("failed to encode snapshot: {err}"),
        }
    } else {
        print_today(&store);
    }
    Ok(())
}

fn print_today(store: &HydrationStore<HttpRemote>) {
    let (Some(state), Some(fill)) = (store.hydration(), store.fill()) else {
        return;
    };

    println!("{} ml / {} ml", state.consumed_ml, state.goal_ml);
    println!(
        "{}% complete (level {:.0}/{BOTTLE_LEVEL_HEIGHT})",
        fill.rounded_percent(),
        fill.level(BOTTLE_LEVEL_HEIGHT)
    );
    if fill.is_goal_reached {
        println!("Goal achieved! Keep hydrated!");
    } else {
        println!("{} ml remaining", fill.remaining_ml);
    }
    if let Some(amounts) = store.quick_add_amounts() {
        let labels: Vec<String> = amounts.iter().map(|ml| format!("+{ml}")).collect();
        println!("quick add: {}", labels.join(" "));
    }
}

fn print_nudge(state: &HydrationState, nudge: Nudge) {
    match nudge {
        Nudge::GoalMet => println!("Goal of {} ml reached, no reminder needed.", state.goal_ml),
        Nudge::QuietUntilTomorrow => println!("Quiet hours, next reminder tomorrow."),
        Nudge::AtWake(at) => println!("Quiet hours, next reminder at {}.", at.format("%H:%M")),
        Nudge::Drink { at, dose_ml } => println!("Drink {dose_ml} ml at {}.", at.format("%H:%M")),
    }
}

fn print_week(summary: &WeeklySummary) {
    println!("average per active day: {} ml", summary.average_ml);
    println!(
        "best day:  {} ({} ml)",
        summary.best_day.date.format("%a %d %b"),
        summary.best_day.ml
    );
    println!(
        "worst day: {} ({} ml)",
        summary.worst_day.date.format("%a %d %b"),
        summary.worst_day.ml
    );
    println!(
        "goal reached on {}% of active days",
        summary.goal_hit_percent
    );
    println!("trend: {}", summary.trend.to_path(140.0, 40.0));
}
