//! Kollektiv CLI Entry Point

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use kollektiv_lib::commands;
use kollektiv_lib::domain::{RecordId, UnitKind};
use kollektiv_lib::repository::PhotoUpload;
use kollektiv_lib::store::MAX_MONTH_OFFSET;
use kollektiv_lib::views::render_dashboard;
use kollektiv_lib::{connect, App, AppConfig, DomainError, DomainResult};

#[derive(Parser, Debug)]
#[command(name = "kollektiv")]
#[command(about = "Shared calendar, inventory, chore leaderboard and photo proofs")]
#[command(
    after_help = "Environment:\n  KOLLEKTIV_CONFIG   Config file (default kollektiv.json)\n  KOLLEKTIV_*        Overrides for single config fields"
)]
struct Cli {
    /// Defaults to `show`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Print every view
    Show,
    /// Set an item's quantity
    SetQty {
        id: RecordId,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },
    /// Add an inventory item
    AddItem {
        name: String,
        #[arg(value_enum)]
        unit: UnitArg,
        /// Highest count (1-50); anything unusable means 20
        max: Option<String>,
    },
    /// Remove an inventory item
    RemoveItem { id: RecordId },
    /// Add a calendar event
    AddEvent {
        /// YYYY-MM-DD
        date: NaiveDate,
        title: String,
        #[arg(default_value = "")]
        note: String,
    },
    /// Remove a calendar event
    RemoveEvent { id: RecordId },
    /// Show the calendar this many months away
    Month {
        #[arg(
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i32).range(-i64::from(MAX_MONTH_OFFSET)..=i64::from(MAX_MONTH_OFFSET))
        )]
        offset: i32,
    },
    /// Upload a chore proof
    Proof {
        user: String,
        task: String,
        /// File path or `data:` URL
        photo: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum UnitArg {
    Count,
    Percent,
}

impl From<UnitArg> for UnitKind {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Count => UnitKind::Count,
            UnitArg::Percent => UnitKind::Percent,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli.command.unwrap_or(Command::Show)).await {
        eprintln!("kollektiv: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> DomainResult<()> {
    let config_path = std::env::var("KOLLEKTIV_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(kollektiv_lib::config::CONFIG_FILE));
    let config = AppConfig::from_file_and_env(&config_path)?;

    if let Err(e) = rolling_logger::init_logger(&config.log_dir, "Kollektiv") {
        eprintln!("Failed to init logger: {}", e);
    }
    let _ = rolling_logger::info(&format!("Kollektiv {} starting", env!("CARGO_PKG_VERSION")));

    let app = App::new(connect(&config)?, &config);
    let today = Local::now().date_naive();
    commands::load_data(&app, today).await;

    let outcome = dispatch(&app, command).await;
    app.shutdown().await;
    if let Err(e) = &outcome {
        let _ = rolling_logger::error(&format!("Command failed: {}", e));
    }
    outcome?;

    let state = app.snapshot().await;
    let alert = app.alerts.current();
    print!("{}", render_dashboard(&state, today, alert.as_ref()));
    Ok(())
}

/// Count items without a usable maximum fall back to the default
fn max_hint(raw: Option<&str>) -> Option<i64> {
    let raw = raw?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        log::debug!("Ignoring max {:?}, using the default", raw);
    }
    parsed
}

async fn dispatch(app: &App, command: Command) -> DomainResult<()> {
    match command {
        Command::Show => Ok(()),
        Command::SetQty { id, value } => match commands::set_quantity(app, id, value).await {
            Some(item) => {
                println!("{} = {}", item.name, item.display_value());
                Ok(())
            }
            None => Err(DomainError::NotFound(format!("item {}", id))),
        },
        Command::AddItem { name, unit, max } => {
            let item = commands::add_item(app, &name, unit.into(), max_hint(max.as_deref())).await?;
            println!("added [{}] {}", item.id, item.name);
            Ok(())
        }
        Command::RemoveItem { id } => commands::remove_item(app, id).await,
        Command::AddEvent { date, title, note } => {
            let event = commands::add_event(app, date, &title, &note).await?;
            println!("added [{}] {} on {}", event.id, event.title, event.date);
            Ok(())
        }
        Command::RemoveEvent { id } => commands::remove_event(app, id).await,
        Command::Month { offset } => {
            commands::shift_month(app, offset).await;
            Ok(())
        }
        Command::Proof { user, task, photo } => {
            let photo = PhotoUpload::from_source(&photo).await?;
            let proof = commands::submit_proof(app, &user, &task, photo).await?;
            println!("{} +1 for {}", proof.user_name, proof.task);
            Ok(())
        }
    }
}
