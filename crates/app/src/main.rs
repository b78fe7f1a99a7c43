use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{BatchListFilter, BatchReport, Engine, Role};
use migration::{Migrator, MigratorTrait};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use error::Result;
use settings::{Overrides, Settings};

mod error;
mod settings;
mod views;

#[derive(Parser, Debug)]
#[command(name = "coopbook")]
#[command(about = "Feed batch costing and daily production reports for a poultry farm")]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long, global = true)]
    level: Option<String>,
    /// Override the database: `memory` or a SQLite file path.
    #[arg(long, global = true)]
    database: Option<String>,
    /// Override the default bag size in kg.
    #[arg(long, global = true)]
    bag_size_kg: Option<Decimal>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Batch(Batch),
    Summary(Summary),
}

#[derive(Args, Debug)]
struct Batch {
    #[command(subcommand)]
    command: BatchCommand,
}

#[derive(Subcommand, Debug)]
enum BatchCommand {
    /// Derive totals without storing anything.
    Compute(InputArgs),
    Create(InputArgs),
    /// Replace lines and header of an existing batch, keeping its id.
    Replace {
        #[arg(long)]
        id: Uuid,
        #[command(flatten)]
        input: InputArgs,
    },
    Show {
        #[arg(long)]
        id: Uuid,
        #[arg(long, default_value = "owner", value_parser = parse_role)]
        role: Role,
    },
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    List {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value = "owner", value_parser = parse_role)]
        role: Role,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// JSON batch file, `-` for stdin.
    #[arg(long, default_value = "-")]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct Summary {
    #[command(subcommand)]
    command: SummaryCommand,
}

#[derive(Subcommand, Debug)]
enum SummaryCommand {
    Day {
        #[arg(long)]
        date: NaiveDate,
    },
    Period {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
}

fn parse_role(raw: &str) -> std::result::Result<Role, String> {
    Role::try_from(raw).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let overrides = Overrides {
        config: cli.config.clone(),
        level: cli.level.clone(),
        database: cli.database.clone(),
        bag_size_kg: cli.bag_size_kg,
    };

    let settings = match Settings::load(&overrides) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("failed to load settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "coopbook={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, settings: &Settings) -> Result<()> {
    let db = connect(&settings.database).await?;
    let engine = Engine::builder()
        .database(db)
        .default_bag_size_kg(settings.engine.default_bag_size_kg)
        .build()
        .await?;

    match command {
        Command::Batch(batch) => run_batch(&engine, batch.command).await,
        Command::Summary(summary) => run_summary(&engine, summary.command).await,
    }
}

async fn run_batch(engine: &Engine, command: BatchCommand) -> Result<()> {
    match command {
        BatchCommand::Compute(args) => {
            let cmd = views::batch_cmd(read_input(&args.input)?);
            let batch = engine.compute_batch(&cmd)?;
            print_json(&views::batch_view(
                BatchReport::for_role(batch, Role::Owner),
                false,
            ))
        }
        BatchCommand::Create(args) => {
            let cmd = views::batch_cmd(read_input(&args.input)?);
            let batch = engine.create_batch(cmd).await?;
            print_json(&views::batch_view(
                BatchReport::for_role(batch, Role::Owner),
                true,
            ))
        }
        BatchCommand::Replace { id, input } => {
            let cmd = views::batch_cmd(read_input(&input.input)?);
            let batch = engine.replace_batch(id, cmd).await?;
            print_json(&views::batch_view(
                BatchReport::for_role(batch, Role::Owner),
                true,
            ))
        }
        BatchCommand::Show { id, role } => {
            let report = engine.batch_report(id, role).await?;
            print_json(&views::batch_view(report, true))
        }
        BatchCommand::Delete { id } => {
            engine.delete_batch(id).await?;
            print_json(&api_types::feed_batch::FeedBatchDeleted { id })
        }
        BatchCommand::List { from, to, role } => {
            let filter = BatchListFilter { from, to };
            let reports = engine.batch_reports(&filter, role).await?;
            let batches: Vec<_> = reports
                .into_iter()
                .map(|report| views::batch_view(report, true))
                .collect();
            print_json(&batches)
        }
    }
}

async fn run_summary(engine: &Engine, command: SummaryCommand) -> Result<()> {
    match command {
        SummaryCommand::Day { date } => {
            let summary = engine.daily_summary(date).await?;
            print_json(&views::daily_view(summary))
        }
        SummaryCommand::Period { from, to } => {
            let period = engine.period_summary(from, to).await?;
            print_json(&views::period_view(period))
        }
    }
}

fn read_input(path: &Path) -> Result<api_types::feed_batch::FeedBatchNew> {
    let raw = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn connect(config: &settings::Database) -> Result<sea_orm::DatabaseConnection> {
    let database = sea_orm::Database::connect(config.url()).await?;
    Migrator::up(&database, None).await?;
    tracing::debug!(url = %config.url(), "database ready");
    Ok(database)
}
