mod output;
mod queries;

use api_client::{Session, SessionFactory};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use configuration::LogLevel;
use core_types::{AcledEvent, FactbookCountry, Record, WorldBankIndicator};
use output::OutputFormat;
use std::process::ExitCode;
use std::time::Duration;

/// The main entry point for the Atlas data client.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("An error occurred: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Reads conflict events, country facts and development indicators from a Supabase project.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// How to print the rows.
    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Lines)]
    format: OutputFormat,

    /// Overrides the configured log level.
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevel>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the three sample queries (the default).
    Demo,
    /// Conflict events on or after a date.
    Events(EventsArgs),
    /// Factbook entries for a country.
    Country(CountryArgs),
    /// Development indicators for a country.
    Indicators(IndicatorsArgs),
}

#[derive(Parser)]
struct EventsArgs {
    /// Earliest event date (format: YYYY-MM-DD).
    #[arg(long, default_value = "2000-01-01")]
    since: NaiveDate,

    #[arg(long, default_value_t = 5)]
    limit: usize,
}

#[derive(Parser)]
struct CountryArgs {
    #[arg(long, default_value = "Jordan")]
    name: String,
}

#[derive(Parser)]
struct IndicatorsArgs {
    #[arg(long, default_value = "Jordan")]
    country: String,

    /// First year to include.
    #[arg(long, default_value_t = 2000)]
    from_year: i32,

    #[arg(long, default_value_t = 5)]
    limit: usize,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let _guard = configuration::init_tracing(&config.logging, cli.log_level)?;

    let mut factory = SessionFactory::from_config(&config.service)?;
    if let Some(secs) = cli.timeout {
        factory = factory.with_timeout(Duration::from_secs(secs));
    }
    tracing::info!(endpoint = %config.service.url, "Connecting to the data service.");

    let format = cli.format;
    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => {
            let (acled, factbook, world_bank) = futures::try_join!(
                factory.create_session(AcledEvent::schema().schema),
                factory.create_session(FactbookCountry::schema().schema),
                factory.create_session(WorldBankIndicator::schema().schema),
            )?;
            let since = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default();
            show_events(&acled, since, 5, format).await?;
            show_country(&factbook, "Jordan", format).await?;
            show_indicators(&world_bank, "Jordan", 2000, 5, format).await?;
        }
        Commands::Events(args) => {
            let session = factory.create_session(AcledEvent::schema().schema).await?;
            show_events(&session, args.since, args.limit, format).await?;
        }
        Commands::Country(args) => {
            let session = factory.create_session(FactbookCountry::schema().schema).await?;
            show_country(&session, &args.name, format).await?;
        }
        Commands::Indicators(args) => {
            let session = factory.create_session(WorldBankIndicator::schema().schema).await?;
            show_indicators(&session, &args.country, args.from_year, args.limit, format).await?;
        }
    }

    Ok(())
}

fn fetching_heading<T: Record>() -> String {
    format!("Fetching data from '{}'...", T::schema().qualified_name())
}

fn print_rows(body: String) {
    if !body.is_empty() {
        println!("{}", body);
    }
    println!();
}

async fn show_events(session: &Session, since: NaiveDate, limit: usize, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", fetching_heading::<AcledEvent>());
    let events = queries::events_since(session, since, limit).await?;
    tracing::info!(table = %AcledEvent::schema().qualified_name(), rows = events.len(), "Query completed.");
    print_rows(output::render_events(events.models(), format));
    Ok(())
}

async fn show_country(session: &Session, name: &str, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", fetching_heading::<FactbookCountry>());
    let countries = queries::country_facts(session, name).await?;
    tracing::info!(table = %FactbookCountry::schema().qualified_name(), rows = countries.len(), "Query completed.");
    print_rows(output::render_countries(countries.models(), format));
    Ok(())
}

async fn show_indicators(
    session: &Session,
    country: &str,
    from_year: i32,
    limit: usize,
    format: OutputFormat,
) -> anyhow::Result<()> {
    println!("{}", fetching_heading::<WorldBankIndicator>());
    let indicators = queries::indicators_since(session, country, from_year, limit).await?;
    tracing::info!(table = %WorldBankIndicator::schema().qualified_name(), rows = indicators.len(), "Query completed.");
    print_rows(output::render_indicators(indicators.models(), format));
    Ok(())
}
