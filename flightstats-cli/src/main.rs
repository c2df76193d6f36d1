//! FlightStats CLI: ingest, query and export commands.
//!
//! Commands:
//! - `ingest`: load a statistics CSV into the SQLite database
//! - `status`: report the last ingestion run and row count
//! - `markets` / `years`: list the values available for filtering
//! - `chart`: print the chart payload for a market and period as JSON
//! - `export`: write a period's rows as CSV or a Markdown table
//! - `history`: show a user's recently charted filters, or replay one
//! - `config`: print the effective configuration as TOML

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flightstats_core::domain::FilterRequest;
use flightstats_service::{ApiResponse, AppConfig, DashboardService, ResponseBody};
use log::info;

#[derive(Parser)]
#[command(
    name = "flightstats",
    about = "FlightStats CLI: air traffic statistics ingestion and queries"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides the config file).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a statistics CSV, replacing the stored data.
    ///
    /// Rows are kept when carrier, flight group and nature match the
    /// `[ingest]` config exactly (default GLO / REGULAR / DOMÉSTICA). For files
    /// labelled in English set `nature = "DOMESTIC"` in the config file.
    Ingest {
        /// Semicolon-delimited statistics file.
        csv: PathBuf,

        /// Rows per chunk (overrides the config file).
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Show the last ingestion run and the stored row count.
    Status,
    /// List stored markets.
    Markets,
    /// List stored years.
    Years,
    /// Print chart data for a market and period as JSON.
    Chart {
        #[command(flatten)]
        filter: FilterArgs,

        /// Record the filter in this user's history.
        #[arg(long)]
        user: Option<String>,
    },
    /// Export a period's rows.
    Export {
        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file. Prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show a user's recently charted filters.
    History {
        user: String,

        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Chart the entry with this id instead of listing.
        #[arg(long)]
        replay: Option<i64>,
    },
    /// Print the effective configuration (file, defaults and `--db`) as TOML.
    Config,
}

#[derive(Args)]
struct FilterArgs {
    /// Market key, e.g. SBGRSBSV.
    market: String,

    #[arg(long)]
    year_start: i32,

    #[arg(long)]
    year_end: i32,

    #[arg(long, default_value_t = 1)]
    month_start: u32,

    #[arg(long, default_value_t = 12)]
    month_end: u32,
}

impl FilterArgs {
    fn to_request(&self) -> FilterRequest {
        FilterRequest::new(self.market.clone(), self.year_start, self.year_end)
            .with_months(self.month_start, self.month_end)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Table,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(db) = cli.db {
        config.database = db;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    match cli.command {
        Commands::Ingest { csv, chunk_size } => {
            if let Some(n) = chunk_size {
                config.ingest.chunk_size = n;
            }
            run_ingest(&config, &csv)
        }
        Commands::Status => run_status(&config),
        Commands::Markets => {
            let data = open_service(&config)?.initial_data()?;
            for market in data.markets {
                println!("{market}");
            }
            Ok(())
        }
        Commands::Years => {
            let data = open_service(&config)?.initial_data()?;
            for year in data.years {
                println!("{year}");
            }
            Ok(())
        }
        Commands::Chart { filter, user } => run_chart(&config, &filter, user.as_deref()),
        Commands::Export {
            filter,
            format,
            output,
        } => run_export(&config, &filter, format, output.as_deref()),
        Commands::History {
            user,
            limit,
            replay,
        } => match replay {
            Some(id) => run_replay(&config, &user, id),
            None => run_history(&config, &user, limit),
        },
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn open_service(config: &AppConfig) -> Result<DashboardService> {
    DashboardService::open(&config.database)
        .with_context(|| format!("failed to open database {}", config.database.display()))
}

fn run_ingest(config: &AppConfig, csv: &Path) -> Result<()> {
    let opts = config.ingest.to_options()?;
    let mut service = open_service(config)?;
    let report = service
        .ingest(csv, &opts)
        .with_context(|| format!("ingest of {} failed", csv.display()))?;

    println!(
        "Ingested {} of {} rows in {} chunk(s) into {}",
        report.rows_written,
        report.rows_read,
        report.chunks,
        config.database.display()
    );
    if report.is_empty() {
        println!("Warning: no rows matched the filter {:?}", opts.row_filter);
    }
    Ok(())
}

fn run_status(config: &AppConfig) -> Result<()> {
    let service = open_service(config)?;
    let repo = service.repository();

    println!("Database: {}", config.database.display());
    println!("Rows:     {}", repo.count_rows()?);
    match repo.last_ingest()? {
        Some(meta) => {
            println!("Source:   {}", meta.source);
            println!("Hash:     {}", meta.source_hash);
            println!(
                "Run:      {} chunk(s), {} of {} rows kept",
                meta.chunks, meta.rows_written, meta.rows_read
            );
            if let Some(at) = meta.ingested_at {
                println!("At:       {}", at.to_rfc3339());
            }
        }
        None => println!("No ingestion recorded."),
    }
    Ok(())
}

fn run_chart(config: &AppConfig, filter: &FilterArgs, user: Option<&str>) -> Result<()> {
    let service = open_service(config)?;
    let request = filter.to_request();

    let response = match user {
        Some(user) => match service.chart_for_user(user, &request) {
            Ok(chart) => ApiResponse::ok(chart),
            Err(err) => ApiResponse::from_error(&err),
        },
        None => service.handle_chart(&request),
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    if let ResponseBody::Chart(chart) = &response.body {
        if chart.is_empty() {
            eprintln!("{}", chart.message.as_deref().unwrap_or("No data."));
        }
    }
    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_export(
    config: &AppConfig,
    filter: &FilterArgs,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let service = open_service(config)?;
    let request = filter.to_request();
    let rendered = match format {
        ExportFormat::Csv => service.csv_for(&request)?,
        ExportFormat::Table => service.table_for(&request)?,
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("export written to {}", path.display());
            println!("Export saved to: {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn run_history(config: &AppConfig, user: &str, limit: usize) -> Result<()> {
    let service = open_service(config)?;
    let entries = service.history()?.recent(user, limit)?;

    if entries.is_empty() {
        println!("No history for {user}.");
        return Ok(());
    }
    for e in entries {
        println!(
            "#{:<5} {}  {}  {}-{:02} .. {}-{:02}",
            e.id,
            e.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            e.market,
            e.year_start,
            e.month_start,
            e.year_end,
            e.month_end
        );
    }
    Ok(())
}

fn run_replay(config: &AppConfig, user: &str, id: i64) -> Result<()> {
    let service = open_service(config)?;
    let chart = service
        .replay(user, id)
        .with_context(|| format!("replay of history entry #{id} failed"))?
        .with_context(|| format!("no history entry #{id} for {user}"))?;
    println!("{}", serde_json::to_string_pretty(&chart)?);
    Ok(())
}
