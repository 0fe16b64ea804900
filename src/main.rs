//! indexq CLI - track URLs queued for search-engine indexing

use clap::{Parser, Subcommand};
use indexq::commands::{self, StatsFormat};
use indexq::config::{self, IndexqConfig};
use indexq::storage::UrlStore;
use indexq::ui::{self, Icons, Spinner};
use indexq::UrlStatus;
use owo_colors::OwoColorize;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "indexq")]
#[command(version)]
#[command(about = "Lightweight tracker for URLs waiting to be submitted for indexing")]
#[command(long_about = r#"
indexq keeps a local SQLite table of URLs and whether each one has been
submitted to a search engine's indexing API yet.

Example usage:
  indexq init --yes
  indexq add-urls --file urls.txt
  indexq pending --limit 20
  indexq mark https://example.com/page
  indexq stats --detailed --output stats.txt
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the URL table, dropping any existing one
    Init {
        /// Confirm wiping an existing database
        #[arg(short, long)]
        yes: bool,
    },

    /// Add URLs for indexing from a file, one per line
    AddUrls {
        /// File with URLs, or `-` for stdin
        #[arg(short, long)]
        file: PathBuf,
    },

    /// List URLs that have not been submitted yet
    Pending {
        /// Maximum number of URLs to list
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Set the status of a URL
    Mark {
        /// The tracked URL
        url: String,

        /// New status value
        #[arg(short, long, default_value = "sent_to_index")]
        status: String,
    },

    /// Show statistics for the tracked URLs
    Stats {
        /// List every row in the database
        #[arg(long)]
        detailed: bool,

        /// Write the statistics to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let settings = config::load_config(cli.config.as_deref())?;
    let database = settings.database_path(cli.database.as_deref());
    config::ensure_db_dir(&database)?;
    tracing::debug!("Database file: {}", database.display());

    match cli.command {
        Commands::Init { yes } => {
            let store = commands::run_init(&database, yes)?;
            ui::success("Database initialized");
            ui::info(&format!("{} Database", Icons::DATABASE), &database.display().to_string());
            ui::info("Indexes", &store.index_names()?.join(", "));
            Ok(())
        }
        Commands::AddUrls { file } => run_add_urls(&database, &file, &settings),
        Commands::Pending { limit } => run_pending(&database, limit),
        Commands::Mark { url, status } => run_mark(&database, &url, &status),
        Commands::Stats { detailed, output, format } => {
            run_stats(&database, detailed, output.as_deref(), format)
        }
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn run_add_urls(database: &Path, file: &Path, settings: &IndexqConfig) -> anyhow::Result<()> {
    let reader: Box<dyn BufRead> = if file == Path::new("-") {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let handle = std::fs::File::open(file)
            .map_err(|e| anyhow::anyhow!("cannot open {}: {}", file.display(), e))?;
        Box::new(BufReader::new(handle))
    };

    tracing::info!("Processing started");
    let mut store = UrlStore::open(database)?;
    let spinner = Spinner::new(&format!("Importing {}", file.display()));
    let report = store.import_urls(reader, now(), settings.log_interval());
    spinner.finish_and_clear();
    let report = report?;

    ui::header("Import finished");
    ui::summary_row("Processed:", &report.processed.to_string());
    ui::summary_row(&format!("{} Added:", Icons::NEW), &report.added.to_string());
    ui::summary_row(&format!("{} Skipped:", Icons::LINK), &report.skipped.to_string());
    if report.invalid > 0 {
        ui::warn(&format!("{} lines were not valid UTF-8 and were left out", report.invalid));
    }
    Ok(())
}

fn run_pending(database: &Path, limit: Option<usize>) -> anyhow::Result<()> {
    let store = UrlStore::open(database)?;
    let pending = store.pending_urls(limit)?;

    if pending.is_empty() {
        ui::success("URLs list is out, nothing left to submit");
        return Ok(());
    }

    for row in &pending {
        if let Some(url) = &row.url {
            ui::pending_url(row.id, url);
        }
    }
    Ok(())
}

fn run_mark(database: &Path, url: &str, status: &str) -> anyhow::Result<()> {
    if status.parse::<UrlStatus>().is_err() {
        ui::warn(&format!("'{}' is not a status indexq writes itself", status));
    }

    let store = UrlStore::open(database)?;
    let stored = commands::run_mark(&store, url, status, now())?;
    println!(
        "{} {} -> {}",
        Icons::CHECK,
        url,
        stored.style(ui::theme().for_status(Some(&stored)))
    );
    Ok(())
}

fn run_stats(
    database: &Path,
    detailed: bool,
    output: Option<&Path>,
    format: StatsFormat,
) -> anyhow::Result<()> {
    let store = UrlStore::open(database)?;
    let rendered = commands::render_stats(&store, database, detailed, format)?;
    commands::write_report(&rendered, output)?;
    if let Some(path) = output {
        ui::success(&format!("Statistics written to {}", path.display()));
    }
    Ok(())
}
