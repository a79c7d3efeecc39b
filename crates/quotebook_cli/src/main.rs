//! Quotebook command-line front end.
//!
//! # Responsibility
//! - Present the quote store: random display, add, filter, import/export.
//! - Trigger one-shot or periodic reconciliation and print notifications.
//!
//! All data rules live in `quotebook_core`; this binary only parses input
//! and prints results.

use clap::{Parser, Subcommand};
use crossbeam_channel::{select, unbounded};
use log::info;
use quotebook_core::{
    init_logging, open_store, HttpRemoteSource, QuoteRecord, QuoteStore, QuotebookConfig,
    Reconciler, SqliteKvRepository, SyncEvent, SyncScheduler, ALL_CATEGORIES,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type CliResult<T = ()> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "quotebook", version, about = "Local-first quote collection")]
struct Cli {
    /// SQLite database file (overrides QUOTEBOOK_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Remote posts endpoint (overrides QUOTEBOOK_ENDPOINT).
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show one random quote from the selected (or given) category.
    Show {
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a quote and send it to the remote endpoint.
    Add {
        text: String,
        category: String,
        /// Skip sending the new quote to the remote endpoint.
        #[arg(long)]
        offline: bool,
    },
    /// List quotes from the selected (or given) category.
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// List categories, starting with `all`.
    Categories,
    /// Print or change the persisted category filter.
    Filter { category: Option<String> },
    /// Write the collection as pretty JSON.
    Export {
        #[arg(long, default_value = "quotes.json")]
        out: PathBuf,
    },
    /// Append quotes from a JSON file.
    Import { path: PathBuf },
    /// Reconcile once with the remote endpoint.
    Sync,
    /// Reconcile now and then on a fixed interval until Ctrl+C.
    Watch {
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult {
    let mut config = QuotebookConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(endpoint) = cli.endpoint {
        config.remote.endpoint = endpoint;
    }

    init_cli_logging(&config);
    let mut store = open_store(&config.db_path)?;

    match cli.command {
        Command::Show { category } => show(&store, category),
        Command::Add {
            text,
            category,
            offline,
        } => {
            let quote = store.add(&text, &category)?;
            println!("Quote added successfully!");
            if !offline {
                push_new_quote(&config, &quote);
            }
            Ok(())
        }
        Command::List { category } => {
            let category = resolve_category(&store, category)?;
            for quote in store.filter_by_category(&category) {
                println!("{}", format_quote(&quote));
            }
            Ok(())
        }
        Command::Categories => {
            println!("{ALL_CATEGORIES}");
            for category in store.distinct_categories() {
                println!("{category}");
            }
            Ok(())
        }
        Command::Filter { category } => {
            match category {
                Some(category) => {
                    store.set_selected_category(&category)?;
                    println!("Filter set to `{category}`.");
                }
                None => println!("{}", store.selected_category()?),
            }
            Ok(())
        }
        Command::Export { out } => {
            std::fs::write(&out, store.export_json()?)?;
            println!("Exported {} quotes to {}", store.len(), out.display());
            Ok(())
        }
        Command::Import { path } => {
            let text = std::fs::read_to_string(&path)?;
            let count = store.import_json(&text)?;
            println!("Quotes imported successfully! ({count} added)");
            Ok(())
        }
        Command::Sync => {
            let reconciler = Reconciler::new(remote_source(&config)?);
            let report = reconciler.sync_once(&mut store)?;
            println!("{}", report.notification());
            Ok(())
        }
        Command::Watch { interval_secs } => {
            let interval = match interval_secs {
                Some(0) => return Err("--interval-secs must be greater than zero".into()),
                Some(secs) => Duration::from_secs(secs),
                None => config.remote.sync_interval,
            };
            watch(&config, store, interval)
        }
    }
}

fn show(store: &QuoteStore<SqliteKvRepository>, category: Option<String>) -> CliResult {
    let category = resolve_category(store, category)?;
    match store.random_quote(&category) {
        Some(quote) => println!("{}", format_quote(&quote)),
        None => println!("No quotes in category `{category}`."),
    }
    Ok(())
}

fn watch(
    config: &QuotebookConfig,
    store: QuoteStore<SqliteKvRepository>,
    interval: Duration,
) -> CliResult {
    let reconciler = Arc::new(Reconciler::new(remote_source(config)?));
    let store = Arc::new(Mutex::new(store));

    match reconciler.sync_shared(&store) {
        Ok(report) => println!("{}", report.notification()),
        Err(err) => eprintln!("Sync failed: {err}"),
    }

    let (events_tx, events_rx) = unbounded::<SyncEvent>();
    let (shutdown_tx, shutdown_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })?;

    let scheduler = SyncScheduler::start(
        Arc::clone(&reconciler),
        Arc::clone(&store),
        interval,
        events_tx,
    )?;
    println!(
        "Syncing every {}s with {}. Press Ctrl+C to stop.",
        interval.as_secs(),
        config.remote.endpoint
    );

    loop {
        select! {
            recv(shutdown_rx) -> _ => break,
            recv(events_rx) -> event => match event {
                Ok(SyncEvent::Synced(report)) => println!("{}", report.notification()),
                Ok(SyncEvent::Failed(message)) => eprintln!("Sync failed: {message}"),
                Err(_) => break,
            },
        }
    }

    info!("event=watch module=cli status=stopping");
    scheduler.stop();
    Ok(())
}

fn push_new_quote(config: &QuotebookConfig, quote: &QuoteRecord) {
    let result = remote_source(config)
        .map_err(|err| err.to_string())
        .and_then(|source| {
            Reconciler::new(source)
                .post_local(quote)
                .map_err(|err| err.to_string())
        });
    if let Err(err) = result {
        eprintln!("Could not send the quote to the server: {err}");
    }
}

fn remote_source(config: &QuotebookConfig) -> CliResult<HttpRemoteSource> {
    Ok(HttpRemoteSource::new(
        config.remote.endpoint.clone(),
        config.remote.request_timeout,
    )?)
}

fn resolve_category(
    store: &QuoteStore<SqliteKvRepository>,
    category: Option<String>,
) -> CliResult<String> {
    match category {
        Some(category) => Ok(category),
        None => Ok(store.selected_category()?),
    }
}

fn format_quote(quote: &QuoteRecord) -> String {
    format!("\"{}\" - {}", quote.text, quote.category)
}

fn init_cli_logging(config: &QuotebookConfig) {
    let log_dir = config
        .log_dir
        .clone()
        .unwrap_or_else(|| default_log_dir(&config.db_path));
    let log_dir = absolutize(&log_dir);
    if let Err(err) = init_logging(&config.log_level, &log_dir) {
        eprintln!("warning: file logging disabled: {err}");
        return;
    }
    info!(
        "event=cli_start module=cli status=ok db={} endpoint={} interval_s={}",
        config.db_path.display(),
        config.remote.endpoint,
        config.remote.sync_interval.as_secs()
    );
}

fn default_log_dir(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("logs"), |parent| parent.join("logs"))
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
