//! Feed Harvester CLI
//!
//! Replays saved captures of a message feed through the scrape loop and
//! writes the collected records on request.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use harvester::{
    error::{AppError, Result},
    feed::SnapshotFeed,
    models::Config,
    pipeline::{ConsoleObserver, ExportFormat, ScrapeController, write_export},
    services::Extractor,
    utils::log as console,
};

/// Feed Harvester - collect a message feed into JSON or CSV
#[derive(Parser, Debug)]
#[command(name = "harvester", version, about = "Message feed harvester")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scrape session over a directory of page captures
    Scrape {
        /// Directory of `.html` captures, in load order by file name
        captures: PathBuf,

        /// Wait between iterations in milliseconds
        #[arg(long)]
        delay: Option<u64>,

        /// Wait after each scroll in milliseconds
        #[arg(long)]
        settle: Option<u64>,

        /// Write the records as JSON to this path
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the records as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
    console::init(level);
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Scrape {
            captures,
            delay,
            settle,
            json,
            csv,
        } => {
            if let Some(ms) = delay {
                config.scraper.delay_ms = ms;
            }
            if let Some(ms) = settle {
                config.scraper.settle_ms = ms;
            }
            config.validate()?;

            console::header("Feed Harvester");
            let feed = SnapshotFeed::load(&captures, &config.feed.container_selector).await?;
            console::debug(&format!(
                "{} captures from {}, {} strategies",
                feed.capture_count(),
                captures.display(),
                config.extraction.strategies.len()
            ));
            let extractor = Extractor::from_config(&config.extraction)?;
            let observer = Arc::new(ConsoleObserver::new(config.messages.clone()));
            let controller = ScrapeController::new(Arc::new(feed), extractor, observer, &config);

            let started = std::time::Instant::now();
            controller.start().await?;

            tokio::select! {
                result = controller.wait() => result?,
                _ = tokio::signal::ctrl_c() => {
                    console::warn("Interrupted, stopping after the current cycle");
                    controller.stop();
                    controller.wait().await?;
                }
            }

            let elapsed = started.elapsed();
            console::summary(
                "Session",
                &[
                    ("Records", controller.record_count().to_string()),
                    ("Elapsed", format!("{:.1}s", elapsed.as_secs_f64())),
                    ("Delay", format!("{:?}", Duration::from_millis(config.scraper.delay_ms))),
                ],
            );

            let exports = [(ExportFormat::Json, json), (ExportFormat::Csv, csv)];
            for (format, path) in exports {
                let Some(path) = path else { continue };
                let path = if path.is_dir() {
                    path.join(format.file_name())
                } else {
                    path
                };
                let bytes = format.render(&controller.records())?;
                write_export(&path, &bytes).await?;
                console::info(&format!("Exported {:?} to {}", format, path.display()));
            }
        }

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            Extractor::from_config(&config.extraction).map_err(|e| {
                AppError::config(format!("extraction strategies unusable: {e}"))
            })?;

            log::info!(
                "✓ Config OK ({} strategies, container '{}')",
                config.extraction.strategies.len(),
                config.feed.container_selector
            );
        }
    }

    Ok(())
}
