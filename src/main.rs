// src/main.rs
mod config;
mod events;
mod extractors;
mod publish;
mod storage;
mod utils;
mod wordpress;

use clap::{Args, Parser, Subcommand};
use config::ArchiveConfig;
use events::{EventRequest, YearLoader};
use publish::Importer;
use std::path::{Path, PathBuf};
use storage::StorageManager;
use utils::AppError;
use wordpress::client::WordpressClient;

/// Migrates the legacy club event archive to structured records and WordPress
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file with archive layout and event registries
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Root of the legacy archive (overrides the config file)
    #[arg(long, global = true)]
    docs_base: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the records of one or more years and save them locally
    Extract {
        #[command(flatten)]
        years: YearRange,

        /// Output directory for extracted records
        #[arg(short, long, default_value = "./output")]
        output_dir: PathBuf,

        /// Debug mode - save annotated story HTML for every event
        #[arg(short, long)]
        debug: bool,
    },
    /// Publish the records of one or more years to WordPress
    Import {
        #[command(flatten)]
        years: YearRange,

        #[command(flatten)]
        site: SiteArgs,

        /// Use images already uploaded for an event instead of uploading again
        #[arg(long)]
        reuse_uploads: bool,
    },
    /// Delete every post and page published within a year
    Purge {
        #[arg(short, long)]
        year: i32,

        #[command(flatten)]
        site: SiteArgs,
    },
    /// Create the overview page of a year from its published posts
    YearPage {
        #[arg(short, long)]
        year: i32,

        #[command(flatten)]
        site: SiteArgs,
    },
}

#[derive(Args, Debug)]
struct YearRange {
    /// First (or only) year to process
    #[arg(short, long)]
    year: i32,

    /// Last year to process, inclusive
    #[arg(long)]
    to: Option<i32>,
}

impl YearRange {
    fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.year..=self.to.unwrap_or(self.year)
    }
}

#[derive(Args)]
struct SiteArgs {
    /// WordPress site URL
    #[arg(long, env = "WP_URL")]
    url: String,

    #[arg(long, env = "WP_USERNAME")]
    username: String,

    #[arg(long, env = "WP_PASSWORD", hide_env_values = true)]
    password: String,
}

impl std::fmt::Debug for SiteArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteArgs")
            .field("url", &self.url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SiteArgs {
    fn client(&self) -> Result<WordpressClient, AppError> {
        Ok(WordpressClient::new(&self.url, &self.username, &self.password)?)
    }
}

fn load_config(cli: &Cli) -> Result<ArchiveConfig, AppError> {
    let mut config = match &cli.config {
        Some(path) => ArchiveConfig::load(path)?,
        None => ArchiveConfig::default(),
    };
    if let Some(docs_base) = &cli.docs_base {
        config.docs_base = docs_base.clone();
    }
    Ok(config)
}

fn write_story_debug(loader: &YearLoader, storage: &StorageManager, request: &EventRequest) -> Result<(), AppError> {
    let (lines, trace) = loader.builder().story_outline(request)?;
    let dir = storage.debug_dir(request.year, request.number, request.is_planned)?;
    utils::html_debug::create_debug_html(&lines, trace.as_ref(), &dir.join("story_annotated.html"))
}

fn finish(success_count: usize, failure_count: usize, what: &str) -> Result<(), AppError> {
    tracing::info!("Processing finished. Success: {}, Failures: {}", success_count, failure_count);

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Processing(format!("Failed to {} any of {} events", what, failure_count)));
    }
    Ok(())
}

fn extract(
    config: &ArchiveConfig,
    years: &YearRange,
    output_dir: &Path,
    debug: bool,
) -> Result<(), AppError> {
    let storage = StorageManager::new(output_dir)?;
    let loader = YearLoader::new(config);

    let mut success_count = 0;
    let mut failure_count = 0;

    for year in years.years() {
        tracing::info!("Processing year {}", year);

        if debug {
            match loader.requests(year) {
                Ok(requests) => {
                    for request in &requests {
                        if let Err(e) = write_story_debug(&loader, &storage, request) {
                            tracing::warn!("Failed to create debug HTML for {}:{}: {}", year, request.number, e);
                        }
                    }
                }
                Err(e) => tracing::warn!("No debug output for year {}: {}", year, e),
            }
        }

        let report = match loader.load(year) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Failed to load year {}: {}", year, e);
                failure_count += 1;
                continue;
            }
        };

        failure_count += report.failures.len();
        for record in &report.records {
            match storage.save_record(record) {
                Ok(_) => success_count += 1,
                Err(e) => {
                    tracing::error!("Failed to save event {}:{}: {}", year, record.number(), e);
                    failure_count += 1;
                }
            }
        }
        if !report.skipped.is_empty() {
            tracing::info!("Year {}: events {:?} skipped by registry", report.year, report.skipped);
        }
    }

    finish(success_count, failure_count, "extract")
}

async fn import(
    config: &ArchiveConfig,
    years: &YearRange,
    site: &SiteArgs,
    reuse_uploads: bool,
) -> Result<(), AppError> {
    let importer = Importer::new(site.client()?, config.upload_tmp_dir());
    let loader = YearLoader::new(config);

    let mut success_count = 0;
    let mut failure_count = 0;

    for year in years.years() {
        let report = match loader.load(year) {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Failed to load year {}: {}", year, e);
                failure_count += 1;
                continue;
            }
        };
        failure_count += report.failures.len();

        for record in &report.records {
            match importer.import_event(record, reuse_uploads).await {
                Ok(_) => success_count += 1,
                Err(e) => {
                    tracing::error!("Failed to import event {}: {}", record, e);
                    failure_count += 1;
                }
            }
        }
    }

    finish(success_count, failure_count, "import")
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(cli.verbose);
    tracing::info!("Starting processing for args: {:?}", cli);

    // 2. Archive layout and registries
    let config = load_config(&cli)?;

    match &cli.command {
        Command::Extract {
            years,
            output_dir,
            debug,
        } => extract(&config, years, output_dir, *debug),
        Command::Import {
            years,
            site,
            reuse_uploads,
        } => import(&config, years, site, *reuse_uploads).await,
        Command::Purge { year, site } => {
            let importer = Importer::new(site.client()?, config.upload_tmp_dir());
            let removed = importer.remove_year_items(*year).await?;
            tracing::info!("Removed {} items of year {}", removed, year);
            Ok(())
        }
        Command::YearPage { year, site } => {
            let importer = Importer::new(site.client()?, config.upload_tmp_dir());
            importer.create_year_page(*year).await?;
            Ok(())
        }
    }
}
