use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::{DEFAULT_DATA_ROOT, DEFAULT_OUTPUT_DIR};

/// Attorney directory scraper: discover, crawl, fetch, parse and export.
#[derive(Debug, Clone, Parser)]
#[command(name = "attorney-scrape")]
#[command(about = "Scrape attorney directory listings for a location into CSV.")]
pub struct Cli {
    /// Enable debug logging.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Resolve a location to its practice areas.
    Discover {
        /// Location in "City, ST" or "City, State Name" form.
        location: String,

        /// Root for per-location data directories.
        #[arg(long, default_value = DEFAULT_DATA_ROOT)]
        data_root: PathBuf,
    },

    /// Crawl listing pages for every practice area.
    CrawlListings {
        /// practice_areas.json from `discover`.
        input: PathBuf,

        /// Discard checkpoints and previous output first.
        #[arg(long)]
        force: bool,

        /// Only crawl these practice areas (comma separated).
        #[arg(long, value_delimiter = ',')]
        practice_areas: Option<Vec<String>>,

        /// Stop once this many unique attorneys are collected.
        #[arg(long)]
        max_results: Option<usize>,

        /// Practice areas crawled at once.
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Download raw profile HTML.
    FetchProfiles {
        /// listings.json from `crawl-listings`.
        input: PathBuf,

        /// Re-download files that already exist.
        #[arg(long)]
        force: bool,

        /// Re-download existing files that are challenge pages.
        #[arg(long)]
        retry_cf: bool,

        #[command(flatten)]
        fetch: FetchArgs,
    },

    /// Parse saved profile HTML into records.json.
    ParseProfiles {
        /// Location data directory (contains html/ and listings.json).
        data_dir: PathBuf,
    },

    /// Clean records and write CSV.
    Export {
        /// records.json from `parse-profiles`.
        input: PathBuf,

        /// Directory for the CSV file.
        #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,
    },

    /// Run all five phases for a location.
    Run {
        /// Location in "City, ST" or "City, State Name" form.
        location: String,

        /// Directory for the CSV file.
        #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Root for per-location data directories.
        #[arg(long, default_value = DEFAULT_DATA_ROOT)]
        data_root: PathBuf,

        #[command(flatten)]
        fetch: FetchArgs,
    },
}

/// Profile fetch tuning shared by `fetch-profiles` and `run`.
#[derive(Debug, Clone, Default, Args)]
pub struct FetchArgs {
    /// Browser instances in the slow-path pool.
    #[arg(long)]
    pub browsers: Option<usize>,

    /// Per-request delay window in seconds.
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"])]
    pub delay: Option<Vec<f64>>,

    /// Seconds a rendered page settles before its HTML is read.
    #[arg(long)]
    pub page_wait: Option<f64>,

    /// Skip the HTTP sweep and fetch every profile with the browser.
    #[arg(long)]
    pub no_fast_path: bool,
}

impl Command {
    /// Subcommand name, used for log file names.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discover { .. } => "discover",
            Self::CrawlListings { .. } => "crawl-listings",
            Self::FetchProfiles { .. } => "fetch-profiles",
            Self::ParseProfiles { .. } => "parse-profiles",
            Self::Export { .. } => "export",
            Self::Run { .. } => "run",
        }
    }
}
