//! attorney-scrape: one subcommand per pipeline phase, plus `run`.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;

use attorney_scrape::cli::{BarProgress, Cli, Command, FetchArgs, log_file_path, setup_logging};
use attorney_scrape::config::{LOGS_DIR, ScrapeConfig, ScrapeConfigBuilder, WithDataDir};
use attorney_scrape::phases::{
    CrawlListingsOptions, FetchProfilesOptions, crawl_listings, discover, export, fetch_profiles,
    parse_location, parse_profiles, run_pipeline,
};
use attorney_scrape::utils::PROXY_URL_ENV;

/// The location directory a command works in, when it is known up front.
fn data_dir_of(command: &Command) -> Option<PathBuf> {
    let parent = |p: &Path| p.parent().map(Path::to_path_buf);
    match command {
        Command::Discover {
            location,
            data_root,
        }
        | Command::Run {
            location,
            data_root,
            ..
        } => parse_location(location)
            .ok()
            .map(|loc| data_root.join(loc.dir_name())),
        Command::CrawlListings { input, .. }
        | Command::FetchProfiles { input, .. }
        | Command::Export { input, .. } => parent(input),
        Command::ParseProfiles { data_dir } => Some(data_dir.clone()),
    }
}

fn apply_fetch_args(
    mut builder: ScrapeConfigBuilder<WithDataDir>,
    fetch: &FetchArgs,
) -> ScrapeConfigBuilder<WithDataDir> {
    if let Some(browsers) = fetch.browsers {
        builder = builder.browsers(browsers);
    }
    if let Some([min, max]) = fetch.delay.as_deref() {
        builder = builder.delay(*min, *max);
    }
    if let Some(secs) = fetch.page_wait {
        builder = builder.page_settle_secs(secs);
    }
    if fetch.no_fast_path {
        builder = builder.fast_path_enabled(false);
    }
    builder
}

fn build_config(command: &Command) -> Result<ScrapeConfig> {
    let data_dir = match command {
        Command::Discover { data_root, .. } | Command::Run { data_root, .. } => data_root.clone(),
        other => data_dir_of(other).unwrap_or_else(|| PathBuf::from(".")),
    };
    let mut builder = ScrapeConfig::builder()
        .data_dir(data_dir)
        .proxy_url(std::env::var(PROXY_URL_ENV).ok().filter(|p| !p.is_empty()));

    match command {
        Command::CrawlListings {
            max_results,
            workers,
            ..
        } => {
            builder = builder.max_results(*max_results);
            if let Some(workers) = workers {
                builder = builder.workers(*workers);
            }
        }
        Command::FetchProfiles { fetch, .. } | Command::Run { fetch, .. } => {
            builder = apply_fetch_args(builder, fetch);
        }
        _ => {}
    }
    builder.build()
}

async fn dispatch(command: Command, config: &ScrapeConfig) -> Result<PathBuf> {
    let progress = BarProgress::from_env();
    match command {
        Command::Discover { location, .. } => discover(config, &location).await,
        Command::CrawlListings {
            input,
            force,
            practice_areas,
            ..
        } => {
            let options = CrawlListingsOptions {
                force,
                practice_areas,
            };
            let summary = crawl_listings(config, &input, &options, progress).await?;
            if !summary.is_success() {
                anyhow::bail!(
                    "{} practice area(s) failed: {}",
                    summary.failed_units.len(),
                    summary.failed_units.join(", ")
                );
            }
            Ok(summary.output_path)
        }
        Command::FetchProfiles {
            input,
            force,
            retry_cf,
            ..
        } => {
            let options = FetchProfilesOptions {
                force,
                retry_challenged: retry_cf,
            };
            let report = fetch_profiles(config, &input, options, progress).await?;
            Ok(report.data_dir)
        }
        Command::ParseProfiles { data_dir } => {
            Ok(parse_profiles(config, &data_dir).await?.output_path)
        }
        Command::Export { input, output } => export(&input, &output).await,
        Command::Run {
            location, output, ..
        } => run_pipeline(config, &location, &output, progress).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    let log_file = data_dir_of(&cli.command)
        .map(|dir| log_file_path(&dir.join(LOGS_DIR), cli.command.name()));
    if let Some(path) = setup_logging(cli.verbose, log_file)? {
        log::debug!("Logging to {}", path.display());
    }

    let config = build_config(&cli.command)?;
    match dispatch(cli.command, &config).await {
        Ok(output) => {
            println!("Output: {}", output.display());
            log::debug!("Total time: {:?}", start_time.elapsed());
            Ok(())
        }
        Err(e) => {
            log::error!("{e:#}");
            Err(e)
        }
    }
}
