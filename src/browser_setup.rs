//! Locating, downloading and launching the slow-path Chrome.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

/// Overrides every other lookup when it points at an existing file
pub const BROWSER_PATH_ENV: &str = "CHROMIUM_PATH";

const PATH_LOOKUP_NAMES: [&str; 4] = ["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Launch options for one slow-path browser.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub user_agent: String,
    pub proxy_url: Option<String>,
    pub request_timeout: Duration,
}

#[cfg(target_os = "windows")]
fn install_locations() -> Vec<PathBuf> {
    [
        r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files\Chromium\Application\chrome.exe",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(target_os = "macos")]
fn install_locations() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = [
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/opt/homebrew/bin/chromium",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join("Applications/Google Chrome.app/Contents/MacOS/Google Chrome"));
    }
    paths
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn install_locations() -> Vec<PathBuf> {
    [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/usr/local/bin/chromium",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

/// First match of `which <name>`; never used on Windows.
fn on_path() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        return None;
    }
    PATH_LOOKUP_NAMES.iter().find_map(|name| {
        let output = Command::new("which").arg(name).output().ok()?;
        let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
        (output.status.success() && !found.is_empty()).then(|| PathBuf::from(found))
    })
}

/// An installed Chrome/Chromium: `CHROMIUM_PATH`, then the usual install
/// locations, then `PATH`.
#[must_use]
pub fn find_browser_executable() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(BROWSER_PATH_ENV).map(PathBuf::from) {
        if path.exists() {
            info!("Using browser from {BROWSER_PATH_ENV}: {}", path.display());
            return Some(path);
        }
        warn!("{BROWSER_PATH_ENV} does not exist: {}", path.display());
    }

    let found = install_locations()
        .into_iter()
        .find(|p| p.exists())
        .or_else(on_path);
    if let Some(path) = &found {
        info!("Found browser at {}", path.display());
    }
    found
}

/// Download a managed Chromium into `{cache}/attorney_scrape/chromium`.
pub async fn download_managed_browser() -> Result<PathBuf> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(env!("CARGO_CRATE_NAME"))
        .join("chromium");
    info!("No local Chrome found, downloading Chromium into {}", cache_dir.display());

    tokio::fs::create_dir_all(&cache_dir)
        .await
        .with_context(|| format!("Failed to create {}", cache_dir.display()))?;

    let options = BrowserFetcherOptions::builder()
        .with_path(&cache_dir)
        .build()
        .context("Failed to build browser fetcher options")?;
    let installed = BrowserFetcher::new(options)
        .fetch()
        .await
        .context("Failed to download Chromium")?;

    info!("Chromium ready at {}", installed.folder_path.display());
    Ok(installed.executable_path)
}

fn browser_config(
    options: &LaunchOptions,
    executable: PathBuf,
    user_data_dir: PathBuf,
) -> Result<chromiumoxide::BrowserConfig> {
    let mut builder = BrowserConfigBuilder::default()
        .chrome_executable(executable)
        .user_data_dir(user_data_dir)
        .request_timeout(options.request_timeout)
        .window_size(1920, 1080);

    builder = if options.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };
    if let Some(proxy) = &options.proxy_url {
        builder = builder.arg(format!("--proxy-server={proxy}"));
    }

    builder
        .arg(format!("--user-agent={}", options.user_agent))
        .args([
            "--disable-blink-features=AutomationControlled",
            "--disable-infobars",
            "--disable-notifications",
            "--disable-dev-shm-usage",
            "--disable-extensions",
            "--disable-background-networking",
            "--disable-breakpad",
            "--no-first-run",
            "--no-default-browser-check",
            "--no-sandbox",
            "--password-store=basic",
            "--use-mock-keychain",
            "--mute-audio",
        ])
        .build()
        .map_err(|e| anyhow!("Invalid browser config: {e}"))
}

/// CDP messages newer than chromiumoxide's protocol tables fail to decode.
fn is_undecodable_event(message: &str) -> bool {
    message.contains("data did not match any variant of untagged enum Message")
        || message.contains("Failed to deserialize WS response")
}

/// Launch Chrome with its own `user_data_dir`.
///
/// Returns the browser and the task draining its CDP event stream; the
/// browser stops responding once that task ends.
pub async fn launch_browser(
    options: &LaunchOptions,
    user_data_dir: PathBuf,
) -> Result<(Browser, JoinHandle<()>)> {
    let executable = match find_browser_executable() {
        Some(path) => path,
        None => download_managed_browser().await?,
    };

    tokio::fs::create_dir_all(&user_data_dir)
        .await
        .with_context(|| format!("Failed to create {}", user_data_dir.display()))?;

    let config = browser_config(options, executable, user_data_dir)?;
    debug!(
        "Launching browser (headless: {}, proxy: {})",
        options.headless,
        options.proxy_url.is_some()
    );
    let (browser, mut events) = Browser::launch(config)
        .await
        .context("Failed to launch browser")?;

    let drain = tokio::spawn(async move {
        while let Some(event) = events.next().await {
            match event {
                Err(e) if is_undecodable_event(&e.to_string()) => {
                    trace!("Ignoring undecodable CDP message: {e}");
                }
                Err(e) => error!("Browser event stream error: {e:?}"),
                Ok(()) => {}
            }
        }
        debug!("Browser event stream closed");
    });

    Ok((browser, drain))
}
