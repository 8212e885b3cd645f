//! Shared configuration constants for attorney_scrape
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Listing site root. Practice-area listings live under
/// `{BASE_URL}/{practice_area}/{state}/{city}/`.
pub const DEFAULT_BASE_URL: &str = "https://attorneys.superlawyers.com";

/// Profile site root. Profile pages live under a different host than listings.
pub const DEFAULT_PROFILE_BASE_URL: &str = "https://profiles.superlawyers.com";

/// Default per-request delay window in seconds: uniform in `[1.0, 3.0]`
///
/// The delay is slept before a fetch slot is acquired, so throttled workers
/// never hold a slot while sleeping.
pub const DEFAULT_DELAY_MIN_SECS: f64 = 1.0;
pub const DEFAULT_DELAY_MAX_SECS: f64 = 3.0;

/// Default number of simultaneous physical fetches through one gate
pub const DEFAULT_FETCH_CONCURRENCY: usize = 3;

/// Default number of practice areas crawled at once
///
/// One worker reproduces the sequential crawl and keeps the legacy progress
/// manifest up to date after every unit.
pub const DEFAULT_WORKERS: usize = 1;

/// Maximum physical attempts per logical fetch
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff base: attempt `n` waits `base * 2^(n-1)` (2s, 4s, 8s)
pub const DEFAULT_BACKOFF_BASE_SECS: f64 = 2.0;

/// Wall-clock timeout for a single physical fetch attempt
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Pagination safety valve per practice area
pub const DEFAULT_MAX_PAGES: u32 = 200;

/// Fast-path sweep concurrency and its (shorter) delay window
pub const DEFAULT_SWEEP_CONCURRENCY: usize = 10;
pub const DEFAULT_SWEEP_DELAY_MIN_SECS: f64 = 0.2;
pub const DEFAULT_SWEEP_DELAY_MAX_SECS: f64 = 0.8;

/// Browser instances in the slow-path pool; also the slow-path batch width
pub const DEFAULT_BROWSERS: usize = 3;

/// Time a rendered page is given to settle before its HTML is read
pub const DEFAULT_PAGE_SETTLE_SECS: f64 = 2.0;

/// Root for per-location data directories (`data/{city}_{st}/`)
pub const DEFAULT_DATA_ROOT: &str = "./data";

/// Default directory for exported CSV files
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Join string for multi-valued profile sections
pub const MULTIVALUE_DELIMITER: &str = " ; ";

/// CSV cells longer than this are truncated on export
pub const MAX_CELL_LENGTH: usize = 10_000;

/// Prefix of exported CSV file names
pub const EXPORT_FILE_PREFIX: &str = "superlawyers";

/// Only this many leading bytes of a cached profile are inspected for a
/// challenge signature when `--retry-cf` is set
pub const CHALLENGE_SNIFF_BYTES: usize = 500;

/// Environment variable that disables progress bars (CI, piped output)
pub const NO_PROGRESS_ENV: &str = "SUPERLAWYERS_NO_PROGRESS";

/// Environment variable holding an optional outbound proxy URL
pub const PROXY_URL_ENV: &str = "PROXY_URL";

/// Chrome user agent string used by both fetch paths
///
/// The fast path must present the same UA as the browser pool, otherwise
/// the challenge service scores the two paths differently.
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";
