//! Command-line surface: argument parsing, logging setup, progress bars.

pub mod args;
pub mod logging;
pub mod progress_bars;

pub use args::{Cli, Command, FetchArgs};
pub use logging::{log_file_path, setup_logging};
pub use progress_bars::BarProgress;
