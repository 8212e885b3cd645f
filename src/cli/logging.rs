//! Console logging, optionally teed to a per-command log file.

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use regex::Regex;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;]*m").expect("BUG: hardcoded ANSI escape regex is invalid")
});

/// Writes every log line to stderr and, without colour codes, to a file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        let text = String::from_utf8_lossy(buf);
        let plain = ANSI_ESCAPE.replace_all(&text, "");
        self.file.write_all(plain.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// `{logs_dir}/{command}_{YYYYMMDD_HHMMSS}.log`
#[must_use]
pub fn log_file_path(logs_dir: &Path, command: &str) -> PathBuf {
    logs_dir.join(format!("{command}_{}.log", Local::now().format("%Y%m%d_%H%M%S")))
}

/// Install the global logger. Dependencies log at `Warn`, this crate at
/// `Info` (`Debug` with `verbose`). With `log_file` every line is also
/// appended to that file. Returns the log file path, if any.
pub fn setup_logging(verbose: bool, log_file: Option<PathBuf>) -> Result<Option<PathBuf>> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = Builder::from_default_env();
    builder
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_CRATE_NAME"), level)
        .format(|buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let ts = Local::now().format("%H:%M:%S");
            let line = match record.level() {
                Level::Error | Level::Warn => {
                    let level_str = if record.level() == Level::Warn {
                        "WARN".yellow()
                    } else {
                        "ERROR".red()
                    };
                    let target = record.target().to_string().white();
                    format!("{ts} [{} {level_str} {target}] {}", name.cyan(), record.args())
                }
                Level::Debug | Level::Trace => {
                    format!("{ts} [{} {}] {}", name.cyan(), "DEBUG".dimmed(), record.args())
                }
                Level::Info => format!("{ts} [{}] {}", name.cyan(), record.args()),
            };
            writeln!(buf, "{line}")
        });

    if let Some(path) = &log_file {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        }
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(Tee { file })));
    }

    builder
        .try_init()
        .context("A global logger is already installed")?;
    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn tee_strips_colour_codes_from_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("run.log");
        let mut tee = Tee {
            file: File::create(&path).expect("log file"),
        };

        let line = "12:00:00 [\x1b[36mattorney_scrape\x1b[0m \x1b[33mWARN\x1b[0m] done\n";
        assert_eq!(tee.write(line.as_bytes()).expect("write"), line.len());
        tee.flush().expect("flush");

        let written = std::fs::read_to_string(&path).expect("read log");
        assert!(!written.contains('\x1b'));
        assert!(written.contains("WARN done"));
    }

    #[test]
    fn log_file_is_named_after_command() {
        let path = log_file_path(Path::new("/data/logs"), "crawl-listings");
        let name = path.file_name().expect("file name").to_string_lossy().into_owned();
        assert!(name.starts_with("crawl-listings_"));
        assert!(name.ends_with(".log"));
    }
}
