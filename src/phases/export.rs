//! The `export` phase: cleaned records as a spreadsheet-friendly CSV.
//!
//! UTF-8 with a BOM, every field quoted, one header row.

use anyhow::{Context, Result};
use chrono::Local;
use csv::{QuoteStyle, WriterBuilder};
use log::info;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::crawl_engine::CrawlError;
use crate::models::AttorneyRecord;
use crate::store::{read_json, write_bytes_atomic};
use crate::utils::{EXPORT_FILE_PREFIX, MAX_CELL_LENGTH, strip_tracking_params, truncate_with_marker};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const TRUNCATION_MARKER: &str = "... [truncated]";

/// Directory-generated bios, blanked on export.
static BOILERPLATE_BIOS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^[\w\s.]+ is an attorney who represents clients in the",
        r"Being selected to Super Lawyers is limited to a small number",
        r"passed the bar exam and was admitted to legal practice in",
        r"is recognized by peers and was selected to",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("BUG: hardcoded boilerplate regex is invalid"))
    .collect()
});

/// `+1 (310) 555-0100` -> `310-555-0100`. Anything that is not a 10-digit
/// US number (after dropping a leading country code) is returned unchanged.
#[must_use]
pub fn clean_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let digits = match digits.strip_prefix('1') {
        Some(rest) if digits.len() == 11 => rest,
        _ => digits.as_str(),
    };
    if digits.len() == 10 {
        format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        raw.to_string()
    }
}

/// Apply every export cleaning rule in place.
pub fn clean_record(record: &mut AttorneyRecord) {
    if !record.phone.is_empty() {
        record.phone = clean_phone(&record.phone);
    }
    record.state = record.state.to_uppercase();

    for url in [
        &mut record.firm_website_url,
        &mut record.professional_webpage_url,
        &mut record.linkedin_url,
        &mut record.facebook_url,
        &mut record.twitter_url,
        &mut record.findlaw_url,
        &mut record.profile_url,
    ] {
        if !url.is_empty() {
            *url = strip_tracking_params(url);
        }
    }

    if BOILERPLATE_BIOS.iter().any(|re| re.is_match(&record.about)) {
        record.about.clear();
    }

    for value in record.fields_mut() {
        if value.chars().count() > MAX_CELL_LENGTH {
            *value = truncate_with_marker(value, MAX_CELL_LENGTH, TRUNCATION_MARKER);
        }
    }
}

/// Write `records` as CSV (BOM, header, all fields quoted) to `out`.
pub fn write_csv<W: Write>(records: &[AttorneyRecord], mut out: W) -> Result<()> {
    out.write_all(UTF8_BOM)?;
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);
    writer.write_record(AttorneyRecord::csv_headers())?;
    for record in records {
        writer.write_record(record.to_csv_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// `superlawyers_{location dir}_{YYYYMMDD_HHMMSS}.csv`
#[must_use]
pub fn export_file_name(records_path: &Path) -> String {
    let dir_name = records_path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "{EXPORT_FILE_PREFIX}_{dir_name}_{}.csv",
        Local::now().format("%Y%m%d_%H%M%S")
    )
}

/// The `export` phase. Returns the CSV path.
pub async fn export(records_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let mut records: Vec<AttorneyRecord> = read_json(records_path).await.map_err(|e| {
        anyhow::Error::from(CrawlError::InputArtifact {
            path: records_path.to_path_buf(),
            reason: format!("{e:#}"),
        })
    })?;
    records.iter_mut().for_each(clean_record);

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| CrawlError::OutputDir {
            path: output_dir.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut buf = Vec::new();
    write_csv(&records, &mut buf)?;

    let csv_path = output_dir.join(export_file_name(records_path));
    write_bytes_atomic(&csv_path, &buf)
        .await
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;
    info!("CSV exported: {} ({} records)", csv_path.display(), records.len());
    Ok(csv_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_formats() {
        assert_eq!(clean_phone("+1 (310) 555-0100"), "310-555-0100");
        assert_eq!(clean_phone("3105550100"), "310-555-0100");
        assert_eq!(clean_phone("555-0100"), "555-0100");
    }

    #[test]
    fn cleaning_rules() {
        let mut r = AttorneyRecord::with_identity("u1", "https://p.example/u1.html?adSubId=7");
        r.state = "ca".into();
        r.phone = "13105550100".into();
        r.linkedin_url = "https://linkedin.com/in/jr?trk=public&lang=en".into();
        r.about = "Jane Roe is recognized by peers and was selected to Rising Stars.".into();
        r.honors = "x".repeat(MAX_CELL_LENGTH + 5);

        clean_record(&mut r);
        assert_eq!(r.state, "CA");
        assert_eq!(r.phone, "310-555-0100");
        assert_eq!(r.profile_url, "https://p.example/u1.html");
        assert_eq!(r.linkedin_url, "https://linkedin.com/in/jr?lang=en");
        assert!(r.about.is_empty());
        assert!(r.honors.ends_with(TRUNCATION_MARKER));
        assert_eq!(r.honors.chars().count(), MAX_CELL_LENGTH + TRUNCATION_MARKER.len());
    }

    #[test]
    fn own_bio_is_kept() {
        let mut r = AttorneyRecord::default();
        r.about = "I have practiced tax law for twenty years.".into();
        clean_record(&mut r);
        assert!(!r.about.is_empty());
    }
}
