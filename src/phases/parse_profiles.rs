//! The `parse-profiles` phase: saved profile HTML plus listing data into
//! full records (`records.json`).

use anyhow::{Context, Result};
use chrono::Utc;
use log::{info, warn};
use std::path::{Path, PathBuf};

use super::fetch_profiles::load_listings;
use crate::config::ScrapeConfig;
use crate::fetch::is_challenge_page;
use crate::models::AttorneyRecord;
use crate::parsers::parse_profile;
use crate::store::write_json_atomic;

#[derive(Debug, Clone)]
pub struct ParseReport {
    pub output_path: PathBuf,
    pub records: usize,
    /// Saved pages that were challenge pages; their record is listing data only
    pub challenged: usize,
}

/// Profile values win; the listing fills whatever the profile left empty.
#[must_use]
pub fn merge_profile(mut profile: AttorneyRecord, listing: &AttorneyRecord) -> AttorneyRecord {
    profile.merge_missing_from(listing);
    profile
}

/// `html/*.html`, sorted by file name.
async fn saved_pages(html_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(html_dir)
        .await
        .with_context(|| format!("Failed to read {}", html_dir.display()))?;
    let mut pages = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "html") {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}

/// The `parse-profiles` phase over one location directory.
pub async fn parse_profiles(config: &ScrapeConfig, data_dir: &Path) -> Result<ParseReport> {
    let config = config.with_data_dir(data_dir);
    let listings = load_listings(&config.listings_path()).await?;
    let pages = saved_pages(&config.html_dir()).await?;
    info!("Parsing {} profile HTML files", pages.len());

    let mut records = Vec::with_capacity(pages.len());
    let mut challenged = 0;

    for (i, path) in pages.iter().enumerate() {
        let uuid = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let html = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let listing = listings
            .get(&uuid)
            .cloned()
            .unwrap_or_else(|| AttorneyRecord::with_identity(uuid.as_str(), ""));

        let mut record = if is_challenge_page(&html) {
            warn!("Skipping challenge HTML for {uuid}, using listing data");
            challenged += 1;
            listing
        } else {
            merge_profile(parse_profile(&html, &listing.profile_url), &listing)
        };
        record.profile_tier = record.infer_profile_tier().to_string();
        record.scraped_at = Utc::now().to_rfc3339();
        records.push(record);

        if (i + 1) % 100 == 0 {
            info!("  Parsed {}/{}", i + 1, pages.len());
        }
    }

    let output_path = config.records_path();
    write_json_atomic(&output_path, &records)
        .await
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    let mean_completeness = if records.is_empty() {
        0.0
    } else {
        records.iter().map(AttorneyRecord::completeness_score).sum::<f64>() / records.len() as f64
    };
    info!(
        "Parsing complete: {} records written to {} (mean completeness {:.2})",
        records.len(),
        output_path.display(),
        mean_completeness
    );

    Ok(ParseReport {
        output_path,
        records: records.len(),
        challenged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_wins_listing_fills_gaps() {
        let mut profile = AttorneyRecord::with_identity("u1", "https://p/u1.html");
        profile.name = "Jane Q. Roe".into();
        let mut listing = AttorneyRecord::with_identity("u1", "https://p/u1.html");
        listing.name = "Jane Roe".into();
        listing.phone = "3105550100".into();

        let merged = merge_profile(profile, &listing);
        assert_eq!(merged.name, "Jane Q. Roe");
        assert_eq!(merged.phone, "3105550100");
    }
}
