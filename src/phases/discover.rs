//! Location resolution and practice-area discovery.
//!
//! `"Los Angeles, CA"` becomes `("california", "los-angeles")`; the city's
//! index page is then scanned for `/{practice-area}/{state}/{city}/` links.

use anyhow::{Context, Result, bail};
use log::info;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::LazyLock;

use crate::config::ScrapeConfig;
use crate::fetch::{FetchStack, PageFetcher};
use crate::models::PracticeAreaIndex;
use crate::store::write_json_atomic;
use crate::utils::slugify;

/// (abbreviation, URL slug, full name) for the 50 states and DC.
pub const STATES: [(&str, &str, &str); 51] = [
    ("AL", "alabama", "Alabama"),
    ("AK", "alaska", "Alaska"),
    ("AZ", "arizona", "Arizona"),
    ("AR", "arkansas", "Arkansas"),
    ("CA", "california", "California"),
    ("CO", "colorado", "Colorado"),
    ("CT", "connecticut", "Connecticut"),
    ("DE", "delaware", "Delaware"),
    ("DC", "washington-dc", "District of Columbia"),
    ("FL", "florida", "Florida"),
    ("GA", "georgia", "Georgia"),
    ("HI", "hawaii", "Hawaii"),
    ("ID", "idaho", "Idaho"),
    ("IL", "illinois", "Illinois"),
    ("IN", "indiana", "Indiana"),
    ("IA", "iowa", "Iowa"),
    ("KS", "kansas", "Kansas"),
    ("KY", "kentucky", "Kentucky"),
    ("LA", "louisiana", "Louisiana"),
    ("ME", "maine", "Maine"),
    ("MD", "maryland", "Maryland"),
    ("MA", "massachusetts", "Massachusetts"),
    ("MI", "michigan", "Michigan"),
    ("MN", "minnesota", "Minnesota"),
    ("MS", "mississippi", "Mississippi"),
    ("MO", "missouri", "Missouri"),
    ("MT", "montana", "Montana"),
    ("NE", "nebraska", "Nebraska"),
    ("NV", "nevada", "Nevada"),
    ("NH", "new-hampshire", "New Hampshire"),
    ("NJ", "new-jersey", "New Jersey"),
    ("NM", "new-mexico", "New Mexico"),
    ("NY", "new-york", "New York"),
    ("NC", "north-carolina", "North Carolina"),
    ("ND", "north-dakota", "North Dakota"),
    ("OH", "ohio", "Ohio"),
    ("OK", "oklahoma", "Oklahoma"),
    ("OR", "oregon", "Oregon"),
    ("PA", "pennsylvania", "Pennsylvania"),
    ("RI", "rhode-island", "Rhode Island"),
    ("SC", "south-carolina", "South Carolina"),
    ("SD", "south-dakota", "South Dakota"),
    ("TN", "tennessee", "Tennessee"),
    ("TX", "texas", "Texas"),
    ("UT", "utah", "Utah"),
    ("VT", "vermont", "Vermont"),
    ("VA", "virginia", "Virginia"),
    ("WA", "washington", "Washington"),
    ("WV", "west-virginia", "West Virginia"),
    ("WI", "wisconsin", "Wisconsin"),
    ("WY", "wyoming", "Wyoming"),
];

/// Path segments that match the link pattern but are not practice areas
const EXCLUDED_SLUGS: [&str; 2] = ["search", "advanced_search"];

static LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("BUG: hardcoded CSS selector 'a[href]' is invalid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub state_abbrev: &'static str,
    pub state_slug: &'static str,
    pub city_slug: String,
}

impl Location {
    /// `los-angeles_ca`
    #[must_use]
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.city_slug, self.state_abbrev.to_ascii_lowercase())
    }
}

/// Parse `"City, ST"` or `"City, State Name"`.
pub fn parse_location(input: &str) -> Result<Location> {
    let Some((city, state)) = input.split_once(',') else {
        bail!("Expected format 'City, ST' or 'City, State Name', got: {input:?}");
    };
    let (city, state) = (city.trim(), state.trim());
    if city.is_empty() || state.is_empty() {
        bail!("Expected format 'City, ST' or 'City, State Name', got: {input:?}");
    }

    let Some(&(abbrev, slug, _)) = STATES
        .iter()
        .find(|(abbrev, _, name)| abbrev.eq_ignore_ascii_case(state) || name.eq_ignore_ascii_case(state))
    else {
        bail!("Unknown state: {state:?}");
    };

    let city_slug = slugify(city);
    if city_slug.is_empty() {
        bail!("City name {city:?} has no usable characters");
    }

    Ok(Location {
        state_abbrev: abbrev,
        state_slug: slug,
        city_slug,
    })
}

/// Practice-area slugs linked from a city index page, sorted and unique.
#[must_use]
pub fn extract_practice_areas(html: &str, state_slug: &str, city_slug: &str) -> Vec<String> {
    let Ok(pattern) = Regex::new(&format!(
        "^/([^/]+)/{}/{}/$",
        regex::escape(state_slug),
        regex::escape(city_slug)
    )) else {
        return Vec::new();
    };

    let doc = Html::parse_document(html);
    let areas: BTreeSet<String> = doc
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| pattern.captures(href))
        .map(|caps| caps[1].to_string())
        .filter(|slug| !EXCLUDED_SLUGS.contains(&slug.as_str()) && slug != state_slug)
        .collect();
    areas.into_iter().collect()
}

/// Fetch the city index and extract its practice areas. A failed fetch is an error.
pub async fn discover_practice_areas(
    fetcher: &dyn PageFetcher,
    config: &ScrapeConfig,
    location: &Location,
) -> Result<Vec<String>> {
    let url = config.city_index_url(location.state_slug, &location.city_slug);
    info!("Fetching city index: {url}");

    let Some(html) = fetcher.fetch_page(&url, None).await else {
        bail!("Failed to fetch city index page: {url}");
    };

    let areas = extract_practice_areas(&html, location.state_slug, &location.city_slug);
    info!(
        "Found {} practice areas for {}/{}",
        areas.len(),
        location.state_slug,
        location.city_slug
    );
    Ok(areas)
}

/// Discover with an existing fetcher and write
/// `{data_root}/{city}_{st}/practice_areas.json`. `config.data_dir()` is the
/// data root.
pub async fn discover_with(
    fetcher: &dyn PageFetcher,
    config: &ScrapeConfig,
    location: &str,
) -> Result<PathBuf> {
    let location = parse_location(location)?;
    let config = config.with_data_dir(config.data_dir().join(location.dir_name()));
    info!("Data directory: {}", config.data_dir().display());

    let practice_areas = discover_practice_areas(fetcher, &config, &location).await?;
    let index = PracticeAreaIndex {
        state_slug: location.state_slug.to_string(),
        city_slug: location.city_slug,
        practice_areas,
    };

    let output = config.practice_areas_path();
    write_json_atomic(&output, &index)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        "Wrote {} practice areas to {}",
        index.practice_areas.len(),
        output.display()
    );
    Ok(output)
}

/// The `discover` phase.
pub async fn discover(config: &ScrapeConfig, location: &str) -> Result<PathBuf> {
    // Validate before any client is built
    parse_location(location)?;
    let stack = FetchStack::from_config(config)?;
    let result = discover_with(stack.fetcher.as_ref(), config, location).await;
    stack.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviation_and_full_name() {
        let by_abbrev = parse_location("Los Angeles, ca").expect("abbrev");
        assert_eq!(by_abbrev.state_slug, "california");
        assert_eq!(by_abbrev.city_slug, "los-angeles");
        assert_eq!(by_abbrev.dir_name(), "los-angeles_ca");

        let by_name = parse_location("Washington, District of Columbia").expect("name");
        assert_eq!(by_name.state_slug, "washington-dc");
        assert_eq!(by_name.dir_name(), "washington_dc");
    }

    #[test]
    fn rejects_bad_locations() {
        assert!(parse_location("Los Angeles").is_err());
        assert!(parse_location(" , CA").is_err());
        assert!(parse_location("Springfield, Narnia").is_err());
    }

    #[test]
    fn extracts_practice_area_links() {
        let html = r#"
            <a href="/tax/california/pasadena/">Tax</a>
            <a href="/business-litigation/california/pasadena/">BL</a>
            <a href="/tax/california/pasadena/">Tax again</a>
            <a href="/search/california/pasadena/">Search</a>
            <a href="/california/california/pasadena/">State</a>
            <a href="/tax/california/glendale/">Other city</a>
            <a href="https://attorneys.example.com/tax/california/pasadena/">Absolute</a>
        "#;
        assert_eq!(
            extract_practice_areas(html, "california", "pasadena"),
            vec!["business-litigation".to_string(), "tax".to_string()]
        );
    }
}
