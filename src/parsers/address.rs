//! Office address blocks: newline-separated lines ending in "City, ST ZIP".

use regex::Regex;
use std::sync::LazyLock;

static CITY_STATE_ZIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+),\s*([A-Z]{2})\s+(\d{5}(?:-\d{4})?)$")
        .expect("BUG: hardcoded city/state/zip regex is invalid")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// Split an address block into street, city, state and zip.
///
/// The city line is looked for on the last line, then the one before it
/// (a trailing country or note line is common). Lines before the city line
/// form the street. When no city line is found, everything is street.
#[must_use]
pub fn parse_address(raw: &str) -> Address {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !l.starts_with("Phone:") && !l.contains("Office location"))
        .collect();

    if lines.is_empty() {
        return Address::default();
    }

    for offset in 1..=2.min(lines.len()) {
        let idx = lines.len() - offset;
        if let Some(caps) = CITY_STATE_ZIP.captures(lines[idx]) {
            return Address {
                street: lines[..idx].join(", "),
                city: caps[1].trim().to_string(),
                state: caps[2].to_string(),
                zip_code: caps[3].to_string(),
            };
        }
    }

    Address {
        street: lines.join(", "),
        ..Address::default()
    }
}
