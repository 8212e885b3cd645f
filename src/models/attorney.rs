//! The flat attorney record shared by every phase.
//!
//! Listing cards fill a handful of fields, profile pages fill the rest, and
//! export writes all 33 as one CSV row in declaration order.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Bios the directory generates for attorneys who never wrote one.
static AUTO_BIO_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^[\w\s.]+ is an attorney who represents clients in the",
        r"Being selected to Super Lawyers is limited to a small number",
        r"passed the bar exam and was admitted to legal practice in",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("BUG: hardcoded auto-bio regex is invalid"))
    .collect()
});

pub const FIELD_COUNT: usize = 33;

/// Column names in CSV order.
pub const FIELD_NAMES: [&str; FIELD_COUNT] = [
    "uuid",
    "name",
    "firm_name",
    "selection_type",
    "selection_years",
    "description",
    "street",
    "city",
    "state",
    "zip_code",
    "country",
    "geo_coordinates",
    "phone",
    "email",
    "firm_website_url",
    "professional_webpage_url",
    "about",
    "practice_areas",
    "focus_areas",
    "licensed_since",
    "education",
    "languages",
    "honors",
    "bar_activity",
    "pro_bono",
    "publications",
    "linkedin_url",
    "facebook_url",
    "twitter_url",
    "findlaw_url",
    "profile_url",
    "profile_tier",
    "scraped_at",
];

/// Fields holding URLs; export strips tracking parameters from these.
pub const URL_FIELDS: [&str; 7] = [
    "firm_website_url",
    "professional_webpage_url",
    "linkedin_url",
    "facebook_url",
    "twitter_url",
    "findlaw_url",
    "profile_url",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttorneyRecord {
    // Identity
    pub uuid: String,
    pub name: String,
    pub firm_name: String,
    pub selection_type: String,
    pub selection_years: String,
    pub description: String,

    // Location
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub geo_coordinates: String,

    // Contact
    pub phone: String,
    pub email: String,
    pub firm_website_url: String,
    pub professional_webpage_url: String,

    // Professional profile
    pub about: String,
    pub practice_areas: String,
    pub focus_areas: String,
    pub licensed_since: String,
    pub education: String,
    pub languages: String,

    // Achievements
    pub honors: String,
    pub bar_activity: String,
    pub pro_bono: String,
    pub publications: String,

    // Social and web
    pub linkedin_url: String,
    pub facebook_url: String,
    pub twitter_url: String,
    pub findlaw_url: String,

    // Metadata
    pub profile_url: String,
    pub profile_tier: String,
    pub scraped_at: String,
}

impl Default for AttorneyRecord {
    fn default() -> Self {
        Self {
            uuid: String::new(),
            name: String::new(),
            firm_name: String::new(),
            selection_type: String::new(),
            selection_years: String::new(),
            description: String::new(),
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: "United States".to_string(),
            geo_coordinates: String::new(),
            phone: String::new(),
            email: String::new(),
            firm_website_url: String::new(),
            professional_webpage_url: String::new(),
            about: String::new(),
            practice_areas: String::new(),
            focus_areas: String::new(),
            licensed_since: String::new(),
            education: String::new(),
            languages: String::new(),
            honors: String::new(),
            bar_activity: String::new(),
            pro_bono: String::new(),
            publications: String::new(),
            linkedin_url: String::new(),
            facebook_url: String::new(),
            twitter_url: String::new(),
            findlaw_url: String::new(),
            profile_url: String::new(),
            profile_tier: String::new(),
            scraped_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AttorneyRecord {
    /// Record seeded with an identifier and its canonical profile URL.
    #[must_use]
    pub fn with_identity(uuid: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            profile_url: profile_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn csv_headers() -> [&'static str; FIELD_COUNT] {
        FIELD_NAMES
    }

    /// Field values in the same order as [`Self::csv_headers`].
    #[must_use]
    pub fn to_csv_row(&self) -> [&str; FIELD_COUNT] {
        [
            &self.uuid,
            &self.name,
            &self.firm_name,
            &self.selection_type,
            &self.selection_years,
            &self.description,
            &self.street,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.country,
            &self.geo_coordinates,
            &self.phone,
            &self.email,
            &self.firm_website_url,
            &self.professional_webpage_url,
            &self.about,
            &self.practice_areas,
            &self.focus_areas,
            &self.licensed_since,
            &self.education,
            &self.languages,
            &self.honors,
            &self.bar_activity,
            &self.pro_bono,
            &self.publications,
            &self.linkedin_url,
            &self.facebook_url,
            &self.twitter_url,
            &self.findlaw_url,
            &self.profile_url,
            &self.profile_tier,
            &self.scraped_at,
        ]
        .map(|s| s.as_str())
    }

    /// Mutable access to every field, in CSV order.
    pub fn fields_mut(&mut self) -> [&mut String; FIELD_COUNT] {
        [
            &mut self.uuid,
            &mut self.name,
            &mut self.firm_name,
            &mut self.selection_type,
            &mut self.selection_years,
            &mut self.description,
            &mut self.street,
            &mut self.city,
            &mut self.state,
            &mut self.zip_code,
            &mut self.country,
            &mut self.geo_coordinates,
            &mut self.phone,
            &mut self.email,
            &mut self.firm_website_url,
            &mut self.professional_webpage_url,
            &mut self.about,
            &mut self.practice_areas,
            &mut self.focus_areas,
            &mut self.licensed_since,
            &mut self.education,
            &mut self.languages,
            &mut self.honors,
            &mut self.bar_activity,
            &mut self.pro_bono,
            &mut self.publications,
            &mut self.linkedin_url,
            &mut self.facebook_url,
            &mut self.twitter_url,
            &mut self.findlaw_url,
            &mut self.profile_url,
            &mut self.profile_tier,
            &mut self.scraped_at,
        ]
    }

    /// Fraction of non-empty fields, rounded to two decimals.
    #[must_use]
    pub fn completeness_score(&self) -> f64 {
        let filled = self.to_csv_row().iter().filter(|v| !v.is_empty()).count();
        ((filled as f64 / FIELD_COUNT as f64) * 100.0).round() / 100.0
    }

    #[must_use]
    pub fn is_auto_bio(&self) -> bool {
        AUTO_BIO_PATTERNS.iter().any(|re| re.is_match(&self.about))
    }

    /// `premium` when any achievement section is present, `expanded` when the
    /// attorney wrote their own bio and lists a phone, otherwise `basic`.
    #[must_use]
    pub fn infer_profile_tier(&self) -> &'static str {
        if !self.bar_activity.is_empty() || !self.pro_bono.is_empty() || !self.publications.is_empty()
        {
            "premium"
        } else if !self.phone.is_empty() && !self.about.is_empty() && !self.is_auto_bio() {
            "expanded"
        } else {
            "basic"
        }
    }

    /// Fill every empty field of `self` from `other`. Non-empty fields win.
    pub fn merge_missing_from(&mut self, other: &AttorneyRecord) {
        for (mine, theirs) in self.fields_mut().into_iter().zip(other.to_csv_row()) {
            if mine.is_empty() && !theirs.is_empty() {
                theirs.clone_into(mine);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_and_row_line_up() {
        let mut r = AttorneyRecord::with_identity("abc", "https://p/abc.html");
        r.state = "CA".into();
        let headers = AttorneyRecord::csv_headers();
        let row = r.to_csv_row();
        let state_idx = headers.iter().position(|h| *h == "state").expect("state column");
        assert_eq!(row[state_idx], "CA");
        assert_eq!(row[0], "abc");
        assert_eq!(headers.len(), 33);
    }

    #[test]
    fn default_country_and_timestamp() {
        let r = AttorneyRecord::default();
        assert_eq!(r.country, "United States");
        assert!(!r.scraped_at.is_empty());
    }

    #[test]
    fn completeness_counts_filled_fields() {
        let mut r = AttorneyRecord::with_identity("x", "");
        r.name = "Y".into();
        r.city = "Z".into();
        // uuid, name, city, country, scraped_at
        assert_eq!(r.completeness_score(), 0.15);

        r.scraped_at.clear();
        r.country.clear();
        assert_eq!(r.completeness_score(), 0.09);
    }

    #[test]
    fn tier_inference() {
        let mut r = AttorneyRecord::default();
        assert_eq!(r.infer_profile_tier(), "basic");

        r.phone = "555-123-4567".into();
        r.about = "Jane has tried forty cases to verdict.".into();
        assert_eq!(r.infer_profile_tier(), "expanded");

        r.about = "Jane Doe is an attorney who represents clients in the area of family law.".into();
        assert_eq!(r.infer_profile_tier(), "basic");

        r.pro_bono = "Legal aid clinic".into();
        assert_eq!(r.infer_profile_tier(), "premium");
    }

    #[test]
    fn merge_fills_only_gaps() {
        let mut profile = AttorneyRecord::with_identity("u1", "");
        profile.name = "From Profile".into();
        let mut listing = AttorneyRecord::with_identity("u1", "https://p/u1.html");
        listing.name = "From Listing".into();
        listing.phone = "5551234567".into();

        profile.merge_missing_from(&listing);
        assert_eq!(profile.name, "From Profile");
        assert_eq!(profile.phone, "5551234567");
        assert_eq!(profile.profile_url, "https://p/u1.html");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let r: AttorneyRecord =
            serde_json::from_str(r#"{"uuid":"x","name":"N"}"#).expect("partial record");
        assert_eq!(r.uuid, "x");
        assert_eq!(r.country, "United States");
        assert!(r.phone.is_empty());
    }
}
