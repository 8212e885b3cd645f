//! Attorney profile pages: all 33 record fields.
//!
//! Every field is extracted on its own. A field whose extraction fails is
//! logged and left empty; the rest of the record is still filled.

use anyhow::{Context, Result};
use log::warn;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use super::address::{Address, parse_address};
use super::dom::{
    ancestor_named, element_lines, element_text, find_by_text, find_following, find_text_node,
    next_element_sibling, next_element_siblings, next_text_node, parent_element,
};
use crate::models::AttorneyRecord;
use crate::utils::{MULTIVALUE_DELIMITER, strip_query};

// ============================================================================
// Selectors
// ============================================================================

macro_rules! selector {
    ($name:ident, $css:literal) => {
        static $name: LazyLock<Selector> = LazyLock::new(|| {
            Selector::parse($css).expect(concat!("BUG: hardcoded CSS selector '", $css, "' is invalid"))
        });
    };
}

selector!(ATTORNEY_NAME, "h1#attorney_name");
selector!(H1, "h1");
selector!(H3, "h3");
selector!(TAGLINE, "h2.paragraph-large");
selector!(FIRM_LINK, r#"a[href*="/lawfirm/"]"#);
selector!(TEL_LINK, r#"a[href^="tel:"]"#);
selector!(MAILTO_LINK, r#"a[href^="mailto:"]"#);
selector!(STATIC_MAP, r#"img[src*="maps.googleapis.com"]"#);
selector!(MAPS_LINK, r#"a[href*="google.com/maps"]"#);
selector!(ABOUT_PARAGRAPHS, "div#about p");
selector!(PRACTICE_AREAS_TAB, "div#practice-areas");
selector!(ACHIEVEMENTS_TAB, "div#achievements");
selector!(SIDEBAR_ITEM, "p.mb-0");
selector!(LAW_SCHOOL_LINK, r#"a[href*="lawschools.superlawyers.com"]"#);
selector!(SELECTION_NOTE, "span.fst-italic");
selector!(LINK, "a[href]");
selector!(SPAN, "span");
selector!(LIST_ITEM, "li");

// ============================================================================
// Patterns
// ============================================================================

macro_rules! pattern {
    ($name:ident, $re:literal) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new($re).expect(concat!("BUG: hardcoded regex '", $re, "' is invalid"))
        });
    };
}

pattern!(
    PROFILE_UUID,
    r"/([\da-f]{8}-[\da-f]{4}-[\da-f]{4}-[\da-f]{4}-[\da-f]{12})\.html"
);
pattern!(MAP_CENTER, r"center=([-\d.]+),([-\d.]+)");
pattern!(MAP_AT, r"@([-\d.]+),([-\d.]+)");
pattern!(PRACTICE_HEADING, r"(?i)^Practice areas?$");
pattern!(FOCUS_HEADING, r"(?i)^Focus areas?$");
pattern!(VIEW_MORE, r";?\s*view more$");
pattern!(LICENSED_IN, r"Licensed in \w+ since:\s*(\d{4})");
pattern!(FIRST_ADMITTED, r"First Admitted:\s*(\d{4})");
pattern!(LANGUAGES, r"Languages?\s+spoken:\s*([^\n]+)");
pattern!(SELECTION_YEARS, r"Selected to (?:Super Lawyers|Rising Stars):\s*(.+)");
pattern!(
    SELECTION_YEARS_LOOSE,
    r"Selected to (?:Super Lawyers|Rising Stars):\s*(.+?)(?:\s{2,}|\n|$)"
);
pattern!(VISIT_WEBSITE, r"(?i)Visit website");
pattern!(PROFESSIONAL_WEBPAGE, r"Professional Webpage:\s*(https?://\S+)");

/// Section headings copied into the achievement fields, joined with ` ; `.
const HONORS: &str = "Honors";
const BAR_ACTIVITY: &str = "Bar / Professional Activity";
const PRO_BONO: &str = "Pro bono / Community Service";
const PUBLICATIONS: &str = "Scholarly Lectures / Writings";

#[derive(Debug, Default)]
struct SocialLinks {
    linkedin: Option<String>,
    facebook: Option<String>,
    twitter: Option<String>,
    findlaw: Option<String>,
}

/// Parse a profile page fetched from `url`.
#[must_use]
pub fn parse_profile(html: &str, url: &str) -> AttorneyRecord {
    let page = ProfilePage::new(html);
    let mut r = AttorneyRecord::with_identity(profile_uuid(url), strip_query(url));

    // Identity
    r.name = field("name", page.name());
    r.firm_name = field("firm_name", page.firm_name());
    r.selection_type = field("selection_type", page.selection_type());
    r.selection_years = field("selection_years", page.selection_years());
    r.description = field("description", page.description());

    // Location
    let address = page.address().unwrap_or_else(|e| {
        warn!("Extraction error in address: {e:#}");
        Address::default()
    });
    r.street = address.street;
    r.city = address.city;
    r.state = address.state;
    r.zip_code = address.zip_code;
    r.geo_coordinates = field("geo_coordinates", page.geo_coordinates());

    // Contact
    r.phone = field("phone", page.phone());
    r.email = field("email", page.email());
    r.firm_website_url = field("firm_website_url", page.firm_website());
    r.professional_webpage_url = field("professional_webpage_url", page.professional_webpage());

    // Professional
    r.about = field("about", page.about());
    r.practice_areas = field("practice_areas", page.practice_areas());
    r.focus_areas = field("focus_areas", page.focus_areas());
    r.licensed_since = field("licensed_since", page.licensed_since());
    r.education = field("education", page.education());
    r.languages = field("languages", page.languages());

    // Achievements
    r.honors = field("honors", page.section(HONORS));
    r.bar_activity = field("bar_activity", page.section(BAR_ACTIVITY));
    r.pro_bono = field("pro_bono", page.section(PRO_BONO));
    r.publications = field("publications", page.section(PUBLICATIONS));

    // Social
    let socials = page.social_links().unwrap_or_else(|e| {
        warn!("Extraction error in social links: {e:#}");
        SocialLinks::default()
    });
    r.linkedin_url = socials.linkedin.unwrap_or_default();
    r.facebook_url = socials.facebook.unwrap_or_default();
    r.twitter_url = socials.twitter.unwrap_or_default();
    r.findlaw_url = socials.findlaw.unwrap_or_default();

    r.profile_tier = r.infer_profile_tier().to_string();
    r
}

fn profile_uuid(url: &str) -> String {
    PROFILE_UUID
        .captures(url)
        .map(|c| c[1].to_string())
        .unwrap_or_default()
}

fn field(name: &str, value: Result<String>) -> String {
    value.unwrap_or_else(|e| {
        warn!("Extraction error in {name}: {e:#}");
        String::new()
    })
}

fn href(el: ElementRef<'_>) -> Result<&str> {
    el.value()
        .attr("href")
        .with_context(|| format!("<{}> has no href", el.value().name()))
}

struct ProfilePage {
    doc: Html,
    /// Concatenated text of the whole document
    text: String,
}

impl ProfilePage {
    fn new(html: &str) -> Self {
        let doc = Html::parse_document(html);
        let text = doc.root_element().text().collect();
        Self { doc, text }
    }

    fn root(&self) -> ElementRef<'_> {
        self.doc.root_element()
    }

    fn first_text(&self, selector: &Selector) -> String {
        self.doc
            .select(selector)
            .next()
            .map(element_text)
            .unwrap_or_default()
    }

    fn sidebar_items(&self) -> impl Iterator<Item = String> + '_ {
        self.doc.select(&SIDEBAR_ITEM).map(element_text)
    }

    fn name(&self) -> Result<String> {
        let name = self.first_text(&ATTORNEY_NAME);
        Ok(if name.is_empty() { self.first_text(&H1) } else { name })
    }

    fn description(&self) -> Result<String> {
        Ok(self.first_text(&TAGLINE))
    }

    fn firm_name(&self) -> Result<String> {
        Ok(self.first_text(&FIRM_LINK))
    }

    fn phone(&self) -> Result<String> {
        Ok(self.first_text(&TEL_LINK))
    }

    fn email(&self) -> Result<String> {
        let Some(link) = self.doc.select(&MAILTO_LINK).next() else {
            return Ok(String::new());
        };
        let address = href(link)?.replacen("mailto:", "", 1);
        Ok(strip_query(&address).to_string())
    }

    fn address(&self) -> Result<Address> {
        let Some(heading) = find_by_text(self.root(), &H3, |t| t.contains("Office location for"))
        else {
            return Ok(Address::default());
        };
        let block = ancestor_named(heading, "div").context("address heading has no enclosing div")?;
        Ok(parse_address(&element_lines(block)))
    }

    fn geo_coordinates(&self) -> Result<String> {
        if let Some(img) = self.doc.select(&STATIC_MAP).next()
            && let Some(caps) = img.value().attr("src").and_then(|s| MAP_CENTER.captures(s))
        {
            return Ok(format!("{},{}", &caps[1], &caps[2]));
        }
        if let Some(link) = self.doc.select(&MAPS_LINK).next()
            && let Some(caps) = MAP_AT.captures(href(link)?)
        {
            return Ok(format!("{},{}", &caps[1], &caps[2]));
        }
        Ok(String::new())
    }

    fn about(&self) -> Result<String> {
        Ok(self
            .doc
            .select(&ABOUT_PARAGRAPHS)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }

    /// The practice-areas tab when present, else the whole page.
    fn practice_scope(&self) -> ElementRef<'_> {
        self.doc
            .select(&PRACTICE_AREAS_TAB)
            .next()
            .unwrap_or_else(|| self.root())
    }

    fn practice_areas(&self) -> Result<String> {
        if let Some(heading) = find_by_text(self.practice_scope(), &H3, |t| PRACTICE_HEADING.is_match(t)) {
            if let Some(text) = next_text_node(heading) {
                return Ok(text);
            }
            if let Some(next) = next_element_sibling(heading)
                && next.value().name() != "h3"
            {
                return Ok(element_text(next));
            }
        }

        for item in self.sidebar_items() {
            if let Some(rest) = item.strip_prefix("Practice areas:") {
                return Ok(VIEW_MORE.replace(rest.trim(), "").trim().to_string());
            }
        }
        Ok(String::new())
    }

    fn focus_areas(&self) -> Result<String> {
        let Some(heading) = find_by_text(self.practice_scope(), &H3, |t| FOCUS_HEADING.is_match(t))
        else {
            return Ok(String::new());
        };
        if let Some(next) = next_element_sibling(heading)
            && next.value().name() == "p"
        {
            return Ok(element_text(next));
        }
        Ok(next_text_node(heading).unwrap_or_default())
    }

    fn licensed_since(&self) -> Result<String> {
        for item in self.sidebar_items() {
            if let Some(caps) = LICENSED_IN.captures(&item) {
                return Ok(caps[1].to_string());
            }
        }
        if let Some(tab) = self.doc.select(&ACHIEVEMENTS_TAB).next()
            && let Some(caps) = FIRST_ADMITTED.captures(&element_text(tab))
        {
            return Ok(caps[1].to_string());
        }
        Ok(FIRST_ADMITTED
            .captures(&self.text)
            .map(|c| c[1].to_string())
            .unwrap_or_default())
    }

    fn education(&self) -> Result<String> {
        if let Some(link) = self.doc.select(&LAW_SCHOOL_LINK).next() {
            let school = element_text(link);
            if !school.is_empty() && !school.eq_ignore_ascii_case("law schools") {
                return Ok(school);
            }
        }
        Ok(self
            .sidebar_items()
            .find_map(|item| item.strip_prefix("Education:").map(|s| s.trim().to_string()))
            .unwrap_or_default())
    }

    fn languages(&self) -> Result<String> {
        Ok(LANGUAGES
            .captures(&self.text)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default())
    }

    fn selection_type(&self) -> Result<String> {
        let kind = |text: &str| {
            if text.contains("Selected to Rising Stars") {
                Some("Rising Stars")
            } else if text.contains("Selected to Super Lawyers") {
                Some("Super Lawyers")
            } else {
                None
            }
        };
        Ok(self
            .doc
            .select(&SELECTION_NOTE)
            .find_map(|span| kind(&element_text(span)))
            .or_else(|| kind(&self.text))
            .unwrap_or_default()
            .to_string())
    }

    fn selection_years(&self) -> Result<String> {
        for span in self.doc.select(&SELECTION_NOTE) {
            if let Some(caps) = SELECTION_YEARS.captures(&element_text(span)) {
                return Ok(caps[1].trim().to_string());
            }
        }
        Ok(SELECTION_YEARS_LOOSE
            .captures(&self.text)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default())
    }

    fn firm_website(&self) -> Result<String> {
        match find_by_text(self.root(), &LINK, |t| VISIT_WEBSITE.is_match(t)) {
            Some(link) => Ok(strip_query(href(link)?).to_string()),
            None => Ok(String::new()),
        }
    }

    fn professional_webpage(&self) -> Result<String> {
        let scope = self
            .doc
            .select(&ACHIEVEMENTS_TAB)
            .next()
            .unwrap_or_else(|| self.root());

        if let Some(label) = find_by_text(scope, &SPAN, |t| t.contains("Professional Webpage"))
            && let Some(container) = parent_element(*label)
            && let Some(link) = find_following(self.root(), container, |e| {
                e.value().name() == "a" && e.value().attr("href").is_some()
            })
        {
            return Ok(strip_query(href(link)?).to_string());
        }

        Ok(PROFESSIONAL_WEBPAGE
            .captures(&self.text)
            .map(|c| c[1].trim().to_string())
            .unwrap_or_default())
    }

    fn social_links(&self) -> Result<SocialLinks> {
        let scope = find_text_node(self.root(), "Find me online")
            .and_then(parent_element)
            .map(|container| {
                if container.value().name() == "h2" {
                    parent_element(*container).unwrap_or(container)
                } else {
                    container
                }
            })
            .unwrap_or_else(|| self.root());

        let mut links = SocialLinks::default();
        for link in scope.select(&LINK) {
            let url = href(link)?;
            let lower = url.to_lowercase();
            if lower.contains("linkedin.com/in/") {
                links.linkedin = Some(url.to_string());
            } else if lower.contains("linkedin.com/company/") {
                links.linkedin.get_or_insert_with(|| url.to_string());
            } else if lower.contains("facebook.com") {
                if !lower.contains("superlawyers") {
                    links.facebook.get_or_insert_with(|| url.to_string());
                }
            } else if lower.contains("twitter.com") || lower.contains("x.com") {
                if !lower.contains("superlawyers") {
                    links.twitter.get_or_insert_with(|| url.to_string());
                }
            } else if lower.contains("lawyers.findlaw.com") {
                links.findlaw.get_or_insert_with(|| url.to_string());
            }
        }
        Ok(links)
    }

    /// Items under the h3 titled `heading`, up to the next h3 or hr.
    fn section(&self, heading: &str) -> Result<String> {
        let needle = heading.to_lowercase();
        let Some(h3) = find_by_text(self.root(), &H3, |t| t.to_lowercase().contains(&needle)) else {
            return Ok(String::new());
        };

        let mut items = Vec::new();
        for sibling in next_element_siblings(h3) {
            match sibling.value().name() {
                "h3" | "hr" => break,
                "ul" => items.extend(sibling.select(&LIST_ITEM).map(element_text)),
                "li" | "p" => items.push(element_text(sibling)),
                _ => {}
            }
        }
        items.retain(|t| !t.is_empty());
        Ok(items.join(MULTIVALUE_DELIMITER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://profiles.example.com/california/los-angeles/lawyer/jane-roe/1f2e3d4c-aaaa-4bbb-8ccc-0123456789ab.html?adSubId=3";

    const PAGE: &str = r#"<html><body>
        <h1 id="attorney_name">Jane Roe</h1>
        <h2 class="paragraph-large">Business litigation attorney</h2>
        <a href="https://profiles.example.com/lawfirm/roe-law/">Roe Law Group</a>
        <a href="tel:+12135550100">213-555-0100</a>
        <a href="mailto:jane@roelaw.example?subject=Hi">Email</a>
        <a href="https://roelaw.example/?utm_source=sl">Visit website</a>
        <span class="fst-italic">Selected to Super Lawyers: 2019 - 2024</span>
        <div class="card"><h3>Office location for Jane Roe</h3>
          <p>350 S Grand Ave</p><p>Suite 2100</p><p>Los Angeles, CA 90071</p><p>Phone: 213-555-0100</p>
        </div>
        <img src="https://maps.googleapis.com/maps/api/staticmap?center=34.05,-118.25&zoom=15">
        <div id="about"><p>First paragraph.</p><p></p><p>Second paragraph.</p></div>
        <div id="practice-areas">
          <h3>Practice areas</h3> Business Litigation, Class Action
          <h3>Focus areas</h3><p>Contract disputes</p>
        </div>
        <p class="mb-0">Licensed in California since: 2008</p>
        <p class="mb-0">Education: UCLA School of Law</p>
        <div id="achievements">
          <h3>Honors</h3><ul><li>Top 100</li><li>Top 50 Women</li></ul><hr>
          <h3>Bar / Professional Activity</h3><p>State Bar of California</p>
          <span>Professional Webpage:</span> <a href="https://bar.example/jane?ref=sl">link</a>
        </div>
        <p>Languages spoken: English, Spanish
        </p>
        <section><h2>Find me online</h2>
          <a href="https://www.linkedin.com/company/roe-law">Co</a>
          <a href="https://www.linkedin.com/in/janeroe">Me</a>
          <a href="https://www.facebook.com/superlawyers">SL</a>
          <a href="https://www.facebook.com/roelaw">FB</a>
          <a href="https://lawyers.findlaw.com/profile/jane">FL</a>
        </section>
    </body></html>"#;

    #[test]
    fn parses_full_profile() {
        let r = parse_profile(PAGE, URL);
        assert_eq!(r.uuid, "1f2e3d4c-aaaa-4bbb-8ccc-0123456789ab");
        assert_eq!(r.name, "Jane Roe");
        assert_eq!(r.description, "Business litigation attorney");
        assert_eq!(r.firm_name, "Roe Law Group");
        assert_eq!(r.phone, "213-555-0100");
        assert_eq!(r.email, "jane@roelaw.example");
        assert_eq!(r.firm_website_url, "https://roelaw.example/");
        assert_eq!(r.selection_type, "Super Lawyers");
        assert_eq!(r.selection_years, "2019 - 2024");
        assert_eq!(r.street, "350 S Grand Ave, Suite 2100");
        assert_eq!(r.city, "Los Angeles");
        assert_eq!(r.state, "CA");
        assert_eq!(r.zip_code, "90071");
        assert_eq!(r.geo_coordinates, "34.05,-118.25");
        assert_eq!(r.about, "First paragraph.\n\nSecond paragraph.");
        assert_eq!(r.practice_areas, "Business Litigation, Class Action");
        assert_eq!(r.focus_areas, "Contract disputes");
        assert_eq!(r.licensed_since, "2008");
        assert_eq!(r.education, "UCLA School of Law");
        assert_eq!(r.languages, "English, Spanish");
        assert_eq!(r.honors, "Top 100 ; Top 50 Women");
        assert_eq!(r.bar_activity, "State Bar of California");
        assert_eq!(r.professional_webpage_url, "https://bar.example/jane");
        assert_eq!(r.linkedin_url, "https://www.linkedin.com/in/janeroe");
        assert_eq!(r.facebook_url, "https://www.facebook.com/roelaw");
        assert_eq!(r.findlaw_url, "https://lawyers.findlaw.com/profile/jane");
        assert!(r.twitter_url.is_empty());
        assert!(!r.profile_url.contains('?'));
        assert_eq!(r.profile_tier, "premium");
    }

    #[test]
    fn sparse_page_degrades_to_empty_fields() {
        let r = parse_profile("<html><body><h1>John Doe</h1></body></html>", URL);
        assert_eq!(r.name, "John Doe");
        assert!(r.street.is_empty() && r.about.is_empty() && r.honors.is_empty());
        assert_eq!(r.country, "United States");
        assert_eq!(r.profile_tier, "basic");
    }

    #[test]
    fn sidebar_practice_areas_drop_view_more() {
        let html = r#"<p class="mb-0">Practice areas: Tax; Estate Planning; view more</p>"#;
        let r = parse_profile(html, URL);
        assert_eq!(r.practice_areas, "Tax; Estate Planning");
    }
}
