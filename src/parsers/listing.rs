//! Listing (search result) pages: one partial record per attorney card.
//!
//! A card yields up to seven fields: uuid, name, firm, phone, tagline,
//! selection type and the profile URL. Cards that link to firms or contact
//! forms instead of a lawyer profile are skipped.

use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

use super::dom::element_text;
use crate::models::AttorneyRecord;
use crate::utils::strip_query;

static CARD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.serp-container")
        .expect("BUG: hardcoded CSS selector 'div.serp-container' is invalid")
});

static NAME_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h2.full-name a[href]")
        .expect("BUG: hardcoded CSS selector 'h2.full-name a[href]' is invalid")
});

static FIRM: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.single-link").expect("BUG: hardcoded CSS selector 'a.single-link' is invalid")
});

static TEL_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"a[href^="tel:"]"#).expect("BUG: hardcoded CSS selector for tel links is invalid")
});

static TAGLINE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("p.ts_tagline").expect("BUG: hardcoded CSS selector 'p.ts_tagline' is invalid")
});

static RIBBON: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("i.icon-ribbon").expect("BUG: hardcoded CSS selector 'i.icon-ribbon' is invalid")
});

static PROFILE_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/([\w-]{36})\.html").expect("BUG: hardcoded profile uuid regex is invalid")
});

/// Parse every attorney card on a listing page, deduplicated by uuid.
#[must_use]
pub fn parse_listing_page(html: &str) -> Vec<AttorneyRecord> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for card in doc.select(&CARD) {
        let Some(link) = card.select(&NAME_LINK).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if !href.contains("/lawyer/") {
            continue;
        }
        let Some(caps) = PROFILE_UUID.captures(href) else {
            continue;
        };
        let uuid = caps[1].to_string();
        if !seen.insert(uuid.clone()) {
            continue;
        }

        let mut record = AttorneyRecord::with_identity(uuid, strip_query(href));
        record.name = element_text(link);

        if let Some(firm) = card.select(&FIRM).next() {
            record.firm_name = element_text(firm);
        }
        if let Some(href) = card
            .select(&TEL_LINK)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            record.phone = listing_phone(href);
        }
        if let Some(tagline) = card.select(&TAGLINE).next() {
            record.description = element_text(tagline);
        }
        if let Some(label) = card
            .select(&RIBBON)
            .next()
            .and_then(|i| i.value().attr("aria-label"))
        {
            if label.contains("Rising Stars") {
                record.selection_type = "Rising Stars".to_string();
            } else if label.contains("Super Lawyers") {
                record.selection_type = "Super Lawyers".to_string();
            }
        }

        records.push(record);
    }

    records
}

/// `tel:+13105550100` -> `3105550100`
fn listing_phone(href: &str) -> String {
    let raw = href.replace("tel:", "").replace("+1", "");
    raw.trim_start_matches('1').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID_A: &str = "0a1b2c3d-0000-4000-8000-00000000000a";
    const ID_B: &str = "0a1b2c3d-0000-4000-8000-00000000000b";

    fn card(id: &str, extra: &str) -> String {
        format!(
            r#"<div class="serp-container">
                <h2 class="full-name"><a href="https://profiles.example.com/california/los-angeles/lawyer/jane-roe/{id}.html?adSubId=9">Jane Roe</a></h2>
                {extra}
            </div>"#
        )
    }

    #[test]
    fn parses_card_fields() {
        let html = card(
            ID_A,
            r#"<a class="single-link" href="/lawfirm/x">Roe &amp; Co</a>
               <a href="tel:+13105550100">Call</a>
               <p class="ts_tagline">Tax lawyer serving LA</p>
               <i class="icon-ribbon" aria-label="Selected to Rising Stars"></i>"#,
        );
        let records = parse_listing_page(&html);
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.uuid, ID_A);
        assert_eq!(r.name, "Jane Roe");
        assert_eq!(r.firm_name, "Roe & Co");
        assert_eq!(r.phone, "3105550100");
        assert_eq!(r.description, "Tax lawyer serving LA");
        assert_eq!(r.selection_type, "Rising Stars");
        assert!(!r.profile_url.contains('?'));
    }

    #[test]
    fn skips_firm_cards_and_duplicates() {
        let firm = r#"<div class="serp-container"><h2 class="full-name"><a href="/lawfirm/acme/0a1b2c3d-0000-4000-8000-00000000000f.html">Acme</a></h2></div>"#;
        let html = format!("{}{}{}{firm}", card(ID_A, ""), card(ID_B, ""), card(ID_A, ""));
        let ids: Vec<_> = parse_listing_page(&html).into_iter().map(|r| r.uuid).collect();
        assert_eq!(ids, vec![ID_A.to_string(), ID_B.to_string()]);
    }

    #[test]
    fn empty_page_has_no_cards() {
        assert!(parse_listing_page("<html><body><p>No results</p></body></html>").is_empty());
    }
}
