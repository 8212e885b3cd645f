//! UTF-8-safe string helpers
//!
//! Truncation that respects character boundaries, plus the slug function
//! used to turn a city name into a URL path segment.

/// Safely truncate a string to a maximum number of CHARACTERS (not bytes).
///
/// This function respects UTF-8 character boundaries and will never panic,
/// even with multi-byte characters like accented names or emoji.
///
/// # Examples
/// ```
/// # use attorney_scrape::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("Peña Law", 4), "Peña");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

/// Truncate to `max_chars` characters and append `marker` when anything was cut.
#[must_use]
pub fn truncate_with_marker(s: &str, max_chars: usize, marker: &str) -> String {
    let head = safe_truncate_chars(s, max_chars);
    if head.len() == s.len() {
        s.to_string()
    } else {
        format!("{head}{marker}")
    }
}

/// Lowercase ASCII slug: runs of anything that is not `[a-z0-9]` collapse
/// to a single `-`, with no leading or trailing dash.
///
/// Latin accents are folded to their base letter first so that
/// "San José" becomes `san-jose` rather than `san-jos`.
///
/// ```
/// # use attorney_scrape::utils::string_utils::slugify;
/// assert_eq!(slugify("Los Angeles"), "los-angeles");
/// assert_eq!(slugify("  St. Louis "), "st-louis");
/// assert_eq!(slugify("San José"), "san-jose");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars().map(fold_accent) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch == '\'' {
            // "Coeur d'Alene" -> "coeur-dalene"
            continue;
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn fold_accent(ch: char) -> char {
    match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'ñ' => 'n',
        'Ñ' => 'N',
        'ç' => 'c',
        'Ç' => 'C',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_collapses_punctuation_runs() {
        assert_eq!(slugify("Winston--Salem"), "winston-salem");
        assert_eq!(slugify("Coeur d'Alene"), "coeur-dalene");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn truncate_marker_only_when_cut() {
        assert_eq!(truncate_with_marker("abc", 5, "..."), "abc");
        assert_eq!(truncate_with_marker("abcdef", 3, "..."), "abc...");
    }
}
