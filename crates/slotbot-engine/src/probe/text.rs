//! Pure text helpers for extraction: whitespace, titles, time patterns,
//! placeholder/error classification, record denoising.

use once_cell::sync::Lazy;
use regex::Regex;
use slotbot_config::SiteMarkers;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{1,2}:\d{2}\b").unwrap());
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[.\s]+$").unwrap());
static DATE_OR_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{1,2}[./]\d{1,2}(?:[./]\d{2,4})?\b|\b\d{1,2}:\d{2}\b").unwrap());

/// Collapse runs of whitespace (including non-breaking variants) and trim.
pub fn clean_spaces(s: &str) -> String {
    let s = s.replace(['\u{00a0}', '\u{202f}'], " ");
    WHITESPACE.replace_all(&s, " ").trim().to_string()
}

/// Compose a service title from name/duration/cost.
///
/// Never emits leading/trailing separators; the currency suffix is
/// appended iff a non-empty cost value remains after stripping any
/// trailing currency token.
pub fn tidy_service_title(name: &str, duration: &str, cost: &str, markers: &SiteMarkers) -> String {
    let name = clean_spaces(name);
    let duration = clean_spaces(duration);
    let mut cost = clean_spaces(cost);

    if !cost.is_empty() {
        cost = strip_currency(&cost, &markers.currency_tokens);
        if !cost.is_empty() {
            cost = format!("{} {}", cost, markers.currency_suffix);
        }
    }

    [name, duration, cost]
        .iter()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(" — ")
}

/// Strip a trailing currency token (longest first, case-insensitive).
fn strip_currency(cost: &str, tokens: &[String]) -> String {
    let mut tokens: Vec<&String> = tokens.iter().collect();
    tokens.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));

    let low = cost.to_lowercase();
    for token in tokens {
        let token_low = token.to_lowercase();
        if let Some(stripped) = low.strip_suffix(&token_low) {
            let keep = stripped.chars().count();
            return cost.chars().take(keep).collect::<String>().trim().to_string();
        }
    }
    cost.to_string()
}

/// Truncated, denoised raw-text rendering of a catalog row, for rows whose
/// structured fields are all empty.
pub fn short_raw_fallback(raw: &str, markers: &SiteMarkers) -> String {
    let raw = clean_spaces(raw);
    if raw.is_empty() {
        return String::new();
    }

    // Cut at the first boilerplate phrase; everything after it is chrome,
    // not service description.
    let low = raw.to_lowercase();
    let mut cut = markers
        .catalog_boilerplate
        .iter()
        .filter_map(|phrase| low.find(&phrase.to_lowercase()))
        .min()
        .unwrap_or(raw.len())
        .min(raw.len());
    while cut > 0 && !raw.is_char_boundary(cut) {
        cut -= 1;
    }

    truncate_chars(clean_spaces(&raw[..cut]).as_str(), 140)
}

/// First `H:MM` / `HH:MM` occurrence in the text.
pub fn first_time(s: &str) -> Option<String> {
    TIME.find(s).map(|m| m.as_str().to_string())
}

/// Every time pattern in the text, deduplicated, first-seen order.
pub fn scan_times(s: &str) -> Vec<String> {
    dedup_keep_order(TIME.find_iter(s).map(|m| m.as_str().to_string()))
}

/// Deduplicate while preserving first-seen order.
pub fn dedup_keep_order<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}

/// True when the text contains a known server-error phrase.
pub fn is_server_error(text: &str, markers: &SiteMarkers) -> bool {
    let low = text.trim().to_lowercase();
    markers
        .server_error_phrases
        .iter()
        .any(|p| low.contains(&p.to_lowercase()))
}

/// True for blank text or text consisting only of dots/whitespace.
pub fn is_placeholder(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || PLACEHOLDER.is_match(text)
}

/// True when the text contains any of the phrases (lower-cased containment).
pub fn contains_any(text: &str, phrases: &[String]) -> bool {
    let low = text.to_lowercase();
    phrases.iter().any(|p| low.contains(&p.to_lowercase()))
}

/// Character-boundary-safe truncation.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// True when a record block carries a date-or-time pattern.
pub fn has_date_or_time(text: &str) -> bool {
    DATE_OR_TIME.is_match(text)
}

/// Denoise one extracted record block: drop empty and boilerplate lines,
/// cap the line count, re-join.
pub fn denoise_record(block: &str, markers: &SiteMarkers, max_lines: usize) -> String {
    block
        .lines()
        .map(clean_spaces)
        .filter(|line| !line.is_empty())
        .filter(|line| !contains_any(line, &markers.records_boilerplate))
        .take(max_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
