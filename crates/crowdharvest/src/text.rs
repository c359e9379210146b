//! Text cleanup shared by the story and updates extractors.

use std::sync::OnceLock;

use regex::Regex;
use scraper::ElementRef;

/// Replace non-breaking spaces and trim.
pub fn clean_text(s: &str) -> String {
    s.replace('\u{a0}', " ").trim().to_string()
}

/// Text of an element with its text nodes joined by `separator`.
///
/// Whitespace-only nodes (indentation between tags) are dropped so that
/// paragraph breaks come out as single line breaks.
pub fn element_text(element: &ElementRef<'_>, separator: &str) -> String {
    // Deliberately stricter than a plain text join, which keeps blank nodes.
    element
        .text()
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Plain concatenated text of an element, cleaned.
pub fn inline_text(element: &ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<String>())
}

fn non_alnum_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid regex"))
}

/// Make a string safe for use in a file name.
///
/// Trims, lower-cases, and replaces each run of non-alphanumeric ASCII
/// characters with a single `_`.
pub fn sanitize_key(s: &str) -> String {
    non_alnum_runs()
        .replace_all(&s.trim().to_lowercase(), "_")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("\u{a0} Hello\u{a0}world \n"), "Hello world");
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn test_element_text_joins_paragraphs() {
        let html = Html::parse_fragment(
            "<div id=\"s\">\n  <p>First&nbsp;line</p>\n  <p>Second <b>bold</b></p>\n</div>",
        );
        let sel = Selector::parse("#s").unwrap();
        let el = html.select(&sel).next().unwrap();
        let text = clean_text(&element_text(&el, "\n"));
        assert_eq!(text, "First line\nSecond \nbold");
    }

    #[test]
    fn test_inline_text() {
        let html = Html::parse_fragment("<div id=\"n\"> Jane <span>Doe</span>\u{a0}</div>");
        let sel = Selector::parse("#n").unwrap();
        let el = html.select(&sel).next().unwrap();
        assert_eq!(inline_text(&el), "Jane Doe");
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("  Jane Doe "), "jane_doe");
        assert_eq!(sanitize_key("March 3, 2024"), "march_3_2024");
        assert_eq!(sanitize_key("Ünïcode--Team!!"), "_n_code_team_");
    }
}
