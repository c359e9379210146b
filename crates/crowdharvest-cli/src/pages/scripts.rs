//! JavaScript snippets evaluated in the page.
//!
//! Selector and label arguments are embedded as JSON string literals so page
//! text can never break out of the snippet.

pub const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight); true";

fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

fn find_button(label: &str) -> String {
    format!(
        "Array.from(document.querySelectorAll('button')).find(b => (b.textContent || '').includes({}))",
        js_string(label)
    )
}

/// `true` if at least one element matches `selector`.
pub fn element_exists(selector: &str) -> String {
    format!("document.querySelector({}) !== null", js_string(selector))
}

/// Number of elements matching `selector`.
pub fn element_count(selector: &str) -> String {
    format!("document.querySelectorAll({}).length", js_string(selector))
}

/// Scroll the button labelled `label` into view; `false` if there is none.
pub fn reveal_button(label: &str) -> String {
    format!(
        "(() => {{ const b = {}; if (!b) return false; b.scrollIntoView(true); return true; }})()",
        find_button(label)
    )
}

/// Click the button labelled `label`; `false` if there is none.
pub fn click_button(label: &str) -> String {
    format!(
        "(() => {{ const b = {}; if (!b) return false; b.click(); return true; }})()",
        find_button(label)
    )
}

/// `true` once more than `seen` elements match `selector`, or the button is gone.
pub fn grew_or_exhausted(selector: &str, seen: u64, label: &str) -> String {
    format!(
        "{} > {seen} || !{}",
        element_count(selector),
        find_button(label)
    )
}

/// `true` if any inline script mentions `needle`.
pub fn script_mentions(needle: &str) -> String {
    format!(
        "Array.from(document.scripts).some(s => (s.textContent || '').includes({}))",
        js_string(needle)
    )
}
