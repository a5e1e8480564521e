use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static CONTROL_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("hardcoded regex pattern is valid")
});

#[allow(clippy::expect_used)]
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded regex pattern is valid"));

#[allow(clippy::expect_used)]
static SAFE_SELECTOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z0-9_\-\s.#\[\]=^$*,>+~:'"]+$"#).expect("hardcoded regex pattern is valid")
});

/// Cleans element text for storage in a content item
///
/// Strips control characters (0x00-0x08, 0x0B, 0x0C, 0x0E-0x1F, 0x7F),
/// collapses whitespace runs to one space and trims both ends.
pub fn sanitize_text(text: &str) -> String {
    let without_controls = CONTROL_CHARS.replace_all(text, "");
    collapse_whitespace(&without_controls)
}

/// Collapses whitespace runs to a single space and trims
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUNS.replace_all(text, " ").trim().to_string()
}

/// Returns true if a selector only uses the conservative CSS character set
///
/// Selectors with anything outside `[A-Za-z0-9_-\s.#[]=^$*,>+~:'"]` are
/// rejected before they reach the selector parser.
pub fn is_safe_selector(selector: &str) -> bool {
    SAFE_SELECTOR.is_match(selector)
}
