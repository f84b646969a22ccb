//! Markdown code-fence stripping

use std::sync::LazyLock;

use regex::Regex;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?si)^```(?:json)?\s*(.*)\s*```\s*$").expect("fence regex is valid")
});

/// Remove a triple-backtick fence (optionally tagged `json`) wrapping the
/// whole text. Text that is not fully wrapped is returned unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    match FENCE_RE.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text,
    }
}
