use std::sync::LazyLock;

use regex::Regex;

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:json)?[ \t]*\r?\n?").expect("valid fence regex"));

/// Removes Markdown code-fence markers (```` ```json ```` and ```` ``` ````)
/// anywhere in a model reply and trims the result.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    FENCE_RE.replace_all(text, "").trim().to_string()
}
