//! Free-text sanitization applied to request bodies before validation.

use std::sync::LazyLock;

use regex::Regex;

/// Generic text is cut to this many characters.
pub const MAX_INPUT_CHARS: usize = 10_000;

/// Descriptions are cut to this many characters.
pub const MAX_DESCRIPTION_CHARS: usize = 50_000;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid regex"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

static SQL_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|UNION|OR|AND|EXEC|EXECUTE)\b",
    )
    .expect("valid regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Types whose free-text fields are cleaned in place.
pub trait Sanitize {
    fn sanitize(&mut self);
}

/// Trim, strip markup, escape, mask SQL keywords, drop NUL/CR and truncate.
pub fn sanitize_input(input: &str) -> String {
    clean(input, MAX_INPUT_CHARS)
}

/// [`sanitize_input`] plus trailing dots/spaces removed and whitespace
/// runs collapsed.
pub fn sanitize_project_name(input: &str) -> String {
    let cleaned = sanitize_input(input);
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == ' ');
    collapse_whitespace(trimmed)
}

pub fn sanitize_task_title(input: &str) -> String {
    collapse_whitespace(&sanitize_input(input))
}

/// Like [`sanitize_input`] with the longer description limit. Line breaks
/// other than `\r` are kept.
pub fn sanitize_description(input: &str) -> String {
    clean(input, MAX_DESCRIPTION_CHARS)
}

pub fn sanitize_optional(input: &mut Option<String>, f: fn(&str) -> String) {
    if let Some(value) = input.as_mut() {
        *value = f(value);
    }
}

fn clean(input: &str, max_chars: usize) -> String {
    let trimmed = input.trim();
    let without_scripts = SCRIPT_RE.replace_all(trimmed, "");
    let without_tags = TAG_RE.replace_all(&without_scripts, "");
    let escaped = escape_html(&without_tags);
    let masked = SQL_KEYWORD_RE.replace_all(&escaped, |caps: &regex::Captures| {
        "*".repeat(caps[0].len())
    });
    let stripped: String = masked.chars().filter(|c| *c != '\0' && *c != '\r').collect();
    truncate_chars(stripped, max_chars)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn collapse_whitespace(input: &str) -> String {
    WHITESPACE_RE.replace_all(input.trim(), " ").into_owned()
}

fn truncate_chars(mut s: String, max_chars: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max_chars) {
        s.truncate(idx);
    }
    s
}
