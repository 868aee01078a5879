//! Markup stripping for fetched pages.

use std::sync::LazyLock;

use regex::Regex;

/// Elements whose contents never belong in the readable text of a page.
const NON_CONTENT_TAGS: [&str; 6] = ["script", "style", "nav", "header", "footer", "noscript"];

/// Column width handed to the text renderer.
const RENDER_WIDTH: usize = 100;

/// Deepest nesting of indenting elements handed to the renderer. Each level
/// narrows the usable width; deeper pages are reduced to plain text instead.
pub const MAX_INDENT_DEPTH: usize = 8;

/// Largest body, in bytes, that is rendered. The rest is dropped before any
/// parsing happens.
pub const MAX_RENDER_BYTES: usize = 2 * 1024 * 1024;

static NON_CONTENT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NON_CONTENT_TAGS
        .iter()
        .filter_map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).ok())
        .collect()
});

static INDENTING_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)<(/?)(?:blockquote|ul|ol|dl|dd|table)\b[^>]*>").ok()
});

static BLOCK_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:p|div|br|li|tr|h[1-6]|blockquote|section|article)\b[^>]*>").ok()
});

static ANY_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").ok());

static HTML_HINT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype\s+html|<html\b|<body\b|<p\b|<div\b").ok());

/// Decides whether a payload should be treated as HTML.
///
/// The `Content-Type` header wins when present; otherwise the body is sniffed
/// for common document tags.
pub fn looks_like_html(content_type: Option<&str>, body: &str) -> bool {
    if let Some(ct) = content_type {
        let ct = ct.to_ascii_lowercase();
        if ct.contains("html") {
            return true;
        }
        if ct.starts_with("text/plain") || ct.contains("json") {
            return false;
        }
    }
    HTML_HINT.as_ref().is_some_and(|re| re.is_match(body))
}

/// Removes non-content elements, including everything between their tags.
pub fn strip_non_content(html: &str) -> String {
    NON_CONTENT
        .iter()
        .fold(html.to_string(), |acc, re| re.replace_all(&acc, " ").into_owned())
}

/// Cuts `body` to at most `max_bytes`, backing off to a char boundary.
pub fn clamp_bytes(body: &str, max_bytes: usize) -> &str {
    if body.len() <= max_bytes {
        return body;
    }
    let mut end = max_bytes;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Deepest nesting of list, quote, and table elements in `html`.
pub fn indent_depth(html: &str) -> usize {
    let Some(re) = INDENTING_TAG.as_ref() else {
        return usize::MAX;
    };
    let (mut depth, mut deepest) = (0usize, 0usize);
    for caps in re.captures_iter(html) {
        if caps.get(1).is_some_and(|m| m.as_str() == "/") {
            depth = depth.saturating_sub(1);
        } else {
            depth += 1;
            deepest = deepest.max(depth);
        }
    }
    deepest
}

/// Strips non-content elements and renders the rest as plain text.
///
/// Pages nested deeper than [`MAX_INDENT_DEPTH`] skip the layout renderer and
/// have their tags removed instead.
pub fn html_to_text(html: &str) -> String {
    let stripped = strip_non_content(clamp_bytes(html, MAX_RENDER_BYTES));
    let rendered = if indent_depth(&stripped) > MAX_INDENT_DEPTH {
        tags_removed(&stripped)
    } else {
        html2text::from_read(stripped.as_bytes(), RENDER_WIDTH)
    };
    collapse_blank_lines(&rendered)
}

/// Layout-free rendering: block tags become line breaks, other tags vanish,
/// common entities are decoded.
fn tags_removed(html: &str) -> String {
    let broken = match BLOCK_TAG.as_ref() {
        Some(re) => re.replace_all(html, "\n").into_owned(),
        None => html.to_string(),
    };
    let bare = match ANY_TAG.as_ref() {
        Some(re) => re.replace_all(&broken, " ").into_owned(),
        None => broken,
    };
    let decoded = bare
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trims trailing whitespace and squeezes runs of blank lines to one.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
