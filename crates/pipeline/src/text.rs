//! Character-based text capping.

use crate::ELLIPSIS;

/// Cuts `text` to at most `limit` characters, appending [`ELLIPSIS`] when
/// anything was removed.
///
/// Counts `char`s, not bytes, so multi-byte text is never split mid-character.
/// The result is at most `limit + ELLIPSIS.len()` characters long.
pub fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + ELLIPSIS.len());
            out.push_str(&text[..byte_idx]);
            out.push_str(ELLIPSIS);
            out
        }
    }
}

/// Cuts `text` to at most `limit` characters with no marker.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        None => text,
        Some((byte_idx, _)) => &text[..byte_idx],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_with_ellipsis("hello", 5), "hello");
        assert_eq!(truncate_with_ellipsis("", 5), "");
    }

    #[test]
    fn long_text_gets_the_marker() {
        assert_eq!(truncate_with_ellipsis("hello world", 5), "hello...");
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let text = "ééééé";
        assert_eq!(truncate_with_ellipsis(text, 2), "éé...");
        assert_eq!(truncate_chars(text, 3), "ééé");
    }
}
