// src/utils/text.rs

//! Small string helpers shared by the matcher and the deriver.

use unicode_segmentation::UnicodeSegmentation;

/// Maximum length of an id slug, in graphemes.
pub const SLUG_MAX_LEN: usize = 30;

/// Trimmed view of an optional string, `None` when blank.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Lowercase, dash-separated slug truncated to [`SLUG_MAX_LEN`].
///
/// Letters outside ASCII are kept; everything that is not alphanumeric
/// becomes a single dash.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    let truncated: String = slug.graphemes(true).take(SLUG_MAX_LEN).collect();
    truncated.trim_end_matches('-').to_string()
}
