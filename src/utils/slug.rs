//! Tag slugification.
//!
//! Tag pages are written to `public/tags/<slug>.html`, so tag names have
//! to become filesystem- and URL-safe file stems. The mapping must be
//! deterministic: the same tag set always yields the same set of files.

use deunicode::deunicode;

/// Convert a tag name to a URL-safe file stem.
///
/// Transliterates to ASCII, lowercases, folds runs of non-alphanumeric
/// characters into single hyphens and trims them from the ends.
pub fn slugify_tag(tag: &str) -> String {
    let ascii = deunicode(tag).to_lowercase();

    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }
    slug
}
