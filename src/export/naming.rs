//! Suggested output filenames.
//!
//! Derived from the source filename: strip the extension, collapse every
//! non-alphanumeric run into a single underscore, trim underscores at both
//! ends, lowercase, truncate to 100 characters, then append the output
//! extension.

use crate::config::OutputFormat;

/// Longest sanitized stem the export boundary accepts.
const MAX_STEM_LEN: usize = 100;

/// Sanitize a source filename into a safe output stem.
///
/// A name that sanitizes to nothing falls back to `image`.
pub fn sanitize_stem(name: &str) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => name,
    };

    let mut out = String::with_capacity(stem.len());
    let mut pending_sep = false;
    for ch in stem.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch);
        } else {
            pending_sep = true;
        }
    }

    out.truncate(MAX_STEM_LEN);
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("image");
    }
    out
}

/// Full suggested filename for one finished render.
pub fn suggested_filename(source_name: &str, format: OutputFormat) -> String {
    format!("{}.{}", sanitize_stem(source_name), format.extension())
}
