//! Filename helpers for generated artifacts.

use std::path::Path;

/// Characters that are invalid in Windows filenames.
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Sanitize a string for use as a filename.
///
/// Control and reserved characters become `_` (runs collapsed), leading and
/// trailing dots/spaces are trimmed, and an empty result becomes `"unnamed"`.
pub fn sanitize_filename(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut last_was_replacement = false;

    for c in input.chars() {
        if c.is_control() || INVALID_CHARS.contains(&c) {
            if !last_was_replacement {
                result.push('_');
                last_was_replacement = true;
            }
        } else {
            result.push(c);
            last_was_replacement = false;
        }
    }

    let trimmed = result.trim_matches(|c| c == ' ' || c == '.');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Name of a still taken from `output` at `secs` seconds.
pub fn still_filename(output: &str, secs: f64) -> String {
    format!("{} @ {:.0}s.png", sanitize_filename(output), secs)
}

/// File stem of a path as an owned string.
pub fn stem(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
