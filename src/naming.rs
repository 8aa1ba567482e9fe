//! Output filename derivation: fixed template prefix plus a sanitized stem
//! taken from the uploaded photo's original filename.

use std::path::Path;

/// Stem used when the photo filename yields nothing usable.
const FALLBACK_STEM: &str = "photo";

/// Build the default output filename: `<prefix>-<stem>.png`.
pub fn output_file_name(prefix: &str, photo_path: &Path) -> String {
    let stem = photo_path
        .file_stem()
        .map(|s| sanitize_stem(&s.to_string_lossy()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string());
    format!("{prefix}-{stem}.png")
}

/// Keep filesystem-safe characters, map everything else to `-`.
pub fn sanitize_stem(stem: &str) -> String {
    let out: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    out.trim_matches('-').to_string()
}
