use std::path::Path;

/// Title inferred from an export filename such as `2025-05-14_Morning_Walk.html`.
///
/// The part before the first `_` must look like a date (contain a `-`);
/// the rest becomes the title with `_` read as spaces.
pub fn title_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let (prefix, rest) = stem.split_once('_')?;
    if !prefix.contains('-') {
        return None;
    }
    clean_title(&rest.replace('_', " "))
}

/// Collapses runs of whitespace; `None` when nothing is left.
pub fn clean_title(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
