use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name used when nothing meaningful is left of a folder or file name
pub const UNSORTED: &str = "unsorted";

fn is_forbidden(c: char) -> bool {
    matches!(
        c,
        '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' | '\n' | '\r' | '\t'
    )
}

/// Escape characters that are invalid in folder or file names on common filesystems.
///
/// Every forbidden character becomes `_` and surrounding whitespace is trimmed.
/// When the input holds nothing but forbidden characters and whitespace the
/// result is [`UNSORTED`].
pub fn escape_folder_name(name: &str) -> String {
    if name.chars().all(|c| is_forbidden(c) || c.is_whitespace()) {
        return UNSORTED.to_string();
    }

    let sanitized: String = name
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();

    match sanitized.trim() {
        "" => UNSORTED.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Expand a leading `~` in a user supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Recursively list every entry below `dir_path`.
///
/// Directories and non-audio files are included on purpose, the placement
/// engine is the one deciding what gets skipped.
pub fn collect_candidates(dir_path: &Path) -> Result<Vec<PathBuf>> {
    if !dir_path.is_dir() {
        return Err(anyhow::anyhow!(
            "Input path '{}' is not a directory",
            dir_path.display()
        ));
    }

    let candidates = WalkDir::new(dir_path)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .collect();

    Ok(candidates)
}
