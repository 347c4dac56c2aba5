use std::path::Path;

/// Audio file format constants used by the candidate check
/// Only formats fpcalc can decode reliably are listed here
/// MPEG layer 3
pub const MP3_EXTENSIONS: &[&str] = &["mp3"];

/// Lossless formats (FLAC, WAV)
pub const LOSSLESS_EXTENSIONS: &[&str] = &["flac", "wav"];

/// Vorbis-in-Ogg
pub const OGG_EXTENSIONS: &[&str] = &["ogg"];

/// Why a candidate never entered the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Missing,
    NotAFile,
    Unsupported,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Missing => write!(f, "does not exist"),
            SkipReason::NotAFile => write!(f, "not a regular file"),
            SkipReason::Unsupported => write!(f, "unsupported file format"),
        }
    }
}

/// Get all supported audio file extensions as a combined vector
pub fn get_all_audio_extensions() -> Vec<&'static str> {
    MP3_EXTENSIONS
        .iter()
        .chain(LOSSLESS_EXTENSIONS.iter())
        .chain(OGG_EXTENSIONS.iter())
        .copied()
        .collect()
}

/// Check if a file path has a supported audio extension
pub fn is_audio_file<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    get_all_audio_extensions()
        .iter()
        .any(|&supported_ext| supported_ext == ext)
}

/// Decide whether a path may enter the pipeline.
///
/// The path must exist, be a regular file and carry a supported extension.
pub fn validate_candidate(path: &Path) -> Result<(), SkipReason> {
    if !path.exists() {
        return Err(SkipReason::Missing);
    }
    if !path.is_file() {
        return Err(SkipReason::NotAFile);
    }
    if !is_audio_file(path) {
        return Err(SkipReason::Unsupported);
    }
    Ok(())
}
