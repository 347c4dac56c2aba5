use std::path::PathBuf;
use thiserror::Error;

/// Fingerprinting failures, all of them scoped to a single file
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("{program} not found. Please install Chromaprint")]
    NotInstalled { program: String },

    #[error("No fingerprint or duration in {program} output for {path}")]
    Unparseable { program: String, path: PathBuf },

    #[error("Error while generating fingerprint for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the AcoustID and MusicBrainz requests
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Service reported status '{0}'")]
    Status(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LookupError::Parse(e.to_string())
        } else {
            LookupError::Network(e.to_string())
        }
    }
}
