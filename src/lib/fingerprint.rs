use crate::error::FingerprintError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Default Chromaprint command line tool
pub const DEFAULT_FPCALC: &str = "fpcalc";

/// Acoustic fingerprint of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub fingerprint: String,
    /// Track length in whole seconds
    pub duration: u32,
}

/// Produces a fingerprint for a single audio file
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, FingerprintError>;
}

/// Runs `fpcalc` once per file
#[derive(Debug, Clone)]
pub struct Fpcalc {
    program: PathBuf,
}

impl Fpcalc {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

impl Fingerprinter for Fpcalc {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
        debug!("Running {} on {}", self.program.display(), path.display());

        // The exit status is ignored, fpcalc still prints usable output for some damaged files
        let output = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    FingerprintError::NotInstalled {
                        program: self.program_name(),
                    }
                }
                _ => FingerprintError::Io {
                    path: path.to_path_buf(),
                    source: e,
                },
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_fpcalc_output(&stdout).ok_or_else(|| FingerprintError::Unparseable {
            program: self.program_name(),
            path: path.to_path_buf(),
        })
    }
}

/// Parse the line oriented `KEY=value` output of fpcalc.
///
/// Both `FINGERPRINT=` and a positive integer `DURATION=` must be present.
pub fn parse_fpcalc_output(output: &str) -> Option<Fingerprint> {
    let mut fingerprint = None;
    let mut duration = None;

    for line in output.lines() {
        let line = line.trim_end();
        if let Some(value) = line.strip_prefix("FINGERPRINT=") {
            fingerprint = Some(value.to_string());
        } else if let Some(value) = line.strip_prefix("DURATION=") {
            duration = value.trim().parse::<u32>().ok();
        }
    }

    match (fingerprint, duration) {
        (Some(fingerprint), Some(duration)) if !fingerprint.is_empty() && duration > 0 => {
            Some(Fingerprint {
                fingerprint,
                duration,
            })
        }
        _ => None,
    }
}
