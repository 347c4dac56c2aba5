use crate::acoustid::AcousticIndex;
use crate::audio::{self, SkipReason};
use crate::error::FingerprintError;
use crate::fingerprint::Fingerprinter;
use crate::metadata::{OrderBy, RecordingMetadata};
use crate::musicbrainz::MetadataCatalog;
use crate::progress::{self, ProgressMessage};
use crate::utils::{escape_folder_name, UNSORTED};
use anyhow::{Context, Result};
use std::ffi::OsStr;
use std::fmt;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_YEAR: &str = "Unknown Year";
pub const UNKNOWN_SONG: &str = "Unknown Song";

/// Settings shared by every file of a run
#[derive(Debug, Clone)]
pub struct PlacementOptions {
    pub output_path: PathBuf,
    pub order_by: OrderBy,
    pub remove_origin: bool,
    pub dry_run: bool,
}

/// Where an identified file goes, relative to the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub folder: String,
    pub file_name: String,
}

/// Why a valid audio file was left where it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Fingerprint(String),
    AcousticLookup(String),
    NoAcousticResults,
    MetadataLookup { recording_id: String, message: String },
    Filesystem(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Fingerprint(e) => write!(f, "fingerprinting failed: {}", e),
            FailureReason::AcousticLookup(e) => write!(f, "AcoustID API Error: {}", e),
            FailureReason::NoAcousticResults => write!(f, "no AcoustID match"),
            FailureReason::MetadataLookup {
                recording_id,
                message,
            } => write!(
                f,
                "MusicBrainz API Error for recording ID {}: {}",
                recording_id, message
            ),
            FailureReason::Filesystem(e) => write!(f, "{}", e),
        }
    }
}

/// Terminal state of one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Skipped(SkipReason),
    Failed(FailureReason),
    Unsorted { destination: PathBuf },
    Placed { destination: PathBuf },
}

/// Result of the two lookups for a fingerprinted file
#[derive(Debug)]
enum Identification {
    Identified(RecordingMetadata),
    Unsorted,
}

fn join_or(names: &[&str], separator: &str, fallback: &str) -> String {
    if names.is_empty() {
        fallback.to_string()
    } else {
        escape_folder_name(&names.join(separator))
    }
}

/// Top level folder for a recording under the given ordering
pub fn folder_name(order_by: OrderBy, recording: &RecordingMetadata) -> String {
    let folder = match order_by {
        OrderBy::Artist => join_or(&recording.artist_names(), "&", UNKNOWN_ARTIST),
        OrderBy::Album => join_or(&recording.release_titles(), "&", UNKNOWN_ALBUM),
        OrderBy::Year => join_or(&recording.release_years(), "&", UNKNOWN_YEAR),
    };

    // "." and ".." would resolve outside the folder level
    if folder == "." || folder == ".." {
        UNSORTED.to_string()
    } else {
        folder
    }
}

/// `<artists> - <title><.ext>`, sanitized as a whole
pub fn file_name(recording: &RecordingMetadata, source: &Path) -> String {
    let artists = recording.artist_names();
    let artists = if artists.is_empty() {
        UNKNOWN_ARTIST.to_string()
    } else {
        artists.join(", ")
    };
    let title = recording.title().unwrap_or(UNKNOWN_SONG);
    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    escape_folder_name(&format!("{} - {}{}", artists, title, extension))
}

pub fn placement_for(order_by: OrderBy, recording: &RecordingMetadata, source: &Path) -> Placement {
    Placement {
        folder: folder_name(order_by, recording),
        file_name: file_name(recording, source),
    }
}

/// Copy a file and carry its access and modification times and permissions over
///
/// Times are set on the still writable copy before the permissions, so a
/// read-only source still yields a copy with the original times.
pub fn copy_preserving_times(source: &Path, destination: &Path) -> Result<()> {
    let failed_copy = || {
        format!(
            "Failed to copy '{}' to '{}'",
            source.display(),
            destination.display()
        )
    };

    let mut reader = File::open(source).with_context(failed_copy)?;
    let metadata = reader
        .metadata()
        .with_context(|| format!("Failed to read metadata of '{}'", source.display()))?;
    let mut writer = File::create(destination).with_context(failed_copy)?;
    io::copy(&mut reader, &mut writer).with_context(failed_copy)?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Err(e) = writer.set_times(times) {
        warn!(
            "Failed to preserve timestamps on '{}': {}",
            destination.display(),
            e
        );
    }

    writer
        .set_permissions(metadata.permissions())
        .with_context(|| format!("Failed to set permissions on '{}'", destination.display()))?;

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Identifies one file at a time and copies it into the output tree
pub struct Organizer<F, A, M> {
    fingerprinter: F,
    index: A,
    catalog: M,
    options: PlacementOptions,
}

impl<F, A, M> Organizer<F, A, M>
where
    F: Fingerprinter,
    A: AcousticIndex,
    M: MetadataCatalog,
{
    pub fn new(fingerprinter: F, index: A, catalog: M, options: PlacementOptions) -> Self {
        Self {
            fingerprinter,
            index,
            catalog,
            options,
        }
    }

    /// Run one candidate through validation, identification and placement.
    ///
    /// Never panics on collaborator errors; every failure ends up in the outcome.
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        if let Err(reason) = audio::validate_candidate(path) {
            match reason {
                // directories come through the walk too
                SkipReason::NotAFile => debug!("Skipping {}: {}", path.display(), reason),
                _ => progress::report(ProgressMessage::FileSkipped {
                    source: path.to_path_buf(),
                    reason,
                }),
            }
            return FileOutcome::Skipped(reason);
        }

        let identification = match self.identify(path) {
            Ok(identification) => identification,
            Err(reason) => {
                warn!("Error processing file {}: {}", path.display(), reason);
                return FileOutcome::Failed(reason);
            }
        };

        let placed = match identification {
            Identification::Identified(recording) => {
                let placement = placement_for(self.options.order_by, &recording, path);
                self.copy_into(path, &placement.folder, OsStr::new(&placement.file_name))
                    .map(|destination| {
                        progress::report(ProgressMessage::FilePlaced {
                            source: path.to_path_buf(),
                            destination: destination.clone(),
                            dry_run: self.options.dry_run,
                        });
                        FileOutcome::Placed { destination }
                    })
            }
            Identification::Unsorted => path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("File '{}' has no filename", path.display()))
                .and_then(|name| self.copy_into(path, UNSORTED, name))
                .map(|destination| {
                    progress::report(ProgressMessage::FileUnsorted {
                        source: path.to_path_buf(),
                        destination: destination.clone(),
                        dry_run: self.options.dry_run,
                    });
                    FileOutcome::Unsorted { destination }
                }),
        };

        match placed {
            Ok(outcome) => {
                if let FileOutcome::Placed { destination } | FileOutcome::Unsorted { destination } =
                    &outcome
                {
                    self.remove_origin(path, destination);
                }
                outcome
            }
            Err(e) => {
                error!("Error processing file {}: {:#}", path.display(), e);
                FileOutcome::Failed(FailureReason::Filesystem(format!("{:#}", e)))
            }
        }
    }

    fn identify(&self, path: &Path) -> Result<Identification, FailureReason> {
        let fingerprint = self.fingerprinter.fingerprint(path).map_err(|e| {
            if let FingerprintError::NotInstalled { .. } = e {
                error!("Error: {}", e);
            }
            FailureReason::Fingerprint(e.to_string())
        })?;

        let acoustic_match = self
            .index
            .lookup(&fingerprint)
            .map_err(|e| FailureReason::AcousticLookup(e.to_string()))?;

        if let Some(recording_id) = acoustic_match.first_recording_id() {
            return self
                .catalog
                .recording(recording_id)
                .map(Identification::Identified)
                .map_err(|e| FailureReason::MetadataLookup {
                    recording_id: recording_id.to_string(),
                    message: e.to_string(),
                });
        }

        if acoustic_match.is_empty() {
            Err(FailureReason::NoAcousticResults)
        } else {
            Ok(Identification::Unsorted)
        }
    }

    fn copy_into(&self, source: &Path, folder: &str, file_name: &OsStr) -> Result<PathBuf> {
        let folder_path = self.options.output_path.join(folder);
        let destination = folder_path.join(file_name);

        if self.options.dry_run {
            return Ok(destination);
        }

        fs::create_dir_all(&folder_path).with_context(|| {
            format!("Failed to create directory '{}'", folder_path.display())
        })?;

        // Skip if source and destination are the same
        if same_file(source, &destination) {
            return Ok(destination);
        }

        copy_preserving_times(source, &destination)?;
        Ok(destination)
    }

    fn remove_origin(&self, source: &Path, destination: &Path) {
        if !self.options.remove_origin || self.options.dry_run || same_file(source, destination) {
            return;
        }

        match fs::remove_file(source) {
            Ok(()) => progress::report(ProgressMessage::OriginRemoved {
                source: source.to_path_buf(),
            }),
            Err(e) => error!("Error deleting original file {}: {}", source.display(), e),
        }
    }
}
