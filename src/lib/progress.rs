use crate::audio::SkipReason;
use std::path::PathBuf;
use tracing::info;

/// Progress reporting utilities for consistent run output
/// Every line the organizer prints about its progress is built here
/// Progress message types for consistent formatting
#[derive(Debug, Clone)]
pub enum ProgressMessage {
    /// Input enumeration completion
    ScanComplete {
        input_path: PathBuf,
        candidates: usize,
    },
    /// Batch submission
    BatchStarted {
        index: usize,
        total: usize,
        size: usize,
    },
    /// Candidate left out before fingerprinting
    FileSkipped {
        source: PathBuf,
        reason: SkipReason,
    },
    /// File copied into its identified folder
    FilePlaced {
        source: PathBuf,
        destination: PathBuf,
        dry_run: bool,
    },
    /// File copied into the unsorted folder
    FileUnsorted {
        source: PathBuf,
        destination: PathBuf,
        dry_run: bool,
    },
    /// Source removed after a successful copy
    OriginRemoved {
        source: PathBuf,
    },
    /// Final completion message
    RunComplete {
        batches: usize,
        placed: usize,
        unsorted: usize,
        failed: usize,
        skipped: usize,
    },
}

impl ProgressMessage {
    /// Format the message for display
    pub fn format(&self) -> String {
        match self {
            ProgressMessage::ScanComplete {
                input_path,
                candidates,
            } => {
                format!(
                    "🔍 Found {} entries in {}",
                    candidates,
                    input_path.display()
                )
            }
            ProgressMessage::BatchStarted { index, total, size } => {
                format!(
                    "Processing batch {} of {} with {} files.",
                    index, total, size
                )
            }
            ProgressMessage::FileSkipped { source, reason } => match reason {
                SkipReason::Unsupported => {
                    format!("Unsupported file format: {}", source.display())
                }
                SkipReason::Missing | SkipReason::NotAFile => {
                    format!("Skipping invalid file: {}", source.display())
                }
            },
            ProgressMessage::FilePlaced {
                source,
                destination,
                dry_run,
            } => {
                if *dry_run {
                    format!(
                        "Would copy {} to {}",
                        source.display(),
                        destination.display()
                    )
                } else {
                    format!("Copied {} to {}", source.display(), destination.display())
                }
            }
            ProgressMessage::FileUnsorted {
                source,
                destination,
                dry_run,
            } => {
                if *dry_run {
                    format!(
                        "No metadata found. Would copy {} to {}",
                        source.display(),
                        destination.display()
                    )
                } else {
                    format!(
                        "No metadata found. Copied {} to {}",
                        source.display(),
                        destination.display()
                    )
                }
            }
            ProgressMessage::OriginRemoved { source } => {
                format!("Deleted original file: {}", source.display())
            }
            ProgressMessage::RunComplete {
                batches,
                placed,
                unsorted,
                failed,
                skipped,
            } => {
                format!(
                    "🎉 Done after {} batches: {} placed, {} unsorted, {} failed, {} skipped",
                    batches, placed, unsorted, failed, skipped
                )
            }
        }
    }
}

/// Emit a progress line
pub fn report(message: ProgressMessage) {
    info!("{}", message.format());
}
