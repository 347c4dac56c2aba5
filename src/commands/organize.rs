use anyhow::{Context, Result};
use mfsort::acoustid::{AcousticIndex, AcoustIdClient};
use mfsort::batch::{self, BatchScheduler};
use mfsort::config::OrganizeConfig;
use mfsort::fingerprint::{Fingerprinter, Fpcalc};
use mfsort::musicbrainz::{MetadataCatalog, MusicBrainzClient};
use mfsort::placement::{FileOutcome, Organizer};
use mfsort::progress::{self, ProgressMessage};
use mfsort::utils;
use std::fs;
use std::path::PathBuf;
use tokio::runtime::Handle;
use tracing::info;

/// Per-run totals, tallied once every batch has finished
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrganizeSummary {
    pub batches: usize,
    pub placed: usize,
    pub unsorted: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl OrganizeSummary {
    pub fn tally(outcomes: &[FileOutcome], batches: usize) -> Self {
        outcomes
            .iter()
            .fold(Self { batches, ..Self::default() }, |mut summary, outcome| {
                match outcome {
                    FileOutcome::Placed { .. } => summary.placed += 1,
                    FileOutcome::Unsorted { .. } => summary.unsorted += 1,
                    FileOutcome::Failed(_) => summary.failed += 1,
                    FileOutcome::Skipped(_) => summary.skipped += 1,
                }
                summary
            })
    }
}

/// Run every candidate through the organizer, batch by batch
pub fn organize_files<F, A, M>(
    organizer: &Organizer<F, A, M>,
    scheduler: &BatchScheduler,
    files: &[PathBuf],
) -> OrganizeSummary
where
    F: Fingerprinter,
    A: AcousticIndex,
    M: MetadataCatalog,
{
    let outcomes = scheduler.run(files, |path| organizer.process_file(path));
    let summary = OrganizeSummary::tally(
        &outcomes,
        batch::batch_count(files.len(), scheduler.batch_size()),
    );

    progress::report(ProgressMessage::RunComplete {
        batches: summary.batches,
        placed: summary.placed,
        unsorted: summary.unsorted,
        failed: summary.failed,
        skipped: summary.skipped,
    });

    summary
}

/// Identify every audio file under the input path and copy it into the output tree
pub fn organize_music_library(config: &OrganizeConfig, handle: Handle) -> Result<OrganizeSummary> {
    config.validate()?;

    let candidates = utils::collect_candidates(&config.input_path)?;
    progress::report(ProgressMessage::ScanComplete {
        input_path: config.input_path.clone(),
        candidates: candidates.len(),
    });

    if config.dry_run {
        info!("🎭 Dry run: nothing will be copied or deleted");
    } else {
        fs::create_dir_all(&config.output_path).with_context(|| {
            format!(
                "Failed to create output directory '{}'",
                config.output_path.display()
            )
        })?;
    }

    let index = AcoustIdClient::new(config.api_key.clone(), handle.clone())
        .context("Failed to create AcoustID client")?;
    let catalog = MusicBrainzClient::new(&config.contact_email, handle)
        .context("Failed to create MusicBrainz client")?;
    let organizer = Organizer::new(
        Fpcalc::new(&config.fpcalc),
        index,
        catalog,
        config.placement_options(),
    );

    let scheduler = BatchScheduler::new(config.batch_size, config.jobs)?;
    info!(
        "Organizing by {} with {} workers, {} files per batch",
        config.order_by,
        scheduler.workers(),
        scheduler.batch_size()
    );

    Ok(organize_files(&organizer, &scheduler, &candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mfsort::acoustid::AcousticMatch;
    use mfsort::audio::SkipReason;
    use mfsort::error::{FingerprintError, LookupError};
    use mfsort::fingerprint::Fingerprint;
    use mfsort::metadata::{Artist, ArtistCredit, OrderBy, RecordingMetadata, ReleaseEntry};
    use mfsort::placement::{FailureReason, PlacementOptions};
    use std::path::Path;
    use tempfile::TempDir;

    /// Fingerprints are the file contents, so tests pick the match per file
    struct ContentFingerprinter;

    impl Fingerprinter for ContentFingerprinter {
        fn fingerprint(&self, path: &Path) -> Result<Fingerprint, FingerprintError> {
            let fingerprint = fs::read_to_string(path).map_err(|source| FingerprintError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Fingerprint {
                fingerprint: fingerprint.trim().to_string(),
                duration: 200,
            })
        }
    }

    /// `known` matches R1, `ambiguous` has results without recordings, anything else fails
    struct KeyedIndex;

    impl AcousticIndex for KeyedIndex {
        fn lookup(&self, fingerprint: &Fingerprint) -> Result<AcousticMatch, LookupError> {
            match fingerprint.fingerprint.as_str() {
                "known" => Ok(AcousticMatch {
                    results: vec![vec!["R1".to_string()]],
                }),
                "ambiguous" => Ok(AcousticMatch {
                    results: vec![vec![]],
                }),
                _ => Err(LookupError::Api {
                    status: 500,
                    body: "boom".to_string(),
                }),
            }
        }
    }

    struct FixedCatalog;

    impl MetadataCatalog for FixedCatalog {
        fn recording(&self, recording_id: &str) -> Result<RecordingMetadata, LookupError> {
            Ok(RecordingMetadata {
                id: recording_id.to_string(),
                title: Some("Song".to_string()),
                artist_credit: vec![ArtistCredit {
                    name: Some("Alice".to_string()),
                    joinphrase: None,
                    artist: Some(Artist {
                        id: None,
                        name: Some("Alice".to_string()),
                    }),
                }],
                releases: vec![ReleaseEntry {
                    id: None,
                    title: Some("Album".to_string()),
                    date: Some("2020-05-01".to_string()),
                }],
                tags: Vec::new(),
            })
        }
    }

    #[test]
    fn test_summary_tally() {
        let outcomes = vec![
            FileOutcome::Placed {
                destination: PathBuf::from("/out/A/a.mp3"),
            },
            FileOutcome::Placed {
                destination: PathBuf::from("/out/A/b.mp3"),
            },
            FileOutcome::Unsorted {
                destination: PathBuf::from("/out/unsorted/c.mp3"),
            },
            FileOutcome::Failed(FailureReason::NoAcousticResults),
            FileOutcome::Skipped(SkipReason::Unsupported),
            FileOutcome::Skipped(SkipReason::NotAFile),
        ];
        assert_eq!(
            OrganizeSummary::tally(&outcomes, 2),
            OrganizeSummary {
                batches: 2,
                placed: 2,
                unsorted: 1,
                failed: 1,
                skipped: 2,
            }
        );
    }

    #[test]
    fn test_organize_mixed_tree() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let input = temp_dir.path().join("in");
        let output = temp_dir.path().join("out");
        fs::create_dir_all(input.join("nested"))?;
        fs::write(input.join("one.mp3"), "known")?;
        fs::write(input.join("nested").join("two.ogg"), "ambiguous")?;
        fs::write(input.join("three.flac"), "unknown")?;
        fs::write(input.join("readme.txt"), "known")?;

        let organizer = Organizer::new(
            ContentFingerprinter,
            KeyedIndex,
            FixedCatalog,
            PlacementOptions {
                output_path: output.clone(),
                order_by: OrderBy::Artist,
                remove_origin: false,
                dry_run: false,
            },
        );
        let scheduler = BatchScheduler::new(2, Some(2))?;
        let candidates = utils::collect_candidates(&input)?;

        let summary = organize_files(&organizer, &scheduler, &candidates);

        assert_eq!(
            summary,
            OrganizeSummary {
                batches: 3,
                placed: 1,
                unsorted: 1,
                failed: 1,
                // readme.txt and the nested directory
                skipped: 2,
            }
        );
        assert!(output.join("Alice").join("Alice - Song.mp3").is_file());
        assert!(output.join("unsorted").join("two.ogg").is_file());
        assert!(input.join("three.flac").exists());

        Ok(())
    }

    #[test]
    fn test_invalid_config_prevents_run() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("out");
        let config = OrganizeConfig::new(temp_dir.path(), &output, "", "me@example.org");

        let rt = tokio::runtime::Runtime::new()?;
        assert!(organize_music_library(&config, rt.handle().clone()).is_err());
        assert!(!output.exists());

        Ok(())
    }
}
