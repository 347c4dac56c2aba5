use crate::batch::DEFAULT_BATCH_SIZE;
use crate::fingerprint::DEFAULT_FPCALC;
use crate::metadata::OrderBy;
use crate::placement::PlacementOptions;
use anyhow::{ensure, Result};
use std::path::PathBuf;

/// Everything one organize run needs, fixed before the first file is touched
#[derive(Debug, Clone)]
pub struct OrganizeConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// AcoustID application key
    pub api_key: String,
    /// Sent to MusicBrainz in the user agent
    pub contact_email: String,
    pub order_by: OrderBy,
    pub remove_origin: bool,
    pub batch_size: usize,
    /// Worker threads, `None` means one per available core
    pub jobs: Option<usize>,
    pub fpcalc: PathBuf,
    pub dry_run: bool,
}

impl OrganizeConfig {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        api_key: impl Into<String>,
        contact_email: impl Into<String>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            api_key: api_key.into(),
            contact_email: contact_email.into(),
            order_by: OrderBy::default(),
            remove_origin: false,
            batch_size: DEFAULT_BATCH_SIZE,
            jobs: None,
            fpcalc: PathBuf::from(DEFAULT_FPCALC),
            dry_run: false,
        }
    }

    /// Reject configurations that must not start a run
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.api_key.trim().is_empty(),
            "An AcoustID API key is required"
        );
        ensure!(
            !self.contact_email.trim().is_empty(),
            "A contact email for MusicBrainz is required"
        );
        ensure!(
            self.batch_size > 0,
            "Batch size must be a positive integer"
        );
        ensure!(
            self.jobs != Some(0),
            "Worker count must be a positive integer"
        );
        ensure!(
            self.input_path.exists(),
            "Input path '{}' does not exist",
            self.input_path.display()
        );
        ensure!(
            self.input_path.is_dir(),
            "Input path '{}' is not a directory",
            self.input_path.display()
        );
        ensure!(
            !self.output_path.as_os_str().is_empty(),
            "An output path is required"
        );
        Ok(())
    }

    pub fn placement_options(&self) -> PlacementOptions {
        PlacementOptions {
            output_path: self.output_path.clone(),
            order_by: self.order_by,
            remove_origin: self.remove_origin,
            dry_run: self.dry_run,
        }
    }
}
