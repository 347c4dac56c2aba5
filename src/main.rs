use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use mfsort::batch::DEFAULT_BATCH_SIZE;
use mfsort::config::OrganizeConfig;
use mfsort::fingerprint::DEFAULT_FPCALC;
use mfsort::metadata::OrderBy;
use mfsort::utils;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

/// Organize music files by metadata.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the folder containing music files
    #[arg(long, alias = "input_path", env = "MFSORT_INPUT_PATH")]
    input_path: String,
    /// Path to output folder where organized files will be stored
    #[arg(long, alias = "output_path", env = "MFSORT_OUTPUT_PATH")]
    output_path: String,
    /// Your AcoustID API key
    #[arg(long, alias = "api_key", env = "ACOUSTID_API_KEY", hide_env_values = true)]
    api_key: String,
    /// Contact email to use for the MusicBrainz API
    #[arg(long, alias = "contact_email", env = "MUSICBRAINZ_CONTACT_EMAIL")]
    contact_email: String,
    /// Criteria for organizing files
    #[arg(long, alias = "order_by", value_enum, default_value_t = OrderBy::Artist)]
    order_by: OrderBy,
    /// Delete the original files after copying
    #[arg(long, alias = "remove_origin")]
    remove_origin: bool,
    /// Number of files to process in each batch
    #[arg(long, alias = "batch_size", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
    /// Worker threads (defaults to the number of available cores)
    #[arg(long)]
    jobs: Option<usize>,
    /// Chromaprint fpcalc executable
    #[arg(long, env = "FPCALC", default_value = DEFAULT_FPCALC)]
    fpcalc: PathBuf,
    /// Show what would be done without making changes
    #[arg(long)]
    dry_run: bool,
    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> OrganizeConfig {
        let mut config = OrganizeConfig::new(
            utils::expand_path(&self.input_path),
            utils::expand_path(&self.output_path),
            self.api_key,
            self.contact_email,
        );
        config.order_by = self.order_by;
        config.remove_origin = self.remove_origin;
        config.batch_size = self.batch_size;
        config.jobs = self.jobs;
        config.fpcalc = self.fpcalc;
        config.dry_run = self.dry_run;
        config
    }
}

/// Console logging, plus an optional non-blocking file copy of the same events
fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console = fmt::layer().with_target(false);

    let Some(log_file) = log_file else {
        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .try_init()
            .context("Failed to initialize logging")?;
        return Ok(None);
    };

    let directory = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_file
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Log file '{}' has no filename", log_file.display()))?;
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(directory, file_name));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(Some(guard))
}

fn main() -> Result<()> {
    // Load environment variables from a .env file if present
    dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.log_file.as_deref())?;

    let config = cli.into_config();
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    commands::organize::organize_music_library(&config, rt.handle().clone())?;

    Ok(())
}
