//! Atlas Tres CLI
//!
//! Usage:
//!   atlas-tres [OPTIONS] [CONFIG]
//!
//! Options:
//!   -j, --job <NAME>           Only run the named job from CONFIG
//!   -m, --manifest <FILE>      Run a single job without a job file
//!   -o, --output-dir <DIR>     Output directory for the single job
//!   --texture-path <PATH>      Shared texture path for the single job
//!   --texture-uid <UID>        Shared texture uid for the single job
//!   --texture-anchor <ID>      Local texture id for the single job
//!   --suffix <EXT>             Generated file extension for the single job
//!   --format <N>               Resource format version for the single job
//!   -v, --verbose              Debug logging
//!   -h, --help                 Print help

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atlas_tres::config::DEFAULT_SUFFIX;
use atlas_tres::renderer::config::{DEFAULT_ANCHOR, DEFAULT_FORMAT};
use atlas_tres::{
    generate, BatchError, ConfigError, JobFile, RunConfiguration, RunReport, TextureRef,
};

/// Job file used when neither CONFIG nor --manifest is given
const DEFAULT_JOB_FILE: &str = "atlas-tres.toml";

#[derive(Parser, Debug)]
#[command(name = "atlas-tres")]
#[command(about = "Generate Godot AtlasTexture resources from a sprite-sheet atlas")]
struct Cli {
    /// Job file with one or more [[atlas]] tables (TOML format)
    #[arg(conflicts_with = "manifest")]
    config: Option<PathBuf>,

    /// Only run the named job (may be repeated)
    #[arg(short = 'j', long = "job", conflicts_with = "manifest")]
    jobs: Vec<String>,

    /// Atlas manifest for a single job given on the command line
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Output directory for the single job
    #[arg(short, long, requires = "manifest")]
    output_dir: Option<PathBuf>,

    /// Shared texture path, e.g. res://assets/sheet.png
    #[arg(long, requires = "manifest")]
    texture_path: Option<String>,

    /// Shared texture uid, e.g. uid://b2fb7lkugqaas
    #[arg(long, requires = "manifest")]
    texture_uid: Option<String>,

    /// Local id linking each resource to the shared texture [default: 1_atlas]
    #[arg(long, requires = "manifest")]
    texture_anchor: Option<String>,

    /// Extension of generated files [default: tres]
    #[arg(long, requires = "manifest")]
    suffix: Option<String>,

    /// Resource format version [default: 3]
    #[arg(long, requires = "manifest")]
    format: Option<u32>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let jobs = match load_jobs(&cli) {
        Ok(jobs) => jobs,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let code = run_all(&jobs, generate);
    if code != 0 {
        std::process::exit(code);
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_jobs(cli: &Cli) -> Result<Vec<RunConfiguration>, ConfigError> {
    if let Some(manifest) = &cli.manifest {
        let job = single_job(cli, manifest)?;
        job.validate()?;
        return Ok(vec![job]);
    }

    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_JOB_FILE));
    tracing::debug!("Loading jobs from '{}'", path.display());
    JobFile::from_file(&path)?.select(&cli.jobs)
}

fn single_job(cli: &Cli, manifest: &Path) -> Result<RunConfiguration, ConfigError> {
    let missing = |flag: &str| ConfigError::Invalid {
        job: manifest.display().to_string(),
        reason: format!("--{} is required with --manifest", flag),
    };

    let output_dir = cli.output_dir.clone().ok_or_else(|| missing("output-dir"))?;
    let texture_path = cli.texture_path.clone().ok_or_else(|| missing("texture-path"))?;
    let texture_uid = cli.texture_uid.clone().ok_or_else(|| missing("texture-uid"))?;

    let anchor = cli.texture_anchor.as_deref().unwrap_or(DEFAULT_ANCHOR);
    let texture = TextureRef::new(texture_uid, texture_path).with_anchor(anchor);
    Ok(RunConfiguration::new(manifest, output_dir, texture)
        .with_suffix(cli.suffix.as_deref().unwrap_or(DEFAULT_SUFFIX))
        .with_format(cli.format.unwrap_or(DEFAULT_FORMAT)))
}

/// Run every job and return the process exit code
///
/// Skipped records and failed writes are reported but still exit 0. Any fatal
/// job error makes the code 1; the remaining jobs run anyway.
fn run_all<F>(jobs: &[RunConfiguration], mut run_job: F) -> i32
where
    F: FnMut(&RunConfiguration) -> Result<RunReport, BatchError>,
{
    let mut code = 0;
    for job in jobs {
        match run_job(job) {
            Ok(report) => print!("{}", report),
            Err(e) => {
                eprintln!("Error in job '{}': {}", job.label(), e.report());
                code = 1;
            }
        }
    }
    code
}
