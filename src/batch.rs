//! Batch orchestration: manifest in, one descriptor file per record out

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::RunConfiguration;
use crate::error::ManifestError;
use crate::identifier::{IdentifierGenerator, UuidGenerator};
use crate::manifest::{self, SkippedRecord};
use crate::output::{self, is_plain_file_name, FsStore, OutputError, OutputStore};
use crate::renderer::GeneratedDescriptor;

/// Fatal errors. The batch stops at the first one.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl BatchError {
    /// Human-readable report, with source context for malformed manifests
    pub fn report(&self) -> String {
        match self {
            BatchError::Manifest(err) => err.report(),
            BatchError::Output(err) => err.to_string(),
        }
    }
}

/// A descriptor that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub file: PathBuf,
    pub reason: String,
}

/// Outcome of a completed batch
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Job label, see [`RunConfiguration::label`]
    pub label: String,
    /// Number of complete records read from the manifest
    pub parsed: usize,
    pub skipped: Vec<SkippedRecord>,
    /// Distinct files written, in manifest order
    pub written: Vec<PathBuf>,
    /// Files written more than once because several names share a base name
    pub replaced: Vec<PathBuf>,
    pub failed: Vec<WriteFailure>,
    /// Stale files deleted before generation
    pub removed: Vec<String>,
}

impl RunReport {
    /// True when nothing was skipped and every write succeeded
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} parsed, {} skipped, {} written, {} failed ({} stale removed)",
            self.label,
            self.parsed,
            self.skipped.len(),
            self.written.len(),
            self.failed.len(),
            self.removed.len()
        )?;
        for skipped in &self.skipped {
            writeln!(f, "  skipped {}", skipped)?;
        }
        for path in &self.replaced {
            writeln!(f, "  replaced {}", path.display())?;
        }
        for failure in &self.failed {
            writeln!(f, "  failed {}: {}", failure.file.display(), failure.reason)?;
        }
        Ok(())
    }
}

/// Regenerate the descriptors for one job
///
/// The manifest is parsed before the output directory is touched, so a missing
/// or malformed manifest leaves existing files alone. Individual write failures
/// are collected in the report and do not stop the batch.
pub fn run<G, S>(
    config: &RunConfiguration,
    ids: &mut G,
    store: &mut S,
) -> Result<RunReport, BatchError>
where
    G: IdentifierGenerator + ?Sized,
    S: OutputStore + ?Sized,
{
    let label = config.label();
    tracing::debug!("[{}] {:?}", label, config);

    let manifest = manifest::parse(&config.manifest)?;
    tracing::info!(
        "[{}] Read {} records from '{}' ({} skipped)",
        label,
        manifest.records.len(),
        config.manifest.display(),
        manifest.skipped.len()
    );

    let removed = output::prepare(store, &config.output_dir, &config.suffix)?;

    let mut report = RunReport {
        label,
        parsed: manifest.records.len(),
        skipped: manifest.skipped,
        removed,
        ..RunReport::default()
    };

    let mut seen = HashSet::new();
    for record in &manifest.records {
        let descriptor = GeneratedDescriptor::new(record, ids.next_id(), &config.tres);
        let path = config.output_path(&descriptor.output_base_name);

        // Anything else would land outside the output directory, where prepare never looks
        if !is_plain_file_name(&descriptor.output_base_name) {
            tracing::error!(
                "Not writing '{}': '{}' is not a plain file name",
                record.name,
                descriptor.output_base_name
            );
            report.failed.push(WriteFailure {
                file: path,
                reason: format!("'{}' is not a plain file name", record.name),
            });
            continue;
        }

        if !seen.insert(path.clone()) {
            tracing::warn!(
                "'{}' maps to '{}' again; the earlier file is replaced",
                record.name,
                path.display()
            );
        }

        match store.write_file(&path, &descriptor.to_tres()) {
            Ok(()) => {
                tracing::info!("Generated: {}", path.display());
                if report.written.contains(&path) {
                    report.replaced.push(path);
                } else {
                    report.written.push(path);
                }
            }
            Err(err) => {
                tracing::error!("Error writing to file {}: {}", path.display(), err);
                report.failed.push(WriteFailure {
                    file: path,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(report)
}

/// Run a job against the real filesystem with random identifiers
pub fn generate(config: &RunConfiguration) -> Result<RunReport, BatchError> {
    run(config, &mut UuidGenerator::new(), &mut FsStore::new())
}
