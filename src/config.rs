//! Batch configuration
//!
//! A [`RunConfiguration`] describes one manifest-to-descriptors job. Several jobs
//! can be kept in a TOML job file, one `[[atlas]]` table each.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::renderer::config::{DEFAULT_ANCHOR, DEFAULT_FORMAT};
use crate::renderer::{TextureRef, TresConfig};

/// Suffix of generated descriptor files
pub const DEFAULT_SUFFIX: &str = "tres";

/// Errors that can occur when loading or validating job configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read job file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse job file TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid job '{job}': {reason}")]
    Invalid { job: String, reason: String },
    #[error("No job named '{name}'")]
    UnknownJob { name: String },
}

/// Everything one batch run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    /// Optional job name, used in logs and for job selection
    pub name: Option<String>,
    /// Atlas manifest to read
    pub manifest: PathBuf,
    /// Directory receiving the generated files
    pub output_dir: PathBuf,
    /// Shared texture and resource format
    pub tres: TresConfig,
    /// Extension of generated files, without the dot
    pub suffix: String,
}

impl RunConfiguration {
    pub fn new(
        manifest: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        texture: TextureRef,
    ) -> Self {
        Self {
            name: None,
            manifest: manifest.into(),
            output_dir: output_dir.into(),
            tres: TresConfig::new(texture),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }

    /// Set the job name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the generated file suffix
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Set the resource format version
    pub fn with_format(mut self, format: u32) -> Self {
        self.tres.format = format;
        self
    }

    /// Name for logs: the job name, or the manifest path
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.manifest.display().to_string(),
        }
    }

    /// Path of the generated file with the given base name
    pub fn output_path(&self, base_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", base_name, self.suffix))
    }

    /// Check for values that would produce unusable output
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            job: self.label(),
            reason: reason.to_string(),
        };

        let texture = &self.tres.texture;
        if texture.path.is_empty() {
            return Err(invalid("texture_path must not be empty"));
        }
        if texture.uid.is_empty() {
            return Err(invalid("texture_uid must not be empty"));
        }
        if texture.anchor.is_empty() {
            return Err(invalid("texture_anchor must not be empty"));
        }
        if self.suffix.is_empty() {
            return Err(invalid("suffix must not be empty"));
        }
        if self.suffix.starts_with('.') {
            return Err(invalid("suffix is given without the leading dot"));
        }
        if self.suffix.contains(['/', '\\']) {
            return Err(invalid("suffix must not contain path separators"));
        }
        Ok(())
    }

    /// Make relative manifest and output paths relative to `base` instead of the working directory
    fn resolve_relative_to(mut self, base: &Path) -> Self {
        if self.manifest.is_relative() {
            self.manifest = base.join(&self.manifest);
        }
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
        self
    }
}

/// A set of jobs loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFile {
    pub jobs: Vec<RunConfiguration>,
}

/// TOML structure for deserializing job files
#[derive(Deserialize)]
struct TomlJobFile {
    #[serde(default)]
    atlas: Vec<TomlJob>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlJob {
    name: Option<String>,
    manifest: PathBuf,
    output_dir: PathBuf,
    texture_path: String,
    texture_uid: String,
    texture_anchor: Option<String>,
    suffix: Option<String>,
    format: Option<u32>,
}

impl From<TomlJob> for RunConfiguration {
    fn from(job: TomlJob) -> Self {
        let texture = TextureRef::new(job.texture_uid, job.texture_path)
            .with_anchor(job.texture_anchor.unwrap_or_else(|| DEFAULT_ANCHOR.to_string()));

        RunConfiguration {
            name: job.name,
            manifest: job.manifest,
            output_dir: job.output_dir,
            tres: TresConfig::new(texture).with_format(job.format.unwrap_or(DEFAULT_FORMAT)),
            suffix: job.suffix.unwrap_or_else(|| DEFAULT_SUFFIX.to_string()),
        }
    }
}

impl JobFile {
    /// Load jobs from a TOML file
    ///
    /// Relative paths inside the file are taken relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut file = Self::from_str(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        file.jobs = file
            .jobs
            .into_iter()
            .map(|job| job.resolve_relative_to(base))
            .collect();
        Ok(file)
    }

    /// Load jobs from a TOML string, leaving paths as written
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlJobFile = toml::from_str(content)?;
        let file = JobFile {
            jobs: parsed.atlas.into_iter().map(RunConfiguration::from).collect(),
        };
        file.validate()?;
        Ok(file)
    }

    /// Validate every job
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.is_empty() {
            return Err(ConfigError::Invalid {
                job: "<none>".to_string(),
                reason: "no [[atlas]] jobs defined".to_string(),
            });
        }
        self.jobs.iter().try_for_each(RunConfiguration::validate)
    }

    /// Jobs with the given names, in file order. All jobs if `names` is empty.
    pub fn select(&self, names: &[String]) -> Result<Vec<RunConfiguration>, ConfigError> {
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.jobs.iter().any(|job| job.name.as_ref() == Some(*name)))
        {
            return Err(ConfigError::UnknownJob {
                name: unknown.clone(),
            });
        }

        Ok(self
            .jobs
            .iter()
            .filter(|job| {
                names.is_empty() || job.name.as_ref().map_or(false, |name| names.contains(name))
            })
            .cloned()
            .collect())
    }
}
