//! Atlas Tres - split a sprite-sheet atlas into Godot `AtlasTexture` resources
//!
//! This library reads a TexturePacker-style `TextureAtlas` manifest and writes one
//! `.tres` descriptor per `SubTexture`, each cropping the same shared texture.
//!
//! # Example
//!
//! ```rust
//! use atlas_tres::{manifest, render, TextureRef, TresConfig};
//!
//! let sheet = manifest::parse_str(
//!     r#"<TextureAtlas><SubTexture name="grass_01.png" x="0" y="0" width="64" height="64"/></TextureAtlas>"#,
//! ).unwrap();
//!
//! let config = TresConfig::new(TextureRef::new("uid://b2fb7lkugqaas", "res://sheet.png"));
//! let text = render(&sheet.records[0], "a1b2c3d4e5f6", &config);
//! assert!(text.contains("region = Rect2(0, 0, 64, 64)"));
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod identifier;
pub mod manifest;
pub mod output;
pub mod renderer;

pub use batch::{generate, run, BatchError, RunReport, WriteFailure};
pub use config::{ConfigError, JobFile, RunConfiguration};
pub use error::ManifestError;
pub use identifier::{IdentifierGenerator, SequenceGenerator, UuidGenerator};
pub use manifest::{parse, AtlasRecord, Manifest, Region, SkippedRecord};
pub use output::{is_plain_file_name, prepare, FsStore, MemoryStore, OutputError, OutputStore};
pub use renderer::{output_base_name, render, GeneratedDescriptor, TextureRef, TresConfig};
