//! Reading sprite-sheet atlas manifests
//!
//! The manifest is a TexturePacker-style `TextureAtlas` document: a root element
//! with one `SubTexture` child per packed sprite.

mod parser;
pub mod record;

pub use parser::{parse, parse_str, REQUIRED_ATTRIBUTES, SUB_TEXTURE};
pub use record::{AtlasRecord, Manifest, Region, SkippedRecord};
