//! `.tres` text generation for atlas sub-regions

use crate::manifest::{AtlasRecord, Region};

use super::{TextureRef, TresConfig};

/// Resource class of every generated descriptor
pub const RESOURCE_TYPE: &str = "AtlasTexture";

/// Resource class of the shared texture
pub const TEXTURE_TYPE: &str = "Texture2D";

/// Number of `[ext_resource]` sections per descriptor
const EXT_RESOURCES: u32 = 1;

/// The logical content of one generated `.tres` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDescriptor<'a> {
    /// Identifier of this resource, without the `uid://` scheme
    pub resource_id: String,
    pub texture: &'a TextureRef,
    pub format: u32,
    pub region: Region,
    /// File name without suffix, derived from the record name
    pub output_base_name: String,
}

impl<'a> GeneratedDescriptor<'a> {
    /// Build the descriptor for `record`
    pub fn new(record: &AtlasRecord, resource_id: impl Into<String>, config: &'a TresConfig) -> Self {
        Self {
            resource_id: resource_id.into(),
            texture: &config.texture,
            format: config.format,
            region: record.region.clone(),
            output_base_name: output_base_name(&record.name).to_string(),
        }
    }

    /// Serialize to `.tres` text
    pub fn to_tres(&self) -> String {
        let header = format!(
            r#"[gd_resource type="{}" load_steps={} format={} uid="uid://{}"]"#,
            RESOURCE_TYPE,
            EXT_RESOURCES + 1,
            self.format,
            self.resource_id
        );
        let ext_resource = format!(
            r#"[ext_resource type="{}" uid="{}" path="{}" id="{}"]"#,
            TEXTURE_TYPE, self.texture.uid, self.texture.path, self.texture.anchor
        );

        format!(
            "{}\n\n{}\n\n[resource]\natlas = ExtResource(\"{}\")\nregion = Rect2({})\n",
            header, ext_resource, self.texture.anchor, self.region
        )
    }
}

/// Render the full `.tres` text for one record
pub fn render(record: &AtlasRecord, resource_id: &str, config: &TresConfig) -> String {
    GeneratedDescriptor::new(record, resource_id, config).to_tres()
}

/// Strip the trailing extension from a sprite name
///
/// Everything after the last `.` is dropped, unless that dot is the first
/// character (`.hidden` keeps its name).
pub fn output_base_name(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}
