//! Configuration for `.tres` descriptor output

/// Resource format version written in the `[gd_resource]` header
pub const DEFAULT_FORMAT: u32 = 3;

/// Local `ext_resource` id used when none is configured
pub const DEFAULT_ANCHOR: &str = "1_atlas";

/// The shared source image every descriptor in a batch points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureRef {
    /// Godot uid of the texture, e.g. `uid://b2fb7lkugqaas`
    pub uid: String,

    /// Resource path of the texture, e.g. `res://assets/sheet.png`
    pub path: String,

    /// Local id tying `atlas = ExtResource(..)` to the `[ext_resource]` line
    pub anchor: String,
}

impl TextureRef {
    /// Create a texture reference with the default anchor
    pub fn new(uid: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            path: path.into(),
            anchor: DEFAULT_ANCHOR.to_string(),
        }
    }

    /// Set the local anchor id
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }
}

/// Configuration options for descriptor rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TresConfig {
    /// Texture shared by the whole batch
    pub texture: TextureRef,

    /// Value of `format=` in the resource header
    pub format: u32,
}

impl TresConfig {
    /// Create a configuration for `texture` with the default format version
    pub fn new(texture: TextureRef) -> Self {
        Self {
            texture,
            format: DEFAULT_FORMAT,
        }
    }

    /// Set the resource format version
    pub fn with_format(mut self, format: u32) -> Self {
        self.format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TresConfig::new(TextureRef::new("uid://abc", "res://sheet.png"));
        assert_eq!(config.format, 3);
        assert_eq!(config.texture.anchor, "1_atlas");
        assert_eq!(config.texture.uid, "uid://abc");
        assert_eq!(config.texture.path, "res://sheet.png");
    }

    #[test]
    fn test_builder_pattern() {
        let config = TresConfig::new(
            TextureRef::new("uid://d3c4d5e6f7g8", "res://objects.png").with_anchor("1_objtx"),
        )
        .with_format(4);

        assert_eq!(config.format, 4);
        assert_eq!(config.texture.anchor, "1_objtx");
    }
}
