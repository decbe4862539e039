//! Records read from an atlas manifest

use std::fmt;

use crate::error::Span;

/// A rectangular crop in the source image's pixel space
///
/// Values keep the exact attribute text from the manifest so they can be written
/// back out without any numeric drift (`12.0` stays `12.0`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
}

impl Region {
    pub fn new(
        x: impl Into<String>,
        y: impl Into<String>,
        width: impl Into<String>,
        height: impl Into<String>,
    ) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            width: width.into(),
            height: height.into(),
        }
    }

    /// Fields that are not numbers in the expected range
    ///
    /// Offsets must be non-negative and sizes positive. These are only reported,
    /// the region is still emitted as written.
    pub fn questionable_fields(&self) -> Vec<&'static str> {
        let checks = [
            ("x", &self.x, false),
            ("y", &self.y, false),
            ("width", &self.width, true),
            ("height", &self.height, true),
        ];

        checks
            .into_iter()
            .filter(|(_, value, positive)| match value.trim().parse::<f64>() {
                Ok(v) if *positive => v.is_nan() || v <= 0.0,
                Ok(v) => v.is_nan() || v < 0.0,
                Err(_) => true,
            })
            .map(|(field, _, _)| field)
            .collect()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.x, self.y, self.width, self.height)
    }
}

/// One named sub-region of the atlas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasRecord {
    /// Source sprite filename, e.g. `grass_01.png`
    pub name: String,
    pub region: Region,
}

impl AtlasRecord {
    pub fn new(name: impl Into<String>, region: Region) -> Self {
        Self {
            name: name.into(),
            region,
        }
    }
}

/// A `SubTexture` element that was left out because required attributes were absent or empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Raw attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Required attributes that were absent or empty
    pub missing: Vec<&'static str>,
    /// Location of the element in the manifest text
    pub span: Span,
}

impl SkippedRecord {
    /// The `name` attribute, if the element had a usable one
    pub fn name(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, value)| key == "name" && !value.is_empty())
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<SubTexture")?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, value)?;
        }
        write!(f, "> missing {}", self.missing.join(", "))
    }
}

/// Everything read from one manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// `imagePath` of the root element, if present
    pub image_path: Option<String>,
    /// Complete records in manifest order
    pub records: Vec<AtlasRecord>,
    /// Incomplete records in manifest order
    pub skipped: Vec<SkippedRecord>,
}
