//! `TextureAtlas` XML parsing

use std::fs;
use std::io;
use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::{span_at, ManifestError};

use super::record::{AtlasRecord, Manifest, Region, SkippedRecord};

/// Tag of the per-sprite elements under the manifest root
pub const SUB_TEXTURE: &str = "SubTexture";

/// Attributes every `SubTexture` must carry, non-empty
pub const REQUIRED_ATTRIBUTES: [&str; 5] = ["name", "x", "y", "width", "height"];

/// Read and parse the manifest at `path`
pub fn parse(path: impl AsRef<Path>) -> Result<Manifest, ManifestError> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::InvalidData => {
            return Err(ManifestError::Malformed {
                path: path.to_path_buf(),
                message: "manifest is not valid UTF-8".to_string(),
                span: 0..0,
                text: String::new(),
            });
        }
        Err(source) => {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    parse_source(path, &text)
}

/// Parse manifest text that did not come from a file
pub fn parse_str(text: &str) -> Result<Manifest, ManifestError> {
    parse_source(Path::new("<input>"), text)
}

fn parse_source(path: &Path, text: &str) -> Result<Manifest, ManifestError> {
    let doc = Document::parse(text).map_err(|err| {
        let pos = err.pos();
        ManifestError::Malformed {
            path: path.to_path_buf(),
            message: err.to_string(),
            span: span_at(text, pos.row, pos.col),
            text: text.to_string(),
        }
    })?;

    let root = doc.root_element();
    let image_path = root.attribute("imagePath").map(str::to_string);
    tracing::debug!(
        "Manifest '{}' root <{}> imagePath={:?}",
        path.display(),
        root.tag_name().name(),
        image_path
    );

    let mut manifest = Manifest {
        image_path,
        ..Manifest::default()
    };

    for node in root.children().filter(|n| n.has_tag_name(SUB_TEXTURE)) {
        match read_record(node) {
            Ok(record) => {
                let questionable = record.region.questionable_fields();
                if !questionable.is_empty() {
                    tracing::warn!(
                        "SubTexture '{}' has unexpected values for {} (Rect2({})); keeping them as written",
                        record.name,
                        questionable.join(", "),
                        record.region
                    );
                }
                manifest.records.push(record);
            }
            Err(skipped) => {
                tracing::warn!("Skipping SubTexture with missing attributes: {}", skipped);
                manifest.skipped.push(skipped);
            }
        }
    }

    Ok(manifest)
}

fn read_record(node: Node<'_, '_>) -> Result<AtlasRecord, SkippedRecord> {
    let attr = |name: &str| node.attribute(name).filter(|value| !value.is_empty());

    match (
        attr("name"),
        attr("x"),
        attr("y"),
        attr("width"),
        attr("height"),
    ) {
        (Some(name), Some(x), Some(y), Some(width), Some(height)) => {
            Ok(AtlasRecord::new(name, Region::new(x, y, width, height)))
        }
        _ => Err(SkippedRecord {
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            missing: REQUIRED_ATTRIBUTES
                .into_iter()
                .filter(|name| attr(*name).is_none())
                .collect(),
            span: node.range(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TextureAtlas imagePath="hexagonTerrain_sheet.png">
    <!-- packed by hand -->
    <SubTexture name="dirt_02.png" x="0" y="0" width="120" height="140"/>
    <SubTexture name="grass_01.png" x="120.0" y="0" width="120" height="140"/>
    <SubTexture name="sand_07.png" x="240" y="140" width="120" height="140"/>
</TextureAtlas>
"#;

    #[test]
    fn test_parse_preserves_order_and_text() {
        let manifest = parse_str(SHEET).expect("Should parse");
        assert_eq!(manifest.image_path.as_deref(), Some("hexagonTerrain_sheet.png"));
        assert!(manifest.skipped.is_empty());

        let names: Vec<&str> = manifest.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["dirt_02.png", "grass_01.png", "sand_07.png"]);
        assert_eq!(manifest.records[1].region, Region::new("120.0", "0", "120", "140"));
    }

    #[test]
    fn test_missing_attribute_is_skipped() {
        let manifest = parse_str(
            r#"<TextureAtlas>
                <SubTexture name="a.png" x="0" y="0" height="10"/>
                <SubTexture name="b.png" x="0" y="0" width="10" height="10"/>
            </TextureAtlas>"#,
        )
        .expect("Should parse");

        assert_eq!(manifest.records.len(), 1);
        assert_eq!(manifest.records[0].name, "b.png");
        assert_eq!(manifest.skipped.len(), 1);
        assert_eq!(manifest.skipped[0].missing, vec!["width"]);
        assert_eq!(manifest.skipped[0].name(), Some("a.png"));
    }

    #[test]
    fn test_empty_attribute_is_skipped() {
        let manifest = parse_str(
            r#"<TextureAtlas><SubTexture name="" x="0" y="" width="1" height="1"/></TextureAtlas>"#,
        )
        .expect("Should parse");

        assert!(manifest.records.is_empty());
        assert_eq!(manifest.skipped[0].missing, vec!["name", "y"]);
        assert_eq!(
            manifest.skipped[0].attributes[0],
            ("name".to_string(), String::new())
        );
    }

    #[test]
    fn test_skipped_span_points_at_element() {
        let text = r#"<TextureAtlas><SubTexture name="a.png"/></TextureAtlas>"#;
        let manifest = parse_str(text).expect("Should parse");
        let span = manifest.skipped[0].span.clone();
        assert_eq!(&text[span], r#"<SubTexture name="a.png"/>"#);
    }

    #[test]
    fn test_only_direct_sub_textures_count() {
        let manifest = parse_str(
            r#"<TextureAtlas>
                <Meta name="x.png" x="0" y="0" width="1" height="1"/>
                <Group><SubTexture name="nested.png" x="0" y="0" width="1" height="1"/></Group>
                <SubTexture name="top.png" x="0" y="0" width="1" height="1"/>
            </TextureAtlas>"#,
        )
        .expect("Should parse");

        assert_eq!(manifest.records.len(), 1);
        assert_eq!(manifest.records[0].name, "top.png");
        assert!(manifest.skipped.is_empty());
    }

    #[test]
    fn test_questionable_values_are_kept() {
        let manifest = parse_str(
            r#"<TextureAtlas><SubTexture name="odd.png" x="-4" y="0" width="0" height="ten"/></TextureAtlas>"#,
        )
        .expect("Should parse");
        assert_eq!(manifest.records[0].region, Region::new("-4", "0", "0", "ten"));
    }

    #[test]
    fn test_malformed_xml() {
        let result = parse_str("<TextureAtlas>\n  <SubTexture name=\"a.png\"\n</TextureAtlas>");
        match result {
            Err(ManifestError::Malformed { span, text, .. }) => {
                assert!(span.start <= text.len());
                assert!(span.end <= text.len());
            }
            other => panic!("Expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_document_is_malformed() {
        assert!(matches!(parse_str(""), Err(ManifestError::Malformed { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = parse("definitely/not/here/sheet.xml");
        assert!(matches!(result, Err(ManifestError::NotFound { .. })));
    }
}
