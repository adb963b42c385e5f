use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{LoadErrorKind, decode_error};
use crate::io::source::AssetSource;
use crate::loader::texture_loader::TextureLoader;
use crate::manifest::FontDescriptor;
use crate::resources::misc::{FontFace, GlyphMetrics};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FontFile {
    family: String,
    #[serde(default = "default_line_height")]
    line_height: f32,
    #[serde(default)]
    ascender: f32,
    #[serde(default)]
    descender: f32,
    glyphs: HashMap<String, GlyphDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlyphDef {
    advance: f32,
    #[serde(default)]
    bounds: [f32; 4],
    #[serde(default)]
    uv: Option<[f32; 4]>,
}

fn default_line_height() -> f32 {
    1.0
}

pub struct FontLoader {}

impl FontLoader {
    /// Dual-file load: the glyph-metrics document plus, when the descriptor
    /// names one, the backing atlas texture.
    pub fn load(
        descriptor: &FontDescriptor,
        source: &dyn AssetSource,
    ) -> Result<FontFace, LoadErrorKind> {
        let bytes = source.fetch(&descriptor.locator)?;
        let file: FontFile = serde_json::from_slice(&bytes)
            .map_err(|e| decode_error(format!("font metrics parse: {}", e)))?;

        let mut glyphs = HashMap::with_capacity(file.glyphs.len());
        for (key, def) in &file.glyphs {
            let mut chars = key.chars();
            let (Some(character), None) = (chars.next(), chars.next()) else {
                return Err(decode_error(format!(
                    "glyph key {:?} is not a single character",
                    key
                )));
            };
            glyphs.insert(
                character,
                GlyphMetrics {
                    advance: def.advance,
                    bounds: def.bounds,
                    uv: def.uv,
                },
            );
        }

        let texture = match &descriptor.texture {
            Some(locator) => {
                let bytes = source.fetch(locator)?;
                Some(TextureLoader::decode_rgba8(&bytes)?)
            }
            None => None,
        };

        Ok(FontFace::new(
            file.family,
            file.line_height,
            file.ascender,
            file.descender,
            glyphs,
            texture,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::source::MemoryAssetSource;
    use crate::loader::texture_loader::tests::png_bytes;

    fn metrics_json() -> Vec<u8> {
        br#"{
            "family": "Display",
            "lineHeight": 1.2,
            "ascender": 0.8,
            "descender": -0.2,
            "glyphs": {
                "A": { "advance": 0.6, "bounds": [0, 0, 0.55, 0.7], "uv": [0, 0, 0.1, 0.1] },
                "b": { "advance": 0.5 }
            }
        }"#
        .to_vec()
    }

    #[test]
    fn loads_metrics_and_atlas() {
        let source = MemoryAssetSource::new();
        source.insert("fonts/display.json", metrics_json());
        source.insert("fonts/display.png", png_bytes(16, 16));

        let face = FontLoader::load(
            &FontDescriptor {
                name: "display".to_owned(),
                locator: "fonts/display.json".to_owned(),
                texture: Some("fonts/display.png".to_owned()),
            },
            &source,
        )
        .expect("font loads");

        assert_eq!(face.family, "Display");
        assert_eq!(face.glyph_count(), 2);
        assert_eq!(face.glyph('A').expect("glyph present").advance, 0.6);
        assert!(face.glyph('A').expect("glyph present").uv.is_some());
        assert!(face.glyph('z').is_none());
        assert!(face.texture().is_some());
    }

    #[test]
    fn atlas_is_optional() {
        let source = MemoryAssetSource::new();
        source.insert("fonts/display.json", metrics_json());

        let face = FontLoader::load(
            &FontDescriptor {
                name: "display".to_owned(),
                locator: "fonts/display.json".to_owned(),
                texture: None,
            },
            &source,
        )
        .expect("font loads");
        assert!(face.texture().is_none());
    }

    #[test]
    fn multi_char_glyph_key_is_a_decode_failure() {
        let source = MemoryAssetSource::new();
        source.insert(
            "fonts/bad.json",
            br#"{ "family": "X", "glyphs": { "ab": { "advance": 1.0 } } }"#.to_vec(),
        );

        assert!(matches!(
            FontLoader::load(
                &FontDescriptor {
                    name: "bad".to_owned(),
                    locator: "fonts/bad.json".to_owned(),
                    texture: None,
                },
                &source,
            ),
            Err(LoadErrorKind::Decode(_))
        ));
    }
}
