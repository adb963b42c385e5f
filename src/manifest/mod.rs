use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadErrorKind};

/// Resource kinds the cache knows how to load and dispose. The two
/// `SelectedPlayer*` categories are populated outside of manifests (they carry
/// a cross-scene user selection) and are exempt from eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Models,
    Characters,
    Textures,
    VideoTextures,
    Audios,
    Hdris,
    CubeMaps,
    Vfxs,
    PathFiles,
    JsonFiles,
    Fonts,
    Svgs,
    SelectedPlayerModel,
    SelectedPlayerAudio,
}

impl Category {
    /// Every category, manifest-driven and persistent alike.
    pub const ALL: [Category; 14] = [
        Category::Models,
        Category::Characters,
        Category::Textures,
        Category::VideoTextures,
        Category::Audios,
        Category::Hdris,
        Category::CubeMaps,
        Category::Vfxs,
        Category::PathFiles,
        Category::JsonFiles,
        Category::Fonts,
        Category::Svgs,
        Category::SelectedPlayerModel,
        Category::SelectedPlayerAudio,
    ];

    pub fn is_persistent(&self) -> bool {
        matches!(
            self,
            Category::SelectedPlayerModel | Category::SelectedPlayerAudio
        )
    }

    /// The manifest key spelling, also used in logs.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Models => "models",
            Category::Characters => "characters",
            Category::Textures => "textures",
            Category::VideoTextures => "videoTextures",
            Category::Audios => "audios",
            Category::Hdris => "hdris",
            Category::CubeMaps => "cubeMaps",
            Category::Vfxs => "vfxs",
            Category::PathFiles => "pathFiles",
            Category::JsonFiles => "jsonFiles",
            Category::Fonts => "fonts",
            Category::Svgs => "svgs",
            Category::SelectedPlayerModel => "selectedPlayerModel",
            Category::SelectedPlayerAudio => "selectedPlayerAudios",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    pub locator: String,
    /// Uniform scale applied to the graph root.
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default = "default_true")]
    pub cast_shadows: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureDescriptor {
    pub name: String,
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDescriptor {
    pub name: String,
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioDescriptor {
    pub name: String,
    pub locator: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub looping: bool,
    /// Spatialization radius; `None` plays non-positional.
    #[serde(default)]
    pub radius: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeMapDescriptor {
    pub name: String,
    /// Directory holding the six face images (px nx py ny pz nz).
    pub locator: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleDescriptor {
    pub name: String,
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathDescriptor {
    pub name: String,
    pub locator: String,
    /// Offset added to every point after the optional inversion.
    #[serde(default)]
    pub offset: [f32; 3],
    /// Negates the X component of every point (handedness mirror).
    #[serde(default)]
    pub invert_x: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDescriptor {
    pub name: String,
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FontDescriptor {
    pub name: String,
    /// Glyph metrics document.
    pub locator: String,
    /// Optional backing atlas texture.
    #[serde(default)]
    pub texture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgDescriptor {
    pub name: String,
    pub locator: String,
}

fn default_true() -> bool {
    true
}

fn default_volume() -> f32 {
    1.0
}

fn default_extension() -> String {
    "png".to_owned()
}

/// Type-erased descriptor, carried through the load pipeline together with
/// its [`Category`]. Models and characters (and the selected player model)
/// share [`ModelDescriptor`]; the category decides the cache slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Model(ModelDescriptor),
    Texture(TextureDescriptor),
    Video(VideoDescriptor),
    Audio(AudioDescriptor),
    CubeMap(CubeMapDescriptor),
    Particle(ParticleDescriptor),
    Path(PathDescriptor),
    Json(JsonDescriptor),
    Font(FontDescriptor),
    Svg(SvgDescriptor),
}

impl Descriptor {
    pub fn name(&self) -> &str {
        match self {
            Descriptor::Model(d) => &d.name,
            Descriptor::Texture(d) => &d.name,
            Descriptor::Video(d) => &d.name,
            Descriptor::Audio(d) => &d.name,
            Descriptor::CubeMap(d) => &d.name,
            Descriptor::Particle(d) => &d.name,
            Descriptor::Path(d) => &d.name,
            Descriptor::Json(d) => &d.name,
            Descriptor::Font(d) => &d.name,
            Descriptor::Svg(d) => &d.name,
        }
    }

    pub fn locator(&self) -> &str {
        match self {
            Descriptor::Model(d) => &d.locator,
            Descriptor::Texture(d) => &d.locator,
            Descriptor::Video(d) => &d.locator,
            Descriptor::Audio(d) => &d.locator,
            Descriptor::CubeMap(d) => &d.locator,
            Descriptor::Particle(d) => &d.locator,
            Descriptor::Path(d) => &d.locator,
            Descriptor::Json(d) => &d.locator,
            Descriptor::Font(d) => &d.locator,
            Descriptor::Svg(d) => &d.locator,
        }
    }
}

/// Declarative list of everything one scene needs, grouped by category.
/// Absent keys deserialize to empty arrays; the engine never mutates one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manifest {
    pub models: Vec<ModelDescriptor>,
    pub characters: Vec<ModelDescriptor>,
    pub textures: Vec<TextureDescriptor>,
    pub video_textures: Vec<VideoDescriptor>,
    pub audios: Vec<AudioDescriptor>,
    pub hdris: Vec<TextureDescriptor>,
    pub cube_maps: Vec<CubeMapDescriptor>,
    pub vfxs: Vec<ParticleDescriptor>,
    pub path_files: Vec<PathDescriptor>,
    pub json_files: Vec<JsonDescriptor>,
    pub fonts: Vec<FontDescriptor>,
    pub svgs: Vec<SvgDescriptor>,
}

impl Manifest {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Names declared for one category. Empty for categories the manifest
    /// does not mention and for the persistent categories, which no manifest
    /// can declare.
    pub fn names(&self, category: Category) -> HashSet<&str> {
        match category {
            Category::Models => self.models.iter().map(|d| d.name.as_str()).collect(),
            Category::Characters => self.characters.iter().map(|d| d.name.as_str()).collect(),
            Category::Textures => self.textures.iter().map(|d| d.name.as_str()).collect(),
            Category::VideoTextures => {
                self.video_textures.iter().map(|d| d.name.as_str()).collect()
            }
            Category::Audios => self.audios.iter().map(|d| d.name.as_str()).collect(),
            Category::Hdris => self.hdris.iter().map(|d| d.name.as_str()).collect(),
            Category::CubeMaps => self.cube_maps.iter().map(|d| d.name.as_str()).collect(),
            Category::Vfxs => self.vfxs.iter().map(|d| d.name.as_str()).collect(),
            Category::PathFiles => self.path_files.iter().map(|d| d.name.as_str()).collect(),
            Category::JsonFiles => self.json_files.iter().map(|d| d.name.as_str()).collect(),
            Category::Fonts => self.fonts.iter().map(|d| d.name.as_str()).collect(),
            Category::Svgs => self.svgs.iter().map(|d| d.name.as_str()).collect(),
            Category::SelectedPlayerModel | Category::SelectedPlayerAudio => HashSet::new(),
        }
    }

    /// Keep-sets for the eviction diff, one per category.
    pub fn keep_sets(&self) -> HashMap<Category, HashSet<&str>> {
        Category::ALL
            .iter()
            .filter(|category| !category.is_persistent())
            .map(|&category| (category, self.names(category)))
            .collect()
    }

    /// Flattens the manifest into the load coordinator's fan-out list.
    /// No ordering between categories or descriptors is implied.
    pub fn requests(&self) -> Vec<(Category, Descriptor)> {
        let mut requests = Vec::with_capacity(self.descriptor_count());
        requests.extend(
            self.models
                .iter()
                .cloned()
                .map(|d| (Category::Models, Descriptor::Model(d))),
        );
        requests.extend(
            self.characters
                .iter()
                .cloned()
                .map(|d| (Category::Characters, Descriptor::Model(d))),
        );
        requests.extend(
            self.textures
                .iter()
                .cloned()
                .map(|d| (Category::Textures, Descriptor::Texture(d))),
        );
        requests.extend(
            self.video_textures
                .iter()
                .cloned()
                .map(|d| (Category::VideoTextures, Descriptor::Video(d))),
        );
        requests.extend(
            self.audios
                .iter()
                .cloned()
                .map(|d| (Category::Audios, Descriptor::Audio(d))),
        );
        requests.extend(
            self.hdris
                .iter()
                .cloned()
                .map(|d| (Category::Hdris, Descriptor::Texture(d))),
        );
        requests.extend(
            self.cube_maps
                .iter()
                .cloned()
                .map(|d| (Category::CubeMaps, Descriptor::CubeMap(d))),
        );
        requests.extend(
            self.vfxs
                .iter()
                .cloned()
                .map(|d| (Category::Vfxs, Descriptor::Particle(d))),
        );
        requests.extend(
            self.path_files
                .iter()
                .cloned()
                .map(|d| (Category::PathFiles, Descriptor::Path(d))),
        );
        requests.extend(
            self.json_files
                .iter()
                .cloned()
                .map(|d| (Category::JsonFiles, Descriptor::Json(d))),
        );
        requests.extend(
            self.fonts
                .iter()
                .cloned()
                .map(|d| (Category::Fonts, Descriptor::Font(d))),
        );
        requests.extend(
            self.svgs
                .iter()
                .cloned()
                .map(|d| (Category::Svgs, Descriptor::Svg(d))),
        );
        requests
    }

    pub fn descriptor_count(&self) -> usize {
        self.models.len()
            + self.characters.len()
            + self.textures.len()
            + self.video_textures.len()
            + self.audios.len()
            + self.hdris.len()
            + self.cube_maps.len()
            + self.vfxs.len()
            + self.path_files.len()
            + self.json_files.len()
            + self.fonts.len()
            + self.svgs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptor_count() == 0
    }

    /// Two descriptors sharing a name within one category would silently
    /// shadow each other in the cache; fail before any fetch starts.
    pub fn validate(&self) -> Result<(), LoadError> {
        let requests = self.requests();
        let mut seen: HashSet<(Category, &str)> = HashSet::with_capacity(requests.len());
        for (category, descriptor) in &requests {
            if !seen.insert((*category, descriptor.name())) {
                return Err(LoadError::new(
                    *category,
                    descriptor.name(),
                    descriptor.locator(),
                    LoadErrorKind::DuplicateName,
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_deserialize_empty() {
        let manifest = Manifest::from_json(br#"{ "models": [ { "name": "crate", "locator": "models/crate.json" } ] }"#)
            .expect("manifest parses");
        assert_eq!(manifest.models.len(), 1);
        assert!(manifest.audios.is_empty());
        assert!(manifest.svgs.is_empty());
        assert!(manifest.names(Category::Audios).is_empty());
    }

    #[test]
    fn camel_case_keys_map_to_fields() {
        let manifest = Manifest::from_json(
            br#"{
                "videoTextures": [ { "name": "intro", "locator": "video/intro.mp4" } ],
                "pathFiles": [ { "name": "patrol", "locator": "paths/patrol.json", "invertX": true } ],
                "cubeMaps": [ { "name": "sky", "locator": "env/sky" } ]
            }"#,
        )
        .expect("manifest parses");
        assert_eq!(manifest.video_textures[0].name, "intro");
        assert!(manifest.path_files[0].invert_x);
        assert_eq!(manifest.cube_maps[0].extension, "png");
    }

    #[test]
    fn requests_flatten_all_categories() {
        let manifest = Manifest::from_json(
            br#"{
                "models": [ { "name": "a", "locator": "a.json" } ],
                "characters": [ { "name": "b", "locator": "b.json" } ],
                "audios": [ { "name": "c", "locator": "c.wav" } ]
            }"#,
        )
        .expect("manifest parses");
        let requests = manifest.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().any(|(c, d)| *c == Category::Characters && d.name() == "b"));
    }

    #[test]
    fn duplicate_name_in_category_fails_validation() {
        let manifest = Manifest::from_json(
            br#"{
                "textures": [
                    { "name": "wall", "locator": "a.png" },
                    { "name": "wall", "locator": "b.png" }
                ]
            }"#,
        )
        .expect("manifest parses");
        let err = manifest.validate().expect_err("duplicate must fail");
        assert_eq!(err.category, Category::Textures);
        assert_eq!(err.name, "wall");
    }

    #[test]
    fn same_name_in_different_categories_is_fine() {
        let manifest = Manifest::from_json(
            br#"{
                "models": [ { "name": "hero", "locator": "hero.json" } ],
                "audios": [ { "name": "hero", "locator": "hero.wav" } ]
            }"#,
        )
        .expect("manifest parses");
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn audio_defaults_apply() {
        let manifest =
            Manifest::from_json(br#"{ "audios": [ { "name": "wind", "locator": "wind.wav" } ] }"#)
                .expect("manifest parses");
        let audio = &manifest.audios[0];
        assert_eq!(audio.volume, 1.0);
        assert!(!audio.looping);
        assert!(audio.radius.is_none());
    }
}
