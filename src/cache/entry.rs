use crate::resources::image::{CubeMap, GpuImage};
use crate::resources::media::{AudioClip, VideoTexture};
use crate::resources::misc::{FontFace, JsonDocument, ParticleTemplate, PathSet, VectorGraphic};
use crate::resources::scene::SceneGraph;

/// A resolved resource as it lives in the cache. The cache creates, reads and
/// deletes entries; it never mutates their contents — an entry is mutated
/// only by its owning subsystem (e.g. the animation collaborator advancing a
/// mixer).
#[derive(Debug)]
pub enum CacheEntry {
    Scene(SceneGraph),
    Texture(GpuImage),
    /// Equirect HDR environment map.
    Environment(GpuImage),
    CubeMap(CubeMap),
    Video(VideoTexture),
    Audio(AudioClip),
    Particle(ParticleTemplate),
    Paths(PathSet),
    Json(JsonDocument),
    Font(FontFace),
    Vector(VectorGraphic),
}

impl CacheEntry {
    /// Releases every GPU- or OS-backed handle this entry holds. Idempotent:
    /// a second call is a no-op and must not fault.
    pub fn dispose(&self) {
        match self {
            CacheEntry::Scene(scene) => scene.dispose(),
            CacheEntry::Texture(image) | CacheEntry::Environment(image) => image.release(),
            CacheEntry::CubeMap(cube) => cube.release(),
            CacheEntry::Video(video) => video.dispose(),
            CacheEntry::Audio(audio) => audio.dispose(),
            CacheEntry::Particle(template) => template.teardown(),
            // Pure data; dropping the reference is the whole story.
            CacheEntry::Paths(_) | CacheEntry::Json(_) | CacheEntry::Vector(_) => {}
            CacheEntry::Font(font) => font.dispose(),
        }
    }

    /// Whether the backing handles have been released. Entries without any
    /// backing handle (paths, json, vector graphics, textureless fonts)
    /// report `false` — there is nothing to observe.
    pub fn is_disposed(&self) -> bool {
        match self {
            CacheEntry::Scene(scene) => scene.is_disposed(),
            CacheEntry::Texture(image) | CacheEntry::Environment(image) => image.is_released(),
            CacheEntry::CubeMap(cube) => cube.is_released(),
            CacheEntry::Video(video) => video.is_disposed(),
            CacheEntry::Audio(audio) => audio.is_disposed(),
            CacheEntry::Particle(template) => template.is_torn_down(),
            CacheEntry::Paths(_) | CacheEntry::Json(_) | CacheEntry::Vector(_) => false,
            CacheEntry::Font(font) => font
                .texture()
                .map(GpuImage::is_released)
                .unwrap_or(false),
        }
    }

    pub fn as_scene(&self) -> Option<&SceneGraph> {
        match self {
            CacheEntry::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&GpuImage> {
        match self {
            CacheEntry::Texture(image) | CacheEntry::Environment(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_cube_map(&self) -> Option<&CubeMap> {
        match self {
            CacheEntry::CubeMap(cube) => Some(cube),
            _ => None,
        }
    }

    pub fn as_video(&self) -> Option<&VideoTexture> {
        match self {
            CacheEntry::Video(video) => Some(video),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioClip> {
        match self {
            CacheEntry::Audio(audio) => Some(audio),
            _ => None,
        }
    }

    pub fn as_particle(&self) -> Option<&ParticleTemplate> {
        match self {
            CacheEntry::Particle(template) => Some(template),
            _ => None,
        }
    }

    pub fn as_paths(&self) -> Option<&PathSet> {
        match self {
            CacheEntry::Paths(paths) => Some(paths),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonDocument> {
        match self {
            CacheEntry::Json(document) => Some(document),
            _ => None,
        }
    }

    pub fn as_font(&self) -> Option<&FontFace> {
        match self {
            CacheEntry::Font(font) => Some(font),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&VectorGraphic> {
        match self {
            CacheEntry::Vector(vector) => Some(vector),
            _ => None,
        }
    }
}
