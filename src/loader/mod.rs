use crate::cache::CacheEntry;
use crate::error::{LoadError, decode_error};
use crate::io::source::AssetSource;
use crate::manifest::{Category, Descriptor};

pub mod audio_loader;
pub mod font_loader;
pub mod json_loader;
pub mod model_loader;
pub mod particle_loader;
pub mod path_loader;
pub mod svg_loader;
pub mod texture_loader;
pub mod video_loader;

use audio_loader::AudioLoader;
use font_loader::FontLoader;
use json_loader::JsonLoader;
use model_loader::ModelLoader;
use particle_loader::ParticleLoader;
use path_loader::PathLoader;
use svg_loader::SvgLoader;
use texture_loader::TextureLoader;
use video_loader::VideoLoader;

/// Turns one descriptor into one cache entry. Synchronous: the coordinator
/// runs these on blocking threads. Failures never leave a partial entry
/// behind; the error carries category, name and locator.
pub fn load(
    category: Category,
    descriptor: &Descriptor,
    source: &dyn AssetSource,
) -> Result<CacheEntry, LoadError> {
    let result = match (category, descriptor) {
        (
            Category::Models | Category::Characters | Category::SelectedPlayerModel,
            Descriptor::Model(d),
        ) => ModelLoader::load(d, source).map(CacheEntry::Scene),
        (Category::Textures, Descriptor::Texture(d)) => {
            TextureLoader::load(d, source).map(CacheEntry::Texture)
        }
        (Category::Hdris, Descriptor::Texture(d)) => {
            TextureLoader::load_hdr(d, source).map(CacheEntry::Environment)
        }
        (Category::CubeMaps, Descriptor::CubeMap(d)) => {
            TextureLoader::load_cube_map(d, source).map(CacheEntry::CubeMap)
        }
        (Category::VideoTextures, Descriptor::Video(d)) => Ok(CacheEntry::Video(VideoLoader::load(d))),
        (Category::Audios | Category::SelectedPlayerAudio, Descriptor::Audio(d)) => {
            AudioLoader::load(d, source).map(CacheEntry::Audio)
        }
        (Category::Vfxs, Descriptor::Particle(d)) => {
            ParticleLoader::load(d, source).map(CacheEntry::Particle)
        }
        (Category::PathFiles, Descriptor::Path(d)) => {
            PathLoader::load(d, source).map(CacheEntry::Paths)
        }
        (Category::JsonFiles, Descriptor::Json(d)) => {
            JsonLoader::load(d, source).map(CacheEntry::Json)
        }
        (Category::Fonts, Descriptor::Font(d)) => FontLoader::load(d, source).map(CacheEntry::Font),
        (Category::Svgs, Descriptor::Svg(d)) => SvgLoader::load(d, source).map(CacheEntry::Vector),
        _ => Err(decode_error(format!(
            "descriptor kind does not belong to category {}",
            category
        ))),
    };

    result.map_err(|kind| LoadError::new(category, descriptor.name(), descriptor.locator(), kind))
}
