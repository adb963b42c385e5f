use serde::Deserialize;

use crate::error::{LoadErrorKind, decode_error};
use crate::io::source::AssetSource;
use crate::loader::texture_loader::TextureLoader;
use crate::manifest::ParticleDescriptor;
use crate::resources::misc::ParticleTemplate;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticleFile {
    #[serde(default = "default_max_particles")]
    max_particles: u32,
    #[serde(default = "default_lifetime")]
    lifetime: [f32; 2],
    #[serde(default = "default_spawn_rate")]
    spawn_rate: f32,
    #[serde(default = "default_size")]
    size: [f32; 2],
    #[serde(default = "default_color")]
    color: [f32; 4],
    #[serde(default)]
    texture: Option<String>,
}

fn default_max_particles() -> u32 {
    256
}

fn default_lifetime() -> [f32; 2] {
    [1.0, 1.0]
}

fn default_spawn_rate() -> f32 {
    16.0
}

fn default_size() -> [f32; 2] {
    [0.1, 0.1]
}

fn default_color() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

pub struct ParticleLoader {}

impl ParticleLoader {
    pub fn load(
        descriptor: &ParticleDescriptor,
        source: &dyn AssetSource,
    ) -> Result<ParticleTemplate, LoadErrorKind> {
        let bytes = source.fetch(&descriptor.locator)?;
        let file: ParticleFile = serde_json::from_slice(&bytes)
            .map_err(|e| decode_error(format!("particle template parse: {}", e)))?;

        if file.max_particles == 0 {
            return Err(decode_error("particle template allows zero particles"));
        }
        if file.lifetime[0] > file.lifetime[1] {
            return Err(decode_error("particle lifetime range is inverted"));
        }

        let texture = match &file.texture {
            Some(locator) => {
                let bytes = source.fetch(locator)?;
                Some(TextureLoader::decode_rgba8(&bytes)?)
            }
            None => None,
        };

        Ok(ParticleTemplate::new(
            file.max_particles,
            file.lifetime,
            file.spawn_rate,
            file.size,
            file.color,
            texture,
        ))
    }
}
