use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec3;

use crate::resources::image::GpuImage;

/// Named, flattened point sequences from one path file, offset and axis
/// inversion already applied.
#[derive(Debug)]
pub struct PathSet {
    paths: HashMap<String, Vec<Vec3>>,
}

impl PathSet {
    pub fn new(paths: HashMap<String, Vec<Vec3>>) -> Self {
        Self { paths }
    }

    pub fn path(&self, name: &str) -> Option<&[Vec3]> {
        self.paths.get(name).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlyphMetrics {
    pub advance: f32,
    /// min_x, min_y, max_x, max_y in em units.
    pub bounds: [f32; 4],
    /// Atlas rectangle when the face carries a backing texture.
    pub uv: Option<[f32; 4]>,
}

/// Parsed glyph metrics plus the optional backing atlas. The atlas is the
/// only GPU-backed sub-resource and is released like any other texture.
#[derive(Debug)]
pub struct FontFace {
    pub family: String,
    pub line_height: f32,
    pub ascender: f32,
    pub descender: f32,
    glyphs: HashMap<char, GlyphMetrics>,
    texture: Option<GpuImage>,
}

impl FontFace {
    pub fn new(
        family: String,
        line_height: f32,
        ascender: f32,
        descender: f32,
        glyphs: HashMap<char, GlyphMetrics>,
        texture: Option<GpuImage>,
    ) -> Self {
        Self {
            family,
            line_height,
            ascender,
            descender,
            glyphs,
            texture,
        }
    }

    pub fn glyph(&self, character: char) -> Option<&GlyphMetrics> {
        self.glyphs.get(&character)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn texture(&self) -> Option<&GpuImage> {
        self.texture.as_ref()
    }

    pub fn dispose(&self) {
        if let Some(texture) = &self.texture {
            texture.release();
        }
    }
}

/// Parsed particle-effect template. Instances spawned from it are scene
/// concerns; the template only owns its parameters and the optional texture.
#[derive(Debug)]
pub struct ParticleTemplate {
    pub max_particles: u32,
    /// Min/max seconds a particle lives.
    pub lifetime: [f32; 2],
    pub spawn_rate: f32,
    pub size: [f32; 2],
    pub color: [f32; 4],
    texture: Option<GpuImage>,
    torn_down: AtomicBool,
}

impl ParticleTemplate {
    pub fn new(
        max_particles: u32,
        lifetime: [f32; 2],
        spawn_rate: f32,
        size: [f32; 2],
        color: [f32; 4],
        texture: Option<GpuImage>,
    ) -> Self {
        Self {
            max_particles,
            lifetime,
            spawn_rate,
            size,
            color,
            texture,
            torn_down: AtomicBool::new(false),
        }
    }

    pub fn texture(&self) -> Option<&GpuImage> {
        self.texture.as_ref()
    }

    pub fn teardown(&self) {
        if !self.torn_down.swap(true, Ordering::SeqCst) {
            if let Some(texture) = &self.texture {
                texture.release();
            }
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }
}

/// Generic structured data; disposal is just dropping the reference.
#[derive(Debug)]
pub struct JsonDocument {
    pub value: serde_json::Value,
}

/// Raw vector-graphic markup; disposal is just dropping the reference.
#[derive(Debug)]
pub struct VectorGraphic {
    pub markup: Arc<str>,
}

impl VectorGraphic {
    pub fn byte_len(&self) -> usize {
        self.markup.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::image::TexelFormat;

    #[test]
    fn particle_teardown_releases_texture_once() {
        let template = ParticleTemplate::new(
            256,
            [0.5, 2.0],
            32.0,
            [0.1, 0.4],
            [1.0, 0.5, 0.0, 1.0],
            Some(GpuImage::new(4, 4, TexelFormat::Rgba8, vec![0u8; 64])),
        );

        template.teardown();
        assert!(template.is_torn_down());
        assert!(template.texture().expect("texture present").is_released());

        template.teardown();
        assert!(template.is_torn_down());
    }

    #[test]
    fn path_set_lookup() {
        let mut paths = HashMap::new();
        paths.insert("patrol".to_owned(), vec![Vec3::ZERO, Vec3::ONE]);
        let set = PathSet::new(paths);

        assert_eq!(set.path("patrol").expect("path present").len(), 2);
        assert!(set.path("missing").is_none());
    }
}
