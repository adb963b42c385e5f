use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Texel layout of a decoded image as it would be uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelFormat {
    Rgba8,
    /// 32-bit float RGB, used for equirect HDR environment maps.
    Rgb32F,
}

/// A GPU-bindable image handle. Releasing drops the texel memory and marks
/// the binding dead; a second release is a no-op.
#[derive(Debug)]
pub struct GpuImage {
    width: u32,
    height: u32,
    format: TexelFormat,
    texels: RwLock<Option<Arc<[u8]>>>,
    released: AtomicBool,
}

impl GpuImage {
    pub fn new(width: u32, height: u32, format: TexelFormat, texels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            texels: RwLock::new(Some(texels.into())),
            released: AtomicBool::new(false),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> TexelFormat {
        self.format
    }

    /// The backing texels, `None` once released.
    pub fn texels(&self) -> Option<Arc<[u8]>> {
        self.texels
            .read()
            .expect("Get the read lock on the texels")
            .clone()
    }

    pub fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            *self
                .texels
                .write()
                .expect("Get the write lock on the texels") = None;
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Cube map face order: +x -x +y -y +z -z.
pub const CUBE_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

#[derive(Debug)]
pub struct CubeMap {
    faces: [GpuImage; 6],
}

impl CubeMap {
    pub fn new(faces: [GpuImage; 6]) -> Self {
        Self { faces }
    }

    pub fn face(&self, index: usize) -> &GpuImage {
        &self.faces[index]
    }

    pub fn edge_length(&self) -> u32 {
        self.faces[0].width()
    }

    pub fn release(&self) {
        for face in &self.faces {
            face.release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.faces.iter().all(GpuImage::is_released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_drops_texels_once() {
        let image = GpuImage::new(2, 2, TexelFormat::Rgba8, vec![0u8; 16]);
        assert!(image.texels().is_some());
        assert!(!image.is_released());

        image.release();
        assert!(image.texels().is_none());
        assert!(image.is_released());

        // Second release must not fault.
        image.release();
        assert!(image.is_released());
    }
}
