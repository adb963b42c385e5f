use itertools::Itertools;

use crate::error::{LoadErrorKind, decode_error};
use crate::io::source::AssetSource;
use crate::manifest::{CubeMapDescriptor, TextureDescriptor};
use crate::resources::image::{CUBE_FACES, CubeMap, GpuImage, TexelFormat};

pub struct TextureLoader {}

impl TextureLoader {
    pub fn load(
        descriptor: &TextureDescriptor,
        source: &dyn AssetSource,
    ) -> Result<GpuImage, LoadErrorKind> {
        let bytes = source.fetch(&descriptor.locator)?;
        Self::decode_rgba8(&bytes)
    }

    /// Equirect HDR environment map, kept in 32-bit float RGB.
    pub fn load_hdr(
        descriptor: &TextureDescriptor,
        source: &dyn AssetSource,
    ) -> Result<GpuImage, LoadErrorKind> {
        let bytes = source.fetch(&descriptor.locator)?;
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| decode_error(format!("hdr decode: {}", e)))?;
        let rgb = decoded.to_rgb32f();
        let (width, height) = (rgb.width(), rgb.height());
        let texels = rgb
            .into_raw()
            .iter()
            .flat_map(|component| component.to_le_bytes())
            .collect_vec();
        Ok(GpuImage::new(width, height, TexelFormat::Rgb32F, texels))
    }

    /// Six faces fetched from the descriptor's directory, px nx py ny pz nz.
    pub fn load_cube_map(
        descriptor: &CubeMapDescriptor,
        source: &dyn AssetSource,
    ) -> Result<CubeMap, LoadErrorKind> {
        let base = descriptor.locator.trim_end_matches('/');
        let mut faces = Vec::with_capacity(CUBE_FACES.len());
        for face in CUBE_FACES {
            let bytes = source.fetch(&format!("{}/{}.{}", base, face, descriptor.extension))?;
            faces.push(Self::decode_rgba8(&bytes)?);
        }

        let edge = faces[0].width();
        if faces
            .iter()
            .any(|face| face.width() != edge || face.height() != edge)
        {
            return Err(decode_error("cube map faces must be square and equally sized"));
        }

        let faces: [GpuImage; 6] = faces
            .try_into()
            .expect("exactly six faces were decoded");
        Ok(CubeMap::new(faces))
    }

    /// Shared 2D decode, also used for model materials, particle textures and
    /// font atlases.
    pub fn decode_rgba8(bytes: &[u8]) -> Result<GpuImage, LoadErrorKind> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| decode_error(format!("image decode: {}", e)))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        Ok(GpuImage::new(
            width,
            height,
            TexelFormat::Rgba8,
            rgba.into_raw(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::io::source::MemoryAssetSource;

    /// A tiny valid PNG, encoded through the same crate that decodes it.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        let pixels = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        image::DynamicImage::ImageRgba8(pixels)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .expect("png encodes");
        bytes
    }

    #[test]
    fn decodes_png_to_rgba8() {
        let source = MemoryAssetSource::new();
        source.insert("tex/wall.png", png_bytes(4, 2));

        let descriptor = TextureDescriptor {
            name: "wall".to_owned(),
            locator: "tex/wall.png".to_owned(),
        };
        let image = TextureLoader::load(&descriptor, &source).expect("texture loads");
        assert_eq!((image.width(), image.height()), (4, 2));
        assert_eq!(image.format(), TexelFormat::Rgba8);
        assert_eq!(image.texels().expect("texels present").len(), 4 * 2 * 4);
    }

    #[test]
    fn garbage_bytes_are_a_decode_failure() {
        let source = MemoryAssetSource::new();
        source.insert("tex/bad.png", vec![1, 2, 3, 4]);

        let descriptor = TextureDescriptor {
            name: "bad".to_owned(),
            locator: "tex/bad.png".to_owned(),
        };
        assert!(matches!(
            TextureLoader::load(&descriptor, &source),
            Err(LoadErrorKind::Decode(_))
        ));
    }

    #[test]
    fn cube_map_loads_six_faces_from_directory() {
        let source = MemoryAssetSource::new();
        for face in CUBE_FACES {
            source.insert(format!("env/sky/{}.png", face), png_bytes(8, 8));
        }

        let descriptor = CubeMapDescriptor {
            name: "sky".to_owned(),
            locator: "env/sky".to_owned(),
            extension: "png".to_owned(),
        };
        let cube = TextureLoader::load_cube_map(&descriptor, &source).expect("cube map loads");
        assert_eq!(cube.edge_length(), 8);
    }

    #[test]
    fn cube_map_rejects_mismatched_faces() {
        let source = MemoryAssetSource::new();
        for face in CUBE_FACES {
            let size = if face == "nz" { 4 } else { 8 };
            source.insert(format!("env/sky/{}.png", face), png_bytes(size, size));
        }

        let descriptor = CubeMapDescriptor {
            name: "sky".to_owned(),
            locator: "env/sky/".to_owned(),
            extension: "png".to_owned(),
        };
        assert!(matches!(
            TextureLoader::load_cube_map(&descriptor, &source),
            Err(LoadErrorKind::Decode(_))
        ));
    }
}
