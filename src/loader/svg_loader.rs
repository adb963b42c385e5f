use crate::error::{LoadErrorKind, decode_error};
use crate::io::source::AssetSource;
use crate::manifest::SvgDescriptor;
use crate::resources::misc::VectorGraphic;

pub struct SvgLoader {}

impl SvgLoader {
    /// Vector graphics are kept as markup; tessellation happens wherever the
    /// consuming scene draws them.
    pub fn load(
        descriptor: &SvgDescriptor,
        source: &dyn AssetSource,
    ) -> Result<VectorGraphic, LoadErrorKind> {
        let bytes = source.fetch(&descriptor.locator)?;
        let markup = String::from_utf8(bytes)
            .map_err(|e| decode_error(format!("svg is not utf-8: {}", e)))?;
        if !markup.contains("<svg") {
            return Err(decode_error("payload has no <svg> root"));
        }
        Ok(VectorGraphic {
            markup: markup.into(),
        })
    }
}
