use crate::error::{LoadErrorKind, decode_error};
use crate::io::source::AssetSource;
use crate::manifest::JsonDescriptor;
use crate::resources::misc::JsonDocument;

pub struct JsonLoader {}

impl JsonLoader {
    pub fn load(
        descriptor: &JsonDescriptor,
        source: &dyn AssetSource,
    ) -> Result<JsonDocument, LoadErrorKind> {
        let bytes = source.fetch(&descriptor.locator)?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| decode_error(format!("json parse: {}", e)))?;
        Ok(JsonDocument { value })
    }
}
