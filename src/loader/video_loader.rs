use log::trace;

use crate::manifest::VideoDescriptor;
use crate::resources::media::{VideoSource, VideoTexture};

pub struct VideoLoader {}

impl VideoLoader {
    /// No eager fetch or decode: the element starts streaming on its own
    /// (muted, inline, looping, autoplaying) and the texture views whatever
    /// frame is current. Start/stop is the consuming scene's call.
    pub fn load(descriptor: &VideoDescriptor) -> VideoTexture {
        trace!("Preparing video element for {}", descriptor.locator);
        VideoTexture::new(VideoSource::new(&descriptor.locator))
    }
}
