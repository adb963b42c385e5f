use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
}

/// Network fetch state of a media element. Disposal must leave this at
/// `Abandoned` so the element stops pulling data the moment the scene drops
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFetchState {
    Pending,
    Abandoned,
}

/// Backing media element for a video texture: muted, inline, looping,
/// auto-starting. The loader never decodes frames; playback start/stop is
/// owned by the consuming scene.
#[derive(Debug)]
pub struct VideoSource {
    locator: RwLock<Option<String>>,
    pub muted: bool,
    pub looping: bool,
    pub autoplay: bool,
    pub plays_inline: bool,
    state: RwLock<PlaybackState>,
    fetch: RwLock<MediaFetchState>,
}

impl VideoSource {
    pub fn new(locator: &str) -> Self {
        Self {
            locator: RwLock::new(Some(locator.to_owned())),
            muted: true,
            looping: true,
            autoplay: true,
            plays_inline: true,
            // Autoplay means the element starts playing and fetching on its
            // own as soon as it exists.
            state: RwLock::new(PlaybackState::Playing),
            fetch: RwLock::new(MediaFetchState::Pending),
        }
    }

    pub fn locator(&self) -> Option<String> {
        self.locator
            .read()
            .expect("Get the read lock on the locator")
            .clone()
    }

    pub fn play(&self) {
        *self.state.write().expect("Get the write lock on the state") = PlaybackState::Playing;
    }

    pub fn pause(&self) {
        *self.state.write().expect("Get the write lock on the state") = PlaybackState::Paused;
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.read().expect("Get the read lock on the state")
    }

    pub fn fetch_state(&self) -> MediaFetchState {
        *self.fetch.read().expect("Get the read lock on the fetch state")
    }

    fn clear_source(&self) {
        *self
            .locator
            .write()
            .expect("Get the write lock on the locator") = None;
        *self
            .fetch
            .write()
            .expect("Get the write lock on the fetch state") = MediaFetchState::Abandoned;
    }
}

/// Texture view onto the backing element's current frame.
#[derive(Debug)]
pub struct VideoTexture {
    source: VideoSource,
    disposed: AtomicBool,
}

impl VideoTexture {
    pub fn new(source: VideoSource) -> Self {
        Self {
            source,
            disposed: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &VideoSource {
        &self.source
    }

    /// Pause, clear the media source so any pending network fetch is
    /// abandoned, then the reference drops with the entry.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            self.source.pause();
            self.source.clear_source();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

/// Decoded-buffer-backed playable handle. The sample memory is reclaimed by
/// the runtime when the last clone of `frames` drops; disposal only stops
/// playback.
#[derive(Debug)]
pub struct AudioClip {
    sample_rate: u32,
    channels: u16,
    frames: Arc<[f32]>,
    pub volume: f32,
    pub looping: bool,
    /// Spatialization radius; `None` plays non-positional.
    pub radius: Option<f32>,
    playing: AtomicBool,
    disposed: AtomicBool,
}

impl AudioClip {
    pub fn new(
        sample_rate: u32,
        channels: u16,
        frames: Vec<f32>,
        volume: f32,
        looping: bool,
        radius: Option<f32>,
    ) -> Self {
        Self {
            sample_rate,
            channels,
            frames: frames.into(),
            volume,
            looping,
            radius,
            playing: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn frames(&self) -> Arc<[f32]> {
        self.frames.clone()
    }

    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.frames.len() as f32 / self.channels as f32 / self.sample_rate as f32
    }

    pub fn play(&self) {
        if !self.disposed.load(Ordering::SeqCst) {
            self.playing.store(true, Ordering::SeqCst);
        }
    }

    pub fn stop(&self) {
        self.playing.store(false, Ordering::SeqCst);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    /// Stop playback if active, then drop the reference with the entry.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            self.stop();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_dispose_pauses_and_abandons_fetch() {
        let texture = VideoTexture::new(VideoSource::new("video/intro.mp4"));
        assert_eq!(texture.source().state(), PlaybackState::Playing);
        assert_eq!(texture.source().fetch_state(), MediaFetchState::Pending);

        texture.dispose();
        assert_eq!(texture.source().state(), PlaybackState::Paused);
        assert_eq!(texture.source().fetch_state(), MediaFetchState::Abandoned);
        assert!(texture.source().locator().is_none());

        texture.dispose();
        assert!(texture.is_disposed());
    }

    #[test]
    fn audio_dispose_stops_active_playback() {
        let clip = AudioClip::new(44_100, 2, vec![0.0; 44_100 * 2], 0.8, true, Some(5.0));
        clip.play();
        assert!(clip.is_playing());

        clip.dispose();
        assert!(!clip.is_playing());
        assert!(clip.is_disposed());

        // A disposed clip cannot restart.
        clip.play();
        assert!(!clip.is_playing());
    }

    #[test]
    fn audio_duration_uses_channel_count() {
        let clip = AudioClip::new(48_000, 2, vec![0.0; 48_000 * 2], 1.0, false, None);
        assert!((clip.duration_secs() - 1.0).abs() < f32::EPSILON);
    }
}
