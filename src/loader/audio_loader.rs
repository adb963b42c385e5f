use std::io::Cursor;

use crate::error::{LoadErrorKind, decode_error};
use crate::io::source::AssetSource;
use crate::manifest::AudioDescriptor;
use crate::resources::media::AudioClip;

pub struct AudioLoader {}

impl AudioLoader {
    /// Decodes a WAV payload into normalized f32 frames and binds the
    /// descriptor's playback options to the handle.
    pub fn load(
        descriptor: &AudioDescriptor,
        source: &dyn AssetSource,
    ) -> Result<AudioClip, LoadErrorKind> {
        let bytes = source.fetch(&descriptor.locator)?;
        let mut reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| decode_error(format!("wav parse: {}", e)))?;
        let spec = reader.spec();

        let frames: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| decode_error(format!("wav samples: {}", e)))?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 / max))
                    .collect::<Result<_, _>>()
                    .map_err(|e| decode_error(format!("wav samples: {}", e)))?
            }
        };

        Ok(AudioClip::new(
            spec.sample_rate,
            spec.channels,
            frames,
            descriptor.volume,
            descriptor.looping,
            descriptor.radius,
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::io::source::MemoryAssetSource;

    /// Mono 16-bit WAV written through the same crate that decodes it.
    pub(crate) fn wav_bytes(sample_count: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut bytes = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut bytes, spec).expect("wav writer");
        for i in 0..sample_count {
            writer
                .write_sample(if i % 2 == 0 { i16::MAX / 2 } else { 0 })
                .expect("sample writes");
        }
        writer.finalize().expect("wav finalizes");
        bytes.into_inner()
    }

    fn descriptor() -> AudioDescriptor {
        AudioDescriptor {
            name: "steps".to_owned(),
            locator: "audio/steps.wav".to_owned(),
            volume: 0.7,
            looping: true,
            radius: Some(12.0),
        }
    }

    #[test]
    fn decodes_pcm_and_binds_options() {
        let source = MemoryAssetSource::new();
        source.insert("audio/steps.wav", wav_bytes(64));

        let clip = AudioLoader::load(&descriptor(), &source).expect("wav loads");
        assert_eq!(clip.sample_rate(), 22_050);
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.frames().len(), 64);
        assert_eq!(clip.volume, 0.7);
        assert!(clip.looping);
        assert_eq!(clip.radius, Some(12.0));
        // 16-bit normalization keeps samples inside [-1, 1].
        assert!(clip.frames().iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn truncated_payload_is_a_decode_failure() {
        let source = MemoryAssetSource::new();
        source.insert("audio/steps.wav", vec![0u8; 10]);
        assert!(matches!(
            AudioLoader::load(&descriptor(), &source),
            Err(LoadErrorKind::Decode(_))
        ));
    }
}
