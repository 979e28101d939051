//! WAV decoding via `hound`.

use std::io::Cursor;

use super::downmix_to_mono;
use super::PlaybackError;

/// Mono `f32` PCM ready for resampling.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

/// Decode a WAV file held in memory into mono `f32` samples.
///
/// Integer formats are scaled by their bit depth; float formats are taken
/// as-is.  Multi-channel input is averaged down to mono.
pub fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, PlaybackError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    Ok(DecodedAudio {
        samples: downmix_to_mono(&interleaved, spec.channels),
        sample_rate: spec.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(
        spec: hound::WavSpec,
        write: impl FnOnce(&mut hound::WavWriter<&mut Cursor<Vec<u8>>>),
    ) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            write(&mut writer);
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_16_bit_mono() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |w| {
            w.write_sample(0_i16).unwrap();
            w.write_sample(i16::MAX).unwrap();
            w.write_sample(i16::MIN).unwrap();
        });

        let audio = decode_wav(&bytes).unwrap();
        assert_eq!(audio.sample_rate, 22_050);
        assert_eq!(audio.samples.len(), 3);
        assert!(audio.samples[0].abs() < 1e-6);
        assert!((audio.samples[1] - 1.0).abs() < 1e-3);
        assert!((audio.samples[2] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn decodes_float_stereo_to_mono() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let bytes = wav_bytes(spec, |w| {
            for _ in 0..480 {
                w.write_sample(0.5_f32).unwrap();
                w.write_sample(0.1_f32).unwrap();
            }
        });

        let audio = decode_wav(&bytes).unwrap();
        assert_eq!(audio.samples.len(), 480);
        assert!((audio.samples[0] - 0.3).abs() < 1e-6);
        assert!((audio.duration_secs() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn rejects_non_wav_bytes() {
        assert!(matches!(
            decode_wav(b"definitely not audio"),
            Err(PlaybackError::Decode(_))
        ));
    }
}
