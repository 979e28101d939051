//! Speaker output via `cpal`.
//!
//! [`AudioPlayer`] wraps the cpal host/device/stream lifecycle for the
//! default output device.  Each [`AudioPlayer::play`] call decodes a clip,
//! converts it to the device rate and starts a fresh output stream; the
//! previous stream (if any) is dropped, which stops it.
//!
//! `cpal::Stream` is not `Send` on every platform, so the player lives on
//! the UI thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::{decode_wav, resample, PlaybackError};
use crate::speech::AudioClip;

/// RAII guard for one playing clip.  Dropping it stops the stream.
struct ActivePlayback {
    _stream: cpal::Stream,
    finished: Arc<AtomicBool>,
}

/// Default-output-device player.
pub struct AudioPlayer {
    device: cpal::Device,
    config: cpal::StreamConfig,
    /// Native sample rate of the output device (Hz).
    sample_rate: u32,
    /// Interleaved channel count of the output device.
    channels: u16,
    active: Option<ActivePlayback>,
}

impl AudioPlayer {
    /// Open the system default output device with its preferred config.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::NoDevice`] when no output device is available, or
    /// [`PlaybackError::DefaultConfig`] when it cannot report a config.
    pub fn new() -> Result<Self, PlaybackError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlaybackError::NoDevice)?;

        let supported = device.default_output_config()?;
        let channels = supported.channels();
        let sample_rate = supported.sample_rate().0;
        let config: cpal::StreamConfig = supported.into();

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
            active: None,
        })
    }

    /// Decode `clip` and start playing it, replacing any clip in progress.
    pub fn play(&mut self, clip: &AudioClip) -> Result<(), PlaybackError> {
        let decoded = decode_wav(&clip.bytes)?;
        let samples = resample(&decoded.samples, decoded.sample_rate, self.sample_rate);

        self.stop();

        log::debug!(
            "playback: {:.1}s clip at {} Hz → device {} Hz × {} ch",
            decoded.duration_secs(),
            decoded.sample_rate,
            self.sample_rate,
            self.channels
        );

        let finished = Arc::new(AtomicBool::new(false));
        let finished_cb = Arc::clone(&finished);
        let channels = self.channels.max(1) as usize;
        let mut position = 0usize;

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value = match samples.get(position) {
                        Some(&s) => {
                            position += 1;
                            s
                        }
                        None => {
                            finished_cb.store(true, Ordering::Relaxed);
                            0.0
                        }
                    };
                    frame.fill(value);
                }
            },
            |err: cpal::StreamError| {
                log::error!("cpal output stream error: {err}");
            },
            None,
        )?;

        stream.play()?;
        self.active = Some(ActivePlayback {
            _stream: stream,
            finished,
        });
        Ok(())
    }

    /// Stop the clip in progress, if any.
    pub fn stop(&mut self) {
        self.active = None;
    }

    /// `true` while a clip still has samples left to play.
    pub fn is_playing(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }
}
