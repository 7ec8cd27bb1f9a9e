//! Live audio output through the default cpal device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use log::{error, info, warn};

use super::mixer::Mixer;
use super::AudioSource;
use crate::error::EngineError;
use crate::params::{AudioConfig, MixLevels, VoicingConfig};
use crate::state::SnapshotReader;

/// Running output stream fed by a `Mixer`
pub struct AudioSystem {
    /// Audio output stream (kept alive until `stop`)
    stream: Option<cpal::Stream>,
}

impl AudioSystem {
    /// Open the default output device and start streaming.
    ///
    /// The mixer runs at the device's own sample rate; the configured rate
    /// only applies to offline rendering.
    pub fn start(
        audio: &AudioConfig,
        voicing: VoicingConfig,
        levels: MixLevels,
        reader: SnapshotReader,
    ) -> Result<Self, EngineError> {
        audio.validate().map_err(EngineError::Config)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(EngineError::NoOutputDevice)?;

        let supported = device
            .default_output_config()
            .map_err(|e| EngineError::Device(format!("Failed to get audio config: {}", e)))?;

        let sample_rate_hz = supported.sample_rate().0;
        let channels = supported.channels();
        let sample_format = supported.sample_format();

        info!(
            "Audio: {} @ {}Hz, {} channels, {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate_hz,
            channels,
            sample_format
        );

        let device_audio = AudioConfig {
            sample_rate_hz,
            ..audio.clone()
        };
        let mixer = Mixer::new(&device_audio, voicing, levels, reader);
        let config: cpal::StreamConfig = supported.into();

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, mixer, audio.max_chunk_frames),
            SampleFormat::I16 => build_stream::<i16>(&device, &config, mixer, audio.max_chunk_frames),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, mixer, audio.max_chunk_frames),
            other => Err(EngineError::Device(format!(
                "Unsupported sample format: {:?}",
                other
            ))),
        }?;

        stream
            .play()
            .map_err(|e| EngineError::Stream(format!("Failed to start audio stream: {}", e)))?;

        Ok(Self {
            stream: Some(stream),
        })
    }

    /// Stop and release the stream. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Failed to pause audio stream: {}", e);
            }
            drop(stream);
            info!("Audio stopped");
        }
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Build an output stream for a device sample type.
///
/// The mixer renders f32 into a preallocated scratch buffer which is then
/// converted; device buffers of any size are processed in scratch-sized
/// pieces.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: Mixer,
    chunk_frames: usize,
) -> Result<cpal::Stream, EngineError>
where
    T: Sample + FromSample<f32> + SizedSample,
{
    let channels = config.channels.max(1) as usize;
    let mut scratch = vec![0.0f32; chunk_frames.max(1) * channels];

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for block in data.chunks_mut(scratch.len()) {
                    let rendered = &mut scratch[..block.len()];
                    mixer.fill(rendered, channels);
                    for (out, sample) in block.iter_mut().zip(rendered.iter()) {
                        *out = T::from_sample(*sample);
                    }
                }
            },
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| EngineError::Stream(format!("Failed to build audio stream: {}", e)))
}
