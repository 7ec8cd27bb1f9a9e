//! Offline rendering and WAV export.

use std::path::Path;

use log::info;

use super::mixer::Mixer;
use super::AudioSource;
use crate::error::EngineError;

/// Drive the mixer in lockstep with a tick callback, without a device.
///
/// `on_tick` receives the elapsed time (seconds) before each tick's worth of
/// audio is rendered. Returns interleaved stereo samples.
pub fn render_offline<F>(
    mixer: &mut Mixer,
    duration_s: f64,
    tick_hz: f64,
    mut on_tick: F,
) -> Result<Vec<f32>, EngineError>
where
    F: FnMut(f64) -> Result<(), EngineError>,
{
    if tick_hz.is_nan() || tick_hz <= 0.0 || !duration_s.is_finite() || duration_s < 0.0 {
        return Err(EngineError::Config(format!(
            "cannot render {}s at {} ticks/s",
            duration_s, tick_hz
        )));
    }

    let sample_rate = mixer.sample_rate();
    let total_frames = (duration_s * sample_rate).round() as usize;
    let frames_per_tick = ((sample_rate / tick_hz).round() as usize).max(1);

    let mut samples = vec![0.0; total_frames * 2];
    let mut frame = 0;
    while frame < total_frames {
        on_tick(frame as f64 / sample_rate)?;
        let n = frames_per_tick.min(total_frames - frame);
        mixer.fill(&mut samples[frame * 2..(frame + n) * 2], 2);
        frame += n;
    }
    Ok(samples)
}

/// Render offline and write the result; the samples are returned for analysis
pub fn render_to_wav<P, F>(
    path: P,
    mixer: &mut Mixer,
    duration_s: f64,
    tick_hz: f64,
    on_tick: F,
) -> Result<Vec<f32>, EngineError>
where
    P: AsRef<Path>,
    F: FnMut(f64) -> Result<(), EngineError>,
{
    let samples = render_offline(mixer, duration_s, tick_hz, on_tick)?;
    write_wav(path, &samples, mixer.sample_rate() as u32)?;
    Ok(samples)
}

/// Write interleaved stereo as 32-bit float WAV
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate_hz: u32,
) -> Result<(), EngineError> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: sample_rate_hz,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;

    info!(
        "Wrote {} ({:.1}s)",
        path.as_ref().display(),
        samples.len() as f64 / 2.0 / sample_rate_hz as f64
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AudioConfig, MixLevels, VoicingConfig};
    use crate::state::SnapshotPublisher;

    #[test]
    fn test_tick_callback_cadence() {
        let (_publisher, reader) = SnapshotPublisher::new();
        let mut mixer = Mixer::new(
            &AudioConfig::default(),
            VoicingConfig::default(),
            MixLevels::default(),
            reader,
        );
        let mut ticks = Vec::new();
        let samples = render_offline(&mut mixer, 1.0, 60.0, |t| {
            ticks.push(t);
            Ok(())
        })
        .unwrap();

        assert_eq!(samples.len(), 44100 * 2);
        assert_eq!(ticks.len(), 60);
        assert_eq!(ticks[0], 0.0);
        assert!((ticks[1] - 735.0 / 44100.0).abs() < 1e-12);
    }

    #[test]
    fn test_tick_error_stops_render() {
        let (_publisher, reader) = SnapshotPublisher::new();
        let mut mixer = Mixer::new(
            &AudioConfig::default(),
            VoicingConfig::default(),
            MixLevels::default(),
            reader,
        );
        let result = render_offline(&mut mixer, 1.0, 60.0, |_| {
            Err(EngineError::Config("stop".to_string()))
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_write_wav_round_trip() {
        let path = std::env::temp_dir().join(format!("phidrive-test-{}.wav", std::process::id()));
        let samples = vec![0.25, -0.25, 0.5, -0.5];
        write_wav(&path, &samples, 44100).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        let read: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
        let _ = std::fs::remove_file(&path);
    }
}
