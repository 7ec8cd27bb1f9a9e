//! Real-time mixer: turns the latest snapshot into interleaved samples.
//!
//! Signal flow per chunk:
//! 1. Drive voices, each panned by its dimension weights
//! 2. Intermodulation tones for active harmonic pairs, panned to the pair midpoint
//! 3. Golden drone and chimes
//! 4. Master volume
//! 5. Schumann carrier
//! 6. Soft limiter, then hard clip to [-1, 1]
//!
//! All scratch buffers are sized at construction; rendering never allocates,
//! never blocks and never panics on the audio thread.

use log::warn;

use super::ambient::AmbientBed;
use super::chime::{ChimeBank, ChimePlayer};
use super::intermod::IntermodBank;
use super::limiter::SoftLimiter;
use super::oscillator::{DriveVoice, VoiceParams};
use super::AudioSource;
use crate::harmony::DIMENSION_PAIRS;
use crate::params::{AudioConfig, MixLevels, VoicingConfig, N_DIMENSIONS, N_PAIRS};
use crate::state::{PanWeights, Snapshot, SnapshotReader};

/// Dimensions that carry the slow tremolo
const TREMOLO_DIMS: [bool; N_DIMENSIONS] = [false, false, false, true, true];

pub struct Mixer {
    sample_rate: f64,
    chunk_frames: usize,
    voicing: VoicingConfig,
    levels: MixLevels,
    reader: SnapshotReader,

    voices: [DriveVoice; N_DIMENSIONS],
    intermod: IntermodBank,
    intermod_active: [bool; N_PAIRS],
    chimes: ChimePlayer,
    ambient: AmbientBed,
    limiter: SoftLimiter,

    voice_buffer: Vec<f32>,
    left: Vec<f32>,
    right: Vec<f32>,

    silenced_chunks: u64,
}

impl Mixer {
    /// Build a mixer reading from `reader`.
    ///
    /// Chimes already present in the reader's latest snapshot are treated
    /// as played, so a restarted stream does not replay old triggers.
    pub fn new(
        audio: &AudioConfig,
        voicing: VoicingConfig,
        levels: MixLevels,
        mut reader: SnapshotReader,
    ) -> Self {
        let sample_rate = audio.sample_rate_hz.max(1) as f64;
        let chunk_frames = audio.max_chunk_frames.max(1);

        let mut chimes = ChimePlayer::new(ChimeBank::new(sample_rate));
        let seen = reader
            .latest()
            .chimes
            .iter()
            .flatten()
            .map(|slot| slot.seq)
            .max()
            .unwrap_or(0);
        chimes.skip_through(seen);

        let voices = std::array::from_fn(|dim| DriveVoice::new(sample_rate, TREMOLO_DIMS[dim]));

        Self {
            sample_rate,
            chunk_frames,
            ambient: AmbientBed::new(&voicing, sample_rate),
            limiter: SoftLimiter::new(
                voicing.limiter_threshold,
                voicing.limiter_release_s,
                sample_rate,
            ),
            voicing,
            levels,
            reader,
            voices,
            intermod: IntermodBank::new(sample_rate),
            intermod_active: [false; N_PAIRS],
            chimes,
            voice_buffer: vec![0.0; chunk_frames],
            left: vec![0.0; chunk_frames],
            right: vec![0.0; chunk_frames],
            silenced_chunks: 0,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Chunks replaced by silence after a non-finite sample
    pub fn silenced_chunks(&self) -> u64 {
        self.silenced_chunks
    }

    /// Render `frames` (<= chunk size) into the internal channel buffers
    fn render_chunk(&mut self, snapshot: &Snapshot, frames: usize) {
        let left = &mut self.left[..frames];
        let right = &mut self.right[..frames];
        left.fill(0.0);
        right.fill(0.0);

        if !snapshot.is_live() {
            return;
        }

        let scratch = &mut self.voice_buffer[..frames];

        for (dim, voice) in self.voices.iter_mut().enumerate() {
            let state = &snapshot.dims[dim];
            let params = VoiceParams {
                drive_hz: state.drive_hz,
                resonance: state.resonance,
                volume: snapshot.drive_volume,
            };
            voice.render(params, &self.voicing, scratch);
            add_panned(scratch, state.pan, left, right);
        }

        let intermod_amp = self.voicing.intermod_depth * snapshot.drive_volume;
        for (slot, active) in snapshot.harmonics.iter().enumerate() {
            if active.is_none() {
                if self.intermod_active[slot] {
                    self.intermod.reset_pair(slot);
                    self.intermod_active[slot] = false;
                }
                continue;
            }
            self.intermod_active[slot] = true;
            let pair = DIMENSION_PAIRS[slot];
            let (a, b) = (&snapshot.dims[pair.a], &snapshot.dims[pair.b]);
            self.intermod
                .render(slot, a.drive_hz, b.drive_hz, intermod_amp, scratch);
            add_panned(scratch, PanWeights::average(a.pan, b.pan), left, right);
        }

        self.chimes.start_pending(&snapshot.chimes);
        self.chimes.mix_into(left, right);

        let master = self.levels.master_volume;
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (drone, carrier) = self.ambient.next();
            *l = (*l + drone) * master + carrier;
            *r = (*r + drone) * master + carrier;
        }

        if left.iter().chain(right.iter()).any(|s| !s.is_finite()) {
            left.fill(0.0);
            right.fill(0.0);
            self.silence_recovery();
            return;
        }

        self.limiter.process_buffers(left, right);
        for s in left.iter_mut().chain(right.iter_mut()) {
            *s = s.clamp(-1.0, 1.0);
        }
    }

    fn silence_recovery(&mut self) {
        self.silenced_chunks += 1;
        self.voices.iter_mut().for_each(DriveVoice::reset);
        self.intermod.reset();
        self.ambient.reset();
        self.limiter.reset();
        if self.silenced_chunks == 1 {
            warn!("Non-finite audio detected, chunk replaced with silence");
        }
    }
}

impl AudioSource for Mixer {
    fn fill(&mut self, out: &mut [f32], channels: usize) {
        if channels == 0 {
            out.fill(0.0);
            return;
        }
        let snapshot = *self.reader.latest();
        let frames = out.len() / channels;
        let mut done = 0;
        while done < frames {
            let n = (frames - done).min(self.chunk_frames);
            self.render_chunk(&snapshot, n);
            let block = &mut out[done * channels..(done + n) * channels];
            for (i, frame) in block.chunks_exact_mut(channels).enumerate() {
                let (l, r) = (self.left[i], self.right[i]);
                match frame {
                    [mono] => *mono = 0.5 * (l + r),
                    [fl, fr, rest @ ..] => {
                        *fl = l;
                        *fr = r;
                        rest.fill(0.0);
                    }
                    [] => {}
                }
            }
            done += n;
        }
        // Trailing partial frame
        out[frames * channels..].fill(0.0);
    }
}

#[inline]
fn add_panned(source: &[f32], pan: PanWeights, left: &mut [f32], right: &mut [f32]) {
    for ((s, l), r) in source.iter().zip(left.iter_mut()).zip(right.iter_mut()) {
        *l += s * pan.left;
        *r += s * pan.right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ChimeId, ChimeTrigger};
    use crate::state::{ChimeSlot, SnapshotPublisher, DIMENSION_PANS};

    fn live_snapshot(drives: [f32; N_DIMENSIONS], volume: f32) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (dim, drive) in drives.iter().enumerate() {
            snapshot.dims[dim].drive_hz = *drive;
            snapshot.dims[dim].target_hz = *drive;
            snapshot.dims[dim].resonance = 1.0;
            snapshot.dims[dim].pan = DIMENSION_PANS[dim];
        }
        snapshot.drive_volume = volume;
        snapshot
    }

    fn mixer(reader: SnapshotReader) -> Mixer {
        Mixer::new(
            &AudioConfig::default(),
            VoicingConfig::default(),
            MixLevels::default(),
            reader,
        )
    }

    #[test]
    fn test_silent_before_first_publish() {
        let (_publisher, reader) = SnapshotPublisher::new();
        let mut mixer = mixer(reader);
        let mut out = vec![1.0; 2048];
        mixer.fill(&mut out, 2);
        assert!(out.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_output_is_clamped_and_finite() {
        let (mut publisher, reader) = SnapshotPublisher::new();
        let mut mixer = mixer(reader);
        publisher.publish(live_snapshot([200.0, 300.0, 400.0, 500.0, 600.0], 1.0));

        let mut out = vec![0.0; 8192];
        mixer.fill(&mut out, 2);
        assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
        assert!(out.iter().any(|s| s.abs() > 0.05));
    }

    #[test]
    fn test_mono_and_surround_layouts() {
        let (mut publisher, reader) = SnapshotPublisher::new();
        let mut mono = mixer(reader);
        let mut surround = mixer(publisher.reader());
        publisher.publish(live_snapshot([250.0, 350.0, 450.0, 550.0, 650.0], 0.2));

        let mut out = vec![0.0; 1000];
        mono.fill(&mut out, 1);
        assert!(out.iter().any(|s| *s != 0.0));

        let mut out = vec![1.0; 6 * 300];
        surround.fill(&mut out, 6);
        for frame in out.chunks_exact(6) {
            assert!(frame[2..].iter().all(|s| *s == 0.0));
        }
    }

    #[test]
    fn test_large_buffer_is_chunked_seamlessly() {
        let (mut publisher, reader) = SnapshotPublisher::new();
        let mut whole = mixer(reader);
        let mut split = mixer(publisher.reader());
        publisher.publish(live_snapshot([210.0, 330.0, 470.0, 590.0, 710.0], 0.1));

        // 3000 frames spans several internal chunks
        let mut reference = vec![0.0; 6000];
        whole.fill(&mut reference, 2);
        let mut a = vec![0.0; 2000];
        let mut b = vec![0.0; 4000];
        split.fill(&mut a, 2);
        split.fill(&mut b, 2);
        for (x, y) in reference.iter().zip(a.iter().chain(b.iter())) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_non_finite_input_becomes_silence() {
        let (mut publisher, reader) = SnapshotPublisher::new();
        let mut mixer = mixer(reader);
        publisher.publish(live_snapshot([300.0, 300.0, 300.0, 300.0, f32::NAN], 0.5));

        let mut out = vec![1.0; 1024];
        mixer.fill(&mut out, 2);
        assert!(out.iter().all(|s| *s == 0.0));
        assert!(mixer.silenced_chunks() > 0);
    }

    #[test]
    fn test_chime_published_after_start_plays_once() {
        let (mut publisher, reader) = SnapshotPublisher::new();
        let mut mixer = mixer(reader);
        let mut snapshot = live_snapshot([200.0; N_DIMENSIONS], 0.0);
        snapshot.chimes[1] = Some(ChimeSlot {
            seq: 1,
            trigger: ChimeTrigger {
                chime: ChimeId::Octave,
                pan: 0.0,
                amplitude: 1.0,
            },
        });
        publisher.publish(snapshot);

        let mut out = vec![0.0; 2048];
        mixer.fill(&mut out, 2);
        assert_eq!(mixer.chimes.active(), 1);
        assert!(out.iter().any(|s| s.abs() > 0.02));

        // Republishing the same trigger does not restart it
        publisher.publish(snapshot);
        mixer.fill(&mut out, 2);
        assert_eq!(mixer.chimes.active(), 1);
    }

    #[test]
    fn test_stale_chimes_skipped_on_start() {
        let (mut publisher, _) = SnapshotPublisher::new();
        let mut snapshot = live_snapshot([200.0; N_DIMENSIONS], 0.0);
        snapshot.chimes[3] = Some(ChimeSlot {
            seq: 3,
            trigger: ChimeTrigger {
                chime: ChimeId::Golden,
                pan: 0.0,
                amplitude: 1.0,
            },
        });
        publisher.publish(snapshot);

        let mut mixer = mixer(publisher.reader());
        let mut out = vec![0.0; 512];
        mixer.fill(&mut out, 2);
        assert_eq!(mixer.chimes.active(), 0);
    }
}
