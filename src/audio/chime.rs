//! One-shot chimes: synthesized waveforms and a small voice pool.
//!
//! Waveforms are rendered once at construction. Starting a chime only
//! claims a voice and resets its read position, so the audio context
//! never allocates.

use std::f64::consts::TAU;

use crate::params::{audio_constants::CHIME_SLOTS, audio_constants::CHIME_VOICES, PHI};
use crate::state::ChimeSlot;

/// Identifies a chime sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChimeId {
    Octave,
    Fifth,
    Fourth,
    MajorThird,
    MinorThird,
    MajorSixth,
    MinorSixth,
    Tritone,
    Golden,
    /// Short high blip for a perfectly tuned dimension
    Ping,
}

impl ChimeId {
    pub const ALL: [ChimeId; 10] = [
        ChimeId::Octave,
        ChimeId::Fifth,
        ChimeId::Fourth,
        ChimeId::MajorThird,
        ChimeId::MinorThird,
        ChimeId::MajorSixth,
        ChimeId::MinorSixth,
        ChimeId::Tritone,
        ChimeId::Golden,
        ChimeId::Ping,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn recipe(self) -> &'static ChimeRecipe {
        &CHIME_RECIPES[self.index()]
    }
}

/// Request to play a chime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChimeTrigger {
    pub chime: ChimeId,
    /// Stereo position in [-1, 1]
    pub pan: f32,
    /// Linear gain
    pub amplitude: f32,
}

impl ChimeTrigger {
    /// Equal-power channel gains for the trigger's pan
    pub fn channel_gains(&self) -> (f32, f32) {
        let pan = self.pan.clamp(-1.0, 1.0);
        let left = ((1.0 - pan) * 0.5).sqrt();
        let right = ((1.0 + pan) * 0.5).sqrt();
        (left * self.amplitude, right * self.amplitude)
    }
}

/// Additive recipe: partials (Hz, relative amplitude) under an exponential decay
#[derive(Debug, Clone, Copy)]
pub struct ChimeRecipe {
    pub duration_s: f64,
    pub decay_s: f64,
    pub gain: f64,
    pub partials: &'static [(f64, f64)],
}

const C5: f64 = 523.25;

const fn chime(partials: &'static [(f64, f64)]) -> ChimeRecipe {
    ChimeRecipe {
        duration_s: 0.4,
        decay_s: 0.15,
        gain: 0.15,
        partials,
    }
}

const OCTAVE: &[(f64, f64)] = &[(C5, 1.0), (1046.5, 0.5)];
const FIFTH: &[(f64, f64)] = &[(C5, 1.0), (783.99, 0.7)];
const FOURTH: &[(f64, f64)] = &[(C5, 1.0), (698.46, 0.7)];
const MAJOR_THIRD: &[(f64, f64)] = &[(C5, 1.0), (659.25, 0.7)];
const MINOR_THIRD: &[(f64, f64)] = &[(C5, 1.0), (622.25, 0.7)];
const MAJOR_SIXTH: &[(f64, f64)] = &[(C5, 1.0), (880.0, 0.6)];
const MINOR_SIXTH: &[(f64, f64)] = &[(C5, 1.0), (830.6, 0.6)];
const TRITONE: &[(f64, f64)] = &[(C5, 1.0), (739.99, 0.8), (261.63, 0.1)];
const GOLDEN: &[(f64, f64)] = &[(432.0, 1.0), (432.0 * PHI, 0.6), (432.0 * PHI * PHI, 0.3)];
const PING: &[(f64, f64)] = &[(1200.0, 1.0)];

/// Indexed by `ChimeId::index`
const CHIME_RECIPES: [ChimeRecipe; 10] = [
    chime(OCTAVE),
    chime(FIFTH),
    chime(FOURTH),
    chime(MAJOR_THIRD),
    chime(MINOR_THIRD),
    chime(MAJOR_SIXTH),
    chime(MINOR_SIXTH),
    chime(TRITONE),
    chime(GOLDEN),
    ChimeRecipe {
        duration_s: 0.2,
        decay_s: 0.05,
        gain: 0.2,
        partials: PING,
    },
];

/// Prerendered mono waveforms for every chime
#[derive(Debug, Clone)]
pub struct ChimeBank {
    waves: Vec<Vec<f32>>,
}

impl ChimeBank {
    pub fn new(sample_rate: f64) -> Self {
        let waves = ChimeId::ALL
            .iter()
            .map(|id| synthesize(id.recipe(), sample_rate))
            .collect();
        Self { waves }
    }

    pub fn wave(&self, chime: ChimeId) -> &[f32] {
        &self.waves[chime.index()]
    }
}

fn synthesize(recipe: &ChimeRecipe, sample_rate: f64) -> Vec<f32> {
    let len = (recipe.duration_s * sample_rate).round() as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate;
            let tone: f64 = recipe
                .partials
                .iter()
                .map(|(hz, amp)| amp * (TAU * hz * t).sin())
                .sum();
            (tone * (-t / recipe.decay_s).exp() * recipe.gain) as f32
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct ChimeVoice {
    chime: ChimeId,
    position: usize,
    left: f32,
    right: f32,
}

/// Fixed pool of sounding chimes.
///
/// Triggers arrive as sequence-numbered snapshot slots; each sequence
/// number starts exactly one voice. When the pool is full the voice that
/// has played longest is stolen.
#[derive(Debug, Clone)]
pub struct ChimePlayer {
    bank: ChimeBank,
    voices: [Option<ChimeVoice>; CHIME_VOICES],
    last_seq: u64,
}

impl ChimePlayer {
    pub fn new(bank: ChimeBank) -> Self {
        Self {
            bank,
            voices: [None; CHIME_VOICES],
            last_seq: 0,
        }
    }

    /// Treat every trigger up to `seq` as already played
    pub fn skip_through(&mut self, seq: u64) {
        self.last_seq = self.last_seq.max(seq);
    }

    /// Start voices for triggers newer than the last one seen, oldest first
    pub fn start_pending(&mut self, slots: &[Option<ChimeSlot>; CHIME_SLOTS]) {
        let newest = slots.iter().flatten().map(|s| s.seq).max().unwrap_or(0);
        if newest <= self.last_seq {
            return;
        }
        let window_start = newest.saturating_sub(CHIME_SLOTS as u64 - 1);
        let first = (self.last_seq + 1).max(window_start);
        for seq in first..=newest {
            if let Some(slot) = slots[(seq % CHIME_SLOTS as u64) as usize] {
                if slot.seq == seq {
                    self.start(slot);
                }
            }
        }
        self.last_seq = newest;
    }

    fn start(&mut self, slot: ChimeSlot) {
        let (left, right) = slot.trigger.channel_gains();
        let voice = ChimeVoice {
            chime: slot.trigger.chime,
            position: 0,
            left,
            right,
        };
        let index = match self.voices.iter().position(Option::is_none) {
            Some(free) => free,
            None => self
                .voices
                .iter()
                .enumerate()
                .max_by_key(|(_, v)| v.map(|v| v.position).unwrap_or(0))
                .map(|(i, _)| i)
                .unwrap_or(0),
        };
        self.voices[index] = Some(voice);
    }

    /// Add every sounding chime into the channel buffers
    pub fn mix_into(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        for slot in self.voices.iter_mut() {
            let Some(voice) = slot.as_mut() else { continue };
            let wave = self.bank.wave(voice.chime);
            let remaining = wave.len().saturating_sub(voice.position);
            let n = remaining.min(frames);
            let segment = &wave[voice.position..voice.position + n];
            for (i, s) in segment.iter().enumerate() {
                left[i] += s * voice.left;
                right[i] += s * voice.right;
            }
            voice.position += n;
            if voice.position >= wave.len() {
                *slot = None;
            }
        }
    }

    /// Number of chimes currently sounding
    pub fn active(&self) -> usize {
        self.voices.iter().filter(|v| v.is_some()).count()
    }

    pub fn reset(&mut self) {
        self.voices = [None; CHIME_VOICES];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 44100.0;

    fn slot(seq: u64, chime: ChimeId) -> ChimeSlot {
        ChimeSlot {
            seq,
            trigger: ChimeTrigger {
                chime,
                pan: 0.0,
                amplitude: 1.0,
            },
        }
    }

    fn slots_with(entries: &[ChimeSlot]) -> [Option<ChimeSlot>; CHIME_SLOTS] {
        let mut slots = [None; CHIME_SLOTS];
        for entry in entries {
            slots[(entry.seq % CHIME_SLOTS as u64) as usize] = Some(*entry);
        }
        slots
    }

    #[test]
    fn test_waveform_lengths() {
        let bank = ChimeBank::new(SR);
        assert_eq!(bank.wave(ChimeId::Octave).len(), 17640);
        assert_eq!(bank.wave(ChimeId::Ping).len(), 8820);
    }

    #[test]
    fn test_waveforms_decay() {
        let bank = ChimeBank::new(SR);
        for id in ChimeId::ALL {
            let wave = bank.wave(id);
            let head = wave[..1000].iter().fold(0.0f32, |m, s| m.max(s.abs()));
            let tail = wave[wave.len() - 1000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
            assert!(tail < head * 0.2, "{:?} does not decay", id);
        }
    }

    #[test]
    fn test_equal_power_pan() {
        let trigger = ChimeTrigger {
            chime: ChimeId::Fifth,
            pan: 0.0,
            amplitude: 1.0,
        };
        let (l, r) = trigger.channel_gains();
        assert!((l * l + r * r - 1.0).abs() < 1e-6);

        let hard_left = ChimeTrigger { pan: -1.0, ..trigger };
        assert_eq!(hard_left.channel_gains(), (1.0, 0.0));
    }

    #[test]
    fn test_each_sequence_starts_once() {
        let mut player = ChimePlayer::new(ChimeBank::new(SR));
        let slots = slots_with(&[slot(1, ChimeId::Octave), slot(2, ChimeId::Golden)]);
        player.start_pending(&slots);
        assert_eq!(player.active(), 2);

        // Same snapshot seen again starts nothing new
        player.start_pending(&slots);
        assert_eq!(player.active(), 2);
    }

    #[test]
    fn test_skipped_history_is_not_replayed() {
        let mut player = ChimePlayer::new(ChimeBank::new(SR));
        player.skip_through(2);
        let slots = slots_with(&[slot(1, ChimeId::Octave), slot(2, ChimeId::Golden)]);
        player.start_pending(&slots);
        assert_eq!(player.active(), 0);
    }

    #[test]
    fn test_pool_steals_oldest() {
        let mut player = ChimePlayer::new(ChimeBank::new(SR));
        let mut left = vec![0.0; 64];
        let mut right = vec![0.0; 64];
        for seq in 1..=CHIME_VOICES as u64 {
            player.start_pending(&slots_with(&[slot(seq, ChimeId::Fourth)]));
            player.mix_into(&mut left, &mut right);
        }
        assert_eq!(player.active(), CHIME_VOICES);

        player.start_pending(&slots_with(&[slot(CHIME_VOICES as u64 + 1, ChimeId::Ping)]));
        assert_eq!(player.active(), CHIME_VOICES);
        assert!(player.voices.iter().flatten().any(|v| v.chime == ChimeId::Ping));
    }

    #[test]
    fn test_voice_frees_after_waveform_ends() {
        let mut player = ChimePlayer::new(ChimeBank::new(SR));
        player.start_pending(&slots_with(&[slot(1, ChimeId::Ping)]));
        let mut left = vec![0.0; 4096];
        let mut right = vec![0.0; 4096];
        for _ in 0..3 {
            player.mix_into(&mut left, &mut right);
        }
        assert_eq!(player.active(), 0);
    }
}
