//! Discrete engine events and the speech collaborator seam.
//!
//! Events are queued by the tick context and drained by whoever owns the
//! receiver. Text is only formatted here, never in the audio context.

use log::info;

use crate::audio::ChimeTrigger;
use crate::harmony::{BonusKind, DimPair, HarmonicRatioDef, SolfeggioDef};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A pair entered an interval (or switched to a different one)
    HarmonicDetected {
        pair: DimPair,
        ratio: &'static HarmonicRatioDef,
        bonus: BonusKind,
    },
    /// A pair's interval lapsed
    HarmonicLost {
        pair: DimPair,
        ratio: &'static HarmonicRatioDef,
    },
    /// A dimension landed on a solfeggio tone
    SolfeggioMatched {
        tone: &'static SolfeggioDef,
        dim: usize,
    },
    /// Temple band entered (`true`) or left (`false`)
    TempleResonance { active: bool },
    /// A dimension crossed the perfect-resonance threshold
    PerfectResonance { dim: usize },
    /// One-shot sound request, also played by the built-in mixer
    Chime(ChimeTrigger),
}

impl EngineEvent {
    /// Spoken text for the speech collaborator, if the event has any
    pub fn announcement(&self) -> Option<String> {
        match self {
            Self::HarmonicDetected { pair, ratio, .. } => Some(format!(
                "{} harmonic detected between dimension {} and dimension {}.",
                ratio.label,
                pair.a + 1,
                pair.b + 1
            )),
            Self::HarmonicLost { pair, ratio } => Some(format!(
                "{} harmonic between dimension {} and dimension {} faded.",
                ratio.label,
                pair.a + 1,
                pair.b + 1
            )),
            Self::SolfeggioMatched { tone, .. } => Some(format!(
                "Solfeggio {} frequency detected. {}.",
                tone.name,
                capitalize(tone.description)
            )),
            Self::TempleResonance { active: true } => Some(
                "Temple resonance detected. Ancient healing frequency 110 hertz active."
                    .to_string(),
            ),
            Self::TempleResonance { active: false } => Some("Temple resonance faded.".to_string()),
            Self::PerfectResonance { .. } | Self::Chime(_) => None,
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Receiver of spoken announcements (screen reader, TTS engine, log)
pub trait Announcer {
    fn announce(&mut self, text: &str);
}

/// Announcer that writes to the log
#[derive(Debug, Default)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&mut self, text: &str) {
        info!("{}", text);
    }
}

/// Announce every event that has text; returns how many were announced
pub fn announce_all<A, I>(announcer: &mut A, events: I) -> usize
where
    A: Announcer + ?Sized,
    I: IntoIterator<Item = EngineEvent>,
{
    let mut count = 0;
    for event in events {
        if let Some(text) = event.announcement() {
            announcer.announce(&text);
            count += 1;
        }
    }
    count
}
