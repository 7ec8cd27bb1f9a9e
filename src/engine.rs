//! Tick-context engine: validates game input, derives resonance, runs the
//! detectors and publishes a snapshot for the audio context.

use std::sync::mpsc::{self, Receiver, Sender};

use log::{info, warn};

use crate::audio::{ChimeId, ChimeTrigger};
use crate::error::EngineError;
use crate::events::EngineEvent;
use crate::harmony::{
    ActiveHarmonic, HarmonicDetector, HarmonicTransition, SolfeggioDef, SolfeggioDetector,
    SolfeggioMatch, TempleMonitor,
};
use crate::params::{
    audio_constants::CHIME_SLOTS, DetectionConfig, FrequencyRange, MixLevels, N_DIMENSIONS, N_PAIRS,
};
use crate::resonance::{resonance, validate_frequency, validate_width};
use crate::state::{
    ChimeSlot, DimensionState, PanWeights, Snapshot, SnapshotPublisher, SnapshotReader, TickInput,
    DIMENSION_PANS,
};

/// Everything the engine needs at construction
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub detection: DetectionConfig,
    pub range: FrequencyRange,
    pub levels: MixLevels,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.detection.validate()?;
        self.range.validate()?;
        Ok(())
    }
}

pub struct ResonanceEngine {
    range: FrequencyRange,
    perfect_threshold: f32,
    effect_volume: f32,

    harmonics: HarmonicDetector,
    solfeggio: SolfeggioDetector,
    temple: TempleMonitor,

    dims: [DimensionState; N_DIMENSIONS],
    perfect: [bool; N_DIMENSIONS],
    last_snapshot: Snapshot,

    chimes: [Option<ChimeSlot>; CHIME_SLOTS],
    chime_seq: u64,

    publisher: SnapshotPublisher,
    events: Sender<EngineEvent>,
    receiver_gone: bool,

    harmonic_scratch: Vec<HarmonicTransition>,
    solfeggio_scratch: Vec<SolfeggioMatch>,
}

impl ResonanceEngine {
    /// Create an engine and the receiving end of its event queue
    pub fn new(config: EngineConfig) -> Result<(Self, Receiver<EngineEvent>), EngineError> {
        config.validate().map_err(EngineError::Config)?;

        info!(
            "Engine: drives {}-{} Hz, detection every {}s, bonus window {}s",
            config.range.min_hz,
            config.range.max_hz,
            config.detection.interval_s,
            config.detection.bonus_duration_s
        );

        let (publisher, _) = SnapshotPublisher::new();
        let (tx, rx) = mpsc::channel();
        let idle = Snapshot::default();

        let engine = Self {
            range: config.range,
            perfect_threshold: config.detection.perfect_resonance,
            effect_volume: config.levels.effect_volume,
            harmonics: HarmonicDetector::new(&config.detection),
            solfeggio: SolfeggioDetector::new(&config.detection),
            temple: TempleMonitor::new(&config.detection),
            dims: idle.dims,
            perfect: [false; N_DIMENSIONS],
            last_snapshot: idle,
            chimes: [None; CHIME_SLOTS],
            chime_seq: 0,
            publisher,
            events: tx,
            receiver_gone: false,
            harmonic_scratch: Vec::with_capacity(N_PAIRS),
            solfeggio_scratch: Vec::new(),
        };
        Ok((engine, rx))
    }

    /// A new reader of the published snapshots (one per audio stream)
    pub fn reader(&self) -> SnapshotReader {
        self.publisher.reader()
    }

    /// Advance one game tick.
    ///
    /// Rejects the whole tick without changing state if any width is not
    /// positive or any frequency is not finite. Returns the resonance of
    /// each dimension.
    pub fn tick(
        &mut self,
        now_s: f64,
        input: &TickInput,
    ) -> Result<[f32; N_DIMENSIONS], EngineError> {
        let dims = self.validate(input)?;
        if !input.drive_volume.is_finite() {
            return Err(EngineError::Config(format!(
                "drive volume must be finite, got {}",
                input.drive_volume
            )));
        }
        let drive_volume = input.drive_volume.clamp(0.0, 1.0);

        self.dims = dims;
        let drives = dims.map(|d| d.drive_hz);

        let mut transitions = std::mem::take(&mut self.harmonic_scratch);
        transitions.clear();
        self.harmonics.update(now_s, &drives, &mut transitions);
        for transition in &transitions {
            self.on_harmonic(*transition);
        }
        self.harmonic_scratch = transitions;

        let mut matches = std::mem::take(&mut self.solfeggio_scratch);
        matches.clear();
        self.solfeggio.update(now_s, &drives, &mut matches);
        for found in &matches {
            self.emit(EngineEvent::SolfeggioMatched {
                tone: found.def,
                dim: found.dim,
            });
            self.push_chime(ChimeId::Golden, DIMENSION_PANS[found.dim].position());
        }
        self.solfeggio_scratch = matches;

        if let Some(active) = self.temple.update(&drives) {
            self.emit(EngineEvent::TempleResonance { active });
        }

        for dim in 0..N_DIMENSIONS {
            let above = dims[dim].resonance > self.perfect_threshold;
            if above && !self.perfect[dim] {
                self.emit(EngineEvent::PerfectResonance { dim });
                self.push_chime(ChimeId::Ping, DIMENSION_PANS[dim].position());
            }
            self.perfect[dim] = above;
        }

        let snapshot = Snapshot {
            version: 0,
            dims,
            drive_volume,
            harmonics: self.harmonics.slots().map(|s| s.map(|a| a.ratio_index)),
            chimes: self.chimes,
        };
        let version = self.publisher.publish(snapshot);
        self.last_snapshot = Snapshot { version, ..snapshot };

        Ok(dims.map(|d| d.resonance))
    }

    fn validate(&self, input: &TickInput) -> Result<[DimensionState; N_DIMENSIONS], EngineError> {
        let offset = input.frequency_offset_hz.unwrap_or(0.0);
        let mut dims = self.dims;
        for (dim, given) in input.dims.iter().enumerate() {
            let width_hz = validate_width(dim, given.width_hz)?;
            let drive_hz = self.range.clamp(validate_frequency(dim, given.drive_hz + offset)?);
            let target_hz = self.range.clamp(validate_frequency(dim, given.target_hz)?);
            dims[dim] = DimensionState {
                drive_hz,
                target_hz,
                width_hz,
                resonance: resonance(drive_hz, target_hz, width_hz),
                pan: DIMENSION_PANS[dim],
            };
        }
        Ok(dims)
    }

    fn on_harmonic(&mut self, transition: HarmonicTransition) {
        match transition {
            HarmonicTransition::Detected { pair, ratio, .. } => {
                self.emit(EngineEvent::HarmonicDetected {
                    pair,
                    ratio,
                    bonus: ratio.bonus,
                });
                let pan = PanWeights::average(DIMENSION_PANS[pair.a], DIMENSION_PANS[pair.b]);
                self.push_chime(ratio.chime, pan.position());
            }
            HarmonicTransition::Lost { pair, ratio } => {
                self.emit(EngineEvent::HarmonicLost { pair, ratio });
            }
        }
    }

    fn push_chime(&mut self, chime: ChimeId, pan: f32) {
        let trigger = ChimeTrigger {
            chime,
            pan,
            amplitude: self.effect_volume,
        };
        self.chime_seq += 1;
        self.chimes[(self.chime_seq % CHIME_SLOTS as u64) as usize] = Some(ChimeSlot {
            seq: self.chime_seq,
            trigger,
        });
        self.emit(EngineEvent::Chime(trigger));
    }

    fn emit(&mut self, event: EngineEvent) {
        if self.events.send(event).is_err() && !self.receiver_gone {
            warn!("Event receiver dropped, further events are discarded");
            self.receiver_gone = true;
        }
    }

    /// Resonance per dimension as of the last accepted tick
    pub fn resonance(&self) -> [f32; N_DIMENSIONS] {
        self.dims.map(|d| d.resonance)
    }

    /// Validated state per dimension as of the last accepted tick
    pub fn dimensions(&self) -> &[DimensionState; N_DIMENSIONS] {
        &self.dims
    }

    /// Active pairs with their interval, bonus and expiry
    pub fn active_harmonics(&self) -> impl Iterator<Item = &ActiveHarmonic> {
        self.harmonics.active()
    }

    pub fn active_solfeggio(&self) -> impl Iterator<Item = &'static SolfeggioDef> + '_ {
        self.solfeggio.active()
    }

    pub fn in_temple_resonance(&self) -> bool {
        self.temple.is_active()
    }

    /// Snapshot published by the last accepted tick
    pub fn snapshot(&self) -> &Snapshot {
        &self.last_snapshot
    }
}
