//! Per-tick dimension state and the snapshot handed to the audio context.
//!
//! The tick context builds a complete `Snapshot` by value and publishes it
//! in one step. The audio context copies the latest published snapshot with
//! a non-blocking `try_lock` and keeps using its cached copy whenever the
//! writer happens to hold the lock, so it never waits and never observes a
//! half-written snapshot.

use std::sync::{Arc, Mutex, TryLockError};

use crate::audio::ChimeTrigger;
use crate::params::{audio_constants::CHIME_SLOTS, N_DIMENSIONS, N_PAIRS};

/// Stereo weights of one source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanWeights {
    pub left: f32,
    pub right: f32,
}

impl PanWeights {
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Pan position in [-1, 1] (-1 = hard left)
    pub fn position(&self) -> f32 {
        self.right - self.left
    }

    /// Midpoint of two sources
    pub fn average(a: PanWeights, b: PanWeights) -> PanWeights {
        PanWeights::new((a.left + b.left) * 0.5, (a.right + b.right) * 0.5)
    }
}

/// Fixed stereo placement: x left, y center, z right, higher dims mixed
pub const DIMENSION_PANS: [PanWeights; N_DIMENSIONS] = [
    PanWeights::new(1.0, 0.0),
    PanWeights::new(0.5, 0.5),
    PanWeights::new(0.0, 1.0),
    PanWeights::new(0.7, 0.3),
    PanWeights::new(0.3, 0.7),
];

/// One dimension's input from the game-state collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionInput {
    /// Pilot-controlled frequency (Hz)
    pub drive_hz: f32,
    /// Hidden frequency the drive should approach (Hz)
    pub target_hz: f32,
    /// Resonance width (Hz, > 0)
    pub width_hz: f32,
}

/// Everything the game supplies once per tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickInput {
    pub dims: [DimensionInput; N_DIMENSIONS],
    /// Linear gain of the drive tones
    pub drive_volume: f32,
    /// Offset added to every drive by the selected crystal mode (Hz)
    pub frequency_offset_hz: Option<f32>,
}

/// Validated, clamped state of one dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionState {
    pub drive_hz: f32,
    pub target_hz: f32,
    pub width_hz: f32,
    /// Derived resonance in (0, 1]
    pub resonance: f32,
    pub pan: PanWeights,
}

impl DimensionState {
    const fn idle(dim: usize) -> Self {
        Self {
            drive_hz: 0.0,
            target_hz: 0.0,
            width_hz: 1.0,
            resonance: 0.0,
            pan: DIMENSION_PANS[dim],
        }
    }
}

/// Chime trigger tagged with a monotonically increasing sequence number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChimeSlot {
    pub seq: u64,
    pub trigger: ChimeTrigger,
}

/// Immutable view of the tick state consumed by the audio context
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// 0 until the first tick is published
    pub version: u64,
    pub dims: [DimensionState; N_DIMENSIONS],
    pub drive_volume: f32,
    /// Active ratio index per pair slot (see `DIMENSION_PAIRS`)
    pub harmonics: [Option<usize>; N_PAIRS],
    /// Most recent chime triggers, slot = seq % CHIME_SLOTS
    pub chimes: [Option<ChimeSlot>; CHIME_SLOTS],
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: 0,
            dims: [
                DimensionState::idle(0),
                DimensionState::idle(1),
                DimensionState::idle(2),
                DimensionState::idle(3),
                DimensionState::idle(4),
            ],
            drive_volume: 0.0,
            harmonics: [None; N_PAIRS],
            chimes: [None; CHIME_SLOTS],
        }
    }
}

impl Snapshot {
    /// True once the tick context has published at least once
    pub fn is_live(&self) -> bool {
        self.version > 0
    }
}

/// Single writer side of the snapshot hand-off (tick context)
pub struct SnapshotPublisher {
    shared: Arc<Mutex<Snapshot>>,
    version: u64,
}

impl SnapshotPublisher {
    /// Create a publisher and a first reader
    pub fn new() -> (Self, SnapshotReader) {
        let shared = Arc::new(Mutex::new(Snapshot::default()));
        let reader = SnapshotReader {
            shared: Arc::clone(&shared),
            cached: Snapshot::default(),
        };
        (Self { shared, version: 0 }, reader)
    }

    /// Publish a complete snapshot, stamping the next version
    pub fn publish(&mut self, mut snapshot: Snapshot) -> u64 {
        self.version += 1;
        snapshot.version = self.version;
        match self.shared.lock() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
        self.version
    }

    /// Another reader of the same stream of snapshots
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader {
            shared: Arc::clone(&self.shared),
            cached: Snapshot::default(),
        }
    }
}

/// Non-blocking reader side (audio context)
pub struct SnapshotReader {
    shared: Arc<Mutex<Snapshot>>,
    cached: Snapshot,
}

impl SnapshotReader {
    /// Latest fully published snapshot, or the cached one if the writer is busy
    pub fn latest(&mut self) -> &Snapshot {
        match self.shared.try_lock() {
            Ok(guard) => self.cached = *guard,
            Err(TryLockError::Poisoned(poisoned)) => self.cached = *poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {}
        }
        &self.cached
    }
}
