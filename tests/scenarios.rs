/// End-to-end scenarios for the resonance engine and mixer.
///
/// These drive the public API the way the game does:
/// 1. Interval detection (octave, golden ratio) and the single-event guarantee
/// 2. Harmonic expiry timing
/// 3. Solfeggio tolerance
/// 4. Resonance at one width
/// 5. Intermodulation audible in the rendered spectrum
use std::sync::mpsc::Receiver;

use phidrive::audio::{downmix_stereo, render_offline, ChimeId, Mixer, SpectrumAnalyzer};
use phidrive::engine::{EngineConfig, ResonanceEngine};
use phidrive::events::EngineEvent;
use phidrive::harmony::DimPair;
use phidrive::params::{AnalysisConfig, AudioConfig, MixLevels, VoicingConfig, N_DIMENSIONS};
use phidrive::resonance::resonance;
use phidrive::state::{DimensionInput, TickInput};

const TICK_HZ: f64 = 60.0;

/// Drives that form no interval with each other or with 400/600/800 Hz
const QUIET: [f32; 3] = [221.0, 227.0, 233.0];

fn tick_input(drives: [f32; N_DIMENSIONS]) -> TickInput {
    TickInput {
        dims: drives.map(|drive_hz| DimensionInput {
            drive_hz,
            target_hz: 790.0,
            width_hz: 10.0,
        }),
        drive_volume: 0.3,
        frequency_offset_hz: None,
    }
}

fn new_engine() -> (ResonanceEngine, Receiver<EngineEvent>) {
    ResonanceEngine::new(EngineConfig::default()).unwrap()
}

/// Tick at 60 Hz over [from_s, to_s) with fixed drives, collecting events
fn run(
    engine: &mut ResonanceEngine,
    events: &Receiver<EngineEvent>,
    drives: [f32; N_DIMENSIONS],
    from_s: f64,
    to_s: f64,
) -> Vec<(f64, EngineEvent)> {
    let input = tick_input(drives);
    let mut seen = Vec::new();
    let mut k = (from_s * TICK_HZ).round() as u64;
    loop {
        let now = k as f64 / TICK_HZ;
        if now >= to_s {
            break;
        }
        engine.tick(now, &input).unwrap();
        seen.extend(events.try_iter().map(|e| (now, e)));
        k += 1;
    }
    seen
}

fn detected(events: &[(f64, EngineEvent)]) -> Vec<(f64, &'static str, DimPair)> {
    events
        .iter()
        .filter_map(|(t, e)| match e {
            EngineEvent::HarmonicDetected { pair, ratio, .. } => Some((*t, ratio.name, *pair)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_octave_detected_within_one_interval() {
    let (mut engine, events) = new_engine();
    let drives = [400.0, 800.0, QUIET[0], QUIET[1], QUIET[2]];
    let seen = run(&mut engine, &events, drives, 0.0, 0.5);

    let found = detected(&seen);
    assert_eq!(found, vec![(0.0, "octave", DimPair::new(0, 1))]);

    let active: Vec<_> = engine.active_harmonics().collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].def().name, "octave");
}

#[test]
fn test_golden_ratio_beats_minor_sixth() {
    let (mut engine, events) = new_engine();
    let drives = [400.0, 647.2, QUIET[0], QUIET[1], QUIET[2]];
    let seen = run(&mut engine, &events, drives, 0.0, 0.5);

    let found = detected(&seen);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].1, "golden");
}

#[test]
fn test_sustained_match_announces_once() {
    let (mut engine, events) = new_engine();
    let drives = [400.0, 800.0, QUIET[0], QUIET[1], QUIET[2]];
    // Five detection intervals
    let seen = run(&mut engine, &events, drives, 0.0, 2.5);

    assert_eq!(detected(&seen).len(), 1);
    let chimes = seen
        .iter()
        .filter(|(_, e)| matches!(e, EngineEvent::Chime(t) if t.chime == ChimeId::Octave))
        .count();
    assert_eq!(chimes, 1);
    assert!(seen
        .iter()
        .all(|(_, e)| !matches!(e, EngineEvent::HarmonicLost { .. })));
}

#[test]
fn test_harmonic_expires_two_seconds_after_last_match() {
    let (mut engine, events) = new_engine();
    let octave = [400.0, 800.0, QUIET[0], QUIET[1], QUIET[2]];
    let broken = [400.0, 700.0, QUIET[0], QUIET[1], QUIET[2]];

    // Last positive match is the scan at t = 0
    run(&mut engine, &events, octave, 0.0, 0.25);
    let seen = run(&mut engine, &events, broken, 0.25, 3.0);

    let lost: Vec<f64> = seen
        .iter()
        .filter(|(_, e)| matches!(e, EngineEvent::HarmonicLost { .. }))
        .map(|(t, _)| *t)
        .collect();
    assert_eq!(lost.len(), 1);
    // Still active at exactly 2.0 s, gone on the first tick after it
    assert!(lost[0] > 2.0);
    assert!(lost[0] <= 2.0 + 1.0 / TICK_HZ + 1e-9);
    assert_eq!(engine.active_harmonics().count(), 0);
}

#[test]
fn test_solfeggio_tolerance() {
    for (drive, expected) in [
        (432.0, "Natural Harmony"),
        (430.0, "Natural Harmony"),
        (420.0, "Transmutation"),
    ] {
        let (mut engine, events) = new_engine();
        let drives = [QUIET[0], QUIET[1], drive, QUIET[2], 239.0];
        let seen = run(&mut engine, &events, drives, 0.0, 0.5);

        let matched: Vec<_> = seen
            .iter()
            .filter_map(|(_, e)| match e {
                EngineEvent::SolfeggioMatched { tone, dim } => Some((tone.name, *dim)),
                _ => None,
            })
            .collect();
        assert_eq!(matched, vec![(expected, 2)], "drive {}", drive);
    }
}

#[test]
fn test_natural_harmony_not_matched_outside_tolerance() {
    let (mut engine, events) = new_engine();
    let drives = [QUIET[0], QUIET[1], 420.0, QUIET[2], 239.0];
    let seen = run(&mut engine, &events, drives, 0.0, 0.5);

    assert!(!seen.iter().any(|(_, e)| matches!(
        e,
        EngineEvent::SolfeggioMatched { tone, .. } if tone.name == "Natural Harmony"
    )));
}

#[test]
fn test_resonance_half_at_one_width() {
    assert_eq!(resonance(410.0, 400.0, 10.0), 0.5);

    let (mut engine, _events) = new_engine();
    let mut input = tick_input([410.0, QUIET[0], QUIET[1], QUIET[2], 239.0]);
    input.dims[0].target_hz = 400.0;
    let values = engine.tick(0.0, &input).unwrap();
    assert_eq!(values[0], 0.5);
}

/// Render 1.5 s and return the mono spectrum of the final FFT frame
fn tail_spectrum(drives: [f32; N_DIMENSIONS]) -> (SpectrumAnalyzer, Vec<f32>) {
    let (mut engine, events) = new_engine();
    let mut mixer = Mixer::new(
        &AudioConfig::default(),
        VoicingConfig::default(),
        MixLevels::default(),
        engine.reader(),
    );
    let input = tick_input(drives);
    let samples = render_offline(&mut mixer, 1.5, TICK_HZ, |now| {
        engine.tick(now, &input)?;
        events.try_iter().for_each(drop);
        Ok(())
    })
    .unwrap();
    assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0));

    let mut analyzer = SpectrumAnalyzer::new(AnalysisConfig::default()).unwrap();
    let mono = downmix_stereo(&samples);
    let tail = &mono[mono.len() - analyzer.config().fft_size..];
    let magnitudes = analyzer.magnitudes(tail);
    (analyzer, magnitudes)
}

#[test]
fn test_intermodulation_difference_tone_is_rendered() {
    // Perfect fifth: difference tone at 200 Hz
    let (analyzer, fifth) = tail_spectrum([400.0, 600.0, QUIET[0], QUIET[1], QUIET[2]]);
    // 620/400 matches nothing, so no intermodulation
    let (_, plain) = tail_spectrum([400.0, 620.0, QUIET[0], QUIET[1], QUIET[2]]);

    let with_pair = analyzer.band_magnitude(&fifth, 195.0, 205.0);
    let without_pair = analyzer.band_magnitude(&plain, 195.0, 205.0);
    assert!(with_pair > 0.002, "difference tone too quiet: {}", with_pair);
    assert!(with_pair > 5.0 * without_pair);
}

#[test]
fn test_drive_fundamentals_dominate_spectrum() {
    let (analyzer, spectrum) = tail_spectrum([400.0, 620.0, QUIET[0], QUIET[1], QUIET[2]]);
    let peaks = analyzer.peaks(&spectrum, 5);
    let near = |hz: f32| peaks.iter().any(|p| (p.hz - hz).abs() < 8.0);
    assert!(near(400.0));
    assert!(near(620.0));
}
