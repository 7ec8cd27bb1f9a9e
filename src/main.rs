//! phidrive - fly the five-dimension resonance drive by ear.
//!
//! `play` streams the demo flight to the default audio device; `render`
//! writes it to a WAV file, optionally with a spectral report.

mod cli;
mod pilot;

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use log::{info, warn};

use cli::{Args, Command};
use phidrive::audio::{downmix_stereo, render_to_wav, AudioSystem, Mixer, SpectrumAnalyzer};
use phidrive::engine::ResonanceEngine;
use phidrive::events::{announce_all, LogAnnouncer};
use phidrive::params::{AnalysisConfig, AudioConfig, VoicingConfig};
use pilot::DemoPilot;

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    args.validate().map_err(anyhow::Error::msg)?;

    match &args.command {
        Command::Play { seconds } => play(&args, *seconds),
        Command::Render {
            seconds,
            output,
            analyze,
        } => render(&args, *seconds, output, *analyze),
    }
}

fn play(args: &Args, seconds: f64) -> anyhow::Result<()> {
    let (mut engine, events) = ResonanceEngine::new(args.engine_config())?;

    let mut audio = match AudioSystem::start(
        &AudioConfig::default(),
        VoicingConfig::default(),
        args.mix_levels(),
        engine.reader(),
    ) {
        Ok(audio) => Some(audio),
        Err(e) => {
            warn!("{}; continuing without sound", e);
            None
        }
    };

    println!("phidrive is flying for {:.0}s", seconds);

    let mut pilot = DemoPilot::new(&args.mix_levels());
    let mut announcer = LogAnnouncer;
    let tick = Duration::from_secs_f64(1.0 / args.tick_hz);
    let start = Instant::now();

    loop {
        let now = start.elapsed().as_secs_f64();
        if now >= seconds {
            break;
        }
        let input = pilot.input_at(now);
        engine.tick(now, &input)?;
        announce_all(&mut announcer, events.try_iter());
        thread::sleep(tick);
    }

    if let Some(audio) = audio.as_mut() {
        audio.stop();
    }
    summarize(&engine);
    Ok(())
}

fn render(args: &Args, seconds: f64, output: &Path, analyze: bool) -> anyhow::Result<()> {
    let (mut engine, events) = ResonanceEngine::new(args.engine_config())?;
    let audio = AudioConfig::default();
    let mut mixer = Mixer::new(
        &audio,
        VoicingConfig::default(),
        args.mix_levels(),
        engine.reader(),
    );

    let mut pilot = DemoPilot::new(&args.mix_levels());
    let mut announcer = LogAnnouncer;

    info!("Rendering {:.1}s to {}", seconds, output.display());
    let samples = render_to_wav(output, &mut mixer, seconds, args.tick_hz, |now| {
        engine.tick(now, &pilot.input_at(now))?;
        announce_all(&mut announcer, events.try_iter());
        Ok(())
    })
    .with_context(|| format!("rendering {}", output.display()))?;

    summarize(&engine);

    if analyze {
        report_spectrum(&samples, audio.sample_rate_hz as usize)?;
    }
    Ok(())
}

fn summarize(engine: &ResonanceEngine) {
    let resonance = engine.resonance();
    println!("\nFinal resonance:");
    for (dim, value) in resonance.iter().enumerate() {
        println!("  dimension {}: {:.3}", dim + 1, value);
    }
    for active in engine.active_harmonics() {
        println!(
            "  {} between dimension {} and {} ({:?})",
            active.def().label,
            active.pair.a + 1,
            active.pair.b + 1,
            active.def().bonus
        );
    }
}

fn report_spectrum(samples: &[f32], sample_rate_hz: usize) -> anyhow::Result<()> {
    let config = AnalysisConfig {
        sample_rate_hz,
        ..AnalysisConfig::default()
    };
    let peak_count = config.peak_count;
    let fft_size = config.fft_size;
    let mut analyzer = SpectrumAnalyzer::new(config)?;

    let mono = downmix_stereo(samples);
    let tail = &mono[mono.len().saturating_sub(fft_size)..];
    let magnitudes = analyzer.magnitudes(tail);

    println!("\nStrongest spectral peaks (final {} samples):", tail.len());
    for peak in analyzer.peaks(&magnitudes, peak_count) {
        println!("  {:8.1} Hz  {:.4}", peak.hz, peak.magnitude);
    }
    Ok(())
}
