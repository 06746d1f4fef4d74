//! Render a decaying sine burst through the processor and report levels.
//!
//! Run with: cargo run -p chasm-engine --example render_sine [config.toml]
//!
//! Set `RUST_LOG=debug` to see prepare, reset and mode-change events.

use chasm_engine::{ChasmParams, ChasmProcessor, EngineConfig, ProcessSpec};
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZE: usize = 256;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    tracing::info!(?config, "engine config");

    let spec = ProcessSpec::new(SAMPLE_RATE, BLOCK_SIZE, 2)?;
    let mut processor = ChasmProcessor::<f32>::with_config(config)?;
    processor.prepare(&spec, &ChasmParams::default());

    let presets = [
        ("default", ChasmParams::default()),
        (
            "wide diffusion",
            ChasmParams {
                mix_percent: 70.0,
                delay_ms: 60.0,
                character: 5.0,
                width_percent: 180.0,
                haas_ms: 12.0,
                ..ChasmParams::default()
            },
        ),
        (
            "crunchy",
            ChasmParams {
                mix_percent: 100.0,
                brightness_db: 6.0,
                low_cut_hz: 150.0,
                loudness_mode: 3,
                loudness_boost_db: 9.0,
                output_gain_db: -6.0,
                ..ChasmParams::default()
            },
        ),
    ];

    let len = SAMPLE_RATE as usize;
    for (name, params) in presets {
        processor.reset_with(&params);

        let mut left: Vec<f32> = (0..len)
            .map(|n| {
                let t = n as f32 / SAMPLE_RATE as f32;
                (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 0.5 * (-6.0 * t).exp()
            })
            .collect();
        let mut right = left.clone();

        for (l, r) in left.chunks_mut(BLOCK_SIZE).zip(right.chunks_mut(BLOCK_SIZE)) {
            processor.process(&mut [l, r]);
        }

        let peak = left
            .iter()
            .chain(&right)
            .fold(0.0_f32, |acc, x| acc.max(x.abs()));
        let rms = (left.iter().map(|x| x * x).sum::<f32>() / len as f32).sqrt();
        tracing::info!(preset = name, peak, rms, "rendered one second");
    }

    Ok(())
}
