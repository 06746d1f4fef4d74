//! Integration tests for chasm-engine.
//!
//! These run the whole processor on realistic buffers and compare against
//! the stages assembled by hand.

use chasm_core::{AudioBlock, Effect, StereoEffect, db_to_linear};
use chasm_effects::{
    BrightnessEq, HaasEffect, LoudnessStage, SchroederAllpassChain, StereoEnhancer,
};
use chasm_engine::{
    ChasmParams, ChasmProcessor, Control, EngineConfig, OutputLimiter, ProcessSpec, SharedParams,
};

const SAMPLE_RATE: f64 = 44100.0;
const BLOCK: usize = 512;

fn sine(len: usize, freq: f64, amplitude: f64) -> Vec<f64> {
    (0..len)
        .map(|n| amplitude * (2.0 * std::f64::consts::PI * freq * n as f64 / SAMPLE_RATE).sin())
        .collect()
}

fn processor<S: chasm_core::Sample>(params: &ChasmParams, channels: usize) -> ChasmProcessor<S> {
    let spec = ProcessSpec::new(SAMPLE_RATE, BLOCK, channels).expect("valid spec");
    let mut processor = ChasmProcessor::new();
    processor.prepare(&spec, params);
    processor
}

fn run_blocks(processor: &mut ChasmProcessor<f64>, left: &mut [f64], right: &mut [f64]) {
    for (l, r) in left.chunks_mut(BLOCK).zip(right.chunks_mut(BLOCK)) {
        processor.process(&mut [l, r]);
    }
}

fn peak(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0, |acc, x| acc.max(x.abs()))
}

fn rms(samples: &[f64]) -> f64 {
    (samples.iter().map(|x| x * x).sum::<f64>() / samples.len() as f64).sqrt()
}

/// The processor's wet path built from its stages, with cuts bypassed, no
/// Haas delay and 100% width.
struct WetPath {
    chains: [SchroederAllpassChain<f64>; 2],
    brightness: BrightnessEq<f64>,
    haas: HaasEffect<f64>,
    enhancer: StereoEnhancer<f64>,
    loudness: LoudnessStage<f64>,
}

impl WetPath {
    fn new(delay_ms: f64, character: f64, brightness_db: f64, loudness_mode: i32) -> Self {
        let mut chains = [
            SchroederAllpassChain::<f64>::new(),
            SchroederAllpassChain::<f64>::new(),
        ];
        for chain in &mut chains {
            chain.prepare(SAMPLE_RATE, delay_ms, character);
        }
        let mut brightness = BrightnessEq::<f64>::new();
        brightness.prepare(SAMPLE_RATE);
        brightness.set_brightness(brightness_db);
        let mut haas = HaasEffect::<f64>::new();
        haas.prepare(SAMPLE_RATE, 0.0);
        let mut enhancer = StereoEnhancer::<f64>::new();
        enhancer.prepare(SAMPLE_RATE, 100.0);
        let mut loudness = LoudnessStage::<f64>::new();
        let unity = db_to_linear(0.0_f64);
        loudness.prepare(SAMPLE_RATE, unity, unity);
        loudness.set_mode_index(loudness_mode);
        Self {
            chains,
            brightness,
            haas,
            enhancer,
            loudness,
        }
    }

    fn process(&mut self, left: &mut [f64], right: &mut [f64]) {
        for x in left.iter_mut() {
            *x = self.chains[0].process(*x);
        }
        for x in right.iter_mut() {
            *x = self.chains[1].process(*x);
        }
        let mut block = AudioBlock::stereo(left, right);
        self.brightness.process_block(&mut block);
        self.haas.process_block(&mut block);
        self.enhancer.process_block(&mut block);
        self.loudness.process_block(&mut block);
    }
}

fn assert_matches(actual: &[f64], expected: &[f64], label: &str) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < 1e-9, "{label} sample {i}: {a} vs {e}");
    }
}

#[test]
fn test_mix_zero_is_input_times_output_gain() {
    let params = ChasmParams {
        mix_percent: 0.0,
        output_gain_db: -6.0,
        delay_ms: 70.0,
        character: 5.0,
        brightness_db: 9.0,
        loudness_mode: 3,
        ..ChasmParams::default()
    };
    let mut processor = processor::<f32>(&params, 2);
    let output_gain = db_to_linear(-6.0_f32);

    let input: Vec<f32> = sine(BLOCK * 4, 1000.0, 0.5).iter().map(|&x| x as f32).collect();
    let mut left = input.clone();
    let mut right = input.clone();
    for (l, r) in left.chunks_mut(BLOCK).zip(right.chunks_mut(BLOCK)) {
        processor.process(&mut [l, r]);
    }

    for (i, &x) in input.iter().enumerate() {
        assert_eq!(left[i], x * output_gain, "left sample {i}");
        assert_eq!(right[i], x * output_gain, "right sample {i}");
    }
}

#[test]
fn test_mix_full_is_wet_path_only() {
    let params = ChasmParams {
        mix_percent: 100.0,
        output_gain_db: -3.0,
        ..ChasmParams::default()
    };
    let mut processor = processor::<f64>(&params, 2);
    let output_gain = db_to_linear(-3.0_f64);

    // Brightness 0 dB, width 100% and loudness off leave the allpass chains
    // and the one-sample Haas offset on the right
    let mut chain_l = SchroederAllpassChain::<f64>::new();
    let mut chain_r = SchroederAllpassChain::<f64>::new();
    chain_l.prepare(SAMPLE_RATE, 30.0, 1.0);
    chain_r.prepare(SAMPLE_RATE, 30.0, 1.0);
    let mut haas = HaasEffect::<f64>::new();
    haas.prepare(SAMPLE_RATE, 0.0);

    let input = sine(BLOCK * 4, 1000.0, 0.5);
    let mut expected_l: Vec<f64> = input.iter().map(|&x| chain_l.process(x)).collect();
    let mut expected_r: Vec<f64> = input.iter().map(|&x| chain_r.process(x)).collect();
    haas.process_block(&mut AudioBlock::stereo(&mut expected_l, &mut expected_r));

    let mut left = input.clone();
    let mut right = input.clone();
    run_blocks(&mut processor, &mut left, &mut right);

    for i in 0..input.len() {
        assert!(
            (left[i] - expected_l[i] * output_gain).abs() < 1e-9,
            "left sample {i}: {} vs {}",
            left[i],
            expected_l[i] * output_gain
        );
        assert!(
            (right[i] - expected_r[i] * output_gain).abs() < 1e-9,
            "right sample {i}"
        );
    }
}

#[test]
fn test_post_stages_run_in_order() {
    let params = ChasmParams {
        mix_percent: 100.0,
        brightness_db: 9.0,
        loudness_mode: 3,
        ..ChasmParams::default()
    };
    let mut processor = processor::<f64>(&params, 2);
    let mut path = WetPath::new(30.0, 1.0, 9.0, 3);

    let input = sine(BLOCK * 4, 1000.0, 0.5);
    let mut expected_l = input.clone();
    let mut expected_r = input.clone();
    path.process(&mut expected_l, &mut expected_r);

    let mut left = input.clone();
    let mut right = input.clone();
    run_blocks(&mut processor, &mut left, &mut right);

    assert!(peak(&left) > 0.1);
    assert_matches(&left, &expected_l, "left");
    assert_matches(&right, &expected_r, "right");
}

#[test]
fn test_tail_through_loudness_after_loud_block() {
    let params = ChasmParams {
        mix_percent: 100.0,
        delay_ms: 60.0,
        character: 3.0,
        loudness_mode: 3,
        ..ChasmParams::default()
    };
    let mut processor = processor::<f64>(&params, 2);
    let mut path = WetPath::new(60.0, 3.0, 0.0, 3);

    let loud = BLOCK * 2;
    let len = loud + SAMPLE_RATE as usize * 3 / 2;
    let mut input = sine(loud, 440.0, 0.8);
    input.resize(len, 0.0);

    let mut expected_l = input.clone();
    let mut expected_r = input.clone();
    path.process(&mut expected_l, &mut expected_r);

    let mut left = input.clone();
    let mut right = input.clone();
    run_blocks(&mut processor, &mut left, &mut right);

    let tail = &left[loud..];
    assert!(tail.iter().chain(&right[loud..]).all(|x| x.is_finite()));

    let quarter = SAMPLE_RATE as usize / 4;
    let early = peak(&tail[..quarter]);
    let late = peak(&tail[tail.len() - quarter..]);
    assert!(early > 1e-3, "early tail = {early}");
    assert!(late < early * 0.1, "late {late} vs early {early}");

    assert_matches(&left, &expected_l, "left");
    assert_matches(&right, &expected_r, "right");
}

#[test]
fn test_silence_in_silence_out() {
    let params = ChasmParams {
        mix_percent: 70.0,
        loudness_mode: 2,
        loudness_boost_db: 12.0,
        low_cut_hz: 200.0,
        high_cut_hz: 5000.0,
        haas_ms: 10.0,
        width_percent: 180.0,
        ..ChasmParams::default()
    };
    let mut processor = processor::<f64>(&params, 2);

    let mut left = vec![0.0; BLOCK * 3];
    let mut right = vec![0.0; BLOCK * 3];
    run_blocks(&mut processor, &mut left, &mut right);

    assert!(left.iter().chain(&right).all(|&x| x == 0.0));
}

#[test]
fn test_tail_decays_after_impulse() {
    let mut processor = processor::<f64>(&ChasmParams::default(), 2);

    let len = SAMPLE_RATE as usize * 2;
    let mut left = vec![0.0; len];
    let mut right = vec![0.0; len];
    left[0] = 1.0;
    right[0] = 1.0;
    run_blocks(&mut processor, &mut left, &mut right);

    assert!(peak(&left[..BLOCK]) > 0.1);
    assert!(peak(&left[len - BLOCK..]) < 1e-6, "tail = {}", peak(&left[len - BLOCK..]));
    assert!(peak(&right[len - BLOCK..]) < 1e-6);
}

#[test]
fn test_reset_clears_tail() {
    let params = ChasmParams {
        character: 10.0,
        delay_ms: 100.0,
        ..ChasmParams::default()
    };
    let mut processor = processor::<f64>(&params, 2);

    let mut left = sine(BLOCK, 200.0, 0.8);
    let mut right = left.clone();
    run_blocks(&mut processor, &mut left, &mut right);

    processor.reset();
    let mut left = vec![0.0; BLOCK * 2];
    let mut right = vec![0.0; BLOCK * 2];
    run_blocks(&mut processor, &mut left, &mut right);
    assert!(left.iter().chain(&right).all(|&x| x == 0.0));
}

#[test]
fn test_zero_width_collapses_to_mono() {
    let params = ChasmParams {
        mix_percent: 100.0,
        width_percent: 0.0,
        haas_ms: 5.0,
        ..ChasmParams::default()
    };
    let mut processor = processor::<f64>(&params, 2);

    let mut left = sine(BLOCK * 2, 330.0, 0.5);
    let mut right = sine(BLOCK * 2, 550.0, 0.3);
    run_blocks(&mut processor, &mut left, &mut right);
    assert_eq!(left, right);
}

#[test]
fn test_cut_bypass_matches_off() {
    let base = ChasmParams {
        mix_percent: 100.0,
        ..ChasmParams::default()
    };
    let at_threshold = ChasmParams {
        low_cut_hz: 1.0,
        high_cut_hz: 19999.0,
        ..base
    };

    let input = sine(BLOCK * 2, 440.0, 0.5);
    let mut reference = processor::<f64>(&base, 2);
    let mut bypassed = processor::<f64>(&at_threshold, 2);

    let (mut l1, mut r1) = (input.clone(), input.clone());
    let (mut l2, mut r2) = (input.clone(), input.clone());
    run_blocks(&mut reference, &mut l1, &mut r1);
    run_blocks(&mut bypassed, &mut l2, &mut r2);
    assert_eq!(l1, l2);
    assert_eq!(r1, r2);
}

#[test]
fn test_low_cut_removes_low_end() {
    let open = ChasmParams {
        mix_percent: 100.0,
        ..ChasmParams::default()
    };
    let cut = ChasmParams {
        low_cut_hz: 2000.0,
        ..open
    };

    let input = sine(BLOCK * 8, 60.0, 0.5);
    let mut a = processor::<f64>(&open, 2);
    let mut b = processor::<f64>(&cut, 2);
    let (mut l1, mut r1) = (input.clone(), input.clone());
    let (mut l2, mut r2) = (input.clone(), input.clone());
    run_blocks(&mut a, &mut l1, &mut r1);
    run_blocks(&mut b, &mut l2, &mut r2);

    let tail = BLOCK * 4..;
    assert!(rms(&l2[tail.clone()]) < rms(&l1[tail]) * 0.1);
}

#[test]
fn test_disabled_loudness_ignores_its_gains() {
    let plain = ChasmParams {
        mix_percent: 100.0,
        loudness_mode: 0,
        ..ChasmParams::default()
    };
    let with_gains = ChasmParams {
        loudness_input_gain_db: 18.0,
        loudness_boost_db: -12.0,
        ..plain
    };

    let input = sine(BLOCK * 2, 880.0, 0.4);
    let mut a = processor::<f64>(&plain, 2);
    let mut b = processor::<f64>(&with_gains, 2);
    let (mut l1, mut r1) = (input.clone(), input.clone());
    let (mut l2, mut r2) = (input.clone(), input.clone());
    run_blocks(&mut a, &mut l1, &mut r1);
    run_blocks(&mut b, &mut l2, &mut r2);
    assert_eq!(l1, l2);
    assert_eq!(r1, r2);
}

#[test]
fn test_mono_block() {
    let params = ChasmParams {
        mix_percent: 0.0,
        ..ChasmParams::default()
    };
    let mut processor = processor::<f32>(&params, 1);
    let input: Vec<f32> = (0..BLOCK).map(|n| (n as f32 * 0.05).sin()).collect();
    let mut mono = input.clone();
    processor.process(&mut [&mut mono[..]]);
    assert_eq!(mono, input);

    processor.update(&ChasmParams {
        mix_percent: 100.0,
        width_percent: 200.0,
        haas_ms: 20.0,
        loudness_mode: 1,
        ..ChasmParams::default()
    });
    for _ in 0..8 {
        processor.process(&mut [&mut mono[..]]);
        assert!(mono.iter().all(|x| x.is_finite()));
    }
}

#[test]
fn test_long_buffers_are_chunked() {
    let params = ChasmParams {
        mix_percent: 60.0,
        character: 4.0,
        low_cut_hz: 100.0,
        loudness_mode: 1,
        ..ChasmParams::default()
    };
    let input = sine(BLOCK * 3 + 100, 500.0, 0.5);

    let mut whole = processor::<f64>(&params, 2);
    let (mut l1, mut r1) = (input.clone(), input.clone());
    whole.process(&mut [&mut l1[..], &mut r1[..]]);

    let mut chunked = processor::<f64>(&params, 2);
    let (mut l2, mut r2) = (input.clone(), input.clone());
    run_blocks(&mut chunked, &mut l2, &mut r2);

    assert_eq!(l1, l2);
    assert_eq!(r1, r2);
}

#[test]
fn test_brick_wall_output_limiter() {
    let config = EngineConfig {
        output_limiter: OutputLimiter::BrickWall { ceiling: 0.5 },
        ..EngineConfig::default()
    };
    let mut processor = ChasmProcessor::<f64>::with_config(config).expect("valid config");
    let params = ChasmParams {
        output_gain_db: 24.0,
        ..ChasmParams::default()
    };
    processor.prepare(&ProcessSpec::new(SAMPLE_RATE, BLOCK, 2).expect("valid spec"), &params);

    let mut left = sine(BLOCK * 2, 440.0, 0.9);
    let mut right = left.clone();
    run_blocks(&mut processor, &mut left, &mut right);
    assert!(peak(&left) <= 0.5 && peak(&right) <= 0.5);
    assert!(peak(&left) > 0.49);
}

#[test]
fn test_smooth_output_limiter() {
    let mut processor = processor::<f64>(
        &ChasmParams {
            output_gain_db: 24.0,
            ..ChasmParams::default()
        },
        2,
    );
    processor
        .set_output_limiter(OutputLimiter::Smooth { ceiling_db: -6.0 })
        .expect("valid ceiling");

    let mut left = sine(BLOCK * 4, 220.0, 0.9);
    let mut right = left.clone();
    run_blocks(&mut processor, &mut left, &mut right);
    let ceiling = db_to_linear(-6.0_f64);
    assert!(peak(&left) <= ceiling + 1e-12);
    assert!(peak(&right) <= ceiling + 1e-12);
}

#[test]
fn test_parameter_ramp_has_no_jumps() {
    let mut processor = processor::<f64>(
        &ChasmParams {
            mix_percent: 0.0,
            ..ChasmParams::default()
        },
        2,
    );
    let mut left = vec![0.5; BLOCK];
    let mut right = vec![0.5; BLOCK];
    run_blocks(&mut processor, &mut left, &mut right);

    // Output gain jumps 24 dB; the 1 ms ramp keeps successive steps small
    processor.update(&ChasmParams {
        mix_percent: 0.0,
        output_gain_db: 24.0,
        ..ChasmParams::default()
    });
    let mut left = vec![0.5; BLOCK];
    let mut right = vec![0.5; BLOCK];
    run_blocks(&mut processor, &mut left, &mut right);

    let max_step = left.windows(2).fold(0.0, |acc: f64, w| acc.max((w[1] - w[0]).abs()));
    assert!(left[0] < 0.7, "first sample {}", left[0]);
    assert!(max_step < 0.2, "step {max_step}");
    assert!((left[BLOCK - 1] - 0.5 * db_to_linear(24.0)).abs() < 1e-3);
}

#[test]
fn test_shared_params_drive_updates() {
    let shared = std::sync::Arc::new(SharedParams::new(&ChasmParams::default()));
    let mut processor = processor::<f32>(&ChasmParams::default(), 2);

    let ui = std::sync::Arc::clone(&shared);
    std::thread::spawn(move || {
        ui.set(Control::MixPercent, 0.0);
        ui.set(Control::OutputGainDb, -120.0);
    })
    .join()
    .expect("writer thread");

    let mut left = vec![0.5_f32; BLOCK];
    let mut right = vec![0.5_f32; BLOCK];
    for _ in 0..20 {
        processor.update(&shared.snapshot());
        processor.process(&mut [&mut left[..], &mut right[..]]);
    }
    assert_eq!(processor.params().mix_percent, 0.0);
    assert_eq!(processor.params().output_gain_db, -48.0);
    assert!(left.iter().all(|x| x.abs() < 0.01));
}

#[test]
fn test_reprepare_on_format_change() {
    let mut processor = processor::<f32>(&ChasmParams::default(), 2);
    let spec = ProcessSpec::new(96000.0, 64, 1).expect("valid spec");
    processor.prepare(&spec, &ChasmParams::default());
    assert_eq!(processor.spec(), Some(&spec));

    let mut mono = vec![0.25_f32; 300];
    processor.process(&mut [&mut mono[..]]);
    assert!(mono.iter().all(|x| x.is_finite()));
}
