//! Integration tests for the visualization pipeline.

use proptest::prelude::*;
use vizplay_core::{Config, SampleBuffer, SampleWindow, SmoothType, VisualizationMode, WindowFunction};
use vizplay_viz::{VisualFrame, Visualizer};

// ── Helpers ────────────────────────────────────────────────────

fn symmetric_config(decay: f32, length: usize) -> Config {
    let json = format!(
        r#"{{
            "visualization": {{ "smooth": false }},
            "symmetric_spectrum": {{
                "random_angle_range": 10.0,
                "trail_decay_factor": {decay},
                "trail_length": {length},
                "intensity_to_color_factor": 0.3,
                "rotation_speed_multiplier": 45.0
            }}
        }}"#
    );
    Config::from_json(json.as_bytes()).unwrap()
}

fn sine(frames: usize, cycles: f32) -> Vec<f32> {
    (0..frames)
        .map(|i| (2.0 * std::f32::consts::PI * cycles * i as f32 / frames as f32).sin())
        .collect()
}

// ── Scenarios ──────────────────────────────────────────────────

#[test]
fn silent_second_has_flat_spectrum() {
    let buffer = SampleBuffer::from_interleaved(vec![0.0; 44100], 1, 44100).unwrap();
    let window = buffer.window_ending_at(buffer.frame_count(), buffer.frame_count());
    for window_function in [WindowFunction::None, WindowFunction::Hann] {
        let mut config = Config::default();
        config.visualization.window_function = window_function;
        let mut viz = Visualizer::with_seed(&config, 0).unwrap();
        let spectrum = viz.get_spectrum(&window);
        assert_eq!(spectrum.len(), 22051);
        assert!(spectrum.iter().all(|m| m.abs() < 1e-6));
    }
}

#[test]
fn stereo_window_is_mixed_before_transform() {
    // Opposite-phase channels cancel out.
    let left = sine(512, 16.0);
    let interleaved: Vec<f32> = left.iter().flat_map(|s| [*s, -*s]).collect();
    let window = SampleWindow::new(interleaved, 2);
    let mut viz = Visualizer::with_seed(&Config::default(), 0).unwrap();
    assert!(viz.get_spectrum(&window).iter().all(|m| m.abs() < 1e-4));
    assert!(viz.get_waveform(&window).iter().all(|s| s.abs() < 1e-6));
}

#[test]
fn gaussian_and_uniform_smoothing_both_keep_length() {
    for kind in [SmoothType::Uniform, SmoothType::Gaussian] {
        let mut config = Config::default();
        config.visualization.smooth_type = kind;
        config.visualization.smoothing_window = 9;
        let mut viz = Visualizer::with_seed(&config, 0).unwrap();
        let window = SampleWindow::mono(sine(1024, 5.0));
        assert_eq!(viz.get_waveform(&window).len(), 1024);
        assert_eq!(viz.get_spectrum(&window).len(), 513);
    }
}

#[test]
fn symmetric_mode_accumulates_trails() {
    let mut viz = Visualizer::with_seed(&symmetric_config(0.9, 4), 11).unwrap();
    let window = SampleWindow::mono(sine(256, 4.0));
    let mut last_len = 0;
    for tick in 0..8 {
        match viz.render(VisualizationMode::Symmetric, &window).unwrap() {
            VisualFrame::Symmetric { trails, rotation, .. } => {
                assert_eq!(trails.len(), tick.min(4));
                assert!((0.0..360.0).contains(&rotation));
                last_len = trails.len();
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }
    assert_eq!(last_len, 4);
}

#[test]
fn every_mode_renders_a_loaded_window() {
    let mut viz = Visualizer::with_seed(&symmetric_config(0.5, 3), 5).unwrap();
    let window = SampleWindow::new(sine(2048, 30.0).into_iter().flat_map(|s| [s, s]).collect(), 2);
    for mode in VisualizationMode::ALL {
        let frame = viz.render(mode, &window).unwrap();
        assert_eq!(frame.mode(), mode);
        assert!(!frame.to_string().is_empty());
    }
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn trails_decay_geometrically(
        calls in 1usize..20,
        length in 1usize..8,
        decay in 0.1f32..1.0,
        value in 0.5f32..10.0,
    ) {
        let mut viz = Visualizer::with_seed(&symmetric_config(decay, length), 0).unwrap();
        for _ in 0..calls {
            viz.get_trailing_lines(vec![value; 4]).unwrap();
        }
        let trails = viz.get_trailing_lines(vec![value; 4]).unwrap();
        prop_assert_eq!(trails.len(), calls.min(length));
        // Oldest first: the last entry is the most recent, age 0.
        for (age, trail) in trails.iter().rev().enumerate() {
            let expected = value * decay.powi(age as i32);
            for v in trail {
                prop_assert!((v - expected).abs() <= expected.abs() * 1e-4 + 1e-6);
            }
        }
    }

    #[test]
    fn rotation_stays_in_range(steps in prop::collection::vec(-1000.0f32..1000.0, 1..100)) {
        let mut viz = Visualizer::with_seed(&symmetric_config(0.5, 3), 0).unwrap();
        for intensity in steps {
            let angle = viz.update_rotation(intensity).unwrap();
            prop_assert!((0.0..360.0).contains(&angle));
            prop_assert_eq!(angle, viz.rotation_angle());
        }
    }

    #[test]
    fn colors_stay_valid(steps in prop::collection::vec(-5.0f32..5.0, 1..50)) {
        let mut viz = Visualizer::with_seed(&symmetric_config(0.5, 3), 0).unwrap();
        for intensity in steps {
            let color = viz.update_colors(intensity).unwrap();
            prop_assert_eq!(color, viz.last_color());
        }
    }
}
