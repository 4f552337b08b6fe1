//! End-to-end: decode a file, play it, visualize what is playing.

use std::path::Path;
use vizplay_audio::{EngineOptions, FillStatus, NullBackend, PlaybackEngine};
use vizplay_core::{Config, VisualizationMode, VizPlayError};
use vizplay_viz::{VisualFrame, Visualizer};

fn write_tone(path: &Path, sample_rate: u32, frames: usize) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        // 1 kHz tone on both channels.
        let t = i as f32 / sample_rate as f32;
        let s = ((2.0 * std::f32::consts::PI * 1000.0 * t).sin() * 16000.0) as i16;
        writer.write_sample(s).unwrap();
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

#[test]
fn decoded_tone_peaks_at_its_frequency() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_tone(&path, 8000, 8000);

    let engine = PlaybackEngine::new(Box::new(NullBackend::new()), EngineOptions::default());
    engine.load(&path).unwrap();
    engine.play().unwrap();

    let mut out = vec![0.0f32; 1024 * 2];
    assert_eq!(engine.render_handle().fill(&mut out, 2), FillStatus::Playing);
    let window = engine.get_current_frame(1024);
    assert_eq!(window.channels(), 2);
    assert_eq!(window.frame_count(), 1024);

    let mut config = Config::default();
    config.visualization.smoothing_enabled = false;
    let mut viz = Visualizer::with_seed(&config, 0).unwrap();
    let spectrum = viz.get_spectrum(&window);
    let peak_bin = spectrum
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    // 1 kHz at 8 kHz over 1024 points is bin 128.
    assert!((127..=129).contains(&peak_bin), "peak at {peak_bin}");

    match viz.render(VisualizationMode::Waveform, &window).unwrap() {
        VisualFrame::Waveform { points, .. } => {
            assert_eq!(points.len(), 1024);
            assert!(points.iter().all(|p| p.abs() <= 1.0));
        }
        other => panic!("unexpected frame: {other:?}"),
    }
}

#[test]
fn corrupt_file_keeps_current_track_playable() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.wav");
    write_tone(&good, 22050, 2205);
    let bad = dir.path().join("bad.flac");
    std::fs::write(&bad, vec![0u8; 4096]).unwrap();

    let engine = PlaybackEngine::new(Box::new(NullBackend::new()), EngineOptions::default());
    engine.load(&good).unwrap();
    engine.seek(0.5);

    let err = engine.load(&bad).unwrap_err();
    assert!(matches!(err, VizPlayError::Decode(_)));
    assert_eq!(engine.total_frames(), 2205);
    assert_eq!(engine.sample_rate(), Some(22050));
    engine.play().unwrap();
    assert!(engine.is_playing());
}

#[test]
fn config_file_drives_engine_and_visualizer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        br##"{
            "visualization": { "smooth_type": "gaussian", "smoothing_window": 7, "fps": 25 },
            "player": { "volume": 40 },
            "theme": { "line_color": "#FF8800" },
            "ui": { "modes": ["Waveform", "Spectrum", "Disco"] }
        }"##,
    )
    .unwrap();
    let config = Config::load_from_file(&path).unwrap();
    assert_eq!(config.visualization.tick_interval_ms(), 40);

    let engine = PlaybackEngine::new(
        Box::new(NullBackend::new()),
        EngineOptions::from(&config.player),
    );
    assert!((engine.volume() - 0.4).abs() < 1e-6);

    let mut viz = Visualizer::with_seed(&config, 0).unwrap();
    let window = vizplay_core::SampleWindow::mono(vec![0.5; 64]);
    match viz.render(VisualizationMode::Waveform, &window).unwrap() {
        VisualFrame::Waveform { line, .. } => assert_eq!(line.to_hex(), "#ff8800"),
        other => panic!("unexpected frame: {other:?}"),
    }
    // Symmetric parameters are absent from this file.
    let err = viz.render(VisualizationMode::Symmetric, &window).unwrap_err();
    assert!(matches!(err, VizPlayError::InvalidConfig(_)));
}
