//! Integration tests for the playback engine.
//!
//! The engine runs on a `NullBackend` and the tests play the part of the
//! audio device through its `RenderHandle`.

use proptest::prelude::*;
use std::thread;
use std::time::Duration;
use vizplay_audio::{EngineOptions, FillStatus, NullBackend, PlaybackEngine, SilentBackend};
use vizplay_core::SampleBuffer;

// ── Helpers ────────────────────────────────────────────────────

fn engine() -> PlaybackEngine {
    PlaybackEngine::new(Box::new(NullBackend::new()), EngineOptions::default())
}

fn constant(frames: usize, channels: u16, value: f32) -> SampleBuffer {
    SampleBuffer::from_interleaved(vec![value; frames * channels as usize], channels, 44100)
        .unwrap()
}

// ── Transport ──────────────────────────────────────────────────

#[test]
fn fresh_engine_has_no_audio() {
    let engine = engine();
    assert!(engine.get_current_frame(1024).is_empty());
    assert_eq!(engine.get_progress(), 0.0);
    assert!(!engine.is_playing() && !engine.is_paused());
    engine.play().unwrap();
    assert!(!engine.is_playing());
}

#[test]
fn half_volume_scales_output() {
    let engine = engine();
    engine.load_buffer(constant(4096, 2, 1.0));
    engine.set_volume(0.5);
    engine.play().unwrap();

    let mut out = vec![0.0f32; 512 * 2];
    assert_eq!(engine.render_handle().fill(&mut out, 2), FillStatus::Playing);
    assert!(out.iter().all(|s| (s - 0.5).abs() < 1e-6));
}

#[test]
fn paused_engine_emits_silence_and_holds_position() {
    let engine = engine();
    engine.load_buffer(constant(4096, 1, 1.0));
    engine.play().unwrap();
    let handle = engine.render_handle();
    let mut out = vec![0.0f32; 256];
    handle.fill(&mut out, 1);
    engine.pause();

    let mut out = vec![1.0f32; 256];
    assert_eq!(handle.fill(&mut out, 1), FillStatus::Silence);
    assert!(out.iter().all(|s| *s == 0.0));
    assert_eq!(engine.position_frames(), 256);

    engine.resume().unwrap();
    handle.fill(&mut out, 1);
    assert_eq!(engine.position_frames(), 512);
}

#[test]
fn end_of_stream_pads_and_resets() {
    let engine = engine();
    engine.load_buffer(constant(1000, 2, 0.25));
    engine.play().unwrap();
    engine.seek(0.9);

    let mut out = vec![9.0f32; 256 * 2];
    assert_eq!(engine.render_handle().fill(&mut out, 2), FillStatus::EndOfStream);
    assert_eq!(out.len(), 512);
    assert!(out[..200].iter().all(|s| (s - 0.25).abs() < 1e-6));
    assert!(out[200..].iter().all(|s| *s == 0.0));
    assert_eq!(engine.get_progress(), 0.0);
    assert!(!engine.is_playing());
}

#[test]
fn stop_then_play_restarts_from_zero() {
    let engine = engine();
    engine.load_buffer(constant(1000, 1, 1.0));
    engine.play().unwrap();
    engine.seek(0.75);
    engine.stop();
    engine.play().unwrap();
    assert_eq!(engine.position_frames(), 0);
    assert!(engine.is_playing());
}

#[test]
fn current_frame_tracks_cursor_as_it_plays() {
    let engine = engine();
    let ramp: Vec<f32> = (0..2000).map(|i| i as f32).collect();
    engine.load_buffer(SampleBuffer::from_interleaved(ramp, 1, 1000).unwrap());
    engine.play().unwrap();
    let mut out = vec![0.0f32; 300];
    engine.render_handle().fill(&mut out, 1);

    let window = engine.get_current_frame(100);
    assert_eq!(window.frame_count(), 100);
    assert_eq!(window.samples()[0], 200.0);
    assert_eq!(window.samples()[99], 299.0);
}

#[test]
fn channel_mismatch_renders_silence() {
    let engine = engine();
    engine.load_buffer(constant(100, 2, 1.0));
    engine.play().unwrap();
    let mut out = vec![1.0f32; 60];
    assert_eq!(engine.render_handle().fill(&mut out, 3), FillStatus::Silence);
    assert!(out.iter().all(|s| *s == 0.0));
}

// ── Device errors ──────────────────────────────────────────────

#[test]
fn device_error_from_callback_reaches_the_caller() {
    let engine = engine();
    engine.load_buffer(constant(100, 1, 1.0));
    engine.play().unwrap();
    engine.render_handle().report_device_error("buffer underrun storm");

    let err = engine.resume().unwrap_err();
    assert!(err.is_device());
    assert!(engine.last_device_error().is_some());
    assert_eq!(engine.get_progress(), 0.0);
}

// ── Concurrency ────────────────────────────────────────────────

#[test]
fn callback_thread_and_control_thread_share_state() {
    let engine = engine();
    engine.load_buffer(constant(44100, 2, 0.5));
    engine.play().unwrap();

    let handle = engine.render_handle();
    let audio = thread::spawn(move || {
        let mut out = vec![0.0f32; 64 * 2];
        let mut ended = false;
        for _ in 0..2000 {
            if handle.fill(&mut out, 2) == FillStatus::EndOfStream {
                ended = true;
            }
        }
        ended
    });

    for i in 0..200 {
        engine.seek((i % 10) as f64 / 10.0);
        let progress = engine.get_progress();
        assert!((0.0..=1.0).contains(&progress));
        let window = engine.get_current_frame(256);
        assert!(window.frame_count() <= 256);
    }

    audio.join().unwrap();
    assert!(engine.position_frames() <= engine.total_frames());
}

#[test]
fn silent_backend_plays_track_to_the_end() {
    let engine = PlaybackEngine::new(Box::new(SilentBackend::new(256)), EngineOptions::default());
    // 0.1 s at 8 kHz
    engine.load_buffer(SampleBuffer::from_interleaved(vec![0.1; 800], 1, 8000).unwrap());
    engine.play().unwrap();

    let mut waited = Duration::ZERO;
    while engine.is_playing() && waited < Duration::from_secs(5) {
        thread::sleep(Duration::from_millis(10));
        waited += Duration::from_millis(10);
    }
    assert!(!engine.is_playing());
    assert_eq!(engine.get_progress(), 0.0);
    engine.stop();
    assert!(!engine.has_stream());
}

// ── Properties ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn seek_then_progress_roundtrips(frames in 1usize..50_000, fraction in 0.0f64..=1.0) {
        let engine = engine();
        engine.load_buffer(constant(frames, 1, 0.0));
        engine.seek(fraction);
        let progress = engine.get_progress();
        prop_assert!((progress - fraction).abs() <= 1.0 / frames as f64 + 1e-12);
    }

    #[test]
    fn seek_out_of_range_is_clamped(frames in 1usize..10_000, fraction in -10.0f64..10.0) {
        let engine = engine();
        engine.load_buffer(constant(frames, 1, 0.0));
        engine.seek(fraction);
        prop_assert!(engine.position_frames() <= frames);
        prop_assert!((0.0..=1.0).contains(&engine.get_progress()));
    }

    #[test]
    fn stop_always_rewinds(
        frames in 1usize..10_000,
        fraction in 0.0f64..=1.0,
        play in any::<bool>(),
        pause in any::<bool>(),
    ) {
        let engine = engine();
        engine.load_buffer(constant(frames, 1, 0.0));
        if play {
            engine.play().unwrap();
        }
        if pause {
            engine.pause();
        }
        engine.seek(fraction);
        engine.stop();
        prop_assert_eq!(engine.position_frames(), 0);
        prop_assert_eq!(engine.get_progress(), 0.0);
        prop_assert!(!engine.is_playing() && !engine.is_paused());
    }

    #[test]
    fn render_output_always_matches_request(
        frames in 0usize..2_000,
        request in 1usize..1_024,
        channels in 1u16..4,
    ) {
        let engine = engine();
        engine.load_buffer(constant(frames, channels, 1.0));
        engine.play().unwrap();
        let mut out = vec![7.0f32; request * channels as usize];
        let status = engine.render_handle().fill(&mut out, channels as usize);
        prop_assert_eq!(out.len(), request * channels as usize);
        let played = frames.min(request) * channels as usize;
        prop_assert!(out[..played].iter().all(|s| *s == 1.0));
        prop_assert!(out[played..].iter().all(|s| *s == 0.0));
        if frames < request {
            prop_assert_eq!(status, FillStatus::EndOfStream);
            prop_assert_eq!(engine.get_progress(), 0.0);
        }
    }
}
