//! The visualization tick loop.

use crate::controller::{Controller, TickOutcome};
use crossbeam_channel::tick;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use vizplay_core::{Config, Result, VisualizationMode};
use vizplay_viz::Visualizer;

const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Cycles through the configured visualization modes.
#[derive(Debug, Clone)]
pub struct ModeCycle {
    modes: Vec<VisualizationMode>,
    index: usize,
}

impl ModeCycle {
    /// Start at `start`, inserting it into the cycle if it is not listed.
    pub fn new(modes: &[VisualizationMode], start: VisualizationMode) -> Self {
        let mut modes = modes.to_vec();
        let index = match modes.iter().position(|m| *m == start) {
            Some(i) => i,
            None => {
                modes.insert(0, start);
                0
            }
        };
        Self { modes, index }
    }

    pub fn current(&self) -> VisualizationMode {
        self.modes[self.index]
    }

    pub fn advance(&mut self) -> VisualizationMode {
        self.index = (self.index + 1) % self.modes.len();
        self.current()
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub tick_interval: Duration,
    pub window_size: usize,
    pub repeat: bool,
    /// Switch modes this often, if set.
    pub cycle: Option<Duration>,
}

impl SessionOptions {
    pub fn from_config(config: &Config, repeat: bool, cycle: Option<Duration>) -> Self {
        Self {
            tick_interval: Duration::from_millis(config.visualization.tick_interval_ms()),
            window_size: config.visualization.window_size.max(1),
            repeat,
            cycle,
        }
    }
}

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub ticks: u64,
    pub frames_rendered: u64,
    pub tracks_started: u64,
}

/// Tick until the playlist is exhausted.
///
/// Each tick polls the controller, pulls the window of audio behind the
/// play cursor and renders it in the current mode. A status line is logged
/// once per second.
pub fn run(
    controller: &mut Controller,
    visualizer: &mut Visualizer,
    modes: &mut ModeCycle,
    options: &SessionOptions,
) -> Result<SessionStats> {
    let ticker = tick(options.tick_interval);
    let mut stats = SessionStats {
        tracks_started: 1,
        ..Default::default()
    };
    let mut last_status = Instant::now();
    let mut last_switch = Instant::now();

    info!(
        "Visualizing in {} mode, tick every {} ms",
        modes.current(),
        options.tick_interval.as_millis()
    );

    while ticker.recv().is_ok() {
        stats.ticks += 1;

        match controller.on_tick(options.repeat)? {
            TickOutcome::Continue => {}
            TickOutcome::Advanced(index) => {
                stats.tracks_started += 1;
                debug!("Now playing track {}", index + 1);
            }
            TickOutcome::Finished => break,
        }

        if let Some(period) = options.cycle {
            if last_switch.elapsed() >= period {
                last_switch = Instant::now();
                info!("Mode: {}", modes.advance());
            }
        }

        let window = controller.engine().get_current_frame(options.window_size);
        if window.is_empty() {
            continue;
        }
        let frame = visualizer.render(modes.current(), &window)?;
        stats.frames_rendered += 1;

        if last_status.elapsed() >= STATUS_INTERVAL {
            last_status = Instant::now();
            let engine = controller.engine();
            let track = controller
                .playlist()
                .current_path()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!(
                "[{}] {:5.1}% of {:.1}s | {}",
                track,
                engine.get_progress() * 100.0,
                engine.duration_secs(),
                frame
            );
        }
    }

    info!(
        "Session over: {} ticks, {} frames rendered, {} tracks",
        stats.ticks, stats.frames_rendered, stats.tracks_started
    );
    Ok(stats)
}
