//! Debug overlay: smoothed FPS and chunk traffic in the window title,
//! mirrored to the log once per second for headless diagnosis.

use std::time::{Duration, Instant};

use glam::Vec2;
use tracing::info;

/// Weight of the previous estimate in the FPS moving average.
const FPS_SMOOTHING: f64 = 0.9;

/// How often the overlay line is mirrored to the log.
const LOG_INTERVAL: Duration = Duration::from_secs(1);

/// Per-frame numbers the overlay reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlayStats {
    pub camera_pos: Vec2,
    pub camera_speed: f32,
    /// Chunks resident (and therefore drawn) this frame.
    pub resident: usize,
    /// Chunks baked and admitted this frame.
    pub compiled: u32,
    /// Chunks evicted this frame.
    pub freed: u32,
}

/// Formats the per-frame status line and keeps the FPS estimate.
pub struct DebugOverlay {
    title_prefix: String,
    smoothed_fps: f64,
    last_log: Instant,
}

impl DebugOverlay {
    pub fn new(title_prefix: &str) -> Self {
        Self {
            title_prefix: title_prefix.to_string(),
            smoothed_fps: 0.0,
            last_log: Instant::now(),
        }
    }

    /// Fold one frame's duration into the FPS estimate. The first frame
    /// seeds the average; later frames blend in exponentially.
    pub fn note_frame(&mut self, frame_seconds: f64) {
        if frame_seconds <= 0.0 {
            return;
        }
        let instant_fps = 1.0 / frame_seconds;
        self.smoothed_fps = if self.smoothed_fps == 0.0 {
            instant_fps
        } else {
            self.smoothed_fps * FPS_SMOOTHING + instant_fps * (1.0 - FPS_SMOOTHING)
        };
    }

    pub fn fps(&self) -> f64 {
        self.smoothed_fps
    }

    /// The full window-title line for this frame.
    pub fn title(&self, stats: &OverlayStats) -> String {
        format!("{} | {}", self.title_prefix, self.status_line(stats))
    }

    /// Mirror the status line to the log, at most once per [`LOG_INTERVAL`].
    pub fn log_periodic(&mut self, stats: &OverlayStats) {
        if self.last_log.elapsed() < LOG_INTERVAL {
            return;
        }
        self.last_log = Instant::now();
        info!("{}", self.status_line(stats));
    }

    fn status_line(&self, stats: &OverlayStats) -> String {
        format!(
            "FPS: {:.0} | cam: ({:.1}, {:.1}) spd {:.2} | chunks: {} (+{} -{})",
            self.smoothed_fps,
            stats.camera_pos.x,
            stats.camera_pos.y,
            stats.camera_speed,
            stats.resident,
            stats.compiled,
            stats.freed,
        )
    }
}
