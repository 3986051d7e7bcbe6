//! # Frame Statistics
//!
//! Frame-time tracking behind the stats overlay. The app feeds one sample per
//! displayed frame; render counters are copied in from the render engine.
//!
//! ```rust
//! use std::time::Duration;
//! use strike_scene::performance::PerformanceMonitor;
//!
//! let mut monitor = PerformanceMonitor::new();
//! for _ in 0..30 {
//!     monitor.record_frame(Duration::from_millis(20));
//! }
//! assert!((monitor.get_metrics().fps - 50.0).abs() < 0.5);
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use crate::gfx::rendering::FrameCounters;

/// Performance metrics shown in the overlay
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    /// Current frames per second
    pub fps: f32,
    /// Average frame time in milliseconds
    pub frame_time_ms: f32,
    pub min_frame_time_ms: f32,
    pub max_frame_time_ms: f32,
    /// Number of draw calls in the last frame
    pub draw_calls: usize,
    /// Particles drawn in the last frame
    pub particles: usize,
    /// GPU meshes plus surfaces currently alive
    pub live_resources: usize,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            fps: 0.0,
            frame_time_ms: 0.0,
            min_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            draw_calls: 0,
            particles: 0,
            live_resources: 0,
        }
    }
}

/// Rolling frame-time window
pub struct PerformanceMonitor {
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    current_metrics: PerformanceMetrics,
}

impl PerformanceMonitor {
    /// Keeps about two seconds of samples at 60 fps
    pub fn new() -> Self {
        Self::with_capacity(120)
    }

    pub fn with_capacity(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            current_metrics: PerformanceMetrics::default(),
        }
    }

    /// Adds one frame-time sample and refreshes the metrics
    pub fn record_frame(&mut self, frame_time: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);
        self.update_metrics();
    }

    fn update_metrics(&mut self) {
        if self.frame_times.is_empty() {
            return;
        }

        let total_time: Duration = self.frame_times.iter().sum();
        let avg_frame_time_ms = total_time.as_secs_f32() * 1000.0 / self.frame_times.len() as f32;

        self.current_metrics.frame_time_ms = avg_frame_time_ms;
        self.current_metrics.fps = if avg_frame_time_ms > 0.0 {
            1000.0 / avg_frame_time_ms
        } else {
            0.0
        };

        if let (Some(min_time), Some(max_time)) = (self.frame_times.iter().min(), self.frame_times.iter().max()) {
            self.current_metrics.min_frame_time_ms = min_time.as_secs_f32() * 1000.0;
            self.current_metrics.max_frame_time_ms = max_time.as_secs_f32() * 1000.0;
        }
    }

    /// Update render statistics
    pub fn update_render_stats(&mut self, counters: FrameCounters) {
        self.current_metrics.draw_calls = counters.draw_calls;
        self.current_metrics.particles = counters.particles;
        self.current_metrics.live_resources = counters.live_meshes + counters.live_surfaces;
    }

    pub fn get_metrics(&self) -> &PerformanceMetrics {
        &self.current_metrics
    }

    /// Get frame time history for graphing
    pub fn get_frame_time_history(&self) -> Vec<f32> {
        self.frame_times
            .iter()
            .map(|duration| duration.as_secs_f32() * 1000.0)
            .collect()
    }

    /// Reset all metrics and history
    pub fn reset(&mut self) {
        self.frame_times.clear();
        self.current_metrics = PerformanceMetrics::default();
    }

    /// Compact stats window in the top-right corner
    pub fn render_overlay(&self, ui: &imgui::Ui) {
        let display_size = ui.io().display_size;
        let metrics = &self.current_metrics;

        ui.window("Stats")
            .size([200.0, 150.0], imgui::Condition::Always)
            .position([display_size[0] - 210.0, 10.0], imgui::Condition::Always)
            .no_decoration()
            .no_inputs()
            .bg_alpha(0.35)
            .build(|| {
                ui.text(format!("FPS: {:.0}", metrics.fps));
                ui.text(format!("{:.1}ms ({:.1}-{:.1})", metrics.frame_time_ms, metrics.min_frame_time_ms, metrics.max_frame_time_ms));
                ui.text(format!("Draw calls: {}", metrics.draw_calls));
                ui.text(format!("Particles: {}", metrics.particles));
                ui.text(format!("GPU resources: {}", metrics.live_resources));
                if !self.frame_times.is_empty() {
                    let history = self.get_frame_time_history();
                    ui.plot_lines("##frame_times", &history)
                        .graph_size([180.0, 30.0])
                        .scale_min(0.0)
                        .scale_max(50.0)
                        .build();
                }
            });
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}
