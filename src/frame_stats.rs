//! Frame timing instrumentation for the input update loop.
//!
//! Tracks per-tick update durations and maintains rolling statistics
//! for the runner's periodic status logging.

/// Rolling update-time statistics over a window of samples.
#[derive(Debug)]
pub struct FrameStats {
    /// Per-tick update durations (milliseconds).
    update_times: Vec<f64>,
    /// Maximum number of samples to keep.
    window_size: usize,
    /// Total ticks recorded.
    pub total_frames: u64,
    /// Ticks whose update exceeded the budget.
    pub missed_frames: u64,
    /// Tick budget in milliseconds (16.6 for 60 Hz).
    pub budget_ms: f64,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(1000, 1000.0 / 60.0)
    }
}

impl FrameStats {
    pub fn new(window_size: usize, budget_ms: f64) -> Self {
        Self {
            update_times: Vec::with_capacity(window_size),
            window_size,
            total_frames: 0,
            missed_frames: 0,
            budget_ms,
        }
    }

    /// Record one tick's update duration.
    pub fn record(&mut self, update_ms: f64) {
        self.update_times.push(update_ms);
        if self.update_times.len() > self.window_size {
            self.update_times.remove(0);
        }
        self.total_frames += 1;
        if update_ms > self.budget_ms {
            self.missed_frames += 1;
        }
    }

    /// Compute percentile from a sorted slice.
    fn percentile(sorted: &[f64], p: f64) -> f64 {
        if sorted.is_empty() {
            return 0.0;
        }
        let idx = ((sorted.len() as f64 - 1.0) * p / 100.0).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    /// Current statistics over the window.
    pub fn summary(&self) -> FrameStatsSummary {
        let mut times = self.update_times.clone();
        times.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        FrameStatsSummary {
            update_p50: Self::percentile(&times, 50.0),
            update_p95: Self::percentile(&times, 95.0),
            update_p99: Self::percentile(&times, 99.0),
            missed_pct: if self.total_frames > 0 {
                (self.missed_frames as f64 / self.total_frames as f64) * 100.0
            } else {
                0.0
            },
            total_frames: self.total_frames,
            missed_frames: self.missed_frames,
        }
    }

    /// One-line form for periodic status logs.
    pub fn summary_line(&self) -> String {
        let s = self.summary();
        format!(
            "update p50 {:.2}ms p99 {:.2}ms, {} frames, {:.1}% over budget",
            s.update_p50, s.update_p99, s.total_frames, s.missed_pct,
        )
    }
}

/// Computed frame statistics.
#[derive(Debug, Clone)]
pub struct FrameStatsSummary {
    pub update_p50: f64,
    pub update_p95: f64,
    pub update_p99: f64,
    pub missed_pct: f64,
    pub total_frames: u64,
    pub missed_frames: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary() {
        let stats = FrameStats::default();
        let s = stats.summary();
        assert_eq!(s.total_frames, 0);
        assert_eq!(s.missed_frames, 0);
        assert_eq!(s.update_p50, 0.0);
    }

    #[test]
    fn test_record_and_percentiles() {
        let mut stats = FrameStats::new(100, 16.6);
        stats.record(2.0);
        stats.record(4.0);
        stats.record(6.0);
        let s = stats.summary();
        assert_eq!(s.total_frames, 3);
        assert!((s.update_p50 - 4.0).abs() < 0.1);
    }

    #[test]
    fn test_missed_frame_detection() {
        let mut stats = FrameStats::new(100, 16.6);
        stats.record(20.0); // over budget
        stats.record(5.0);
        assert_eq!(stats.missed_frames, 1);
        assert_eq!(stats.total_frames, 2);
    }

    #[test]
    fn test_window_trim() {
        let mut stats = FrameStats::new(5, 16.6);
        for i in 0..10 {
            stats.record(i as f64);
        }
        assert_eq!(stats.update_times.len(), 5);
        assert_eq!(stats.total_frames, 10);
    }

    #[test]
    fn test_summary_line() {
        let mut stats = FrameStats::new(100, 16.6);
        stats.record(3.0);
        let line = stats.summary_line();
        assert!(line.contains("1 frames"), "line was {}", line);
        assert!(line.contains("p50"));
    }
}
