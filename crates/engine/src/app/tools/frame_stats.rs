use std::fmt;

pub const FRAME_STATS_WINDOW_LEN: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStatsSummary {
    pub latest: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

impl FrameStatsSummary {
    /// Compact lines for the on-frame overlay.
    pub fn overlay_lines(&self) -> [String; 4] {
        [
            format!("FPS {}", round_fps(self.latest)),
            format!("AVG {}", round_fps(self.mean)),
            format!("MIN {}", round_fps(self.min)),
            format!("MAX {}", round_fps(self.max)),
        ]
    }

    pub fn one_line(&self) -> String {
        format!(
            "{} fps (avg {} / min {} / max {})",
            round_fps(self.latest),
            round_fps(self.mean),
            round_fps(self.min),
            round_fps(self.max)
        )
    }
}

impl fmt::Display for FrameStatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Frames per Second:")?;
        writeln!(f, "latest = {} |", round_fps(self.latest))?;
        writeln!(
            f,
            "avg of last {} = {} |",
            FRAME_STATS_WINDOW_LEN,
            round_fps(self.mean)
        )?;
        writeln!(
            f,
            "min of last {} = {} |",
            FRAME_STATS_WINDOW_LEN,
            round_fps(self.min)
        )?;
        write!(
            f,
            "max of last {} = {}",
            FRAME_STATS_WINDOW_LEN,
            round_fps(self.max)
        )
    }
}

/// Sliding window of instantaneous frame rates, one sample per tick.
#[derive(Debug)]
pub struct FrameStats {
    samples_fps: [f64; FRAME_STATS_WINDOW_LEN],
    head: usize,
    count: usize,
    sum_fps: f64,
    last_fps: f64,
    last_timestamp_ms: Option<f64>,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            samples_fps: [0.0; FRAME_STATS_WINDOW_LEN],
            head: 0,
            count: 0,
            sum_fps: 0.0,
            last_fps: 0.0,
            last_timestamp_ms: None,
        }
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sample taken for this tick, if any. The first tick only
    /// anchors the clock, and a tick that did not move time forward is not
    /// sampled, so the window never holds an infinite or NaN rate.
    pub fn record_tick(&mut self, now_ms: f64) -> Option<f64> {
        if !now_ms.is_finite() {
            return None;
        }

        let previous = self.last_timestamp_ms.replace(now_ms)?;
        let delta_ms = now_ms - previous;
        if delta_ms <= 0.0 {
            return None;
        }

        let fps = 1000.0 / delta_ms;
        if !fps.is_finite() {
            return None;
        }
        self.push_fps(fps);
        Some(fps)
    }

    pub fn summary(&self) -> FrameStatsSummary {
        if self.count == 0 {
            return FrameStatsSummary::default();
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in self.samples() {
            min = min.min(value);
            max = max.max(value);
        }

        FrameStatsSummary {
            latest: self.last_fps,
            mean: self.sum_fps / self.count as f64,
            min,
            max,
            samples: self.count,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Oldest sample first.
    pub fn samples(&self) -> impl Iterator<Item = f64> + '_ {
        let start = if self.count < FRAME_STATS_WINDOW_LEN {
            0
        } else {
            self.head
        };
        (0..self.count)
            .map(move |offset| self.samples_fps[(start + offset) % FRAME_STATS_WINDOW_LEN])
    }

    fn push_fps(&mut self, value: f64) {
        self.last_fps = value;

        if self.count < FRAME_STATS_WINDOW_LEN {
            self.samples_fps[self.head] = value;
            self.head = (self.head + 1) % FRAME_STATS_WINDOW_LEN;
            self.count += 1;
            self.sum_fps += value;
            return;
        }

        let evicted = self.samples_fps[self.head];
        self.samples_fps[self.head] = value;
        self.head = (self.head + 1) % FRAME_STATS_WINDOW_LEN;
        self.sum_fps += value - evicted;
    }
}

fn round_fps(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME_GAP_MS: f64 = 16.67;

    fn record_ticks(stats: &mut FrameStats, ticks: usize, gap_ms: f64) {
        for index in 0..ticks {
            stats.record_tick(1_000.0 + index as f64 * gap_ms);
        }
    }

    #[test]
    fn empty_stats_summary_is_zeroed() {
        assert_eq!(FrameStats::new().summary(), FrameStatsSummary::default());
    }

    #[test]
    fn first_tick_only_anchors_the_clock() {
        let mut stats = FrameStats::new();
        assert_eq!(stats.record_tick(0.0), None);
        assert!(stats.is_empty());

        let sample = stats.record_tick(20.0).expect("second tick samples");
        assert!((sample - 50.0).abs() < 1e-9);
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn repeated_timestamp_never_enters_window() {
        let mut stats = FrameStats::new();
        stats.record_tick(5.0);
        assert_eq!(stats.record_tick(5.0), None);
        assert_eq!(stats.record_tick(4.0), None);
        assert_eq!(stats.record_tick(f64::NAN), None);
        assert!(stats.is_empty());
        assert!(stats.samples().all(f64::is_finite));
    }

    #[test]
    fn window_keeps_most_recent_hundred_samples() {
        let mut stats = FrameStats::new();
        record_ticks(&mut stats, 150, FRAME_GAP_MS);

        let summary = stats.summary();
        assert_eq!(stats.len(), FRAME_STATS_WINDOW_LEN);
        assert_eq!(summary.samples, FRAME_STATS_WINDOW_LEN);
        assert!((summary.mean - 60.0).abs() <= 1.0, "mean {}", summary.mean);
        assert!(stats.samples().all(|fps| (fps - 60.0).abs() <= 1.0));
    }

    #[test]
    fn eviction_drops_oldest_samples_first() {
        let mut stats = FrameStats::new();
        let mut now = 0.0;
        stats.record_tick(now);
        for _ in 0..FRAME_STATS_WINDOW_LEN {
            now += 100.0;
            stats.record_tick(now);
        }
        for _ in 0..10 {
            now += 10.0;
            stats.record_tick(now);
        }

        let samples: Vec<f64> = stats.samples().collect();
        assert_eq!(samples.len(), FRAME_STATS_WINDOW_LEN);
        assert!(samples[..90].iter().all(|fps| (fps - 10.0).abs() < 1e-6));
        assert!(samples[90..].iter().all(|fps| (fps - 100.0).abs() < 1e-6));
    }

    #[test]
    fn summary_tracks_latest_min_max_and_mean() {
        let mut stats = FrameStats::new();
        stats.record_tick(0.0);
        stats.record_tick(10.0);
        stats.record_tick(30.0);
        stats.record_tick(70.0);

        let summary = stats.summary();
        assert!((summary.latest - 25.0).abs() < 1e-9);
        assert!((summary.max - 100.0).abs() < 1e-9);
        assert!((summary.min - 25.0).abs() < 1e-9);
        assert!((summary.mean - (100.0 + 50.0 + 25.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn max_recomputes_when_prior_max_is_evicted() {
        let mut stats = FrameStats::new();
        let mut now = 0.0;
        stats.record_tick(now);
        now += 1.0;
        stats.record_tick(now);
        for _ in 1..FRAME_STATS_WINDOW_LEN {
            now += 20.0;
            stats.record_tick(now);
        }
        now += 50.0;
        stats.record_tick(now);

        let summary = stats.summary();
        assert!((summary.max - 50.0).abs() < 1e-9);
        assert!((summary.min - 20.0).abs() < 1e-9);
    }

    #[test]
    fn display_renders_rounded_multi_line_text() {
        let summary = FrameStatsSummary {
            latest: 59.6,
            mean: 60.2,
            min: 44.5,
            max: 61.49,
            samples: 100,
        };

        assert_eq!(
            summary.to_string(),
            "Frames per Second:\n\
latest = 60 |\n\
avg of last 100 = 60 |\n\
min of last 100 = 45 |\n\
max of last 100 = 61"
        );
        assert_eq!(summary.overlay_lines()[2], "MIN 45");
        assert_eq!(summary.one_line(), "60 fps (avg 60 / min 45 / max 61)");
    }
}
