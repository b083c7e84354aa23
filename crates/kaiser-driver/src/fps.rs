use std::collections::VecDeque;
use std::fmt;

pub const DEFAULT_HISTORY: usize = 1000;
/// Trailing windows reported by [`FpsEstimator::estimate`], widest first.
pub const WINDOWS: [usize; 3] = [1000, 100, 20];

/// Frame rates over the trailing 1000, 100 and 20 intervals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FpsEstimate {
    pub over_1000: f64,
    pub over_100: f64,
    pub over_20: f64,
}

impl fmt::Display for FpsEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1} {:.1} {:.1}",
            self.over_1000, self.over_100, self.over_20
        )
    }
}

/// Rolling history of inter-tick intervals in milliseconds.
#[derive(Debug, Clone)]
pub struct FpsEstimator {
    intervals: VecDeque<f64>,
    capacity: usize,
}

impl Default for FpsEstimator {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY)
    }
}

impl FpsEstimator {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            intervals: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, interval_ms: f64) {
        if self.intervals.len() == self.capacity {
            self.intervals.pop_front();
        }
        self.intervals.push_back(interval_ms.max(0.0));
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// Frames per second over the last `window` samples, or 0.0 when there is
    /// nothing to average.
    pub fn fps_over(&self, window: usize) -> f64 {
        let count = window.min(self.intervals.len());
        if count == 0 {
            return 0.0;
        }
        let sum: f64 = self.intervals.iter().rev().take(count).sum();
        if sum <= 0.0 {
            return 0.0;
        }
        1000.0 * count as f64 / sum
    }

    pub fn estimate(&self) -> FpsEstimate {
        let [wide, mid, narrow] = WINDOWS;
        FpsEstimate {
            over_1000: self.fps_over(wide),
            over_100: self.fps_over(mid),
            over_20: self.fps_over(narrow),
        }
    }
}
