//! Fixed-timestep clock for the runner.
//!
//! Decouples simulation step size from display refresh rate with a time
//! accumulator: each frame the wall-clock gap since the previous frame is added
//! to the accumulator, and one update step is owed for every whole
//! `frame_interval` it contains. If the gap spans several intervals (tab in the
//! background, debugger pause) multiple steps are owed in a single frame so
//! simulation time stays synchronized with wall time.

use std::time::{Duration, Instant};

/// Result of advancing the clock by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Whole update steps owed for this frame.
    pub steps: u32,
    /// Raw wall-clock gap since the previous frame.
    pub elapsed: Duration,
}

/// Accumulator clock owned exclusively by the runner.
///
/// `frame_interval` is fixed at construction; the only adjustment point is
/// reset-to-zero when the runner stops.
#[derive(Debug, Clone)]
pub struct RunnerClock {
    frame_interval: Duration,
    last: Option<Instant>,
    accumulated: Duration,
}

impl RunnerClock {
    /// Default tick duration: 20 ms, i.e. a 50 Hz simulation.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(20);

    pub fn new(frame_interval: Duration) -> Self {
        debug_assert!(frame_interval > Duration::ZERO);
        Self {
            frame_interval,
            last: None,
            accumulated: Duration::ZERO,
        }
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Step size handed to `update`, in seconds.
    pub fn delta_seconds(&self) -> f64 {
        self.frame_interval.as_secs_f64()
    }

    /// Leftover accumulated time (always below `frame_interval` after a tick).
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Captures the wall-clock baseline when a run starts.
    pub fn begin(&mut self, now: Instant) {
        self.last = Some(now);
        self.accumulated = Duration::ZERO;
    }

    /// Advances the clock for one frame and returns the steps owed.
    pub fn tick(&mut self, now: Instant) -> Tick {
        let elapsed = match self.last {
            Some(last) => now.saturating_duration_since(last),
            // First tick without a begin(): establish the baseline only.
            None => Duration::ZERO,
        };
        self.last = Some(now);
        Tick {
            steps: self.accumulate(elapsed),
            elapsed,
        }
    }

    /// Pure accumulator core: folds an elapsed gap in and drains whole
    /// intervals out. Split from [`tick`](Self::tick) so scheduling semantics
    /// are testable with synthetic gaps.
    pub fn accumulate(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let mut steps = 0;
        while self.accumulated >= self.frame_interval {
            self.accumulated -= self.frame_interval;
            steps += 1;
        }
        steps
    }

    /// Zeroes the clock. Called on the transition to Stopped.
    pub fn reset(&mut self) {
        self.last = None;
        self.accumulated = Duration::ZERO;
    }
}

impl Default for RunnerClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}
