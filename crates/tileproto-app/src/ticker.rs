//! Fixed-timestep frame ticker.
//!
//! Decouples camera stepping (fixed 60 Hz) from rendering (variable rate)
//! with an accumulator, so scroll speed does not depend on the display's
//! refresh rate.

use std::time::Instant;

use tracing::warn;

/// Fixed simulation timestep: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// Longest frame the accumulator will absorb. Slower frames (debugger
/// pauses, window drags) are clamped and the simulation falls behind
/// rather than spiraling through dozens of catch-up steps.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// What one call to [`FixedTicker::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Fixed steps executed this frame.
    pub steps: u32,
    /// Wall-clock duration of the previous frame, after clamping.
    pub frame_seconds: f64,
}

/// Accumulator-based fixed timestep driver.
pub struct FixedTicker {
    previous_time: Instant,
    accumulator: f64,
    step_count: u64,
}

impl FixedTicker {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            accumulator: 0.0,
            step_count: 0,
        }
    }

    /// Measure the elapsed frame time and run `step_fn` once per whole
    /// fixed step it covers. The leftover fraction stays in the accumulator
    /// for the next frame.
    pub fn tick(&mut self, step_fn: impl FnMut()) -> TickReport {
        let now = Instant::now();
        let frame_time = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(frame_time, step_fn)
    }

    /// Total fixed steps since creation.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    fn advance(&mut self, frame_time: f64, mut step_fn: impl FnMut()) -> TickReport {
        let frame_time = if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            MAX_FRAME_TIME
        } else {
            frame_time
        };

        self.accumulator += frame_time;
        let mut steps = 0u32;
        while self.accumulator >= FIXED_DT {
            step_fn();
            self.accumulator -= FIXED_DT;
            steps += 1;
        }
        self.step_count += u64::from(steps);

        TickReport {
            steps,
            frame_seconds: frame_time,
        }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_dt_is_sixty_hertz() {
        assert!(
            (FIXED_DT - 1.0 / 60.0).abs() < f64::EPSILON * 10.0,
            "FIXED_DT should equal 1/60"
        );
    }

    #[test]
    fn test_exact_frame_runs_one_step() {
        let mut ticker = FixedTicker::new();
        let report = ticker.advance(FIXED_DT, || {});
        assert_eq!(report.steps, 1);
        assert!(ticker.accumulator.abs() < 1e-12);
    }

    #[test]
    fn test_triple_frame_runs_three_steps() {
        let mut ticker = FixedTicker::new();
        let mut calls = 0u32;
        let report = ticker.advance(3.0 * FIXED_DT, || calls += 1);
        assert_eq!(report.steps, 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_partial_frame_carries_over() {
        let mut ticker = FixedTicker::new();
        let report = ticker.advance(0.5 * FIXED_DT, || {});
        assert_eq!(report.steps, 0, "half a step must not run");
        assert!((ticker.accumulator - 0.5 * FIXED_DT).abs() < 1e-12);

        // The second half completes the step.
        let report = ticker.advance(0.5 * FIXED_DT, || {});
        assert_eq!(report.steps, 1);
    }

    #[test]
    fn test_long_frame_is_clamped() {
        let mut ticker = FixedTicker::new();
        let report = ticker.advance(1.0, || {});
        let max_steps = (MAX_FRAME_TIME / FIXED_DT).ceil() as u32;
        assert!(report.steps > 0);
        assert!(
            report.steps <= max_steps,
            "expected at most {max_steps} steps, got {}",
            report.steps
        );
        assert!((report.frame_seconds - MAX_FRAME_TIME).abs() < 1e-12);
    }

    #[test]
    fn test_zero_frame_runs_nothing() {
        let mut ticker = FixedTicker::new();
        let report = ticker.advance(0.0, || {});
        assert_eq!(report.steps, 0);
        assert_eq!(report.frame_seconds, 0.0);
    }

    #[test]
    fn test_step_count_accumulates_across_frames() {
        let mut ticker = FixedTicker::new();
        for _ in 0..10 {
            ticker.advance(2.0 * FIXED_DT, || {});
        }
        assert_eq!(ticker.step_count(), 20);
    }

    #[test]
    fn test_identical_frame_sequences_step_identically() {
        let frame_times = [0.017, 0.015, 0.020, 0.016, 0.033, 0.008, 0.018];

        let mut a = FixedTicker::new();
        let mut b = FixedTicker::new();
        for &ft in &frame_times {
            let ra = a.advance(ft, || {});
            let rb = b.advance(ft, || {});
            assert_eq!(ra.steps, rb.steps, "step counts diverged at frame time {ft}");
        }
        assert_eq!(a.step_count(), b.step_count());
        assert!((a.accumulator - b.accumulator).abs() < 1e-15);
    }
}
