//! Frame timing.

use instant::Instant;
use std::time::Duration;

/// Per-loop frame timer.
///
/// Tracks the timestamp of the previous frame and turns the current one into
/// a delta. A freshly created (or reset) timer has no prior timestamp, so the
/// first tick reports a zero delta instead of a bogus large one.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    last: Option<Instant>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Drops the previous timestamp. The next tick reports `Duration::ZERO`.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Advances the timer and returns the time elapsed since the previous
    /// tick. Non-monotonic timestamps saturate at zero.
    pub fn tick(&mut self, now: Instant) -> Duration {
        let dt = match self.last {
            Some(prev) if now >= prev => now - prev,
            Some(_) => Duration::ZERO,
            None => Duration::ZERO,
        };
        self.last = Some(now);
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_zero_delta() {
        let mut timer = FrameTimer::new();
        assert_eq!(timer.tick(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn tick_reports_elapsed_time() {
        let mut timer = FrameTimer::new();
        let t0 = Instant::now();
        timer.tick(t0);
        let dt = timer.tick(t0 + Duration::from_millis(16));
        assert_eq!(dt, Duration::from_millis(16));
        let dt = timer.tick(t0 + Duration::from_millis(20));
        assert_eq!(dt, Duration::from_millis(4));
    }

    #[test]
    fn backwards_timestamps_saturate_at_zero() {
        let mut timer = FrameTimer::new();
        let t0 = Instant::now();
        timer.tick(t0 + Duration::from_millis(50));
        assert_eq!(timer.tick(t0), Duration::ZERO);
    }

    #[test]
    fn reset_restarts_timestamp_tracking() {
        let mut timer = FrameTimer::new();
        let t0 = Instant::now();
        timer.tick(t0);
        timer.reset();
        assert_eq!(timer.tick(t0 + Duration::from_secs(1)), Duration::ZERO);
    }
}
