use std::time::{Duration, Instant};

/// Shortest frame delta reported by `tick`.
pub const DT_MIN: Duration = Duration::from_micros(100);
/// Longest frame delta reported by `tick`.
pub const DT_MAX: Duration = Duration::from_millis(250);

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Seconds accumulated over all ticks so far, including this one.
    pub elapsed: f32,

    pub now: Instant,

    pub frame_index: u64,
}

/// Produces `FrameTime` snapshots for one render loop.
///
/// Deltas are clamped to `[DT_MIN, DT_MAX]` so a debugger pause or a
/// minimized window does not hand the camera a multi-second step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: Duration,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(DT_MIN, DT_MAX)
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            elapsed: Duration::ZERO,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Restarts delta measurement from now, e.g. after the window was restored.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances by the wall-clock time since the previous tick.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        self.step(now, dt)
    }

    /// Advances by exactly `dt` (still clamped). Used for fixed-step loops.
    pub fn advance(&mut self, dt: Duration) -> FrameTime {
        self.last += dt;
        self.step(self.last, dt)
    }

    fn step(&mut self, now: Instant, dt: Duration) -> FrameTime {
        let dt = dt.clamp(self.dt_min, self.dt_max);
        self.elapsed += dt;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_clamps_both_ends() {
        let mut clock = FrameClock::new();

        let tiny = clock.advance(Duration::ZERO);
        assert_eq!(tiny.dt, DT_MIN.as_secs_f32());

        let huge = clock.advance(Duration::from_secs(5));
        assert_eq!(huge.dt, DT_MAX.as_secs_f32());
    }

    #[test]
    fn frames_are_counted_and_accumulated() {
        let mut clock = FrameClock::new();
        let step = Duration::from_millis(16);

        let a = clock.advance(step);
        let b = clock.advance(step);

        assert_eq!((a.frame_index, b.frame_index), (0, 1));
        assert!((b.elapsed - 0.032).abs() < 1e-6);
        assert_eq!(b.now.duration_since(a.now), step);
    }

    #[test]
    fn tick_never_reports_zero() {
        let mut clock = FrameClock::new();
        let ft = clock.tick();
        assert!(ft.dt >= DT_MIN.as_secs_f32());
    }
}
