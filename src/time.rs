//! Frame timing: a clamped per-frame delta and an averaging FPS counter.

use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,
    /// Seconds since the clock was created.
    pub elapsed: f32,
    pub frame_index: u64,
}

/// Produces one [`FrameTime`] per frame.
///
/// Delta time is clamped to `[dt_min, dt_max]`; a long stall counts as `dt_max`.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Restarts delta measurement, e.g. after a long blocking load.
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);
        self.last = now;

        let time = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Averages frame times over a fixed window so the displayed number is readable.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: f32,
    accumulated: f32,
    frames: u32,
    fps: f32,
    frame_ms: f32,
}

impl FpsCounter {
    pub fn new(window: f32) -> Self {
        Self {
            window,
            accumulated: 0.0,
            frames: 0,
            fps: 0.0,
            frame_ms: 0.0,
        }
    }

    /// Feeds one frame; returns true when the averages were refreshed.
    pub fn update(&mut self, dt: f32) -> bool {
        self.accumulated += dt;
        self.frames += 1;
        if self.accumulated < self.window {
            return false;
        }
        self.fps = self.frames as f32 / self.accumulated;
        self.frame_ms = self.accumulated * 1000.0 / self.frames as f32;
        self.accumulated = 0.0;
        self.frames = 0;
        true
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Average milliseconds per frame.
    pub fn frame_ms(&self) -> f32 {
        self.frame_ms
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_clamps_delta() {
        let mut clock = FrameClock::new();
        let base = clock.last;

        let first = clock.tick_at(base);
        assert!((first.dt - 0.0001).abs() < 1e-6);
        assert_eq!(first.frame_index, 0);

        let second = clock.tick_at(base + Duration::from_secs(5));
        assert_eq!(second.dt, 0.25);
        assert_eq!(second.frame_index, 1);

        let third = clock.tick_at(base + Duration::from_millis(5016));
        assert!((third.dt - 0.016).abs() < 1e-6);
        assert!(third.elapsed >= 5.0);
    }

    #[test]
    fn reset_forgets_the_stall() {
        let mut clock = FrameClock::new();
        let before = clock.last;
        std::thread::sleep(Duration::from_millis(2));
        clock.reset();
        assert!(clock.last > before);

        let time = clock.tick_at(clock.last + Duration::from_millis(16));
        assert!((time.dt - 0.016).abs() < 1e-6);
        assert_eq!(time.frame_index, 0);
    }

    #[test]
    fn fps_counter_averages_over_window() {
        let mut counter = FpsCounter::new(0.5);
        for _ in 0..15 {
            assert!(!counter.update(0.03125));
        }
        assert!(counter.update(0.03125));
        assert_eq!(counter.fps(), 32.0);
        assert_eq!(counter.frame_ms(), 31.25);
        assert!(!counter.update(0.03125));
    }
}
