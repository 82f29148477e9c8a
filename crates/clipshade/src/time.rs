//! Wall-clock frame timing for the camera orbit and diagnostics. The spin
//! animation counts presented frames and never reads this.

use std::time::{Duration, Instant};

/// Weight of the newest sample in the smoothed frame rate.
const FPS_SMOOTHING: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct Time {
    startup: Instant,
    last_tick: Instant,
    delta: Duration,
    frames: u64,
    fps: f32,
}

impl Time {
    pub(crate) fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            startup: now,
            last_tick: now,
            delta: Duration::ZERO,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Start a new frame.
    pub(crate) fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.frames += 1;

        let secs = self.delta.as_secs_f32();
        if secs > 0.0 {
            let instant = 1.0 / secs;
            self.fps = if self.fps == 0.0 {
                instant
            } else {
                self.fps + (instant - self.fps) * FPS_SMOOTHING
            };
        }
    }

    /// Seconds since the previous frame started.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Seconds from startup to the start of the current frame.
    pub fn elapsed_secs(&self) -> f32 {
        self.last_tick.duration_since(self.startup).as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Smoothed frame rate, `0.0` until two frames have been timed.
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_count_frames_and_elapsed_time() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0);
        assert_eq!(time.frame_count(), 0);
        assert_eq!(time.fps(), 0.0);

        time.tick_at(t0 + Duration::from_millis(20));
        time.tick_at(t0 + Duration::from_millis(30));
        assert_eq!(time.frame_count(), 2);
        assert!((time.delta_secs() - 0.010).abs() < 1e-6);
        assert!((time.elapsed_secs() - 0.030).abs() < 1e-6);
    }

    #[test]
    fn fps_starts_at_the_first_sample_then_smooths() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0);
        time.tick_at(t0 + Duration::from_millis(10));
        assert!((time.fps() - 100.0).abs() < 1e-2);

        // One 50 fps frame only pulls the estimate a tenth of the way.
        time.tick_at(t0 + Duration::from_millis(30));
        assert!((time.fps() - 95.0).abs() < 1e-2);
    }

    #[test]
    fn repeated_tick_at_the_same_instant_keeps_fps() {
        let t0 = Instant::now();
        let mut time = Time::starting_at(t0);
        time.tick_at(t0 + Duration::from_millis(16));
        let fps = time.fps();
        time.tick_at(t0 + Duration::from_millis(16));
        assert_eq!(time.delta_secs(), 0.0);
        assert_eq!(time.fps(), fps);
    }
}
