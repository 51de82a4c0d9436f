//! Frame timing and the fixed-tick accumulator.
//!
//! The driver calls [`Time::update`] once per loop iteration. Measured frame
//! time is added to an accumulator; the Tick phase then runs once for every
//! whole `tick_rate` the accumulator holds:
//!
//! ```text
//! time.update();                 // accumulator += delta
//! while time.tick_due() {        // accumulator >= tick_rate
//!     run Tick systems;
//!     time.consume_tick();       // accumulator -= tick_rate
//! }
//! ```
//!
//! The remainder carries over to the next frame, so fixed-rate logic stays
//! deterministic regardless of frame rate. [`Time::alpha`] is the fraction of
//! a tick left over, for interpolating between the last two simulated states.

use std::time::{Duration, Instant};

/// Default fixed step: 60 ticks per second.
pub const DEFAULT_TICK_RATE: f64 = 1.0 / 60.0;

/// Frame timing. Lives on [`Context`](crate::Context) and is updated by the
/// driver at the start of each iteration.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// When this clock was created.
    startup: Instant,
    /// Baseline for the next measured delta.
    last_update: Instant,
    /// Duration of the previous frame.
    delta: Duration,
    /// Sum of every delta fed in so far.
    elapsed: Duration,
    /// Fixed step length in seconds.
    tick_rate: f64,
    /// Unsimulated time in seconds.
    accumulator: f64,
    frame_count: u64,
    tick_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::with_tick_rate(DEFAULT_TICK_RATE)
    }

    /// # Panics
    ///
    /// If `tick_rate` is not a positive finite number of seconds.
    pub fn with_tick_rate(tick_rate: f64) -> Self {
        assert!(
            tick_rate.is_finite() && tick_rate > 0.0,
            "tick rate must be positive and finite, got {tick_rate}"
        );
        let now = Instant::now();
        Self {
            startup: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            tick_rate,
            accumulator: 0.0,
            frame_count: 0,
            tick_count: 0,
        }
    }

    /// Measure the wall-clock time since the previous call (or since
    /// construction) and feed it to [`advance`](Self::advance).
    pub fn update(&mut self) {
        let now = Instant::now();
        let measured = now - self.last_update;
        self.last_update = now;
        self.advance(measured);
    }

    /// Feed a frame of length `delta` into the clock.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.accumulator += delta.as_secs_f64();
        self.frame_count += 1;
    }

    /// `true` while the accumulator holds at least one whole tick.
    pub fn tick_due(&self) -> bool {
        self.accumulator >= self.tick_rate
    }

    /// Take one tick's worth of time out of the accumulator.
    pub fn consume_tick(&mut self) {
        self.accumulator -= self.tick_rate;
        self.tick_count += 1;
    }

    /// Drop every whole tick still pending, keeping the sub-tick remainder.
    /// Returns how many ticks were dropped.
    pub fn discard_pending_ticks(&mut self) -> u64 {
        let pending = (self.accumulator / self.tick_rate).floor();
        if pending < 1.0 {
            return 0;
        }
        self.accumulator -= pending * self.tick_rate;
        if self.accumulator < 0.0 {
            self.accumulator = 0.0;
        }
        pending as u64
    }

    /// Wall-clock seconds since this clock was created.
    pub fn current_time(&self) -> f64 {
        self.startup.elapsed().as_secs_f64()
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Total time fed through [`advance`](Self::advance).
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Fixed step length in seconds.
    pub fn tick_rate(&self) -> f64 {
        self.tick_rate
    }

    /// Fixed step length as a [`Duration`], for Tick systems that integrate.
    pub fn tick_delta(&self) -> Duration {
        Duration::from_secs_f64(self.tick_rate)
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    /// Fraction of a tick not yet simulated, in `[0, 1)` after the Tick loop.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.tick_rate
    }

    /// Number of `advance` / `update` calls so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Number of ticks consumed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Estimated FPS based on the last frame's delta.
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(time: &mut Time) -> u32 {
        let mut ticks = 0;
        while time.tick_due() {
            time.consume_tick();
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn fifty_ms_frame_runs_three_ticks_at_60hz() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(50));
        assert_eq!(drain(&mut time), 3);
        assert!(time.accumulator() < time.tick_rate());
        assert!(time.accumulator() >= 0.0);
    }

    #[test]
    fn remainder_carries_over_frames() {
        // Binary-exact values: tick = 1/4 s, frame = 3/8 s.
        let mut time = Time::with_tick_rate(0.25);
        time.advance(Duration::from_secs_f64(0.375));
        assert_eq!(drain(&mut time), 1);
        assert_eq!(time.accumulator(), 0.125);
        assert_eq!(time.alpha(), 0.5);

        time.advance(Duration::from_secs_f64(0.375));
        assert_eq!(drain(&mut time), 2);
        assert_eq!(time.accumulator(), 0.0);
        assert_eq!(time.tick_count(), 3);
        assert_eq!(time.frame_count(), 2);
    }

    #[test]
    fn short_frames_accumulate_before_ticking() {
        let mut time = Time::with_tick_rate(0.25);
        for _ in 0..3 {
            time.advance(Duration::from_secs_f64(0.0625));
            assert_eq!(drain(&mut time), 0);
        }
        time.advance(Duration::from_secs_f64(0.0625));
        assert_eq!(drain(&mut time), 1);
    }

    #[test]
    fn zero_delta_runs_no_ticks() {
        let mut time = Time::new();
        time.advance(Duration::ZERO);
        assert_eq!(drain(&mut time), 0);
        assert_eq!(time.fps(), 0.0);
    }

    #[test]
    fn discard_keeps_fractional_remainder() {
        let mut time = Time::with_tick_rate(0.25);
        time.advance(Duration::from_secs_f64(1.125));
        time.consume_tick();
        assert_eq!(time.discard_pending_ticks(), 3);
        assert_eq!(time.accumulator(), 0.125);
        assert!(!time.tick_due());
        assert_eq!(time.discard_pending_ticks(), 0);
    }

    #[test]
    fn update_measures_wall_clock() {
        let mut time = Time::new();
        std::thread::sleep(Duration::from_millis(5));
        time.update();
        assert!(time.delta() >= Duration::from_millis(5));
        assert_eq!(time.elapsed(), time.delta());
        assert!(time.current_time() >= time.delta().as_secs_f64());
    }

    #[test]
    fn current_time_is_monotonic() {
        let time = Time::new();
        let a = time.current_time();
        let b = time.current_time();
        assert!(b >= a);
    }

    #[test]
    #[should_panic(expected = "tick rate")]
    fn zero_tick_rate_panics() {
        Time::with_tick_rate(0.0);
    }
}
