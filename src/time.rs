//! Frame clock feeding elapsed time to the simulator.
//!
//! The simulator only ever needs a monotonically increasing elapsed value.
//! [`Clock`] produces it either from the wall clock or from a fixed step, the
//! latter giving reproducible runs for previews and tests.
//!
//! # Example
//!
//! ```ignore
//! use neurofield::time::Clock;
//!
//! let mut clock = Clock::fixed(1.0 / 60.0);
//! let frame = field.tick(&mut clock);
//! println!("t = {:.2}s, frame {}", clock.elapsed(), clock.frame());
//! ```

use std::time::{Duration, Instant};

/// Where the clock takes its time from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockMode {
    /// Measure real time between ticks.
    RealTime,
    /// Advance by the same step every tick.
    Fixed(f32),
}

/// Elapsed-time source for the frame loop.
#[derive(Debug)]
pub struct Clock {
    mode: ClockMode,
    last_tick: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
    paused: bool,
    time_scale: f32,
}

impl Clock {
    /// Clock driven by the wall clock.
    pub fn real_time() -> Self {
        Self::with_mode(ClockMode::RealTime)
    }

    /// Clock that advances `step` seconds per tick.
    pub fn fixed(step: f32) -> Self {
        Self::with_mode(ClockMode::Fixed(step.max(0.0)))
    }

    fn with_mode(mode: ClockMode) -> Self {
        Self {
            mode,
            last_tick: Instant::now(),
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            paused: false,
            time_scale: 1.0,
        }
    }

    /// Advance one frame. Returns the new elapsed time in seconds.
    ///
    /// While paused the elapsed time holds still and the frame counter does
    /// not move.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = match self.mode {
            ClockMode::RealTime => now.duration_since(self.last_tick).as_secs_f32(),
            ClockMode::Fixed(step) => step,
        };
        self.last_tick = now;

        if self.paused {
            self.delta_secs = 0.0;
            return self.elapsed_secs;
        }

        self.delta_secs = raw * self.time_scale;
        self.elapsed_secs += self.delta_secs;
        self.frame_count += 1;
        self.elapsed_secs
    }

    /// Elapsed seconds since start, excluding paused time.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds added by the last tick.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Ticks taken while running.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Real-time or fixed-step.
    #[inline]
    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Stop advancing elapsed time.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Continue advancing elapsed time after a pause.
    pub fn resume(&mut self) {
        if self.paused {
            self.last_tick = Instant::now();
            self.paused = false;
        }
    }

    /// Set the speed multiplier. Negative values clamp to 0 so elapsed time
    /// never runs backwards.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Elapsed time as a [`Duration`].
    pub fn elapsed_duration(&self) -> Duration {
        Duration::from_secs_f32(self.elapsed_secs)
    }

    /// Return to time zero, keeping mode and scale.
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
        self.elapsed_secs = 0.0;
        self.delta_secs = 0.0;
        self.frame_count = 0;
        self.paused = false;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::real_time()
    }
}
