/// Fixed-rate pacing for the main loop and the simulated game clock.

use std::time::{Duration, Instant};

/// Paces the real-time loop at a fixed tick rate.
#[derive(Clone, Copy, Debug)]
pub struct Scheduler {
    tick: Duration,
}

impl Scheduler {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    pub fn from_rate(hz: u32) -> Self {
        Self::new(Duration::from_secs_f64(1.0 / hz.max(1) as f64))
    }

    pub fn tick_duration(&self) -> Duration {
        self.tick
    }

    /// How long to sleep after a frame that took `elapsed`.
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.tick.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    /// Sleep out the rest of the frame that began at `frame_start`.
    pub fn pace(&self, frame_start: Instant) {
        if let Some(rest) = self.remaining(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }
}

/// Game time, advanced only by the simulation's `dt`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimClock {
    now: Duration,
}

impl SimClock {
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn advance(&mut self, dt: Duration) -> Duration {
        self.now += dt;
        self.now
    }
}
