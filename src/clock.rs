use std::time::{Duration, Instant};

/// Elapsed-time source queried once per tick for telemetry timestamps.
pub trait Clock {
    fn elapsed(&self) -> Duration;

    /// Called by the agent at the start of every tick.
    fn on_tick(&mut self, _period: Duration) {}

    #[must_use]
    fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }
}

/// Wall-clock time since construction.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Simulated time that advances only when ticked or explicitly moved.
#[derive(Debug, Clone, Default)]
pub struct SimulatedClock {
    now: Duration,
}

impl SimulatedClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }
}

impl Clock for SimulatedClock {
    fn elapsed(&self) -> Duration {
        self.now
    }

    fn on_tick(&mut self, period: Duration) {
        self.advance(period);
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }

    fn on_tick(&mut self, period: Duration) {
        (**self).on_tick(period);
    }
}
