//! Mission sequencing around the satellite agent.
//!
//! After release the satellite lights its power indicator and stays idle for
//! the deployment delay, then runs nominal ticks until the orbit completes.
//! Records are fanned out to every registered sink; sink and indicator
//! failures are logged and dropped, never retried.

use crate::agent::{AgentError, SatelliteAgent};
use crate::clock::Clock;
use crate::indicators::{Indicator, IndicatorPanel};
use crate::noise::NoiseSource;
use crate::telemetry::{TelemetryRecord, TelemetrySink};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionPhase {
    Released,
    Deploying,
    Nominal,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissionEvent {
    Waiting { remaining: Duration },
    Started,
    Tick(TelemetryRecord),
    Complete,
}

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("mission polled before release")]
    NotReleased,
    #[error(transparent)]
    Agent(#[from] AgentError),
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MissionStats {
    pub ticks: u32,
    pub sink_failures: u32,
    pub indicator_failures: u32,
}

pub struct Mission<N: NoiseSource, C: Clock> {
    agent: SatelliteAgent<N, C>,
    phase: MissionPhase,
    sinks: Vec<Box<dyn TelemetrySink>>,
    indicators: Box<dyn IndicatorPanel>,
    stats: MissionStats,
}

impl<N: NoiseSource, C: Clock> Mission<N, C> {
    #[must_use]
    pub fn new(agent: SatelliteAgent<N, C>, indicators: Box<dyn IndicatorPanel>) -> Self {
        Self {
            agent,
            phase: MissionPhase::Released,
            sinks: Vec::new(),
            indicators,
            stats: MissionStats::default(),
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn TelemetrySink>) {
        self.sinks.push(sink);
    }

    #[must_use]
    pub fn phase(&self) -> MissionPhase {
        self.phase
    }

    #[must_use]
    pub fn agent(&self) -> &SatelliteAgent<N, C> {
        &self.agent
    }

    #[must_use]
    pub fn stats(&self) -> MissionStats {
        self.stats
    }

    /// Power on and start the deployment wait. Releasing twice is a no-op.
    pub fn release(&mut self) {
        if self.phase != MissionPhase::Released {
            return;
        }
        info!("released");
        self.set_indicator(Indicator::PoweredOn, true);
        self.phase = MissionPhase::Deploying;
    }

    /// Advance the mission by one driver period.
    ///
    /// # Errors
    ///
    /// Returns [`MissionError::NotReleased`] before [`release`](Self::release).
    pub fn poll(&mut self) -> Result<MissionEvent, MissionError> {
        match self.phase {
            MissionPhase::Released => Err(MissionError::NotReleased),
            MissionPhase::Deploying => Ok(self.poll_deployment()),
            MissionPhase::Nominal => {
                if self.agent.is_orbit_complete() {
                    self.stop();
                    return Ok(MissionEvent::Complete);
                }
                let record = self.agent.step()?;
                self.stats.ticks += 1;
                self.set_indicator(Indicator::GroundContact, self.agent.is_connected());
                self.publish(&record);
                Ok(MissionEvent::Tick(record))
            }
            MissionPhase::Complete => Ok(MissionEvent::Complete),
        }
    }

    /// Release if needed and poll until the orbit completes, returning the
    /// number of nominal ticks. With a wall clock this busy-waits through the
    /// deployment delay.
    ///
    /// # Errors
    ///
    /// Propagates agent failures from [`poll`](Self::poll).
    pub fn run_to_completion(&mut self) -> Result<u32, MissionError> {
        self.release();
        loop {
            if let MissionEvent::Complete = self.poll()? {
                return Ok(self.stats.ticks);
            }
        }
    }

    fn poll_deployment(&mut self) -> MissionEvent {
        let delay = self.agent.config().deployment_delay();
        let elapsed = self.agent.idle();
        if elapsed >= delay {
            info!(elapsed_s = elapsed.as_secs_f32(), "start operation");
            self.phase = MissionPhase::Nominal;
            MissionEvent::Started
        } else {
            MissionEvent::Waiting {
                remaining: delay - elapsed,
            }
        }
    }

    fn publish(&mut self, record: &TelemetryRecord) {
        for sink in &mut self.sinks {
            if let Err(e) = sink.record_telemetry(record) {
                self.stats.sink_failures += 1;
                warn!("dropping telemetry record: {}", e);
            }
        }
    }

    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        if let Err(e) = self.indicators.set_indicator(indicator, on) {
            self.stats.indicator_failures += 1;
            warn!(indicator = indicator.name(), "indicator update failed: {}", e);
        }
    }

    /// Flush every sink and mark the mission complete. Called on orbit end
    /// and by drivers that stop early; flush failures are counted like write
    /// failures.
    pub fn stop(&mut self) {
        if self.phase == MissionPhase::Complete {
            return;
        }
        for sink in &mut self.sinks {
            if let Err(e) = sink.flush() {
                self.stats.sink_failures += 1;
                warn!("telemetry flush failed: {}", e);
            }
        }
        self.phase = MissionPhase::Complete;
        info!(ticks = self.stats.ticks, "end operation");
    }
}
