use crate::clock::{Clock, MonotonicClock};
use crate::config::{ControlFeedback, SimulationConfig};
use crate::environment::{EnvironmentSnapshot, OrbitalEnvironment};
use crate::noise::{GaussianNoise, NoiseSource};
use crate::subsystems::{
    AttitudeState, AttitudeSystem, PowerState, PowerSystem, Subsystem, ThermalState,
    ThermalSystem,
};
use crate::telemetry::TelemetryRecord;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    #[error("orbit already complete at {angle_deg} deg; no further ticks are defined")]
    OrbitComplete { angle_deg: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AgentState {
    pub tick_count: u32,
    pub is_connected: bool,
    pub power_mode_changes: u32,
    pub contact_passes: u32,
}

/// Everything the console and indicator collaborators read after a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub tick: u32,
    pub angle_deg: f32,
    pub is_connected: bool,
    pub is_sunlit: bool,
    pub is_power_saving_mode: bool,
    pub record: Option<TelemetryRecord>,
    pub power: PowerState,
    pub thermal: ThermalState,
    pub attitude: AttitudeState,
}

/// One-orbit simulation step: advances the environment and runs power,
/// thermal and attitude in that order against a single snapshot.
///
/// Power mode and despin torque cross tick boundaries only: each is computed
/// at the end of a tick and consumed at the start of the next.
pub struct SatelliteAgent<N: NoiseSource = GaussianNoise, C: Clock = MonotonicClock> {
    environment: OrbitalEnvironment,
    power_system: PowerSystem,
    thermal_system: ThermalSystem,
    attitude_system: AttitudeSystem,

    noise: N,
    clock: C,
    config: SimulationConfig,

    state: AgentState,
    last_record: Option<TelemetryRecord>,
}

impl SatelliteAgent {
    /// Agent with Gaussian noise (seeded from the config when a seed is set)
    /// and a wall clock.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let noise = GaussianNoise::seeded_or_entropy(config.seed);
        Self::with_parts(config, noise, MonotonicClock::new())
    }
}

impl<N: NoiseSource, C: Clock> SatelliteAgent<N, C> {
    #[must_use]
    pub fn with_parts(config: SimulationConfig, noise: N, clock: C) -> Self {
        Self {
            environment: OrbitalEnvironment::new(),
            power_system: PowerSystem::new(),
            thermal_system: ThermalSystem::new(),
            attitude_system: AttitudeSystem::new(),
            noise,
            clock,
            config,
            state: AgentState::default(),
            last_record: None,
        }
    }

    /// Replace the initial subsystem states.
    #[must_use]
    pub fn with_subsystems(
        mut self,
        power_system: PowerSystem,
        thermal_system: ThermalSystem,
        attitude_system: AttitudeSystem,
    ) -> Self {
        self.power_system = power_system;
        self.thermal_system = thermal_system;
        self.attitude_system = attitude_system;
        self
    }

    /// Run one tick and return its telemetry record.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::OrbitComplete`] without touching any state once
    /// the orbit has completed.
    pub fn step(&mut self) -> Result<TelemetryRecord, AgentError> {
        if self.environment.is_orbit_complete() {
            return Err(AgentError::OrbitComplete {
                angle_deg: self.environment.angle_deg(),
            });
        }

        self.clock.on_tick(self.config.tick_period());
        self.environment.advance();
        let env = self.environment.snapshot();
        self.check_connection(&env);

        let battery_voltage = self.update_power(&env);

        self.thermal_system.update(&env);
        let temperature = self
            .thermal_system
            .read(&mut self.noise, self.config.effective_temperature_sigma());

        self.attitude_system.update(&env);
        let angular_velocity = self
            .attitude_system
            .read(&mut self.noise, self.config.effective_angular_velocity_sigma());
        let feedback_rate = match self.config.control_feedback {
            ControlFeedback::Truth => self.attitude_system.angular_velocity(),
            ControlFeedback::Measured => angular_velocity,
        };
        let control_torque = self.attitude_system.command_despin(feedback_rate);

        let record = TelemetryRecord {
            time_s: self.clock.elapsed_secs(),
            battery_voltage,
            temperature,
            angular_velocity,
            control_torque,
        };

        self.state.tick_count += 1;
        self.last_record = Some(record);

        debug!(
            angle_deg = env.angle_deg,
            sunlit = env.is_sunlit,
            visible = env.is_visible,
            battery = record.battery_voltage,
            temp = record.temperature,
            rate = record.angular_velocity,
            torque = record.control_torque,
            "tick {}",
            self.state.tick_count
        );

        Ok(record)
    }

    /// Let time pass without stepping the orbit. Returns the elapsed time.
    pub fn idle(&mut self) -> Duration {
        self.clock.on_tick(self.config.tick_period());
        self.clock.elapsed()
    }

    fn check_connection(&mut self, env: &EnvironmentSnapshot) {
        let was_connected = self.state.is_connected;
        self.state.is_connected = env.is_visible;

        if env.is_visible && !was_connected {
            self.state.contact_passes += 1;
            info!(angle_deg = env.angle_deg, "ground station contact acquired");
        } else if !env.is_visible && was_connected {
            info!(angle_deg = env.angle_deg, "ground station contact lost");
        }
    }

    fn update_power(&mut self, env: &EnvironmentSnapshot) -> f32 {
        self.power_system.update(env);

        let previous_mode = self.power_system.is_power_saving_mode();
        let next_mode = self.power_system.next_mode();
        self.power_system.apply_mode(next_mode);

        let battery_voltage = self.power_system.battery_voltage();
        if next_mode != previous_mode {
            self.state.power_mode_changes += 1;
            if next_mode {
                info!(battery_voltage, "entering power saving mode");
            } else {
                info!(battery_voltage, "leaving power saving mode");
            }
        }
        battery_voltage
    }

    #[must_use]
    pub fn status(&self) -> StatusSnapshot {
        StatusSnapshot {
            tick: self.state.tick_count,
            angle_deg: self.environment.angle_deg(),
            is_connected: self.state.is_connected,
            is_sunlit: self.environment.is_sunlit(),
            is_power_saving_mode: self.power_system.is_power_saving_mode(),
            record: self.last_record,
            power: self.power_system.get_state(),
            thermal: self.thermal_system.get_state(),
            attitude: self.attitude_system.get_state(),
        }
    }

    #[must_use]
    pub fn is_orbit_complete(&self) -> bool {
        self.environment.is_orbit_complete()
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.is_connected
    }

    #[must_use]
    pub fn is_power_saving_mode(&self) -> bool {
        self.power_system.is_power_saving_mode()
    }

    #[must_use]
    pub fn is_sunlit(&self) -> bool {
        self.environment.is_sunlit()
    }

    #[must_use]
    pub fn tick_count(&self) -> u32 {
        self.state.tick_count
    }

    #[must_use]
    pub fn get_state(&self) -> AgentState {
        self.state
    }

    #[must_use]
    pub fn last_record(&self) -> Option<&TelemetryRecord> {
        self.last_record.as_ref()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[must_use]
    pub fn environment(&self) -> &OrbitalEnvironment {
        &self.environment
    }

    #[must_use]
    pub fn power(&self) -> &PowerSystem {
        &self.power_system
    }

    #[must_use]
    pub fn thermal(&self) -> &ThermalSystem {
        &self.thermal_system
    }

    #[must_use]
    pub fn attitude(&self) -> &AttitudeSystem {
        &self.attitude_system
    }
}
