//! # Small Satellite Lab Simulator
//!
//! A closed-loop model of a small satellite on one orbit: a linear orbital
//! phase drives ground-station visibility and illumination, which in turn
//! drive the power, thermal and attitude subsystems. Every tick yields one
//! telemetry record.
//!
//! ## Features
//!
//! - **Orbital environment**: visibility windows, eclipse and a constant disturbance torque
//! - **Power**: battery integration with a 4.2 V ceiling and hysteretic power-saving mode
//! - **Thermal**: sunlit/eclipse heating with noisy temperature readings
//! - **Attitude**: despin control with one-tick control latency
//! - **Injected collaborators**: noise source, clock, telemetry sinks and status indicators
//!
//! ## Quick Start
//!
//! ```rust
//! use satlab::{SatelliteAgent, SimulationConfig};
//!
//! let mut config = SimulationConfig::default();
//! config.seed = Some(7);
//!
//! let mut agent = SatelliteAgent::new(config);
//! while !agent.is_orbit_complete() {
//!     let record = agent.step().unwrap();
//!     assert!(record.battery_voltage <= 4.2);
//! }
//! assert_eq!(agent.tick_count(), 360);
//! ```
//!
//! ## Architecture
//!
//! - [`environment`] - Orbital phase, visibility and illumination
//! - [`subsystems`] - Power, thermal and attitude models
//! - [`agent`] - Per-tick orchestration
//! - [`mission`] - Release, deployment wait and nominal operation
//! - [`telemetry`] - Records, CSV log and in-memory history
//! - [`indicators`] - Power and ground-contact status lights
//! - [`noise`], [`clock`], [`config`], [`display`]

#![deny(warnings)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod agent;
pub mod clock;
pub mod config;
pub mod display;
pub mod environment;
pub mod indicators;
pub mod mission;
pub mod noise;
pub mod subsystems;
pub mod telemetry;

// Re-export main public types for convenience
pub use agent::{AgentError, SatelliteAgent, StatusSnapshot};
pub use config::{ControlFeedback, SimulationConfig};
pub use environment::{EnvironmentSnapshot, OrbitalEnvironment};
pub use mission::{Mission, MissionEvent, MissionPhase};
pub use noise::{GaussianNoise, NoiseSource, ZeroNoise};
pub use subsystems::{AttitudeSystem, PowerSystem, ThermalSystem};
pub use telemetry::{CsvTelemetryLog, TelemetryHistory, TelemetryRecord, TelemetrySink};
