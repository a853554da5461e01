pub mod power;
pub mod thermal;
pub mod attitude;

pub use power::{PowerSystem, PowerState, derive_power_saving_mode};
pub use thermal::{ThermalSystem, ThermalState};
pub use attitude::{AttitudeSystem, AttitudeState, compute_despin_control};

use crate::environment::EnvironmentSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubsystemId {
    Power,
    Thermal,
    Attitude,
}

/// A subsystem integrates its own state once per tick from the shared
/// environment snapshot. Cross-subsystem feedback is installed by the agent
/// between ticks, never during `update`.
pub trait Subsystem {
    type State: Clone + Serialize;

    fn id(&self) -> SubsystemId;
    fn update(&mut self, env: &EnvironmentSnapshot);
    fn get_state(&self) -> Self::State;
}
