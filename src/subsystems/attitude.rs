use super::{Subsystem, SubsystemId};
use crate::environment::EnvironmentSnapshot;
use crate::noise::NoiseSource;
use serde::{Deserialize, Serialize};

pub const INITIAL_ANGULAR_VELOCITY: f32 = 3.0;
pub const DESPIN_GAIN: f32 = 0.1;
pub const DEFAULT_RATE_NOISE_SIGMA: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttitudeState {
    pub angular_velocity: f32,
    /// Torque delta integrated during the most recent update.
    pub applied_control_torque: f32,
    /// Torque delta computed after the most recent update, applied next tick.
    pub commanded_control_torque: f32,
}

/// Single-axis spin model with a one-tick control latency.
///
/// `update` integrates disturbance plus the torque applied for this tick;
/// `command_despin` stores the next torque without touching the current one.
#[derive(Debug, Clone)]
pub struct AttitudeSystem {
    state: AttitudeState,
}

impl AttitudeSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::with_angular_velocity(INITIAL_ANGULAR_VELOCITY)
    }

    #[must_use]
    pub fn with_angular_velocity(angular_velocity: f32) -> Self {
        Self {
            state: AttitudeState {
                angular_velocity,
                applied_control_torque: 0.0,
                commanded_control_torque: 0.0,
            },
        }
    }

    #[must_use]
    pub fn angular_velocity(&self) -> f32 {
        self.state.angular_velocity
    }

    #[must_use]
    pub fn applied_control_torque(&self) -> f32 {
        self.state.applied_control_torque
    }

    #[must_use]
    pub fn commanded_control_torque(&self) -> f32 {
        self.state.commanded_control_torque
    }

    /// Noisy gyro view of the angular velocity.
    pub fn read<N: NoiseSource + ?Sized>(&self, noise: &mut N, sigma: f32) -> f32 {
        noise.corrupt(self.state.angular_velocity, sigma)
    }

    /// Compute the despin torque from `measured_rate` and latch it for the
    /// next update. Returns the commanded value.
    pub fn command_despin(&mut self, measured_rate: f32) -> f32 {
        self.state.commanded_control_torque = compute_despin_control(measured_rate);
        self.state.commanded_control_torque
    }
}

impl Default for AttitudeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsystem for AttitudeSystem {
    type State = AttitudeState;

    fn id(&self) -> SubsystemId {
        SubsystemId::Attitude
    }

    fn update(&mut self, env: &EnvironmentSnapshot) {
        self.state.applied_control_torque = self.state.commanded_control_torque;
        self.state.angular_velocity +=
            env.disturbance_torque_delta + self.state.applied_control_torque;
    }

    fn get_state(&self) -> Self::State {
        self.state.clone()
    }
}

/// Proportional despin law: torque opposes the spin direction with magnitude
/// `DESPIN_GAIN * |rate|`.
#[must_use]
pub fn compute_despin_control(angular_velocity: f32) -> f32 {
    if angular_velocity > 0.0 {
        -DESPIN_GAIN * angular_velocity.abs()
    } else {
        DESPIN_GAIN * angular_velocity.abs()
    }
}
