use super::{Subsystem, SubsystemId};
use crate::environment::EnvironmentSnapshot;
use serde::{Deserialize, Serialize};
use static_assertions::const_assert;

pub const MAX_VOLTAGE: f32 = 4.2;
pub const POWER_SAVE_ENTER_VOLTAGE: f32 = 3.5;
pub const POWER_SAVE_EXIT_VOLTAGE: f32 = 4.0;

pub const SOLAR_CHARGING_CURRENT: f32 = 0.008;
pub const NOMINAL_DISCHARGE_CURRENT: f32 = 0.005;
pub const POWER_SAVE_DISCHARGE_CURRENT: f32 = 0.002;

// Dead band must be non-empty and reachable from a full battery.
const_assert!(POWER_SAVE_ENTER_VOLTAGE < POWER_SAVE_EXIT_VOLTAGE);
const_assert!(POWER_SAVE_EXIT_VOLTAGE < MAX_VOLTAGE);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerState {
    pub battery_voltage: f32,
    pub charging_current: f32,
    pub discharge_current: f32,
    pub power_saving_mode: bool,
    pub charging: bool,
}

/// Electrical power subsystem.
///
/// The battery is a plain integrator clamped at [`MAX_VOLTAGE`]. There is no
/// lower clamp: a long eclipse in normal mode keeps draining it.
#[derive(Debug, Clone)]
pub struct PowerSystem {
    state: PowerState,
}

impl PowerSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::with_voltage(MAX_VOLTAGE)
    }

    #[must_use]
    pub fn with_voltage(battery_voltage: f32) -> Self {
        Self {
            state: PowerState {
                battery_voltage,
                charging_current: 0.0,
                discharge_current: 0.0,
                power_saving_mode: false,
                charging: false,
            },
        }
    }

    #[must_use]
    pub fn battery_voltage(&self) -> f32 {
        self.state.battery_voltage
    }

    #[must_use]
    pub fn is_power_saving_mode(&self) -> bool {
        self.state.power_saving_mode
    }

    /// Install the mode the next integration step will run under.
    pub fn apply_mode(&mut self, power_saving_mode: bool) {
        self.state.power_saving_mode = power_saving_mode;
    }

    /// Mode derived from the voltage reached this tick. The caller applies it
    /// with [`apply_mode`](Self::apply_mode) so it governs the next tick.
    #[must_use]
    pub fn next_mode(&self) -> bool {
        derive_power_saving_mode(self.state.battery_voltage, self.state.power_saving_mode)
    }

    fn integrate(&mut self, env: &EnvironmentSnapshot) {
        self.state.charging_current = if env.is_sunlit {
            SOLAR_CHARGING_CURRENT
        } else {
            0.0
        };
        self.state.discharge_current = if self.state.power_saving_mode {
            POWER_SAVE_DISCHARGE_CURRENT
        } else {
            NOMINAL_DISCHARGE_CURRENT
        };

        self.state.battery_voltage += self.state.charging_current - self.state.discharge_current;
        if self.state.battery_voltage > MAX_VOLTAGE {
            self.state.battery_voltage = MAX_VOLTAGE;
        }
        self.state.charging = self.state.charging_current > self.state.discharge_current;

        debug_assert!(
            self.state.battery_voltage <= MAX_VOLTAGE,
            "Battery voltage {} exceeds maximum {}",
            self.state.battery_voltage,
            MAX_VOLTAGE
        );
    }
}

impl Default for PowerSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsystem for PowerSystem {
    type State = PowerState;

    fn id(&self) -> SubsystemId {
        SubsystemId::Power
    }

    fn update(&mut self, env: &EnvironmentSnapshot) {
        self.integrate(env);
    }

    fn get_state(&self) -> Self::State {
        self.state.clone()
    }
}

/// Hysteresis between the power-save entry and exit thresholds. Inside the
/// dead band the previous mode is kept.
#[must_use]
pub fn derive_power_saving_mode(voltage: f32, previous_mode: bool) -> bool {
    if voltage < POWER_SAVE_ENTER_VOLTAGE {
        true
    } else if voltage > POWER_SAVE_EXIT_VOLTAGE {
        false
    } else {
        previous_mode
    }
}
