use super::{Subsystem, SubsystemId};
use crate::environment::EnvironmentSnapshot;
use crate::noise::NoiseSource;
use serde::{Deserialize, Serialize};

pub const INITIAL_OUTER_TEMP_C: f32 = 30.0;
pub const TEMP_DELTA_PER_TICK_C: f32 = 0.36;
pub const DEFAULT_TEMP_NOISE_SIGMA_C: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalState {
    pub outer_temp_c: f32,
    pub heating: bool,
}

/// Outer-panel temperature, heating in sunlight and cooling in eclipse at a
/// fixed rate. No physical floor or ceiling is modelled.
#[derive(Debug, Clone)]
pub struct ThermalSystem {
    state: ThermalState,
}

impl ThermalSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::with_temperature(INITIAL_OUTER_TEMP_C)
    }

    #[must_use]
    pub fn with_temperature(outer_temp_c: f32) -> Self {
        Self {
            state: ThermalState {
                outer_temp_c,
                heating: false,
            },
        }
    }

    #[must_use]
    pub fn outer_temp_c(&self) -> f32 {
        self.state.outer_temp_c
    }

    /// Noisy sensor view of the outer temperature.
    pub fn read<N: NoiseSource + ?Sized>(&self, noise: &mut N, sigma: f32) -> f32 {
        noise.corrupt(self.state.outer_temp_c, sigma)
    }
}

impl Default for ThermalSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsystem for ThermalSystem {
    type State = ThermalState;

    fn id(&self) -> SubsystemId {
        SubsystemId::Thermal
    }

    fn update(&mut self, env: &EnvironmentSnapshot) {
        let delta = if env.is_sunlit {
            TEMP_DELTA_PER_TICK_C
        } else {
            -TEMP_DELTA_PER_TICK_C
        };
        self.state.outer_temp_c += delta;
        self.state.heating = env.is_sunlit;
    }

    fn get_state(&self) -> Self::State {
        self.state.clone()
    }
}
