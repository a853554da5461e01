//! Orbital environment model.
//!
//! The orbit is a fixed linear phase increment of one degree per tick. Ground
//! station visibility and illumination are pure functions of that phase.

use serde::{Deserialize, Serialize};

pub const ANGLE_STEP_DEG: f32 = 1.0;
pub const ORBIT_END_DEG: f32 = 360.0;

/// Ground-station visibility windows, inclusive on both ends.
pub const VISIBILITY_WINDOWS_DEG: [(f32, f32); 2] = [(70.0, 110.0), (250.0, 290.0)];

/// Sunlit strictly past this angle.
pub const ECLIPSE_EXIT_DEG: f32 = 180.0;

pub const DISTURBANCE_TORQUE_DELTA: f32 = 0.008;

/// Per-tick copy of the environment handed to every subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSnapshot {
    pub angle_deg: f32,
    pub is_visible: bool,
    pub is_sunlit: bool,
    pub disturbance_torque_delta: f32,
}

impl EnvironmentSnapshot {
    /// Build a snapshot for an arbitrary phase. Handy for driving a single
    /// subsystem without an orbit around it.
    #[must_use]
    pub fn at_angle(angle_deg: f32) -> Self {
        Self {
            angle_deg,
            is_visible: is_in_visible_area(angle_deg),
            is_sunlit: is_sunlit(angle_deg),
            disturbance_torque_delta: DISTURBANCE_TORQUE_DELTA,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrbitalEnvironment {
    angle_deg: f32,
    is_visible: bool,
    is_sunlit: bool,
    disturbance_torque_delta: f32,
}

impl OrbitalEnvironment {
    #[must_use]
    pub fn new() -> Self {
        Self {
            angle_deg: 0.0,
            is_visible: false,
            is_sunlit: false,
            disturbance_torque_delta: DISTURBANCE_TORQUE_DELTA,
        }
    }

    /// Move one step along the orbit and refresh the derived flags.
    ///
    /// The flags are only meaningful for a single period, so once
    /// [`is_orbit_complete`](Self::is_orbit_complete) reports true this leaves
    /// the phase and flags untouched and returns `false`.
    pub fn advance(&mut self) -> bool {
        if self.is_orbit_complete() {
            return false;
        }

        self.angle_deg += ANGLE_STEP_DEG;
        self.is_visible = is_in_visible_area(self.angle_deg);
        self.is_sunlit = is_sunlit(self.angle_deg);
        true
    }

    #[must_use]
    pub fn angle_deg(&self) -> f32 {
        self.angle_deg
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    #[must_use]
    pub fn is_sunlit(&self) -> bool {
        self.is_sunlit
    }

    #[must_use]
    pub fn disturbance_torque_delta(&self) -> f32 {
        self.disturbance_torque_delta
    }

    #[must_use]
    pub fn is_orbit_complete(&self) -> bool {
        self.angle_deg >= ORBIT_END_DEG
    }

    #[must_use]
    pub fn snapshot(&self) -> EnvironmentSnapshot {
        EnvironmentSnapshot {
            angle_deg: self.angle_deg,
            is_visible: self.is_visible,
            is_sunlit: self.is_sunlit,
            disturbance_torque_delta: self.disturbance_torque_delta,
        }
    }
}

impl Default for OrbitalEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[must_use]
pub fn is_in_visible_area(angle_deg: f32) -> bool {
    VISIBILITY_WINDOWS_DEG
        .iter()
        .any(|&(start, end)| (start..=end).contains(&angle_deg))
}

#[must_use]
pub fn is_sunlit(angle_deg: f32) -> bool {
    angle_deg > ECLIPSE_EXIT_DEG
}
