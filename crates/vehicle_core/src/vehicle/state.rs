//! Driver inputs and motion state shared with parts

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Sea-level air density
pub const SEA_LEVEL_AIR_DENSITY: f64 = 1.225;

/// Driver inputs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Controls {
    /// Throttle, 0 to 1
    pub throttle: f64,
    /// Brake, 0 to 1
    pub brake: f64,
    /// Parking brake engaged
    pub parking_brake: bool,
    /// Rudder or steering angle in degrees
    pub rudder_angle: f64,
    /// Dynamic-pitch propellers reverse
    pub reverse_thrust: bool,
    /// Tracks turn by driving each side in opposite directions
    pub skid_steer: bool,
}

/// Motion of the vehicle body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Motion {
    /// Velocity in blocks per tick
    pub motion: Vec3,
    /// Speed in blocks per tick
    pub speed: f64,
    /// Speed along the ground
    pub ground_velocity: f64,
    /// Moving backwards
    pub going_in_reverse: bool,
    /// Animation scale for wheel rotation
    pub speed_factor: f64,
    /// Air density at the vehicle's altitude
    pub air_density: f64,
    /// Wheels are losing grip
    pub slipping: bool,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            motion: Vec3::zeros(),
            speed: 0.0,
            ground_velocity: 0.0,
            going_in_reverse: false,
            speed_factor: 1.0,
            air_density: SEA_LEVEL_AIR_DENSITY,
            slipping: false,
        }
    }
}

impl Motion {
    /// Halves every 500 blocks of altitude
    pub fn air_density_at(altitude: f64) -> f64 {
        SEA_LEVEL_AIR_DENSITY * 2f64.powf(-altitude / 500.0)
    }

    /// Set velocity and the derived speed values.
    ///
    /// Ground velocity is the horizontal speed. The reverse flag is set when
    /// the body moves against `forward`.
    pub fn set_velocity(&mut self, motion: Vec3, forward: &Vec3) {
        self.motion = motion;
        self.speed = motion.norm();
        let horizontal = Vec3::new(motion.x, 0.0, motion.z).norm();
        self.going_in_reverse = motion.dot(forward) < 0.0;
        self.ground_velocity = horizontal;
    }
}
