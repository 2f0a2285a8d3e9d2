//! Object pose with one tick of history
//!
//! Carry-along and part placement both need to know where an object was
//! at the start of the tick as well as where it is now.

use super::math::{utils, Quat, Vec3};

/// Position and orientation of an object, plus the values of the previous tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    /// Current world position
    pub position: Vec3,
    /// Current world orientation
    pub orientation: Quat,
    /// Position at the start of the tick
    pub prev_position: Vec3,
    /// Orientation at the start of the tick
    pub prev_orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::at(Vec3::zeros(), Quat::identity())
    }
}

impl Pose {
    /// A pose that has not moved: previous equals current.
    pub fn at(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
            prev_position: position,
            prev_orientation: orientation,
        }
    }

    /// Roll the current pose into the previous slot and set a new current pose.
    pub fn advance(&mut self, position: Vec3, orientation: Quat) {
        self.prev_position = self.position;
        self.prev_orientation = self.orientation;
        self.position = position;
        self.orientation = orientation;
    }

    /// Whether the pose changed during the last advance
    pub fn changed(&self) -> bool {
        self.position != self.prev_position || self.orientation != self.prev_orientation
    }

    /// Movement of the origin during the last advance
    pub fn position_delta(&self) -> Vec3 {
        self.position - self.prev_position
    }

    /// Convert an object-relative offset into world space
    pub fn to_world(&self, local: &Vec3) -> Vec3 {
        self.position + self.orientation * local
    }

    /// Convert a world-space point into an object-relative offset
    pub fn to_local(&self, world: &Vec3) -> Vec3 {
        self.orientation.inverse() * (world - self.position)
    }

    /// Heading of the object's forward axis in degrees
    pub fn yaw(&self) -> f64 {
        utils::yaw_of(&(self.orientation * Vec3::z()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::utils::quat_from_euler_deg;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_keeps_history() {
        let mut pose = Pose::at(Vec3::new(1.0, 2.0, 3.0), Quat::identity());
        assert!(!pose.changed());

        pose.advance(Vec3::new(2.0, 2.0, 3.0), Quat::identity());
        assert!(pose.changed());
        assert_eq!(pose.prev_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.position_delta(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_world_local_roundtrip() {
        let pose = Pose::at(Vec3::new(5.0, 0.0, -2.0), quat_from_euler_deg(0.0, 90.0, 0.0));
        let world = pose.to_world(&Vec3::new(0.0, 1.0, 2.0));
        assert_relative_eq!(world, Vec3::new(7.0, 1.0, -2.0), epsilon = 1e-9);
        assert_relative_eq!(pose.to_local(&world), Vec3::new(0.0, 1.0, 2.0), epsilon = 1e-9);
        assert_relative_eq!(pose.yaw(), 90.0, epsilon = 1e-9);
    }
}
