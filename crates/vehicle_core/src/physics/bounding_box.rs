//! Axis-aligned bounding volumes

use crate::foundation::math::Vec3;
use crate::foundation::pose::Pose;

bitflags::bitflags! {
    /// Usage flags of a collision volume
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VolumeFlags: u8 {
        /// Inside the object, never collides with blocks
        const INTERIOR = 1 << 0;
        /// Only projectiles hit it
        const BULLET_ONLY = 1 << 1;
        /// Not used for ground contact
        const GROUND_EXCLUDED = 1 << 2;
    }
}

/// Axis-aligned box with a definition-space center and a world-space center.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingVolume {
    /// Center in the owner's definition space
    pub local_center: Vec3,
    /// Center in world space, refreshed every recompute
    pub global_center: Vec3,
    /// Half-extents along X, Y, Z
    pub half_extents: Vec3,
    /// Usage flags
    pub flags: VolumeFlags,
}

impl BoundingVolume {
    /// Volume with both centers at `center`
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            local_center: center,
            global_center: center,
            half_extents,
            flags: VolumeFlags::empty(),
        }
    }

    /// Volume with a local center, placed later
    pub fn local(local_center: Vec3, half_extents: Vec3, flags: VolumeFlags) -> Self {
        Self {
            local_center,
            global_center: local_center,
            half_extents,
            flags,
        }
    }

    /// Place the volume from its local center and the owner's pose
    pub fn update_to_pose(&mut self, pose: &Pose) {
        self.global_center = pose.to_world(&self.local_center);
    }

    /// Lowest world Y
    pub fn bottom(&self) -> f64 {
        self.global_center.y - self.half_extents.y
    }

    /// Highest world Y
    pub fn top(&self) -> f64 {
        self.global_center.y + self.half_extents.y
    }

    /// Minimum corner
    pub fn min(&self) -> Vec3 {
        self.global_center - self.half_extents
    }

    /// Maximum corner
    pub fn max(&self) -> Vec3 {
        self.global_center + self.half_extents
    }

    /// Copy grown by `amount` on each side of every axis
    pub fn expanded(&self, amount: Vec3) -> Self {
        let mut grown = self.clone();
        grown.half_extents += amount;
        grown
    }

    /// Overlap test; touching faces do not count
    pub fn intersects(&self, other: &Self) -> bool {
        let d = self.global_center - other.global_center;
        let r = self.half_extents + other.half_extents;
        d.x.abs() < r.x && d.y.abs() < r.y && d.z.abs() < r.z
    }

    /// Whether a world point lies inside or on the surface
    pub fn contains_point(&self, point: &Vec3) -> bool {
        let d = point - self.global_center;
        d.x.abs() <= self.half_extents.x && d.y.abs() <= self.half_extents.y && d.z.abs() <= self.half_extents.z
    }
}
