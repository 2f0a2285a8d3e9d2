//! Collision volumes and the motion they impart
//!
//! Bounding volumes, the per-object collision group manager and the
//! carry-along mover that runs after each recompute.

pub mod bounding_box;
pub mod carry_along;
pub mod collision_groups;

pub use bounding_box::{BoundingVolume, VolumeFlags};
pub use carry_along::{carry_along, CarriedActor};
pub use collision_groups::{
    collision_damage_variable, CollisionContext, CollisionGroupManager, ResetState, VolumeKey,
};
