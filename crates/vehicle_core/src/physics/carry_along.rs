//! Carry-along movement of actors resting on a moving object
//!
//! After an object's volumes have been recomputed, actors standing on one
//! of its entity volumes are shifted by the same motion that volume
//! underwent, so they ride along without being attached.

use crate::foundation::ids::ActorId;
use crate::foundation::logging::trace;
use crate::foundation::math::{utils, Vec3};
use crate::foundation::pose::Pose;
use crate::world::{ActorRegistry, SpatialQuery};

use super::collision_groups::CollisionGroupManager;

/// Vertical growth of the encompassing bound for the actor query
pub const QUERY_MARGIN: f64 = 1.0;

/// Vertical growth of each actor's bound before the per-volume test
pub const ACTOR_EXPANSION: f64 = 0.25;

/// Largest distance between a volume top and an actor's feet that counts as resting
pub const RESTING_TOLERANCE: f64 = 0.5;

/// Movement applied to one actor
#[derive(Debug, Clone, PartialEq)]
pub struct CarriedActor {
    /// Who was moved
    pub actor: ActorId,
    /// Applied translation
    pub displacement: Vec3,
    /// Applied heading change in degrees
    pub yaw_delta: f64,
}

/// Wrap an angle difference into (-180, 180]
fn wrap_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Moves unattached actors resting on top of an object's entity volumes.
///
/// Does nothing when the pose did not change this tick or when the object
/// has no entity volumes. Each actor is moved by at most one volume.
pub fn carry_along<W>(collisions: &CollisionGroupManager, pose: &Pose, world: &mut W) -> Vec<CarriedActor>
where
    W: SpatialQuery + ActorRegistry + ?Sized,
{
    let mut carried = Vec::new();
    if !pose.changed() || collisions.entity_keys().is_empty() {
        return carried;
    }

    let query = collisions
        .encompassing_box()
        .expanded(Vec3::new(0.0, QUERY_MARGIN, 0.0));
    let rotation = pose.orientation * pose.prev_orientation.inverse();

    for id in world.actors_within(&query) {
        let Some(actor) = world.actor_mut(id) else {
            continue;
        };
        if actor.attachment_owner().is_some() || actor.is_spectating() {
            continue;
        }

        let actor_bounds = actor.bounds();
        let feet = actor_bounds.bottom();
        let probe = actor_bounds.expanded(Vec3::new(0.0, ACTOR_EXPANSION, 0.0));

        for volume in collisions.entity_collision_boxes() {
            if !probe.intersects(volume) {
                continue;
            }
            let bottom_delta = volume.top() - feet;
            if bottom_delta.abs() > RESTING_TOLERANCE {
                continue;
            }
            let vertical_speed = actor.velocity().y;
            if vertical_speed > 0.0 && vertical_speed >= bottom_delta {
                continue;
            }

            let relative = actor.position() - pose.prev_position;
            let rotated = rotation * relative;
            let displacement = rotated - relative + pose.position_delta() + Vec3::new(0.0, bottom_delta, 0.0);
            let yaw_delta = wrap_degrees(utils::yaw_of(&rotated) - utils::yaw_of(&relative));

            actor.set_position(actor.position() + displacement);
            actor.set_yaw(actor.yaw() + yaw_delta);
            trace!("carried {:?} by {:?}, yaw {:+.3}", id, displacement, yaw_delta);
            carried.push(CarriedActor {
                actor: id,
                displacement,
                yaw_delta,
            });
            break;
        }
    }
    carried
}
