//! World collaborators
//!
//! The simulation core never owns the world. It reaches actors and blocks
//! through these traits, so the same code runs against a game server, a
//! replica client or the in-memory [`SimpleWorld`] used by tests and the
//! sandbox.

use crate::entity::damage::Damage;
use crate::foundation::ids::{ActorId, MaterialId, ObjectId, PlayerId};
use crate::foundation::math::Vec3;
use crate::physics::bounding_box::BoundingVolume;

pub mod simple;

pub use simple::{Block, SimpleActor, SimpleWorld};

/// Handle to an external actor (player, mob, dropped item).
pub trait Actor {
    /// Runtime handle
    fn id(&self) -> ActorId;

    /// Persistent identity, for players
    fn player_id(&self) -> Option<PlayerId>;

    /// Feet position
    fn position(&self) -> Vec3;

    /// Move the actor
    fn set_position(&mut self, position: Vec3);

    /// Velocity in blocks per tick
    fn velocity(&self) -> Vec3;

    /// Set velocity in blocks per tick
    fn set_velocity(&mut self, velocity: Vec3);

    /// World-space bounds
    fn bounds(&self) -> BoundingVolume;

    /// False once the actor was removed from the world
    fn is_valid(&self) -> bool;

    /// Object the actor is attached to
    fn attachment_owner(&self) -> Option<ObjectId>;

    /// Attach to or detach from an object
    fn set_attachment_owner(&mut self, owner: Option<ObjectId>);

    /// Heading in degrees, relative to the owner while attached
    fn yaw(&self) -> f64;

    /// Set heading in degrees
    fn set_yaw(&mut self, yaw: f64);

    /// Pitch in degrees
    fn pitch(&self) -> f64;

    /// Set pitch in degrees
    fn set_pitch(&mut self, pitch: f64);

    /// Crouching
    fn is_sneaking(&self) -> bool;

    /// Non-physical observer
    fn is_spectating(&self) -> bool;

    /// Server operator
    fn is_admin(&self) -> bool {
        false
    }

    /// Deliver a chat message
    fn send_message(&mut self, message: &str);
}

/// Read-only queries against the world.
pub trait SpatialQuery {
    /// Valid actors whose bounds intersect `bound`
    fn actors_within(&self, bound: &BoundingVolume) -> Vec<ActorId>;

    /// Hardness of the block containing `point`
    fn block_hardness(&self, point: &Vec3) -> f64;

    /// No block at `point`
    fn is_air(&self, point: &Vec3) -> bool;

    /// Material of the block at `point`
    fn block_material(&self, point: &Vec3) -> Option<MaterialId>;

    /// Slipperiness of the block at `point`, 0.6 for ordinary ground
    fn block_slipperiness(&self, point: &Vec3) -> f64;

    /// Whether `point` is inside a liquid
    fn is_liquid(&self, point: &Vec3) -> bool;
}

/// Access to actor handles.
pub trait ActorRegistry {
    /// Shared access to an actor
    fn actor(&self, id: ActorId) -> Option<&dyn Actor>;

    /// Mutable access to an actor
    fn actor_mut(&mut self, id: ActorId) -> Option<&mut dyn Actor>;
}

/// Side effects on the world.
pub trait DamageSink {
    /// Damage every actor inside `damage.bounds`, returning those hit
    fn attack_actors(&mut self, damage: &Damage) -> Vec<ActorId>;

    /// Spawn an explosion
    fn spawn_explosion(&mut self, position: Vec3, strength: f64, destructive: bool);
}

/// Everything the tick needs from the world.
pub trait World: SpatialQuery + ActorRegistry + DamageSink {}

impl<T: SpatialQuery + ActorRegistry + DamageSink> World for T {}
