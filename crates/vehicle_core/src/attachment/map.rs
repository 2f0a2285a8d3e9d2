//! # Attachment Map
//!
//! Two-way index between an object's attachment points and the actors
//! mounted on them. Points are enumerated from the definition once; every
//! caller-supplied point is resolved to its canonical index by value before
//! it touches the map, so callers may pass copies.
//!
//! Saved points from the last save form a queue: a restoring actor mounted
//! without an explicit point takes the first one.

use std::collections::HashMap;

use crate::events::{EventBroadcaster, SyncEvent};
use crate::foundation::ids::{ActorId, ObjectId, Side};
use crate::foundation::logging::debug;
use crate::foundation::math::Vec3;
use crate::foundation::pose::Pose;
use crate::world::{Actor, ActorRegistry};

/// Component tolerance for point equality
pub const POINT_EPSILON: f64 = 1e-6;

/// Mass each attached actor adds to the owner
pub const MASS_PER_OCCUPANT: f64 = 100.0;

/// Value equality for attachment points
pub fn points_equal(a: &Vec3, b: &Vec3) -> bool {
    (a - b).amax() <= POINT_EPSILON
}

/// Bijection between attachment points and attached actors.
#[derive(Debug, Clone)]
pub struct AttachmentMap {
    object: ObjectId,
    side: Side,
    points: Vec<Vec3>,
    point_to_actor: Vec<Option<ActorId>>,
    actor_to_point: HashMap<ActorId, usize>,
    saved_points: Vec<Vec3>,
}

impl AttachmentMap {
    /// Map over the given canonical points
    pub fn new(object: ObjectId, side: Side, points: Vec<Vec3>) -> Self {
        let point_to_actor = vec![None; points.len()];
        Self {
            object,
            side,
            points,
            point_to_actor,
            actor_to_point: HashMap::new(),
            saved_points: Vec::new(),
        }
    }

    /// Canonical index of a point value
    pub fn resolve(&self, point: &Vec3) -> Option<usize> {
        self.points.iter().position(|p| points_equal(p, point))
    }

    /// Canonical points
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Occupant of a point
    pub fn actor_at(&self, point: &Vec3) -> Option<ActorId> {
        self.resolve(point).and_then(|index| self.point_to_actor[index])
    }

    /// Point an actor is attached to
    pub fn point_of(&self, actor: ActorId) -> Option<Vec3> {
        self.actor_to_point.get(&actor).map(|index| self.points[*index])
    }

    /// Whether the actor is attached here
    pub fn is_attached(&self, actor: ActorId) -> bool {
        self.actor_to_point.contains_key(&actor)
    }

    /// Number of attached actors
    pub fn occupant_count(&self) -> usize {
        self.actor_to_point.len()
    }

    /// Attached actors in point order
    pub fn occupants(&self) -> Vec<ActorId> {
        self.point_to_actor.iter().filter_map(|a| *a).collect()
    }

    /// Mass contributed by occupants
    pub fn mass(&self) -> f64 {
        MASS_PER_OCCUPANT * self.occupant_count() as f64
    }

    /// Replace the restore queue, usually from a save
    pub fn restore_saved_points(&mut self, points: Vec<Vec3>) {
        self.saved_points = points;
    }

    /// Points still waiting for their actor
    pub fn saved_points(&self) -> &[Vec3] {
        &self.saved_points
    }

    /// Occupied points in point order, for saving
    pub fn points_for_save(&self) -> Vec<Vec3> {
        self.point_to_actor
            .iter()
            .zip(&self.points)
            .filter(|(actor, _)| actor.is_some())
            .map(|(_, point)| *point)
            .collect()
    }

    /// Attach `actor` to `requested`, or to the first saved point when `None`.
    ///
    /// Fails on an empty restore queue, an unknown point or an occupied
    /// point. A first mount turns the actor to face the object's forward
    /// axis; a remount moves the actor off its old point.
    pub fn mount(&mut self, actor: &mut dyn Actor, requested: Option<Vec3>, events: &mut dyn EventBroadcaster) -> bool {
        self.mount_inner(actor, requested, Some(events))
    }

    fn mount_inner(
        &mut self,
        actor: &mut dyn Actor,
        requested: Option<Vec3>,
        events: Option<&mut dyn EventBroadcaster>,
    ) -> bool {
        let point = match requested {
            Some(point) => point,
            None => match self.saved_points.first() {
                Some(point) => *point,
                None => return false,
            },
        };

        if let Some(saved) = self.saved_points.iter().position(|p| points_equal(p, &point)) {
            self.saved_points.remove(saved);
        }
        let Some(index) = self.resolve(&point) else {
            return false;
        };
        if self.point_to_actor[index].is_some() {
            return false;
        }

        let id = actor.id();
        match self.actor_to_point.get(&id) {
            Some(old) => self.point_to_actor[*old] = None,
            None => actor.set_yaw(0.0),
        }
        self.point_to_actor[index] = Some(id);
        self.actor_to_point.insert(id, index);

        if self.side.is_authority() {
            actor.set_attachment_owner(Some(self.object));
            if let Some(events) = events {
                events.broadcast(SyncEvent::AttachmentChanged {
                    object: self.object,
                    actor: id,
                    point: Some(self.points[index]),
                });
            }
        }
        debug!("{}: mounted {:?} at point {}", self.object, id, index);
        true
    }

    /// Detach `actor`. No-op when it is not attached here.
    pub fn dismount(&mut self, actor: &mut dyn Actor, events: &mut dyn EventBroadcaster) {
        if self.remove(actor.id(), Some(events)) && self.side.is_authority() {
            actor.set_attachment_owner(None);
        }
    }

    /// Detach an actor whose handle is gone
    pub fn dismount_missing(&mut self, actor: ActorId, events: &mut dyn EventBroadcaster) {
        self.remove(actor, Some(events));
    }

    fn remove(&mut self, id: ActorId, events: Option<&mut dyn EventBroadcaster>) -> bool {
        let Some(index) = self.actor_to_point.remove(&id) else {
            return false;
        };
        self.point_to_actor[index] = None;
        if self.side.is_authority() {
            if let Some(events) = events {
                events.broadcast(SyncEvent::AttachmentChanged {
                    object: self.object,
                    actor: id,
                    point: None,
                });
            }
        }
        debug!("{}: dismounted {:?} from point {}", self.object, id, index);
        true
    }

    /// Move an attached actor onto its point and match the owner's velocity.
    ///
    /// Invalid actors are dismounted and `false` is returned.
    pub fn position_attached(
        &mut self,
        actor: &mut dyn Actor,
        pose: &Pose,
        velocity: Vec3,
        events: &mut dyn EventBroadcaster,
    ) -> bool {
        let Some(index) = self.actor_to_point.get(&actor.id()).copied() else {
            return false;
        };
        if !actor.is_valid() {
            debug!("{}: dropping invalid occupant {:?}", self.object, actor.id());
            self.dismount(actor, events);
            return false;
        }
        actor.set_position(pose.to_world(&self.points[index]));
        actor.set_velocity(velocity);
        true
    }

    /// Reposition every occupant, dismounting the ones that vanished.
    ///
    /// Returns how many are still attached.
    pub fn position_all<R>(
        &mut self,
        actors: &mut R,
        pose: &Pose,
        velocity: Vec3,
        events: &mut dyn EventBroadcaster,
    ) -> usize
    where
        R: ActorRegistry + ?Sized,
    {
        let mut positioned = 0;
        for id in self.occupants() {
            match actors.actor_mut(id) {
                Some(actor) => {
                    if self.position_attached(actor, pose, velocity, events) {
                        positioned += 1;
                    }
                }
                None => {
                    debug!("{}: occupant {:?} no longer exists", self.object, id);
                    self.dismount_missing(id, events);
                }
            }
        }
        positioned
    }

    /// Apply an attachment change received from the authority.
    pub fn apply_remote_change(&mut self, actor: &mut dyn Actor, point: Option<Vec3>) -> bool {
        match point {
            Some(point) => self.mount_inner(actor, Some(point), None),
            None => self.remove(actor.id(), None),
        }
    }
}
