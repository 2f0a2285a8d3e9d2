//! Seats: one rider each, placed on the object's body

use crate::attachment::SingleAttachment;
use crate::definition::SeatDefinition;
use crate::events::EventBroadcaster;
use crate::foundation::ids::ActorId;
use crate::foundation::math::Vec3;
use crate::foundation::pose::Pose;
use crate::variables::VariableStore;
use crate::world::Actor;

use super::{PartMount, PartSlot};

/// Told to actors trying to board a locked object
pub const LOCKED_MESSAGE: &str = "This vehicle is locked.";

/// Told to actors trying to take an occupied seat
pub const SEAT_TAKEN_MESSAGE: &str = "Someone is already sitting there.";

/// Sideways distance of the default dismount position
pub const DISMOUNT_OFFSET: f64 = 2.0;

/// Result of an actor using a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatInteraction {
    /// The actor sat down
    Mounted,
    /// The actor already sits here
    AlreadySeated,
    /// Someone else sits here
    SeatTaken,
    /// The object is locked to outsiders
    Locked,
    /// Sneaking actors do not sit down
    Ignored,
}

/// Seat part
#[derive(Debug, Clone)]
pub struct Seat {
    definition: SeatDefinition,
    mount: PartMount,
    attachment: SingleAttachment,
    rider_yaw: f64,
    rider_pitch: f64,
}

impl Seat {
    /// Empty seat
    pub fn new(definition: SeatDefinition, mount: PartMount, slot: PartSlot) -> Self {
        Self {
            definition,
            mount,
            attachment: SingleAttachment::new(slot.object, slot.index, slot.side),
            rider_yaw: 0.0,
            rider_pitch: 0.0,
        }
    }

    /// Mount point
    pub fn mount(&self) -> &PartMount {
        &self.mount
    }

    /// Definition
    pub fn definition(&self) -> &SeatDefinition {
        &self.definition
    }

    /// Current rider
    pub fn rider(&self) -> Option<ActorId> {
        self.attachment.rider()
    }

    /// Whether the rider drives the vehicle
    pub fn is_controller(&self) -> bool {
        self.definition.is_controller
    }

    /// An actor uses the seat.
    ///
    /// Locked objects only accept actors already riding `object`. New
    /// riders closing doors and hatches set the interactable variables to 0.
    pub fn interact(
        &mut self,
        actor: &mut dyn Actor,
        slot: PartSlot,
        locked: bool,
        faces_forward: bool,
        variables: &mut VariableStore,
        events: &mut dyn EventBroadcaster,
    ) -> SeatInteraction {
        if locked && actor.attachment_owner() != Some(slot.object) {
            actor.send_message(LOCKED_MESSAGE);
            return SeatInteraction::Locked;
        }
        match self.attachment.rider() {
            Some(rider) if rider == actor.id() => return SeatInteraction::AlreadySeated,
            Some(_) => {
                actor.send_message(SEAT_TAKEN_MESSAGE);
                return SeatInteraction::SeatTaken;
            }
            None => {}
        }
        if actor.is_sneaking() {
            return SeatInteraction::Ignored;
        }
        if !self.attachment.mount(actor, faces_forward, events) {
            return SeatInteraction::SeatTaken;
        }
        self.set_interactable_variables(variables, 0.0);
        SeatInteraction::Mounted
    }

    /// The rider gets off and is placed beside the seat
    pub fn dismount(
        &mut self,
        actor: &mut dyn Actor,
        pose: &Pose,
        variables: &mut VariableStore,
        events: &mut dyn EventBroadcaster,
    ) -> bool {
        if !self.attachment.dismount(actor, events) {
            return false;
        }
        actor.set_position(self.dismount_position(pose));
        self.set_interactable_variables(variables, 1.0);
        true
    }

    /// Free the seat without touching the rider, who moved to another seat
    pub fn vacate(&mut self, events: &mut dyn EventBroadcaster) {
        self.attachment.dismount_missing(events);
    }

    /// Free the seat on a replica once its rider is gone
    pub fn vacate_local(&mut self) {
        self.attachment.release();
    }

    /// Where a rider stands after getting off
    pub fn dismount_position(&self, pose: &Pose) -> Vec3 {
        let local = match self.definition.dismount_position {
            Some(position) => self.mount.offset + self.mount.orientation * position,
            None if self.mount.offset.x < 0.0 => self.mount.offset - Vec3::new(DISMOUNT_OFFSET, 0.0, 0.0),
            None => self.mount.offset + Vec3::new(DISMOUNT_OFFSET, 0.0, 0.0),
        };
        pose.to_world(&local)
    }

    /// Keep the rider on the seat. Invalid riders are dropped.
    pub fn position_rider(
        &mut self,
        actor: &mut dyn Actor,
        pose: &Pose,
        velocity: Vec3,
        events: &mut dyn EventBroadcaster,
    ) -> bool {
        let position = self.mount.world_position(pose);
        if !self.attachment.position_attached(actor, position, velocity, events) {
            return false;
        }
        self.rider_yaw = actor.yaw();
        self.rider_pitch = actor.pitch();
        true
    }

    /// The rider no longer exists
    pub fn drop_missing_rider(&mut self, events: &mut dyn EventBroadcaster) {
        self.attachment.dismount_missing(events);
    }

    /// Apply a seat change received from the authority
    pub fn apply_remote_change(&mut self, actor: &mut dyn Actor, mounted: bool) -> bool {
        self.attachment.apply_remote_change(actor, mounted)
    }

    fn set_interactable_variables(&self, variables: &mut VariableStore, value: f64) {
        for name in self.definition.interactable_variables.iter().flatten() {
            variables.set(name.as_str(), value);
        }
    }

    /// Animation variables
    pub fn variable(&self, name: &str) -> Option<f64> {
        Some(match name {
            "seat_occupied" => {
                if self.attachment.is_occupied() {
                    1.0
                } else {
                    0.0
                }
            }
            "seat_rider_yaw" => self.rider_yaw,
            "seat_rider_pitch" => self.rider_pitch,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;
    use crate::foundation::ids::{ObjectId, Side};
    use crate::foundation::math::utils::quat_from_euler_deg;
    use crate::foundation::math::Quat;
    use crate::world::{ActorRegistry, SimpleActor, SimpleWorld};
    use approx::assert_relative_eq;

    fn slot() -> PartSlot {
        PartSlot {
            object: ObjectId::new(3),
            index: 4,
            side: Side::Authority,
        }
    }

    fn seat(x: f64, dismount_position: Option<Vec3>) -> Seat {
        Seat::new(
            SeatDefinition {
                dismount_position,
                is_controller: true,
                interactable_variables: vec![vec!["door".to_string()], vec!["hatch".to_string()]],
            },
            PartMount {
                offset: Vec3::new(x, 1.0, 0.5),
                orientation: Quat::identity(),
            },
            slot(),
        )
    }

    #[test]
    fn test_interaction_rules() {
        let mut world = SimpleWorld::new();
        let driver = world.spawn_actor(SimpleActor::new(Vec3::zeros()));
        let other = world.spawn_actor(SimpleActor::new(Vec3::zeros()));
        let mut variables = VariableStore::new();
        variables.set("door", 1.0);
        let mut events = EventQueue::new();
        let mut seat = seat(0.5, None);

        let result = seat.interact(world.actor_mut(driver).unwrap(), slot(), true, true, &mut variables, &mut events);
        assert_eq!(result, SeatInteraction::Locked);
        assert_eq!(world.simple_actor(driver).unwrap().messages, vec![LOCKED_MESSAGE.to_string()]);

        let result = seat.interact(world.actor_mut(driver).unwrap(), slot(), false, true, &mut variables, &mut events);
        assert_eq!(result, SeatInteraction::Mounted);
        assert_eq!(variables.get("door"), 0.0);
        assert_eq!(seat.variable("seat_occupied"), Some(1.0));

        let result = seat.interact(world.actor_mut(driver).unwrap(), slot(), true, true, &mut variables, &mut events);
        assert_eq!(result, SeatInteraction::AlreadySeated);

        let result = seat.interact(world.actor_mut(other).unwrap(), slot(), false, true, &mut variables, &mut events);
        assert_eq!(result, SeatInteraction::SeatTaken);
        assert_eq!(world.simple_actor(other).unwrap().messages.len(), 1);
    }

    #[test]
    fn test_sneaking_actor_stays_off() {
        let mut world = SimpleWorld::new();
        let mut actor = SimpleActor::new(Vec3::zeros());
        actor.sneaking = true;
        let id = world.spawn_actor(actor);
        let mut seat = seat(0.5, None);
        let result = seat.interact(
            world.actor_mut(id).unwrap(),
            slot(),
            false,
            true,
            &mut VariableStore::new(),
            &mut EventQueue::new(),
        );
        assert_eq!(result, SeatInteraction::Ignored);
        assert!(seat.rider().is_none());
    }

    #[test]
    fn test_dismount_positions() {
        let pose = Pose::at(Vec3::new(10.0, 0.0, 0.0), quat_from_euler_deg(0.0, 90.0, 0.0));

        // Right-hand seat steps out to +x in body space, which is -z in the world
        let right = seat(0.5, None).dismount_position(&pose);
        assert_relative_eq!(right, Vec3::new(10.5, 1.0, -2.5), epsilon = 1e-9);
        let left = seat(-0.5, None).dismount_position(&pose);
        assert_relative_eq!(left, Vec3::new(10.5, 1.0, 2.5), epsilon = 1e-9);

        let custom = seat(0.5, Some(Vec3::new(0.0, 0.0, -3.0))).dismount_position(&Pose::default());
        assert_relative_eq!(custom, Vec3::new(0.5, 1.0, -2.5), epsilon = 1e-9);
    }

    #[test]
    fn test_dismount_opens_doors_and_positions() {
        let mut world = SimpleWorld::new();
        let id = world.spawn_actor(SimpleActor::new(Vec3::zeros()));
        let mut variables = VariableStore::new();
        let mut events = EventQueue::new();
        let mut seat = seat(0.5, None);
        let pose = Pose::default();

        seat.interact(world.actor_mut(id).unwrap(), slot(), false, true, &mut variables, &mut events);
        world.simple_actor_mut(id).unwrap().yaw = 15.0;
        assert!(seat.position_rider(world.actor_mut(id).unwrap(), &pose, Vec3::zeros(), &mut events));
        assert_eq!(world.simple_actor(id).unwrap().position, Vec3::new(0.5, 1.0, 0.5));
        assert_eq!(seat.variable("seat_rider_yaw"), Some(15.0));

        assert!(seat.dismount(world.actor_mut(id).unwrap(), &pose, &mut variables, &mut events));
        assert_eq!(world.simple_actor(id).unwrap().position, Vec3::new(2.5, 1.0, 0.5));
        assert_eq!(variables.get("hatch"), 1.0);
        assert_eq!(seat.variable("seat_occupied"), Some(0.0));
    }
}
