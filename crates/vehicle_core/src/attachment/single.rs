//! Single-occupant attachment, used by seats

use crate::events::{EventBroadcaster, SyncEvent};
use crate::foundation::ids::{ActorId, ObjectId, Side};
use crate::foundation::logging::debug;
use crate::foundation::math::Vec3;
use crate::world::Actor;

/// At most one attached actor.
#[derive(Debug, Clone)]
pub struct SingleAttachment {
    object: ObjectId,
    part: usize,
    side: Side,
    rider: Option<ActorId>,
}

impl SingleAttachment {
    /// Empty attachment for part `part` of `object`
    pub fn new(object: ObjectId, part: usize, side: Side) -> Self {
        Self {
            object,
            part,
            side,
            rider: None,
        }
    }

    /// Current occupant
    pub fn rider(&self) -> Option<ActorId> {
        self.rider
    }

    /// Whether someone is attached
    pub fn is_occupied(&self) -> bool {
        self.rider.is_some()
    }

    /// Attach `actor`. Fails when another actor is already attached.
    ///
    /// With `faces_forward` a newly attached actor is turned to the
    /// object's forward axis.
    pub fn mount(&mut self, actor: &mut dyn Actor, faces_forward: bool, events: &mut dyn EventBroadcaster) -> bool {
        self.mount_inner(actor, faces_forward, Some(events))
    }

    fn mount_inner(
        &mut self,
        actor: &mut dyn Actor,
        faces_forward: bool,
        events: Option<&mut dyn EventBroadcaster>,
    ) -> bool {
        let id = actor.id();
        match self.rider {
            Some(current) if current == id => return true,
            Some(_) => return false,
            None => {}
        }
        if faces_forward {
            actor.set_yaw(0.0);
        }
        self.rider = Some(id);
        if self.side.is_authority() {
            actor.set_attachment_owner(Some(self.object));
            if let Some(events) = events {
                events.broadcast(SyncEvent::SeatChanged {
                    object: self.object,
                    part: self.part,
                    actor: Some(id),
                });
            }
        }
        debug!("{}: seat {} mounted by {:?}", self.object, self.part, id);
        true
    }

    /// Detach `actor`. No-op when it is not the occupant.
    pub fn dismount(&mut self, actor: &mut dyn Actor, events: &mut dyn EventBroadcaster) -> bool {
        if self.rider != Some(actor.id()) {
            return false;
        }
        self.clear(Some(events));
        if self.side.is_authority() {
            actor.set_attachment_owner(None);
        }
        true
    }

    fn clear(&mut self, events: Option<&mut dyn EventBroadcaster>) {
        let Some(id) = self.rider.take() else {
            return;
        };
        if self.side.is_authority() {
            if let Some(events) = events {
                events.broadcast(SyncEvent::SeatChanged {
                    object: self.object,
                    part: self.part,
                    actor: None,
                });
            }
        }
        debug!("{}: seat {} vacated by {:?}", self.object, self.part, id);
    }

    /// Vacate without an actor handle, for occupants that no longer exist
    pub fn dismount_missing(&mut self, events: &mut dyn EventBroadcaster) {
        self.clear(Some(events));
    }

    /// Vacate silently, for changes relayed from the authority
    pub fn release(&mut self) {
        self.clear(None);
    }

    /// Move the occupant to `position` with `velocity`; drops invalid occupants.
    pub fn position_attached(
        &mut self,
        actor: &mut dyn Actor,
        position: Vec3,
        velocity: Vec3,
        events: &mut dyn EventBroadcaster,
    ) -> bool {
        if self.rider != Some(actor.id()) {
            return false;
        }
        if !actor.is_valid() {
            self.dismount(actor, events);
            return false;
        }
        actor.set_position(position);
        actor.set_velocity(velocity);
        true
    }

    /// Apply a seat change received from the authority
    pub fn apply_remote_change(&mut self, actor: &mut dyn Actor, mounted: bool) -> bool {
        if mounted {
            self.mount_inner(actor, false, None)
        } else if self.rider == Some(actor.id()) {
            self.clear(None);
            true
        } else {
            false
        }
    }
}
