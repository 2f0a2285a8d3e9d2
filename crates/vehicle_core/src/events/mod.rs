//! Authority-to-replica sync events
//!
//! Key principles:
//! - Only the authority originates events
//! - Delivery is fire-and-forget and order-preserving
//! - Replicas apply events without re-broadcasting them

use crate::foundation::ids::{ActorId, ObjectId};
use crate::foundation::math::Vec3;

/// Discrete state change broadcast by the authority
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// An actor was attached to `point`, or detached when `point` is `None`
    AttachmentChanged {
        /// Owning object
        object: ObjectId,
        /// Actor concerned
        actor: ActorId,
        /// Object-relative attachment point
        point: Option<Vec3>,
    },
    /// A seat part gained or lost its occupant
    SeatChanged {
        /// Owning object
        object: ObjectId,
        /// Part index on the object
        part: usize,
        /// New occupant, `None` when vacated
        actor: Option<ActorId>,
    },
    /// A variable was incremented
    VariableIncremented {
        /// Owning object
        object: ObjectId,
        /// Variable name
        variable: String,
        /// Amount added
        amount: f64,
    },
    /// A ground device went flat or was repaired
    FlatStateChanged {
        /// Owning object
        object: ObjectId,
        /// Part index on the object
        part: usize,
        /// New state
        flat: bool,
    },
    /// An engine was hand-started by spinning its propeller
    HandStartRequested {
        /// Owning object
        object: ObjectId,
        /// Engine index on the object
        engine: usize,
    },
}

impl SyncEvent {
    /// Object the event belongs to
    pub fn object(&self) -> ObjectId {
        match self {
            Self::AttachmentChanged { object, .. }
            | Self::SeatChanged { object, .. }
            | Self::VariableIncremented { object, .. }
            | Self::FlatStateChanged { object, .. }
            | Self::HandStartRequested { object, .. } => *object,
        }
    }
}

/// Outbound channel to replicas
pub trait EventBroadcaster {
    /// Queue an event for every replica
    fn broadcast(&mut self, event: SyncEvent);
}

/// Ordered in-memory event buffer
#[derive(Debug, Default, Clone)]
pub struct EventQueue {
    events: Vec<SyncEvent>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Events in broadcast order
    pub fn events(&self) -> &[SyncEvent] {
        &self.events
    }

    /// Take every queued event
    pub fn drain(&mut self) -> Vec<SyncEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventBroadcaster for EventQueue {
    fn broadcast(&mut self, event: SyncEvent) {
        self.events.push(event);
    }
}
