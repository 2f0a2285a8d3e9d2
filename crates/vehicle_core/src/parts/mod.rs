//! # Parts
//!
//! Parts mounted on a vehicle. Every kind shares the same lifecycle hooks,
//! called by the vehicle tick in this order:
//!
//! 1. [`Part::on_recompute_volumes`] after the body's volumes moved
//! 2. [`Part::on_variable_modifiers_applied`] once variables settled
//! 3. [`Part::on_tick_physics`] with the part's inputs for this tick
//! 4. [`Part::add_forces`] into the body's force accumulators
//!
//! Damage arrives out of band through [`Part::on_damage`].

use rand::Rng;

use crate::config::SimSettings;
use crate::definition::{PartDefinition, PartPlacement};
use crate::entity::damage::Damage;
use crate::events::EventBroadcaster;
use crate::foundation::ids::{ActorId, ObjectId, Side};
use crate::foundation::math::{utils, Quat, Vec3};
use crate::foundation::pose::Pose;
use crate::persistence::{BlobError, DataBlob};
use crate::variables::VariableStore;
use crate::vehicle::state::{Controls, Motion};
use crate::world::{SpatialQuery, World};

pub mod engine;
pub mod ground_device;
pub mod propeller;
pub mod seat;

pub use engine::{PowerSource, SimpleEngine};
pub use ground_device::GroundDevice;
pub use propeller::{compute_thrust, Propeller, ThrustInput, ThrustOutput};
pub use seat::{Seat, SeatInteraction};

/// Address of a part, for events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartSlot {
    /// Owning object
    pub object: ObjectId,
    /// Index in the object's part list
    pub index: usize,
    /// Side this copy runs on
    pub side: Side,
}

/// Placement of a part relative to its object
#[derive(Debug, Clone, PartialEq)]
pub struct PartMount {
    /// Offset from the object origin
    pub offset: Vec3,
    /// Orientation relative to the object
    pub orientation: Quat,
}

impl PartMount {
    /// Mount from a definition placement
    pub fn from_placement(placement: &PartPlacement) -> Self {
        Self {
            offset: placement.position,
            orientation: utils::quat_from_euler_deg(
                placement.rotation.x,
                placement.rotation.y,
                placement.rotation.z,
            ),
        }
    }

    /// World position on an object at `pose`
    pub fn world_position(&self, pose: &Pose) -> Vec3 {
        pose.to_world(&self.offset)
    }

    /// World orientation on an object at `pose`
    pub fn world_orientation(&self, pose: &Pose) -> Quat {
        pose.orientation * self.orientation
    }
}

/// Everything a part reads during its tick
pub struct PartContext<'a> {
    /// Where the part sits
    pub slot: PartSlot,
    /// Body pose after this tick's movement
    pub pose: &'a Pose,
    /// Driver inputs
    pub controls: &'a Controls,
    /// Body motion
    pub motion: &'a Motion,
    /// Simulation settings
    pub settings: &'a SimSettings,
    /// Body mass including occupants
    pub mass: f64,
    /// Actor controlling the vehicle
    pub controller: Option<ActorId>,
    /// The physics authority reports this part on the ground
    pub grounded: bool,
    /// The part's volume is still touching the ground
    pub actually_on_ground: bool,
    /// Driven by an engine
    pub driven: bool,
    /// Any ground device is grounded
    pub anything_grounded: bool,
    /// Connected power source
    pub power: Option<&'a dyn PowerSource>,
}

/// Force and torque accumulated over one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Forces {
    /// World-space force
    pub force: Vec3,
    /// Body-space torque
    pub torque: Vec3,
}

impl Forces {
    /// Zero both accumulators
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Result of damaging a part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Nothing happened
    Ignored,
    /// Damage was recorded
    Absorbed,
    /// A ground device went flat
    WentFlat,
    /// An empty-handed hit started the engine
    HandStart,
    /// The part was destroyed and should be removed
    Destroyed,
}

/// A mounted part
#[derive(Debug, Clone)]
pub enum Part {
    /// Wheel, tread, skid or pontoon
    GroundDevice(GroundDevice),
    /// Propeller or rotor
    Propeller(Propeller),
    /// Seat
    Seat(Seat),
}

impl Part {
    /// Build a part from its placement and saved state
    pub fn from_placement(placement: &PartPlacement, slot: PartSlot, blob: &dyn DataBlob) -> Result<Self, BlobError> {
        let mount = PartMount::from_placement(placement);
        Ok(match &placement.part {
            PartDefinition::GroundDevice(definition) => Self::GroundDevice(GroundDevice::load(
                definition.clone(),
                mount,
                placement.extra_collision_box_offset,
                blob,
            )?),
            PartDefinition::Propeller(definition) => Self::Propeller(Propeller::new(definition.clone(), mount)),
            PartDefinition::Seat(definition) => Self::Seat(Seat::new(definition.clone(), mount, slot)),
        })
    }

    /// Mount point
    pub fn mount(&self) -> &PartMount {
        match self {
            Self::GroundDevice(part) => part.mount(),
            Self::Propeller(part) => part.mount(),
            Self::Seat(part) => part.mount(),
        }
    }

    /// False once the part must be removed
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Propeller(part) => part.is_valid(),
            Self::GroundDevice(_) | Self::Seat(_) => true,
        }
    }

    /// Follow the body's volumes
    pub fn on_recompute_volumes(&mut self, pose: &Pose) {
        if let Self::GroundDevice(part) = self {
            part.update_volumes(pose);
        }
    }

    /// Re-apply variable modifiers
    pub fn on_variable_modifiers_applied(&mut self, store: &mut VariableStore) {
        if let Self::GroundDevice(part) = self {
            part.apply_variable_modifiers(store);
        }
    }

    /// Per-tick physics
    pub fn on_tick_physics<W, R>(
        &mut self,
        ctx: &PartContext<'_>,
        world: &mut W,
        rng: &mut R,
        events: &mut dyn EventBroadcaster,
    ) where
        W: World + ?Sized,
        R: Rng,
    {
        match self {
            Self::GroundDevice(part) => part.tick(ctx, world, rng, events),
            Self::Propeller(part) => part.tick(ctx, world),
            Self::Seat(_) => {}
        }
    }

    /// Add this part's thrust to the body
    pub fn add_forces<W: SpatialQuery + ?Sized>(&self, ctx: &PartContext<'_>, world: &W, forces: &mut Forces) {
        if let Self::Propeller(part) = self {
            part.add_to_force_output(ctx, world, forces);
        }
    }

    /// Apply damage to the part
    pub fn on_damage<W, R>(
        &mut self,
        damage: &Damage,
        ctx: &PartContext<'_>,
        world: &mut W,
        rng: &mut R,
        events: &mut dyn EventBroadcaster,
    ) -> DamageOutcome
    where
        W: World + ?Sized,
        R: Rng,
    {
        match self {
            Self::GroundDevice(part) => part.attack(damage, ctx.slot, &ctx.settings.damage, rng, events),
            Self::Propeller(part) => part.attack(damage, ctx, world, events),
            Self::Seat(_) => DamageOutcome::Ignored,
        }
    }

    /// Part-specific variable, `None` when the part does not define it
    pub fn variable(&self, name: &str, partial_ticks: f64, motion: &Motion) -> Option<f64> {
        match self {
            Self::GroundDevice(part) => part.variable(name, partial_ticks, motion),
            Self::Propeller(part) => part.variable(name, partial_ticks),
            Self::Seat(part) => part.variable(name),
        }
    }

    /// Write persistent state
    pub fn save(&self, blob: &mut dyn DataBlob) {
        if let Self::GroundDevice(part) = self {
            part.save(blob);
        }
    }

    /// Ground device, if this is one
    pub fn as_ground_device(&self) -> Option<&GroundDevice> {
        match self {
            Self::GroundDevice(part) => Some(part),
            _ => None,
        }
    }

    /// Mutable ground device
    pub fn as_ground_device_mut(&mut self) -> Option<&mut GroundDevice> {
        match self {
            Self::GroundDevice(part) => Some(part),
            _ => None,
        }
    }

    /// Propeller, if this is one
    pub fn as_propeller(&self) -> Option<&Propeller> {
        match self {
            Self::Propeller(part) => Some(part),
            _ => None,
        }
    }

    /// Seat, if this is one
    pub fn as_seat(&self) -> Option<&Seat> {
        match self {
            Self::Seat(part) => Some(part),
            _ => None,
        }
    }

    /// Mutable seat
    pub fn as_seat_mut(&mut self) -> Option<&mut Seat> {
        match self {
            Self::Seat(part) => Some(part),
            _ => None,
        }
    }
}
