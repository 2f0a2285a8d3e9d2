//! # Vehicle
//!
//! An interactable object carrying parts and engines. One call to
//! [`Vehicle::tick`] advances the whole vehicle in a fixed order:
//!
//! 1. Pose update and derived motion
//! 2. Collision volume recompute
//! 3. Part volumes and variable modifiers
//! 4. Engines, then part physics with ground contact detected per device
//! 5. Force and torque accumulation
//! 6. Carry-along of actors standing on the body
//! 7. Rider and seat repositioning
//!
//! Replicas run the same tick but never originate attachment, damage or
//! flat-state changes; they follow the authority through
//! [`Vehicle::apply_sync_event`].

pub mod state;

pub use state::{Controls, Motion, SEA_LEVEL_AIR_DENSITY};

use std::sync::Arc;

use rand::Rng;

use crate::attachment::MASS_PER_OCCUPANT;
use crate::config::SimSettings;
use crate::definition::ObjectDefinition;
use crate::entity::{Damage, InteractableObject, ItemRegistry, OwnerState};
use crate::events::{EventBroadcaster, SyncEvent};
use crate::foundation::ids::{ActorId, ObjectId, Side};
use crate::foundation::logging::{debug, info};
use crate::foundation::math::{Quat, Vec3};
use crate::foundation::pose::Pose;
use crate::parts::{
    DamageOutcome, Forces, Part, PartContext, PartSlot, PowerSource, SeatInteraction, SimpleEngine,
};
use crate::persistence::{BlobError, DataBlob, MemoryBlob};
use crate::physics::CarriedActor;
use crate::variables::VariableSource;
use crate::world::{Actor, World};

fn part_key(index: usize) -> String {
    format!("part_{index}")
}

/// Shared, read-only view handed to every part during a pass
struct Body<'a> {
    object: ObjectId,
    side: Side,
    pose: &'a Pose,
    controls: &'a Controls,
    motion: &'a Motion,
    settings: &'a SimSettings,
    engines: &'a [SimpleEngine],
    grounded: &'a [bool],
    mass: f64,
    controller: Option<ActorId>,
}

impl<'a> Body<'a> {
    fn context(&self, index: usize, part: &Part) -> PartContext<'a> {
        let engines: &'a [SimpleEngine] = self.engines;
        let grounded = self.grounded.get(index).copied().unwrap_or(false);
        let power = part
            .as_propeller()
            .and_then(|propeller| propeller.definition().engine)
            .and_then(|engine| engines.get(engine))
            .map(|engine| engine as &dyn PowerSource);
        PartContext {
            slot: PartSlot {
                object: self.object,
                index,
                side: self.side,
            },
            pose: self.pose,
            controls: self.controls,
            motion: self.motion,
            settings: self.settings,
            mass: self.mass,
            controller: self.controller,
            grounded,
            actually_on_ground: grounded,
            driven: part.as_ground_device().is_some() && engines.iter().any(|engine| engine.is_running()),
            anything_grounded: self.grounded.iter().any(|g| *g),
            power,
        }
    }
}

/// Vehicle with parts, engines and riders
#[derive(Debug, Clone)]
pub struct Vehicle {
    object: InteractableObject,
    parts: Vec<Part>,
    engines: Vec<SimpleEngine>,
    grounded: Vec<bool>,
    forces: Forces,
    settings: SimSettings,
    /// Driver inputs
    pub controls: Controls,
    /// Body motion, derived from the pose each tick
    pub motion: Motion,
}

impl Vehicle {
    /// Build a vehicle from saved state; see [`InteractableObject::load`]
    pub fn load(
        id: ObjectId,
        definition: Arc<ObjectDefinition>,
        side: Side,
        blob: &dyn DataBlob,
        placing: Option<&mut dyn Actor>,
        registry: &dyn ItemRegistry,
        settings: SimSettings,
    ) -> Result<Self, BlobError> {
        let object = InteractableObject::load(id, Arc::clone(&definition), side, blob, placing, registry)?;
        let parts = definition
            .parts
            .iter()
            .enumerate()
            .map(|(index, placement)| {
                let child = blob.get_child(&part_key(index))?;
                Part::from_placement(placement, PartSlot { object: id, index, side }, &child)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let engines = definition.engines.iter().cloned().map(SimpleEngine::new).collect();

        Ok(Self {
            object,
            grounded: vec![false; parts.len()],
            parts,
            engines,
            forces: Forces::default(),
            settings,
            controls: Controls::default(),
            motion: Motion::default(),
        })
    }

    /// Place the vehicle and build its volumes without recording movement
    pub fn with_pose(mut self, position: Vec3, orientation: Quat) -> Self {
        self.object = self.object.with_pose(position, orientation);
        self.object.refresh_collisions(self.settings.general.noclip_vehicles);
        for part in &mut self.parts {
            part.on_recompute_volumes(&self.object.pose);
        }
        self
    }

    /// Underlying object
    pub fn object(&self) -> &InteractableObject {
        &self.object
    }

    /// Mutable underlying object
    pub fn object_mut(&mut self) -> &mut InteractableObject {
        &mut self.object
    }

    /// Parts in placement order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Part at `index`
    pub fn part(&self, index: usize) -> Option<&Part> {
        self.parts.get(index)
    }

    /// Mutable part at `index`, for hosts driving skid controllers and repairs
    pub fn part_mut(&mut self, index: usize) -> Option<&mut Part> {
        self.parts.get_mut(index)
    }

    /// Engine at `index`
    pub fn engine(&self, index: usize) -> Option<&SimpleEngine> {
        self.engines.get(index)
    }

    /// Mutable engine at `index`
    pub fn engine_mut(&mut self, index: usize) -> Option<&mut SimpleEngine> {
        self.engines.get_mut(index)
    }

    /// Force and torque from the last tick
    pub fn forces(&self) -> &Forces {
        &self.forces
    }

    /// Settings in use
    pub fn settings(&self) -> &SimSettings {
        &self.settings
    }

    /// Whether part `index` touched the ground on the last tick
    pub fn is_grounded(&self, index: usize) -> bool {
        self.grounded.get(index).copied().unwrap_or(false)
    }

    /// Seat holding `actor`
    pub fn seat_of(&self, actor: ActorId) -> Option<usize> {
        self.parts
            .iter()
            .position(|part| part.as_seat().is_some_and(|seat| seat.rider() == Some(actor)))
    }

    /// Rider of the first occupied controller seat
    pub fn controller(&self) -> Option<ActorId> {
        self.parts
            .iter()
            .filter_map(Part::as_seat)
            .filter(|seat| seat.is_controller())
            .find_map(|seat| seat.rider())
    }

    /// Object mass plus seated riders
    pub fn mass(&self) -> f64 {
        let seated = self
            .parts
            .iter()
            .filter_map(Part::as_seat)
            .filter(|seat| seat.rider().is_some())
            .count();
        self.object.mass() + MASS_PER_OCCUPANT * seated as f64
    }

    /// Part variable, falling back to the object's variables
    pub fn variable(&self, part: Option<usize>, name: &str, partial_ticks: f64) -> f64 {
        part.and_then(|index| self.parts.get(index))
            .and_then(|part| part.variable(name, partial_ticks, &self.motion))
            .unwrap_or_else(|| self.object.variable_view().interpolated_variable(name, partial_ticks))
    }

    fn slot(&self, index: usize) -> PartSlot {
        PartSlot {
            object: self.object.id(),
            index,
            side: self.object.side(),
        }
    }

    /// Advance one tick to the pose reported by the physics host.
    ///
    /// Returns the actors carried along by the body's movement.
    pub fn tick<W, R>(
        &mut self,
        position: Vec3,
        orientation: Quat,
        world: &mut W,
        rng: &mut R,
        events: &mut dyn EventBroadcaster,
    ) -> Vec<CarriedActor>
    where
        W: World + ?Sized,
        R: Rng,
    {
        self.object.move_to(position, orientation);
        let velocity = self.object.pose.position_delta();
        self.object.velocity = velocity;
        self.motion.set_velocity(velocity, &(orientation * Vec3::z()));
        self.motion.air_density = Motion::air_density_at(position.y);

        let moved = self.object.update_collisions(self.settings.general.noclip_vehicles);
        for part in &mut self.parts {
            part.on_recompute_volumes(&self.object.pose);
        }
        for part in &mut self.parts {
            part.on_variable_modifiers_applied(&mut self.object.variables);
        }
        for engine in &mut self.engines {
            engine.tick(self.controls.throttle);
        }

        self.grounded = self
            .parts
            .iter()
            .map(|part| part.as_ground_device().is_some_and(|device| device.detect_ground(&*world)))
            .collect();
        self.motion.slipping = self
            .parts
            .iter()
            .zip(&self.grounded)
            .any(|(part, grounded)| *grounded && part.as_ground_device().is_some_and(|d| d.friction_loss(&*world) > 0.0));

        let mass = self.mass();
        let controller = self.controller();
        let body = Body {
            object: self.object.id(),
            side: self.object.side(),
            pose: &self.object.pose,
            controls: &self.controls,
            motion: &self.motion,
            settings: &self.settings,
            engines: &self.engines,
            grounded: &self.grounded,
            mass,
            controller,
        };
        for (index, part) in self.parts.iter_mut().enumerate() {
            if !part.is_valid() {
                continue;
            }
            let ctx = body.context(index, part);
            part.on_tick_physics(&ctx, world, rng, events);
        }

        self.forces.clear();
        for (index, part) in self.parts.iter().enumerate() {
            if part.is_valid() {
                part.add_forces(&body.context(index, part), &*world, &mut self.forces);
            }
        }

        let carried = if moved {
            self.object.move_resting_actors(world)
        } else {
            Vec::new()
        };
        self.object.reposition_riders(world, events);
        self.position_seat_riders(world, events);
        carried
    }

    fn position_seat_riders<W: World + ?Sized>(&mut self, world: &mut W, events: &mut dyn EventBroadcaster) {
        let pose = &self.object.pose;
        let velocity = self.object.velocity;
        for seat in self.parts.iter_mut().filter_map(Part::as_seat_mut) {
            let Some(rider) = seat.rider() else {
                continue;
            };
            match world.actor_mut(rider) {
                Some(actor) => {
                    seat.position_rider(actor, pose, velocity, events);
                }
                None => seat.drop_missing_rider(events),
            }
        }
    }

    /// An actor uses the seat at part `index`.
    ///
    /// Actors already seated elsewhere on this vehicle change seats and keep
    /// their heading. Locks only stop actors who are neither owner nor admin.
    pub fn interact_seat(
        &mut self,
        index: usize,
        actor: &mut dyn Actor,
        events: &mut dyn EventBroadcaster,
    ) -> Option<SeatInteraction> {
        self.parts.get(index)?.as_seat()?;
        let previous = self.seat_of(actor.id()).filter(|previous| *previous != index);
        let locked = self.object.locked && self.object.owner_state(&*actor) == OwnerState::User;
        let slot = self.slot(index);

        let seat = self.parts.get_mut(index)?.as_seat_mut()?;
        let result = seat.interact(actor, slot, locked, previous.is_none(), &mut self.object.variables, events);
        if result == SeatInteraction::Mounted {
            if let Some(old) = previous.and_then(|previous| self.parts[previous].as_seat_mut()) {
                old.vacate(events);
                debug!("{}: {:?} moved from seat {:?} to {}", slot.object, actor.id(), previous, index);
            }
        }
        Some(result)
    }

    /// The actor leaves its seat
    pub fn dismount_seat(&mut self, actor: &mut dyn Actor, events: &mut dyn EventBroadcaster) -> bool {
        let Some(index) = self.seat_of(actor.id()) else {
            return false;
        };
        let pose = &self.object.pose;
        match self.parts[index].as_seat_mut() {
            Some(seat) => seat.dismount(actor, pose, &mut self.object.variables, events),
            None => false,
        }
    }

    /// Damage the body; see [`InteractableObject::attack`]
    pub fn attack(&mut self, damage: &Damage, events: &mut dyn EventBroadcaster) -> f64 {
        self.object.attack(damage, events)
    }

    /// Damage part `index` on the authority
    pub fn attack_part<W, R>(
        &mut self,
        index: usize,
        damage: &Damage,
        world: &mut W,
        rng: &mut R,
        events: &mut dyn EventBroadcaster,
    ) -> DamageOutcome
    where
        W: World + ?Sized,
        R: Rng,
    {
        if !self.object.side().is_authority() {
            return DamageOutcome::Ignored;
        }
        let mass = self.mass();
        let controller = self.controller();
        let Some(part) = self.parts.get_mut(index) else {
            return DamageOutcome::Ignored;
        };
        let body = Body {
            object: self.object.id(),
            side: self.object.side(),
            pose: &self.object.pose,
            controls: &self.controls,
            motion: &self.motion,
            settings: &self.settings,
            engines: &self.engines,
            grounded: &self.grounded,
            mass,
            controller,
        };
        let ctx = body.context(index, part);
        let outcome = part.on_damage(damage, &ctx, world, rng, events);

        match outcome {
            DamageOutcome::HandStart => {
                let engine = part.as_propeller().and_then(|propeller| propeller.definition().engine);
                if let Some(engine) = engine.and_then(|engine| self.engines.get_mut(engine)) {
                    engine.hand_start();
                }
            }
            DamageOutcome::Destroyed => info!("{} part {}: destroyed", self.object.id(), index),
            _ => {}
        }
        outcome
    }

    /// Apply an event received from the authority.
    ///
    /// Returns `false` for events meant for another object or naming parts
    /// and actors that do not exist here.
    pub fn apply_sync_event<W: World + ?Sized>(&mut self, event: &SyncEvent, world: &mut W) -> bool {
        if event.object() != self.object.id() {
            return false;
        }
        match event {
            SyncEvent::SeatChanged { part, actor, .. } => {
                let Some(seat) = self.parts.get_mut(*part).and_then(Part::as_seat_mut) else {
                    return false;
                };
                match actor {
                    Some(actor) => match world.actor_mut(*actor) {
                        Some(actor) => seat.apply_remote_change(actor, true),
                        None => false,
                    },
                    None => {
                        let Some(rider) = seat.rider() else {
                            return false;
                        };
                        match world.actor_mut(rider) {
                            Some(actor) => seat.apply_remote_change(actor, false),
                            None => {
                                seat.vacate_local();
                                true
                            }
                        }
                    }
                }
            }
            SyncEvent::FlatStateChanged { part, flat, .. } => {
                match self.parts.get_mut(*part).and_then(Part::as_ground_device_mut) {
                    Some(device) => {
                        device.apply_flat_state(*flat);
                        true
                    }
                    None => false,
                }
            }
            SyncEvent::HandStartRequested { engine, .. } => match self.engines.get_mut(*engine) {
                Some(engine) => {
                    engine.hand_start();
                    true
                }
                None => false,
            },
            _ => self.object.apply_sync_event(event, world),
        }
    }

    /// Write persistent state, parts under their own child blobs
    pub fn save(&self, blob: &mut dyn DataBlob) {
        self.object.save(blob);
        for (index, part) in self.parts.iter().enumerate() {
            let mut child = MemoryBlob::new();
            part.save(&mut child);
            blob.set_child(&part_key(index), child);
        }
    }
}
