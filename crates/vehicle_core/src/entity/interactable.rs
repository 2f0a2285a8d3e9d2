//! # Interactable objects
//!
//! An object that actors can click, ride and damage. It owns the collision
//! manager, the attachment map, the damage counter and the instrument
//! slots, and runs the post-movement part of the tick:
//!
//! 1. recompute collision volumes (only when the pose changed)
//! 2. carry resting actors along (only when the pose changed)
//! 3. reposition attached actors
//!
//! Saved state is read once at construction and written back by
//! [`InteractableObject::save`].

use std::sync::Arc;

use crate::attachment::AttachmentMap;
use crate::definition::ObjectDefinition;
use crate::events::{EventBroadcaster, SyncEvent};
use crate::foundation::ids::{ObjectId, PlayerId, Side};
use crate::foundation::logging::{debug, warn};
use crate::foundation::math::{Quat, Vec3};
use crate::foundation::pose::Pose;
use crate::persistence::{BlobError, DataBlob};
use crate::physics::{carry_along, CarriedActor, CollisionContext, CollisionGroupManager};
use crate::variables::{VariableSource, VariableStore};
use crate::world::{Actor, World};

use super::damage::{Damage, DamageAccumulator};
use super::instruments::{InstrumentSlots, ItemRegistry};
use super::ownership::OwnerState;

/// Variable holding accumulated damage
pub const DAMAGE_VARIABLE: &str = "damage";

/// Derived variable: damage as a fraction of health
pub const DAMAGE_PERCENT_VARIABLE: &str = "damage_percent";

/// Derived variable: 1 while locked
pub const LOCKED_VARIABLE: &str = "locked";

const SAVED_POINTS_KEY: &str = "savedRiderLocations";
const LOCKED_KEY: &str = "locked";
const OWNER_KEY: &str = "ownerUUID";
const DAMAGE_KEY: &str = "damage";

/// Variable view that adds derived values on top of the store
pub struct ObjectVariables<'a> {
    store: &'a VariableStore,
    damage: &'a DamageAccumulator,
    locked: bool,
}

impl VariableSource for ObjectVariables<'_> {
    fn variable(&self, name: &str) -> f64 {
        match name {
            DAMAGE_PERCENT_VARIABLE => self.damage.percent(),
            LOCKED_VARIABLE => f64::from(u8::from(self.locked)),
            _ => self.store.get(name),
        }
    }
}

/// A clickable, rideable, damageable object
#[derive(Debug, Clone)]
pub struct InteractableObject {
    id: ObjectId,
    side: Side,
    definition: Arc<ObjectDefinition>,
    /// Pose with one tick of history
    pub pose: Pose,
    /// Velocity in blocks per tick
    pub velocity: Vec3,
    /// Object variables
    pub variables: VariableStore,
    /// Only riders, owners and admins may use a locked object
    pub locked: bool,
    owner: Option<PlayerId>,
    collisions: CollisionGroupManager,
    attachments: AttachmentMap,
    damage: DamageAccumulator,
    instruments: InstrumentSlots,
    newly_created: bool,
}

impl InteractableObject {
    /// Build an object from saved state.
    ///
    /// An empty blob means the object is newly created: its default
    /// instruments are fitted and any that cannot be resolved are reported
    /// to `placing`. A placing actor also becomes the owner.
    pub fn load(
        id: ObjectId,
        definition: Arc<ObjectDefinition>,
        side: Side,
        blob: &dyn DataBlob,
        mut placing: Option<&mut dyn Actor>,
        registry: &dyn ItemRegistry,
    ) -> Result<Self, BlobError> {
        let newly_created = blob.is_empty();
        let owner = match &placing {
            Some(actor) => actor.player_id(),
            None => blob.get_player_id(OWNER_KEY)?,
        };

        let instruments = if newly_created {
            let (slots, errors) =
                InstrumentSlots::with_defaults(&definition.instruments, &definition.name, registry);
            for error in &errors {
                warn!("{}: {}", definition.name, error);
                if let Some(actor) = placing.as_mut() {
                    actor.send_message(&error.to_string());
                }
            }
            slots
        } else {
            InstrumentSlots::load(&definition.instruments, blob, registry)?
        };

        let mut attachments = AttachmentMap::new(id, side, definition.attachment_points.clone());
        attachments.restore_saved_points(blob.get_points(SAVED_POINTS_KEY)?);

        let damage = DamageAccumulator::new(blob.get_double(DAMAGE_KEY)?, definition.health);
        let mut variables = VariableStore::new();
        if damage.amount() != 0.0 {
            variables.set(DAMAGE_VARIABLE, damage.amount());
        }

        Ok(Self {
            id,
            side,
            pose: Pose::default(),
            velocity: Vec3::zeros(),
            variables,
            locked: blob.get_bool(LOCKED_KEY)?,
            owner,
            collisions: CollisionGroupManager::new(Arc::clone(&definition)),
            attachments,
            damage,
            instruments,
            newly_created,
            definition,
        })
    }

    /// Place the object without recording movement
    pub fn with_pose(mut self, position: Vec3, orientation: Quat) -> Self {
        self.pose = Pose::at(position, orientation);
        self
    }

    /// Identifier
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Side this copy runs on
    pub fn side(&self) -> Side {
        self.side
    }

    /// Current definition
    pub fn definition(&self) -> &Arc<ObjectDefinition> {
        &self.definition
    }

    /// Whether this object was created rather than loaded
    pub fn is_newly_created(&self) -> bool {
        self.newly_created
    }

    /// Player that owns the object
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    /// Permission level of `actor` on this object
    pub fn owner_state(&self, actor: &dyn Actor) -> OwnerState {
        OwnerState::resolve(self.owner, actor.player_id(), actor.is_admin())
    }

    /// Collision volumes
    pub fn collisions(&self) -> &CollisionGroupManager {
        &self.collisions
    }

    /// Mutable collision volumes
    pub fn collisions_mut(&mut self) -> &mut CollisionGroupManager {
        &mut self.collisions
    }

    /// Attached actors
    pub fn attachments(&self) -> &AttachmentMap {
        &self.attachments
    }

    /// Mutable attached actors
    pub fn attachments_mut(&mut self) -> &mut AttachmentMap {
        &mut self.attachments
    }

    /// Fitted instruments
    pub fn instruments(&self) -> &InstrumentSlots {
        &self.instruments
    }

    /// Mutable fitted instruments
    pub fn instruments_mut(&mut self) -> &mut InstrumentSlots {
        &mut self.instruments
    }

    /// Damage counter
    pub fn damage(&self) -> &DamageAccumulator {
        &self.damage
    }

    /// Variables including derived ones
    pub fn variable_view(&self) -> ObjectVariables<'_> {
        ObjectVariables {
            store: &self.variables,
            damage: &self.damage,
            locked: self.locked,
        }
    }

    /// Empty mass plus occupants
    pub fn mass(&self) -> f64 {
        self.definition.mass + self.attachments.mass()
    }

    /// Record this tick's movement
    pub fn move_to(&mut self, position: Vec3, orientation: Quat) {
        self.pose.advance(position, orientation);
    }

    /// Swap in a reloaded definition, keeping the built volumes
    pub fn hot_reload(&mut self, definition: Arc<ObjectDefinition>) {
        self.collisions.hot_reload(Arc::clone(&definition));
        self.definition = definition;
    }

    /// Rebuild volumes from the current definition, clearing a pending reset
    pub fn reinitialize(&mut self) {
        debug!("{}: reinitializing collision volumes", self.id);
        self.collisions.rebuild_from_definition(Arc::clone(&self.definition));
    }

    /// Recompute collision volumes if the pose changed.
    ///
    /// A reset flagged on an earlier tick is consumed here first.
    pub fn update_collisions(&mut self, noclip: bool) -> bool {
        if self.collisions.needs_reset() {
            self.reinitialize();
        }
        if !self.pose.changed() {
            return false;
        }
        self.refresh_collisions(noclip);
        true
    }

    /// Force a recompute regardless of movement, used at spawn
    pub fn refresh_collisions(&mut self, noclip: bool) {
        let variables = ObjectVariables {
            store: &self.variables,
            damage: &self.damage,
            locked: self.locked,
        };
        self.collisions.recompute_volumes(&CollisionContext {
            pose: &self.pose,
            variables: &variables,
            noclip,
        });
    }

    /// Move actors standing on the object along with it
    pub fn move_resting_actors<W: World + ?Sized>(&self, world: &mut W) -> Vec<CarriedActor> {
        carry_along(&self.collisions, &self.pose, world)
    }

    /// Put every attached actor back on its point
    pub fn reposition_riders<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        events: &mut dyn EventBroadcaster,
    ) -> usize {
        self.attachments
            .position_all(world, &self.pose, self.velocity, events)
    }

    /// Post-movement tick: volumes, carried actors, riders
    pub fn tick_post_update<W: World + ?Sized>(
        &mut self,
        world: &mut W,
        events: &mut dyn EventBroadcaster,
        noclip: bool,
    ) {
        if self.update_collisions(noclip) {
            self.move_resting_actors(world);
        }
        self.reposition_riders(world, events);
    }

    /// Attach `actor` at `point`, or at its saved point when `None`
    pub fn mount(&mut self, actor: &mut dyn Actor, point: Option<Vec3>, events: &mut dyn EventBroadcaster) -> bool {
        self.attachments.mount(actor, point, events)
    }

    /// Detach `actor`
    pub fn dismount(&mut self, actor: &mut dyn Actor, events: &mut dyn EventBroadcaster) {
        self.attachments.dismount(actor, events);
    }

    /// Apply damage on the authority and return the absorbed portion.
    ///
    /// Water damage is ignored. Damage beyond health is dropped and only the
    /// absorbed part is broadcast.
    pub fn attack(&mut self, damage: &Damage, events: &mut dyn EventBroadcaster) -> f64 {
        if damage.is_water || !self.side.is_authority() {
            return 0.0;
        }
        let absorbed = self.damage.apply(damage.amount);
        self.variables.set(DAMAGE_VARIABLE, self.damage.amount());
        events.broadcast(SyncEvent::VariableIncremented {
            object: self.id,
            variable: DAMAGE_VARIABLE.to_string(),
            amount: absorbed,
        });
        absorbed
    }

    /// Apply an object-level event received from the authority.
    ///
    /// Returns `false` for events this object does not handle.
    pub fn apply_sync_event<W: World + ?Sized>(&mut self, event: &SyncEvent, world: &mut W) -> bool {
        if event.object() != self.id {
            return false;
        }
        match event {
            SyncEvent::AttachmentChanged { actor, point, .. } => match world.actor_mut(*actor) {
                Some(actor) => self.attachments.apply_remote_change(actor, *point),
                None => false,
            },
            SyncEvent::VariableIncremented { variable, amount, .. } => {
                let value = self.variables.increment(variable, *amount);
                if variable == DAMAGE_VARIABLE {
                    self.damage.set_amount(value);
                }
                true
            }
            _ => false,
        }
    }

    /// Write persistent state
    pub fn save(&self, blob: &mut dyn DataBlob) {
        blob.set_points(SAVED_POINTS_KEY, &self.attachments.points_for_save());
        blob.set_bool(LOCKED_KEY, self.locked);
        if let Some(owner) = self.owner {
            blob.set_player_id(OWNER_KEY, owner);
        }
        blob.set_double(DAMAGE_KEY, self.damage.amount());
        self.instruments.save(blob);
    }
}
