//! # Vehicle Core
//!
//! Collision geometry, occupant attachment and part physics for simulated
//! vehicles and placed objects.
//!
//! ## Features
//!
//! - **Switchbox Animation**: Declarative transform and condition steps
//! - **Collision Groups**: Animated volumes partitioned by purpose
//! - **Attachment**: Riders bound to object-relative points and seats
//! - **Carry-Along**: Actors standing on a moving body move with it
//! - **Part Physics**: Ground contact and propeller thrust models
//! - **Authority/Replica Sync**: Discrete events for every state change
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashSet;
//! use std::sync::Arc;
//! use vehicle_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let definition = Arc::new(ObjectDefinition::from_ron_str(&std::fs::read_to_string("cart.ron")?)?);
//!     let settings = SimSettings::load_validated("settings.toml")?;
//!     let registry: HashSet<InstrumentId> = HashSet::new();
//!     let mut world = SimpleWorld::new();
//!     let mut events = EventQueue::new();
//!     let mut rng = rand::thread_rng();
//!
//!     let mut vehicle = Vehicle::load(
//!         ObjectId::new(1),
//!         definition,
//!         Side::Authority,
//!         &MemoryBlob::new(),
//!         None,
//!         &registry,
//!         settings,
//!     )?
//!     .with_pose(Vec3::zeros(), Quat::identity());
//!
//!     vehicle.tick(Vec3::new(0.0, 0.0, 0.1), Quat::identity(), &mut world, &mut rng, &mut events);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;

pub mod animation;
pub mod attachment;
pub mod config;
pub mod definition;
pub mod entity;
pub mod events;
pub mod parts;
pub mod persistence;
pub mod physics;
pub mod variables;
pub mod vehicle;
pub mod world;

#[cfg(test)]
mod tests;

/// Common imports for hosts driving vehicles
pub mod prelude {
    pub use crate::{
        animation::{Switchbox, SwitchboxOutcome, SwitchboxRequest},
        attachment::{AttachmentMap, SingleAttachment},
        config::{Config, ConfigError, SimSettings},
        definition::{ObjectDefinition, PartDefinition, PartPlacement},
        entity::{Damage, InstrumentId, InteractableObject, ItemRegistry, OwnerState},
        events::{EventBroadcaster, EventQueue, SyncEvent},
        foundation::{
            ids::{ActorId, ObjectId, PlayerId, Side},
            math::{Mat4, Quat, Vec3},
            pose::Pose,
        },
        parts::{DamageOutcome, Forces, Part, PowerSource, SeatInteraction, SimpleEngine},
        persistence::{BlobError, DataBlob, MemoryBlob},
        physics::{BoundingVolume, CollisionGroupManager},
        variables::{VariableSource, VariableStore},
        vehicle::{Controls, Motion, Vehicle},
        world::{Actor, ActorRegistry, DamageSink, SimpleWorld, SpatialQuery, World},
    };
}
