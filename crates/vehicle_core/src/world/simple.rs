//! In-memory world
//!
//! Actors live in a slotmap, blocks in a sparse map keyed by integer cell.

use slotmap::SlotMap;
use std::collections::HashMap;

use super::{Actor, ActorRegistry, DamageSink, SpatialQuery};
use crate::entity::damage::Damage;
use crate::foundation::ids::{ActorId, MaterialId, ObjectId, PlayerId};
use crate::foundation::math::Vec3;
use crate::physics::bounding_box::BoundingVolume;

/// A solid or liquid block
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Material name
    pub material: MaterialId,
    /// Hardness
    pub hardness: f64,
    /// Slipperiness, 0.6 for ordinary ground
    pub slipperiness: f64,
    /// Liquid blocks do not support anything
    pub liquid: bool,
}

impl Block {
    /// Ordinary solid block
    pub fn solid(material: &str, hardness: f64) -> Self {
        Self {
            material: MaterialId::new(material),
            hardness,
            slipperiness: 0.6,
            liquid: false,
        }
    }

    /// Water
    pub fn water() -> Self {
        Self {
            material: MaterialId::new("water"),
            hardness: 100.0,
            slipperiness: 0.6,
            liquid: true,
        }
    }

    /// Override slipperiness
    pub fn with_slipperiness(mut self, slipperiness: f64) -> Self {
        self.slipperiness = slipperiness;
        self
    }
}

/// Actor stored in a [`SimpleWorld`]
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleActor {
    id: ActorId,
    /// Persistent identity
    pub player: Option<PlayerId>,
    /// Feet position
    pub position: Vec3,
    /// Velocity
    pub velocity: Vec3,
    /// Half width and half height
    pub half_size: (f64, f64),
    /// Heading
    pub yaw: f64,
    /// Pitch
    pub pitch: f64,
    /// Still in the world
    pub valid: bool,
    /// Crouching
    pub sneaking: bool,
    /// Observer
    pub spectating: bool,
    /// Operator
    pub admin: bool,
    /// Attached object
    pub attached_to: Option<ObjectId>,
    /// Chat messages received
    pub messages: Vec<String>,
    /// Damage received
    pub damage_taken: f64,
}

impl SimpleActor {
    /// Player-sized actor standing at `position`
    pub fn new(position: Vec3) -> Self {
        Self {
            id: ActorId::default(),
            player: None,
            position,
            velocity: Vec3::zeros(),
            half_size: (0.3, 0.9),
            yaw: 0.0,
            pitch: 0.0,
            valid: true,
            sneaking: false,
            spectating: false,
            admin: false,
            attached_to: None,
            messages: Vec::new(),
            damage_taken: 0.0,
        }
    }

    /// Give the actor a player identity
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }
}

impl Actor for SimpleActor {
    fn id(&self) -> ActorId {
        self.id
    }

    fn player_id(&self) -> Option<PlayerId> {
        self.player
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn bounds(&self) -> BoundingVolume {
        let (half_width, half_height) = self.half_size;
        BoundingVolume::new(
            self.position + Vec3::new(0.0, half_height, 0.0),
            Vec3::new(half_width, half_height, half_width),
        )
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn attachment_owner(&self) -> Option<ObjectId> {
        self.attached_to
    }

    fn set_attachment_owner(&mut self, owner: Option<ObjectId>) {
        self.attached_to = owner;
    }

    fn yaw(&self) -> f64 {
        self.yaw
    }

    fn set_yaw(&mut self, yaw: f64) {
        self.yaw = yaw;
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn set_pitch(&mut self, pitch: f64) {
        self.pitch = pitch;
    }

    fn is_sneaking(&self) -> bool {
        self.sneaking
    }

    fn is_spectating(&self) -> bool {
        self.spectating
    }

    fn is_admin(&self) -> bool {
        self.admin
    }

    fn send_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Record of an explosion request
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    /// Where
    pub position: Vec3,
    /// Strength
    pub strength: f64,
    /// Breaks blocks
    pub destructive: bool,
}

/// Slotmap-backed world for tests and the sandbox.
#[derive(Debug, Default)]
pub struct SimpleWorld {
    actors: SlotMap<ActorId, SimpleActor>,
    blocks: HashMap<(i32, i32, i32), Block>,
    /// Explosions requested so far
    pub explosions: Vec<Explosion>,
}

fn cell(point: &Vec3) -> (i32, i32, i32) {
    (
        point.x.floor() as i32,
        point.y.floor() as i32,
        point.z.floor() as i32,
    )
}

impl SimpleWorld {
    /// Empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an actor, returning its handle
    pub fn spawn_actor(&mut self, actor: SimpleActor) -> ActorId {
        self.actors.insert_with_key(|id| SimpleActor { id, ..actor })
    }

    /// Remove an actor; its handle stays dangling
    pub fn despawn_actor(&mut self, id: ActorId) -> Option<SimpleActor> {
        self.actors.remove(id)
    }

    /// Concrete actor, for assertions
    pub fn simple_actor(&self, id: ActorId) -> Option<&SimpleActor> {
        self.actors.get(id)
    }

    /// Concrete actor, for setup
    pub fn simple_actor_mut(&mut self, id: ActorId) -> Option<&mut SimpleActor> {
        self.actors.get_mut(id)
    }

    /// Place a block in the cell containing `point`
    pub fn set_block(&mut self, point: Vec3, block: Block) {
        self.blocks.insert(cell(&point), block);
    }

    /// Fill a horizontal square of cells at height `y`
    pub fn fill_floor(&mut self, y: i32, half_size: i32, block: &Block) {
        for x in -half_size..=half_size {
            for z in -half_size..=half_size {
                self.blocks.insert((x, y, z), block.clone());
            }
        }
    }

    fn block(&self, point: &Vec3) -> Option<&Block> {
        self.blocks.get(&cell(point))
    }
}

impl SpatialQuery for SimpleWorld {
    fn actors_within(&self, bound: &BoundingVolume) -> Vec<ActorId> {
        self.actors
            .iter()
            .filter(|(_, actor)| actor.valid && actor.bounds().intersects(bound))
            .map(|(id, _)| id)
            .collect()
    }

    fn block_hardness(&self, point: &Vec3) -> f64 {
        self.block(point).map_or(0.0, |b| b.hardness)
    }

    fn is_air(&self, point: &Vec3) -> bool {
        self.block(point).is_none()
    }

    fn block_material(&self, point: &Vec3) -> Option<MaterialId> {
        self.block(point).map(|b| b.material.clone())
    }

    fn block_slipperiness(&self, point: &Vec3) -> f64 {
        self.block(point).map_or(0.6, |b| b.slipperiness)
    }

    fn is_liquid(&self, point: &Vec3) -> bool {
        self.block(point).is_some_and(|b| b.liquid)
    }
}

impl ActorRegistry for SimpleWorld {
    fn actor(&self, id: ActorId) -> Option<&dyn Actor> {
        self.actors.get(id).map(|a| a as &dyn Actor)
    }

    fn actor_mut(&mut self, id: ActorId) -> Option<&mut dyn Actor> {
        self.actors.get_mut(id).map(|a| a as &mut dyn Actor)
    }
}

impl DamageSink for SimpleWorld {
    fn attack_actors(&mut self, damage: &Damage) -> Vec<ActorId> {
        let Some(bounds) = &damage.bounds else {
            return Vec::new();
        };
        let hit: Vec<ActorId> = self
            .actors_within(bounds)
            .into_iter()
            .filter(|id| {
                self.actors
                    .get(*id)
                    .is_some_and(|a| damage.source.is_none() || a.attached_to != damage.source)
            })
            .collect();
        for id in &hit {
            if let Some(actor) = self.actors.get_mut(*id) {
                actor.damage_taken += damage.amount;
            }
        }
        hit
    }

    fn spawn_explosion(&mut self, position: Vec3, strength: f64, destructive: bool) {
        self.explosions.push(Explosion {
            position,
            strength,
            destructive,
        });
    }
}
