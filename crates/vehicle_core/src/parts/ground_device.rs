//! # Ground contact model
//!
//! Wheels, treads, skids and pontoons. While grounded the part rolls at the
//! speed implied by the vehicle's ground velocity, flags hard contact for
//! skid effects, may blow out while its rotation is held by a skid
//! controller, and damages actors it runs over.
//!
//! A flat part keeps its flat height and halved friction until repaired.
//! Angular position is never wrapped; `ground_rotation_normalized` reports
//! it modulo 360 for animations.

use std::f64::consts::PI;

use rand::Rng;

use crate::animation::adjust_variable;
use crate::animation::modifier::apply_to_store;
use crate::config::DamageSettings;
use crate::definition::GroundDeviceDefinition;
use crate::entity::damage::{Damage, DamageAccumulator, DamageCause};
use crate::events::{EventBroadcaster, SyncEvent};
use crate::foundation::logging::info;
use crate::foundation::math::Vec3;
use crate::foundation::pose::Pose;
use crate::persistence::{BlobError, DataBlob};
use crate::physics::{BoundingVolume, VolumeFlags};
use crate::variables::VariableStore;
use crate::vehicle::state::Motion;
use crate::world::{SpatialQuery, World};

use super::{DamageOutcome, PartContext, PartMount, PartSlot};

/// Below this ratio of actual to implied rotation the wheel is skidding
pub const SKID_RATIO: f64 = 0.25;

/// Minimum vehicle speed for contact effects
pub const CONTACT_MIN_SPEED: f64 = 0.3;

/// Minimum block hardness for contact effects
pub const CONTACT_MIN_HARDNESS: f64 = 1.25;

/// Odds denominator of a blowout per held tick
pub const FLAT_ROLL_RANGE: f64 = 50_000.0;

/// Spin-down per tick of a free, airborne wheel
pub const FREE_SPIN_DECAY: f64 = 0.05;

/// Slipperiness of ordinary ground
pub const BASE_SLIPPERINESS: f64 = 0.6;

/// Gap below the part still counted as touching the ground
pub const GROUND_DETECTION_OFFSET: f64 = 0.05;

const FLAT_KEY: &str = "isFlat";
const MOTIVE_FRICTION: &str = "motiveFriction";
const LATERAL_FRICTION: &str = "lateralFriction";

/// Wheel, tread, skid or pontoon
#[derive(Debug, Clone)]
pub struct GroundDevice {
    definition: GroundDeviceDefinition,
    mount: PartMount,
    long_offset: f64,
    volumes: Vec<BoundingVolume>,
    position: f64,
    prev_position: f64,
    angular_velocity: f64,
    prev_angular_velocity: f64,
    motive_friction: f64,
    lateral_friction: f64,
    flat: bool,
    contact_this_tick: bool,
    animate_as_on_ground: bool,
    ticks_calcs_skipped: u32,
    in_liquid: bool,
    world_position: Vec3,
    damage: DamageAccumulator,
    /// Angular velocity is held by an external controller this tick
    pub skip_angular_calcs: bool,
}

impl GroundDevice {
    /// Part with saved flat state
    pub fn load(
        definition: GroundDeviceDefinition,
        mount: PartMount,
        placement_long_offset: f64,
        blob: &dyn DataBlob,
    ) -> Result<Self, BlobError> {
        let mut device = Self::new(definition, mount, placement_long_offset);
        device.flat = blob.get_bool(FLAT_KEY)?;
        device.rebuild_volumes();
        Ok(device)
    }

    /// Fresh, inflated part
    pub fn new(definition: GroundDeviceDefinition, mount: PartMount, placement_long_offset: f64) -> Self {
        let long_offset = if placement_long_offset != 0.0 {
            placement_long_offset
        } else {
            definition.extra_collision_box_offset
        };
        let mut device = Self {
            motive_friction: definition.motive_friction,
            lateral_friction: definition.lateral_friction,
            damage: DamageAccumulator::new(0.0, definition.health),
            world_position: mount.offset,
            definition,
            mount,
            long_offset,
            volumes: Vec::new(),
            position: 0.0,
            prev_position: 0.0,
            angular_velocity: 0.0,
            prev_angular_velocity: 0.0,
            flat: false,
            contact_this_tick: false,
            animate_as_on_ground: false,
            ticks_calcs_skipped: 0,
            in_liquid: false,
            skip_angular_calcs: false,
        };
        device.rebuild_volumes();
        device
    }

    fn rebuild_volumes(&mut self) {
        let half = Vec3::new(self.width() / 2.0, self.height() / 2.0, self.width() / 2.0);
        let mut centers = vec![self.mount.offset];
        if self.long_offset != 0.0 {
            centers.push(self.mount.offset + Vec3::new(0.0, 0.0, self.long_offset));
        }
        self.volumes = centers
            .into_iter()
            .map(|center| BoundingVolume::local(center, half, VolumeFlags::empty()))
            .collect();
    }

    /// Mount point
    pub fn mount(&self) -> &PartMount {
        &self.mount
    }

    /// Definition
    pub fn definition(&self) -> &GroundDeviceDefinition {
        &self.definition
    }

    /// Full width
    pub fn width(&self) -> f64 {
        self.definition.width
    }

    /// Full height, the flat height once flat
    pub fn height(&self) -> f64 {
        if self.flat {
            self.definition.flat_height
        } else {
            self.definition.height
        }
    }

    /// Offset of the second contact volume of long parts
    pub fn long_part_offset(&self) -> f64 {
        self.long_offset
    }

    /// Contact volumes in world space
    pub fn volumes(&self) -> &[BoundingVolume] {
        &self.volumes
    }

    /// Center in world space
    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    /// Flat
    pub fn is_flat(&self) -> bool {
        self.flat
    }

    /// Hard contact this tick, for skid effects
    pub fn contact_this_tick(&self) -> bool {
        self.contact_this_tick
    }

    /// Rendered as touching the ground
    pub fn animate_as_on_ground(&self) -> bool {
        self.animate_as_on_ground
    }

    /// Rotation in revolutions, unbounded
    pub fn angular_position(&self) -> f64 {
        self.position
    }

    /// Revolutions per tick
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// Override angular velocity, used by skid controllers
    pub fn set_angular_velocity(&mut self, angular_velocity: f64) {
        self.angular_velocity = angular_velocity;
    }

    /// Ticks the rotation has been held, decays while free
    pub fn ticks_calcs_skipped(&self) -> u32 {
        self.ticks_calcs_skipped
    }

    /// Accumulated part damage
    pub fn damage(&self) -> &DamageAccumulator {
        &self.damage
    }

    /// Friction along the direction of travel
    pub fn motive_friction(&self) -> f64 {
        if self.flat {
            self.motive_friction / 2.0
        } else {
            self.motive_friction
        }
    }

    /// Friction across the direction of travel
    pub fn lateral_friction(&self) -> f64 {
        if self.flat {
            self.lateral_friction / 2.0
        } else {
            self.lateral_friction
        }
    }

    /// Place the contact volumes on the body
    pub fn update_volumes(&mut self, pose: &Pose) {
        self.world_position = self.mount.world_position(pose);
        for volume in &mut self.volumes {
            volume.update_to_pose(pose);
        }
    }

    /// Whether the lowest point of a contact volume rests on a solid block
    pub fn detect_ground<W: SpatialQuery + ?Sized>(&self, world: &W) -> bool {
        self.volumes.iter().any(|volume| {
            let probe = Vec3::new(
                volume.global_center.x,
                volume.bottom() - GROUND_DETECTION_OFFSET,
                volume.global_center.z,
            );
            !world.is_air(&probe) && !world.is_liquid(&probe)
        })
    }

    /// Rotation that matches the vehicle's ground speed.
    ///
    /// Skid steering drives each side from the rudder instead. Long parts
    /// skip the circumference term. Parts that do not roll return zero.
    pub fn desired_angular_velocity(&self, ctx: &PartContext<'_>) -> f64 {
        if !self.definition.is_wheel && !self.definition.is_tread {
            return 0.0;
        }
        let circumference = if self.long_offset == 0.0 {
            self.height() * PI
        } else {
            1.0
        };
        if ctx.controls.skid_steer {
            let x = self.mount.offset.x;
            let turn = ctx.controls.rudder_angle / 200.0 / circumference;
            if x > 0.0 {
                turn
            } else if x < 0.0 {
                -turn
            } else {
                0.0
            }
        } else if ctx.motion.going_in_reverse {
            -ctx.motion.ground_velocity / circumference
        } else {
            ctx.motion.ground_velocity / circumference
        }
    }

    /// Per-tick update
    pub fn tick<W, R>(&mut self, ctx: &PartContext<'_>, world: &mut W, rng: &mut R, events: &mut dyn EventBroadcaster)
    where
        W: World + ?Sized,
        R: Rng,
    {
        self.in_liquid = world.is_liquid(&self.world_position);
        if ctx.grounded {
            self.animate_as_on_ground = true;
            if !self.skip_angular_calcs {
                self.prev_angular_velocity = self.angular_velocity;
                self.angular_velocity = self.desired_angular_velocity(ctx);
            }
            if self.definition.is_wheel {
                self.update_contact(ctx, world);
                if ctx.slot.side.is_authority() && !self.flat {
                    self.roll_for_blowout(ctx, rng, events);
                }
            }
            if ctx.slot.side.is_authority() && ctx.motion.speed >= ctx.settings.damage.wheel_damage_minimum_velocity {
                self.run_over_actors(ctx, world);
            }
        } else {
            if !ctx.driven {
                if ctx.controls.brake > 0.0 || ctx.controls.parking_brake {
                    self.angular_velocity = 0.0;
                } else if self.angular_velocity > 0.0 {
                    self.angular_velocity = (self.angular_velocity - FREE_SPIN_DECAY).max(0.0);
                }
            }
            if self.animate_as_on_ground && !ctx.actually_on_ground {
                self.animate_as_on_ground = false;
            }
        }
        self.prev_position = self.position;
        self.position += self.angular_velocity;
    }

    fn update_contact<W: SpatialQuery + ?Sized>(&mut self, ctx: &PartContext<'_>, world: &W) {
        self.contact_this_tick = false;
        let implied = ctx.motion.ground_velocity / (self.height() * PI);
        if self.prev_angular_velocity.abs() / implied < SKID_RATIO && ctx.motion.speed > CONTACT_MIN_SPEED {
            let below = self.world_position - Vec3::y();
            if !world.is_air(&below) && world.block_hardness(&below) >= CONTACT_MIN_HARDNESS {
                self.contact_this_tick = true;
            }
        }
    }

    fn roll_for_blowout<R: Rng>(&mut self, ctx: &PartContext<'_>, rng: &mut R, events: &mut dyn EventBroadcaster) {
        if self.skip_angular_calcs {
            self.ticks_calcs_skipped += 1;
            if rng.gen::<f64>() * FLAT_ROLL_RANGE < f64::from(self.ticks_calcs_skipped) {
                self.set_flat_state(true, ctx.slot, &ctx.settings.damage, events);
            }
        } else {
            self.ticks_calcs_skipped = self.ticks_calcs_skipped.saturating_sub(1);
        }
    }

    fn run_over_actors<W: World + ?Sized>(&self, ctx: &PartContext<'_>, world: &mut W) {
        let settings = &ctx.settings.damage;
        let amount = if settings.wheel_damage_ignore_velocity {
            settings.wheel_damage_factor * ctx.mass / 1000.0
        } else {
            settings.wheel_damage_factor * ctx.motion.speed * ctx.mass / 1000.0
        };
        for volume in &self.volumes {
            let bounds = volume.expanded(Vec3::new(0.25, 0.0, 0.25));
            let damage = Damage::area(amount, bounds, ctx.slot.object, DamageCause::Wheel).with_attacker(ctx.controller);
            world.attack_actors(&damage);
        }
    }

    /// Go flat or get repaired.
    ///
    /// On the authority a part cannot go flat twice, without a flat height,
    /// or with breakage disabled; repair needs a flat part. Accepted changes
    /// are broadcast. Replicas apply the state unconditionally.
    pub fn set_flat_state(
        &mut self,
        flat: bool,
        slot: PartSlot,
        settings: &DamageSettings,
        events: &mut dyn EventBroadcaster,
    ) -> bool {
        if slot.side.is_authority() {
            if flat {
                if self.flat || self.definition.flat_height == 0.0 || !settings.wheel_breakage {
                    return false;
                }
            } else if !self.flat {
                return false;
            }
            events.broadcast(SyncEvent::FlatStateChanged {
                object: slot.object,
                part: slot.index,
                flat,
            });
        }
        self.apply_flat_state(flat);
        info!(
            "{} part {}: {}",
            slot.object,
            slot.index,
            if flat { "went flat" } else { "repaired" }
        );
        true
    }

    /// Apply a flat-state change without checks or broadcast
    pub fn apply_flat_state(&mut self, flat: bool) {
        self.flat = flat;
        let half_height = self.height() / 2.0;
        for volume in &mut self.volumes {
            volume.half_extents.y = half_height;
        }
    }

    /// Record damage; some hits blow the part out.
    ///
    /// Explosions always do, other hits half the time, and any hit once the
    /// part's health is used up.
    pub fn attack<R: Rng>(
        &mut self,
        damage: &Damage,
        slot: PartSlot,
        settings: &DamageSettings,
        rng: &mut R,
        events: &mut dyn EventBroadcaster,
    ) -> DamageOutcome {
        if damage.is_water {
            return DamageOutcome::Ignored;
        }
        self.damage.apply(damage.amount);
        if (damage.is_explosion || rng.gen::<f64>() < 0.5 || self.damage.is_destroyed())
            && self.set_flat_state(true, slot, settings, events)
        {
            return DamageOutcome::WentFlat;
        }
        DamageOutcome::Absorbed
    }

    /// Reset friction and apply modifiers.
    ///
    /// `motiveFriction` and `lateralFriction` modify the part itself; any
    /// other modifier writes its variable into `store`.
    pub fn apply_variable_modifiers(&mut self, store: &mut VariableStore) {
        self.motive_friction = self.definition.motive_friction;
        self.lateral_friction = self.definition.lateral_friction;
        for modifier in &self.definition.variable_modifiers {
            match modifier.variable.as_str() {
                MOTIVE_FRICTION => {
                    self.motive_friction = adjust_variable(modifier, self.motive_friction, &*store);
                }
                LATERAL_FRICTION => {
                    self.lateral_friction = adjust_variable(modifier, self.lateral_friction, &*store);
                }
                _ => {}
            }
        }
        apply_to_store(&self.definition.variable_modifiers, store, |name| {
            name == MOTIVE_FRICTION || name == LATERAL_FRICTION
        });
    }

    /// Grip lost to the block below, zero over air
    pub fn friction_loss<W: SpatialQuery + ?Sized>(&self, world: &W) -> f64 {
        let below = self.world_position - Vec3::y();
        if world.is_air(&below) {
            return 0.0;
        }
        let modifier = world
            .block_material(&below)
            .and_then(|material| self.definition.friction_modifiers.get(material.as_str()).copied())
            .unwrap_or(0.0);
        world.block_slipperiness(&below) - BASE_SLIPPERINESS - modifier
    }

    /// Animation variables
    pub fn variable(&self, name: &str, partial_ticks: f64, motion: &Motion) -> Option<f64> {
        let rotation = || {
            motion.speed_factor * (self.prev_position + (self.position - self.prev_position) * partial_ticks) * 360.0
        };
        let flag = |value: bool| if value { 1.0 } else { 0.0 };
        Some(match name {
            "ground_rotation" => rotation(),
            "ground_rotation_normalized" => rotation() % 360.0,
            "ground_onground" => flag(self.animate_as_on_ground),
            "ground_inliquid" => flag(self.in_liquid),
            "ground_isflat" => flag(self.flat),
            "ground_contacted" => flag(self.contact_this_tick),
            "ground_skidding" => flag(self.skip_angular_calcs),
            "ground_slipping" => flag(motion.slipping && self.animate_as_on_ground),
            _ => return None,
        })
    }

    /// Write persistent state
    pub fn save(&self, blob: &mut dyn DataBlob) {
        blob.set_bool(FLAT_KEY, self.flat);
    }
}
