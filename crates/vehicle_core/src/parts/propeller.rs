//! Propellers and rotors
//!
//! A propeller turns at its power source's speed through the gearbox and
//! pushes along its own +Z axis. Rotors use collective pitch from the
//! throttle; dynamic-pitch propellers feather toward reverse or toward the
//! pitch that keeps the engine in its band.

use std::f64::consts::PI;

use crate::definition::PropellerDefinition;
use crate::entity::damage::{Damage, DamageAccumulator, DamageCause};
use crate::events::{EventBroadcaster, SyncEvent};
use crate::foundation::logging::debug;
use crate::foundation::math::{utils, Vec3};
use crate::physics::BoundingVolume;
use crate::world::{SpatialQuery, World};

use super::{DamageOutcome, Forces, PartContext, PartMount};

/// Pitch dynamic propellers hold at low engine speed, and its negative in reverse
pub const MIN_DYNAMIC_PITCH: i32 = 45;

/// Angle of attack above which the blades stall, in radians
pub const STALL_ANGLE: f64 = 0.4663;

/// Thrust multiplier in liquid
pub const SUBMERGED_FACTOR: f64 = 50.0;

/// Angular position is folded back by this many revolutions
pub const ANGULAR_FOLD: f64 = 3_600_000.0;

/// Spin-down per tick with no drive
pub const DISCONNECTED_DECAY: f64 = 0.01;

/// Engine speed below which the blades are harmless
pub const DAMAGE_MIN_RPM: f64 = 100.0;

const INCHES_TO_METERS: f64 = 0.0254;
const TICKS_PER_SECOND: f64 = 20.0;

/// Inputs to the blade-element thrust estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustInput {
    /// Blade pitch in inches
    pub pitch: f64,
    /// Revolutions per tick
    pub angular_velocity: f64,
    /// Disc diameter in inches
    pub diameter: f64,
    /// Power source speed
    pub rpm: f64,
    /// Engine revolutions per propeller revolution
    pub gearbox_ratio: f64,
    /// Body velocity along the thrust axis, blocks per tick
    pub axial_velocity: f64,
    /// Air density at the propeller
    pub air_density: f64,
    /// The disc is in liquid
    pub submerged: bool,
}

/// Thrust estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustOutput {
    /// Thrust after stall and submersion
    pub thrust: f64,
    /// Thrust before stall attenuation
    pub unstalled_thrust: f64,
    /// Blade angle of attack in radians
    pub angle_of_attack: f64,
    /// Stall attenuation applied
    pub stalled: bool,
}

/// Thrust along the propeller axis.
///
/// `None` when the blades advance nothing per tick.
pub fn compute_thrust(input: &ThrustInput) -> Option<ThrustOutput> {
    let current = TICKS_PER_SECOND * input.axial_velocity;
    let desired = INCHES_TO_METERS * (input.pitch + 20.0) * TICKS_PER_SECOND * input.angular_velocity;
    if desired == 0.0 {
        return None;
    }

    let radius = INCHES_TO_METERS * input.diameter / 2.0;
    let disc_area = PI * radius * radius;
    let unstalled = (desired - current) * disc_area * input.air_density / 25.0 * 1.5;

    let revolutions_per_second = if input.gearbox_ratio != 0.0 {
        input.rpm / input.gearbox_ratio / 60.0
    } else {
        0.0
    };
    let angle_of_attack = if revolutions_per_second != 0.0 {
        (desired - current) / revolutions_per_second / (input.diameter * PI * INCHES_TO_METERS)
    } else {
        0.0
    };

    let stalled = angle_of_attack.abs() > STALL_ANGLE;
    let mut thrust = if stalled {
        unstalled * STALL_ANGLE / angle_of_attack.abs()
    } else {
        unstalled
    };
    if input.submerged {
        thrust *= SUBMERGED_FACTOR;
    }
    Some(ThrustOutput {
        thrust,
        unstalled_thrust: unstalled,
        angle_of_attack,
        stalled,
    })
}

/// Propeller or rotor
#[derive(Debug, Clone)]
pub struct Propeller {
    definition: PropellerDefinition,
    mount: PartMount,
    pitch: i32,
    position: f64,
    prev_position: f64,
    angular_velocity: f64,
    damage: DamageAccumulator,
    valid: bool,
}

impl Propeller {
    /// Stationary propeller at its declared pitch
    pub fn new(definition: PropellerDefinition, mount: PartMount) -> Self {
        Self {
            pitch: definition.pitch,
            damage: DamageAccumulator::new(0.0, definition.health),
            definition,
            mount,
            position: 0.0,
            prev_position: 0.0,
            angular_velocity: 0.0,
            valid: true,
        }
    }

    /// Mount point
    pub fn mount(&self) -> &PartMount {
        &self.mount
    }

    /// Definition
    pub fn definition(&self) -> &PropellerDefinition {
        &self.definition
    }

    /// False once destroyed or found without a power source
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Current blade pitch in inches
    pub fn pitch(&self) -> i32 {
        self.pitch
    }

    /// Revolutions per tick
    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    /// Rotation in revolutions
    pub fn angular_position(&self) -> f64 {
        self.position
    }

    /// Accumulated part damage
    pub fn damage(&self) -> &DamageAccumulator {
        &self.damage
    }

    /// Half extents of the strike zone
    pub fn damage_half_extents(&self) -> Vec3 {
        let radius = self.definition.diameter * INCHES_TO_METERS / 2.0;
        if self.definition.is_rotor {
            Vec3::new(radius, 0.25, radius)
        } else {
            Vec3::new(radius, radius, radius)
        }
    }

    /// Per-tick update: pitch, spin and blade strikes
    pub fn tick<W: World + ?Sized>(&mut self, ctx: &PartContext<'_>, world: &mut W) {
        let Some(power) = ctx.power else {
            if self.valid {
                debug!("{} part {}: propeller has no power source", ctx.slot.object, ctx.slot.index);
            }
            self.valid = false;
            return;
        };

        if self.definition.is_rotor {
            let target = if power.is_running() {
                (ctx.controls.throttle * 1.35 - 0.35) * f64::from(self.definition.pitch)
            } else {
                0.0
            };
            let current = f64::from(self.pitch);
            if current < target {
                self.pitch += 1;
            } else if current > target {
                self.pitch -= 1;
            }
        } else if self.definition.is_dynamic_pitch {
            let reverse = ctx.controls.reverse_thrust;
            let rpm = power.rpm();
            let max_rpm = power.max_safe_rpm();
            if reverse {
                if self.pitch > -MIN_DYNAMIC_PITCH {
                    self.pitch -= 1;
                }
            } else if self.pitch < MIN_DYNAMIC_PITCH {
                self.pitch += 1;
            } else if rpm < max_rpm * 0.60 && self.pitch > MIN_DYNAMIC_PITCH {
                self.pitch -= 1;
            } else if rpm > max_rpm * 0.85 && self.pitch < self.definition.pitch {
                self.pitch += 1;
            }
        }

        let ratio = power.propeller_gearbox_ratio();
        if ratio != 0.0 {
            self.angular_velocity = power.rpm() / ratio / 60.0 / TICKS_PER_SECOND;
        } else if self.angular_velocity > 0.0 {
            self.angular_velocity = (self.angular_velocity - DISCONNECTED_DECAY).max(0.0);
        } else if self.angular_velocity < 0.0 {
            self.angular_velocity = (self.angular_velocity + DISCONNECTED_DECAY).min(0.0);
        }

        self.prev_position = self.position;
        self.position += self.angular_velocity;
        self.fold_position();

        if ctx.slot.side.is_authority() && power.rpm() >= DAMAGE_MIN_RPM {
            let amount = ctx.settings.damage.propeller_damage_factor * power.rpm() * ratio / 500.0;
            let bounds = BoundingVolume::new(self.mount.world_position(ctx.pose), self.damage_half_extents());
            let damage = Damage::area(amount, bounds, ctx.slot.object, DamageCause::Propeller).with_attacker(ctx.controller);
            world.attack_actors(&damage);
        }
    }

    /// Past the fold limit the position jumps by two folds, landing on the
    /// opposite side of zero.
    fn fold_position(&mut self) {
        let shift = if self.position > ANGULAR_FOLD {
            -2.0 * ANGULAR_FOLD
        } else if self.position < -ANGULAR_FOLD {
            2.0 * ANGULAR_FOLD
        } else {
            return;
        };
        self.position += shift;
        self.prev_position += shift;
    }

    /// Thrust estimate for the current state, `None` while unpowered
    pub fn thrust<W: SpatialQuery + ?Sized>(&self, ctx: &PartContext<'_>, world: &W) -> Option<ThrustOutput> {
        let power = ctx.power.filter(|power| power.is_running())?;
        let axis = self.mount.world_orientation(ctx.pose) * Vec3::z();
        compute_thrust(&ThrustInput {
            pitch: f64::from(self.pitch),
            angular_velocity: self.angular_velocity,
            diameter: self.definition.diameter,
            rpm: power.rpm(),
            gearbox_ratio: power.propeller_gearbox_ratio(),
            axial_velocity: ctx.motion.motion.dot(&axis),
            air_density: ctx.motion.air_density,
            submerged: world.is_liquid(&self.mount.world_position(ctx.pose)),
        })
    }

    /// Add thrust and the torque of its offset to the body
    pub fn add_to_force_output<W: SpatialQuery + ?Sized>(&self, ctx: &PartContext<'_>, world: &W, forces: &mut Forces) {
        let Some(output) = self.thrust(ctx, world) else {
            return;
        };
        let axis = self.mount.world_orientation(ctx.pose) * Vec3::z();
        let force = axis * output.thrust;
        forces.force += force;

        let local = ctx.pose.orientation.inverse() * force;
        let offset = self.mount.offset;
        forces.torque.y -= local.z * offset.x;
        forces.torque.z += local.y * offset.x;
        if !ctx.anything_grounded {
            forces.torque.x += local.z * offset.y;
        }
    }

    /// Record a hit.
    ///
    /// Empty-handed swings never break the propeller; one by someone not
    /// riding the object asks for a hand start. The hit that uses up the
    /// last health explodes the propeller and invalidates it; later hits
    /// are ignored.
    pub fn attack<W: World + ?Sized>(
        &mut self,
        damage: &Damage,
        ctx: &PartContext<'_>,
        world: &mut W,
        events: &mut dyn EventBroadcaster,
    ) -> DamageOutcome {
        if damage.is_water || !self.valid {
            return DamageOutcome::Ignored;
        }
        self.damage.apply(damage.amount);

        if damage.attacker_empty_handed {
            let outside = damage
                .attacker
                .and_then(|attacker| world.actor(attacker))
                .is_some_and(|attacker| attacker.attachment_owner() != Some(ctx.slot.object));
            return match self.definition.engine {
                Some(engine) if outside => {
                    if ctx.slot.side.is_authority() {
                        events.broadcast(SyncEvent::HandStartRequested {
                            object: ctx.slot.object,
                            engine,
                        });
                    }
                    DamageOutcome::HandStart
                }
                _ => DamageOutcome::Absorbed,
            };
        }

        if self.damage.is_destroyed() {
            let position = self.mount.world_position(ctx.pose);
            if ctx.settings.damage.explosions {
                world.spawn_explosion(position, 1.0, true);
            } else {
                world.spawn_explosion(position, 0.0, false);
            }
            self.valid = false;
            return DamageOutcome::Destroyed;
        }
        DamageOutcome::Absorbed
    }

    /// Animation variables
    pub fn variable(&self, name: &str, partial_ticks: f64) -> Option<f64> {
        let pitch = f64::from(self.pitch);
        Some(match name {
            "propeller_pitch_deg" => {
                utils::rad_to_deg((pitch / (self.definition.diameter * 0.75 * PI)).atan())
            }
            "propeller_pitch_in" => pitch,
            "propeller_pitch_percent" => {
                let span = f64::from(self.definition.pitch - MIN_DYNAMIC_PITCH);
                if span == 0.0 {
                    0.0
                } else {
                    (pitch - f64::from(MIN_DYNAMIC_PITCH)) / span
                }
            }
            "propeller_rotation" => (self.position + self.angular_velocity * partial_ticks) * 360.0,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimSettings;
    use crate::definition::EngineDefinition;
    use crate::events::EventQueue;
    use crate::foundation::ids::{ObjectId, Side};
    use crate::foundation::math::Quat;
    use crate::foundation::pose::Pose;
    use crate::parts::{PartSlot, PowerSource, SimpleEngine};
    use crate::vehicle::state::{Controls, Motion};
    use crate::world::{SimpleActor, SimpleWorld};
    use approx::assert_relative_eq;

    fn definition() -> PropellerDefinition {
        PropellerDefinition {
            is_rotor: false,
            is_dynamic_pitch: false,
            pitch: 60,
            diameter: 40.0,
            health: 10.0,
            engine: Some(0),
        }
    }

    fn mount() -> PartMount {
        PartMount {
            offset: Vec3::new(1.0, 2.0, 3.0),
            orientation: Quat::identity(),
        }
    }

    fn engine(rpm: f64) -> SimpleEngine {
        let mut engine = SimpleEngine::new(EngineDefinition {
            idle_rpm: 500.0,
            max_safe_rpm: 2000.0,
            propeller_gearbox_ratio: 1.0,
            spool_rate: 100.0,
        });
        engine.start();
        engine.set_rpm(rpm);
        engine
    }

    struct Fixture {
        pose: Pose,
        controls: Controls,
        motion: Motion,
        settings: SimSettings,
        engine: SimpleEngine,
    }

    impl Fixture {
        fn new(rpm: f64) -> Self {
            Self {
                pose: Pose::default(),
                controls: Controls::default(),
                motion: Motion::default(),
                settings: SimSettings::default(),
                engine: engine(rpm),
            }
        }

        fn ctx(&self, side: Side) -> PartContext<'_> {
            PartContext {
                slot: PartSlot {
                    object: ObjectId::new(9),
                    index: 1,
                    side,
                },
                pose: &self.pose,
                controls: &self.controls,
                motion: &self.motion,
                settings: &self.settings,
                mass: 500.0,
                controller: None,
                grounded: false,
                actually_on_ground: false,
                driven: true,
                anything_grounded: false,
                power: Some(&self.engine as &dyn PowerSource),
            }
        }
    }

    fn input() -> ThrustInput {
        ThrustInput {
            pitch: 60.0,
            angular_velocity: 2000.0 / 60.0 / 20.0,
            diameter: 40.0,
            rpm: 2000.0,
            gearbox_ratio: 1.0,
            axial_velocity: 0.0,
            air_density: 1.225,
            submerged: false,
        }
    }

    #[test]
    fn test_stall_attenuation() {
        let output = compute_thrust(&input()).unwrap();
        assert!(output.stalled);
        assert!(output.angle_of_attack.abs() > STALL_ANGLE);

        let desired = 0.0254 * 80.0 * 20.0 * (2000.0 / 60.0 / 20.0);
        let radius = 0.0254 * 40.0 / 2.0;
        let unstalled = desired * PI * radius * radius * 1.225 / 25.0 * 1.5;
        assert_relative_eq!(output.unstalled_thrust, unstalled, epsilon = 1e-12);
        assert_relative_eq!(
            output.thrust,
            output.unstalled_thrust * STALL_ANGLE / output.angle_of_attack.abs(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_unstalled_and_submerged() {
        let wide = ThrustInput {
            diameter: 70.0,
            ..input()
        };
        let output = compute_thrust(&wide).unwrap();
        assert!(!output.stalled);
        assert_relative_eq!(output.thrust, output.unstalled_thrust);

        let wet = compute_thrust(&ThrustInput { submerged: true, ..wide }).unwrap();
        assert_relative_eq!(wet.thrust, output.thrust * SUBMERGED_FACTOR, epsilon = 1e-9);

        // Disengaged gearbox: no angle of attack to stall on
        let disengaged = compute_thrust(&ThrustInput { gearbox_ratio: 0.0, ..input() }).unwrap();
        assert_eq!(disengaged.angle_of_attack, 0.0);
        assert!(!disengaged.stalled);

        assert!(compute_thrust(&ThrustInput { angular_velocity: 0.0, ..input() }).is_none());
    }

    #[test]
    fn test_unpowered_propeller_is_invalid() {
        let fixture = Fixture::new(0.0);
        let mut propeller = Propeller::new(definition(), mount());
        let mut ctx = fixture.ctx(Side::Authority);
        ctx.power = None;
        propeller.tick(&ctx, &mut SimpleWorld::new());
        assert!(!propeller.is_valid());
    }

    #[test]
    fn test_spin_from_gearbox() {
        let fixture = Fixture::new(1200.0);
        let mut propeller = Propeller::new(definition(), mount());
        let mut world = SimpleWorld::new();
        propeller.tick(&fixture.ctx(Side::Authority), &mut world);
        assert_relative_eq!(propeller.angular_velocity(), 1.0);
        assert_relative_eq!(propeller.angular_position(), 1.0);
        assert_relative_eq!(propeller.variable("propeller_rotation", 0.5).unwrap(), 540.0);
    }

    #[test]
    fn test_position_folds() {
        let fixture = Fixture::new(1200.0);
        let mut propeller = Propeller::new(definition(), mount());
        propeller.position = ANGULAR_FOLD - 0.5;
        propeller.tick(&fixture.ctx(Side::Replica), &mut SimpleWorld::new());
        assert_relative_eq!(propeller.angular_position(), -ANGULAR_FOLD + 0.5, epsilon = 1e-6);
        assert_relative_eq!(propeller.prev_position, -ANGULAR_FOLD - 0.5, epsilon = 1e-6);

        propeller.position = -ANGULAR_FOLD;
        propeller.angular_velocity = 0.0;
        propeller.prev_position = propeller.position;
        let mut stopped = Fixture::new(1200.0);
        stopped.engine.set_rpm(0.0);
        stopped.engine.stop();
        // Not past the limit: no fold
        propeller.tick(&stopped.ctx(Side::Replica), &mut SimpleWorld::new());
        assert_relative_eq!(propeller.angular_position(), -ANGULAR_FOLD, epsilon = 1e-6);
    }

    #[test]
    fn test_dynamic_pitch_feathers() {
        let mut fixture = Fixture::new(1000.0);
        let mut propeller = Propeller::new(
            PropellerDefinition {
                is_dynamic_pitch: true,
                ..definition()
            },
            mount(),
        );
        let mut world = SimpleWorld::new();

        // Low engine speed: pitch drops back to the minimum
        propeller.pitch = 47;
        propeller.tick(&fixture.ctx(Side::Replica), &mut world);
        propeller.tick(&fixture.ctx(Side::Replica), &mut world);
        propeller.tick(&fixture.ctx(Side::Replica), &mut world);
        assert_eq!(propeller.pitch(), MIN_DYNAMIC_PITCH);

        // High engine speed: pitch climbs to the declared maximum
        fixture.engine.set_rpm(1900.0);
        for _ in 0..30 {
            propeller.tick(&fixture.ctx(Side::Replica), &mut world);
        }
        assert_eq!(propeller.pitch(), 60);
        assert_relative_eq!(propeller.variable("propeller_pitch_percent", 0.0).unwrap(), 1.0);

        fixture.controls.reverse_thrust = true;
        for _ in 0..200 {
            propeller.tick(&fixture.ctx(Side::Replica), &mut world);
        }
        assert_eq!(propeller.pitch(), -MIN_DYNAMIC_PITCH);

        // Reverse pitch holds even when the engine speed asks for more
        propeller.tick(&fixture.ctx(Side::Replica), &mut world);
        assert_eq!(propeller.pitch(), -MIN_DYNAMIC_PITCH);
    }

    #[test]
    fn test_rotor_collective() {
        let mut fixture = Fixture::new(1000.0);
        fixture.controls.throttle = 1.0;
        let mut rotor = Propeller::new(
            PropellerDefinition {
                is_rotor: true,
                pitch: 20,
                ..definition()
            },
            mount(),
        );
        let mut world = SimpleWorld::new();
        for _ in 0..5 {
            rotor.tick(&fixture.ctx(Side::Replica), &mut world);
        }
        assert_eq!(rotor.pitch(), 20);

        fixture.controls.throttle = 0.0;
        for _ in 0..40 {
            rotor.tick(&fixture.ctx(Side::Replica), &mut world);
        }
        // (0 * 1.35 - 0.35) * 20
        assert_eq!(rotor.pitch(), -7);

        fixture.engine.stop();
        for _ in 0..10 {
            rotor.tick(&fixture.ctx(Side::Replica), &mut world);
        }
        assert_eq!(rotor.pitch(), 0);
    }

    #[test]
    fn test_thrust_and_torque() {
        let mut fixture = Fixture::new(1200.0);
        let mut propeller = Propeller::new(definition(), mount());
        let world = SimpleWorld::new();
        propeller.tick(&fixture.ctx(Side::Replica), &mut SimpleWorld::new());

        let mut forces = Forces::default();
        propeller.add_to_force_output(&fixture.ctx(Side::Replica), &world, &mut forces);
        let thrust = forces.force.z;
        assert!(thrust > 0.0);
        assert_relative_eq!(forces.torque.y, -thrust * 1.0);
        assert_relative_eq!(forces.torque.z, 0.0);
        assert_relative_eq!(forces.torque.x, thrust * 2.0);

        let mut grounded = Forces::default();
        let mut ctx = fixture.ctx(Side::Replica);
        ctx.anything_grounded = true;
        propeller.add_to_force_output(&ctx, &world, &mut grounded);
        assert_eq!(grounded.torque.x, 0.0);

        fixture.engine.stop();
        let mut stopped = Forces::default();
        propeller.add_to_force_output(&fixture.ctx(Side::Replica), &world, &mut stopped);
        assert_eq!(stopped, Forces::default());
    }

    #[test]
    fn test_blade_strikes_on_authority() {
        let fixture = Fixture::new(1000.0);
        let mut world = SimpleWorld::new();
        let victim = world.spawn_actor(SimpleActor::new(Vec3::new(1.0, 1.5, 3.0)));
        let mut propeller = Propeller::new(definition(), mount());

        propeller.tick(&fixture.ctx(Side::Replica), &mut world);
        assert_eq!(world.simple_actor(victim).unwrap().damage_taken, 0.0);

        propeller.tick(&fixture.ctx(Side::Authority), &mut world);
        assert_relative_eq!(world.simple_actor(victim).unwrap().damage_taken, 2.0);
    }

    #[test]
    fn test_hand_start_and_destruction() {
        let fixture = Fixture::new(0.0);
        let mut world = SimpleWorld::new();
        let pilot = world.spawn_actor(SimpleActor::new(Vec3::zeros()));
        let mut events = EventQueue::new();
        let mut propeller = Propeller::new(definition(), mount());
        let ctx = fixture.ctx(Side::Authority);

        let swing = Damage::new(1.0).with_attacker(Some(pilot)).empty_handed();
        assert_eq!(propeller.attack(&swing, &ctx, &mut world, &mut events), DamageOutcome::HandStart);
        assert!(matches!(
            events.events()[0],
            SyncEvent::HandStartRequested { engine: 0, .. }
        ));

        // Riders cannot hand start their own propeller
        world.simple_actor_mut(pilot).unwrap().attached_to = Some(ObjectId::new(9));
        assert_eq!(propeller.attack(&swing, &ctx, &mut world, &mut events), DamageOutcome::Absorbed);

        assert_eq!(propeller.attack(&Damage::new(50.0).water(), &ctx, &mut world, &mut events), DamageOutcome::Ignored);
        assert_eq!(propeller.attack(&Damage::new(50.0), &ctx, &mut world, &mut events), DamageOutcome::Destroyed);
        assert!(!propeller.is_valid());
        assert_eq!(world.explosions.len(), 1);
        assert!(world.explosions[0].destructive);

        // A broken propeller does not blow up again
        assert_eq!(propeller.attack(&Damage::new(1.0), &ctx, &mut world, &mut events), DamageOutcome::Ignored);
        assert_eq!(world.explosions.len(), 1);
    }

    #[test]
    fn test_rider_swing_never_breaks_propeller() {
        let fixture = Fixture::new(0.0);
        let mut world = SimpleWorld::new();
        let rider = world.spawn_actor(SimpleActor::new(Vec3::zeros()));
        world.simple_actor_mut(rider).unwrap().attached_to = Some(ObjectId::new(9));
        let mut events = EventQueue::new();
        let mut propeller = Propeller::new(
            PropellerDefinition {
                health: 1.0,
                ..definition()
            },
            mount(),
        );
        let ctx = fixture.ctx(Side::Authority);

        let swing = Damage::new(5.0).with_attacker(Some(rider)).empty_handed();
        assert_eq!(propeller.attack(&swing, &ctx, &mut world, &mut events), DamageOutcome::Absorbed);
        assert_eq!(propeller.attack(&swing, &ctx, &mut world, &mut events), DamageOutcome::Absorbed);
        assert!(propeller.is_valid());
        assert!(world.explosions.is_empty());
        assert!(events.is_empty());
    }

    #[test]
    fn test_pitch_variables() {
        let propeller = Propeller::new(definition(), mount());
        let degrees = propeller.variable("propeller_pitch_deg", 0.0).unwrap();
        assert_relative_eq!(degrees, (60.0 / (40.0 * 0.75 * PI)).atan().to_degrees(), epsilon = 1e-12);
        assert_eq!(propeller.variable("propeller_pitch_in", 0.0), Some(60.0));
        assert_eq!(propeller.variable("ground_rotation", 0.0), None);
    }
}
