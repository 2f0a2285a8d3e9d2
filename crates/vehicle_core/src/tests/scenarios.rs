//! Scenario tests
//!
//! Each test builds a complete vehicle, drives it through a few ticks on a
//! `SimpleWorld` and checks what hosts and replicas observe.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::definition::{
    BoxDefinition, CollisionGroupDefinition, EngineDefinition, GroundDeviceDefinition, ObjectDefinition,
    PartDefinition, PartPlacement, SeatDefinition,
};
use crate::entity::{Damage, InstrumentId, DAMAGE_VARIABLE};
use crate::events::{EventQueue, SyncEvent};
use crate::foundation::ids::{ObjectId, Side};
use crate::foundation::math::utils::quat_from_euler_deg;
use crate::foundation::math::{Quat, Vec3};
use crate::parts::{Part, SeatInteraction};
use crate::persistence::MemoryBlob;
use crate::physics::{CollisionGroupManager, VolumeKey};
use crate::config::SimSettings;
use crate::vehicle::Vehicle;
use crate::world::{ActorRegistry, Block, SimpleActor, SimpleWorld};

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ID: ObjectId = ObjectId::new(11);

    fn wheel(x: f64, z: f64) -> PartPlacement {
        PartPlacement {
            position: Vec3::new(x, 0.5, z),
            rotation: Vec3::zeros(),
            extra_collision_box_offset: 0.0,
            part: PartDefinition::GroundDevice(GroundDeviceDefinition {
                is_wheel: true,
                is_tread: false,
                width: 0.4,
                height: 1.0,
                flat_height: 0.6,
                motive_friction: 0.9,
                lateral_friction: 0.7,
                extra_collision_box_offset: 0.0,
                friction_modifiers: HashMap::new(),
                health: 20.0,
                variable_modifiers: Vec::new(),
            }),
        }
    }

    fn truck() -> ObjectDefinition {
        let mut definition = ObjectDefinition::new("mts:truck", 200.0);
        definition.mass = 1200.0;

        let mut cargo_bed = BoxDefinition::new(Vec3::new(0.0, 1.25, -1.0), 1.0, 0.25, 1.0);
        cargo_bed.ground_excluded = true;
        let cabin = CollisionGroupDefinition {
            is_interior: true,
            ..CollisionGroupDefinition::with_boxes(vec![BoxDefinition::new(Vec3::new(0.0, 2.0, 1.0), 1.0, 0.75, 0.75)])
        };
        let armor = CollisionGroupDefinition {
            is_for_bullets: true,
            ..CollisionGroupDefinition::with_boxes(vec![BoxDefinition::new(Vec3::new(0.0, 1.5, 2.0), 1.0, 0.5, 0.25)])
        };
        definition.collision_groups = vec![CollisionGroupDefinition::with_boxes(vec![cargo_bed]), cabin, armor];
        definition.attachment_points = vec![Vec3::new(0.0, 1.5, -1.5)];
        definition.engines.push(EngineDefinition {
            idle_rpm: 700.0,
            max_safe_rpm: 3000.0,
            propeller_gearbox_ratio: 0.0,
            spool_rate: 150.0,
        });
        definition.parts = vec![
            wheel(-1.0, 1.5),
            wheel(1.0, 1.5),
            wheel(-1.0, -1.5),
            wheel(1.0, -1.5),
            PartPlacement {
                position: Vec3::new(-0.5, 1.5, 1.0),
                rotation: Vec3::zeros(),
                extra_collision_box_offset: 0.0,
                part: PartDefinition::Seat(SeatDefinition {
                    dismount_position: None,
                    is_controller: true,
                    interactable_variables: vec![vec!["door_l".to_string()]],
                }),
            },
        ];
        definition
    }

    /// Goes through RON text so the definition is what a pack would ship
    fn definition() -> Arc<ObjectDefinition> {
        let text = ron::to_string(&truck()).unwrap();
        Arc::new(ObjectDefinition::from_ron_str(&text).unwrap())
    }

    fn spawn(side: Side, blob: &MemoryBlob) -> Vehicle {
        let registry: HashSet<InstrumentId> = HashSet::new();
        Vehicle::load(ID, definition(), side, blob, None, &registry, SimSettings::default())
            .unwrap()
            .with_pose(Vec3::zeros(), Quat::identity())
    }

    fn road() -> SimpleWorld {
        let mut world = SimpleWorld::new();
        world.fill_floor(-1, 16, &Block::solid("stone", 2.0));
        world
    }

    fn assert_partitions_consistent(manager: &CollisionGroupManager, position: &Vec3) {
        for key in manager.entity_keys() {
            assert!(manager.interaction_keys().contains(key));
        }
        for key in manager.bullet_keys() {
            assert!(!manager.entity_keys().contains(key));
            assert!(!manager.block_keys().contains(key));
        }
        let bound = manager.encompassing_box();
        for key in manager.interaction_keys() {
            let volume = manager.volume(*key).unwrap();
            let reach = (volume.global_center - position).abs() + volume.half_extents;
            assert!(bound.half_extents.x >= reach.x - 1e-9);
            assert!(bound.half_extents.y >= reach.y - 1e-9);
            assert!(bound.half_extents.z >= reach.z - 1e-9);
        }
    }

    #[test]
    fn test_partitions_hold_while_driving_and_turning() {
        let mut world = road();
        let mut vehicle = spawn(Side::Authority, &MemoryBlob::new());
        let mut events = EventQueue::new();
        let mut rng = StdRng::seed_from_u64(7);

        for tick in 1..=12 {
            let position = Vec3::new(0.0, 0.0, 0.25 * f64::from(tick));
            let orientation = quat_from_euler_deg(0.0, 5.0 * f64::from(tick), 0.0);
            vehicle.tick(position, orientation, &mut world, &mut rng, &mut events);
            assert_partitions_consistent(vehicle.object().collisions(), &position);
        }

        let collisions = vehicle.object().collisions();
        assert_eq!(collisions.block_keys(), &[VolumeKey::Group { group: 0, index: 0 }]);
        assert_eq!(collisions.entity_keys().len(), 2);
        assert_eq!(collisions.bullet_keys(), &[VolumeKey::Group { group: 2, index: 0 }]);
    }

    #[test]
    fn test_wheels_report_contact_when_spun_up_on_hard_ground() {
        let mut world = road();
        let mut vehicle = spawn(Side::Authority, &MemoryBlob::new());
        let mut events = EventQueue::new();
        let mut rng = StdRng::seed_from_u64(1);

        // From rest to 1 block per tick: the wheels were not turning yet
        vehicle.tick(Vec3::new(0.0, 0.0, 1.0), Quat::identity(), &mut world, &mut rng, &mut events);
        for index in 0..4 {
            let wheel = vehicle.part(index).and_then(Part::as_ground_device).unwrap();
            assert!(vehicle.is_grounded(index));
            assert!(wheel.contact_this_tick());
        }

        vehicle.tick(Vec3::new(0.0, 0.0, 2.0), Quat::identity(), &mut world, &mut rng, &mut events);
        let wheel = vehicle.part(0).and_then(Part::as_ground_device).unwrap();
        assert!(!wheel.contact_this_tick());
        assert_relative_eq!(wheel.angular_position(), 2.0 / std::f64::consts::PI);
    }

    #[test]
    fn test_riders_and_cargo_follow_the_truck() {
        let mut world = road();
        let passenger = world.spawn_actor(SimpleActor::new(Vec3::zeros()));
        // Standing on the cargo bed, whose top is at y = 1.5
        let cargo = world.spawn_actor(SimpleActor::new(Vec3::new(0.0, 1.5, -1.0)));
        let mut vehicle = spawn(Side::Authority, &MemoryBlob::new());
        let mut events = EventQueue::new();
        let mut rng = StdRng::seed_from_u64(3);

        let point = Vec3::new(0.0, 1.5, -1.5);
        assert!(vehicle.object_mut().mount(world.actor_mut(passenger).unwrap(), Some(point), &mut events));

        let carried = vehicle.tick(Vec3::new(0.0, 0.0, 0.25), Quat::identity(), &mut world, &mut rng, &mut events);
        assert_eq!(carried.len(), 1);
        assert_eq!(carried[0].actor, cargo);
        assert_relative_eq!(world.simple_actor(cargo).unwrap().position, Vec3::new(0.0, 1.5, -0.75), epsilon = 1e-9);

        let rider = world.simple_actor(passenger).unwrap();
        assert_relative_eq!(rider.position, Vec3::new(0.0, 1.5, -1.25), epsilon = 1e-9);
        assert_relative_eq!(rider.velocity, Vec3::new(0.0, 0.0, 0.25), epsilon = 1e-9);
        assert_relative_eq!(vehicle.mass(), 1300.0);
    }

    #[test]
    fn test_held_wheel_goes_flat_once() {
        let mut world = road();
        let mut vehicle = spawn(Side::Authority, &MemoryBlob::new());
        let mut events = EventQueue::new();
        let mut rng = StepRng::new(0, 0);

        vehicle
            .part_mut(2)
            .and_then(Part::as_ground_device_mut)
            .unwrap()
            .skip_angular_calcs = true;
        for tick in 1..=20 {
            let position = Vec3::new(0.0, 0.0, 0.5 * f64::from(tick));
            vehicle.tick(position, Quat::identity(), &mut world, &mut rng, &mut events);
            let wheel = vehicle.part(2).and_then(Part::as_ground_device).unwrap();
            assert!(wheel.is_flat());
            assert_relative_eq!(wheel.height(), 0.6);
        }

        let flat_events = events
            .events()
            .iter()
            .filter(|event| matches!(event, SyncEvent::FlatStateChanged { part: 2, flat: true, .. }))
            .count();
        assert_eq!(flat_events, 1);
        assert!(!vehicle.part(0).and_then(Part::as_ground_device).unwrap().is_flat());
    }

    #[test]
    fn test_replica_mirrors_authority() {
        let mut world = road();
        let driver = world.spawn_actor(SimpleActor::new(Vec3::zeros()));
        let mut authority = spawn(Side::Authority, &MemoryBlob::new());
        let mut replica = spawn(Side::Replica, &MemoryBlob::new());
        let mut events = EventQueue::new();
        let mut rng = StdRng::seed_from_u64(9);

        let result = authority.interact_seat(4, world.actor_mut(driver).unwrap(), &mut events);
        assert_eq!(result, Some(SeatInteraction::Mounted));
        assert_relative_eq!(authority.attack(&Damage::new(250.0), &mut events), 200.0);
        authority.attack_part(1, &Damage::new(1.0).explosion(), &mut world, &mut rng, &mut events);

        for event in events.drain() {
            assert!(replica.apply_sync_event(&event, &mut world));
        }
        assert_eq!(replica.controller(), Some(driver));
        assert_relative_eq!(replica.variable(None, DAMAGE_VARIABLE, 0.0), 200.0);
        assert!(replica.part(1).and_then(Part::as_ground_device).unwrap().is_flat());

        // Ticking the replica never produces events of its own
        let mut replica_events = EventQueue::new();
        replica.tick(Vec3::new(0.0, 0.0, 0.5), Quat::identity(), &mut world, &mut rng, &mut replica_events);
        assert!(replica_events.is_empty());
        assert_relative_eq!(world.simple_actor(driver).unwrap().position, Vec3::new(-0.5, 1.5, 1.5), epsilon = 1e-9);
    }

    #[test]
    fn test_state_survives_ron_round_trip() {
        let mut world = road();
        let passenger = world.spawn_actor(SimpleActor::new(Vec3::zeros()));
        let mut vehicle = spawn(Side::Authority, &MemoryBlob::new());
        let mut events = EventQueue::new();
        let mut rng = StdRng::seed_from_u64(5);

        assert!(!vehicle.object_mut().mount(world.actor_mut(passenger).unwrap(), None, &mut events));
        assert!(vehicle
            .object_mut()
            .mount(world.actor_mut(passenger).unwrap(), Some(Vec3::new(0.0, 1.5, -1.5)), &mut events));
        vehicle.attack(&Damage::new(40.0), &mut events);
        vehicle.attack_part(3, &Damage::new(1.0).explosion(), &mut world, &mut rng, &mut events);
        vehicle.object_mut().locked = true;

        let mut blob = MemoryBlob::new();
        vehicle.save(&mut blob);
        let text = blob.to_ron().unwrap();
        let restored = spawn(Side::Authority, &MemoryBlob::from_ron(&text).unwrap());

        assert!(!restored.object().is_newly_created());
        assert!(restored.object().locked);
        assert_relative_eq!(restored.object().damage().amount(), 40.0);
        assert_eq!(restored.object().attachments().saved_points(), &[Vec3::new(0.0, 1.5, -1.5)]);
        assert!(restored.part(3).and_then(Part::as_ground_device).unwrap().is_flat());
        assert!(!restored.part(0).and_then(Part::as_ground_device).unwrap().is_flat());
    }

    #[test]
    fn test_hot_reload_rebuilds_on_the_following_tick() {
        let mut world = road();
        let mut vehicle = spawn(Side::Authority, &MemoryBlob::new());
        let mut events = EventQueue::new();
        let mut rng = StdRng::seed_from_u64(2);

        let mut grown = truck();
        grown
            .collision_groups
            .push(CollisionGroupDefinition::with_boxes(vec![BoxDefinition::new(Vec3::new(0.0, 3.0, 0.0), 0.5, 0.5, 0.5)]));
        vehicle.object_mut().hot_reload(Arc::new(grown));

        vehicle.tick(Vec3::new(0.0, 0.0, 0.1), Quat::identity(), &mut world, &mut rng, &mut events);
        assert!(vehicle.object().collisions().needs_reset());

        vehicle.tick(Vec3::new(0.0, 0.0, 0.2), Quat::identity(), &mut world, &mut rng, &mut events);
        assert!(!vehicle.object().collisions().needs_reset());
        assert_eq!(vehicle.object().collisions().entity_keys().len(), 3);
    }
}
