//! Built-in demo vehicle
//!
//! A small airboat: four wheels, a driver seat, a rear passenger point
//! and one engine turning a pusher propeller.

use std::collections::HashMap;

use vehicle_core::definition::{
    BoxDefinition, CollisionGroupDefinition, EngineDefinition, GroundDeviceDefinition, ObjectDefinition,
    PartDefinition, PartPlacement, PropellerDefinition, SeatDefinition,
};
use vehicle_core::foundation::math::Vec3;

fn wheel(x: f64, z: f64) -> PartPlacement {
    let mut friction_modifiers = HashMap::new();
    friction_modifiers.insert("ice".to_string(), -0.2);
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
            friction_modifiers,
            health: 25.0,
            variable_modifiers: Vec::new(),
        }),
    }
}

/// The demo definition
pub fn airboat() -> ObjectDefinition {
    let mut definition = ObjectDefinition::new("sandbox:airboat", 150.0);
    definition.mass = 900.0;

    let hull = BoxDefinition::new(Vec3::new(0.0, 1.0, 0.0), 1.0, 0.5, 2.0);
    let cockpit = CollisionGroupDefinition {
        is_interior: true,
        ..CollisionGroupDefinition::with_boxes(vec![BoxDefinition::new(Vec3::new(0.0, 1.75, 0.5), 0.75, 0.25, 0.75)])
    };
    definition.collision_groups = vec![CollisionGroupDefinition::with_boxes(vec![hull]), cockpit];
    definition.attachment_points = vec![Vec3::new(0.0, 1.5, -1.0)];
    definition.engines.push(EngineDefinition {
        idle_rpm: 800.0,
        max_safe_rpm: 3500.0,
        propeller_gearbox_ratio: 1.0,
        spool_rate: 200.0,
    });

    definition.parts = vec![
        wheel(-1.0, 1.5),
        wheel(1.0, 1.5),
        wheel(-1.0, -1.5),
        wheel(1.0, -1.5),
        PartPlacement {
            position: Vec3::new(0.0, 1.5, 0.5),
            rotation: Vec3::zeros(),
            extra_collision_box_offset: 0.0,
            part: PartDefinition::Seat(SeatDefinition {
                dismount_position: Some(Vec3::new(-1.5, 0.0, 0.5)),
                is_controller: true,
                interactable_variables: Vec::new(),
            }),
        },
        PartPlacement {
            position: Vec3::new(0.0, 2.0, -2.25),
            rotation: Vec3::zeros(),
            extra_collision_box_offset: 0.0,
            part: PartDefinition::Propeller(PropellerDefinition {
                is_rotor: false,
                is_dynamic_pitch: false,
                pitch: 60,
                diameter: 60.0,
                health: 100.0,
                engine: Some(0),
            }),
        },
    ];
    definition
}
