//! Part definitions and placements

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::VariableModifierDefinition;
use crate::foundation::math::Vec3;

/// Wheel, tread, skid or pontoon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundDeviceDefinition {
    /// Rolls and can be driven
    #[serde(default)]
    pub is_wheel: bool,
    /// Continuous track
    #[serde(default)]
    pub is_tread: bool,
    /// Full width
    pub width: f64,
    /// Full height (diameter for wheels)
    pub height: f64,
    /// Height once flat, zero when the part cannot go flat
    #[serde(default)]
    pub flat_height: f64,
    /// Friction along the direction of travel
    pub motive_friction: f64,
    /// Friction across the direction of travel
    pub lateral_friction: f64,
    /// Offset of the second contact box for long parts
    #[serde(default)]
    pub extra_collision_box_offset: f64,
    /// Per-material friction reductions, keyed by material name
    #[serde(default)]
    pub friction_modifiers: HashMap<String, f64>,
    /// Damage the part takes before breaking
    #[serde(default)]
    pub health: f64,
    /// Property and variable modifiers
    #[serde(default)]
    pub variable_modifiers: Vec<VariableModifierDefinition>,
}

/// Propeller or rotor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropellerDefinition {
    /// Collective-pitch rotor pointing up
    #[serde(default)]
    pub is_rotor: bool,
    /// Pitch follows engine speed
    #[serde(default)]
    pub is_dynamic_pitch: bool,
    /// Pitch in inches, also the maximum dynamic pitch
    pub pitch: i32,
    /// Diameter in inches
    pub diameter: f64,
    /// Damage the part takes before it is destroyed
    #[serde(default)]
    pub health: f64,
    /// Index of the driving engine in the object's engine list
    #[serde(default)]
    pub engine: Option<usize>,
}

/// Seat for a single occupant
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatDefinition {
    /// Where the rider is put on dismount, relative to the seat
    pub dismount_position: Option<Vec3>,
    /// The occupant drives the object
    pub is_controller: bool,
    /// Variables closed on mount and opened on dismount (doors)
    pub interactable_variables: Vec<Vec<String>>,
}

/// Engine driving one or more propellers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineDefinition {
    /// Idle speed
    pub idle_rpm: f64,
    /// Highest sustained speed
    pub max_safe_rpm: f64,
    /// Engine revolutions per propeller revolution, zero when disengaged
    #[serde(default = "default_gearbox_ratio")]
    pub propeller_gearbox_ratio: f64,
    /// RPM change per tick while spooling
    #[serde(default = "default_spool_rate")]
    pub spool_rate: f64,
}

fn default_gearbox_ratio() -> f64 {
    1.0
}

fn default_spool_rate() -> f64 {
    50.0
}

/// Part behaviour selected by a placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PartDefinition {
    /// Ground contact part
    GroundDevice(GroundDeviceDefinition),
    /// Thrust part
    Propeller(PropellerDefinition),
    /// Occupant seat
    Seat(SeatDefinition),
}

/// A part mounted on an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartPlacement {
    /// Offset from the object origin
    pub position: Vec3,
    /// Pitch, yaw, roll in degrees
    #[serde(default)]
    pub rotation: Vec3,
    /// Overrides the part's own long-part offset when non-zero
    #[serde(default)]
    pub extra_collision_box_offset: f64,
    /// Kind-specific data
    pub part: PartDefinition,
}
