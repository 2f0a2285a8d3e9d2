//! # Object Definitions
//!
//! Immutable, already-parsed descriptions of simulated objects. A definition
//! is loaded once (from RON in practice) and shared between every instance
//! through an `Arc`. Nothing here is mutated at runtime; hot reload swaps the
//! whole `Arc`.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

pub mod animation;
pub mod parts;

pub use animation::{AnimationStep, VariableModifierDefinition};
pub use parts::{
    EngineDefinition, GroundDeviceDefinition, PartDefinition, PartPlacement, PropellerDefinition,
    SeatDefinition,
};

/// Definition loading errors
#[derive(thiserror::Error, Debug)]
pub enum DefinitionError {
    /// Malformed document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Well-formed but inconsistent document
    #[error("Invalid definition: {0}")]
    Invalid(String),
}

/// One collision box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxDefinition {
    /// Center in object space
    pub center: Vec3,
    /// Half-extent along X
    pub width: f64,
    /// Half-extent along Y
    pub height: f64,
    /// Half-extent along Z
    pub depth: f64,
    /// Interior boxes never collide with blocks
    #[serde(default)]
    pub is_interior: bool,
    /// Only hit by projectiles
    #[serde(default)]
    pub is_for_bullets: bool,
    /// Ignored when resolving ground contact
    #[serde(default)]
    pub ground_excluded: bool,
}

impl BoxDefinition {
    /// Axis-aligned box at `center` with the given half-extents
    pub fn new(center: Vec3, width: f64, height: f64, depth: f64) -> Self {
        Self {
            center,
            width,
            height,
            depth,
            is_interior: false,
            is_for_bullets: false,
            ground_excluded: false,
        }
    }

    /// Half-extents as a vector
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }
}

/// Boxes sharing one animation and damage threshold
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionGroupDefinition {
    /// Boxes in this group
    pub collisions: Vec<BoxDefinition>,
    /// Steps positioning the group
    pub animations: Vec<AnimationStep>,
    /// Steps run ahead of `animations`
    pub apply_after: Vec<AnimationStep>,
    /// Group damage at which the group is destroyed, zero for indestructible
    pub health: f64,
    /// Applies `is_interior` to every box
    pub is_interior: bool,
    /// Applies `is_for_bullets` to every box
    pub is_for_bullets: bool,
}

impl CollisionGroupDefinition {
    /// Group with the given boxes and no animation
    pub fn with_boxes(collisions: Vec<BoxDefinition>) -> Self {
        Self {
            collisions,
            ..Self::default()
        }
    }

    /// Whether the group needs a switchbox
    pub fn is_animated(&self) -> bool {
        !self.animations.is_empty() || !self.apply_after.is_empty()
    }
}

/// Instrument slot on an object panel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentSlotDefinition {
    /// Slot position in object space
    pub position: Vec3,
    /// Slot rotation, pitch/yaw/roll in degrees
    pub rotation: Vec3,
    /// Instrument created with the object, as `packId:systemName`
    pub default_instrument: Option<String>,
    /// Steps positioning the slot
    pub animations: Vec<AnimationStep>,
    /// Steps run ahead of `animations`
    pub apply_after: Vec<AnimationStep>,
}

/// Complete object description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDefinition {
    /// Pack-qualified name
    pub name: String,
    /// Damage at which the object is destroyed
    #[serde(default)]
    pub health: f64,
    /// Empty mass
    #[serde(default)]
    pub mass: f64,
    /// Collision groups in declared order
    #[serde(default)]
    pub collision_groups: Vec<CollisionGroupDefinition>,
    /// Object-relative points where actors can be attached
    #[serde(default)]
    pub attachment_points: Vec<Vec3>,
    /// Instrument slots
    #[serde(default)]
    pub instruments: Vec<InstrumentSlotDefinition>,
    /// Engines, referenced by index from propellers
    #[serde(default)]
    pub engines: Vec<EngineDefinition>,
    /// Mounted parts
    #[serde(default)]
    pub parts: Vec<PartPlacement>,
}

impl ObjectDefinition {
    /// Empty definition with only a name and health
    pub fn new(name: impl Into<String>, health: f64) -> Self {
        Self {
            name: name.into(),
            health,
            mass: 0.0,
            collision_groups: Vec::new(),
            attachment_points: Vec::new(),
            instruments: Vec::new(),
            engines: Vec::new(),
            parts: Vec::new(),
        }
    }

    /// Parse and validate a RON document
    pub fn from_ron_str(text: &str) -> Result<Self, DefinitionError> {
        let definition: Self =
            ron::from_str(text).map_err(|e| DefinitionError::Parse(e.to_string()))?;
        definition.validate()?;
        Ok(definition)
    }

    /// Check cross references and value ranges
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.health < 0.0 {
            return Err(DefinitionError::Invalid(format!(
                "{}: health must not be negative",
                self.name
            )));
        }
        for (group_index, group) in self.collision_groups.iter().enumerate() {
            for b in &group.collisions {
                if b.width < 0.0 || b.height < 0.0 || b.depth < 0.0 {
                    return Err(DefinitionError::Invalid(format!(
                        "{}: collision group {} has a box with negative extents",
                        self.name,
                        group_index + 1
                    )));
                }
            }
        }
        for (index, placement) in self.parts.iter().enumerate() {
            match &placement.part {
                PartDefinition::GroundDevice(ground) => {
                    if ground.height <= 0.0 {
                        return Err(DefinitionError::Invalid(format!(
                            "{}: ground device {} needs a positive height",
                            self.name, index
                        )));
                    }
                }
                PartDefinition::Propeller(propeller) => {
                    if propeller.diameter <= 0.0 {
                        return Err(DefinitionError::Invalid(format!(
                            "{}: propeller {} needs a positive diameter",
                            self.name, index
                        )));
                    }
                    if let Some(engine) = propeller.engine {
                        if engine >= self.engines.len() {
                            return Err(DefinitionError::Invalid(format!(
                                "{}: propeller {} references missing engine {}",
                                self.name, index, engine
                            )));
                        }
                    }
                }
                PartDefinition::Seat(_) => {}
            }
        }
        Ok(())
    }
}
