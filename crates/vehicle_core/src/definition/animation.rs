//! Declarative animation steps

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// One instruction of a switchbox program.
///
/// Clamp bounds of `0.0, 0.0` mean "no clamp" for translation and rotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnimationStep {
    /// Move along `axis` by `variable * |axis| + offset`
    Translation {
        /// Driving variable
        variable: String,
        /// Direction, its length scales the variable
        axis: Vec3,
        /// Added after scaling
        #[serde(default)]
        offset: f64,
        /// Lower clamp
        #[serde(default)]
        clamp_min: f64,
        /// Upper clamp
        #[serde(default)]
        clamp_max: f64,
        /// Use the absolute value
        #[serde(default)]
        absolute: bool,
    },
    /// Rotate about `axis` through `center` by `variable * |axis| + offset` degrees
    Rotation {
        /// Driving variable
        variable: String,
        /// Rotation axis, its length scales the variable
        axis: Vec3,
        /// Pivot in object space
        #[serde(default)]
        center: Vec3,
        /// Added after scaling
        #[serde(default)]
        offset: f64,
        /// Lower clamp
        #[serde(default)]
        clamp_min: f64,
        /// Upper clamp
        #[serde(default)]
        clamp_max: f64,
        /// Use the absolute value
        #[serde(default)]
        absolute: bool,
    },
    /// Visible only while `variable + offset` is within the clamp range
    Visibility {
        /// Tested variable
        variable: String,
        /// Added before testing
        #[serde(default)]
        offset: f64,
        /// Lower bound, inclusive
        #[serde(default)]
        clamp_min: f64,
        /// Upper bound, inclusive
        #[serde(default)]
        clamp_max: f64,
    },
    /// Disables the rest of the run while `variable + offset` is within the clamp range
    Inhibitor {
        /// Tested variable
        variable: String,
        /// Added before testing
        #[serde(default)]
        offset: f64,
        /// Lower bound, inclusive
        #[serde(default)]
        clamp_min: f64,
        /// Upper bound, inclusive
        #[serde(default)]
        clamp_max: f64,
    },
    /// Shadow a variable for the remaining steps of this run
    Set {
        /// Variable name
        variable: String,
        /// Value seen by later steps
        value: f64,
    },
}

impl AnimationStep {
    /// Variable this step reads or writes
    pub fn variable(&self) -> &str {
        match self {
            Self::Translation { variable, .. }
            | Self::Rotation { variable, .. }
            | Self::Visibility { variable, .. }
            | Self::Inhibitor { variable, .. }
            | Self::Set { variable, .. } => variable,
        }
    }
}

/// Adjusts a part property or object variable every tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableModifierDefinition {
    /// Target property or variable name
    pub variable: String,
    /// Replaces the current value when non-zero
    pub set_value: f64,
    /// Added to the current value when `set_value` is zero
    pub add_value: f64,
    /// Lower clamp, used when either bound is non-zero
    pub min_value: f64,
    /// Upper clamp, used when either bound is non-zero
    pub max_value: f64,
    /// Scalar switchbox applied after set/add
    pub animations: Vec<AnimationStep>,
}
