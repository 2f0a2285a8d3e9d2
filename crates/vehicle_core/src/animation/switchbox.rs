//! # Animation Switchbox
//!
//! A tiny interpreter over [`AnimationStep`] lists. The same program is used
//! three ways: to place collision groups, to place instrument slots and, in
//! scalar mode, to modify a single number for variable modifiers.
//!
//! Evaluation never writes to the owner. `Set` steps shadow a variable in a
//! scope that lives only as long as one run.

use crate::definition::AnimationStep;
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::variables::VariableSource;

/// Parameters of one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwitchboxRequest {
    /// Interpolation factor between the previous and current tick
    pub partial_ticks: f64,
    /// `false` for a positioning-only pass, which skips `Set` steps
    pub full_run: bool,
}

impl SwitchboxRequest {
    /// Positioning pass at the current tick
    pub const POSITIONING: Self = Self {
        partial_ticks: 0.0,
        full_run: false,
    };

    /// Full run at the current tick
    pub const FULL: Self = Self {
        partial_ticks: 0.0,
        full_run: true,
    };

    /// Positioning pass at an interpolated time, used by renderers
    pub fn interpolated(partial_ticks: f64) -> Self {
        Self {
            partial_ticks,
            full_run: false,
        }
    }
}

/// Result of a transform run
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchboxOutcome {
    /// Accumulated transform, identity when no step ran
    pub net: Mat4,
    /// False when a visibility test failed or an inhibitor fired
    pub active: bool,
}

/// Variable lookup for a single run, with `Set` overlays on top of the owner.
struct RunScope<'a> {
    source: &'a dyn VariableSource,
    partial_ticks: f64,
    overlay: Vec<(&'a str, f64)>,
}

impl<'a> RunScope<'a> {
    fn new(source: &'a dyn VariableSource, request: SwitchboxRequest) -> Self {
        Self {
            source,
            partial_ticks: request.partial_ticks,
            overlay: Vec::new(),
        }
    }

    fn read(&self, name: &str) -> f64 {
        self.overlay
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map_or_else(
                || self.source.interpolated_variable(name, self.partial_ticks),
                |(_, v)| *v,
            )
    }

    fn shadow(&mut self, name: &'a str, value: f64) {
        self.overlay.push((name, value));
    }
}

fn clamp_if_bounded(value: f64, clamp_min: f64, clamp_max: f64) -> f64 {
    if clamp_min != 0.0 || clamp_max != 0.0 {
        value.max(clamp_min).min(clamp_max)
    } else {
        value
    }
}

fn scaled_value(raw: f64, scale: f64, offset: f64, clamp_min: f64, clamp_max: f64, absolute: bool) -> f64 {
    let mut value = raw * scale + offset;
    if absolute {
        value = value.abs();
    }
    clamp_if_bounded(value, clamp_min, clamp_max)
}

fn in_range(value: f64, clamp_min: f64, clamp_max: f64) -> bool {
    value >= clamp_min && value <= clamp_max
}

/// Compiled step list. `apply_after` steps run before the main list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Switchbox {
    steps: Vec<AnimationStep>,
}

impl Switchbox {
    /// Build from a definition's step lists, `None` when both are empty
    pub fn new(animations: &[AnimationStep], apply_after: &[AnimationStep]) -> Option<Self> {
        if animations.is_empty() && apply_after.is_empty() {
            return None;
        }
        let steps = apply_after.iter().chain(animations).cloned().collect();
        Some(Self { steps })
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    /// Evaluate the program into a transform.
    pub fn run(&self, source: &dyn VariableSource, request: SwitchboxRequest) -> SwitchboxOutcome {
        let mut scope = RunScope::new(source, request);
        let mut net = Mat4::identity();

        for step in &self.steps {
            match step {
                AnimationStep::Translation {
                    variable,
                    axis,
                    offset,
                    clamp_min,
                    clamp_max,
                    absolute,
                } => {
                    let magnitude = axis.norm();
                    if magnitude == 0.0 {
                        continue;
                    }
                    let value = scaled_value(scope.read(variable), magnitude, *offset, *clamp_min, *clamp_max, *absolute);
                    let direction: Vec3 = axis / magnitude;
                    net *= Mat4::new_translation(&(direction * value));
                }
                AnimationStep::Rotation {
                    variable,
                    axis,
                    center,
                    offset,
                    clamp_min,
                    clamp_max,
                    absolute,
                } => {
                    let magnitude = axis.norm();
                    if magnitude == 0.0 {
                        continue;
                    }
                    let degrees = scaled_value(scope.read(variable), magnitude, *offset, *clamp_min, *clamp_max, *absolute);
                    net *= utils::rotation_about(axis, degrees, center);
                }
                AnimationStep::Visibility {
                    variable,
                    offset,
                    clamp_min,
                    clamp_max,
                } => {
                    if !in_range(scope.read(variable) + offset, *clamp_min, *clamp_max) {
                        return SwitchboxOutcome { net, active: false };
                    }
                }
                AnimationStep::Inhibitor {
                    variable,
                    offset,
                    clamp_min,
                    clamp_max,
                } => {
                    if in_range(scope.read(variable) + offset, *clamp_min, *clamp_max) {
                        return SwitchboxOutcome { net, active: false };
                    }
                }
                AnimationStep::Set { variable, value } => {
                    if request.full_run {
                        scope.shadow(variable, *value);
                    }
                }
            }
        }

        SwitchboxOutcome { net, active: true }
    }

    /// Evaluate the program as a scalar modifier of `initial`.
    ///
    /// Translation steps pick their operation from the first non-zero axis
    /// component: X multiplies, Y adds, Z replaces. Rotation steps are
    /// ignored. Returns `None` when the run is inactive.
    pub fn run_scalar(&self, source: &dyn VariableSource, request: SwitchboxRequest, initial: f64) -> Option<f64> {
        let mut scope = RunScope::new(source, request);
        let mut value = initial;

        for step in &self.steps {
            match step {
                AnimationStep::Translation {
                    variable,
                    axis,
                    offset,
                    clamp_min,
                    clamp_max,
                    absolute,
                } => {
                    let raw = scope.read(variable);
                    if axis.x != 0.0 {
                        value *= scaled_value(raw, axis.x, *offset, *clamp_min, *clamp_max, *absolute);
                    } else if axis.y != 0.0 {
                        value += scaled_value(raw, axis.y, *offset, *clamp_min, *clamp_max, *absolute);
                    } else {
                        value = scaled_value(raw, axis.z, *offset, *clamp_min, *clamp_max, *absolute);
                    }
                }
                AnimationStep::Rotation { .. } => {}
                AnimationStep::Visibility {
                    variable,
                    offset,
                    clamp_min,
                    clamp_max,
                } => {
                    if !in_range(scope.read(variable) + offset, *clamp_min, *clamp_max) {
                        return None;
                    }
                }
                AnimationStep::Inhibitor {
                    variable,
                    offset,
                    clamp_min,
                    clamp_max,
                } => {
                    if in_range(scope.read(variable) + offset, *clamp_min, *clamp_max) {
                        return None;
                    }
                }
                AnimationStep::Set { variable, value: set } => {
                    if request.full_run {
                        scope.shadow(variable, *set);
                    }
                }
            }
        }

        Some(value)
    }
}
