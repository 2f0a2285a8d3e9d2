//! Variable modifiers
//!
//! Parts expose tunable properties (friction, for example) that pack authors
//! adjust from variables. A modifier sets or offsets the base value, runs an
//! optional scalar switchbox, then clamps.

use super::switchbox::{Switchbox, SwitchboxRequest};
use crate::definition::VariableModifierDefinition;
use crate::variables::{VariableSource, VariableStore};

/// Apply one modifier to `current`.
///
/// An inactive switchbox leaves `current` untouched, skipping the clamp too.
pub fn adjust_variable(modifier: &VariableModifierDefinition, current: f64, source: &dyn VariableSource) -> f64 {
    let mut value = if modifier.set_value != 0.0 {
        modifier.set_value
    } else {
        current + modifier.add_value
    };

    if let Some(switchbox) = Switchbox::new(&modifier.animations, &[]) {
        match switchbox.run_scalar(source, SwitchboxRequest::FULL, value) {
            Some(modified) => value = modified,
            None => return current,
        }
    }

    if modifier.min_value != 0.0 || modifier.max_value != 0.0 {
        value = value.max(modifier.min_value).min(modifier.max_value);
    }
    value
}

/// Apply modifiers that target plain object variables.
///
/// `is_property` names the modifiers the caller handles itself; those are
/// skipped here.
pub fn apply_to_store<F>(modifiers: &[VariableModifierDefinition], store: &mut VariableStore, is_property: F)
where
    F: Fn(&str) -> bool,
{
    for modifier in modifiers {
        if is_property(&modifier.variable) {
            continue;
        }
        let current = store.get(&modifier.variable);
        let adjusted = adjust_variable(modifier, current, &*store);
        store.set(modifier.variable.clone(), adjusted);
    }
}
