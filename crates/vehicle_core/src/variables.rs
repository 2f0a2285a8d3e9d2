//! Named scalar variables
//!
//! Every animated or simulated object exposes its state as a flat map of
//! `f64` variables. Switchboxes read them, parts write them, and the sync
//! layer increments them on replicas.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read access to an object's variables.
pub trait VariableSource {
    /// Current value of a variable, 0.0 when unset
    fn variable(&self, name: &str) -> f64;

    /// Value interpolated between the previous and current tick.
    ///
    /// Sources without per-tick history return the current value.
    fn interpolated_variable(&self, name: &str, _partial_ticks: f64) -> f64 {
        self.variable(name)
    }
}

/// Flat store of named variables owned by one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableStore {
    values: HashMap<String, f64>,
}

impl VariableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a variable, 0.0 when unset
    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    /// Whether a variable has ever been set
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set a variable
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Add to a variable and return the new value
    pub fn increment(&mut self, name: &str, amount: f64) -> f64 {
        let value = self.values.entry(name.to_string()).or_insert(0.0);
        *value += amount;
        *value
    }

    /// Flip a variable between 0 and 1 and return the new value
    pub fn toggle(&mut self, name: &str) -> f64 {
        let next = if self.get(name) == 0.0 { 1.0 } else { 0.0 };
        self.set(name, next);
        next
    }

    /// Remove a variable
    pub fn remove(&mut self, name: &str) -> Option<f64> {
        self.values.remove(name)
    }

    /// Iterate over all set variables
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of set variables
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no variable has been set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl VariableSource for VariableStore {
    fn variable(&self, name: &str) -> f64 {
        self.get(name)
    }
}
