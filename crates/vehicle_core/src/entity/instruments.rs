//! Instrument slots
//!
//! Each slot of an object's instrument panel holds at most one instrument
//! item. New objects are fitted with their default instruments; reloaded
//! objects get back what was saved. References that cannot be resolved
//! leave the slot empty.

use std::collections::HashSet;
use std::fmt;

use crate::animation::{Switchbox, SwitchboxRequest};
use crate::definition::InstrumentSlotDefinition;
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::persistence::{BlobError, DataBlob};
use crate::variables::VariableSource;

/// Pack-qualified instrument item name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentId {
    /// Pack the item belongs to
    pub pack_id: String,
    /// Item name inside the pack
    pub system_name: String,
}

impl InstrumentId {
    /// Create from its two halves
    pub fn new(pack_id: impl Into<String>, system_name: impl Into<String>) -> Self {
        Self {
            pack_id: pack_id.into(),
            system_name: system_name.into(),
        }
    }

    /// Parse `packId:systemName`
    pub fn parse(text: &str) -> Option<Self> {
        let (pack_id, system_name) = text.split_once(':')?;
        Some(Self::new(pack_id, system_name))
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pack_id, self.system_name)
    }
}

/// Default instrument that could not be fitted.
///
/// The message is meant for the player who placed the object.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum InstrumentError {
    /// Reference is not `packId:systemName`
    #[error("Could not parse defaultInstrument definition: {0}.  Format should be \"packId:instrumentName\"")]
    Malformed(String),

    /// No such item
    #[error("Attempted to add defaultInstrument: {instrument} to: {object} but that instrument doesn't exist in the pack item registry.")]
    Unknown {
        /// Missing instrument
        instrument: InstrumentId,
        /// Object being created
        object: String,
    },
}

/// Registry of known items.
pub trait ItemRegistry {
    /// Whether an instrument item exists
    fn has_instrument(&self, id: &InstrumentId) -> bool;
}

impl ItemRegistry for HashSet<InstrumentId> {
    fn has_instrument(&self, id: &InstrumentId) -> bool {
        self.contains(id)
    }
}

fn pack_key(slot: usize) -> String {
    format!("instrument{slot}_packID")
}

fn name_key(slot: usize) -> String {
    format!("instrument{slot}_systemName")
}

/// Instruments fitted to an object, one entry per definition slot
#[derive(Debug, Clone)]
pub struct InstrumentSlots {
    slots: Vec<Option<InstrumentId>>,
    switchboxes: Vec<Option<Switchbox>>,
}

impl InstrumentSlots {
    fn empty(definitions: &[InstrumentSlotDefinition]) -> Self {
        Self {
            slots: vec![None; definitions.len()],
            switchboxes: definitions
                .iter()
                .map(|slot| Switchbox::new(&slot.animations, &slot.apply_after))
                .collect(),
        }
    }

    /// Fit the default instruments of a newly created object.
    ///
    /// Returns the slots plus one error per default that could not be fitted.
    pub fn with_defaults(
        definitions: &[InstrumentSlotDefinition],
        object_name: &str,
        registry: &dyn ItemRegistry,
    ) -> (Self, Vec<InstrumentError>) {
        let mut slots = Self::empty(definitions);
        let mut errors = Vec::new();
        for (index, definition) in definitions.iter().enumerate() {
            let Some(reference) = &definition.default_instrument else {
                continue;
            };
            match InstrumentId::parse(reference) {
                Some(id) if registry.has_instrument(&id) => slots.slots[index] = Some(id),
                Some(id) => errors.push(InstrumentError::Unknown {
                    instrument: id,
                    object: object_name.to_string(),
                }),
                None => errors.push(InstrumentError::Malformed(reference.clone())),
            }
        }
        (slots, errors)
    }

    /// Restore saved instruments, silently dropping ones no longer registered
    pub fn load(
        definitions: &[InstrumentSlotDefinition],
        blob: &dyn DataBlob,
        registry: &dyn ItemRegistry,
    ) -> Result<Self, BlobError> {
        let mut slots = Self::empty(definitions);
        for index in 0..definitions.len() {
            let pack_id = blob.get_string(&pack_key(index))?;
            if pack_id.is_empty() {
                continue;
            }
            let id = InstrumentId::new(pack_id, blob.get_string(&name_key(index))?);
            if registry.has_instrument(&id) {
                slots.slots[index] = Some(id);
            }
        }
        Ok(slots)
    }

    /// Write fitted instruments
    pub fn save(&self, blob: &mut dyn DataBlob) {
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(id) = slot {
                blob.set_string(&pack_key(index), &id.pack_id);
                blob.set_string(&name_key(index), &id.system_name);
            }
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when the object has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Instrument in `slot`
    pub fn get(&self, slot: usize) -> Option<&InstrumentId> {
        self.slots.get(slot)?.as_ref()
    }

    /// Fit an instrument, replacing the previous one. False for a bad slot.
    pub fn add(&mut self, slot: usize, id: InstrumentId) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = Some(id);
                true
            }
            None => false,
        }
    }

    /// Take the instrument out of `slot`
    pub fn remove(&mut self, slot: usize) -> Option<InstrumentId> {
        self.slots.get_mut(slot)?.take()
    }

    /// Object-space transform of a fitted slot, `None` when empty or hidden.
    ///
    /// Instrument faces point backwards at zero yaw, so the slot is turned
    /// half a revolution before its animations apply.
    pub fn slot_transform(
        &self,
        slot: usize,
        definitions: &[InstrumentSlotDefinition],
        source: &dyn VariableSource,
        partial_ticks: f64,
    ) -> Option<Mat4> {
        self.get(slot)?;
        let definition = definitions.get(slot)?;
        let rotation = utils::quat_from_euler_deg(
            definition.rotation.x,
            definition.rotation.y,
            definition.rotation.z,
        );
        let mut transform = Mat4::new_translation(&definition.position)
            * rotation.to_homogeneous()
            * utils::rotation_about(&Vec3::y(), 180.0, &Vec3::zeros());
        if let Some(switchbox) = self.switchboxes.get(slot).and_then(Option::as_ref) {
            let outcome = switchbox.run(source, SwitchboxRequest::interpolated(partial_ticks));
            if !outcome.active {
                return None;
            }
            transform *= outcome.net;
        }
        Some(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AnimationStep;
    use crate::persistence::MemoryBlob;
    use crate::variables::VariableStore;
    use approx::assert_relative_eq;

    fn registry() -> HashSet<InstrumentId> {
        [InstrumentId::new("mts", "speedometer")].into_iter().collect()
    }

    fn slot(default_instrument: Option<&str>) -> InstrumentSlotDefinition {
        InstrumentSlotDefinition {
            position: Vec3::new(0.0, 1.0, 0.5),
            default_instrument: default_instrument.map(str::to_string),
            ..InstrumentSlotDefinition::default()
        }
    }

    #[test]
    fn test_defaults_report_bad_references() {
        let definitions = vec![
            slot(Some("mts:speedometer")),
            slot(Some("mts:altimeter")),
            slot(Some("speedometer")),
            slot(None),
        ];
        let (slots, errors) = InstrumentSlots::with_defaults(&definitions, "mts:truck", &registry());

        assert_eq!(slots.len(), 4);
        assert_eq!(slots.get(0), Some(&InstrumentId::new("mts", "speedometer")));
        assert_eq!(slots.get(1), None);
        assert_eq!(slots.get(2), None);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "Attempted to add defaultInstrument: mts:altimeter to: mts:truck but that instrument doesn't exist in the pack item registry."
        );
        assert_eq!(
            errors[1].to_string(),
            "Could not parse defaultInstrument definition: speedometer.  Format should be \"packId:instrumentName\""
        );
    }

    #[test]
    fn test_save_and_load() {
        let definitions = vec![slot(None), slot(None)];
        let (mut slots, _) = InstrumentSlots::with_defaults(&definitions, "mts:truck", &registry());
        assert!(slots.add(1, InstrumentId::new("mts", "speedometer")));
        assert!(!slots.add(5, InstrumentId::new("mts", "speedometer")));

        let mut blob = MemoryBlob::new();
        slots.save(&mut blob);
        let loaded = InstrumentSlots::load(&definitions, &blob, &registry()).unwrap();
        assert_eq!(loaded.get(0), None);
        assert_eq!(loaded.get(1), Some(&InstrumentId::new("mts", "speedometer")));

        let empty_registry = HashSet::new();
        let pruned = InstrumentSlots::load(&definitions, &blob, &empty_registry).unwrap();
        assert_eq!(pruned.get(1), None);
    }

    #[test]
    fn test_slot_transform_visibility() {
        let mut definition = slot(Some("mts:speedometer"));
        definition.animations = vec![AnimationStep::Visibility {
            variable: "panel_lights".to_string(),
            offset: 0.0,
            clamp_min: 1.0,
            clamp_max: 1.0,
        }];
        let definitions = vec![definition];
        let (slots, _) = InstrumentSlots::with_defaults(&definitions, "mts:truck", &registry());

        let mut variables = VariableStore::new();
        assert!(slots.slot_transform(0, &definitions, &variables, 0.0).is_none());

        variables.set("panel_lights", 1.0);
        let transform = slots.slot_transform(0, &definitions, &variables, 0.0).unwrap();
        let face = utils::transform_point(&transform, &Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(face, Vec3::new(0.0, 1.0, -0.5), epsilon = 1e-9);
    }
}
