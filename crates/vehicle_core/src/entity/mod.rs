//! Interactable objects and their supporting state

pub mod damage;
pub mod instruments;
pub mod interactable;
pub mod ownership;

pub use damage::{Damage, DamageAccumulator, DamageCause};
pub use instruments::{InstrumentError, InstrumentId, InstrumentSlots, ItemRegistry};
pub use interactable::{InteractableObject, ObjectVariables, DAMAGE_VARIABLE};
pub use ownership::OwnerState;
