//! Damage events and the per-object damage accumulator

use crate::foundation::ids::{ActorId, ObjectId};
use crate::physics::bounding_box::BoundingVolume;

/// What caused a damage event, used for death messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DamageCause {
    /// Unspecified
    #[default]
    Generic,
    /// Run over by a wheel
    Wheel,
    /// Struck by a propeller
    Propeller,
}

/// A single application of damage
#[derive(Debug, Clone, PartialEq)]
pub struct Damage {
    /// Amount of damage
    pub amount: f64,
    /// Area affected, for area attacks against actors
    pub bounds: Option<BoundingVolume>,
    /// Object dealing the damage
    pub source: Option<ObjectId>,
    /// Actor responsible (driver, attacking player)
    pub attacker: Option<ActorId>,
    /// The attacker had nothing in hand
    pub attacker_empty_handed: bool,
    /// Water damage, ignored by objects
    pub is_water: bool,
    /// Explosion damage
    pub is_explosion: bool,
    /// Cause
    pub cause: DamageCause,
}

impl Damage {
    /// Plain damage of `amount`
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            bounds: None,
            source: None,
            attacker: None,
            attacker_empty_handed: false,
            is_water: false,
            is_explosion: false,
            cause: DamageCause::Generic,
        }
    }

    /// Area damage dealt by an object
    pub fn area(amount: f64, bounds: BoundingVolume, source: ObjectId, cause: DamageCause) -> Self {
        Self {
            bounds: Some(bounds),
            source: Some(source),
            cause,
            ..Self::new(amount)
        }
    }

    /// Set the responsible actor
    pub fn with_attacker(mut self, attacker: Option<ActorId>) -> Self {
        self.attacker = attacker;
        self
    }

    /// Mark as an empty-handed hit by the attacker
    pub fn empty_handed(mut self) -> Self {
        self.attacker_empty_handed = true;
        self
    }

    /// Mark as explosion damage
    pub fn explosion(mut self) -> Self {
        self.is_explosion = true;
        self
    }

    /// Mark as water damage
    pub fn water(mut self) -> Self {
        self.is_water = true;
        self
    }
}

/// Monotonic damage counter capped at a maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageAccumulator {
    amount: f64,
    max: f64,
}

impl DamageAccumulator {
    /// Counter starting at `amount`, capped at `max`
    pub fn new(amount: f64, max: f64) -> Self {
        Self {
            amount: amount.min(max),
            max,
        }
    }

    /// Add damage and return the portion that fit under the cap.
    ///
    /// Anything beyond the cap is dropped.
    pub fn apply(&mut self, amount: f64) -> f64 {
        self.amount += amount;
        if self.amount > self.max {
            let absorbed = amount - (self.amount - self.max);
            self.amount = self.max;
            absorbed
        } else {
            amount
        }
    }

    /// Accumulated damage
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Cap
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Overwrite the accumulated amount, used when syncing from variables
    pub fn set_amount(&mut self, amount: f64) {
        self.amount = amount.min(self.max);
    }

    /// Reached the cap
    pub fn is_destroyed(&self) -> bool {
        self.max > 0.0 && self.amount >= self.max
    }

    /// Accumulated damage as a fraction of the cap
    pub fn percent(&self) -> f64 {
        if self.max > 0.0 {
            self.amount / self.max
        } else {
            0.0
        }
    }
}
