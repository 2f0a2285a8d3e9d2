//! Identifiers shared across the crate

use serde::{Deserialize, Serialize};
use std::fmt;

slotmap::new_key_type! {
    /// Runtime handle of an external actor (player, mob, item entity).
    pub struct ActorId;
}

/// Identifier of a simulated object (vehicle, part, placed object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Create an object identifier from a raw value
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Persistent identity of a player, stable across world reloads.
///
/// Stored as 32 hex digits, the same text a UUID prints without dashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u128);

impl PlayerId {
    /// Parse 32 hex digits; dashes are ignored
    pub fn parse(text: &str) -> Option<Self> {
        let digits: String = text.chars().filter(|c| *c != '-').collect();
        if digits.len() != 32 {
            return None;
        }
        u128::from_str_radix(&digits, 16).ok().map(Self)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Block material name as reported by the world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub String);

impl MaterialId {
    /// Create a material identifier
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Material name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which logical side this copy of the simulation runs on.
///
/// Only the authority decides attachment changes, damage and flat-state
/// transitions; replicas apply what the authority broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Sole source of truth
    #[default]
    Authority,
    /// Mirrors authority state from broadcast events
    Replica,
}

impl Side {
    /// True on the authoritative side
    pub const fn is_authority(self) -> bool {
        matches!(self, Self::Authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_text_roundtrip() {
        let id = PlayerId(0x0123_4567_89ab_cdef_0011_2233_4455_6677);
        let text = id.to_string();
        assert_eq!(text.len(), 32);
        assert_eq!(PlayerId::parse(&text), Some(id));
        assert_eq!(PlayerId::parse("01234567-89ab-cdef-0011-223344556677"), Some(id));
        assert_eq!(PlayerId::parse("xyz"), None);
    }
}
