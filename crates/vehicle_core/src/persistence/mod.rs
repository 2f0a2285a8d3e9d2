//! Persistence boundary
//!
//! Objects read their saved state once at construction and write it back
//! on save. The blob's encoding belongs to the host; [`MemoryBlob`] is a
//! map that can be written out as RON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::foundation::ids::PlayerId;
use crate::foundation::math::Vec3;

/// Blob access errors
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BlobError {
    /// A field exists but holds a different type
    #[error("Field '{key}' holds {found}, expected {expected}")]
    TypeMismatch {
        /// Field name
        key: String,
        /// Requested type
        expected: &'static str,
        /// Stored type
        found: &'static str,
    },

    /// A field holds malformed text
    #[error("Field '{0}' is malformed")]
    Malformed(String),
}

/// Typed key/value storage. Missing fields read as defaults.
pub trait DataBlob {
    /// True when nothing was ever stored
    fn is_empty(&self) -> bool;

    /// Whether `key` is present
    fn has_key(&self, key: &str) -> bool;

    /// Boolean field, `false` when missing
    fn get_bool(&self, key: &str) -> Result<bool, BlobError>;

    /// Store a boolean
    fn set_bool(&mut self, key: &str, value: bool);

    /// Number field, 0.0 when missing
    fn get_double(&self, key: &str) -> Result<f64, BlobError>;

    /// Store a number
    fn set_double(&mut self, key: &str, value: f64);

    /// Text field, empty when missing
    fn get_string(&self, key: &str) -> Result<String, BlobError>;

    /// Store text
    fn set_string(&mut self, key: &str, value: &str);

    /// Player identity, `None` when missing
    fn get_player_id(&self, key: &str) -> Result<Option<PlayerId>, BlobError>;

    /// Store a player identity
    fn set_player_id(&mut self, key: &str, value: PlayerId);

    /// Point list, empty when missing
    fn get_points(&self, key: &str) -> Result<Vec<Vec3>, BlobError>;

    /// Store a point list
    fn set_points(&mut self, key: &str, points: &[Vec3]);

    /// Nested blob, empty when missing
    fn get_child(&self, key: &str) -> Result<MemoryBlob, BlobError>;

    /// Store a nested blob
    fn set_child(&mut self, key: &str, child: MemoryBlob);
}

/// Value stored in a [`MemoryBlob`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlobValue {
    /// Boolean
    Bool(bool),
    /// Number
    Double(f64),
    /// Text
    Text(String),
    /// Player identity as hex text
    Player(String),
    /// Point list
    Points(Vec<Vec3>),
    /// Nested blob
    Child(MemoryBlob),
}

impl BlobValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Double(_) => "double",
            Self::Text(_) => "string",
            Self::Player(_) => "player id",
            Self::Points(_) => "point list",
            Self::Child(_) => "child blob",
        }
    }
}

/// Ordered in-memory blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryBlob {
    fields: BTreeMap<String, BlobValue>,
}

impl MemoryBlob {
    /// Empty blob
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to RON text
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Parse RON text
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    fn mismatch(key: &str, expected: &'static str, found: &BlobValue) -> BlobError {
        BlobError::TypeMismatch {
            key: key.to_string(),
            expected,
            found: found.type_name(),
        }
    }
}

impl DataBlob for MemoryBlob {
    fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn has_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    fn get_bool(&self, key: &str) -> Result<bool, BlobError> {
        match self.fields.get(key) {
            None => Ok(false),
            Some(BlobValue::Bool(v)) => Ok(*v),
            Some(other) => Err(Self::mismatch(key, "bool", other)),
        }
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.fields.insert(key.to_string(), BlobValue::Bool(value));
    }

    fn get_double(&self, key: &str) -> Result<f64, BlobError> {
        match self.fields.get(key) {
            None => Ok(0.0),
            Some(BlobValue::Double(v)) => Ok(*v),
            Some(other) => Err(Self::mismatch(key, "double", other)),
        }
    }

    fn set_double(&mut self, key: &str, value: f64) {
        self.fields.insert(key.to_string(), BlobValue::Double(value));
    }

    fn get_string(&self, key: &str) -> Result<String, BlobError> {
        match self.fields.get(key) {
            None => Ok(String::new()),
            Some(BlobValue::Text(v)) => Ok(v.clone()),
            Some(other) => Err(Self::mismatch(key, "string", other)),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.fields.insert(key.to_string(), BlobValue::Text(value.to_string()));
    }

    fn get_player_id(&self, key: &str) -> Result<Option<PlayerId>, BlobError> {
        match self.fields.get(key) {
            None => Ok(None),
            Some(BlobValue::Player(text)) => PlayerId::parse(text)
                .map(Some)
                .ok_or_else(|| BlobError::Malformed(key.to_string())),
            Some(other) => Err(Self::mismatch(key, "player id", other)),
        }
    }

    fn set_player_id(&mut self, key: &str, value: PlayerId) {
        self.fields.insert(key.to_string(), BlobValue::Player(value.to_string()));
    }

    fn get_points(&self, key: &str) -> Result<Vec<Vec3>, BlobError> {
        match self.fields.get(key) {
            None => Ok(Vec::new()),
            Some(BlobValue::Points(v)) => Ok(v.clone()),
            Some(other) => Err(Self::mismatch(key, "point list", other)),
        }
    }

    fn set_points(&mut self, key: &str, points: &[Vec3]) {
        self.fields.insert(key.to_string(), BlobValue::Points(points.to_vec()));
    }

    fn get_child(&self, key: &str) -> Result<MemoryBlob, BlobError> {
        match self.fields.get(key) {
            None => Ok(MemoryBlob::new()),
            Some(BlobValue::Child(v)) => Ok(v.clone()),
            Some(other) => Err(Self::mismatch(key, "child blob", other)),
        }
    }

    fn set_child(&mut self, key: &str, child: MemoryBlob) {
        self.fields.insert(key.to_string(), BlobValue::Child(child));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_read_defaults() {
        let blob = MemoryBlob::new();
        assert!(blob.is_empty());
        assert_eq!(blob.get_bool("locked"), Ok(false));
        assert_eq!(blob.get_string("instrument0_packID"), Ok(String::new()));
        assert_eq!(blob.get_player_id("ownerUUID"), Ok(None));
        assert!(blob.get_points("savedRiderLocations").unwrap().is_empty());
    }

    #[test]
    fn test_type_mismatch() {
        let mut blob = MemoryBlob::new();
        blob.set_string("locked", "yes");
        assert!(matches!(
            blob.get_bool("locked"),
            Err(BlobError::TypeMismatch { expected: "bool", found: "string", .. })
        ));
    }

    #[test]
    fn test_ron_text_keeps_fields() {
        let mut blob = MemoryBlob::new();
        blob.set_bool("isFlat", true);
        blob.set_player_id("ownerUUID", PlayerId(42));
        blob.set_points("savedRiderLocations", &[Vec3::new(0.0, 1.0, 2.0)]);
        let mut child = MemoryBlob::new();
        child.set_double("angle", 1.5);
        blob.set_child("part_0", child);

        let back = MemoryBlob::from_ron(&blob.to_ron().unwrap()).unwrap();
        assert_eq!(back.get_bool("isFlat"), Ok(true));
        assert_eq!(back.get_player_id("ownerUUID"), Ok(Some(PlayerId(42))));
        assert_eq!(back.get_points("savedRiderLocations").unwrap(), vec![Vec3::new(0.0, 1.0, 2.0)]);
        assert_eq!(back.get_child("part_0").unwrap().get_double("angle"), Ok(1.5));
    }
}
