//! Occupant attachment
//!
//! Multi-point attachment for objects and single-occupant attachment for
//! seats. Both only notify actors and broadcast on the authority.

pub mod map;
pub mod single;

pub use map::{points_equal, AttachmentMap, MASS_PER_OCCUPANT};
pub use single::SingleAttachment;
