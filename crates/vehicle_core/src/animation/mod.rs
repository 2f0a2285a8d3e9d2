//! Animation evaluation
//!
//! Declarative step lists evaluated against an object's variables.

pub mod modifier;
pub mod switchbox;

pub use modifier::adjust_variable;
pub use switchbox::{Switchbox, SwitchboxOutcome, SwitchboxRequest};
