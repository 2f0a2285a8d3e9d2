//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and operations
//! - Object poses with previous-tick history
//! - Identifiers for objects, players and actors
//! - Logging utilities

pub mod ids;
pub mod logging;
pub mod math;
pub mod pose;
