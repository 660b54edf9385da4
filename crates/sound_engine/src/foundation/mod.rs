//! Foundation module - shared utilities
//!
//! - Math types for positioned sounds
//! - Logging setup for binaries

pub mod logging;
pub mod math;
