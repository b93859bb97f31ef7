//! Music generation engines.
//!
//! This module contains wrappers around external music generation programs.
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `diffrhythm` - DiffRhythm (vendored shell script, enabled by default)

#[cfg(feature = "diffrhythm")]
pub mod diffrhythm;
