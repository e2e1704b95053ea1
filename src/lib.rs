//! Carbon-aware battery regulator.
//!
//! Polls a carbon-intensity signal and tells every registered asset to
//! charge when the grid is clean and discharge when it is dirty.

pub mod assets;
pub mod cli;
pub mod config;
pub mod error;
/// Intensity sources and the reading model.
pub mod intensity;
/// Producer/consumer regulation loop.
pub mod regulation;
