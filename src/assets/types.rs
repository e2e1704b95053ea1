//! Common types and traits for controllable assets.

use std::fmt;

use crate::error::AssetError;

/// Operating mode an asset was last commanded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargeMode {
    /// No directive applied yet.
    #[default]
    Idle,
    /// Drawing from the grid at the maximum rate.
    Charging,
    /// Exporting to the grid at the maximum rate.
    Discharging,
}

impl fmt::Display for ChargeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChargeMode::Idle => "idle",
            ChargeMode::Charging => "charging",
            ChargeMode::Discharging => "discharging",
        };
        f.write_str(label)
    }
}

/// Trait defining an asset that can be told to charge or discharge.
///
/// The regulator only ever sends `+1.0` (charge at max rate) or `-1.0`
/// (discharge at max rate). What the asset does with that is its own
/// business, but the call must finish before returning.
pub trait Asset: Send {
    /// Applies a charging directive.
    ///
    /// # Arguments
    ///
    /// * `value` - `+1.0` to charge, `-1.0` to discharge
    ///
    /// # Errors
    ///
    /// Returns [`AssetError::InvalidDirective`] for any other value, leaving the
    /// asset untouched, or [`AssetError::Fault`] if the asset could not comply.
    fn set_charging(&mut self, value: f64) -> Result<(), AssetError>;

    /// Identifier used in logs and dispatch reports.
    fn asset_id(&self) -> &str;

    /// Returns a human-readable type name for the asset.
    fn asset_type(&self) -> &'static str;
}
