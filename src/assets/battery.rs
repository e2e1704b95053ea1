use tracing::info;

use crate::assets::types::{Asset, ChargeMode};
use crate::error::AssetError;
use crate::regulation::Directive;

/// A battery energy storage system driven at its maximum rates.
///
/// `Battery` remembers the last directive it accepted and reports the
/// resulting power setpoint.
///
/// # Power Flow Convention (Feeder)
/// - Positive power: Charging (consuming power from the grid / load)
/// - Negative power: Discharging (supplying power to the grid / generation)
#[derive(Debug, Clone)]
pub struct Battery {
    /// Identifier, e.g. `"battery-a"`.
    pub id: String,

    /// Maximum charge power in kilowatts (positive value).
    pub max_charge_kw: f32,

    /// Maximum discharge power in kilowatts (positive value).
    pub max_discharge_kw: f32,

    mode: ChargeMode,
}

impl Battery {
    /// Creates an idle battery.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier used in logs
    /// * `max_charge_kw` - Maximum charging power in kW
    /// * `max_discharge_kw` - Maximum discharging power in kW
    ///
    /// # Panics
    ///
    /// Panics if either power rating is negative or NaN.
    pub fn new(id: impl Into<String>, max_charge_kw: f32, max_discharge_kw: f32) -> Self {
        assert!(max_charge_kw >= 0.0 && max_discharge_kw >= 0.0);

        Self {
            id: id.into(),
            max_charge_kw,
            max_discharge_kw,
            mode: ChargeMode::Idle,
        }
    }

    pub fn mode(&self) -> ChargeMode {
        self.mode
    }

    /// Power the battery is commanded to in feeder convention (kW).
    pub fn setpoint_kw(&self) -> f32 {
        match self.mode {
            ChargeMode::Idle => 0.0,
            ChargeMode::Charging => self.max_charge_kw,
            ChargeMode::Discharging => -self.max_discharge_kw,
        }
    }
}

impl Asset for Battery {
    fn set_charging(&mut self, value: f64) -> Result<(), AssetError> {
        let directive = Directive::try_from(value).map_err(|value| AssetError::InvalidDirective {
            id: self.id.clone(),
            value,
        })?;

        match directive {
            Directive::ChargeMax => {
                self.mode = ChargeMode::Charging;
                info!(
                    battery = %self.id,
                    kw = self.max_charge_kw,
                    "Battery {} is set to draw energy from the grid at its max rate",
                    self.id
                );
            }
            Directive::DischargeMax => {
                self.mode = ChargeMode::Discharging;
                info!(
                    battery = %self.id,
                    kw = self.max_discharge_kw,
                    "Battery {} is set to dump energy into the grid at its max rate",
                    self.id
                );
            }
        }
        Ok(())
    }

    fn asset_id(&self) -> &str {
        &self.id
    }

    fn asset_type(&self) -> &'static str {
        "Battery"
    }
}
