use std::fmt;

use crate::intensity::Classification;

/// Charge/discharge command fanned out to every asset.
///
/// Hold has no representation here: it is the absence of a directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// Draw from the grid at the maximum rate.
    ChargeMax,
    /// Push energy back to the grid at the maximum rate.
    DischargeMax,
}

impl Directive {
    /// Wire value understood by assets: `+1.0` or `-1.0`.
    pub fn value(self) -> f64 {
        match self {
            Directive::ChargeMax => 1.0,
            Directive::DischargeMax => -1.0,
        }
    }
}

impl TryFrom<f64> for Directive {
    type Error = f64;

    /// Accepts exactly `+1.0` or `-1.0`; anything else is returned as the error.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value == 1.0 {
            Ok(Directive::ChargeMax)
        } else if value == -1.0 {
            Ok(Directive::DischargeMax)
        } else {
            Err(value)
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::ChargeMax => write!(f, "charge-max ({:+.1})", self.value()),
            Directive::DischargeMax => write!(f, "discharge-max ({:+.1})", self.value()),
        }
    }
}

/// Maps an intensity classification to a directive, or `None` for hold.
///
/// High carbon means discharge, low carbon means charge. Moderate and
/// unrecognized levels hold.
pub fn translate(classification: &Classification) -> Option<Directive> {
    match classification {
        Classification::High | Classification::VeryHigh => Some(Directive::DischargeMax),
        Classification::Low | Classification::VeryLow => Some(Directive::ChargeMax),
        Classification::Moderate | Classification::Unrecognized(_) => None,
    }
}
