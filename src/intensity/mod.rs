//! Carbon-intensity signal: reading model and source contract.

/// HTTP client for the National Grid carbon intensity API.
pub mod national_grid;
/// Seeded offline intensity source.
pub mod simulated;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::FetchError;

pub use national_grid::NationalGridSource;
pub use simulated::SimulatedSource;

/// Categorical carbon-intensity level reported by an intensity source.
///
/// Indices outside the five known levels are preserved verbatim in
/// [`Classification::Unrecognized`] instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Classification {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
    Unrecognized(String),
}

impl Classification {
    /// The five known levels, ordered from cleanest to dirtiest.
    pub const LEVELS: [Classification; 5] = [
        Classification::VeryLow,
        Classification::Low,
        Classification::Moderate,
        Classification::High,
        Classification::VeryHigh,
    ];

    /// Returns `false` for [`Classification::Unrecognized`].
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Classification::Unrecognized(_))
    }

    /// Position of a known level within [`Classification::LEVELS`].
    pub fn level_index(&self) -> Option<usize> {
        Self::LEVELS.iter().position(|level| level == self)
    }
}

impl FromStr for Classification {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Ok(match normalized.as_str() {
            "very low" => Classification::VeryLow,
            "low" => Classification::Low,
            "moderate" => Classification::Moderate,
            "high" => Classification::High,
            "very high" => Classification::VeryHigh,
            _ => Classification::Unrecognized(s.to_string()),
        })
    }
}

impl From<String> for Classification {
    fn from(raw: String) -> Self {
        match raw.parse() {
            Ok(classification) => classification,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::VeryLow => f.write_str("very low"),
            Classification::Low => f.write_str("low"),
            Classification::Moderate => f.write_str("moderate"),
            Classification::High => f.write_str("high"),
            Classification::VeryHigh => f.write_str("very high"),
            Classification::Unrecognized(raw) => write!(f, "unrecognized ({raw:?})"),
        }
    }
}

/// One carbon-intensity observation for a half-hour window.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityReading {
    /// Window start, as reported by the source (ISO-8601).
    pub from: String,
    /// Window end, as reported by the source (ISO-8601).
    pub to: String,
    /// Forecast intensity (gCO2/kWh).
    pub forecast: i32,
    /// Measured intensity (gCO2/kWh); absent until the window has been measured.
    pub actual: Option<i32>,
    pub classification: Classification,
}

impl fmt::Display for IntensityReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{} index={} forecast={} actual=",
            self.from, self.to, self.classification, self.forecast
        )?;
        match self.actual {
            Some(actual) => write!(f, "{actual}"),
            None => f.write_str("n/a"),
        }
    }
}

/// Anything able to report the current carbon intensity.
///
/// Implementations do not retry; retry timing belongs to the producer loop.
#[async_trait]
pub trait IntensitySource: Send + Sync {
    /// Fetches the reading for the current window.
    async fn fetch_current(&self) -> Result<IntensityReading, FetchError>;
}
