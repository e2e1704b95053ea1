//! TOML-based regulator configuration, presets, and environment overrides.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable overriding `regulation.interval_secs`.
pub const ENV_INTERVAL: &str = "INTENSITY_CHECK_INTERVAL_SECONDS";
/// Environment variable overriding `source.base_url`.
pub const ENV_BASE_URL: &str = "NATIONAL_GRID_BASE_URL";
/// Environment variable overriding `source.endpoint`.
pub const ENV_ENDPOINT: &str = "INTENSITY_ENDPOINT";

/// Top-level regulator configuration parsed from TOML.
///
/// Load from TOML with [`RegulatorConfig::from_toml_file`] or start from a
/// preset with [`RegulatorConfig::from_preset`], then layer environment
/// overrides on top and call [`RegulatorConfig::validate`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegulatorConfig {
    /// Loop timing and channel sizing.
    #[serde(default)]
    pub regulation: RegulationConfig,
    /// Carbon-intensity source.
    #[serde(default)]
    pub source: SourceConfig,
    /// Registered assets, in dispatch order.
    #[serde(default)]
    pub assets: Vec<AssetConfig>,
}

/// Loop timing and channel sizing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegulationConfig {
    /// Seconds between intensity polls. Required; there is no default.
    pub interval_secs: Option<u64>,
    /// Directive channel capacity (`0` = rendezvous hand-off).
    pub channel_capacity: usize,
}

/// Carbon-intensity source parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Source kind: `"national_grid"` or `"simulated"`.
    pub kind: String,
    /// API base URL (national grid only).
    pub base_url: String,
    /// Endpoint path appended to `base_url` (national grid only).
    pub endpoint: String,
    /// HTTP request timeout in seconds (national grid only).
    pub timeout_secs: u64,
    /// Random seed (simulated only).
    pub seed: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: "national_grid".to_string(),
            base_url: "https://api.carbonintensity.org.uk".to_string(),
            endpoint: "/intensity".to_string(),
            timeout_secs: 15,
            seed: 42,
        }
    }
}

/// One registered battery.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetConfig {
    /// Unique identifier.
    pub id: String,
    /// Maximum charging power (kW).
    #[serde(default = "default_rating_kw")]
    pub max_charge_kw: f32,
    /// Maximum discharging power (kW).
    #[serde(default = "default_rating_kw")]
    pub max_discharge_kw: f32,
}

fn default_rating_kw() -> f32 {
    5.0
}

impl AssetConfig {
    fn battery(id: &str) -> Self {
        Self {
            id: id.to_string(),
            max_charge_kw: default_rating_kw(),
            max_discharge_kw: default_rating_kw(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field} - {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"regulation.interval_secs"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl RegulatorConfig {
    /// Polls the National Grid API and drives two batteries.
    ///
    /// The interval is deliberately left unset: it must come from the
    /// environment, a config file, or the command line.
    pub fn national_grid() -> Self {
        Self {
            regulation: RegulationConfig::default(),
            source: SourceConfig::default(),
            assets: vec![
                AssetConfig::battery("battery-a"),
                AssetConfig::battery("battery-b"),
            ],
        }
    }

    /// Offline demo: simulated intensity every 5 s, two batteries.
    pub fn demo() -> Self {
        Self {
            regulation: RegulationConfig {
                interval_secs: Some(5),
                ..RegulationConfig::default()
            },
            source: SourceConfig {
                kind: "simulated".to_string(),
                ..SourceConfig::default()
            },
            assets: vec![
                AssetConfig::battery("battery-a"),
                AssetConfig::battery("battery-b"),
            ],
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["national_grid", "demo"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "national_grid" => Ok(Self::national_grid()),
            "demo" => Ok(Self::demo()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Applies environment overrides looked up through `lookup`.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the interval override is not a whole number.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = get(ENV_INTERVAL) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::new(ENV_INTERVAL, format!("must be a number, got \"{raw}\""))
            })?;
            self.regulation.interval_secs = Some(secs);
        }
        if let Some(url) = get(ENV_BASE_URL) {
            self.source.base_url = url;
        }
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            self.source.endpoint = endpoint;
        }
        Ok(())
    }

    /// Poll interval, if configured and positive.
    pub fn interval(&self) -> Option<Duration> {
        self.regulation
            .interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        match self.regulation.interval_secs {
            None => errors.push(ConfigError::new(
                "regulation.interval_secs",
                format!("must be set (or export {ENV_INTERVAL})"),
            )),
            Some(0) => errors.push(ConfigError::new("regulation.interval_secs", "must be > 0")),
            Some(_) => {}
        }

        let src = &self.source;
        match src.kind.as_str() {
            "national_grid" => {
                if src.base_url.trim().is_empty() {
                    errors.push(ConfigError::new("source.base_url", "must not be empty"));
                }
                if src.endpoint.trim().is_empty() {
                    errors.push(ConfigError::new("source.endpoint", "must not be empty"));
                }
                if src.timeout_secs == 0 {
                    errors.push(ConfigError::new("source.timeout_secs", "must be > 0"));
                }
            }
            "simulated" => {}
            other => errors.push(ConfigError::new(
                "source.kind",
                format!("must be \"national_grid\" or \"simulated\", got \"{other}\""),
            )),
        }

        if self.assets.is_empty() {
            errors.push(ConfigError::new("assets", "at least one asset is required"));
        }
        let mut seen = HashSet::new();
        for (i, asset) in self.assets.iter().enumerate() {
            if asset.id.trim().is_empty() {
                errors.push(ConfigError::new(format!("assets[{i}].id"), "must not be empty"));
            } else if !seen.insert(asset.id.as_str()) {
                errors.push(ConfigError::new(
                    format!("assets[{i}].id"),
                    format!("duplicate asset id \"{}\"", asset.id),
                ));
            }
            if !valid_rating(asset.max_charge_kw) {
                errors.push(ConfigError::new(
                    format!("assets[{i}].max_charge_kw"),
                    "must be a finite number >= 0",
                ));
            }
            if !valid_rating(asset.max_discharge_kw) {
                errors.push(ConfigError::new(
                    format!("assets[{i}].max_discharge_kw"),
                    "must be a finite number >= 0",
                ));
            }
        }

        errors
    }
}

fn valid_rating(kw: f32) -> bool {
    kw.is_finite() && kw >= 0.0
}
