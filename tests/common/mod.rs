//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use carbon_regulator::assets::Asset;
use carbon_regulator::error::{AssetError, FetchError};
use carbon_regulator::intensity::{Classification, IntensityReading, IntensitySource};
use carbon_regulator::regulation::{Directive, RegulationSettings};

/// Fast settings: 1 ms interval, rendezvous channel.
pub fn fast_settings() -> RegulationSettings {
    RegulationSettings::new(Duration::from_millis(1))
}

/// A reading with the given classification and fixed window.
pub fn reading(classification: Classification) -> IntensityReading {
    IntensityReading {
        from: "2018-01-20T12:00Z".to_string(),
        to: "2018-01-20T12:30Z".to_string(),
        forecast: 266,
        actual: Some(100),
        classification,
    }
}

/// Intensity source that replays a fixed script, then fails forever.
///
/// `None` entries are fetch failures.
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Option<Classification>>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Option<Classification>>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
        }
    }

    /// Script of successful readings only.
    pub fn readings(classifications: Vec<Classification>) -> Self {
        Self::new(classifications.into_iter().map(Some).collect())
    }
}

#[async_trait]
impl IntensitySource for ScriptedSource {
    async fn fetch_current(&self) -> Result<IntensityReading, FetchError> {
        let next = self
            .steps
            .lock()
            .expect("script lock poisoned")
            .pop_front()
            .flatten();
        match next {
            Some(classification) => Ok(reading(classification)),
            None => Err(FetchError::Http {
                status: 503,
                message: "service unavailable".to_string(),
            }),
        }
    }
}

/// Shared log of charging values an asset received.
pub type CallLog = Arc<Mutex<Vec<f64>>>;

pub fn calls(log: &CallLog) -> Vec<f64> {
    log.lock().expect("call log poisoned").clone()
}

/// Asset that records every value and accepts valid directives.
pub struct RecordingAsset {
    id: String,
    log: CallLog,
}

impl RecordingAsset {
    pub fn new(id: &str) -> (Self, CallLog) {
        let log = CallLog::default();
        (
            Self {
                id: id.to_string(),
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl Asset for RecordingAsset {
    fn set_charging(&mut self, value: f64) -> Result<(), AssetError> {
        self.log.lock().expect("call log poisoned").push(value);
        Directive::try_from(value)
            .map(|_| ())
            .map_err(|value| AssetError::InvalidDirective {
                id: self.id.clone(),
                value,
            })
    }

    fn asset_id(&self) -> &str {
        &self.id
    }

    fn asset_type(&self) -> &'static str {
        "Recording"
    }
}

/// Asset that records every value and always fails.
pub struct FailingAsset {
    id: String,
    log: CallLog,
}

impl FailingAsset {
    pub fn new(id: &str) -> (Self, CallLog) {
        let log = CallLog::default();
        (
            Self {
                id: id.to_string(),
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl Asset for FailingAsset {
    fn set_charging(&mut self, value: f64) -> Result<(), AssetError> {
        self.log.lock().expect("call log poisoned").push(value);
        Err(AssetError::Fault {
            id: self.id.clone(),
            reason: "inverter offline".to_string(),
        })
    }

    fn asset_id(&self) -> &str {
        &self.id
    }

    fn asset_type(&self) -> &'static str {
        "Failing"
    }
}

/// Asset whose driver panics on any directive.
pub struct PanickingAsset;

impl Asset for PanickingAsset {
    fn set_charging(&mut self, _value: f64) -> Result<(), AssetError> {
        panic!("driver crashed");
    }

    fn asset_id(&self) -> &str {
        "panicking"
    }

    fn asset_type(&self) -> &'static str {
        "Panicking"
    }
}

/// Polls `condition` every millisecond; panics after five seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached within 5s");
}
