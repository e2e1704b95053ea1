use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::debug;

use super::{Classification, IntensityReading, IntensitySource};
use crate::error::FetchError;

/// Default request timeout; the HTTP client has none otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Envelope returned by the `/intensity` endpoints.
#[derive(Debug, Deserialize)]
struct IntensityResponse {
    data: Option<Vec<IntensityData>>,
}

#[derive(Debug, Deserialize)]
struct IntensityData {
    from: String,
    to: String,
    intensity: Intensity,
}

#[derive(Debug, Deserialize)]
struct Intensity {
    forecast: i32,
    actual: Option<i32>,
    index: Classification,
}

/// Intensity source backed by the National Grid carbon intensity REST API.
#[derive(Debug, Clone)]
pub struct NationalGridSource {
    client: reqwest::Client,
    url: String,
}

impl NationalGridSource {
    /// Creates a source that polls `{base_url}{endpoint}`.
    ///
    /// # Errors
    ///
    /// Returns the underlying `reqwest::Error` if the HTTP client cannot be built
    /// (for example when the TLS backend fails to initialise).
    pub fn new(base_url: &str, endpoint: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{base_url}{endpoint}"),
        })
    }

    /// Full URL polled on every fetch.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IntensitySource for NationalGridSource {
    async fn fetch_current(&self) -> Result<IntensityReading, FetchError> {
        let transport = |source| FetchError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;
        debug!(url = %self.url, status = status.as_u16(), bytes = body.len(), "intensity response");

        if status != StatusCode::OK {
            return Err(FetchError::Http {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        decode_intensity(&body)
    }
}

/// Decodes an `/intensity` response body into the reading for the first window.
///
/// # Errors
///
/// * [`FetchError::Decode`] if the body is not the expected JSON shape
/// * [`FetchError::NoData`] if `data` is missing, `null`, or empty
pub fn decode_intensity(body: &[u8]) -> Result<IntensityReading, FetchError> {
    let response: IntensityResponse = serde_json::from_slice(body)?;
    let first = response
        .data
        .and_then(|data| data.into_iter().next())
        .ok_or(FetchError::NoData)?;

    Ok(IntensityReading {
        from: first.from,
        to: first.to,
        forecast: first.intensity.forecast,
        actual: first.intensity.actual,
        classification: first.intensity.index,
    })
}
