//! OpenWeatherMap One Call client
//!
//! Retrieves the `current.uvi` field for a coordinate. The API key stays on the
//! server: it is sent upstream as a query parameter and is kept out of logs and
//! `Debug` output.

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use super::UvIndexSource;
use crate::UvAdvisoryError;
use crate::config::WeatherConfig;
use crate::models::Coordinates;

/// Blocks of the One Call response we never read
const EXCLUDED_BLOCKS: &str = "minutely,hourly,daily,alerts";

pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMapClient {
    /// Create a client from configuration. Fails when no API key is configured.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        Self::with_base_url(api_key, &config.base_url, config.timeout())
    }

    pub fn with_base_url(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("uv-advisory/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl fmt::Debug for OpenWeatherMapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherMapClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl UvIndexSource for OpenWeatherMapClient {
    #[instrument(skip(self, coordinates), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn current_uv_index(&self, coordinates: &Coordinates) -> Result<Option<f64>> {
        let start_time = Instant::now();
        let url = format!("{}/onecall", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("exclude", EXCLUDED_BLOCKS.to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            // reqwest errors carry the full URL, appid included
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Weather provider answered with status {}", status);
            return Err(UvAdvisoryError::upstream(format!(
                "Weather provider returned {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            ))
            .into());
        }

        let body: OneCallResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .with_context(|| "Failed to parse One Call response")?;

        let uv_index = body.current.and_then(|current| current.uvi);
        if uv_index.is_none() {
            debug!("One Call response carried no current.uvi");
        }

        info!(
            "Retrieved UV index {:?} in {:.3}s",
            uv_index,
            start_time.elapsed().as_secs_f64()
        );

        Ok(uv_index)
    }
}

/// The slice of the One Call 3.0 response the proxy cares about
#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: Option<CurrentConditions>,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    uvi: Option<f64>,
}
