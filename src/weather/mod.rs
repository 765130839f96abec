//! Upstream weather providers
//!
//! The proxy only ever needs one number from the provider, the current UV
//! index for a coordinate. `UvIndexSource` is the seam between the HTTP
//! handler and whichever provider backs it.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Coordinates;

pub mod openweathermap;

pub use openweathermap::OpenWeatherMapClient;

#[async_trait]
pub trait UvIndexSource: Send + Sync {
    /// Current UV index at `coordinates`, `None` when the provider reports no figure.
    ///
    /// Any transport, status or decoding failure is an error.
    async fn current_uv_index(&self, coordinates: &Coordinates) -> Result<Option<f64>>;
}
