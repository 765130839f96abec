//! Coordinate model for device positions and proxy queries

use serde::{Deserialize, Serialize};

use crate::UvAdvisoryError;

/// Geographic coordinates in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> crate::Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(UvAdvisoryError::validation(format!(
                "Latitude must be between -90 and 90, got: {latitude}"
            )));
        }

        if !(-180.0..=180.0).contains(&longitude) {
            return Err(UvAdvisoryError::validation(format!(
                "Longitude must be between -180 and 180, got: {longitude}"
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parse coordinates from their textual query form
    pub fn parse(latitude: &str, longitude: &str) -> crate::Result<Self> {
        let lat = latitude
            .trim()
            .parse::<f64>()
            .map_err(|_| UvAdvisoryError::validation(format!("Invalid latitude: {latitude}")))?;
        let lon = longitude
            .trim()
            .parse::<f64>()
            .map_err(|_| UvAdvisoryError::validation(format!("Invalid longitude: {longitude}")))?;

        Self::new(lat, lon)
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
