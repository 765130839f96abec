//! The `/api` routes of the proxy

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::models::{Coordinates, ErrorResponse, UvIndexResponse};
use crate::weather::UvIndexSource;

#[derive(Clone)]
pub struct AppState {
    pub uv_source: Arc<dyn UvIndexSource>,
}

impl AppState {
    pub fn new(uv_source: Arc<dyn UvIndexSource>) -> Self {
        Self { uv_source }
    }
}

/// Raw query of `/api/uv`; both values stay strings until validated
#[derive(Debug, Deserialize)]
pub struct UvQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl UvQuery {
    fn coordinates(&self) -> Result<Coordinates, ApiError> {
        let (Some(lat), Some(lon)) = (present(&self.lat), present(&self.lon)) else {
            return Err(ApiError::MissingCoordinates);
        };

        Coordinates::parse(lat, lon).map_err(|e| {
            debug!("Rejecting coordinates: {}", e);
            ApiError::InvalidCoordinates
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing lat/lon parameters")]
    MissingCoordinates,
    #[error("Invalid lat/lon parameters")]
    InvalidCoordinates,
    #[error("Failed to fetch UV data")]
    Upstream,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingCoordinates | ApiError::InvalidCoordinates => StatusCode::BAD_REQUEST,
            ApiError::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/uv", get(get_uv))
}

#[instrument(skip(state))]
async fn get_uv(
    State(state): State<AppState>,
    Query(query): Query<UvQuery>,
) -> Result<Json<UvIndexResponse>, ApiError> {
    let coordinates = query.coordinates()?;

    let uv_index = state
        .uv_source
        .current_uv_index(&coordinates)
        .await
        .map_err(|e| {
            error!("Error fetching uv data: {:#}", e);
            ApiError::Upstream
        })?;

    Ok(Json(UvIndexResponse { uv_index }))
}
