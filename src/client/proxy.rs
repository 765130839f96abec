use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use super::{FetchError, UvFetcher};
use crate::models::{Coordinates, UvIndexResponse};

/// Calls the proxy's `/api/uv` endpoint.
///
/// No client-level timeout is configured here; the controller owns the abort
/// timer for each call.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("uv-advisory/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl UvFetcher for ProxyClient {
    async fn fetch_uv(&self, coordinates: &Coordinates) -> Result<Option<f64>, FetchError> {
        let url = format!("{}/api/uv", self.base_url);
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        // Error replies are JSON too; one without `uvIndex` reads as no figure
        let status = response.status();
        if !status.is_success() {
            debug!("Proxy answered with status {}", status);
        }

        let body: UvIndexResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(body.uv_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sydney() -> Coordinates {
        Coordinates::new(-33.87, 151.21).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_uv_value() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/uv"))
            .and(query_param("lat", "-33.87"))
            .and(query_param("lon", "151.21"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "uvIndex": 11.3 })),
            )
            .mount(&mock_server)
            .await;

        let client = ProxyClient::new(&format!("{}/", mock_server.uri())).unwrap();
        assert_eq!(client.fetch_uv(&sydney()).await, Ok(Some(11.3)));
    }

    #[tokio::test]
    async fn test_fetch_uv_null() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/uv"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "uvIndex": null })),
            )
            .mount(&mock_server)
            .await;

        let client = ProxyClient::new(&mock_server.uri()).unwrap();
        assert_eq!(client.fetch_uv(&sydney()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_fetch_uv_error_body_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/uv"))
            .respond_with(ResponseTemplate::new(500).set_body_json(
                serde_json::json!({ "error": "Failed to fetch UV data" }),
            ))
            .mount(&mock_server)
            .await;

        let client = ProxyClient::new(&mock_server.uri()).unwrap();
        assert_eq!(client.fetch_uv(&sydney()).await, Ok(None));
    }

    #[tokio::test]
    async fn test_fetch_uv_error_status_with_html_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/uv"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<h1>Bad Gateway</h1>"))
            .mount(&mock_server)
            .await;

        let client = ProxyClient::new(&mock_server.uri()).unwrap();
        assert!(matches!(
            client.fetch_uv(&sydney()).await,
            Err(FetchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_uv_non_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/uv"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = ProxyClient::new(&mock_server.uri()).unwrap();
        assert!(matches!(
            client.fetch_uv(&sydney()).await,
            Err(FetchError::Decode(_))
        ));
    }
}
