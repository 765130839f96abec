use serde::{Deserialize, Serialize};

/// Body of a successful `/api/uv` response
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct UvIndexResponse {
    /// Current UV index, `null` when the provider has no figure
    #[serde(rename = "uvIndex", default)]
    pub uv_index: Option<f64>,
}

/// Body of a failed `/api/uv` response
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_uv_index_serializes_as_null() {
        let body = serde_json::to_value(UvIndexResponse { uv_index: None }).unwrap();
        assert_eq!(body, serde_json::json!({ "uvIndex": null }));
    }

    #[test]
    fn test_missing_uv_index_reads_as_none() {
        let body: UvIndexResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.uv_index, None);

        let body: UvIndexResponse = serde_json::from_str(r#"{"uvIndex": 3.4}"#).unwrap();
        assert_eq!(body.uv_index, Some(3.4));
    }
}
