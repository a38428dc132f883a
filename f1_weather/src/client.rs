//! reqwest-backed client for the `/analyze` endpoint.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::controller::AnalysisClient;
use crate::{AnalysisError, AnalysisRequest, AnalysisResponse, GENERIC_FAILURE};

/// Client for the external analysis service. Usable from both native and
/// wasm32 targets; on wasm32, reqwest delegates to the browser fetch API.
pub struct HttpAnalysisClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    /// `base_url` is the service origin, e.g. the page's own origin or
    /// `http://127.0.0.1:5000`; the `/analyze` path is appended.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/analyze", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait(?Send)]
impl AnalysisClient for HttpAnalysisClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
        debug!(year = request.year, gp = %request.gp, driver = %request.driver, "posting analysis request");
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let ok = response.status().is_success();
        let body: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        interpret_body(ok, body)
    }
}

/// Map a response body to a result. The body is inspected before the status:
/// the service reports some failures as HTTP 200 with an `error` field, and
/// failure bodies on non-2xx statuses carry the user-facing message.
fn interpret_body(status_ok: bool, body: Value) -> Result<AnalysisResponse, AnalysisError> {
    if let Some(message) = body.get("error").and_then(Value::as_str) {
        return Err(AnalysisError::Api(message.to_string()));
    }
    if !status_ok {
        return Err(AnalysisError::Api(GENERIC_FAILURE.to_string()));
    }
    serde_json::from_value(body).map_err(|e| AnalysisError::Transport(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_body_error_shown_verbatim() {
        let err = interpret_body(false, json!({ "error": "no data" })).unwrap_err();
        assert!(matches!(err, AnalysisError::Api(ref m) if m == "no data"));
    }

    #[test]
    fn test_failure_without_error_field_falls_back() {
        let err = interpret_body(false, json!({})).unwrap_err();
        assert!(matches!(err, AnalysisError::Api(ref m) if m == "Analysis failed"));
    }

    #[test]
    fn test_ok_status_with_error_field_is_still_a_failure() {
        // The Flask service reports some failures as HTTP 200.
        let err =
            interpret_body(true, json!({ "success": false, "error": "No valid laps found" }))
                .unwrap_err();
        assert!(matches!(err, AnalysisError::Api(ref m) if m == "No valid laps found"));
    }

    #[test]
    fn test_success_body_parses() {
        let body = json!({ "success": true, "plot": "iVBORw==", "temp_corr": 0.567, "rain_corr": null });
        let response = interpret_body(true, body).unwrap();
        assert_eq!(response.plot, "iVBORw==");
        assert_eq!(response.temp_corr, Some(0.567));
        assert_eq!(response.rain_corr, None);
    }

    #[test]
    fn test_success_body_missing_plot_is_transport_error() {
        let err = interpret_body(true, json!({ "success": true })).unwrap_err();
        assert!(matches!(err, AnalysisError::Transport(_)));
    }
}
