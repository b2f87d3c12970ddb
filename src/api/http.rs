//! reqwest-backed implementation of the backend transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::types::{
    CurrentReadings, Envelope, ErrorBody, MachineVitals, PredictionRecord, PredictionResponse,
    SimulationStatus, VitalsLogEntry, VitalsModeStatus, VitalsSample,
};
use super::{ApiClient, ApiError};
use crate::model::{Machine, MachineStatus, SensorRanges};

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the machine/prediction backend.
///
/// All methods classify failures per [`ApiError`]: connection problems as
/// `Transport`, non-2xx statuses as `Status` (decoding the server's
/// `{error}` body when present), undecodable bodies as `Schema`, and
/// `success: false` envelopes as `Api`.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
    description: String,
}

impl HttpApiClient {
    /// Create a client against the given base URL (e.g. `http://localhost:5000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;
        let description = format!("api: {base_url}");
        Ok(Self {
            base_url,
            client,
            description,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request and collect the status and body, mapping connection
    /// failures to `Transport`.
    async fn send(request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), ApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Transport("request timed out".to_string())
            } else {
                ApiError::Transport(e.to_string())
            }
        })?;
        let status = response.status();
        let bytes =
            response.bytes().await.map_err(|e| ApiError::Transport(e.to_string()))?.to_vec();
        Ok((status, bytes))
    }

    fn status_error(status: StatusCode, body: &[u8]) -> ApiError {
        let message = serde_json::from_slice::<ErrorBody>(body).map(|b| b.error).unwrap_or_else(
            |_| status.canonical_reason().unwrap_or("request failed").to_string(),
        );
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// Perform a request whose body is a `{success, data}` envelope and
    /// extract the payload.
    async fn enveloped<T: DeserializeOwned>(
        &self,
        path: &str,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        debug!(path, "backend request");
        let (status, body) = Self::send(request).await?;
        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }
        let envelope: Envelope<T> =
            serde_json::from_slice(&body).map_err(|e| ApiError::Schema(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Api(
                envelope.failure_message().unwrap_or("request failed").to_string(),
            ));
        }
        envelope.data.ok_or_else(|| ApiError::Schema("response missing data field".to_string()))
    }

    /// Perform a mutation whose body is a `{success, message}` envelope and
    /// return the server message.
    async fn acknowledged(&self, path: &str, request: RequestBuilder) -> Result<String, ApiError> {
        debug!(path, "backend command");
        let (status, body) = Self::send(request).await?;
        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_slice(&body).map_err(|e| ApiError::Schema(e.to_string()))?;
        if !envelope.success {
            return Err(ApiError::Api(
                envelope.failure_message().unwrap_or("request failed").to_string(),
            ));
        }
        Ok(envelope.message.unwrap_or_else(|| "ok".to_string()))
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn machines(&self) -> Result<Vec<Machine>, ApiError> {
        let path = "/machine/machines";
        self.enveloped(path, self.client.get(self.url(path))).await
    }

    async fn machine(&self, id: &str) -> Result<Machine, ApiError> {
        let path = format!("/machine/machines/{id}");
        self.enveloped(&path, self.client.get(self.url(&path))).await
    }

    async fn current_vitals(&self) -> Result<CurrentReadings, ApiError> {
        let path = "/machine/vitals/current";
        self.enveloped(path, self.client.get(self.url(path))).await
    }

    async fn machine_current_vitals(&self, id: &str) -> Result<MachineVitals, ApiError> {
        let path = format!("/machine/machines/{id}/vitals/current");
        self.enveloped(&path, self.client.get(self.url(&path))).await
    }

    async fn machine_vitals_history(
        &self,
        id: &str,
        limit: usize,
    ) -> Result<Vec<VitalsSample>, ApiError> {
        let path = format!("/machine/machines/{id}/vitals/history");
        let request = self.client.get(self.url(&path)).query(&[("limit", limit)]);
        self.enveloped(&path, request).await
    }

    async fn vitals_history(&self, limit: usize) -> Result<Vec<VitalsLogEntry>, ApiError> {
        let path = "/machine/vitals/history";
        let request = self.client.get(self.url(path)).query(&[("limit", limit)]);
        self.enveloped(path, request).await
    }

    async fn sensor_ranges(&self) -> Result<SensorRanges, ApiError> {
        let path = "/machine/vitals/ranges";
        self.enveloped(path, self.client.get(self.url(path))).await
    }

    async fn vitals_status(&self) -> Result<VitalsModeStatus, ApiError> {
        let path = "/machine/vitals/status";
        self.enveloped(path, self.client.get(self.url(path))).await
    }

    async fn simulation_status(&self) -> Result<SimulationStatus, ApiError> {
        let path = "/machine/simulation/status";
        self.enveloped(path, self.client.get(self.url(path))).await
    }

    async fn start_simulation(&self) -> Result<String, ApiError> {
        let path = "/machine/simulation/start";
        self.acknowledged(path, self.client.post(self.url(path))).await
    }

    async fn stop_simulation(&self) -> Result<String, ApiError> {
        let path = "/machine/simulation/stop";
        self.acknowledged(path, self.client.post(self.url(path))).await
    }

    async fn trigger_caution(&self, duration_secs: u64) -> Result<String, ApiError> {
        let path = "/machine/vitals/trigger-caution";
        let request = self.client.post(self.url(path)).json(&json!({ "duration": duration_secs }));
        self.acknowledged(path, request).await
    }

    async fn trigger_critical(&self, duration_secs: u64) -> Result<String, ApiError> {
        let path = "/machine/vitals/trigger-critical";
        let request = self.client.post(self.url(path)).json(&json!({ "duration": duration_secs }));
        self.acknowledged(path, request).await
    }

    async fn reset_normal(&self) -> Result<String, ApiError> {
        let path = "/machine/vitals/reset-normal";
        self.acknowledged(path, self.client.post(self.url(path))).await
    }

    async fn update_machine_status(
        &self,
        id: &str,
        status: MachineStatus,
    ) -> Result<String, ApiError> {
        let path = format!("/machine/machines/{id}/status");
        let request =
            self.client.patch(self.url(&path)).json(&json!({ "status": status.label() }));
        self.acknowledged(&path, request).await
    }

    async fn clear_logs(&self) -> Result<String, ApiError> {
        let path = "/machine/vitals/clear-logs";
        self.acknowledged(path, self.client.delete(self.url(path))).await
    }

    async fn predict(&self, window: &[PredictionRecord]) -> Result<PredictionResponse, ApiError> {
        let path = "/ml/predict";
        debug!(path, records = window.len(), "prediction request");
        let request = self.client.post(self.url(path)).json(&window);
        let (status, body) = Self::send(request).await?;
        if !status.is_success() {
            return Err(Self::status_error(status, &body));
        }
        // The prediction service returns a bare object, not an envelope.
        serde_json::from_slice(&body).map_err(|e| ApiError::Schema(e.to_string()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = HttpApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.url("/machine/machines"), "http://localhost:5000/machine/machines");
        assert_eq!(client.description(), "api: http://localhost:5000");
    }

    #[test]
    fn test_status_error_decodes_error_body() {
        let err =
            HttpApiClient::status_error(StatusCode::NOT_FOUND, br#"{"error": "Machine not found"}"#);
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Machine not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_without_json_body() {
        let err = HttpApiClient::status_error(StatusCode::BAD_GATEWAY, b"<html>oops</html>");
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
