//! Income Tracker API Client
//!
//! A JSON client for the tracker service, covering the dashboard snapshot,
//! income sources, daily logs, and analytics endpoints.

use crate::api::IncomeApi;
use crate::api::error::ApiError;
use crate::consts::cli_consts::http;
use crate::environment::Environment;
use crate::models::{
    AnalyticsPeriod, AnalyticsReport, DailyLog, DashboardSnapshot, IncomeSource, NewDailyLog,
    NewIncomeSource,
};
use reqwest::{Client, ClientBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

// User-Agent string with the client version
const USER_AGENT: &str = concat!("kasegi/", env!("CARGO_PKG_VERSION"));

/// Every service response wraps its payload in this envelope.
#[derive(Debug, serde::Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

/// Payload of the create endpoints.
#[derive(Debug, serde::Deserialize)]
struct Created {
    id: i64,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    environment: Environment,
}

impl ApiClient {
    pub fn new(environment: Environment) -> Self {
        Self {
            client: ClientBuilder::new()
                .connect_timeout(http::connect_timeout())
                .timeout(http::request_timeout())
                .build()
                .expect("Failed to create HTTP client"),
            environment,
        }
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.base_url().trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Unwrap the `{success, data, error}` envelope into a typed payload.
    fn decode_envelope<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
        let envelope: Envelope<T> = serde_json::from_slice(bytes)?;
        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "Service reported failure".to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::Rejected("Response envelope carried no data".to_string()))
    }

    /// Unwrap an envelope whose payload, if any, is irrelevant.
    fn decode_unit_envelope(bytes: &[u8]) -> Result<(), ApiError> {
        let envelope: Envelope<serde_json::Value> = serde_json::from_slice(bytes)?;
        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope
                    .error
                    .unwrap_or_else(|| "Service reported failure".to_string()),
            ));
        }
        Ok(())
    }

    async fn handle_response_status(response: Response) -> Result<Response, ApiError> {
        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }
        Ok(response)
    }

    async fn get_request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint);
        let response = self
            .client
            .get(&url)
            .query(query)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_envelope(&response_bytes)
    }

    async fn post_request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.build_url(endpoint);
        let response = self
            .client
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .json(body)
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_envelope(&response_bytes)
    }

    async fn put_request_no_response<B: Serialize + Sync>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let url = self.build_url(endpoint);
        let response = self
            .client
            .put(&url)
            .header("User-Agent", USER_AGENT)
            .json(body)
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_unit_envelope(&response_bytes)
    }

    async fn delete_request(&self, endpoint: &str) -> Result<(), ApiError> {
        let url = self.build_url(endpoint);
        let response = self
            .client
            .delete(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let response = Self::handle_response_status(response).await?;
        let response_bytes = response.bytes().await?;
        Self::decode_unit_envelope(&response_bytes)
    }
}

#[async_trait::async_trait]
impl IncomeApi for ApiClient {
    fn base_url(&self) -> String {
        self.environment.base_url()
    }

    async fn get_dashboard(&self) -> Result<DashboardSnapshot, ApiError> {
        self.get_request("api/dashboard", &[]).await
    }

    async fn list_sources(&self) -> Result<Vec<IncomeSource>, ApiError> {
        self.get_request("api/income-sources", &[]).await
    }

    async fn create_source(&self, source: NewIncomeSource) -> Result<i64, ApiError> {
        let created: Created = self.post_request("api/income-sources", &source).await?;
        Ok(created.id)
    }

    async fn update_source(&self, id: i64, source: NewIncomeSource) -> Result<(), ApiError> {
        self.put_request_no_response(&format!("api/income-sources/{}", id), &source)
            .await
    }

    async fn delete_source(&self, id: i64) -> Result<(), ApiError> {
        self.delete_request(&format!("api/income-sources/{}", id))
            .await
    }

    async fn list_logs(
        &self,
        date: Option<String>,
        source_id: Option<i64>,
    ) -> Result<Vec<DailyLog>, ApiError> {
        let mut query = Vec::new();
        if let Some(date) = date {
            query.push(("date", date));
        }
        if let Some(source_id) = source_id {
            query.push(("source_id", source_id.to_string()));
        }
        self.get_request("api/daily-logs", &query).await
    }

    async fn create_log(&self, log: NewDailyLog) -> Result<i64, ApiError> {
        let created: Created = self.post_request("api/daily-logs", &log).await?;
        Ok(created.id)
    }

    async fn delete_log(&self, id: i64) -> Result<(), ApiError> {
        self.delete_request(&format!("api/daily-logs/{}", id)).await
    }

    async fn get_analytics(&self, period: AnalyticsPeriod) -> Result<AnalyticsReport, ApiError> {
        self.get_request("api/analytics", &[("period", period.as_str().to_string())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_normalizes_slashes() {
        let client = ApiClient::new(Environment::Custom {
            base_url: "http://localhost:5000/".to_string(),
        });
        assert_eq!(
            client.build_url("/api/dashboard"),
            "http://localhost:5000/api/dashboard"
        );
        assert_eq!(
            client.build_url("api/daily-logs"),
            "http://localhost:5000/api/daily-logs"
        );
    }

    #[test]
    fn test_decode_envelope_success() {
        let body = br#"{"success": true, "data": {"id": 42}}"#;
        let created: Created = ApiClient::decode_envelope(body).unwrap();
        assert_eq!(created.id, 42);
    }

    #[test]
    fn test_decode_envelope_rejection_carries_server_message() {
        let body = br#"{"success": false, "error": "Income source not found"}"#;
        let result: Result<Created, ApiError> = ApiClient::decode_envelope(body);
        match result {
            Err(ApiError::Rejected(msg)) => assert_eq!(msg, "Income source not found"),
            other => panic!("expected rejection, got {:?}", other.map(|c| c.id)),
        }
    }

    #[test]
    fn test_decode_envelope_missing_data_is_rejected() {
        let body = br#"{"success": true}"#;
        let result: Result<Created, ApiError> = ApiClient::decode_envelope(body);
        assert!(matches!(result, Err(ApiError::Rejected(_))));
    }

    #[test]
    fn test_decode_unit_envelope_ignores_payload() {
        assert!(ApiClient::decode_unit_envelope(br#"{"success": true}"#).is_ok());
        assert!(ApiClient::decode_unit_envelope(br#"{"success": true, "data": {"id": 9}}"#).is_ok());
        assert!(matches!(
            ApiClient::decode_unit_envelope(br#"{"success": false, "error": "nope"}"#),
            Err(ApiError::Rejected(_))
        ));
    }

    #[test]
    fn test_decode_envelope_malformed_body() {
        let result: Result<Created, ApiError> = ApiClient::decode_envelope(b"not json");
        assert!(matches!(result, Err(ApiError::Malformed(_))));
    }
}
