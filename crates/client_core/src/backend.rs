//! Typed client for the operational QMS backend.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::protocol::{DashboardStats, IncidentDraft, IncidentReport, Standard};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure surface of every backend operation. Callers treat all variants as
/// one opaque failure; the split exists for logs and tests.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Network(String),
    #[error("backend returned status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("backend response could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn list_standards(&self) -> Result<Vec<Standard>, BackendError>;
    /// Non-idempotent: every call creates a new record server-side.
    async fn submit_incident(&self, draft: &IncidentDraft)
        -> Result<IncidentReport, BackendError>;
    async fn dashboard_stats(&self) -> Result<DashboardStats, BackendError>;
}

pub struct MissingBackendGateway;

#[async_trait]
impl BackendGateway for MissingBackendGateway {
    async fn list_standards(&self) -> Result<Vec<Standard>, BackendError> {
        Err(BackendError::Network("backend is not configured".into()))
    }

    async fn submit_incident(
        &self,
        _draft: &IncidentDraft,
    ) -> Result<IncidentReport, BackendError> {
        Err(BackendError::Network("backend is not configured".into()))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, BackendError> {
        Err(BackendError::Network("backend is not configured".into()))
    }
}

pub struct HttpBackendGateway {
    http: Client,
    base_url: String,
}

impl HttpBackendGateway {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Timeout expiry is reported as `BackendError::Network`; there is no
    /// retry or backoff.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build backend http client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "backend GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| BackendError::Network(err.to_string()))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl BackendGateway for HttpBackendGateway {
    async fn list_standards(&self) -> Result<Vec<Standard>, BackendError> {
        self.get_json("/standards/").await
    }

    async fn submit_incident(
        &self,
        draft: &IncidentDraft,
    ) -> Result<IncidentReport, BackendError> {
        let url = format!("{}/incidents/", self.base_url);
        debug!(%url, kind = %draft.kind, severity = ?draft.severity, "backend POST");
        let response = self
            .http
            .post(&url)
            .json(draft)
            .send()
            .await
            .map_err(|err| BackendError::Network(err.to_string()))?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, BackendError> {
        self.get_json("/dashboard/stats/").await
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
