//! Gateway to the external generative-model risk-scoring service.
//!
//! The gateway reports failures as typed `AnalysisError`s. The canned
//! degraded verdicts live in [`degraded_result`]; the risk auditor view
//! applies them explicitly instead of surfacing a failure state.

use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::protocol::RiskAnalysisResult;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_GENERATIVE_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GENERATIVE_MODEL: &str = "gemini-2.5-flash";

const ANALYSIS_INSTRUCTION: &str =
    "Analyze the following Operating Room scenario for Health and Safety QMS compliance:";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no generative API credential configured")]
    MissingCredential,
    #[error("risk analysis request failed: {0}")]
    Transport(String),
    #[error("generative model returned an unusable payload: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait RiskGateway: Send + Sync {
    async fn analyze(&self, scenario: &str) -> Result<RiskAnalysisResult, AnalysisError>;
}

/// Canned verdict rendered in place of a hard failure. A caller that applies
/// this cannot distinguish it from a genuine zero-risk verdict except by
/// content; keep the originating error around for logs and tests.
pub fn degraded_result(err: &AnalysisError) -> RiskAnalysisResult {
    match err {
        AnalysisError::MissingCredential => RiskAnalysisResult {
            risk_score: 0.0,
            findings: vec!["API key missing. AI risk analysis is disabled.".to_string()],
            remediation: vec!["Configure GEMINI_API_KEY".to_string()],
        },
        AnalysisError::Transport(detail) | AnalysisError::InvalidResponse(detail) => {
            RiskAnalysisResult {
                risk_score: 0.0,
                findings: vec![
                    "AI Service Connection Failed".to_string(),
                    detail.clone(),
                ],
                remediation: vec![
                    "Check API Key".to_string(),
                    "Check Internet Connection".to_string(),
                ],
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "riskScore": {
                "type": "NUMBER",
                "description": "A score from 0-100 indicating risk level."
            },
            "findings": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of critical safety findings."
            },
            "remediation": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Actionable steps to resolve the identified issues."
            }
        },
        "required": ["riskScore", "findings", "remediation"]
    })
}

pub struct GenerativeRiskGateway {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl GenerativeRiskGateway {
    pub fn new(api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build risk analysis http client")?;
        Ok(Self {
            http,
            endpoint: DEFAULT_GENERATIVE_ENDPOINT.to_string(),
            model: DEFAULT_GENERATIVE_MODEL.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    async fn call_model(
        &self,
        api_key: &str,
        scenario: &str,
    ) -> Result<RiskAnalysisResult, AnalysisError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{ANALYSIS_INSTRUCTION} {scenario}"),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        debug!(model = %self.model, "requesting risk analysis");
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|err| AnalysisError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Transport(format!(
                "status {}: {body}",
                status.as_u16()
            )));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| AnalysisError::InvalidResponse(err.to_string()))?;
        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                AnalysisError::InvalidResponse("no candidate text in model response".to_string())
            })?;

        let result: RiskAnalysisResult = serde_json::from_str(&text)
            .map_err(|err| AnalysisError::InvalidResponse(err.to_string()))?;
        if !result.risk_score.is_finite() || !(0.0..=100.0).contains(&result.risk_score) {
            return Err(AnalysisError::InvalidResponse(format!(
                "risk score {} outside 0-100",
                result.risk_score
            )));
        }
        Ok(result)
    }
}

#[async_trait]
impl RiskGateway for GenerativeRiskGateway {
    async fn analyze(&self, scenario: &str) -> Result<RiskAnalysisResult, AnalysisError> {
        // Missing credential is decided before any network activity.
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AnalysisError::MissingCredential);
        };
        self.call_model(api_key, scenario).await
    }
}

#[cfg(test)]
#[path = "tests/risk_tests.rs"]
mod tests;
