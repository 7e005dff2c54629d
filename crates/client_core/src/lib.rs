pub mod backend;
pub mod checklist;
pub mod dashboard;
pub mod incident;
pub mod risk;
pub mod risk_auditor;
pub mod standards;

pub use backend::{BackendError, BackendGateway, HttpBackendGateway, MissingBackendGateway};
pub use checklist::Checklist;
pub use dashboard::DashboardView;
pub use incident::{IncidentForm, IncidentFormView, SubmitPhase, INCIDENT_TYPES};
pub use risk::{degraded_result, AnalysisError, GenerativeRiskGateway, RiskGateway};
pub use risk_auditor::{AnalysisPhase, RiskAuditorView, SCENARIO_PRESETS};
pub use standards::StandardsView;

/// Lifecycle of a fetch-backed view. Every view owns its own phase; there is
/// no shared store, and a failed fetch only ever affects the view that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    #[default]
    Idle,
    Loading,
    Success,
    Failure,
}
