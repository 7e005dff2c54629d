//! Risk auditor lifecycle: free-text scenario in, scored verdict out.

use shared::protocol::RiskAnalysisResult;
use tracing::warn;

use crate::risk::{degraded_result, AnalysisError, RiskGateway};

/// Suggested scenario templates offered next to the input field.
pub const SCENARIO_PRESETS: [&str; 3] = [
    "Possible sterile field contamination during long orthopedic procedure.",
    "HVAC system pressure drop in OR 4 during active surgery.",
    "Post-operative spike in SSI rates for surgeons using new suturing equipment.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisPhase {
    Idle,
    Analyzing,
    Ready,
}

/// The view renders exactly three states: no result yet, loading, and a
/// result. Gateway failures are folded into a degraded verdict so there is
/// no user-facing failure state; the typed error is retained for logs and
/// assertions.
pub struct RiskAuditorView {
    scenario: String,
    phase: AnalysisPhase,
    result: Option<RiskAnalysisResult>,
    last_failure: Option<AnalysisError>,
}

impl RiskAuditorView {
    pub fn new() -> Self {
        Self {
            scenario: String::new(),
            phase: AnalysisPhase::Idle,
            result: None,
            last_failure: None,
        }
    }

    pub fn set_scenario(&mut self, scenario: impl Into<String>) {
        self.scenario = scenario.into();
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    /// Mirrors the disabled analyze control: empty scenario or in-flight
    /// analysis.
    pub fn can_analyze(&self) -> bool {
        self.phase != AnalysisPhase::Analyzing && !self.scenario.trim().is_empty()
    }

    /// Returns false when the guard blocked the attempt. Each verdict
    /// replaces the prior one wholesale.
    pub async fn analyze(&mut self, gateway: &dyn RiskGateway) -> bool {
        if !self.can_analyze() {
            return false;
        }
        self.phase = AnalysisPhase::Analyzing;

        match gateway.analyze(self.scenario.trim()).await {
            Ok(result) => {
                self.last_failure = None;
                self.result = Some(result);
            }
            Err(err) => {
                warn!(error = %err, "risk analysis degraded to canned verdict");
                self.result = Some(degraded_result(&err));
                self.last_failure = Some(err);
            }
        }
        self.phase = AnalysisPhase::Ready;
        true
    }

    pub fn result(&self) -> Option<&RiskAnalysisResult> {
        self.result.as_ref()
    }

    pub fn last_failure(&self) -> Option<&AnalysisError> {
        self.last_failure.as_ref()
    }

    pub fn phase(&self) -> AnalysisPhase {
        self.phase
    }
}

impl Default for RiskAuditorView {
    fn default() -> Self {
        Self::new()
    }
}
