//! Incident report submission lifecycle.

use std::sync::Arc;
use std::time::Duration;

use shared::domain::{IncidentStatus, Severity};
use shared::protocol::{IncidentDraft, IncidentReport};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::backend::BackendGateway;

/// Incident types offered at the input boundary; free text goes under "Other".
pub const INCIDENT_TYPES: [&str; 6] = [
    "Sterility Breach",
    "Equipment Failure",
    "Medication Error",
    "Staff Injury",
    "Documentation Gap",
    "Other",
];

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit report. Please try again.";

/// How long the success banner stays up before the view reverts to idle.
const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPhase {
    Idle,
    Submitting,
    Submitted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentForm {
    pub kind: String,
    pub description: String,
    pub severity: Severity,
    pub reported_by: String,
}

impl IncidentForm {
    fn empty() -> Self {
        Self {
            kind: String::new(),
            description: String::new(),
            severity: Severity::Low,
            reported_by: String::new(),
        }
    }

    /// Validation happens here, at the input boundary; an invalid form is
    /// never turned into a request.
    pub fn is_valid(&self) -> bool {
        !self.kind.trim().is_empty() && !self.description.trim().is_empty()
    }

    fn to_draft(&self) -> IncidentDraft {
        let reported_by = self.reported_by.trim();
        IncidentDraft {
            kind: self.kind.trim().to_string(),
            description: self.description.trim().to_string(),
            severity: self.severity,
            reported_by: (!reported_by.is_empty()).then(|| reported_by.to_string()),
            status: IncidentStatus::Open,
        }
    }
}

impl Default for IncidentForm {
    fn default() -> Self {
        Self::empty()
    }
}

struct IncidentFormState {
    form: IncidentForm,
    phase: SubmitPhase,
    last_submitted: Option<IncidentReport>,
}

/// One submission lifecycle per view instance. The success banner reverts to
/// idle on a timer; the timer task is owned by the view and aborted on
/// teardown so it can never act on a discarded view.
pub struct IncidentFormView {
    inner: Mutex<IncidentFormState>,
    revert_task: Mutex<Option<JoinHandle<()>>>,
}

impl IncidentFormView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(IncidentFormState {
                form: IncidentForm::empty(),
                phase: SubmitPhase::Idle,
                last_submitted: None,
            }),
            revert_task: Mutex::new(None),
        })
    }

    pub async fn form(&self) -> IncidentForm {
        self.inner.lock().await.form.clone()
    }

    pub async fn set_form(&self, form: IncidentForm) {
        self.inner.lock().await.form = form;
    }

    pub async fn phase(&self) -> SubmitPhase {
        self.inner.lock().await.phase.clone()
    }

    pub async fn last_submitted(&self) -> Option<IncidentReport> {
        self.inner.lock().await.last_submitted.clone()
    }

    /// Mirrors the disabled submit control: invalid form or in-flight
    /// submission.
    pub async fn can_submit(&self) -> bool {
        let state = self.inner.lock().await;
        state.phase != SubmitPhase::Submitting && state.form.is_valid()
    }

    /// Returns false when the guard blocked the attempt before it reached
    /// the gateway. On success the form is cleared and the banner reverts
    /// after a fixed window; on failure the form is kept for resubmission.
    pub async fn submit(self: &Arc<Self>, gateway: &dyn BackendGateway) -> bool {
        let draft = {
            let mut state = self.inner.lock().await;
            if state.phase == SubmitPhase::Submitting || !state.form.is_valid() {
                return false;
            }
            state.phase = SubmitPhase::Submitting;
            state.form.to_draft()
        };

        match gateway.submit_incident(&draft).await {
            Ok(report) => {
                {
                    let mut state = self.inner.lock().await;
                    state.form = IncidentForm::empty();
                    state.last_submitted = Some(report);
                    state.phase = SubmitPhase::Submitted;
                }
                self.schedule_success_revert().await;
            }
            Err(err) => {
                warn!(error = %err, "incident submission failed; form retained");
                let mut state = self.inner.lock().await;
                state.phase = SubmitPhase::Failed(SUBMIT_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    async fn schedule_success_revert(self: &Arc<Self>) {
        let view = Arc::clone(self);
        let task = tokio::spawn(async move {
            tokio::time::sleep(SUCCESS_BANNER_TTL).await;
            let mut state = view.inner.lock().await;
            if state.phase == SubmitPhase::Submitted {
                state.phase = SubmitPhase::Idle;
            }
        });

        let previous = self.revert_task.lock().await.replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Cancel the pending banner revert unconditionally. Call when the view
    /// is discarded.
    pub async fn teardown(&self) {
        if let Some(task) = self.revert_task.lock().await.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/incident_tests.rs"]
mod tests;
