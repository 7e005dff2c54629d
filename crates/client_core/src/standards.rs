//! Standards list/detail lifecycle.

use shared::domain::StandardId;
use shared::protocol::Standard;
use tracing::warn;

use crate::backend::BackendGateway;
use crate::FetchPhase;

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load standards. Is the backend running?";
pub const EMPTY_LIST_MESSAGE: &str = "No standards found in database.";
pub const NO_SELECTION_PROMPT: &str = "Select a standard to view details";

/// Read-only standards catalogue with a single selection. The selection is
/// a weak by-id reference into the fetched list: it never owns a standard
/// and silently resolves to nothing once the list no longer contains it.
pub struct StandardsView {
    standards: Vec<Standard>,
    selected: Option<StandardId>,
    phase: FetchPhase,
    error: Option<String>,
}

impl StandardsView {
    pub fn new() -> Self {
        Self {
            standards: Vec::new(),
            selected: None,
            phase: FetchPhase::Idle,
            error: None,
        }
    }

    /// Mount-time fetch. A failure leaves the list empty and renders a
    /// retry-prompting message; there is no automatic retry.
    pub async fn load(&mut self, gateway: &dyn BackendGateway) {
        if self.phase == FetchPhase::Loading {
            return;
        }
        self.phase = FetchPhase::Loading;
        self.error = None;

        match gateway.list_standards().await {
            Ok(standards) => {
                if let Some(selected) = self.selected {
                    if !standards.iter().any(|standard| standard.id == selected) {
                        self.selected = None;
                    }
                }
                self.standards = standards;
                self.phase = FetchPhase::Success;
            }
            Err(err) => {
                warn!(error = %err, "standards fetch failed");
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
                self.phase = FetchPhase::Failure;
            }
        }
    }

    /// Only ids present in the fetched list take effect.
    pub fn select(&mut self, id: StandardId) -> bool {
        if self.standards.iter().any(|standard| standard.id == id) {
            self.selected = Some(id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&Standard> {
        let id = self.selected?;
        self.standards.iter().find(|standard| standard.id == id)
    }

    pub fn standards(&self) -> &[Standard] {
        &self.standards
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Default for StandardsView {
    fn default() -> Self {
        Self::new()
    }
}
