//! Dashboard stats widget lifecycle.

use shared::protocol::DashboardStats;
use tracing::warn;

use crate::backend::BackendGateway;
use crate::FetchPhase;

pub const STATS_FAILED_MESSAGE: &str = "Live stats unavailable. Retry to refresh.";

/// Read-only stats snapshot, fetched once per mount. Seeded with the
/// hardcoded fallback so the widget never renders empty, and keeping the
/// last good snapshot across failed refreshes.
pub struct DashboardView {
    stats: DashboardStats,
    phase: FetchPhase,
    error: Option<String>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            stats: DashboardStats::fallback(),
            phase: FetchPhase::Idle,
            error: None,
        }
    }

    /// Call once right after construction (the mount-time auto-fetch) and
    /// again on explicit user refresh. No automatic retry.
    pub async fn refresh(&mut self, gateway: &dyn BackendGateway) {
        if self.phase == FetchPhase::Loading {
            return;
        }
        self.phase = FetchPhase::Loading;
        self.error = None;

        match gateway.dashboard_stats().await {
            Ok(stats) => {
                self.stats = stats;
                self.phase = FetchPhase::Success;
            }
            Err(err) => {
                warn!(error = %err, "dashboard stats fetch failed; keeping last known snapshot");
                self.error = Some(STATS_FAILED_MESSAGE.to_string());
                self.phase = FetchPhase::Failure;
            }
        }
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    pub fn phase(&self) -> FetchPhase {
        self.phase
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}
