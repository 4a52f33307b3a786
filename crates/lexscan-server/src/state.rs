use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use lexscan_analysis::ContractAnalyzer;
use lexscan_core::api_types::{AnalysisRunState, AnalysisRunStatus};
use lexscan_core::{AnalysisReport, AppConfig};

/// Most recent runs kept in memory; older finished runs and their reports are dropped.
pub const MAX_TRACKED_RUNS: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub analyzer: Arc<ContractAnalyzer>,
    pub runs: Arc<RwLock<Vec<AnalysisRunStatus>>>,
    pub reports: Arc<RwLock<HashMap<String, AnalysisReport>>>,
}

impl AppState {
    pub fn new(config: AppConfig, analyzer: Arc<ContractAnalyzer>) -> Self {
        Self {
            config,
            analyzer,
            runs: Arc::new(RwLock::new(Vec::new())),
            reports: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record a new run and trim the history back to [`MAX_TRACKED_RUNS`].
    pub async fn track_run(&self, run: AnalysisRunStatus) {
        let mut runs = self.runs.write().await;
        let mut reports = self.reports.write().await;
        runs.push(run);
        trim_runs(&mut runs, &mut reports);
    }
}

/// Drop the oldest finished runs until at most [`MAX_TRACKED_RUNS`] remain.
/// Running runs are never dropped, so the list may exceed the cap while they are in flight.
pub(crate) fn trim_runs(
    runs: &mut Vec<AnalysisRunStatus>,
    reports: &mut HashMap<String, AnalysisReport>,
) {
    let mut excess = runs.len().saturating_sub(MAX_TRACKED_RUNS);
    if excess == 0 {
        return;
    }

    runs.retain(|run| {
        if excess > 0 && run.status != AnalysisRunState::Running {
            excess -= 1;
            reports.remove(&run.analysis_id);
            false
        } else {
            true
        }
    });
}
