use serde::{Deserialize, Serialize};

/// Where the server side scheduler is in its tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerPhase {
    Idle,
    Evaluating,
    Dispatching,
}

impl Default for SchedulerPhase {
    fn default() -> Self {
        Self::Idle
    }
}

/// Aggregate outcome of fanning one due event out to the devices of its owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
    /// Endpoints removed from the registry because they are gone for good
    pub pruned: usize,
}

/// Summary of one scheduler tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// Millis timestamp the tick evaluated
    pub timestamp: i64,
    pub evaluated: usize,
    pub due: usize,
    /// Items that could not be evaluated
    pub skipped: usize,
    pub delivered: usize,
    pub failed: usize,
    pub deactivated: usize,
}

impl TickReport {
    pub fn add_dispatch(&mut self, report: &DispatchReport) {
        self.delivered += report.delivered;
        self.failed += report.failed;
    }
}
