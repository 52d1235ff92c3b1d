use serde::Serialize;

/// How a cleanup run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupOutcome {
    /// Nothing was enumerated
    NothingToDelete,
    /// The operator declined the confirmation prompt
    Cancelled,
    /// Every enumerated knowledge base was processed
    Completed,
}

/// A knowledge base that could not be deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDeletion {
    pub knowledge_base_id: String,
    pub name: String,
    pub reason: String,
}

/// Result of a cleanup run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub outcome: CleanupOutcome,
    pub dry_run: bool,
    pub total: usize,
    pub batches: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedDeletion>,
}

impl CleanupReport {
    pub fn empty(outcome: CleanupOutcome, dry_run: bool, total: usize) -> Self {
        Self {
            outcome,
            dry_run,
            total,
            batches: 0,
            succeeded: 0,
            failed: Vec::new(),
        }
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn processed(&self) -> usize {
        self.succeeded + self.failed.len()
    }

    /// Percentage of processed knowledge bases that were deleted
    pub fn success_rate(&self) -> Option<f64> {
        let processed = self.processed();

        if processed == 0 {
            return None;
        }

        Some(self.succeeded as f64 / processed as f64 * 100.0)
    }
}
