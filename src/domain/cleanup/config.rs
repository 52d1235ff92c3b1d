use std::time::Duration;

/// Deadlines applied to individual provider calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallDeadlines {
    pub list_knowledge_bases: Duration,
    pub list_data_sources: Duration,
    pub update_deletion_policy: Duration,
    pub delete_data_source: Duration,
    pub delete_knowledge_base: Duration,
}

impl Default for CallDeadlines {
    fn default() -> Self {
        Self {
            list_knowledge_bases: Duration::from_secs(60),
            list_data_sources: Duration::from_secs(30),
            update_deletion_policy: Duration::from_secs(30),
            delete_data_source: Duration::from_secs(45),
            delete_knowledge_base: Duration::from_secs(60),
        }
    }
}

/// Fixed pauses between calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupDelays {
    /// Between knowledge base list pages
    pub page: Duration,
    /// Before retrying a data source deletion that hit its deadline
    pub timeout_retry: Duration,
    /// Before retrying a data source deletion after the vector-store workaround
    pub vector_store_retry: Duration,
    /// After the data sources of a knowledge base were deleted
    pub settle: Duration,
    /// Before retrying a knowledge base deletion
    pub knowledge_base_retry: Duration,
    /// Between knowledge bases of the same batch
    pub item: Duration,
    /// Between batches
    pub batch: Duration,
}

impl Default for CleanupDelays {
    fn default() -> Self {
        Self {
            page: Duration::from_millis(500),
            timeout_retry: Duration::from_secs(5),
            vector_store_retry: Duration::from_secs(3),
            settle: Duration::from_secs(8),
            knowledge_base_retry: Duration::from_secs(15),
            item: Duration::from_secs(2),
            batch: Duration::from_secs(10),
        }
    }
}

impl CleanupDelays {
    /// No pauses at all
    pub fn none() -> Self {
        Self {
            page: Duration::ZERO,
            timeout_retry: Duration::ZERO,
            vector_store_retry: Duration::ZERO,
            settle: Duration::ZERO,
            knowledge_base_retry: Duration::ZERO,
            item: Duration::ZERO,
            batch: Duration::ZERO,
        }
    }
}

/// Behaviour of a cleanup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    pub dry_run: bool,
    pub batch_size: usize,
    /// Attempts per deletion, including the first
    pub max_retries: u32,
    pub deadlines: CallDeadlines,
    pub delays: CleanupDelays,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            batch_size: 5,
            max_retries: 3,
            deadlines: CallDeadlines::default(),
            delays: CleanupDelays::default(),
        }
    }
}

impl CleanupConfig {
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_delays(mut self, delays: CleanupDelays) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_deadlines(mut self, deadlines: CallDeadlines) -> Self {
        self.deadlines = deadlines;
        self
    }
}
