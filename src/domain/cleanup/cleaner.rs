//! Bulk deletion of knowledge bases and their data sources

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

use super::batch::batch_ranges;
use super::config::CleanupConfig;
use super::confirmation::{is_confirmed, Confirmation, CONFIRMATION_LITERAL};
use super::report::{CleanupOutcome, CleanupReport, FailedDeletion};
use crate::domain::error::DomainError;
use crate::domain::knowledge_base::{DataSourceSummary, KnowledgeBaseAdmin, KnowledgeBaseSummary};
use crate::domain::wait::with_deadline;

/// Deletes every knowledge base in one account/region, children first
pub struct KnowledgeBaseCleaner {
    admin: Arc<dyn KnowledgeBaseAdmin>,
    config: CleanupConfig,
}

impl std::fmt::Debug for KnowledgeBaseCleaner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeBaseCleaner")
            .field("config", &self.config)
            .finish()
    }
}

impl KnowledgeBaseCleaner {
    pub fn new(admin: Arc<dyn KnowledgeBaseAdmin>, config: CleanupConfig) -> Self {
        Self { admin, config }
    }

    /// Enumerates, confirms and deletes all knowledge bases.
    ///
    /// Per-knowledge-base failures are collected in the report; only a failed
    /// listing or an unreadable confirmation aborts the run.
    pub async fn run(
        &self,
        confirmation: &dyn Confirmation,
        skip_confirmation: bool,
    ) -> Result<CleanupReport, DomainError> {
        let knowledge_bases = self.list_knowledge_bases().await?;
        let total = knowledge_bases.len();

        if total == 0 {
            info!("No knowledge bases found to delete");
            return Ok(CleanupReport::empty(
                CleanupOutcome::NothingToDelete,
                self.config.dry_run,
                0,
            ));
        }

        if !self.config.dry_run && !skip_confirmation {
            let prompt = format!(
                "WARNING: this will delete ALL {} knowledge bases and cannot be undone.\n\
                 Type '{}' to confirm: ",
                total, CONFIRMATION_LITERAL
            );
            let answer = confirmation.ask(&prompt).await?;

            if !is_confirmed(&answer) {
                warn!("Operation cancelled");
                return Ok(CleanupReport::empty(
                    CleanupOutcome::Cancelled,
                    self.config.dry_run,
                    total,
                ));
            }
        }

        let batches = batch_ranges(total, self.config.batch_size);
        let mut report = CleanupReport::empty(CleanupOutcome::Completed, self.config.dry_run, total);
        report.batches = batches.len();

        info!(
            total,
            batch_size = self.config.batch_size,
            dry_run = self.config.dry_run,
            "Starting knowledge base deletion"
        );

        for (batch_index, range) in batches.iter().enumerate() {
            info!(
                batch = batch_index + 1,
                first = range.start + 1,
                last = range.end,
                total,
                "Processing batch"
            );

            let batch = &knowledge_bases[range.clone()];

            for (offset, kb) in batch.iter().enumerate() {
                info!(
                    position = range.start + offset + 1,
                    total,
                    name = %kb.name,
                    "Processing knowledge base"
                );

                let started = Instant::now();

                match self.delete_knowledge_base(kb).await {
                    Ok(()) => {
                        report.succeeded += 1;
                        info!(
                            kb_id = %kb.id,
                            elapsed_secs = %format!("{:.1}", started.elapsed().as_secs_f64()),
                            "Completed"
                        );
                    }
                    Err(e) => report.failed.push(FailedDeletion {
                        knowledge_base_id: kb.id.clone(),
                        name: kb.name.clone(),
                        reason: e.to_string(),
                    }),
                }

                if offset + 1 < batch.len() {
                    self.pace(self.config.delays.item).await;
                }
            }

            if batch_index + 1 < batches.len() {
                info!(
                    wait_secs = self.config.delays.batch.as_secs(),
                    "Waiting before next batch"
                );
                self.pace(self.config.delays.batch).await;
            }
        }

        Ok(report)
    }

    /// Lists every knowledge base, pausing between pages
    pub async fn list_knowledge_bases(&self) -> Result<Vec<KnowledgeBaseSummary>, DomainError> {
        info!("Listing knowledge bases");

        let knowledge_bases = with_deadline(
            "list knowledge bases",
            self.config.deadlines.list_knowledge_bases,
            self.collect_knowledge_base_pages(),
        )
        .await?;

        info!(count = knowledge_bases.len(), "Found knowledge bases");

        for (index, kb) in knowledge_bases.iter().enumerate() {
            info!(
                "  {}. {} (ID: {}) - Status: {}",
                index + 1,
                kb.name,
                kb.id,
                kb.status
            );
        }

        Ok(knowledge_bases)
    }

    async fn collect_knowledge_base_pages(&self) -> Result<Vec<KnowledgeBaseSummary>, DomainError> {
        let mut knowledge_bases = Vec::new();
        let mut next_token = None;
        let mut page = 0usize;

        loop {
            if page > 0 && !self.config.delays.page.is_zero() {
                sleep(self.config.delays.page).await;
            }
            page += 1;

            let result = self.admin.list_knowledge_bases(None, next_token.take()).await?;
            debug!(page, count = result.items.len(), "Fetched knowledge base page");
            knowledge_bases.extend(result.items);

            match result.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(knowledge_bases)
    }

    /// Deletes one knowledge base after its data sources
    pub async fn delete_knowledge_base(&self, kb: &KnowledgeBaseSummary) -> Result<(), DomainError> {
        if self.config.dry_run {
            info!(kb_id = %kb.id, name = %kb.name, "[DRY RUN] Would delete knowledge base");
            return Ok(());
        }

        info!(kb_id = %kb.id, name = %kb.name, "Deleting knowledge base");

        let data_sources = self.list_data_sources(&kb.id).await;

        if !data_sources.is_empty() {
            info!(
                kb_id = %kb.id,
                count = data_sources.len(),
                "Deleting data sources first"
            );

            for data_source in &data_sources {
                if let Err(e) = self.delete_data_source(&kb.id, data_source).await {
                    warn!(
                        data_source_id = %data_source.id,
                        error = %e,
                        "Continuing despite data source deletion failure"
                    );
                }
            }

            info!("Waiting for data source deletions to complete");
            self.pace(self.config.delays.settle).await;
        }

        let max_retries = self.config.max_retries;
        let mut last_error = None;

        for attempt in 1..=max_retries {
            debug!(kb_id = %kb.id, attempt, "Attempting knowledge base deletion");

            let result = with_deadline(
                "delete knowledge base",
                self.config.deadlines.delete_knowledge_base,
                self.admin.delete_knowledge_base(&kb.id),
            )
            .await;

            match result {
                Ok(()) => {
                    info!(kb_id = %kb.id, name = %kb.name, "Deleted knowledge base");
                    return Ok(());
                }
                Err(e) => {
                    if attempt < max_retries {
                        warn!(
                            kb_id = %kb.id,
                            attempt,
                            error = %e,
                            retry_in_secs = self.config.delays.knowledge_base_retry.as_secs(),
                            "Knowledge base deletion failed, retrying"
                        );
                        self.pace(self.config.delays.knowledge_base_retry).await;
                    } else {
                        error!(
                            kb_id = %kb.id,
                            name = %kb.name,
                            attempts = max_retries,
                            error = %e,
                            "Failed to delete knowledge base"
                        );
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DomainError::internal("No deletion attempt was made")))
    }

    /// Lists the data sources of a knowledge base; failures yield an empty list
    async fn list_data_sources(&self, kb_id: &str) -> Vec<DataSourceSummary> {
        debug!(kb_id, "Listing data sources");

        let result = with_deadline(
            "list data sources",
            self.config.deadlines.list_data_sources,
            self.admin.list_data_sources(kb_id),
        )
        .await;

        match result {
            Ok(data_sources) => {
                debug!(kb_id, count = data_sources.len(), "Found data sources");
                data_sources
            }
            Err(e) => {
                warn!(kb_id, error = %e, "Could not list data sources");
                Vec::new()
            }
        }
    }

    /// Deletes a data source, applying the vector-store workaround between attempts
    async fn delete_data_source(
        &self,
        kb_id: &str,
        data_source: &DataSourceSummary,
    ) -> Result<(), DomainError> {
        let max_retries = self.config.max_retries;
        let mut last_error = None;

        info!(
            data_source_id = %data_source.id,
            name = %data_source.name,
            "Deleting data source"
        );

        for attempt in 1..=max_retries {
            debug!(data_source_id = %data_source.id, attempt, "Attempting data source deletion");

            let result = with_deadline(
                "delete data source",
                self.config.deadlines.delete_data_source,
                self.admin.delete_data_source(kb_id, &data_source.id),
            )
            .await;

            match result {
                Ok(()) => {
                    info!(data_source_id = %data_source.id, "Deleted data source");
                    return Ok(());
                }
                Err(e) if e.is_timeout() && attempt < max_retries => {
                    warn!(
                        data_source_id = %data_source.id,
                        attempt,
                        "Timed out deleting data source, retrying"
                    );
                    self.pace(self.config.delays.timeout_retry).await;
                    last_error = Some(e);
                }
                Err(e) if e.is_vector_store_error() && attempt < max_retries => {
                    warn!(
                        data_source_id = %data_source.id,
                        attempt,
                        "Vector store error, updating deletion policy"
                    );
                    self.retain_data_source_data(kb_id, &data_source.id).await;
                    self.pace(self.config.delays.vector_store_retry).await;
                    last_error = Some(e);
                }
                Err(e) => {
                    error!(
                        data_source_id = %data_source.id,
                        attempt,
                        error = %e,
                        "Failed to delete data source"
                    );
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| DomainError::internal("No deletion attempt was made")))
    }

    /// Switches the data deletion policy to `RETAIN`; failures are only logged
    async fn retain_data_source_data(&self, kb_id: &str, data_source_id: &str) {
        debug!(data_source_id, "Updating deletion policy");

        let result = with_deadline(
            "update data source deletion policy",
            self.config.deadlines.update_deletion_policy,
            self.admin.retain_data_source_data(kb_id, data_source_id),
        )
        .await;

        match result {
            Ok(()) => info!(data_source_id, "Updated data source deletion policy to RETAIN"),
            Err(e) => warn!(
                data_source_id,
                error = %e,
                "Failed to update data source deletion policy"
            ),
        }
    }

    async fn pace(&self, delay: Duration) {
        if self.config.dry_run || delay.is_zero() {
            return;
        }
        sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::cleanup::config::CleanupDelays;
    use crate::domain::cleanup::confirmation::MockConfirmation;
    use crate::domain::knowledge_base::{
        CreateDataSourceRequest, CreateKnowledgeBaseRequest, IngestionJob, KnowledgeBasePage,
        MockKnowledgeBaseAdmin,
    };

    type CallLog = Arc<Mutex<Vec<String>>>;

    fn kb(n: usize) -> KnowledgeBaseSummary {
        KnowledgeBaseSummary::new(format!("KB{}", n), format!("kb-{}", n), "ACTIVE")
    }

    fn ds(n: usize) -> DataSourceSummary {
        DataSourceSummary::new(format!("DS{}", n), format!("ds-{}", n), "AVAILABLE")
    }

    fn vector_store_error() -> DomainError {
        DomainError::provider(
            "bedrock-agent",
            "ValidationException: Unable to delete data from vector store for data source",
        )
    }

    fn quiet_config() -> CleanupConfig {
        CleanupConfig::default().with_delays(CleanupDelays::none())
    }

    fn expect_single_page(admin: &mut MockKnowledgeBaseAdmin, items: Vec<KnowledgeBaseSummary>) {
        admin
            .expect_list_knowledge_bases()
            .times(1)
            .returning(move |_, _| {
                Ok(KnowledgeBasePage {
                    items: items.clone(),
                    next_token: None,
                })
            });
    }

    fn no_confirmation() -> MockConfirmation {
        let mut confirmation = MockConfirmation::new();
        confirmation.expect_ask().never();
        confirmation
    }

    fn answering(answer: &'static str) -> MockConfirmation {
        let mut confirmation = MockConfirmation::new();
        confirmation
            .expect_ask()
            .times(1)
            .returning(move |_| Ok(answer.to_string()));
        confirmation
    }

    /// Admin whose first `stalls` data source deletions never answer
    #[derive(Default)]
    struct StallingAdmin {
        stalls: u32,
        data_source_deletes: AtomicU32,
        retains: AtomicU32,
        knowledge_base_deletes: AtomicU32,
    }

    impl StallingAdmin {
        fn stalling(stalls: u32) -> Self {
            Self {
                stalls,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl KnowledgeBaseAdmin for StallingAdmin {
        async fn list_knowledge_bases(
            &self,
            _max_results: Option<i32>,
            _next_token: Option<String>,
        ) -> Result<KnowledgeBasePage, DomainError> {
            unreachable!("not listed in these tests")
        }

        async fn list_data_sources(
            &self,
            _knowledge_base_id: &str,
        ) -> Result<Vec<DataSourceSummary>, DomainError> {
            Ok(vec![ds(1)])
        }

        async fn retain_data_source_data(
            &self,
            _knowledge_base_id: &str,
            _data_source_id: &str,
        ) -> Result<(), DomainError> {
            self.retains.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn delete_data_source(
            &self,
            _knowledge_base_id: &str,
            _data_source_id: &str,
        ) -> Result<(), DomainError> {
            let call = self.data_source_deletes.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.stalls {
                sleep(Duration::from_secs(3600)).await;
            }
            Ok(())
        }

        async fn delete_knowledge_base(&self, _knowledge_base_id: &str) -> Result<(), DomainError> {
            self.knowledge_base_deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn create_knowledge_base(
            &self,
            _request: CreateKnowledgeBaseRequest,
        ) -> Result<String, DomainError> {
            unreachable!("cleanup never creates")
        }

        async fn get_knowledge_base_status(
            &self,
            _knowledge_base_id: &str,
        ) -> Result<String, DomainError> {
            unreachable!("cleanup never polls")
        }

        async fn create_data_source(
            &self,
            _request: CreateDataSourceRequest,
        ) -> Result<String, DomainError> {
            unreachable!("cleanup never creates")
        }

        async fn start_ingestion_job(
            &self,
            _knowledge_base_id: &str,
            _data_source_id: &str,
        ) -> Result<IngestionJob, DomainError> {
            unreachable!("cleanup never ingests")
        }

        async fn get_ingestion_job(
            &self,
            _knowledge_base_id: &str,
            _data_source_id: &str,
            _ingestion_job_id: &str,
        ) -> Result<IngestionJob, DomainError> {
            unreachable!("cleanup never ingests")
        }
    }

    fn timeout_retry_config() -> CleanupConfig {
        let delays = CleanupDelays {
            timeout_retry: Duration::from_secs(5),
            ..CleanupDelays::none()
        };
        CleanupConfig::default().with_delays(delays)
    }

    #[tokio::test(start_paused = true)]
    async fn test_data_source_timeout_pauses_then_retries() {
        let admin = Arc::new(StallingAdmin::stalling(1));
        let config = timeout_retry_config();
        let deadline = config.deadlines.delete_data_source;
        let cleaner = KnowledgeBaseCleaner::new(admin.clone(), config);

        let started = Instant::now();
        cleaner.delete_knowledge_base(&kb(1)).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(admin.data_source_deletes.load(Ordering::SeqCst), 2);
        assert_eq!(admin.retains.load(Ordering::SeqCst), 0);
        assert_eq!(admin.knowledge_base_deletes.load(Ordering::SeqCst), 1);
        assert!(
            elapsed >= deadline + Duration::from_secs(5),
            "elapsed {:?}",
            elapsed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_data_source_timeouts_give_up_after_max_retries() {
        let admin = Arc::new(StallingAdmin::stalling(u32::MAX));
        let config = timeout_retry_config().with_max_retries(3);
        let deadline = config.deadlines.delete_data_source;
        let cleaner = KnowledgeBaseCleaner::new(admin.clone(), config);

        let started = Instant::now();
        let result = cleaner.delete_knowledge_base(&kb(1)).await;
        let elapsed = started.elapsed();

        // The parent is still deleted after the data source is abandoned.
        assert!(result.is_ok());
        assert_eq!(admin.data_source_deletes.load(Ordering::SeqCst), 3);
        assert_eq!(admin.retains.load(Ordering::SeqCst), 0);
        assert_eq!(admin.knowledge_base_deletes.load(Ordering::SeqCst), 1);
        assert!(
            elapsed >= deadline * 3 + Duration::from_secs(10),
            "elapsed {:?}",
            elapsed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_knowledge_base_retry_waits_between_attempts() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        admin.expect_list_data_sources().returning(|_| Ok(vec![]));

        let mut attempts = 0;
        admin
            .expect_delete_knowledge_base()
            .times(3)
            .returning(move |_| {
                attempts += 1;
                if attempts < 3 {
                    Err(DomainError::provider("bedrock-agent", "ConflictException: deleting"))
                } else {
                    Ok(())
                }
            });

        let delays = CleanupDelays {
            knowledge_base_retry: Duration::from_secs(15),
            ..CleanupDelays::none()
        };
        let cleaner =
            KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config().with_delays(delays));

        let started = Instant::now();
        cleaner.delete_knowledge_base(&kb(1)).await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_secs(30), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(31), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_data_sources_deleted_before_knowledge_base() {
        let log: CallLog = Arc::default();
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, vec![kb(1)]);

        admin
            .expect_list_data_sources()
            .withf(|kb_id| kb_id == "KB1")
            .returning(|_| Ok(vec![ds(1), ds(2), ds(3)]));

        let ds_log = log.clone();
        admin
            .expect_delete_data_source()
            .times(3)
            .returning(move |_, ds_id| {
                ds_log.lock().unwrap().push(format!("ds:{}", ds_id));
                Ok(())
            });

        let kb_log = log.clone();
        admin
            .expect_delete_knowledge_base()
            .times(1)
            .returning(move |kb_id| {
                kb_log.lock().unwrap().push(format!("kb:{}", kb_id));
                Ok(())
            });
        admin.expect_retain_data_source_data().never();

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        let report = cleaner.run(&no_confirmation(), true).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["ds:DS1", "ds:DS2", "ds:DS3", "kb:KB1"]
        );
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.outcome, CleanupOutcome::Completed);
    }

    #[tokio::test]
    async fn test_vector_store_error_updates_policy_then_retries_once() {
        let log: CallLog = Arc::default();
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, vec![kb(1)]);
        admin
            .expect_list_data_sources()
            .returning(|_| Ok(vec![ds(1)]));

        let ds_log = log.clone();
        let mut attempts = 0;
        admin
            .expect_delete_data_source()
            .times(2)
            .returning(move |_, _| {
                attempts += 1;
                ds_log.lock().unwrap().push("delete".to_string());
                if attempts == 1 {
                    Err(vector_store_error())
                } else {
                    Ok(())
                }
            });

        let retain_log = log.clone();
        admin
            .expect_retain_data_source_data()
            .withf(|kb_id, ds_id| kb_id == "KB1" && ds_id == "DS1")
            .times(1)
            .returning(move |_, _| {
                retain_log.lock().unwrap().push("retain".to_string());
                Ok(())
            });
        admin.expect_delete_knowledge_base().times(1).returning(|_| Ok(()));

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        cleaner.run(&no_confirmation(), true).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["delete", "retain", "delete"]);
    }

    #[tokio::test]
    async fn test_vector_store_workaround_is_bounded() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, vec![kb(1)]);
        admin
            .expect_list_data_sources()
            .returning(|_| Ok(vec![ds(1)]));
        admin
            .expect_delete_data_source()
            .times(3)
            .returning(|_, _| Err(vector_store_error()));
        admin
            .expect_retain_data_source_data()
            .times(2)
            .returning(|_, _| Ok(()));
        admin.expect_delete_knowledge_base().times(1).returning(|_| Ok(()));

        let config = quiet_config().with_max_retries(3);
        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), config);
        let report = cleaner.run(&no_confirmation(), true).await.unwrap();

        // The parent deletion is still attempted and succeeds.
        assert_eq!(report.succeeded, 1);
    }

    #[tokio::test]
    async fn test_failed_policy_update_does_not_stop_retry() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, vec![kb(1)]);
        admin
            .expect_list_data_sources()
            .returning(|_| Ok(vec![ds(1)]));

        let mut attempts = 0;
        admin
            .expect_delete_data_source()
            .times(2)
            .returning(move |_, _| {
                attempts += 1;
                if attempts == 1 {
                    Err(vector_store_error())
                } else {
                    Ok(())
                }
            });
        admin
            .expect_retain_data_source_data()
            .times(1)
            .returning(|_, _| Err(DomainError::provider("bedrock-agent", "AccessDenied")));
        admin.expect_delete_knowledge_base().times(1).returning(|_| Ok(()));

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        let report = cleaner.run(&no_confirmation(), true).await.unwrap();

        assert_eq!(report.succeeded, 1);
    }

    #[tokio::test]
    async fn test_other_data_source_errors_are_not_retried() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, vec![kb(1)]);
        admin
            .expect_list_data_sources()
            .returning(|_| Ok(vec![ds(1)]));
        admin
            .expect_delete_data_source()
            .times(1)
            .returning(|_, _| Err(DomainError::provider("bedrock-agent", "AccessDenied")));
        admin.expect_retain_data_source_data().never();
        admin.expect_delete_knowledge_base().times(1).returning(|_| Ok(()));

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        cleaner.run(&no_confirmation(), true).await.unwrap();
    }

    #[tokio::test]
    async fn test_dry_run_issues_no_mutating_calls() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, (1..=7).map(kb).collect());
        admin.expect_list_data_sources().never();
        admin.expect_delete_data_source().never();
        admin.expect_retain_data_source_data().never();
        admin.expect_delete_knowledge_base().never();

        let config = CleanupConfig::default().with_dry_run(true);
        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), config);
        let report = cleaner.run(&no_confirmation(), false).await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.succeeded, 7);
        assert_eq!(report.processed(), report.total);
    }

    #[tokio::test]
    async fn test_wrong_confirmation_aborts_without_mutations() {
        for answer in ["delete", "yes", "", "DELETE please"] {
            let mut admin = MockKnowledgeBaseAdmin::new();
            expect_single_page(&mut admin, vec![kb(1), kb(2)]);
            admin.expect_list_data_sources().never();
            admin.expect_delete_data_source().never();
            admin.expect_retain_data_source_data().never();
            admin.expect_delete_knowledge_base().never();

            let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
            let report = cleaner.run(&answering(answer), false).await.unwrap();

            assert_eq!(report.outcome, CleanupOutcome::Cancelled);
            assert_eq!(report.processed(), 0);
        }
    }

    #[tokio::test]
    async fn test_exact_confirmation_proceeds() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, vec![kb(1)]);
        admin.expect_list_data_sources().returning(|_| Ok(vec![]));
        admin.expect_delete_knowledge_base().times(1).returning(|_| Ok(()));

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        let report = cleaner.run(&answering("DELETE\n"), false).await.unwrap();

        assert_eq!(report.outcome, CleanupOutcome::Completed);
        assert_eq!(report.succeeded, 1);
    }

    #[tokio::test]
    async fn test_nothing_to_delete() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, vec![]);

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        let report = cleaner.run(&no_confirmation(), false).await.unwrap();

        assert_eq!(report.outcome, CleanupOutcome::NothingToDelete);
        assert_eq!(report.total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_pause_only_between_groups() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, (1..=5).map(kb).collect());
        admin.expect_list_data_sources().returning(|_| Ok(vec![]));
        admin.expect_delete_knowledge_base().times(5).returning(|_| Ok(()));

        let delays = CleanupDelays {
            item: Duration::from_secs(2),
            batch: Duration::from_secs(10),
            ..CleanupDelays::none()
        };
        let config = quiet_config().with_batch_size(2).with_delays(delays);
        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), config);

        let started = Instant::now();
        let report = cleaner.run(&no_confirmation(), true).await.unwrap();
        let elapsed = started.elapsed();

        // Groups of 2, 2 and 1: one item pause in each full group, two batch pauses.
        assert_eq!(report.batches, 3);
        assert!(elapsed >= Duration::from_secs(24), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(25), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_summary_counts_cover_every_knowledge_base() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        expect_single_page(&mut admin, (1..=4).map(kb).collect());
        admin.expect_list_data_sources().returning(|_| Ok(vec![]));
        admin
            .expect_delete_knowledge_base()
            .returning(|kb_id| {
                if kb_id == "KB2" {
                    Err(DomainError::provider("bedrock-agent", "ConflictException: in use"))
                } else {
                    Ok(())
                }
            });

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        let report = cleaner.run(&no_confirmation(), true).await.unwrap();

        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failed[0].knowledge_base_id, "KB2");
        assert_eq!(report.succeeded + report.failure_count(), report.total);
    }

    #[tokio::test]
    async fn test_knowledge_base_deletion_retries_then_gives_up() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        admin.expect_list_data_sources().returning(|_| Ok(vec![]));
        admin
            .expect_delete_knowledge_base()
            .times(3)
            .returning(|_| Err(DomainError::provider("bedrock-agent", "InternalServerException")));

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        let result = cleaner.delete_knowledge_base(&kb(1)).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_data_source_listing_failure_still_deletes_parent() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        admin
            .expect_list_data_sources()
            .returning(|_| Err(DomainError::provider("bedrock-agent", "ThrottlingException")));
        admin.expect_delete_data_source().never();
        admin.expect_delete_knowledge_base().times(1).returning(|_| Ok(()));

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        assert!(cleaner.delete_knowledge_base(&kb(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_listing_follows_pagination() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        admin
            .expect_list_knowledge_bases()
            .withf(|_, token| token.is_none())
            .times(1)
            .returning(|_, _| {
                Ok(KnowledgeBasePage {
                    items: vec![kb(1), kb(2)],
                    next_token: Some("page-2".to_string()),
                })
            });
        admin
            .expect_list_knowledge_bases()
            .withf(|_, token| token.as_deref() == Some("page-2"))
            .times(1)
            .returning(|_, _| {
                Ok(KnowledgeBasePage {
                    items: vec![kb(3)],
                    next_token: None,
                })
            });

        let cleaner = KnowledgeBaseCleaner::new(Arc::new(admin), quiet_config());
        let listed = cleaner.list_knowledge_bases().await.unwrap();

        assert_eq!(
            listed.iter().map(|kb| kb.id.as_str()).collect::<Vec<_>>(),
            vec!["KB1", "KB2", "KB3"]
        );
    }
}
