//! Clean command - deletes every knowledge base in the selected region

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use tracing::{error, info};

use crate::domain::cleanup::{CleanupOutcome, CleanupReport, KnowledgeBaseCleaner};
use crate::domain::knowledge_base::KnowledgeBaseAdmin;
use crate::domain::{with_deadline, DomainError};
use crate::infrastructure::aws::{load_sdk_config, verify_credentials};
use crate::infrastructure::{BedrockAgentClient, StdinConfirmation};

/// Arguments for the clean command
#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    /// AWS region (overrides config)
    #[arg(long)]
    pub region: Option<String>,

    /// List what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the interactive confirmation prompt
    #[arg(long)]
    pub confirm: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Knowledge bases per batch (overrides config)
    #[arg(long)]
    pub batch_size: Option<usize>,
}

/// Run the cleanup
pub async fn run(args: CleanArgs) -> anyhow::Result<()> {
    let config = super::bootstrap(args.debug);

    let sdk_config = load_sdk_config(&config.aws, args.region.as_deref()).await;
    verify_credentials(&sdk_config)
        .await
        .context("AWS credentials check failed")?;

    let mut cleanup = config.cleanup.to_cleanup_config().with_dry_run(args.dry_run);
    if let Some(batch_size) = args.batch_size {
        cleanup = cleanup.with_batch_size(batch_size);
    }

    let admin: Arc<dyn KnowledgeBaseAdmin> = Arc::new(BedrockAgentClient::new(&sdk_config));
    probe_access(admin.as_ref(), cleanup.deadlines.list_knowledge_bases)
        .await
        .context("Bedrock access check failed")?;

    if cleanup.dry_run {
        info!("DRY RUN MODE - no resources will be deleted");
    }

    let cleaner = KnowledgeBaseCleaner::new(admin, cleanup);
    let report = cleaner.run(&StdinConfirmation, args.confirm).await?;

    for failure in &report.failed {
        error!(
            kb_id = %failure.knowledge_base_id,
            name = %failure.name,
            reason = %failure.reason,
            "Knowledge base was not deleted"
        );
    }

    print!("{}", render_summary(&report));
    Ok(())
}

/// Lists a single knowledge base to confirm the caller can reach Bedrock
async fn probe_access(
    admin: &dyn KnowledgeBaseAdmin,
    limit: Duration,
) -> Result<(), DomainError> {
    with_deadline("access check", limit, admin.list_knowledge_bases(Some(1), None)).await?;

    info!("Bedrock access verified");
    Ok(())
}

/// Human-readable end-of-run summary
pub fn render_summary(report: &CleanupReport) -> String {
    match report.outcome {
        CleanupOutcome::NothingToDelete => {
            return "No knowledge bases found to delete.\n".into();
        }
        CleanupOutcome::Cancelled => return "Operation cancelled. Nothing was deleted.\n".into(),
        CleanupOutcome::Completed => {}
    }

    let rule = "=".repeat(50);
    let heading = if report.dry_run {
        "DRY RUN SUMMARY"
    } else {
        "DELETION SUMMARY"
    };

    let mut lines = vec![
        String::new(),
        rule.clone(),
        heading.to_string(),
        rule,
        format!("Knowledge bases found: {}", report.total),
        format!("Batches processed:     {}", report.batches),
    ];

    if report.dry_run {
        lines.push(format!("Would be deleted:      {}", report.succeeded));
    } else {
        lines.push(format!("Successfully deleted:  {}", report.succeeded));
    }
    lines.push(format!("Failed:                {}", report.failure_count()));

    if let Some(rate) = report.success_rate() {
        lines.push(format!("Success rate:          {:.1}%", rate));
    }

    if report.failure_count() > 0 {
        lines.push(String::new());
        lines.push("Failed knowledge bases:".into());
        lines.extend(report.failed.iter().map(|failure| {
            format!(
                "  - {} ({}): {}",
                failure.name, failure.knowledge_base_id, failure.reason
            )
        }));

        lines.push(String::new());
        lines.push("Troubleshooting:".into());
        lines.extend(TROUBLESHOOTING.iter().map(|hint| format!("  - {}", hint)));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

const TROUBLESHOOTING: [&str; 4] = [
    "Check vector store permissions (OpenSearch Serverless data access policies)",
    "Manually delete the vector store resources left behind by failed knowledge bases",
    "Contact AWS Support if vector store deletions keep failing",
    "Re-run the command to retry the failed deletions",
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cleanup::FailedDeletion;
    use crate::domain::knowledge_base::{KnowledgeBasePage, MockKnowledgeBaseAdmin};

    #[tokio::test]
    async fn test_probe_requests_a_single_item() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        admin
            .expect_list_knowledge_bases()
            .withf(|max_results, next_token| *max_results == Some(1) && next_token.is_none())
            .times(1)
            .returning(|_, _| Ok(KnowledgeBasePage::default()));

        assert!(probe_access(&admin, Duration::from_secs(60)).await.is_ok());
    }

    #[tokio::test]
    async fn test_probe_failure_is_reported() {
        let mut admin = MockKnowledgeBaseAdmin::new();
        admin
            .expect_list_knowledge_bases()
            .returning(|_, _| Err(DomainError::provider("bedrock-agent", "AccessDeniedException")));

        let err = probe_access(&admin, Duration::from_secs(60)).await.unwrap_err();

        assert!(err.to_string().contains("AccessDeniedException"));
    }

    #[test]
    fn test_summary_with_failures_has_hints() {
        let mut report = CleanupReport::empty(CleanupOutcome::Completed, false, 3);
        report.batches = 1;
        report.succeeded = 2;
        report.failed.push(FailedDeletion {
            knowledge_base_id: "KB3".into(),
            name: "legacy".into(),
            reason: "Provider error: AccessDenied".into(),
        });

        let summary = render_summary(&report);

        assert!(summary.contains("DELETION SUMMARY"));
        assert!(summary.contains("Successfully deleted:  2"));
        assert!(summary.contains("Failed:                1"));
        assert!(summary.contains("Success rate:          66.7%"));
        assert!(summary.contains("legacy (KB3)"));
        assert!(summary.contains("Troubleshooting"));
        assert!(summary.contains("Check vector store permissions"));
        assert!(summary.contains("Manually delete the vector store resources"));
        assert!(summary.contains("Contact AWS Support"));
        assert!(summary.contains("Re-run the command to retry"));
        assert!(summary.ends_with('\n'));
    }

    #[test]
    fn test_dry_run_summary() {
        let mut report = CleanupReport::empty(CleanupOutcome::Completed, true, 2);
        report.batches = 1;
        report.succeeded = 2;

        let summary = render_summary(&report);

        assert!(summary.contains("DRY RUN SUMMARY"));
        assert!(summary.contains("Would be deleted:      2"));
        assert!(!summary.contains("Troubleshooting"));
    }

    #[test]
    fn test_cancelled_summary() {
        let report = CleanupReport::empty(CleanupOutcome::Cancelled, false, 4);
        assert!(render_summary(&report).contains("cancelled"));
    }
}
