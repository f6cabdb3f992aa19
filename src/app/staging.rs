use crate::app::assignment::DomainAssignmentExecutor;
use crate::core::batch::{first_failure, run_bounded};
use crate::core::domain_names::staging_target_host;
use crate::core::planner::plan_all;
use crate::core::task_poller::{TaskPoller, DEFAULT_POLL_INTERVAL};
use crate::core::{
    DestinationAssignment, DestinationConnector, DomainRegistry, Result, SiteDirectory,
    StageRequest, StagingService, TaskTracker, Tier,
};
use std::io::Write;
use std::time::Duration;

/// Everything the staging sequence needs from the source factory.
pub trait SourceFactory: SiteDirectory + StagingService + TaskTracker + DomainRegistry {}

impl<T> SourceFactory for T where T: SiteDirectory + StagingService + TaskTracker + DomainRegistry {}

#[derive(Debug, Clone)]
pub struct StagingOptions {
    pub lookup_concurrency: usize,
    pub assignment_concurrency: usize,
    pub poll_interval: Duration,
}

impl Default for StagingOptions {
    fn default() -> Self {
        Self {
            lookup_concurrency: 3,
            assignment_concurrency: 3,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StagingReport {
    pub task_id: String,
    pub staged_sites: usize,
    pub destination_host: String,
    pub assignments: Vec<DestinationAssignment>,
    pub sites_with_domains: usize,
}

/// Stages every site of a factory to a lower tier and re-creates their
/// custom domains there under tier-specific names.
///
/// Any failed step aborts the run. Nothing is rolled back.
pub struct StagingOrchestrator<'a, S: SourceFactory> {
    source: &'a S,
    connector: &'a dyn DestinationConnector,
    factory_host: String,
    options: StagingOptions,
}

impl<'a, S: SourceFactory> StagingOrchestrator<'a, S> {
    pub fn new(
        source: &'a S,
        connector: &'a dyn DestinationConnector,
        factory_host: impl Into<String>,
        options: StagingOptions,
    ) -> Self {
        Self {
            source,
            connector,
            factory_host: factory_host.into(),
            options,
        }
    }

    pub async fn run(
        &self,
        tier: Tier,
        on_progress: Option<&(dyn Fn(bool) + Send + Sync)>,
    ) -> Result<StagingReport> {
        let sites = self.source.list_sites().await?;
        let site_ids: Vec<u64> = sites.iter().map(|site| site.id).collect();
        tracing::info!("📋 Found {} sites on {}", site_ids.len(), self.factory_host);

        let request = StageRequest {
            to_env: tier.to_string(),
            sites: site_ids.clone(),
            wipe_target_environment: true,
            synchronize_all_users: true,
            detailed_status: false,
        };
        let task = self.source.stage(&request).await?;
        tracing::info!("🚀 Staging to '{}' started as task {}", tier, task.task_id);

        let status = TaskPoller::new(self.source)
            .with_interval(self.options.poll_interval)
            .wait_for_completion(&task.task_id, on_progress)
            .await?;
        tracing::info!(
            "✅ Done staging to '{}' environment ({})",
            tier,
            status.status_string
        );

        let destination_host = staging_target_host(&self.factory_host, tier.as_str())?;

        // 全部規劃成功才開始套用，避免半套用
        let records = first_failure(
            run_bounded(site_ids, self.options.lookup_concurrency, |site_id| {
                self.source.get_domains(site_id)
            })
            .await?,
        )?;
        let assignments = plan_all(&records, tier.as_str())?;

        tracing::info!(
            "🌐 Assigning domains for {} sites on {}",
            assignments.len(),
            destination_host
        );
        let destination = self.connector.connect(&destination_host)?;
        let sites_with_domains =
            DomainAssignmentExecutor::new(destination.as_ref(), self.options.assignment_concurrency)
                .apply(&assignments)
                .await?;

        Ok(StagingReport {
            task_id: task.task_id,
            staged_sites: sites.len(),
            destination_host,
            assignments,
            sites_with_domains,
        })
    }
}

/// Progress pulse for interactive runs: one dot per poll, newline when done.
pub fn show_progress(completed: bool) {
    if let Err(e) = write_progress(&mut std::io::stdout().lock(), completed) {
        tracing::debug!("Could not write progress: {}", e);
    }
}

fn write_progress(out: &mut impl Write, completed: bool) -> std::io::Result<()> {
    write!(out, "{}", if completed { ".\n" } else { "." })?;
    out.flush()
}
