use crate::core::batch::run_bounded;
use crate::core::task_poller::{TaskPoller, DEFAULT_POLL_INTERVAL};
use crate::core::{Notifier, Result, SiteDirectory, SiteInfo, TaskRef, TaskTracker};
use crate::utils::error::MigrateError;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BackupOptions {
    pub concurrency: usize,
    /// Wait for every backup task before reporting. When off, the run stops
    /// once the tasks are queued.
    pub wait_for_completion: bool,
    pub poll_interval: Duration,
}

impl Default for BackupOptions {
    fn default() -> Self {
        Self {
            concurrency: 3,
            wait_for_completion: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupStatus {
    /// Tasks were queued but not waited on.
    Started,
    Succeeded,
    CompletedWithProblems,
    /// The run could not get going (e.g. the site list failed).
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReport {
    pub status: BackupStatus,
    pub sites: usize,
    pub tasks: Vec<String>,
    pub failures: Vec<String>,
}

/// Backs up every site of a factory and reports the outcome through a notifier.
pub struct BackupOrchestrator<'a, S: SiteDirectory + TaskTracker> {
    source: &'a S,
    notifier: &'a dyn Notifier,
    options: BackupOptions,
}

impl<'a, S: SiteDirectory + TaskTracker> BackupOrchestrator<'a, S> {
    pub fn new(source: &'a S, notifier: &'a dyn Notifier, options: BackupOptions) -> Self {
        Self {
            source,
            notifier,
            options,
        }
    }

    /// Run the backups. Failures never escape: they end up in the report and
    /// in the notification.
    pub async fn run(&self) -> BackupReport {
        self.send(&format!("ACSF backups started at {}.", now()), None)
            .await;

        match self.execute().await {
            Ok(report) => {
                self.announce(&report).await;
                report
            }
            Err(e) => {
                tracing::error!("❌ Backup run failed: {}", e);
                self.send("Something went wrong backing up ACSF.", Some(&e.to_string()))
                    .await;
                BackupReport {
                    status: BackupStatus::Failed(e.to_string()),
                    sites: 0,
                    tasks: vec![],
                    failures: vec![],
                }
            }
        }
    }

    async fn execute(&self) -> Result<BackupReport> {
        let sites = self.source.list_sites().await?;
        tracing::info!("📋 Backing up {} sites", sites.len());

        let poller = TaskPoller::new(self.source).with_interval(self.options.poll_interval);
        let created = run_bounded(sites.clone(), self.options.concurrency, |site: SiteInfo| {
            let poller = &poller;
            async move {
                let label = format!("{} {}", site.site, now());
                let task = self.source.create_backup(site.id, &label).await?;
                tracing::debug!("Backup of {} queued as task {}", site.site, task.task_id);
                if self.options.wait_for_completion {
                    poller.wait_for_completion(&task.task_id, None).await?;
                }
                Ok::<TaskRef, MigrateError>(task)
            }
        })
        .await?;

        let mut failures = Vec::new();
        let mut tasks: Vec<TaskRef> = Vec::new();
        for (site, outcome) in sites.iter().zip(created) {
            match outcome {
                Ok(task) => tasks.push(task),
                Err(e) => failures.push(format!("{} failed: {}", site.site, e)),
            }
        }

        let task_ids: Vec<String> = tasks.into_iter().map(|t| t.task_id).collect();

        if !self.options.wait_for_completion {
            return Ok(BackupReport {
                status: if failures.is_empty() {
                    BackupStatus::Started
                } else {
                    BackupStatus::CompletedWithProblems
                },
                sites: sites.len(),
                tasks: task_ids,
                failures,
            });
        }

        let statuses = run_bounded(task_ids.clone(), self.options.concurrency, |task_id: String| {
            async move { self.source.task_status(&task_id).await }
        })
        .await?;

        for (task_id, status) in task_ids.iter().zip(statuses) {
            match status {
                Ok(task) if task.succeeded() => {}
                Ok(task) => failures.push(format!(
                    "{} failed: {}",
                    task.name,
                    task.error_message.as_deref().unwrap_or("no error message")
                )),
                Err(e) => failures.push(format!("Task {} failed: {}", task_id, e)),
            }
        }

        Ok(BackupReport {
            status: if failures.is_empty() {
                BackupStatus::Succeeded
            } else {
                BackupStatus::CompletedWithProblems
            },
            sites: sites.len(),
            tasks: task_ids,
            failures,
        })
    }

    async fn announce(&self, report: &BackupReport) {
        let details = report.failures.join("\n");
        match report.status {
            BackupStatus::Succeeded => {
                self.send(&format!("ACSF backups completed successfully at {}.", now()), None)
                    .await
            }
            BackupStatus::Started => {
                self.send(
                    &format!("ACSF backups queued for {} sites at {}.", report.sites, now()),
                    None,
                )
                .await
            }
            BackupStatus::CompletedWithProblems => {
                self.send(
                    &format!("ACSF backups completed with problems at {}.", now()),
                    Some(&details),
                )
                .await
            }
            BackupStatus::Failed(_) => {}
        }
    }

    // 通知失敗不影響備份結果
    async fn send(&self, subject: &str, message: Option<&str>) {
        if let Err(e) = self.notifier.notify(subject, message).await {
            tracing::warn!("⚠️ Could not send notification '{}': {}", subject, e);
        }
    }
}

fn now() -> String {
    chrono::Utc::now().format("%-m/%-d/%Y, %H:%M:%S UTC").to_string()
}
