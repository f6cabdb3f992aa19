use crate::domain::model::{RemoteTask, SiteDomainRecord, SiteInfo, TaskRef, User};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Body of a v2 stage request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageRequest {
    pub to_env: String,
    pub sites: Vec<u64>,
    pub wipe_target_environment: bool,
    pub synchronize_all_users: bool,
    pub detailed_status: bool,
}

#[async_trait]
pub trait SiteDirectory: Send + Sync {
    async fn list_sites(&self) -> Result<Vec<SiteInfo>>;
    async fn create_backup(&self, site_id: u64, label: &str) -> Result<TaskRef>;
}

#[async_trait]
pub trait TaskTracker: Send + Sync {
    async fn task_status(&self, task_id: &str) -> Result<RemoteTask>;
}

#[async_trait]
pub trait DomainRegistry: Send + Sync {
    async fn get_domains(&self, site_id: u64) -> Result<SiteDomainRecord>;
    async fn add_domain(&self, site_id: u64, domain_name: &str) -> Result<()>;
}

#[async_trait]
pub trait StagingService: Send + Sync {
    async fn stage(&self, request: &StageRequest) -> Result<TaskRef>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>>;
}

/// Opens a domain registry on another factory endpoint (the staging target).
pub trait DestinationConnector: Send + Sync {
    fn connect(&self, factory_host: &str) -> Result<Arc<dyn DomainRegistry>>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, message: Option<&str>) -> Result<()>;
}
