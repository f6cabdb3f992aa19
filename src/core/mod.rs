pub mod batch;
pub mod domain_names;
pub mod planner;
pub mod task_poller;
pub mod user_filter;

pub use crate::domain::model::{
    DestinationAssignment, RemoteTask, SiteDomainRecord, SiteInfo, TaskRef, Tier, User,
};
pub use crate::domain::ports::{
    DestinationConnector, DomainRegistry, Notifier, SiteDirectory, StageRequest, StagingService,
    TaskTracker, UserDirectory,
};
pub use crate::utils::error::Result;
