pub mod assignment;
pub mod backup;
pub mod staging;

pub use assignment::DomainAssignmentExecutor;
pub use backup::{BackupOptions, BackupOrchestrator, BackupReport, BackupStatus};
pub use staging::{show_progress, StagingOptions, StagingOrchestrator, StagingReport};
