use crate::core::batch::{first_failure, run_bounded};
use crate::core::{DestinationAssignment, DomainRegistry, Result};
use futures::future::try_join_all;

/// Applies planned domain assignments to a destination factory.
pub struct DomainAssignmentExecutor<'a> {
    registry: &'a dyn DomainRegistry,
    concurrency: usize,
}

impl<'a> DomainAssignmentExecutor<'a> {
    pub fn new(registry: &'a dyn DomainRegistry, concurrency: usize) -> Self {
        Self {
            registry,
            concurrency,
        }
    }

    /// Apply every assignment and return how many sites received domains.
    ///
    /// Sites are processed concurrently, up to the configured ceiling. Any
    /// failed add fails the whole call; domains already added stay in place.
    pub async fn apply(&self, assignments: &[DestinationAssignment]) -> Result<usize> {
        let results = run_bounded(assignments.iter().collect(), self.concurrency, |assignment| {
            self.apply_one(assignment)
        })
        .await?;

        let applied = first_failure(results)?;
        Ok(applied.into_iter().filter(|done| *done).count())
    }

    async fn apply_one(&self, assignment: &DestinationAssignment) -> Result<bool> {
        let Some(primary) = assignment.primary.as_deref() else {
            tracing::debug!("Site {} has no custom domains, skipping", assignment.site_id);
            return Ok(false);
        };

        // primary 必須先存在，其他別名才能加上去
        self.registry.add_domain(assignment.site_id, primary).await?;
        tracing::info!("🌐 Site {}: primary domain {}", assignment.site_id, primary);

        try_join_all(
            assignment
                .secondary
                .iter()
                .map(|domain| self.registry.add_domain(assignment.site_id, domain)),
        )
        .await?;

        if !assignment.secondary.is_empty() {
            tracing::info!(
                "🌐 Site {}: {} additional domains",
                assignment.site_id,
                assignment.secondary.len()
            );
        }

        Ok(true)
    }
}
