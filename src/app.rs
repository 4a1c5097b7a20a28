//! The resolve-then-match pipeline

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::report::{ReportRow, match_instances};
use crate::scheduler::{Scheduler, collect_instances};
use crate::version::registry::Registry;
use crate::version::resolver::VersionResolver;

/// Produce the update report for every watched image running in the cluster.
///
/// Registry resolution runs before instance enumeration; any failure ends
/// the run without rows.
pub async fn run(
    config: &Config,
    registry: Arc<dyn Registry>,
    scheduler: &dyn Scheduler,
) -> anyhow::Result<Vec<ReportRow>> {
    let versions = VersionResolver::new(registry)
        .resolve(&config.images)
        .await
        .context("failed to resolve image versions")?;

    let instances = collect_instances(scheduler, &config.namespaces)
        .await
        .context("failed to list running instances")?;
    info!(
        "Matching {} instances against {} watched images",
        instances.len(),
        versions.len()
    );

    let rows = match_instances(&instances, &versions)?;
    Ok(rows)
}
