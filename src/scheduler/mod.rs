//! Running instance enumeration
//!
//! # Modules
//!
//! - [`nomad`]: Nomad HTTP API client
//! - [`error`]: Scheduler error types

pub mod error;
pub mod nomad;

#[cfg(test)]
use mockall::automock;

use tracing::debug;

use crate::config::ALL_NAMESPACES;
use crate::image::TaggedImage;
use crate::scheduler::error::SchedulerError;

pub use nomad::NomadClient;

/// One running task and the image it was started from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub namespace: String,
    pub job: String,
    pub group: String,
    pub task: String,
    pub image: TaggedImage,
}

/// Trait for listing running instances from a cluster scheduler
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Scheduler: Send + Sync {
    /// Lists the tagged container instances of a namespace
    ///
    /// # Arguments
    /// * `namespace` - Namespace to scan, or `*` for all namespaces
    async fn instances(&self, namespace: &str) -> Result<Vec<Instance>, SchedulerError>;
}

/// Collect instances across namespaces, sorted for output.
///
/// Namespaces are scanned in order; the first failure is returned. An empty
/// namespace means all namespaces.
pub async fn collect_instances(
    scheduler: &dyn Scheduler,
    namespaces: &[String],
) -> Result<Vec<Instance>, SchedulerError> {
    let mut all = Vec::new();
    for namespace in namespaces {
        let namespace = if namespace.is_empty() {
            ALL_NAMESPACES
        } else {
            namespace.as_str()
        };
        let instances = scheduler.instances(namespace).await?;
        debug!("Found {} instances in namespace {}", instances.len(), namespace);
        all.extend(instances);
    }

    sort_instances(&mut all);
    Ok(all)
}

/// Sort descending by namespace, then job, group and task.
pub fn sort_instances(instances: &mut [Instance]) {
    instances.sort_by(|a, b| {
        (&b.namespace, &b.job, &b.group, &b.task).cmp(&(&a.namespace, &a.job, &a.group, &a.task))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::parse_tagged;
    use mockall::predicate::eq;

    fn instance(namespace: &str, job: &str, group: &str, task: &str) -> Instance {
        Instance {
            namespace: namespace.to_string(),
            job: job.to_string(),
            group: group.to_string(),
            task: task.to_string(),
            image: parse_tagged("nginx:1.25.0").unwrap(),
        }
    }

    fn keys(instances: &[Instance]) -> Vec<String> {
        instances
            .iter()
            .map(|i| format!("{}/{}/{}/{}", i.namespace, i.job, i.group, i.task))
            .collect()
    }

    #[test]
    fn sort_instances_orders_reverse_lexicographically() {
        let mut instances = vec![
            instance("default", "api", "web", "server"),
            instance("prod", "api", "web", "server"),
            instance("default", "worker", "main", "run"),
            instance("default", "api", "web", "sidecar"),
            instance("default", "api", "db", "server"),
        ];

        sort_instances(&mut instances);

        assert_eq!(
            keys(&instances),
            vec![
                "prod/api/web/server",
                "default/worker/main/run",
                "default/api/web/sidecar",
                "default/api/web/server",
                "default/api/db/server",
            ]
        );
    }

    #[tokio::test]
    async fn collect_instances_scans_every_namespace_and_sorts() {
        let mut scheduler = MockScheduler::new();
        scheduler
            .expect_instances()
            .with(eq("default"))
            .times(1)
            .returning(|_| Ok(vec![instance("default", "api", "web", "server")]));
        scheduler
            .expect_instances()
            .with(eq("prod"))
            .times(1)
            .returning(|_| Ok(vec![instance("prod", "api", "web", "server")]));

        let namespaces = vec!["default".to_string(), "prod".to_string()];
        let result = collect_instances(&scheduler, &namespaces).await.unwrap();

        assert_eq!(
            keys(&result),
            vec!["prod/api/web/server", "default/api/web/server"]
        );
    }

    #[tokio::test]
    async fn collect_instances_maps_empty_namespace_to_wildcard() {
        let mut scheduler = MockScheduler::new();
        scheduler
            .expect_instances()
            .with(eq("*"))
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let result = collect_instances(&scheduler, &[String::new()])
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn collect_instances_stops_at_first_error() {
        let mut scheduler = MockScheduler::new();
        scheduler
            .expect_instances()
            .with(eq("broken"))
            .times(1)
            .returning(|_| Err(SchedulerError::Unauthorized("broken".to_string())));
        scheduler.expect_instances().with(eq("later")).never();

        let namespaces = vec!["broken".to_string(), "later".to_string()];
        let result = collect_instances(&scheduler, &namespaces).await;

        assert!(matches!(result, Err(SchedulerError::Unauthorized(_))));
    }
}
