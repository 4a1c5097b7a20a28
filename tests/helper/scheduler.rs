//! Scheduler test utilities

use std::collections::HashMap;

use async_trait::async_trait;

use tagwatch::image::parse_tagged;
use tagwatch::scheduler::error::SchedulerError;
use tagwatch::scheduler::{Instance, Scheduler};

/// In-memory scheduler returning fixed instances per namespace
#[derive(Default)]
pub struct MockScheduler {
    namespaces: HashMap<String, Vec<Instance>>,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instances(mut self, namespace: &str, instances: Vec<Instance>) -> Self {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .extend(instances);
        self
    }
}

#[async_trait]
impl Scheduler for MockScheduler {
    async fn instances(&self, namespace: &str) -> Result<Vec<Instance>, SchedulerError> {
        if namespace == "*" {
            return Ok(self.namespaces.values().flatten().cloned().collect());
        }
        self.namespaces
            .get(namespace)
            .cloned()
            .ok_or_else(|| SchedulerError::NotFound(namespace.to_string()))
    }
}

/// Create an instance running `image` (e.g. "nginx:1.25.0")
pub fn instance(namespace: &str, job: &str, group: &str, task: &str, image: &str) -> Instance {
    Instance {
        namespace: namespace.to_string(),
        job: job.to_string(),
        group: group.to_string(),
        task: task.to_string(),
        image: parse_tagged(image).unwrap(),
    }
}
