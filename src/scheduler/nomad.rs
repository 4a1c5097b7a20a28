//! Nomad HTTP API client

use std::collections::HashMap;

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ALL_NAMESPACES;
use crate::image::parse_tagged;
use crate::scheduler::error::SchedulerError;
use crate::scheduler::{Instance, Scheduler};

const TOKEN_HEADER: &str = "X-Nomad-Token";
const DOCKER_DRIVER: &str = "docker";

/// Entry of `GET /v1/allocations`
#[derive(Debug, Deserialize)]
struct AllocationStub {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Namespace", default)]
    namespace: String,
    #[serde(rename = "JobID")]
    job_id: String,
}

/// Response of `GET /v1/allocation/:id`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Allocation {
    task_group: String,
    job: Option<Job>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Job {
    #[serde(default)]
    task_groups: Vec<TaskGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TaskGroup {
    name: String,
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Task {
    name: String,
    driver: String,
    #[serde(default)]
    config: Option<HashMap<String, serde_json::Value>>,
}

impl Task {
    /// The task's image when it runs a concrete docker image reference
    fn docker_image(&self) -> Option<&str> {
        if self.driver != DOCKER_DRIVER {
            return None;
        }
        let image = self.config.as_ref()?.get("image")?.as_str()?;
        // Unresolved interpolation such as ${NOMAD_META_image}
        if image.starts_with('$') {
            return None;
        }
        Some(image)
    }
}

/// Scheduler implementation backed by the Nomad HTTP API
pub struct NomadClient {
    client: reqwest::Client,
    address: String,
    token: Option<String>,
}

impl NomadClient {
    pub fn new(client: reqwest::Client, address: &str, token: Option<String>) -> Self {
        Self {
            client,
            address: address.trim_end_matches('/').to_string(),
            token,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        namespace: &str,
    ) -> Result<T, SchedulerError> {
        let url = Url::parse_with_params(
            &format!("{}{}", self.address, path),
            &[("namespace", namespace)],
        )
        .map_err(|e| SchedulerError::InvalidResponse(format!("Invalid Nomad URL: {}", e)))?;

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED {
            return Err(SchedulerError::Unauthorized(path.to_string()));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(SchedulerError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            warn!("Nomad returned status {}: {}", status, path);
            return Err(SchedulerError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse Nomad response for {}: {}", path, e);
            SchedulerError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl Scheduler for NomadClient {
    async fn instances(&self, namespace: &str) -> Result<Vec<Instance>, SchedulerError> {
        let namespace = if namespace.is_empty() {
            ALL_NAMESPACES
        } else {
            namespace
        };

        let stubs: Vec<AllocationStub> = self.get_json("/v1/allocations", namespace).await?;

        let mut instances = Vec::new();
        for stub in stubs {
            let allocation: Allocation = self
                .get_json(&format!("/v1/allocation/{}", stub.id), namespace)
                .await?;

            let Some(group) = allocation.job.as_ref().and_then(|job| {
                job.task_groups
                    .iter()
                    .find(|group| group.name == allocation.task_group)
            }) else {
                warn!(
                    "Allocation {} has no task group {}",
                    stub.id, allocation.task_group
                );
                continue;
            };

            for task in &group.tasks {
                let Some(raw) = task.docker_image() else {
                    continue;
                };
                let image = match parse_tagged(raw) {
                    Ok(image) => image,
                    Err(e) => {
                        debug!("Skipping task {} image {}: {}", task.name, raw, e);
                        continue;
                    }
                };

                instances.push(Instance {
                    namespace: stub.namespace.clone(),
                    job: stub.job_id.clone(),
                    group: group.name.clone(),
                    task: task.name.clone(),
                    image,
                });
            }
        }

        debug!("Listed {} instances in namespace {}", instances.len(), namespace);
        Ok(instances)
    }
}
