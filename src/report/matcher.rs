//! Joins running instances against resolved image versions

use thiserror::Error;
use tracing::debug;

use crate::report::ReportRow;
use crate::scheduler::Instance;
use crate::version::error::ParseError;
use crate::version::selector::newest;
use crate::version::semver::Version;
use crate::version::types::VersionSet;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("couldn't parse running tag of {namespace}/{job}/{group}/{task} ({image}): {source}")]
    CurrentVersion {
        namespace: String,
        job: String,
        group: String,
        task: String,
        image: String,
        #[source]
        source: ParseError,
    },
}

/// Build one report row per instance whose image is watched.
///
/// Instances of unwatched images, and of watched images without any
/// candidate version, are skipped. A running tag that is not a version
/// fails the whole report. Rows keep the instance order.
pub fn match_instances(
    instances: &[Instance],
    versions: &VersionSet,
) -> Result<Vec<ReportRow>, MatchError> {
    let mut rows = Vec::new();

    for instance in instances {
        let Some(candidates) = versions.get(instance.image.name.as_str()) else {
            continue;
        };
        let Some(latest) = newest(candidates) else {
            debug!("No candidate versions for {}", instance.image.name);
            continue;
        };

        let current =
            Version::parse(&instance.image.tag).map_err(|source| MatchError::CurrentVersion {
                namespace: instance.namespace.clone(),
                job: instance.job.clone(),
                group: instance.group.clone(),
                task: instance.task.clone(),
                image: instance.image.to_string(),
                source,
            })?;

        rows.push(ReportRow {
            namespace: instance.namespace.clone(),
            job: instance.job.clone(),
            group: instance.group.clone(),
            task: instance.task.clone(),
            image: instance.image.name.to_string(),
            latest: latest.to_string(),
            current: current.to_string(),
            update_available: *latest > current,
        });
    }

    Ok(rows)
}
