//! Resolve-then-match pipeline tests with in-memory collaborators

mod helper;

use std::sync::Arc;

use helper::{MockRegistry, MockScheduler, instance};
use tagwatch::app::run;
use tagwatch::config::Config;
use tagwatch::report::ReportRow;
use tagwatch::version::error::ResolveError;

fn config(toml: &str) -> Config {
    Config::from_toml(toml).unwrap()
}

fn summary(rows: &[ReportRow]) -> Vec<(String, String, String, bool)> {
    rows.iter()
        .map(|r| {
            (
                format!("{}/{}/{}/{}", r.namespace, r.job, r.group, r.task),
                r.latest.clone(),
                r.current.clone(),
                r.update_available,
            )
        })
        .collect()
}

#[tokio::test]
async fn reports_update_availability_for_filtered_latest_tag() {
    let config = config(
        r#"
namespaces = ["default"]

[[images]]
name = "app"
include = ['^v\d+\.\d+\.\d+$']
"#,
    );
    let registry =
        MockRegistry::new().with_tags("app", vec!["v1.0.0", "v1.2.0", "latest", "v1.1.0-rc1"]);
    let scheduler = MockScheduler::new().with_instances(
        "default",
        vec![
            instance("default", "api", "web", "old", "app:1.0.0"),
            instance("default", "api", "web", "current", "app:1.2.0"),
        ],
    );

    let rows = run(&config, Arc::new(registry), &scheduler).await.unwrap();

    assert_eq!(
        summary(&rows),
        vec![
            (
                "default/api/web/old".to_string(),
                "1.2.0".to_string(),
                "1.0.0".to_string(),
                true
            ),
            (
                "default/api/web/current".to_string(),
                "1.2.0".to_string(),
                "1.2.0".to_string(),
                false
            ),
        ]
    );
    assert!(rows.iter().all(|r| r.image == "docker.io/library/app"));
}

#[tokio::test]
async fn fails_without_rows_when_one_image_fetch_fails() {
    let config = config(
        r#"
[[images]]
name = "app"

[[images]]
name = "ghcr.io/owner/broken"
"#,
    );
    let registry = MockRegistry::new()
        .with_tags("app", vec!["1.0.0"])
        .with_failure("ghcr.io/owner/broken", "connection reset by peer");
    let scheduler = MockScheduler::new().with_instances(
        "default",
        vec![instance("default", "api", "web", "server", "app:1.0.0")],
    );

    let err = run(&config, Arc::new(registry), &scheduler)
        .await
        .unwrap_err();

    let resolve = err.downcast_ref::<ResolveError>().unwrap();
    match resolve {
        ResolveError::Fetch(fetch) => assert_eq!(fetch.image, "ghcr.io/owner/broken"),
        other => panic!("expected fetch error, got {other:?}"),
    }
    assert!(format!("{err:#}").contains("connection reset by peer"));
}

#[tokio::test]
async fn skips_unwatched_images_and_sorts_across_namespaces() {
    let config = config(
        r#"
namespaces = ["default", "prod"]

[[images]]
name = "docker.io/library/nginx"
exclude = ['alpine']
"#,
    );
    let registry =
        MockRegistry::new().with_tags("nginx", vec!["1.25.0", "1.26.0", "1.27.0-alpine"]);
    let scheduler = MockScheduler::new()
        .with_instances(
            "default",
            vec![
                instance("default", "edge", "proxy", "nginx", "nginx:1.26.0"),
                instance("default", "cache", "main", "redis", "redis:latest"),
            ],
        )
        .with_instances(
            "prod",
            vec![instance("prod", "edge", "proxy", "nginx", "nginx:1.25")],
        );

    let rows = run(&config, Arc::new(registry), &scheduler).await.unwrap();

    assert_eq!(
        summary(&rows),
        vec![
            (
                "prod/edge/proxy/nginx".to_string(),
                "1.26.0".to_string(),
                "1.25.0".to_string(),
                true
            ),
            (
                "default/edge/proxy/nginx".to_string(),
                "1.26.0".to_string(),
                "1.26.0".to_string(),
                false
            ),
        ]
    );
}

#[tokio::test]
async fn fails_when_running_tag_is_not_a_version() {
    let config = config(
        r#"
[[images]]
name = "app"
"#,
    );
    let registry = MockRegistry::new().with_tags("app", vec!["1.0.0"]);
    let scheduler = MockScheduler::new().with_instances(
        "default",
        vec![instance("default", "api", "web", "server", "app:latest")],
    );

    let err = run(&config, Arc::new(registry), &scheduler)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("api/web/server"));
}

#[tokio::test]
async fn fails_when_namespace_listing_fails() {
    let config = config(
        r#"
namespaces = ["missing"]

[[images]]
name = "app"
"#,
    );
    let registry = MockRegistry::new().with_tags("app", vec!["1.0.0"]);

    let err = run(&config, Arc::new(registry), &MockScheduler::new())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("failed to list running instances"));
}
