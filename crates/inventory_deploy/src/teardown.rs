//! `teardown`: best-effort removal of everything `deploy` creates.
//!
//! Buckets and topics are selected by project-name substring, the API and
//! functions by exact name. Each phase runs regardless of earlier failures;
//! failures are logged and collected in the report, never returned.

use inventory_core::naming::{matches_project, ALL_FUNCTIONS};
use tracing::{info, warn};

use crate::config::DeployConfig;
use crate::control_plane::{ControlPlane, Tags};
use crate::error::CloudError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownOptions {
    /// Also require the `project` tag before deleting buckets, topics and APIs.
    pub tagged_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub buckets_deleted: Vec<String>,
    pub table_deleted: bool,
    pub apis_deleted: Vec<String>,
    pub functions_deleted: Vec<String>,
    pub topics_deleted: Vec<String>,
    pub failures: Vec<String>,
}

impl TeardownReport {
    fn record_failure(&mut self, resource: &str, error: &CloudError) {
        warn!(resource, %error, "teardown step failed; continuing");
        self.failures.push(format!("{resource}: {error}"));
    }
}

pub fn teardown(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    options: TeardownOptions,
) -> TeardownReport {
    info!(project = %config.project_name, tagged_only = options.tagged_only, "starting teardown");
    let mut report = TeardownReport::default();

    delete_buckets(config, cloud, options, &mut report);
    delete_table(config, cloud, &mut report);
    delete_apis(config, cloud, options, &mut report);
    delete_functions(cloud, &mut report);
    delete_topics(config, cloud, options, &mut report);

    info!(
        buckets = report.buckets_deleted.len(),
        apis = report.apis_deleted.len(),
        functions = report.functions_deleted.len(),
        topics = report.topics_deleted.len(),
        failures = report.failures.len(),
        "teardown completed"
    );
    report
}

fn delete_buckets(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    options: TeardownOptions,
    report: &mut TeardownReport,
) {
    let buckets = match cloud.list_buckets() {
        Ok(value) => value,
        Err(error) => return report.record_failure("buckets", &error),
    };

    for bucket in buckets {
        if !matches_project(&bucket, &config.project_name) {
            continue;
        }
        if options.tagged_only && !tag_check(config, &bucket, || cloud.bucket_tags(&bucket)) {
            continue;
        }

        info!(bucket = %bucket, "emptying and deleting bucket");
        match empty_and_delete_bucket(cloud, &bucket) {
            Ok(()) => report.buckets_deleted.push(bucket),
            Err(error) => report.record_failure(&bucket, &error),
        }
    }
}

/// The storage service refuses to delete a bucket that still holds objects.
fn empty_and_delete_bucket(cloud: &impl ControlPlane, bucket: &str) -> Result<(), CloudError> {
    for key in cloud.list_object_keys(bucket)? {
        cloud.delete_object(bucket, &key)?;
    }
    cloud.delete_bucket(bucket)
}

fn delete_table(config: &DeployConfig, cloud: &impl ControlPlane, report: &mut TeardownReport) {
    info!(table = %config.table_name, "deleting table");
    match cloud.delete_table(&config.table_name) {
        Ok(()) => report.table_deleted = true,
        Err(CloudError::NotFound(_)) => info!(table = %config.table_name, "table already gone"),
        Err(error) => report.record_failure(&config.table_name, &error),
    }
}

fn delete_apis(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    options: TeardownOptions,
    report: &mut TeardownReport,
) {
    let apis = match cloud.list_apis() {
        Ok(value) => value,
        Err(error) => return report.record_failure("apis", &error),
    };

    let api_name = config.api_name();
    for api in apis {
        if api.name != api_name {
            continue;
        }
        if options.tagged_only && !config.carries_project_tag(&api.tags) {
            info!(api_id = %api.api_id, "skipping untagged API");
            continue;
        }

        info!(api_id = %api.api_id, "deleting HTTP API");
        match cloud.delete_api(&api.api_id) {
            Ok(()) => report.apis_deleted.push(api.api_id),
            Err(error) => report.record_failure(&api.api_id, &error),
        }
    }
}

fn delete_functions(cloud: &impl ControlPlane, report: &mut TeardownReport) {
    for name in ALL_FUNCTIONS {
        info!(function = name, "deleting function");
        match cloud.delete_function(name) {
            Ok(()) => report.functions_deleted.push(name.to_string()),
            Err(CloudError::NotFound(_)) => info!(function = name, "function already gone"),
            Err(error) => report.record_failure(name, &error),
        }
    }
}

fn delete_topics(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    options: TeardownOptions,
    report: &mut TeardownReport,
) {
    let topics = match cloud.list_topics() {
        Ok(value) => value,
        Err(error) => return report.record_failure("topics", &error),
    };

    for topic_arn in topics {
        let name = topic_arn.rsplit(':').next().unwrap_or(&topic_arn);
        if !matches_project(name, &config.project_name) {
            continue;
        }
        if options.tagged_only && !tag_check(config, &topic_arn, || cloud.topic_tags(&topic_arn)) {
            continue;
        }

        info!(topic = %topic_arn, "deleting topic");
        match cloud.delete_topic(&topic_arn) {
            Ok(()) => report.topics_deleted.push(topic_arn),
            Err(error) => report.record_failure(&topic_arn, &error),
        }
    }
}

/// Unreadable tags count as "not ours".
fn tag_check(
    config: &DeployConfig,
    resource: &str,
    fetch: impl FnOnce() -> Result<Tags, CloudError>,
) -> bool {
    match fetch() {
        Ok(tags) if config.carries_project_tag(&tags) => true,
        Ok(_) => {
            info!(resource, "skipping resource without project tag");
            false
        }
        Err(error) => {
            warn!(resource, %error, "could not read tags; skipping resource");
            false
        }
    }
}
