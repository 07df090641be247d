//! `deploy`: provisions the stack leaf-to-root.
//!
//! Table and functions are reused when they already exist; buckets and the
//! topic are timestamp-named, so every run creates fresh ones.

use std::collections::BTreeMap;
use std::fs;

use inventory_core::contract::{PARTITION_KEY, SORT_KEY, TABLE_NAME_ENV, TOPIC_ARN_ENV};
use inventory_core::naming::{
    api_permission_statement_id, bucket_arn, bucket_name, execute_api_source_arn,
    integration_target, storage_permission_statement_id, topic_name, website_url, BucketRole,
    ALL_FUNCTIONS, CONTACT_FUNCTION, INDEX_DOCUMENT, INGEST_FUNCTION, INGEST_SUFFIX,
    QUERY_FUNCTION, SEED_OBJECT_KEY,
};
use inventory_core::site::public_read_policy;
use tracing::{debug, info, warn};

use crate::config::DeployConfig;
use crate::control_plane::{
    ControlPlane, CorsRules, FunctionSpec, HttpApi, InvokePermission, StorageTrigger, TableSpec,
    TableStatus,
};
use crate::error::{CloudError, DeployError};
use crate::packager::{package_function, HANDLER_FILE};
use crate::site::publish_site;

pub const FUNCTION_RUNTIME: &str = "provided.al2023";
pub const FUNCTION_TIMEOUT_SECS: i32 = 30;
pub const OBJECT_CREATED_EVENT: &str = "s3:ObjectCreated:*";
pub const API_GATEWAY_PRINCIPAL: &str = "apigateway.amazonaws.com";
pub const STORAGE_PRINCIPAL: &str = "s3.amazonaws.com";

/// Route keys and the function each one proxies to.
pub const ROUTES: [(&str, &str); 3] = [
    ("GET /items", QUERY_FUNCTION),
    ("GET /items/{store}", QUERY_FUNCTION),
    ("POST /contact", CONTACT_FUNCTION),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionOutcome {
    Created,
    Updated,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub ingest_bucket: String,
    pub web_bucket: String,
    pub topic_arn: String,
    pub api_id: String,
    pub api_endpoint: String,
    pub website_url: String,
    pub functions: BTreeMap<String, FunctionOutcome>,
    pub seed_uploaded: bool,
}

pub fn deploy(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
) -> Result<DeploySummary, DeployError> {
    deploy_at(config, cloud, chrono::Utc::now().timestamp())
}

/// `deploy` with an explicit timestamp for the generated resource names.
pub fn deploy_at(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    timestamp: i64,
) -> Result<DeploySummary, DeployError> {
    config.validate()?;
    info!(project = %config.project_name, region = %config.region, "starting deploy");

    let role_arn = cloud
        .role_arn(&config.role_name)
        .map_err(|source| DeployError::MissingRole {
            role: config.role_name.clone(),
            source,
        })?;

    ensure_table(config, cloud)?;

    let ingest_bucket = bucket_name(&config.project_name, BucketRole::Ingest, timestamp);
    let web_bucket = bucket_name(&config.project_name, BucketRole::Web, timestamp);
    for bucket in [&ingest_bucket, &web_bucket] {
        create_bucket(config, cloud, bucket)?;
    }

    let topic_arn = create_topic(config, cloud, timestamp)?;

    let functions = deploy_functions(config, cloud, &role_arn, &topic_arn)?;

    let api = create_http_api(config, cloud)?;

    if let Err(error) = wire_storage_trigger(cloud, &ingest_bucket, timestamp) {
        warn!(bucket = %ingest_bucket, %error, "storage trigger not configured");
    }

    configure_site_bucket(cloud, &web_bucket)?;
    publish_site(cloud, &web_bucket, &config.web_dir, &api.endpoint)?;

    let seed_uploaded = upload_seed(config, cloud, &ingest_bucket)?;

    let summary = DeploySummary {
        website_url: website_url(&web_bucket, &config.region),
        ingest_bucket,
        web_bucket,
        topic_arn,
        api_id: api.api_id,
        api_endpoint: api.endpoint,
        functions,
        seed_uploaded,
    };
    info!(
        website = %summary.website_url,
        api = %summary.api_endpoint,
        "deploy completed"
    );
    Ok(summary)
}

fn ensure_table(config: &DeployConfig, cloud: &impl ControlPlane) -> Result<(), DeployError> {
    let table = TableSpec {
        name: config.table_name.clone(),
        partition_key: PARTITION_KEY.to_string(),
        sort_key: SORT_KEY.to_string(),
        tags: config.project_tags(),
    };
    let status = || cloud.table_status(&table.name);

    match cloud.create_table(&table) {
        Ok(()) => info!(table = %table.name, "creating table"),
        Err(CloudError::AlreadyExists(_)) => {
            let current =
                status().map_err(|source| DeployError::cloud("describe table", source))?;
            if current == TableStatus::Deleting {
                warn!(table = %table.name, "table is being deleted; waiting to recreate it");
                wait_until(config, "table deletion", || {
                    Ok(status()? == TableStatus::Missing)
                })?;
                cloud
                    .create_table(&table)
                    .map_err(|source| DeployError::cloud("create table", source))?;
            } else {
                info!(table = %table.name, "table already exists");
            }
        }
        Err(source) => return Err(DeployError::cloud("create table", source)),
    }

    wait_until(config, "table activation", || {
        Ok(status()? == TableStatus::Active)
    })
}

fn create_bucket(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    bucket: &str,
) -> Result<(), DeployError> {
    info!(bucket, "creating bucket");
    match cloud.create_bucket(bucket, &config.project_tags()) {
        Ok(()) => {}
        Err(CloudError::AlreadyExists(_)) => info!(bucket, "bucket already exists"),
        Err(source) => return Err(DeployError::cloud(format!("create bucket {bucket}"), source)),
    }
    if let Err(error) = cloud.remove_public_access_block(bucket) {
        warn!(bucket, %error, "could not remove public access block");
    }
    Ok(())
}

fn create_topic(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    timestamp: i64,
) -> Result<String, DeployError> {
    let name = topic_name(&config.project_name, timestamp);
    info!(topic = %name, "creating notification topic");
    let topic_arn = cloud
        .create_topic(&name, &config.project_tags())
        .map_err(|source| DeployError::cloud("create topic", source))?;

    if let Some(email) = config.subscription_email() {
        match cloud.subscribe_email(&topic_arn, email) {
            Ok(()) => info!(email, "subscription requested; confirm it from the inbox"),
            Err(error) => warn!(email, %error, "email subscription failed"),
        }
    }
    Ok(topic_arn)
}

fn deploy_functions(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    role_arn: &str,
    topic_arn: &str,
) -> Result<BTreeMap<String, FunctionOutcome>, DeployError> {
    let environment = BTreeMap::from([
        (TABLE_NAME_ENV.to_string(), config.table_name.clone()),
        (TOPIC_ARN_ENV.to_string(), topic_arn.to_string()),
    ]);
    let staging = tempfile::tempdir().map_err(|source| DeployError::Io {
        path: std::env::temp_dir(),
        source,
    })?;

    let mut outcomes = BTreeMap::new();
    for name in ALL_FUNCTIONS {
        let source_dir = config.lambdas_dir.join(name);
        let Some(zip_path) = package_function(&source_dir, staging.path(), name)? else {
            warn!(
                function = name,
                path = %source_dir.join(HANDLER_FILE).display(),
                "handler binary not found; skipping function"
            );
            outcomes.insert(name.to_string(), FunctionOutcome::Skipped);
            continue;
        };

        let archive = fs::read(&zip_path).map_err(|source| DeployError::Io {
            path: zip_path.clone(),
            source,
        })?;
        if let Err(error) = fs::remove_file(&zip_path) {
            debug!(path = %zip_path.display(), %error, "could not remove function archive");
        }

        let function = FunctionSpec {
            name: name.to_string(),
            archive,
            role_arn: role_arn.to_string(),
            runtime: FUNCTION_RUNTIME.to_string(),
            handler: HANDLER_FILE.to_string(),
            timeout_secs: FUNCTION_TIMEOUT_SECS,
            environment: environment.clone(),
            tags: config.project_tags(),
        };
        let outcome = create_or_update_function(config, cloud, &function)?;
        info!(function = name, ?outcome, "function deployed");
        outcomes.insert(name.to_string(), outcome);
    }
    Ok(outcomes)
}

fn create_or_update_function(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    function: &FunctionSpec,
) -> Result<FunctionOutcome, DeployError> {
    let step = |action: &str| format!("{action} {}", function.name);

    match cloud.create_function(function) {
        Ok(()) => Ok(FunctionOutcome::Created),
        Err(CloudError::AlreadyExists(_)) => {
            cloud
                .update_function_code(&function.name, &function.archive)
                .map_err(|source| DeployError::cloud(step("update code of"), source))?;
            wait_until(config, &step("code update of"), || {
                Ok(!cloud.function_update_in_progress(&function.name)?)
            })?;
            cloud
                .update_function_configuration(function)
                .map_err(|source| DeployError::cloud(step("update configuration of"), source))?;
            Ok(FunctionOutcome::Updated)
        }
        Err(source) => Err(DeployError::cloud(step("create function"), source)),
    }
}

fn create_http_api(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
) -> Result<HttpApi, DeployError> {
    let cors = CorsRules {
        allow_origins: vec!["*".to_string()],
        allow_methods: ["GET", "POST", "OPTIONS"].map(String::from).to_vec(),
        allow_headers: vec!["content-type".to_string()],
    };
    let name = config.api_name();
    info!(api = %name, "creating HTTP API");
    let api = cloud
        .create_http_api(&name, &cors, &config.project_tags())
        .map_err(|source| DeployError::cloud("create HTTP API", source))?;
    cloud
        .create_default_stage(&api.api_id)
        .map_err(|source| DeployError::cloud("create default stage", source))?;

    let mut integrations: BTreeMap<&str, String> = BTreeMap::new();
    for (route_key, function) in ROUTES {
        let integration_id = match integrations.get(function) {
            Some(id) => id.clone(),
            None => {
                let function_arn = cloud
                    .function_arn(function)
                    .map_err(|source| DeployError::cloud(format!("look up {function}"), source))?;
                let id = cloud
                    .create_proxy_integration(&api.api_id, &function_arn)
                    .map_err(|source| {
                        DeployError::cloud(format!("create integration for {function}"), source)
                    })?;
                integrations.insert(function, id.clone());
                id
            }
        };
        cloud
            .create_route(&api.api_id, route_key, &integration_target(&integration_id))
            .map_err(|source| DeployError::cloud(format!("create route {route_key}"), source))?;
    }

    let account_id = cloud
        .account_id()
        .map_err(|source| DeployError::cloud("resolve account id", source))?;
    let source_arn = execute_api_source_arn(&config.region, &account_id, &api.api_id);
    for function in integrations.keys() {
        let permission = InvokePermission {
            function_name: function.to_string(),
            statement_id: api_permission_statement_id(&api.api_id, function),
            principal: API_GATEWAY_PRINCIPAL.to_string(),
            source_arn: source_arn.clone(),
        };
        match cloud.add_invoke_permission(&permission) {
            Ok(()) | Err(CloudError::AlreadyExists(_)) => {}
            Err(error) => warn!(function, %error, "could not grant API invoke permission"),
        }
    }

    Ok(api)
}

fn wire_storage_trigger(
    cloud: &impl ControlPlane,
    bucket: &str,
    timestamp: i64,
) -> Result<(), CloudError> {
    let function_arn = cloud.function_arn(INGEST_FUNCTION)?;
    let permission = InvokePermission {
        function_name: INGEST_FUNCTION.to_string(),
        statement_id: storage_permission_statement_id(timestamp),
        principal: STORAGE_PRINCIPAL.to_string(),
        source_arn: bucket_arn(bucket),
    };
    match cloud.add_invoke_permission(&permission) {
        Ok(()) | Err(CloudError::AlreadyExists(_)) => {}
        Err(error) => return Err(error),
    }

    let trigger = StorageTrigger {
        function_arn,
        events: vec![OBJECT_CREATED_EVENT.to_string()],
        suffix: INGEST_SUFFIX.to_string(),
    };
    cloud.put_storage_trigger(bucket, &trigger)?;
    info!(bucket, suffix = INGEST_SUFFIX, "storage trigger configured");
    Ok(())
}

fn configure_site_bucket(cloud: &impl ControlPlane, bucket: &str) -> Result<(), DeployError> {
    cloud
        .configure_website(bucket, INDEX_DOCUMENT)
        .map_err(|source| DeployError::cloud("configure website", source))?;
    cloud
        .put_bucket_policy(bucket, &public_read_policy(bucket).to_string())
        .map_err(|source| DeployError::cloud("attach public-read policy", source))
}

fn upload_seed(
    config: &DeployConfig,
    cloud: &impl ControlPlane,
    bucket: &str,
) -> Result<bool, DeployError> {
    let path = &config.seed_file;
    if !path.is_file() {
        warn!(path = %path.display(), bucket, "seed file not found; upload it manually");
        return Ok(false);
    }
    let body = fs::read(path).map_err(|source| DeployError::Io {
        path: path.clone(),
        source,
    })?;
    cloud
        .put_object(bucket, SEED_OBJECT_KEY, body, None)
        .map_err(|source| DeployError::cloud("upload seed data", source))?;
    info!(bucket, key = SEED_OBJECT_KEY, "seed data uploaded; ingest will run asynchronously");
    Ok(true)
}

/// Polls `ready` until it holds, sleeping the configured interval in between.
fn wait_until(
    config: &DeployConfig,
    what: &str,
    mut ready: impl FnMut() -> Result<bool, CloudError>,
) -> Result<(), DeployError> {
    let attempts = config.max_wait_attempts.max(1);
    for attempt in 1..=attempts {
        if ready().map_err(|source| DeployError::cloud(format!("wait for {what}"), source))? {
            return Ok(());
        }
        debug!(what, attempt, "not ready yet");
        if attempt < attempts {
            std::thread::sleep(config.poll_interval());
        }
    }
    Err(DeployError::Timeout {
        what: what.to_string(),
        attempts,
    })
}
