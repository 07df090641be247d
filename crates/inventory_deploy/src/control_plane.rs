//! Synchronous view of the managed-service control planes the orchestrator drives.
//!
//! `deploy` and `teardown` only ever talk to a [`ControlPlane`]. The AWS
//! implementation lives in [`crate::aws`]; tests use an in-memory fake.

use std::collections::BTreeMap;

use crate::error::CloudError;

pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub partition_key: String,
    pub sort_key: String,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
    Missing,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    pub archive: Vec<u8>,
    pub role_arn: String,
    pub runtime: String,
    pub handler: String,
    pub timeout_secs: i32,
    pub environment: BTreeMap<String, String>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokePermission {
    pub function_name: String,
    pub statement_id: String,
    pub principal: String,
    pub source_arn: String,
}

/// Object-created notification delivered to a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageTrigger {
    pub function_arn: String,
    pub events: Vec<String>,
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsRules {
    pub allow_origins: Vec<String>,
    pub allow_methods: Vec<String>,
    pub allow_headers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpApi {
    pub api_id: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSummary {
    pub api_id: String,
    pub name: String,
    pub tags: Tags,
}

pub trait ControlPlane {
    fn role_arn(&self, role_name: &str) -> Result<String, CloudError>;
    fn account_id(&self) -> Result<String, CloudError>;

    /// Fails with [`CloudError::AlreadyExists`] when the table name is taken.
    fn create_table(&self, table: &TableSpec) -> Result<(), CloudError>;
    /// [`TableStatus::Missing`] when the table does not exist.
    fn table_status(&self, table_name: &str) -> Result<TableStatus, CloudError>;
    fn delete_table(&self, table_name: &str) -> Result<(), CloudError>;

    fn create_bucket(&self, bucket: &str, tags: &Tags) -> Result<(), CloudError>;
    fn remove_public_access_block(&self, bucket: &str) -> Result<(), CloudError>;
    fn configure_website(&self, bucket: &str, index_document: &str) -> Result<(), CloudError>;
    fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), CloudError>;
    fn put_storage_trigger(&self, bucket: &str, trigger: &StorageTrigger)
        -> Result<(), CloudError>;
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), CloudError>;
    fn list_buckets(&self) -> Result<Vec<String>, CloudError>;
    fn bucket_tags(&self, bucket: &str) -> Result<Tags, CloudError>;
    fn list_object_keys(&self, bucket: &str) -> Result<Vec<String>, CloudError>;
    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), CloudError>;
    fn delete_bucket(&self, bucket: &str) -> Result<(), CloudError>;

    /// Returns the topic ARN.
    fn create_topic(&self, name: &str, tags: &Tags) -> Result<String, CloudError>;
    fn subscribe_email(&self, topic_arn: &str, email: &str) -> Result<(), CloudError>;
    fn list_topics(&self) -> Result<Vec<String>, CloudError>;
    fn topic_tags(&self, topic_arn: &str) -> Result<Tags, CloudError>;
    fn delete_topic(&self, topic_arn: &str) -> Result<(), CloudError>;

    /// Fails with [`CloudError::AlreadyExists`] when the function name is taken.
    fn create_function(&self, function: &FunctionSpec) -> Result<(), CloudError>;
    fn update_function_code(&self, name: &str, archive: &[u8]) -> Result<(), CloudError>;
    fn update_function_configuration(&self, function: &FunctionSpec) -> Result<(), CloudError>;
    /// True while a create or update is still being applied.
    fn function_update_in_progress(&self, name: &str) -> Result<bool, CloudError>;
    fn function_arn(&self, name: &str) -> Result<String, CloudError>;
    fn add_invoke_permission(&self, permission: &InvokePermission) -> Result<(), CloudError>;
    fn delete_function(&self, name: &str) -> Result<(), CloudError>;

    fn create_http_api(
        &self,
        name: &str,
        cors: &CorsRules,
        tags: &Tags,
    ) -> Result<HttpApi, CloudError>;
    /// Creates the auto-deployed `$default` stage.
    fn create_default_stage(&self, api_id: &str) -> Result<(), CloudError>;
    /// Returns the integration id.
    fn create_proxy_integration(&self, api_id: &str, function_arn: &str)
        -> Result<String, CloudError>;
    fn create_route(&self, api_id: &str, route_key: &str, target: &str) -> Result<(), CloudError>;
    fn list_apis(&self) -> Result<Vec<ApiSummary>, CloudError>;
    fn delete_api(&self, api_id: &str) -> Result<(), CloudError>;
}
