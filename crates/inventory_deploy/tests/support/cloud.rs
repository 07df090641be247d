#![allow(dead_code)]

use std::cell::{Ref, RefCell, RefMut};
use std::collections::{BTreeMap, BTreeSet};

use inventory_deploy::control_plane::{
    ApiSummary, ControlPlane, CorsRules, FunctionSpec, HttpApi, InvokePermission, StorageTrigger,
    TableSpec, TableStatus, Tags,
};
use inventory_deploy::error::CloudError;

pub const ACCOUNT_ID: &str = "123456789012";
pub const REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct FakeTable {
    pub spec: Option<TableSpec>,
    pub status: TableStatus,
    /// Polls a `Deleting` table survives before it disappears.
    pub polls_until_gone: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FakeObject {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeBucket {
    pub tags: Tags,
    pub public_access_blocked: bool,
    pub website_index: Option<String>,
    pub policy: Option<String>,
    pub trigger: Option<StorageTrigger>,
    pub objects: BTreeMap<String, FakeObject>,
}

#[derive(Debug, Clone)]
pub struct FakeFunction {
    pub spec: FunctionSpec,
    pub arn: String,
    pub code_updates: u32,
    pub configuration_updates: u32,
}

#[derive(Debug, Clone)]
pub struct FakeApi {
    pub name: String,
    pub cors: Option<CorsRules>,
    pub tags: Tags,
    pub default_stage: bool,
    /// Integration id to function ARN.
    pub integrations: BTreeMap<String, String>,
    /// Route key to target.
    pub routes: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
pub struct CloudState {
    pub roles: BTreeSet<String>,
    pub tables: BTreeMap<String, FakeTable>,
    pub tables_created: u32,
    pub buckets: BTreeMap<String, FakeBucket>,
    /// Topic ARN to tags.
    pub topics: BTreeMap<String, Tags>,
    pub subscriptions: Vec<(String, String)>,
    pub functions: BTreeMap<String, FakeFunction>,
    pub permissions: Vec<InvokePermission>,
    pub apis: BTreeMap<String, FakeApi>,
    pub failing: BTreeSet<&'static str>,
    pub calls: Vec<&'static str>,
    next_id: u32,
}

/// In-memory control plane. Every created resource becomes ready immediately.
pub struct FakeCloud {
    state: RefCell<CloudState>,
}

impl FakeCloud {
    pub fn with_role(role_name: &str) -> Self {
        let cloud = Self::empty();
        cloud.state_mut().roles.insert(role_name.to_string());
        cloud
    }

    pub fn empty() -> Self {
        Self {
            state: RefCell::new(CloudState::default()),
        }
    }

    pub fn state(&self) -> Ref<'_, CloudState> {
        self.state.borrow()
    }

    pub fn state_mut(&self) -> RefMut<'_, CloudState> {
        self.state.borrow_mut()
    }

    /// Every later call to `operation` fails with a service error.
    pub fn fail(&self, operation: &'static str) {
        self.state_mut().failing.insert(operation);
    }

    pub fn add_table(&self, name: &str, status: TableStatus, polls_until_gone: u32) {
        self.state_mut().tables.insert(
            name.to_string(),
            FakeTable {
                spec: None,
                status,
                polls_until_gone,
            },
        );
    }

    pub fn add_bucket(&self, name: &str, tags: Tags, object_keys: &[&str]) {
        let bucket = FakeBucket {
            tags,
            objects: object_keys
                .iter()
                .map(|key| (key.to_string(), FakeObject::default()))
                .collect(),
            ..FakeBucket::default()
        };
        self.state_mut().buckets.insert(name.to_string(), bucket);
    }

    pub fn add_topic(&self, name: &str, tags: Tags) -> String {
        let arn = topic_arn(name);
        self.state_mut().topics.insert(arn.clone(), tags);
        arn
    }

    pub fn add_api(&self, name: &str, tags: Tags) -> String {
        let mut state = self.state_mut();
        let api_id = next_id(&mut state, "api");
        state.apis.insert(api_id.clone(), new_api(name, None, tags));
        api_id
    }

    pub fn function_names(&self) -> Vec<String> {
        self.state().functions.keys().cloned().collect()
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.state().buckets.keys().cloned().collect()
    }

    pub fn called(&self, operation: &'static str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    fn enter(&self, operation: &'static str) -> Result<RefMut<'_, CloudState>, CloudError> {
        let mut state = self.state_mut();
        state.calls.push(operation);
        if state.failing.contains(operation) {
            return Err(CloudError::service(operation, "simulated failure"));
        }
        Ok(state)
    }
}

fn topic_arn(name: &str) -> String {
    format!("arn:aws:sns:{REGION}:{ACCOUNT_ID}:{name}")
}

fn function_arn(name: &str) -> String {
    format!("arn:aws:lambda:{REGION}:{ACCOUNT_ID}:function:{name}")
}

fn next_id(state: &mut CloudState, prefix: &str) -> String {
    state.next_id += 1;
    format!("{prefix}{:04}", state.next_id)
}

fn new_api(name: &str, cors: Option<CorsRules>, tags: Tags) -> FakeApi {
    FakeApi {
        name: name.to_string(),
        cors,
        tags,
        default_stage: false,
        integrations: BTreeMap::new(),
        routes: BTreeMap::new(),
    }
}

fn missing(resource: &str) -> CloudError {
    CloudError::NotFound(resource.to_string())
}

impl ControlPlane for FakeCloud {
    fn role_arn(&self, role_name: &str) -> Result<String, CloudError> {
        let state = self.enter("role_arn")?;
        if state.roles.contains(role_name) {
            Ok(format!("arn:aws:iam::{ACCOUNT_ID}:role/{role_name}"))
        } else {
            Err(missing(role_name))
        }
    }

    fn account_id(&self) -> Result<String, CloudError> {
        self.enter("account_id")?;
        Ok(ACCOUNT_ID.to_string())
    }

    fn create_table(&self, table: &TableSpec) -> Result<(), CloudError> {
        let mut state = self.enter("create_table")?;
        if state.tables.contains_key(&table.name) {
            return Err(CloudError::AlreadyExists(table.name.clone()));
        }
        state.tables_created += 1;
        state.tables.insert(
            table.name.clone(),
            FakeTable {
                spec: Some(table.clone()),
                status: TableStatus::Active,
                polls_until_gone: 0,
            },
        );
        Ok(())
    }

    fn table_status(&self, table_name: &str) -> Result<TableStatus, CloudError> {
        let mut state = self.enter("table_status")?;
        let Some(table) = state.tables.get_mut(table_name) else {
            return Ok(TableStatus::Missing);
        };
        if table.status != TableStatus::Deleting {
            return Ok(table.status.clone());
        }
        if table.polls_until_gone > 0 {
            table.polls_until_gone -= 1;
            return Ok(TableStatus::Deleting);
        }
        state.tables.remove(table_name);
        Ok(TableStatus::Missing)
    }

    fn delete_table(&self, table_name: &str) -> Result<(), CloudError> {
        let mut state = self.enter("delete_table")?;
        state
            .tables
            .remove(table_name)
            .map(|_| ())
            .ok_or_else(|| missing(table_name))
    }

    fn create_bucket(&self, bucket: &str, tags: &Tags) -> Result<(), CloudError> {
        let mut state = self.enter("create_bucket")?;
        if state.buckets.contains_key(bucket) {
            return Err(CloudError::AlreadyExists(bucket.to_string()));
        }
        state.buckets.insert(
            bucket.to_string(),
            FakeBucket {
                tags: tags.clone(),
                public_access_blocked: true,
                ..FakeBucket::default()
            },
        );
        Ok(())
    }

    fn remove_public_access_block(&self, bucket: &str) -> Result<(), CloudError> {
        let mut state = self.enter("remove_public_access_block")?;
        let entry = state.buckets.get_mut(bucket).ok_or_else(|| missing(bucket))?;
        entry.public_access_blocked = false;
        Ok(())
    }

    fn configure_website(&self, bucket: &str, index_document: &str) -> Result<(), CloudError> {
        let mut state = self.enter("configure_website")?;
        let entry = state.buckets.get_mut(bucket).ok_or_else(|| missing(bucket))?;
        entry.website_index = Some(index_document.to_string());
        Ok(())
    }

    fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), CloudError> {
        let mut state = self.enter("put_bucket_policy")?;
        let entry = state.buckets.get_mut(bucket).ok_or_else(|| missing(bucket))?;
        entry.policy = Some(policy.to_string());
        Ok(())
    }

    fn put_storage_trigger(
        &self,
        bucket: &str,
        trigger: &StorageTrigger,
    ) -> Result<(), CloudError> {
        let mut state = self.enter("put_storage_trigger")?;
        let entry = state.buckets.get_mut(bucket).ok_or_else(|| missing(bucket))?;
        entry.trigger = Some(trigger.clone());
        Ok(())
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), CloudError> {
        let mut state = self.enter("put_object")?;
        let entry = state.buckets.get_mut(bucket).ok_or_else(|| missing(bucket))?;
        entry.objects.insert(
            key.to_string(),
            FakeObject {
                body,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    fn list_buckets(&self) -> Result<Vec<String>, CloudError> {
        let state = self.enter("list_buckets")?;
        Ok(state.buckets.keys().cloned().collect())
    }

    fn bucket_tags(&self, bucket: &str) -> Result<Tags, CloudError> {
        let state = self.enter("bucket_tags")?;
        state
            .buckets
            .get(bucket)
            .map(|entry| entry.tags.clone())
            .ok_or_else(|| missing(bucket))
    }

    fn list_object_keys(&self, bucket: &str) -> Result<Vec<String>, CloudError> {
        let state = self.enter("list_object_keys")?;
        state
            .buckets
            .get(bucket)
            .map(|entry| entry.objects.keys().cloned().collect())
            .ok_or_else(|| missing(bucket))
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), CloudError> {
        let mut state = self.enter("delete_object")?;
        let entry = state.buckets.get_mut(bucket).ok_or_else(|| missing(bucket))?;
        entry.objects.remove(key);
        Ok(())
    }

    fn delete_bucket(&self, bucket: &str) -> Result<(), CloudError> {
        let mut state = self.enter("delete_bucket")?;
        let entry = state.buckets.get(bucket).ok_or_else(|| missing(bucket))?;
        if !entry.objects.is_empty() {
            return Err(CloudError::service("delete_bucket", "BucketNotEmpty"));
        }
        state.buckets.remove(bucket);
        Ok(())
    }

    fn create_topic(&self, name: &str, tags: &Tags) -> Result<String, CloudError> {
        let mut state = self.enter("create_topic")?;
        let arn = topic_arn(name);
        state.topics.insert(arn.clone(), tags.clone());
        Ok(arn)
    }

    fn subscribe_email(&self, topic_arn: &str, email: &str) -> Result<(), CloudError> {
        let mut state = self.enter("subscribe_email")?;
        state
            .subscriptions
            .push((topic_arn.to_string(), email.to_string()));
        Ok(())
    }

    fn list_topics(&self) -> Result<Vec<String>, CloudError> {
        let state = self.enter("list_topics")?;
        Ok(state.topics.keys().cloned().collect())
    }

    fn topic_tags(&self, topic_arn: &str) -> Result<Tags, CloudError> {
        let state = self.enter("topic_tags")?;
        state
            .topics
            .get(topic_arn)
            .cloned()
            .ok_or_else(|| missing(topic_arn))
    }

    fn delete_topic(&self, topic_arn: &str) -> Result<(), CloudError> {
        let mut state = self.enter("delete_topic")?;
        state
            .topics
            .remove(topic_arn)
            .map(|_| ())
            .ok_or_else(|| missing(topic_arn))
    }

    fn create_function(&self, function: &FunctionSpec) -> Result<(), CloudError> {
        let mut state = self.enter("create_function")?;
        if state.functions.contains_key(&function.name) {
            return Err(CloudError::AlreadyExists(function.name.clone()));
        }
        state.functions.insert(
            function.name.clone(),
            FakeFunction {
                spec: function.clone(),
                arn: function_arn(&function.name),
                code_updates: 0,
                configuration_updates: 0,
            },
        );
        Ok(())
    }

    fn update_function_code(&self, name: &str, archive: &[u8]) -> Result<(), CloudError> {
        let mut state = self.enter("update_function_code")?;
        let entry = state.functions.get_mut(name).ok_or_else(|| missing(name))?;
        entry.spec.archive = archive.to_vec();
        entry.code_updates += 1;
        Ok(())
    }

    fn update_function_configuration(&self, function: &FunctionSpec) -> Result<(), CloudError> {
        let mut state = self.enter("update_function_configuration")?;
        let entry = state
            .functions
            .get_mut(&function.name)
            .ok_or_else(|| missing(&function.name))?;
        entry.spec.environment = function.environment.clone();
        entry.spec.role_arn = function.role_arn.clone();
        entry.spec.timeout_secs = function.timeout_secs;
        entry.configuration_updates += 1;
        Ok(())
    }

    fn function_update_in_progress(&self, name: &str) -> Result<bool, CloudError> {
        let state = self.enter("function_update_in_progress")?;
        if state.functions.contains_key(name) {
            Ok(false)
        } else {
            Err(missing(name))
        }
    }

    fn function_arn(&self, name: &str) -> Result<String, CloudError> {
        let state = self.enter("function_arn")?;
        state
            .functions
            .get(name)
            .map(|entry| entry.arn.clone())
            .ok_or_else(|| missing(name))
    }

    fn add_invoke_permission(&self, permission: &InvokePermission) -> Result<(), CloudError> {
        let mut state = self.enter("add_invoke_permission")?;
        if !state.functions.contains_key(&permission.function_name) {
            return Err(missing(&permission.function_name));
        }
        let duplicate = state.permissions.iter().any(|existing| {
            existing.function_name == permission.function_name
                && existing.statement_id == permission.statement_id
        });
        if duplicate {
            return Err(CloudError::AlreadyExists(permission.statement_id.clone()));
        }
        state.permissions.push(permission.clone());
        Ok(())
    }

    fn delete_function(&self, name: &str) -> Result<(), CloudError> {
        let mut state = self.enter("delete_function")?;
        state
            .functions
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| missing(name))?;
        state
            .permissions
            .retain(|permission| permission.function_name != name);
        Ok(())
    }

    fn create_http_api(
        &self,
        name: &str,
        cors: &CorsRules,
        tags: &Tags,
    ) -> Result<HttpApi, CloudError> {
        let mut state = self.enter("create_http_api")?;
        let api_id = next_id(&mut state, "api");
        state
            .apis
            .insert(api_id.clone(), new_api(name, Some(cors.clone()), tags.clone()));
        Ok(HttpApi {
            endpoint: format!("https://{api_id}.execute-api.{REGION}.amazonaws.com"),
            api_id,
        })
    }

    fn create_default_stage(&self, api_id: &str) -> Result<(), CloudError> {
        let mut state = self.enter("create_default_stage")?;
        let api = state.apis.get_mut(api_id).ok_or_else(|| missing(api_id))?;
        api.default_stage = true;
        Ok(())
    }

    fn create_proxy_integration(
        &self,
        api_id: &str,
        function_arn: &str,
    ) -> Result<String, CloudError> {
        let mut state = self.enter("create_proxy_integration")?;
        let integration_id = next_id(&mut state, "int");
        let api = state.apis.get_mut(api_id).ok_or_else(|| missing(api_id))?;
        api.integrations
            .insert(integration_id.clone(), function_arn.to_string());
        Ok(integration_id)
    }

    fn create_route(&self, api_id: &str, route_key: &str, target: &str) -> Result<(), CloudError> {
        let mut state = self.enter("create_route")?;
        let api = state.apis.get_mut(api_id).ok_or_else(|| missing(api_id))?;
        if api.routes.contains_key(route_key) {
            return Err(CloudError::AlreadyExists(route_key.to_string()));
        }
        api.routes.insert(route_key.to_string(), target.to_string());
        Ok(())
    }

    fn list_apis(&self) -> Result<Vec<ApiSummary>, CloudError> {
        let state = self.enter("list_apis")?;
        Ok(state
            .apis
            .iter()
            .map(|(api_id, api)| ApiSummary {
                api_id: api_id.clone(),
                name: api.name.clone(),
                tags: api.tags.clone(),
            })
            .collect())
    }

    fn delete_api(&self, api_id: &str) -> Result<(), CloudError> {
        let mut state = self.enter("delete_api")?;
        state
            .apis
            .remove(api_id)
            .map(|_| ())
            .ok_or_else(|| missing(api_id))
    }
}
