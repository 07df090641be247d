use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PARTITION_KEY: &str = "Store";
pub const SORT_KEY: &str = "Item";
pub const COUNT_ATTRIBUTE: &str = "Count";

pub const DEFAULT_TABLE_NAME: &str = "Inventory";
pub const TABLE_NAME_ENV: &str = "TABLE_NAME";
pub const TOPIC_ARN_ENV: &str = "TOPIC_ARN";

/// One table item as seen by the handlers: attribute name to JSON value.
pub type InventoryItem = serde_json::Map<String, Value>;

/// Response shape understood by HTTP API proxy integrations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl ApiGatewayResponse {
    pub fn json(status_code: u16, headers: Value, payload: &impl Serialize) -> Self {
        let body = serde_json::to_string(payload)
            .unwrap_or_else(|error| json!({ "error": error.to_string() }).to_string());
        Self {
            status_code,
            headers,
            body,
        }
    }

    pub fn error(status_code: u16, headers: Value, message: impl Into<String>) -> Self {
        Self::json(status_code, headers, &json!({ "error": message.into() }))
    }
}

/// The subset of an HTTP API (payload format 2.0) request the handlers read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HttpApiRequest {
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl HttpApiRequest {
    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get(name))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Body of `POST /contact`. Absent fields fall back to the documented labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactRequest {
    #[serde(rename = "firstName", default = "default_contact_name")]
    pub first_name: String,
    #[serde(default = "default_contact_email")]
    pub email: String,
    #[serde(default = "default_contact_message")]
    pub message: String,
}

impl Default for ContactRequest {
    fn default() -> Self {
        Self {
            first_name: default_contact_name(),
            email: default_contact_email(),
            message: default_contact_message(),
        }
    }
}

pub fn default_contact_name() -> String {
    "Cliente".to_string()
}

pub fn default_contact_email() -> String {
    "Anónimo".to_string()
}

pub fn default_contact_message() -> String {
    "Sin mensaje".to_string()
}

/// Object-storage create notification, reduced to what ingest needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageEventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageEventRecord {
    pub s3: StorageEntity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageEntity {
    pub bucket: StorageBucket,
    pub object: StorageObject,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageBucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageObject {
    pub key: String,
}

impl StorageEvent {
    /// Bucket and key of the first record; later records are ignored.
    pub fn first_object(&self) -> Option<(&str, &str)> {
        self.records
            .first()
            .map(|record| (record.s3.bucket.name.as_str(), record.s3.object.key.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}
