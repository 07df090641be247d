use std::collections::HashMap;
use std::future::Future;

use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, PutRequest, WriteRequest};
use inventory_core::contract::{InventoryItem, PARTITION_KEY, SORT_KEY};
use inventory_core::ingest::WRITE_BATCH_SIZE;
use serde_json::Value;

use crate::adapters::notifier::ContactNotifier;
use crate::adapters::object_source::ObjectSource;
use crate::adapters::table::InventoryTable;

/// How many times a batch's unprocessed items are resubmitted before giving up.
const MAX_UNPROCESSED_RESUBMITS: usize = 5;

type DynamoItem = HashMap<String, AttributeValue>;

/// Runs an SDK future from a synchronous port method inside the Lambda runtime.
fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

pub struct DynamoInventoryTable {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoInventoryTable {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn write_in_batches(&self, requests: Vec<WriteRequest>) -> Result<(), String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();

        block_on(async move {
            for chunk in requests.chunks(WRITE_BATCH_SIZE) {
                let mut pending = chunk.to_vec();
                let mut resubmits = 0;

                while !pending.is_empty() {
                    if resubmits > MAX_UNPROCESSED_RESUBMITS {
                        return Err(format!(
                            "{} write requests to {table_name} were still unprocessed after {MAX_UNPROCESSED_RESUBMITS} resubmits",
                            pending.len()
                        ));
                    }
                    resubmits += 1;

                    let response = client
                        .batch_write_item()
                        .request_items(&table_name, pending)
                        .send()
                        .await
                        .map_err(|error| {
                            format!(
                                "failed to batch write to {table_name}: {}",
                                aws_sdk_dynamodb::error::DisplayErrorContext(&error)
                            )
                        })?;

                    pending = response
                        .unprocessed_items()
                        .and_then(|items| items.get(&table_name))
                        .cloned()
                        .unwrap_or_default();
                }
            }
            Ok(())
        })
    }
}

impl InventoryTable for DynamoInventoryTable {
    fn scan_items(&self) -> Result<Vec<InventoryItem>, String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();

        block_on(async move {
            let mut items = Vec::new();
            let mut start_key: Option<DynamoItem> = None;

            loop {
                let response = client
                    .scan()
                    .table_name(&table_name)
                    .set_exclusive_start_key(start_key.take())
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to scan {table_name}: {}",
                            aws_sdk_dynamodb::error::DisplayErrorContext(&error)
                        )
                    })?;

                items.extend(response.items().iter().map(item_to_json));

                match response.last_evaluated_key() {
                    Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                    _ => break,
                }
            }

            Ok(items)
        })
    }

    fn query_store(&self, store: &str) -> Result<Vec<InventoryItem>, String> {
        let client = self.client.clone();
        let table_name = self.table_name.clone();
        let store = store.to_string();

        block_on(async move {
            let mut items = Vec::new();
            let mut start_key: Option<DynamoItem> = None;

            loop {
                let response = client
                    .query()
                    .table_name(&table_name)
                    .key_condition_expression("#store = :store")
                    .expression_attribute_names("#store", PARTITION_KEY)
                    .expression_attribute_values(":store", AttributeValue::S(store.clone()))
                    .set_exclusive_start_key(start_key.take())
                    .send()
                    .await
                    .map_err(|error| {
                        format!(
                            "failed to query {table_name} for store {store}: {}",
                            aws_sdk_dynamodb::error::DisplayErrorContext(&error)
                        )
                    })?;

                items.extend(response.items().iter().map(item_to_json));

                match response.last_evaluated_key() {
                    Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                    _ => break,
                }
            }

            Ok(items)
        })
    }

    fn delete_items(&self, keys: &[(String, String)]) -> Result<(), String> {
        let mut requests = Vec::with_capacity(keys.len());
        for (store, item) in keys {
            let delete = DeleteRequest::builder()
                .key(PARTITION_KEY, AttributeValue::S(store.clone()))
                .key(SORT_KEY, AttributeValue::S(item.clone()))
                .build()
                .map_err(|error| format!("invalid delete request: {error}"))?;
            requests.push(WriteRequest::builder().delete_request(delete).build());
        }
        self.write_in_batches(requests)
    }

    fn put_items(&self, items: &[InventoryItem]) -> Result<(), String> {
        let mut requests = Vec::with_capacity(items.len());
        for item in items {
            let put = PutRequest::builder()
                .set_item(Some(json_to_item(item)))
                .build()
                .map_err(|error| format!("invalid put request: {error}"))?;
            requests.push(WriteRequest::builder().put_request(put).build());
        }
        self.write_in_batches(requests)
    }
}

pub struct S3ObjectSource {
    client: aws_sdk_s3::Client,
}

impl S3ObjectSource {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

impl ObjectSource for S3ObjectSource {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        let client = self.client.clone();
        let bucket = bucket.to_string();
        let key = key.to_string();

        block_on(async move {
            let response = client
                .get_object()
                .bucket(&bucket)
                .key(&key)
                .send()
                .await
                .map_err(|error| {
                    format!(
                        "failed to read s3://{bucket}/{key}: {}",
                        aws_sdk_s3::error::DisplayErrorContext(&error)
                    )
                })?;

            let bytes = response
                .body
                .collect()
                .await
                .map_err(|error| format!("failed to read body of s3://{bucket}/{key}: {error}"))?
                .into_bytes();
            Ok(bytes.to_vec())
        })
    }
}

pub struct SnsContactNotifier {
    client: aws_sdk_sns::Client,
    topic_arn: String,
}

impl SnsContactNotifier {
    pub fn new(client: aws_sdk_sns::Client, topic_arn: impl Into<String>) -> Self {
        Self {
            client,
            topic_arn: topic_arn.into(),
        }
    }
}

impl ContactNotifier for SnsContactNotifier {
    fn publish(&self, subject: &str, message: &str) -> Result<(), String> {
        let client = self.client.clone();
        let topic_arn = self.topic_arn.clone();
        let subject = subject.to_string();
        let message = message.to_string();

        block_on(async move {
            client
                .publish()
                .topic_arn(&topic_arn)
                .subject(subject)
                .message(message)
                .send()
                .await
                .map(|_| ())
                .map_err(|error| {
                    format!(
                        "failed to publish to {topic_arn}: {}",
                        aws_sdk_sns::error::DisplayErrorContext(&error)
                    )
                })
        })
    }
}

fn item_to_json(item: &DynamoItem) -> InventoryItem {
    item.iter()
        .filter_map(|(name, value)| attribute_to_json(value).map(|json| (name.clone(), json)))
        .collect()
}

fn attribute_to_json(value: &AttributeValue) -> Option<Value> {
    match value {
        AttributeValue::S(text) => Some(Value::String(text.clone())),
        AttributeValue::N(number) => {
            if let Ok(integer) = number.parse::<i64>() {
                Some(Value::from(integer))
            } else {
                number
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
            }
        }
        AttributeValue::Bool(flag) => Some(Value::Bool(*flag)),
        AttributeValue::Null(_) => Some(Value::Null),
        AttributeValue::L(list) => Some(Value::Array(
            list.iter().filter_map(attribute_to_json).collect(),
        )),
        AttributeValue::M(map) => Some(Value::Object(item_to_json(map))),
        _ => None,
    }
}

fn json_to_item(item: &InventoryItem) -> DynamoItem {
    item.iter()
        .map(|(name, value)| (name.clone(), json_to_attribute(value)))
        .collect()
}

fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(json_to_item(map)),
    }
}
