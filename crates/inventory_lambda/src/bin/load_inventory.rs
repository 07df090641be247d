use inventory_core::contract::{IngestResponse, DEFAULT_TABLE_NAME, TABLE_NAME_ENV};
use inventory_lambda::adapters::aws::{DynamoInventoryTable, S3ObjectSource};
use inventory_lambda::handlers::ingest::handle_ingest_event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

struct Dependencies {
    source: S3ObjectSource,
    table: DynamoInventoryTable,
}

async fn handle_request(
    deps: &Dependencies,
    event: LambdaEvent<Value>,
) -> Result<IngestResponse, Error> {
    Ok(handle_ingest_event(event.payload, &deps.source, &deps.table))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let table_name =
        std::env::var(TABLE_NAME_ENV).unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string());
    let deps = Dependencies {
        source: S3ObjectSource::new(aws_sdk_s3::Client::new(&aws_config)),
        table: DynamoInventoryTable::new(aws_sdk_dynamodb::Client::new(&aws_config), table_name),
    };

    lambda_runtime::run(service_fn(|event| handle_request(&deps, event))).await
}
