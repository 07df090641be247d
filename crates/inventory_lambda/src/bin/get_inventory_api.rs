use inventory_core::contract::{ApiGatewayResponse, DEFAULT_TABLE_NAME, TABLE_NAME_ENV};
use inventory_lambda::adapters::aws::DynamoInventoryTable;
use inventory_lambda::handlers::query::handle_query_event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(
    table: &DynamoInventoryTable,
    event: LambdaEvent<Value>,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_query_event(event.payload, table))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let table_name =
        std::env::var(TABLE_NAME_ENV).unwrap_or_else(|_| DEFAULT_TABLE_NAME.to_string());
    let table = DynamoInventoryTable::new(aws_sdk_dynamodb::Client::new(&aws_config), table_name);

    lambda_runtime::run(service_fn(|event| handle_request(&table, event))).await
}
