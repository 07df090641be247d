use inventory_core::contract::{ApiGatewayResponse, TOPIC_ARN_ENV};
use inventory_lambda::adapters::aws::SnsContactNotifier;
use inventory_lambda::adapters::notifier::ContactNotifier;
use inventory_lambda::handlers::contact::handle_contact_event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(
    notifier: Option<&SnsContactNotifier>,
    event: LambdaEvent<Value>,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_contact_event(
        event.payload,
        notifier.map(|value| value as &dyn ContactNotifier),
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let topic_arn = std::env::var(TOPIC_ARN_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty());
    if topic_arn.is_none() {
        tracing::warn!("{TOPIC_ARN_ENV} is not set; contact requests will be rejected");
    }
    let notifier =
        topic_arn.map(|arn| SnsContactNotifier::new(aws_sdk_sns::Client::new(&aws_config), arn));

    lambda_runtime::run(service_fn(|event| handle_request(notifier.as_ref(), event))).await
}
