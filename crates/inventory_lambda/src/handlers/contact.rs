use inventory_core::contact::{compose_notification, parse_contact_body};
use inventory_core::contract::{ApiGatewayResponse, HttpApiRequest, TOPIC_ARN_ENV};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::adapters::notifier::ContactNotifier;

/// Forwards a contact form submission to the notification topic.
///
/// `notifier` is `None` when the function was deployed without a topic.
pub fn handle_contact_event(
    event: Value,
    notifier: Option<&dyn ContactNotifier>,
) -> ApiGatewayResponse {
    let Some(notifier) = notifier else {
        return ApiGatewayResponse::json(
            500,
            contact_headers(),
            &json!({
                "error": "misconfiguration",
                "message": format!("{TOPIC_ARN_ENV} must be configured"),
            }),
        );
    };

    let request = match serde_json::from_value::<HttpApiRequest>(event) {
        Ok(value) => value,
        Err(error) => {
            return ApiGatewayResponse::error(
                500,
                contact_headers(),
                format!("invalid request event: {error}"),
            )
        }
    };

    let contact = match parse_contact_body(request.body.as_deref()) {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "rejected contact request");
            return ApiGatewayResponse::error(500, contact_headers(), error.to_string());
        }
    };

    let notification = compose_notification(&contact);
    info!(sender = %contact.first_name, "publishing contact notification");

    match notifier.publish(&notification.subject, &notification.message) {
        Ok(()) => ApiGatewayResponse::json(
            200,
            contact_headers(),
            &json!({ "status": "Message sent!" }),
        ),
        Err(message) => {
            error!(error = %message, "contact notification failed");
            ApiGatewayResponse::error(500, contact_headers(), message)
        }
    }
}

fn contact_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Methods": "POST",
    })
}
