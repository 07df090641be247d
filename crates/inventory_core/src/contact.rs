use thiserror::Error;

use crate::contract::ContactRequest;

/// The notification service rejects subjects longer than this.
pub const MAX_SUBJECT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("malformed contact body: {0}")]
    MalformedBody(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactNotification {
    pub subject: String,
    pub message: String,
}

/// Parses a `POST /contact` body. A missing or blank body means "all defaults".
pub fn parse_contact_body(body: Option<&str>) -> Result<ContactRequest, ContactError> {
    let text = body.map(str::trim).filter(|text| !text.is_empty()).unwrap_or("{}");
    serde_json::from_str(text).map_err(|error| ContactError::MalformedBody(error.to_string()))
}

pub fn compose_notification(request: &ContactRequest) -> ContactNotification {
    let subject: String = format!("Nuevo contacto Web: {}", request.first_name)
        .chars()
        .take(MAX_SUBJECT_CHARS)
        .collect();
    let message = format!(
        "Nuevo mensaje de {} ({}):\n\n{}",
        request.first_name, request.email, request.message
    );
    ContactNotification { subject, message }
}
