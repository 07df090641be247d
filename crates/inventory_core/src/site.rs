use std::path::Path;

use serde_json::{json, Value};

use crate::naming::{bucket_objects_arn, API_URL_PLACEHOLDER};

pub const HTML_CONTENT_TYPE: &str = "text/html";
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Substitutes every placeholder occurrence with the live API base URL.
pub fn render_index(template: &str, api_url: &str) -> String {
    template.replace(API_URL_PLACEHOLDER, api_url)
}

/// Content type guessed from the file extension, `text/plain` when unknown.
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}

/// Bucket policy letting anyone read objects of a static-site bucket.
pub fn public_read_policy(bucket: &str) -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicRead",
            "Effect": "Allow",
            "Principal": "*",
            "Action": "s3:GetObject",
            "Resource": bucket_objects_arn(bucket),
        }]
    })
}
