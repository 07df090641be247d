use thiserror::Error;

pub const PROJECT_TAG_KEY: &str = "project";

pub const INGEST_FUNCTION: &str = "load_inventory";
pub const QUERY_FUNCTION: &str = "get_inventory_api";
pub const CONTACT_FUNCTION: &str = "handle_contact";
pub const ALL_FUNCTIONS: [&str; 3] = [INGEST_FUNCTION, QUERY_FUNCTION, CONTACT_FUNCTION];

pub const INDEX_DOCUMENT: &str = "index.html";
pub const SEED_OBJECT_KEY: &str = "inventory.csv";
pub const INGEST_SUFFIX: &str = ".csv";
pub const API_URL_PLACEHOLDER: &str = "REPLACE_ME_WITH_YOUR_INVOKE_URL";

pub const MAX_PROJECT_NAME_LEN: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketRole {
    Ingest,
    Web,
}

impl BucketRole {
    fn as_str(self) -> &'static str {
        match self {
            Self::Ingest => "ingest",
            Self::Web => "web",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamingError {
    #[error("project name must not be empty")]
    Empty,
    #[error("project name must be at most {MAX_PROJECT_NAME_LEN} characters, got {0}")]
    TooLong(usize),
    #[error("project name `{0}` may only contain lowercase letters, digits and hyphens")]
    InvalidCharacters(String),
}

/// Project names end up inside bucket names, so they follow bucket naming rules.
pub fn validate_project_name(project: &str) -> Result<(), NamingError> {
    if project.is_empty() {
        return Err(NamingError::Empty);
    }
    if project.len() > MAX_PROJECT_NAME_LEN {
        return Err(NamingError::TooLong(project.len()));
    }
    let valid = project
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
    if !valid || project.starts_with('-') || project.ends_with('-') {
        return Err(NamingError::InvalidCharacters(project.to_string()));
    }
    Ok(())
}

pub fn bucket_name(project: &str, role: BucketRole, timestamp: i64) -> String {
    format!("{project}-{}-{timestamp}", role.as_str())
}

pub fn topic_name(project: &str, timestamp: i64) -> String {
    format!("{project}-contact-{timestamp}")
}

pub fn api_name(project: &str) -> String {
    format!("{project}-api")
}

/// Teardown selects buckets and topics by this test alone (optionally plus tags).
pub fn matches_project(resource_name: &str, project: &str) -> bool {
    !project.is_empty() && resource_name.contains(project)
}

pub fn bucket_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}")
}

pub fn bucket_objects_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}/*")
}

pub fn execute_api_source_arn(region: &str, account_id: &str, api_id: &str) -> String {
    format!("arn:aws:execute-api:{region}:{account_id}:{api_id}/*/*")
}

pub fn integration_target(integration_id: &str) -> String {
    format!("integrations/{integration_id}")
}

pub fn api_permission_statement_id(api_id: &str, function: &str) -> String {
    format!("api-{api_id}-{function}")
}

pub fn storage_permission_statement_id(timestamp: i64) -> String {
    format!("s3-trigger-{timestamp}")
}

pub fn website_url(bucket: &str, region: &str) -> String {
    format!("http://{bucket}.s3-website-{region}.amazonaws.com/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_and_topic_names_embed_project() {
        let ingest = bucket_name("cafe-demo", BucketRole::Ingest, 1_768_469_447);
        let web = bucket_name("cafe-demo", BucketRole::Web, 1_768_469_447);
        let topic = topic_name("cafe-demo", 1_768_469_447);

        assert_eq!(ingest, "cafe-demo-ingest-1768469447");
        assert_eq!(web, "cafe-demo-web-1768469447");
        assert!(matches_project(&ingest, "cafe-demo"));
        assert!(matches_project(&web, "cafe-demo"));
        assert!(matches_project(&topic, "cafe-demo"));
        assert!(!matches_project("other-bucket", "cafe-demo"));
        assert!(!matches_project("anything", ""));
    }

    #[test]
    fn longest_project_name_still_fits_bucket_limit() {
        let project = "a".repeat(MAX_PROJECT_NAME_LEN);
        validate_project_name(&project).expect("max length is valid");
        assert!(bucket_name(&project, BucketRole::Ingest, 9_999_999_999).len() <= 63);
    }

    #[test]
    fn rejects_invalid_project_names() {
        assert_eq!(validate_project_name(""), Err(NamingError::Empty));
        assert_eq!(
            validate_project_name(&"a".repeat(41)),
            Err(NamingError::TooLong(41))
        );
        assert!(matches!(
            validate_project_name("Cafe_Demo"),
            Err(NamingError::InvalidCharacters(_))
        ));
        assert!(matches!(
            validate_project_name("-cafe"),
            Err(NamingError::InvalidCharacters(_))
        ));
    }

    #[test]
    fn arns_follow_service_formats() {
        assert_eq!(bucket_arn("b"), "arn:aws:s3:::b");
        assert_eq!(bucket_objects_arn("b"), "arn:aws:s3:::b/*");
        assert_eq!(
            execute_api_source_arn("eu-west-1", "123456789012", "abc123"),
            "arn:aws:execute-api:eu-west-1:123456789012:abc123/*/*"
        );
        assert_eq!(integration_target("int1"), "integrations/int1");
        assert_eq!(
            api_permission_statement_id("abc123", QUERY_FUNCTION),
            "api-abc123-get_inventory_api"
        );
        assert_eq!(
            website_url("cafe-web-1", "us-east-1"),
            "http://cafe-web-1.s3-website-us-east-1.amazonaws.com/"
        );
    }
}
