use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use inventory_core::contract::DEFAULT_TABLE_NAME;
use inventory_core::naming::{api_name, validate_project_name, NamingError, PROJECT_TAG_KEY};

use crate::control_plane::Tags;

/// Settings shared by `deploy` and `teardown`, resolved once at startup.
#[derive(Debug, Clone, Args)]
pub struct DeployConfig {
    /// AWS region to provision into
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1", global = true)]
    pub region: String,
    /// Name embedded in every bucket and topic; teardown matches on it
    #[arg(
        long,
        env = "PROJECT_NAME",
        default_value = "practica-cloud-2026",
        global = true
    )]
    pub project_name: String,
    /// Email subscribed to contact notifications (skipped when empty)
    #[arg(long, env = "MY_EMAIL", default_value = "", global = true)]
    pub notification_email: String,
    /// Inventory table name
    #[arg(long, env = "TABLE_NAME", default_value = DEFAULT_TABLE_NAME, global = true)]
    pub table_name: String,
    /// Pre-existing execution role assumed by the functions
    #[arg(long, env = "LAMBDA_ROLE_NAME", default_value = "LabRole", global = true)]
    pub role_name: String,
    /// Directory holding `<function>/bootstrap` handler binaries
    #[arg(long, env = "LAMBDAS_DIR", default_value = "dist/lambdas", global = true)]
    pub lambdas_dir: PathBuf,
    /// Static site root containing the `index.html` template
    #[arg(long, env = "WEB_DIR", default_value = "web", global = true)]
    pub web_dir: PathBuf,
    /// Inventory file uploaded to the ingest bucket after deploy
    #[arg(
        long,
        env = "SEED_FILE",
        default_value = "inventory/inventory.csv",
        global = true
    )]
    pub seed_file: PathBuf,
    /// Seconds between readiness checks
    #[arg(long, default_value_t = 2, global = true)]
    pub poll_interval_secs: u64,
    /// Readiness checks before giving up
    #[arg(long, default_value_t = 60, global = true)]
    pub max_wait_attempts: u32,
}

impl DeployConfig {
    pub fn validate(&self) -> Result<(), NamingError> {
        validate_project_name(&self.project_name)
    }

    /// The email to subscribe, if one that looks like an address was given.
    pub fn subscription_email(&self) -> Option<&str> {
        let email = self.notification_email.trim();
        email.contains('@').then_some(email)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn api_name(&self) -> String {
        api_name(&self.project_name)
    }

    pub fn project_tags(&self) -> Tags {
        Tags::from([(PROJECT_TAG_KEY.to_string(), self.project_name.clone())])
    }

    pub fn carries_project_tag(&self, tags: &Tags) -> bool {
        tags.get(PROJECT_TAG_KEY)
            .map(|value| value == &self.project_name)
            .unwrap_or(false)
    }
}
