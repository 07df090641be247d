#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use inventory_core::naming::{ALL_FUNCTIONS, API_URL_PLACEHOLDER};
use inventory_deploy::config::DeployConfig;
use tempfile::TempDir;

use super::cloud::REGION;

pub const PROJECT: &str = "cafe-demo";
pub const ROLE: &str = "LabRole";
pub const TABLE: &str = "Inventory";
pub const SEED_CSV: &str = "Store,Item,Count\nCentro,Cafe,10\nNorte,Te,4\n";

/// On-disk inputs of a deploy run: handler binaries, site files and seed data.
pub struct TestWorkspace {
    root: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        let workspace = Self {
            root: tempfile::tempdir().expect("workspace dir"),
        };
        for function in ALL_FUNCTIONS {
            workspace.write_binary(function);
        }
        workspace.write(
            "web/index.html",
            &format!("<script>const API_URL = '{API_URL_PLACEHOLDER}';</script>"),
        );
        workspace.write("web/css/styles.css", "body { margin: 0; }");
        workspace.write("inventory/inventory.csv", SEED_CSV);
        workspace
    }
}

impl TestWorkspace {
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dir");
        }
        fs::write(path, contents).expect("write workspace file");
    }

    pub fn write_binary(&self, function: &str) {
        self.write(
            &format!("dist/lambdas/{function}/bootstrap"),
            &format!("binary for {function}"),
        );
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_file(self.path().join(relative)).expect("remove workspace file");
    }

    pub fn config(&self) -> DeployConfig {
        DeployConfig {
            region: REGION.to_string(),
            project_name: PROJECT.to_string(),
            notification_email: "ops@example.com".to_string(),
            table_name: TABLE.to_string(),
            role_name: ROLE.to_string(),
            lambdas_dir: self.joined("dist/lambdas"),
            web_dir: self.joined("web"),
            seed_file: self.joined("inventory/inventory.csv"),
            poll_interval_secs: 0,
            max_wait_attempts: 5,
        }
    }

    fn joined(&self, relative: &str) -> PathBuf {
        self.path().join(relative)
    }
}
