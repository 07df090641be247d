use std::process::ExitCode;

use clap::{Parser, Subcommand};
use inventory_deploy::aws::AwsControlPlane;
use inventory_deploy::config::DeployConfig;
use inventory_deploy::deploy::{deploy, DeploySummary};
use inventory_deploy::teardown::{teardown, TeardownOptions};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "inventory-deploy",
    about = "Provision or remove the serverless inventory stack",
    long_about = "Creates the inventory table, storage buckets, notification topic,\n\
                  functions, HTTP API and static site for one project, or tears\n\
                  them all down again."
)]
struct Cli {
    #[command(flatten)]
    config: DeployConfig,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create (or refresh) every resource of the project
    Deploy,
    /// Delete every resource of the project, continuing past failures
    Teardown {
        /// Only delete buckets, topics and APIs tagged with the project name
        #[arg(long)]
        tagged_only: bool,
    },
}

// ── Entry point ────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(error) = cli.config.validate() {
        error!(%error, "invalid configuration");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(error) => {
            error!(%error, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };
    let cloud = AwsControlPlane::connect(runtime, &cli.config.region);

    match cli.command {
        Commands::Deploy => match deploy(&cli.config, &cloud) {
            Ok(summary) => {
                print_summary(&summary);
                ExitCode::SUCCESS
            }
            Err(error) => {
                error!(%error, "deploy aborted");
                ExitCode::FAILURE
            }
        },
        Commands::Teardown { tagged_only } => {
            let report = teardown(&cli.config, &cloud, TeardownOptions { tagged_only });
            if !report.failures.is_empty() {
                warn!(
                    failures = report.failures.len(),
                    "some resources could not be removed; rerun teardown or clean up manually"
                );
            }
            ExitCode::SUCCESS
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn print_summary(summary: &DeploySummary) {
    info!(bucket = %summary.ingest_bucket, "ingest bucket (upload .csv files here)");
    info!(bucket = %summary.web_bucket, "website bucket");
    info!(topic = %summary.topic_arn, "contact topic");
    for (function, outcome) in &summary.functions {
        info!(function = %function, ?outcome, "function");
    }
    println!("Website: {}", summary.website_url);
    println!("API:     {}", summary.api_endpoint);
}
