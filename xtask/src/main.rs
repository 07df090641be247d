use std::fs;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the serverless inventory workspace",
    long_about = "Builds the Lambda handler binaries, drives the deploy tool\n\
                  and runs CI checks for the serverless inventory workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cross-compile the three handlers into dist/lambdas/<name>/bootstrap
    BuildLambdas {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
    /// Build the handlers, then run `inventory-deploy deploy`
    Deploy {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Extra arguments forwarded to the deploy tool
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Run `inventory-deploy teardown`
    Teardown {
        /// Extra arguments forwarded to the deploy tool
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Check, then build the handler binaries for Lambda
    All,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

const LAMBDA_PACKAGE: &str = "inventory_lambda";
const LAMBDA_BINARIES: [&str; 3] = ["load_inventory", "get_inventory_api", "handle_contact"];
const LAMBDAS_DIST_DIR: &str = "dist/lambdas";
const DEPLOY_PACKAGE: &str = "inventory_deploy";
const LINUX_GNU_LINKER: &str = "x86_64-linux-gnu-gcc";

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn build_lambdas(target: &str, profile: BuildProfile) {
    if let Err(message) = preflight(target) {
        eprintln!("error: {message}");
        exit(1);
    }

    step("Build Lambda handler binaries");

    let mut cargo_args = vec!["build", "-p", LAMBDA_PACKAGE, "--target", target];
    for binary in LAMBDA_BINARIES {
        cargo_args.extend(["--bin", binary]);
    }
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Stage bootstrap binaries");
    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new(LAMBDAS_DIST_DIR);

    for binary in LAMBDA_BINARIES {
        let source = target_dir.join(binary_name(binary, target));
        if !source.exists() {
            panic!("expected lambda binary at '{}'", source.display());
        }
        let function_dir = dist_dir.join(binary);
        fs::create_dir_all(&function_dir).expect("failed to create lambda dist directory");
        let destination = function_dir.join("bootstrap");
        fs::copy(&source, &destination).expect("failed to stage bootstrap binary");
        eprintln!("- {}", destination.display());
    }
}

fn run_deploy_tool(subcommand: &str, args: &[String]) {
    let mut cargo_args = vec!["run", "-p", DEPLOY_PACKAGE, "--", subcommand];
    cargo_args.extend(args.iter().map(String::as_str));
    run_cargo(&cargo_args);
}

/// Checks that `target` can be built before cargo spends time compiling.
fn preflight(target: &str) -> Result<(), String> {
    match installed_targets() {
        Some(installed) if !installed.iter().any(|line| line.as_str() == target) => {
            return Err(format!(
                "rust target `{target}` is missing; run `rustup target add {target}` \
                 before `cargo run -p xtask -- build-lambdas`"
            ));
        }
        Some(_) => {}
        None => eprintln!("warning: could not list rustup targets; skipping target check"),
    }

    if cfg!(windows) && target.ends_with("unknown-linux-gnu") && cross_linker(target).is_none() {
        return Err(format!(
            "no C cross-linker for `{target}`; install `{LINUX_GNU_LINKER}` or set \
             CC_{} so the handler binaries can link",
            target.replace('-', "_")
        ));
    }
    Ok(())
}

fn installed_targets() -> Option<Vec<String>> {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let listing = String::from_utf8_lossy(&output.stdout);
    Some(listing.lines().map(|line| line.trim().to_string()).collect())
}

/// First working C compiler among the cc-rs override variables and the
/// canonical cross gcc.
fn cross_linker(target: &str) -> Option<String> {
    let overrides = [
        format!("CC_{}", target.replace('-', "_")),
        format!("CC_{target}"),
        "TARGET_CC".to_string(),
        "CC".to_string(),
    ];
    overrides
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|value| value.trim().to_string())
        .chain(std::iter::once(LINUX_GNU_LINKER.to_string()))
        .find(|candidate| responds_to_version(candidate))
}

fn responds_to_version(program: &str) -> bool {
    let mut parts = program.split_whitespace();
    let Some(bin) = parts.next() else {
        return false;
    };
    Command::new(bin)
        .args(parts)
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    for package in ["inventory_core", LAMBDA_PACKAGE, DEPLOY_PACKAGE] {
        step(&format!("Test {package}"));
        run_cargo(&["test", "-p", package]);
    }
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::BuildLambdas { target, profile } => build_lambdas(&target, profile),
        Commands::Deploy { target, args } => {
            build_lambdas(&target, BuildProfile::Release);
            step("Deploy stack");
            run_deploy_tool("deploy", &args);
        }
        Commands::Teardown { args } => {
            step("Tear down stack");
            run_deploy_tool("teardown", &args);
        }
        Commands::Ci { job } => match job {
            CiJob::Check => ci_check(),
            CiJob::All => {
                ci_check();
                build_lambdas("x86_64-unknown-linux-gnu", BuildProfile::Release);
            }
        },
    }
}
