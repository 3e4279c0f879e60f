//! nova-sync: push the local object manifest to the nova registry.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nova_sdk::registry::{self, RegistryConfig, SyncOptions};

/// Validate nova-objects.json, write nova-registry.json, and sync it to the backend.
///
/// Credentials come from NOVA_ORGANISATION_ID, NOVA_APP_ID, NOVA_API_KEY and
/// NOVA_API_ENDPOINT, then .novarc, then the "nova" block of package.json.
#[derive(Parser, Debug)]
#[command(name = "nova-sync", version)]
struct Cli {
    /// Accepted for compatibility; the sync always runs
    #[arg(long)]
    dry_run: bool,

    /// Accepted for compatibility; use RUST_LOG to change log output
    #[arg(long)]
    verbose: bool,

    /// Project directory holding .novarc and package.json
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Manifest path, relative to the project directory
    #[arg(long, default_value = registry::manifest::DEFAULT_MANIFEST)]
    manifest: PathBuf,

    /// Registry output path, relative to the project directory
    #[arg(long, default_value = registry::snapshot::DEFAULT_OUTPUT)]
    output: PathBuf,
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version print to stdout and succeed.
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };

    setup_logging();
    tracing::debug!(dry_run = cli.dry_run, verbose = cli.verbose, "parsed flags");

    let config = match RegistryConfig::from_process_env(&cli.dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("nova-sync: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let options = SyncOptions {
        project_dir: cli.dir,
        manifest_path: cli.manifest,
        output_path: cli.output,
    };

    match registry::run_sync(&options, &config).await {
        Ok(report) => {
            println!(
                "Synced {} objects and {} experiences ({})",
                report.object_count,
                report.experience_count,
                report.output_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("nova-sync: {}", e);
            ExitCode::FAILURE
        }
    }
}
