//! Deployment safeguards — deploy-hook CLI
//!
//! Runs the configured safeguards against a compiled service and exits with a
//! status the deployment pipeline can gate on:
//!
//!   0  every safeguard passed (warnings may still be printed)
//!   1  at least one safeguard failed; abort the deployment
//!   2  a safeguard malfunctioned, or the inputs/config could not be loaded
//!
//! Usage:
//!   safeguards check --template .serverless/cloudformation-template-update-stack.json \
//!                    --service .serverless/service.json
//!   safeguards list-policies --config safeguards.toml

mod render;

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use safeguards_contracts::{
    declaration::ServiceDeclaration,
    error::{SafeguardsError, SafeguardsResult},
    graph::CompiledTemplate,
};
use safeguards_core::SafeguardsContext;
use safeguards_policy::{build_runner, SafeguardsConfig};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Gate a deployment on the configured safeguards.
#[derive(Parser)]
#[command(
    name = "safeguards",
    about = "Run deployment safeguards against a compiled service",
    long_about = "Runs every enabled safeguard against the compiled resource graph and\n\
                  service declaration, prints warnings and failures with links to their\n\
                  documentation, and exits non-zero when the deployment must not proceed."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the safeguards and gate on the result.
    Check {
        /// Compiled template JSON (must contain a `Resources` section).
        #[arg(long)]
        template: PathBuf,
        /// Service declaration JSON (service, provider, functions).
        #[arg(long)]
        service: PathBuf,
        /// Safeguards TOML. Defaults to every built-in safeguard.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print the safeguards that would run, in order.
    ListPolicies {
        /// Safeguards TOML. Defaults to every built-in safeguard.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // Logs go to stderr so JSON output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check {
            template,
            service,
            config,
            format,
        } => run_check(&template, &service, config.as_deref(), format),
        Command::ListPolicies { config } => run_list(config.as_deref()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("safeguards error: {}", e);
            ExitCode::from(2)
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_check(
    template: &Path,
    service: &Path,
    config: Option<&Path>,
    format: Format,
) -> SafeguardsResult<ExitCode> {
    let template: CompiledTemplate = read_json(template)?;
    let declaration: ServiceDeclaration = read_json(service)?;
    let ctx = SafeguardsContext::from_documents(template, declaration)?;

    let runner = build_runner(&load_config(config)?)?;
    let report = runner.run_blocking(&ctx);
    debug!(digest = %report.digest(), "report digest");

    match format {
        Format::Text => print!("{}", render::render_text(&report)),
        Format::Json => println!("{}", render::render_json(&report)?),
    }

    Ok(if report.has_engine_defects() {
        ExitCode::from(2)
    } else if report.is_pass() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn run_list(config: Option<&Path>) -> SafeguardsResult<ExitCode> {
    let runner = build_runner(&load_config(config)?)?;
    for policy in runner.policies() {
        println!("{}\t{}", policy.name(), policy.documentation_url());
    }
    Ok(ExitCode::SUCCESS)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> SafeguardsResult<SafeguardsConfig> {
    match path {
        Some(path) => SafeguardsConfig::from_file(path),
        None => Ok(SafeguardsConfig::default()),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> SafeguardsResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| SafeguardsError::InputError {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&contents).map_err(|e| SafeguardsError::InputError {
        reason: format!("failed to parse '{}': {}", path.display(), e),
    })
}
