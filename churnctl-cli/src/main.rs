//! churnctl CLI - customer churn prediction client
//!
//! Collects customer attributes, posts them to the prediction service and
//! renders the outcome:
//! - `predict` submits one record from flags and/or a JSON file
//! - `form` walks through the fields interactively
//! - `batch` submits many records in one request
//! - `health` checks that the service is up

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use churnctl_core::{ChurnConfig, EndpointConfig};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

mod commands;
mod config;
mod tracing_setup;
mod ui;
mod wizard;

#[derive(Parser, Debug)]
#[command(
    name = "churnctl",
    author,
    version,
    about = "Predict customer churn from the command line",
    long_about = "Fill in the churn form from flags, a JSON file or interactive prompts, send \
                  it to the prediction service and show whether the customer will churn."
)]
struct Cli {
    /// Base URL of the prediction service (overrides the config file)
    #[arg(long, env = "CHURNCTL_URL", global = true)]
    url: Option<String>,

    /// Config file path (default: ~/.churnctl/config.toml)
    #[arg(
        long = "config",
        env = "CHURNCTL_CONFIG",
        value_name = "PATH",
        global = true
    )]
    config_path: Option<PathBuf>,

    /// Suppress progress spinners (for script consumption)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict churn for one customer (fields via -F NAME=VALUE or --from FILE)
    Predict(commands::predict::PredictArgs),
    /// Fill in the churn form interactively
    Form(commands::form::FormArgs),
    /// Predict churn for a JSON array of customer records
    Batch(commands::batch::BatchArgs),
    /// Check that the prediction service is reachable
    Health,
    /// Manage churnctl configuration (init, show, path)
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    ui::init_quiet_mode(cli.quiet);

    let config_path = cli
        .config_path
        .clone()
        .unwrap_or_else(ChurnConfig::config_path);

    let ok = match cli.command {
        Commands::Predict(args) => {
            let endpoint = resolve_endpoint(&config_path, cli.url)?;
            commands::run_predict(args, &endpoint).await?
        }
        Commands::Form(args) => {
            let endpoint = resolve_endpoint(&config_path, cli.url)?;
            commands::run_form(args, &endpoint).await?
        }
        Commands::Batch(args) => {
            let endpoint = resolve_endpoint(&config_path, cli.url)?;
            commands::run_batch(args, &endpoint).await?
        }
        Commands::Health => {
            let endpoint = resolve_endpoint(&config_path, cli.url)?;
            commands::run_health(&endpoint).await?;
            true
        }
        Commands::Config(args) => {
            config::run_config(args, &config_path)?;
            true
        }
        Commands::Completions(args) => {
            run_completions(args);
            true
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Config file, then `--url` / `CHURNCTL_URL`
fn resolve_endpoint(config_path: &Path, url: Option<String>) -> Result<EndpointConfig> {
    let config = ChurnConfig::load_from(config_path)?.with_base_url(url);
    debug!(base_url = %config.endpoint.base_url, "resolved prediction endpoint");
    Ok(config.endpoint)
}

fn run_completions(args: CompletionsArgs) {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}
