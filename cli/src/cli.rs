//! CLI argument parsing with clap derive

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::app::{AppContext, OutputFlags};
use crate::commands;
use crate::domain::{CheckError, ConfigError, ProvisionError};

/// Apply Terraform, probe the endpoint it creates, tear it down
#[derive(Parser, Debug)]
#[command(
    name = "tfprobe",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Log more detail to stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply infrastructure, poll its endpoint, destroy it
    Run(commands::run::RunArgs),

    /// Poll a URL until it returns the expected response
    Poll(commands::poll::PollArgs),

    /// Print a Terraform output
    Output(commands::tf_output::OutputArgs),

    /// Destroy infrastructure left running with --keep
    Destroy(commands::destroy::DestroyArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),

    /// Show version
    Version,
}

impl Cli {
    /// Default `tracing` filter for the requested verbosity, used when
    /// `RUST_LOG` is unset.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
            ..
        } = self;

        if let Command::Version = command {
            commands::version::run(json);
            return Ok(ExitCode::SUCCESS);
        }

        let cancel = CancellationToken::new();
        watch_ctrl_c(&cancel);
        let flags = OutputFlags {
            no_color,
            quiet,
            json,
        };
        let app = match command {
            Command::Config(_) => AppContext::unvalidated(&flags, cancel)?,
            _ => AppContext::new(&flags, cancel)?,
        };

        match command {
            Command::Run(args) => commands::run::run(&app, &args).await,
            Command::Poll(args) => commands::poll::run(&app, &args).await,
            Command::Output(args) => commands::tf_output::run(&app, &args).await,
            Command::Destroy(args) => commands::destroy::run(&app, &args).await,
            Command::Config(cmd) => commands::config::run(&app, cmd),
            Command::Version => Ok(ExitCode::SUCCESS),
        }
    }
}

/// Cancel `token` on the first Ctrl-C. Polling stops; teardown still runs.
fn watch_ctrl_c(token: &CancellationToken) {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            token.cancel();
        }
    });
}

/// Machine-readable code for a failed command, used in `--json` error objects.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ProvisionError>() {
            return match e {
                ProvisionError::CommandFailed { .. } => "PROVISION_FAILED",
                ProvisionError::MissingOutput(_) | ProvisionError::EmptyOutput(_) => {
                    "MISSING_OUTPUT"
                }
                ProvisionError::InvalidOutputJson(_) => "INVALID_OUTPUT",
            };
        }
        if cause.is::<ConfigError>() {
            return "INVALID_CONFIG";
        }
        if cause.is::<CheckError>() {
            return "INVALID_CHECK";
        }
    }
    "ERROR"
}
