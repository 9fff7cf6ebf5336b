//! `tfprobe destroy`: tear down a root module left running with `--keep`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use super::TerraformArgs;
use crate::app::AppContext;
use crate::application::ports::{ProgressReporter, Provisioner};

/// Arguments for the destroy command.
#[derive(Args, Debug)]
pub struct DestroyArgs {
    /// Probe definition whose terraform section names the module
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub terraform: TerraformArgs,
}

/// Run the destroy command.
///
/// # Errors
///
/// Returns an error if `terraform destroy` fails.
pub async fn run(app: &AppContext, args: &DestroyArgs) -> Result<ExitCode> {
    let section = args.terraform.section_from(args.file.as_deref())?;
    let provisioner = app.terraform(&section);
    let reporter = app.reporter();
    reporter.step("Destroying infrastructure...");
    provisioner.destroy().await?;
    reporter.success("Infrastructure destroyed");
    Ok(ExitCode::SUCCESS)
}
