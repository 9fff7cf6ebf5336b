//! `tfprobe output`: print a required Terraform output.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use super::TerraformArgs;
use crate::app::AppContext;
use crate::application::services::deployment::output_required;

/// Arguments for the output command.
#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Output name
    pub key: String,

    /// Probe definition whose terraform section names the module
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub terraform: TerraformArgs,
}

/// Run the output command.
///
/// # Errors
///
/// Returns an error if terraform fails or the output is missing or empty.
pub async fn run(app: &AppContext, args: &OutputArgs) -> Result<ExitCode> {
    let section = args.terraform.section_from(args.file.as_deref())?;
    let provisioner = app.terraform(&section);
    let value = output_required(&provisioner, &args.key).await?;
    app.renderer().render_value(&args.key, &value)?;
    Ok(ExitCode::SUCCESS)
}
