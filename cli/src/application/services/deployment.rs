//! Scoped deployments: apply, use, always destroy.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::panic::AssertUnwindSafe;

use anyhow::{Context, Result};
use futures_util::FutureExt as _;
use tracing::{error, info, warn};

use crate::application::ports::{ProgressReporter, Provisioner};
use crate::domain::ProvisionError;

/// What happens to the infrastructure once the body finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Teardown {
    /// Destroy it (the default).
    #[default]
    Destroy,
    /// Leave it running, e.g. to inspect a failing deployment by hand.
    Keep,
}

/// Apply the provisioner's definition, run `body` against it, then tear it
/// down.
///
/// Teardown is scheduled before anything that can fail: `destroy()` runs
/// exactly once whether apply fails, `body` returns an error, or `body`
/// panics (the panic resumes after teardown). A partially applied definition
/// is still destroyed.
///
/// The first failure wins. A teardown failure after an otherwise successful
/// run becomes the error; after an earlier failure it is logged and attached
/// as context.
///
/// # Errors
///
/// Returns an error if apply, `body`, or teardown fails.
pub async fn with_deployment<P, T>(
    provisioner: &P,
    reporter: &impl ProgressReporter,
    teardown: Teardown,
    body: impl AsyncFnOnce(&P) -> Result<T>,
) -> Result<T>
where
    P: Provisioner,
{
    let outcome = AssertUnwindSafe(async {
        reporter.step("Applying infrastructure...");
        provisioner
            .init_and_apply()
            .await
            .context("provisioning failed")?;
        reporter.success("Infrastructure applied");
        body(provisioner).await
    })
    .catch_unwind()
    .await;

    let released = release(provisioner, reporter, teardown).await;

    match outcome {
        Err(panic) => {
            if let Err(e) = released {
                error!(error = %format!("{e:#}"), "teardown failed while unwinding");
            }
            std::panic::resume_unwind(panic)
        }
        Ok(Ok(value)) => released.map(|()| value),
        Ok(Err(err)) => match released {
            Ok(()) => Err(err),
            Err(td) => {
                error!(error = %format!("{td:#}"), "teardown failed after an earlier failure");
                Err(err.context(format!("teardown also failed: {td:#}")))
            }
        },
    }
}

async fn release(
    provisioner: &impl Provisioner,
    reporter: &impl ProgressReporter,
    teardown: Teardown,
) -> Result<()> {
    match teardown {
        Teardown::Destroy => {
            reporter.step("Destroying infrastructure...");
            provisioner.destroy().await.context("teardown failed")?;
            info!("infrastructure destroyed");
            reporter.success("Infrastructure destroyed");
            Ok(())
        }
        Teardown::Keep => {
            warn!("teardown skipped; infrastructure left running");
            reporter.warn(
                "Keeping infrastructure. Run 'tfprobe destroy' with the same --file or --dir when done.",
            );
            Ok(())
        }
    }
}

/// Read an output that must be present and non-empty.
///
/// # Errors
///
/// Returns an error if the output is missing or blank.
pub async fn output_required(provisioner: &impl Provisioner, key: &str) -> Result<String> {
    let value = provisioner.output(key).await?;
    if value.trim().is_empty() {
        return Err(ProvisionError::EmptyOutput(key.to_string()).into());
    }
    Ok(value)
}
