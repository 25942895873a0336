use std::path::Path;
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::info;

/// Shell the provisioning script runs under.
const PROVISION_SHELL: &str = "/bin/bash";

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("failed to spawn provisioning script {path}: {source}")]
    Spawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("provisioning script {path} exited with {status}")]
    Failed { path: String, status: ExitStatus },
}

/// Run the post-install provisioning script and block until it exits.
///
/// The child inherits stdout/stderr; there is no timeout and no output
/// capture. A non-zero exit is surfaced as [`ProvisioningError::Failed`]
/// instead of being silently ignored.
pub fn run_provisioning(script: &Path) -> Result<(), ProvisioningError> {
    info!("running post install: {}", script.display());

    let status = Command::new(PROVISION_SHELL)
        .arg(script)
        .status()
        .map_err(|source| ProvisioningError::Spawn {
            path: script.display().to_string(),
            source,
        })?;

    if !status.success() {
        return Err(ProvisioningError::Failed {
            path: script.display().to_string(),
            status,
        });
    }

    Ok(())
}
