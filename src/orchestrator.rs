use anyhow::{bail, Context as _, Result};
use std::process::Command;
use tracing::{debug, info};

use crate::aggregate;
use crate::cli::Mode;
use crate::context::InstallContext;
use crate::describe::{self, PackageDescription};
use crate::hooks;
use crate::manifest::Requirement;
use crate::metadata::PackageConfig;
use crate::version;

/// Drive one install attempt end to end:
///
/// version extraction, manifest reads, aggregation, conditional augmentation,
/// final sort, then (when a mode is given) the selected install path followed
/// by exactly one provisioning invocation. Any failure is fatal; there is no
/// partial description, no retry, no rollback.
pub fn run(ctx: &InstallContext, mode: Option<Mode>) -> Result<PackageDescription> {
    // Version extraction aborts before any manifest work begins.
    let pkg_version = version::extract_version(ctx.version_source())?;
    debug!(version = %pkg_version, "extracted package version");

    let cfg = PackageConfig::load_from_path(ctx.package_config())?;

    // Idle -> ManifestsRead: manifest order, then record order within each.
    let mut records: Vec<Requirement> = Vec::new();
    for path in ctx.manifest_paths() {
        records.extend(ctx.parser().parse(path)?);
    }
    info!(records = records.len(), "manifests read");

    // -> RequirementsAggregated -> RequirementsAugmented -> RequirementsSorted
    let mut set = aggregate::aggregate(&records);
    aggregate::augment(&mut set, ctx.interpreter());
    aggregate::sort_requires(&mut set);
    debug!(
        requires = set.requires.len(),
        links = set.links.len(),
        "requirements resolved"
    );

    let description = describe::build_description(cfg, ctx.root(), &pkg_version, set)?;

    // Branch: the caller picked the path; the hook fires after the primary
    // action and never before it.
    if let Some(mode) = mode {
        run_primary_action(ctx, mode)?;
        hooks::run_provisioning(ctx.provision_script())?;
    }

    Ok(description)
}

/// The selected path's primary framework action: source-linking for develop
/// mode, package-file installation for standard mode.
fn run_primary_action(ctx: &InstallContext, mode: Mode) -> Result<()> {
    let mut cmd = Command::new(ctx.python_bin());
    cmd.args(["-m", "pip", "install"]);
    if mode == Mode::Develop {
        cmd.arg("-e");
    }
    cmd.arg(ctx.root());

    info!(?mode, "running install");
    let status = cmd
        .status()
        .with_context(|| format!("failed to invoke {}", ctx.python_bin()))?;

    if !status.success() {
        bail!("{mode:?} install failed with {status}");
    }
    Ok(())
}
