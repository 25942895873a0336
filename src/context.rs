use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::interpreter::{self, VersionTuple};
use crate::manifest::ParserStrategy;

/// Dependency manifests, relative to the project root, in read order.
pub const MANIFEST_PATHS: [&str; 3] = [
    "requirements/base.txt",
    "requirements/docs.txt",
    "requirements/test.txt",
];

/// Post-install provisioning script, relative to the project root.
pub const PROVISION_SCRIPT: &str = "scripts/install.sh";

/// Source file carrying the `__version__` assignment.
pub const VERSION_SOURCE: &str = "owtf/__init__.py";

/// Static package metadata passed through to the description.
pub const PACKAGE_CONFIG: &str = "package.toml";

/// Everything resolved once at process start: absolute paths for the fixed
/// project layout, the target interpreter, and the manifest parser strategy.
/// Read-only for the rest of the run.
#[derive(Debug, Clone)]
pub struct InstallContext {
    root: PathBuf,
    manifest_paths: Vec<PathBuf>,
    provision_script: PathBuf,
    version_source: PathBuf,
    package_config: PathBuf,
    python_bin: String,
    interpreter: VersionTuple,
    parser: ParserStrategy,
}

impl InstallContext {
    /// Build a context by probing the environment: interpreter version and
    /// manifest-parser capability are each resolved exactly once here.
    pub fn new(root: Option<&Path>) -> Result<Self> {
        let root = match root {
            Some(p) => p.to_path_buf(),
            None => std::env::current_dir().context("could not determine current directory")?,
        };
        let (python_bin, interpreter) = interpreter::probe_interpreter()?;
        Self::with_runtime(&root, &python_bin, interpreter, ParserStrategy::detect())
    }

    /// Build a context with a known interpreter and parser strategy instead
    /// of probing the environment.
    pub fn with_runtime(
        root: &Path,
        python_bin: &str,
        interpreter: VersionTuple,
        parser: ParserStrategy,
    ) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("project root does not exist: {}", root.display()))?;

        Ok(Self {
            manifest_paths: MANIFEST_PATHS.iter().map(|p| root.join(p)).collect(),
            provision_script: root.join(PROVISION_SCRIPT),
            version_source: root.join(VERSION_SOURCE),
            package_config: root.join(PACKAGE_CONFIG),
            root,
            python_bin: python_bin.to_string(),
            interpreter,
            parser,
        })
    }

    // ---------- public getters ----------

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_paths(&self) -> &[PathBuf] {
        &self.manifest_paths
    }

    pub fn provision_script(&self) -> &Path {
        &self.provision_script
    }

    pub fn version_source(&self) -> &Path {
        &self.version_source
    }

    pub fn package_config(&self) -> &Path {
        &self.package_config
    }

    pub fn python_bin(&self) -> &str {
        &self.python_bin
    }

    pub fn interpreter(&self) -> VersionTuple {
        self.interpreter
    }

    pub fn parser(&self) -> ParserStrategy {
        self.parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_paths_are_resolved_against_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = InstallContext::with_runtime(
            dir.path(),
            "python3",
            VersionTuple(3, 11, 0),
            ParserStrategy::Modern,
        )
        .unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(ctx.provision_script(), root.join("scripts/install.sh"));
        assert_eq!(ctx.version_source(), root.join("owtf/__init__.py"));
        assert_eq!(ctx.manifest_paths().len(), 3);
        assert_eq!(ctx.manifest_paths()[0], root.join("requirements/base.txt"));
    }

    #[test]
    fn missing_root_is_rejected() {
        let err = InstallContext::with_runtime(
            Path::new("/nonexistent/project"),
            "python3",
            VersionTuple(3, 11, 0),
            ParserStrategy::Modern,
        );
        assert!(err.is_err());
    }
}
