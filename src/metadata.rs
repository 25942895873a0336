use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Static pass-through package metadata, loaded from `package.toml` at the
/// project root. Everything here goes into the description unchanged; the
/// orchestrator only computes the requirement fields.
#[derive(Debug, Deserialize)]
pub struct PackageConfig {
    pub package: PackageMeta,

    #[serde(default)]
    pub entry_points: EntryPoints,

    #[serde(default)]
    pub commands: InstallCommands,

    #[serde(default)]
    pub discovery: Discovery,
}

impl PackageConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read package config {}", path.display()))?;
        let cfg: Self = toml::from_str(&text)
            .with_context(|| format!("invalid package config {}", path.display()))?;
        Ok(cfg)
    }
}

#[derive(Debug, Deserialize)]
pub struct PackageMeta {
    pub name: String,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub license: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub author_email: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_readme")]
    pub readme: String,

    #[serde(default)]
    pub scripts: Vec<String>,

    #[serde(default)]
    pub classifiers: Vec<String>,

    #[serde(default = "default_true")]
    pub include_package_data: bool,

    #[serde(default)]
    pub zip_safe: bool,

    #[serde(default = "default_platforms")]
    pub platforms: String,
}

fn default_readme() -> String {
    "README.md".to_string()
}

fn default_true() -> bool {
    true
}

fn default_platforms() -> String {
    "any".to_string()
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EntryPoints {
    #[serde(default)]
    pub console_scripts: BTreeMap<String, String>,
}

/// Install-time command overrides for the two install paths, passed through
/// so the packaging toolchain routes both through this orchestrator.
#[derive(Debug, Deserialize, Serialize)]
pub struct InstallCommands {
    #[serde(default = "default_develop_cmd")]
    pub develop: String,

    #[serde(default = "default_install_cmd")]
    pub install: String,
}

impl Default for InstallCommands {
    fn default() -> Self {
        Self {
            develop: default_develop_cmd(),
            install: default_install_cmd(),
        }
    }
}

fn default_develop_cmd() -> String {
    "owtf-installer develop".to_string()
}

fn default_install_cmd() -> String {
    "owtf-installer install".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Discovery {
    /// Package name prefixes excluded from discovery.
    #[serde(default = "default_excludes")]
    pub exclude: Vec<String>,
}

impl Default for Discovery {
    fn default() -> Self {
        Self {
            exclude: default_excludes(),
        }
    }
}

fn default_excludes() -> Vec<String> {
    vec!["node_modules".to_string()]
}

/// Discover importable packages under the root: every directory holding an
/// `__init__.py`, as a dotted name, minus the excluded prefixes. Sorted.
pub fn find_packages(root: &Path, exclude: &[String]) -> Result<Vec<String>> {
    let pattern = root.join("**").join("__init__.py");
    let pattern = pattern.to_string_lossy();

    let mut out = Vec::new();
    for entry in glob::glob(&pattern).context("invalid package discovery pattern")? {
        let path = entry.context("package discovery failed")?;
        let Some(pkg_dir) = path.parent() else {
            continue;
        };
        let rel = pkg_dir.strip_prefix(root).unwrap_or(pkg_dir);

        let dotted = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join(".");
        if dotted.is_empty() {
            continue;
        }

        let excluded = exclude
            .iter()
            .any(|e| dotted == *e || dotted.starts_with(&format!("{e}.")));
        if !excluded {
            out.push(dotted);
        }
    }

    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch_init(root: &Path, pkg: &str) {
        let dir = root.join(pkg);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("__init__.py"), "").unwrap();
    }

    #[test]
    fn discovers_nested_packages_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch_init(dir.path(), "owtf");
        touch_init(dir.path(), "owtf/api");
        touch_init(dir.path(), "owtf/core");
        fs::write(dir.path().join("setup.cfg"), "").unwrap();

        let pkgs = find_packages(dir.path(), &[]).unwrap();
        assert_eq!(pkgs, ["owtf", "owtf.api", "owtf.core"]);
    }

    #[test]
    fn excludes_are_prefix_matches() {
        let dir = tempfile::tempdir().unwrap();
        touch_init(dir.path(), "owtf");
        touch_init(dir.path(), "node_modules");
        touch_init(dir.path(), "node_modules/thing");

        let pkgs = find_packages(dir.path(), &["node_modules".to_string()]).unwrap();
        assert_eq!(pkgs, ["owtf"]);
    }

    #[test]
    fn config_defaults_saturate_missing_fields() {
        let cfg: PackageConfig = toml::from_str(
            r#"
[package]
name = "owtf"
"#,
        )
        .unwrap();
        assert_eq!(cfg.package.readme, "README.md");
        assert_eq!(cfg.package.platforms, "any");
        assert!(cfg.package.include_package_data);
        assert!(!cfg.package.zip_safe);
        assert_eq!(cfg.discovery.exclude, ["node_modules"]);
        assert!(cfg.entry_points.console_scripts.is_empty());
        assert_eq!(cfg.commands.develop, "owtf-installer develop");
        assert_eq!(cfg.commands.install, "owtf-installer install");
    }

    #[test]
    fn full_config_parses() {
        let cfg: PackageConfig = toml::from_str(
            r#"
[package]
name = "owtf"
url = "https://github.com/owtf/owtf"
license = "BSD"
author = "Abraham Aranguren"
author_email = "abraham.aranguren@owasp.org"
description = "Offensive web testing framework"
scripts = ["bin/owtf"]
classifiers = ["Topic :: Security"]

[entry_points.console_scripts]
owtf = "owtf.core:main"

[discovery]
exclude = ["node_modules", "docs"]
"#,
        )
        .unwrap();
        assert_eq!(cfg.package.name, "owtf");
        assert_eq!(
            cfg.entry_points.console_scripts.get("owtf").map(String::as_str),
            Some("owtf.core:main")
        );
        assert_eq!(cfg.discovery.exclude, ["node_modules", "docs"]);
    }
}
