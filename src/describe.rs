use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::Path;

use crate::aggregate::RequirementSet;
use crate::metadata::{self, EntryPoints, InstallCommands, PackageConfig};

/// The structured package description handed to the packaging toolchain.
///
/// `install_requires` and `dependency_links` are the two computed fields;
/// everything else is pass-through from [`PackageConfig`] plus the extracted
/// version and the discovered package list.
#[derive(Debug, Serialize)]
pub struct PackageDescription {
    pub name: String,
    pub version: String,
    pub url: Option<String>,
    pub license: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub description: Option<String>,
    pub long_description: String,
    pub packages: Vec<String>,
    pub include_package_data: bool,
    pub zip_safe: bool,
    pub platforms: String,
    pub install_requires: Vec<String>,
    pub dependency_links: Vec<String>,
    pub scripts: Vec<String>,
    pub entry_points: EntryPoints,
    pub commands: InstallCommands,
    pub classifiers: Vec<String>,
}

impl PackageDescription {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize package description")
    }
}

/// Assemble the final description from the static config, the extracted
/// version, and the aggregated requirement set.
pub fn build_description(
    cfg: PackageConfig,
    root: &Path,
    version: &str,
    set: RequirementSet,
) -> Result<PackageDescription> {
    let readme_path = root.join(&cfg.package.readme);
    let long_description = std::fs::read_to_string(&readme_path)
        .with_context(|| format!("failed to read {}", readme_path.display()))?;

    let packages = metadata::find_packages(root, &cfg.discovery.exclude)?;

    let meta = cfg.package;
    Ok(PackageDescription {
        name: meta.name,
        version: version.to_string(),
        url: meta.url,
        license: meta.license,
        author: meta.author,
        author_email: meta.author_email,
        description: meta.description,
        long_description,
        packages,
        include_package_data: meta.include_package_data,
        zip_safe: meta.zip_safe,
        platforms: meta.platforms,
        install_requires: set.requires,
        dependency_links: set.links,
        scripts: meta.scripts,
        entry_points: cfg.entry_points,
        commands: cfg.commands,
        classifiers: meta.classifiers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn computed_fields_come_from_the_requirement_set() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "# OWTF\n").unwrap();
        let pkg = dir.path().join("owtf");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("__init__.py"), "").unwrap();

        let cfg: PackageConfig = toml::from_str("[package]\nname = \"owtf\"\n").unwrap();
        let set = RequirementSet {
            links: vec!["https://e.com/a.tar.gz".to_string()],
            requires: vec!["alpha".to_string(), "Beta==2.0".to_string()],
        };

        let desc = build_description(cfg, dir.path(), "2.6.0", set).unwrap();
        assert_eq!(desc.name, "owtf");
        assert_eq!(desc.version, "2.6.0");
        assert_eq!(desc.long_description, "# OWTF\n");
        assert_eq!(desc.packages, ["owtf"]);
        assert_eq!(desc.install_requires, ["alpha", "Beta==2.0"]);
        assert_eq!(desc.dependency_links, ["https://e.com/a.tar.gz"]);
    }

    #[test]
    fn missing_readme_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let cfg: PackageConfig = toml::from_str("[package]\nname = \"owtf\"\n").unwrap();
        let res = build_description(cfg, dir.path(), "2.6.0", RequirementSet::default());
        assert!(res.is_err());
    }

    #[test]
    fn serializes_to_json_with_requirement_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "readme").unwrap();
        let cfg: PackageConfig = toml::from_str("[package]\nname = \"owtf\"\n").unwrap();
        let set = RequirementSet {
            links: Vec::new(),
            requires: vec!["tornado==5.1.1".to_string()],
        };

        let desc = build_description(cfg, dir.path(), "2.6.0", set).unwrap();
        let json = desc.to_json().unwrap();
        assert!(json.contains("\"install_requires\""));
        assert!(json.contains("tornado==5.1.1"));
        assert!(json.contains("\"dependency_links\""));
    }
}
