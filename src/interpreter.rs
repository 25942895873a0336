use anyhow::{bail, Result};
use std::fmt;
use std::process::Command;
use std::str::FromStr;

/// Interpreter version as a plain (major, minor, patch) tuple.
///
/// Ordering is derived, so every comparison is a literal tuple comparison:
/// `(3, 6, 0) > (3, 0, 0)` holds, `(3, 0, 0) > (3, 0, 0)` does not. The
/// conditional requirement rules depend on these exact semantics, so do not
/// swap this for a semver range type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionTuple(pub u32, pub u32, pub u32);

impl fmt::Display for VersionTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

impl FromStr for VersionTuple {
    type Err = anyhow::Error;

    /// Parses "3.11.4" (or "3.11", missing components default to 0).
    /// A trailing pre-release tag on the last component ("3.13.0rc1") is
    /// tolerated and ignored.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('.');
        let major = parse_component(parts.next())?;
        let minor = parse_component(parts.next())?;
        let patch = parse_component(parts.next())?;
        Ok(Self(major, minor, patch))
    }
}

fn parse_component(part: Option<&str>) -> Result<u32> {
    let Some(part) = part else {
        return Ok(0);
    };
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        bail!("invalid version component: '{part}'");
    }
    Ok(digits.parse()?)
}

/// Locate the target interpreter and probe its version once.
///
/// Precedence: OWTF_INSTALLER_PYTHON if set (must answer), then the first of
/// `python3` / `python` that responds to `--version`.
pub fn probe_interpreter() -> Result<(String, VersionTuple)> {
    if let Ok(bin) = std::env::var("OWTF_INSTALLER_PYTHON") {
        let bin = bin.trim().to_string();
        if !bin.is_empty() {
            let Some(version) = probe(&bin) else {
                bail!("OWTF_INSTALLER_PYTHON is set but '{bin}' did not report a version");
            };
            return Ok((bin, version));
        }
    }

    for bin in ["python3", "python"] {
        if let Some(version) = probe(bin) {
            return Ok((bin.to_string(), version));
        }
    }

    bail!("no usable interpreter found (tried python3, python)");
}

fn probe(bin: &str) -> Option<VersionTuple> {
    let out = Command::new(bin).arg("--version").output().ok()?;
    if !out.status.success() {
        return None;
    }

    // Old interpreters print the banner on stderr
    let stdout = String::from_utf8_lossy(&out.stdout);
    let banner = if stdout.trim().is_empty() {
        String::from_utf8_lossy(&out.stderr).to_string()
    } else {
        stdout.to_string()
    };

    parse_banner(&banner)
}

fn parse_banner(banner: &str) -> Option<VersionTuple> {
    let rest = banner.trim().strip_prefix("Python")?.trim();
    rest.split_whitespace().next()?.parse().ok()
}
