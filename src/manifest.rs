use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{}: unparseable requirement: {}", .path.display(), .line, .text)]
    Malformed {
        path: PathBuf,
        line: usize,
        text: String,
    },
}

/// Richer link object produced by the modern parsing interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// Project name carried in the `#egg=` fragment, when present.
    pub egg: Option<String>,
}

impl Link {
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

/// One parsed manifest line. Immutable once parsed; which of the two link
/// attributes is populated depends on the parser strategy in effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirement {
    /// Package specifier (name plus optional version constraint).
    pub specifier: Option<String>,
    /// Direct download URL, as exposed by the legacy interface.
    pub url: Option<String>,
    /// Richer link object, as exposed by the modern interface.
    pub link: Option<Link>,
}

/// Which of the two historical manifest-parsing interfaces is in effect.
///
/// Resolved once at process start via [`ParserStrategy::detect`], never
/// re-probed per call. Legacy records expose a bare `url` attribute, modern
/// records expose a [`Link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserStrategy {
    Legacy,
    Modern,
}

impl ParserStrategy {
    /// Probe the installed pip once: releases before 10 carry the older
    /// direct interface, everything later (and an unanswered probe) the
    /// newer internal-module one.
    pub fn detect() -> Self {
        match pip_major_version() {
            Some(major) if major < 10 => {
                debug!(major, "pip predates the internal-module interface");
                Self::Legacy
            }
            _ => Self::Modern,
        }
    }

    /// Parse one manifest file into requirement records, one per resolvable
    /// line. Blank lines, comments and installer options are skipped; a
    /// missing file or malformed line fails the whole run.
    pub fn parse(self, path: &Path) -> Result<Vec<Requirement>, ManifestError> {
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            let line = match line.strip_prefix("-e ").or_else(|| line.strip_prefix("--editable ")) {
                Some(rest) => rest.trim(),
                None if line.starts_with('-') => {
                    // Installer option (-r includes, index urls, ...): not a
                    // resolvable requirement on its own.
                    debug!(line, "skipping installer option");
                    continue;
                }
                None => line,
            };

            let record = if is_link(line) {
                self.link_record(line)
            } else {
                Requirement {
                    specifier: Some(parse_specifier(line).ok_or_else(|| {
                        ManifestError::Malformed {
                            path: path.to_path_buf(),
                            line: idx + 1,
                            text: raw.to_string(),
                        }
                    })?),
                    ..Requirement::default()
                }
            };
            records.push(record);
        }

        debug!(path = %path.display(), records = records.len(), "parsed manifest");
        Ok(records)
    }

    fn link_record(self, line: &str) -> Requirement {
        let egg = egg_fragment(line);
        match self {
            Self::Legacy => Requirement {
                specifier: egg,
                url: Some(line.to_string()),
                link: None,
            },
            Self::Modern => Requirement {
                specifier: egg.clone(),
                url: None,
                link: Some(Link {
                    url: line.to_string(),
                    egg,
                }),
            },
        }
    }
}

fn pip_major_version() -> Option<u32> {
    let out = Command::new("pip").arg("--version").output().ok()?;
    if !out.status.success() {
        return None;
    }
    parse_pip_banner(&String::from_utf8_lossy(&out.stdout))
}

/// "pip 24.0 from /usr/lib/python3/..." -> 24
fn parse_pip_banner(banner: &str) -> Option<u32> {
    let rest = banner.trim().strip_prefix("pip")?.trim_start();
    let version = rest.split_whitespace().next()?;
    let major: String = version.chars().take_while(char::is_ascii_digit).collect();
    major.parse().ok()
}

/// Strip a `#` comment. Mid-line comments only count when preceded by
/// whitespace, so URL fragments like `#egg=name` survive.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}

fn is_link(line: &str) -> bool {
    const PREFIXES: [&str; 8] = [
        "http://", "https://", "ftp://", "file://", "git+", "hg+", "svn+", "bzr+",
    ];
    PREFIXES.iter().any(|p| line.starts_with(p))
}

fn egg_fragment(url: &str) -> Option<String> {
    let (_, frag) = url.split_once("#egg=")?;
    let egg = frag.split('&').next().unwrap_or(frag).trim();
    if egg.is_empty() {
        None
    } else {
        Some(egg.to_string())
    }
}

fn parse_specifier(line: &str) -> Option<String> {
    if line.contains(char::is_whitespace) {
        return None;
    }
    if !line.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(line.to_string())
}
