use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("failed to read version source {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no __version__ assignment found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("__version__ in {} is not a string literal: {}", .path.display(), .raw)]
    NotALiteral { path: PathBuf, raw: String },
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"__version__\s+=\s+(.*)").unwrap())
}

/// Extract the package version from a Python source file by locating the
/// `__version__ = ...` assignment and literal-evaluating its right-hand side.
///
/// Any failure here is fatal to the whole orchestration: it runs before any
/// manifest work begins.
pub fn extract_version(path: &Path) -> Result<String, VersionError> {
    let text = std::fs::read_to_string(path).map_err(|source| VersionError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let raw = version_re()
        .captures(&text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| VersionError::NotFound(path.to_path_buf()))?;

    eval_str_literal(raw).ok_or_else(|| VersionError::NotALiteral {
        path: path.to_path_buf(),
        raw: raw.to_string(),
    })
}

/// Evaluate a Python string literal: single/double/triple quoted, with the
/// common backslash escapes. Returns None for anything else (f-strings,
/// call expressions, bare names).
fn eval_str_literal(raw: &str) -> Option<String> {
    let body = strip_quotes(raw, "\"\"\"")
        .or_else(|| strip_quotes(raw, "'''"))
        .or_else(|| strip_quotes(raw, "\""))
        .or_else(|| strip_quotes(raw, "'"))?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            other => {
                // Unknown escape: Python keeps the backslash
                out.push('\\');
                out.push(other);
            }
        }
    }
    Some(out)
}

fn strip_quotes<'a>(raw: &'a str, quote: &str) -> Option<&'a str> {
    raw.strip_prefix(quote)?.strip_suffix(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_source(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn extracts_double_quoted_version() {
        let f = write_source("#!/usr/bin/env python\n__version__ = \"2.6.0\"\n");
        assert_eq!(extract_version(f.path()).unwrap(), "2.6.0");
    }

    #[test]
    fn extracts_single_quoted_version() {
        let f = write_source("__version__ = '1.0.0-beta'\n__all__ = []\n");
        assert_eq!(extract_version(f.path()).unwrap(), "1.0.0-beta");
    }

    #[test]
    fn missing_assignment_is_not_found() {
        let f = write_source("VERSION = '1.0'\n");
        assert!(matches!(
            extract_version(f.path()),
            Err(VersionError::NotFound(_))
        ));
    }

    #[test]
    fn non_literal_rhs_is_rejected() {
        let f = write_source("__version__ = get_version()\n");
        assert!(matches!(
            extract_version(f.path()),
            Err(VersionError::NotALiteral { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let path = Path::new("/nonexistent/__init__.py");
        assert!(matches!(
            extract_version(path),
            Err(VersionError::Read { .. })
        ));
    }

    #[test]
    fn literal_eval_handles_escapes_and_triple_quotes() {
        assert_eq!(eval_str_literal("\"a\\\"b\""), Some("a\"b".to_string()));
        assert_eq!(eval_str_literal("'''2.6'''"), Some("2.6".to_string()));
        assert_eq!(eval_str_literal("version()"), None);
        assert_eq!(eval_str_literal("'"), None);
    }
}
