use crate::interpreter::VersionTuple;
use crate::manifest::Requirement;

/// The aggregated install requirement set, built by value and returned;
/// nothing here is process-global.
///
/// `links` preserves manifest-then-record order exactly, duplicates included.
/// `requires` is append-ordered until [`sort_requires`] runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet {
    pub links: Vec<String>,
    pub requires: Vec<String>,
}

/// Partition requirement records into links and install requirements.
///
/// Both link attributes are checked independently, so a record exposing both
/// contributes two entries. Links are never deduplicated. Records without a
/// specifier contribute to `links` only.
pub fn aggregate<'a, I>(records: I) -> RequirementSet
where
    I: IntoIterator<Item = &'a Requirement>,
{
    let mut set = RequirementSet::default();

    for item in records {
        if let Some(url) = item.url.as_ref() {
            set.links.push(url.clone());
        }
        if let Some(link) = item.link.as_ref() {
            set.links.push(link.as_str().to_string());
        }
        if let Some(spec) = item.specifier.as_ref() {
            if !spec.is_empty() {
                set.requires.push(spec.clone());
            }
        }
    }

    set
}

/// Append interpreter-version-conditional requirements. Both rules are
/// independent; both, one, or neither may fire.
///
/// The second rule is a strict `>` against the full (3, 0, 0) tuple, so an
/// interpreter reporting exactly 3.0.0 is excluded while 3.0.1 and up
/// qualify. That boundary is inherited behavior, kept as-is.
pub fn augment(set: &mut RequirementSet, interpreter: VersionTuple) {
    if interpreter < VersionTuple(2, 7, 9) {
        // SSL connection fixes for old 2.7 interpreters
        set.requires
            .extend(["ndg-httpsclient".to_string(), "pyasn1".to_string()]);
    }

    if interpreter > VersionTuple(3, 0, 0) {
        set.requires
            .extend(["black".to_string(), "pre-commit".to_string()]);
    }
}

/// Stable case-insensitive sort of `requires`, keyed on the package name
/// substring before the first `==` (the whole specifier when absent).
pub fn sort_requires(set: &mut RequirementSet) {
    set.requires
        .sort_by_key(|s| s.split("==").next().unwrap_or(s.as_str()).to_lowercase());
}
