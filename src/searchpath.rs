//! `PathList` / `SearchPathList`: ordered, de-duplicated directory lists with
//! suffix expansion.
//!
//! Build order: clear, append the prepend-list, then for each prefix append the
//! bare prefix (if enabled) followed by `prefix/suffix` for each suffix not
//! already present, then append the append-list. Existence filtering and
//! ordering are the contract: the first match in the final list wins.

use std::path::{Path, PathBuf};

/// A flat, ordered list of directories. A plain `Vec<PathBuf>` is enough — the
/// ordering itself carries the precedence contract.
#[derive(Debug, Clone, Default)]
pub struct PathList {
    paths: Vec<PathBuf>,
}

impl PathList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    pub fn push(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn extend(&mut self, other: &PathList) {
        self.paths.extend(other.paths.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Drop directories that don't exist on disk, preserving order.
    pub fn remove_non_existing(&mut self) {
        self.paths.retain(|p| p.is_dir());
    }

    /// Stable de-duplication, keeping the first occurrence.
    pub fn dedup_stable(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.paths.retain(|p| seen.insert(p.clone()));
    }
}

impl IntoIterator for PathList {
    type Item = PathBuf;
    type IntoIter = std::vec::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// Builds a [`PathList`] by expanding a set of prefixes against a set of suffixes.
#[derive(Debug, Clone, Default)]
pub struct SearchPathList {
    include_path_prefixes: bool,
    prefixes: Vec<PathBuf>,
    suffixes: Vec<String>,
    prepend: Vec<PathBuf>,
    append: Vec<PathBuf>,
}

impl SearchPathList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_include_path_prefixes(&mut self, include: bool) -> &mut Self {
        self.include_path_prefixes = include;
        self
    }

    pub fn set_path_prefix_list(&mut self, prefixes: impl IntoIterator<Item = PathBuf>) -> &mut Self {
        self.prefixes = prefixes.into_iter().collect();
        self
    }

    pub fn set_path_suffix_list<S: Into<String>>(&mut self, suffixes: impl IntoIterator<Item = S>) -> &mut Self {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn prepend_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.prepend.push(path.into());
        self
    }

    pub fn append_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.append.push(path.into());
        self
    }

    /// Run the expansion and return the resulting list, in order, without
    /// existence filtering (callers that want only existing directories should
    /// call [`PathList::remove_non_existing`] on the result, matching the
    /// original's split between `updatePathList()` and
    /// `removeNonExistingDirectories()`).
    pub fn path_list(&self) -> PathList {
        let mut out: Vec<PathBuf> = Vec::new();
        out.extend(self.prepend.iter().cloned());

        for prefix in &self.prefixes {
            if self.include_path_prefixes && !out.contains(prefix) {
                out.push(prefix.clone());
            }
            for suffix in &self.suffixes {
                let candidate = if suffix.is_empty() {
                    prefix.clone()
                } else {
                    clean_path(&prefix.join(suffix))
                };
                if !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        }

        out.extend(self.append.iter().cloned());
        PathList::from_paths(out)
    }
}

fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        use std::path::Component::*;
        match component {
            CurDir => {}
            ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
