//! `QtDistributionDirectory`: identity of a discovered Qt tree, used to reject a
//! Qt-named library that doesn't actually belong to the Qt installation the
//! resolver already committed to.
//!
//! Models the root/libs/plugins relative layout a Qt distribution uses, with an
//! optional `qt.conf` override and a guess-the-root-from-one-library heuristic.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::common::LookupError;
use crate::platform::Platform;

#[derive(Debug, Clone, Default)]
pub struct QtDistributionDirectory {
    root: Option<PathBuf>,
    shared_libraries_dir: Option<PathBuf>,
    plugins_root: PathBuf,
}

impl QtDistributionDirectory {
    pub fn new() -> Self {
        Self {
            root: None,
            shared_libraries_dir: None,
            plugins_root: PathBuf::from("plugins"),
        }
    }

    pub fn is_null(&self) -> bool {
        self.root.is_none() || self.shared_libraries_dir.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn root_absolute_path(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn shared_libraries_directory_absolute_path(&self) -> Option<PathBuf> {
        match (&self.root, &self.shared_libraries_dir) {
            (Some(root), Some(rel)) => Some(root.join(rel)),
            _ => None,
        }
    }

    pub fn plugins_root_absolute_path(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join(&self.plugins_root))
    }

    pub fn is_valid_existing(&self) -> bool {
        let libs = self.shared_libraries_directory_absolute_path();
        let plugins = self.plugins_root_absolute_path();
        matches!((&self.root, libs, plugins), (Some(root), Some(libs), Some(plugins))
            if root.is_dir() && libs.is_dir() && plugins.is_dir())
    }

    /// Whether `library_path`'s containing directory is this distribution's
    /// shared-libraries directory.
    pub fn contains(&self, library_path: &Path) -> bool {
        let Some(libs_dir) = self.shared_libraries_directory_absolute_path() else {
            return false;
        };
        library_path.parent() == Some(libs_dir.as_path())
    }

    /// Initialize this distribution's identity from one Qt shared library's
    /// absolute path, optionally refined by a `qt.conf` file found next to it.
    ///
    /// On Linux, a Qt library typically lives at `<root>/lib/libQt5Core.so.5`; on
    /// Windows at `<root>/bin/Qt5Core.dll`. Both cases: the libs directory is the
    /// immediate parent, and the root is its parent.
    pub fn setup_from_qt_shared_library(&mut self, library_path: &Path) -> Result<(), LookupError> {
        let libs_dir = library_path.parent().ok_or_else(|| {
            LookupError::ContextDeductionError(format!(
                "Qt library path has no parent directory: {}",
                library_path.display()
            ))
        })?;
        let root = libs_dir.parent().ok_or_else(|| {
            LookupError::ContextDeductionError(format!(
                "Qt library directory has no parent directory: {}",
                libs_dir.display()
            ))
        })?;
        self.root = Some(root.to_path_buf());
        self.shared_libraries_dir = libs_dir
            .strip_prefix(root)
            .ok()
            .map(|p| p.to_path_buf())
            .or_else(|| libs_dir.file_name().map(PathBuf::from));

        if let Some(qt_conf) = find_qt_conf_near(library_path) {
            self.apply_qt_conf(&qt_conf, root)?;
        }
        Ok(())
    }

    fn apply_qt_conf(&mut self, qt_conf_path: &Path, qt_conf_dir_root: &Path) -> Result<(), LookupError> {
        let content = std::fs::read_to_string(qt_conf_path)?;
        let entries = parse_qt_conf(&content);
        if let Some(prefix) = entries.get("Prefix") {
            let prefix_path = PathBuf::from(prefix);
            self.root = Some(if prefix_path.is_absolute() {
                prefix_path
            } else {
                qt_conf_dir_root.join(prefix_path)
            });
        }
        if let Some(libraries) = entries.get("Libraries") {
            self.shared_libraries_dir = Some(PathBuf::from(libraries));
        }
        if let Some(plugins) = entries.get("Plugins") {
            self.plugins_root = PathBuf::from(plugins);
        }
        Ok(())
    }

    /// Whether `name` looks like a Qt library at all — the cheap pre-check the
    /// finder uses to decide whether to even consult this validator.
    pub fn is_qt_library_name(name: &str, platform: &Platform) -> bool {
        qt_name_pattern().is_match(&platform.fold_name(name))
    }
}

fn qt_name_pattern() -> &'static Regex {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(lib)?qt[56]").unwrap())
}

fn find_qt_conf_near(library_path: &Path) -> Option<PathBuf> {
    let dir = library_path.parent()?;
    let candidate = dir.join("qt.conf");
    candidate.is_file().then_some(candidate)
}

/// Minimal `[Paths]`-section key=value reader; Qt's own format is a plain INI
/// subset, not worth a dependency on a general INI crate for three known keys.
fn parse_qt_conf(content: &str) -> std::collections::HashMap<String, String> {
    let mut out = std::collections::HashMap::new();
    let mut in_paths_section = false;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            in_paths_section = line.eq_ignore_ascii_case("[Paths]");
            continue;
        }
        if !in_paths_section {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            out.insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }
    out
}
