//! `DeployConfig`/`StageLayout`/`StageOptions`: the parameters struct the driver
//! and stager are built from.
//!
//! A flat struct of booleans/optionals controlling one resolve call,
//! `serde`-derived so a CLI front-end or a config file can both feed it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::compiler::CompilerFinder;
use crate::searchpath::PathList;

/// Parameters controlling one `find_dependencies` call.
#[derive(Serialize, Deserialize)]
pub struct DeployConfig {
    pub exclude_msvc_runtime: bool,
    pub exclude_windows_api_sets: bool,
    /// Whether the host's `PATH` environment variable is folded into the Windows
    /// search path. An explicit, overridable flag rather than an implicit
    /// `cfg!(windows)` check, so a cross-compiling caller can turn it off.
    pub include_host_path_on_windows: bool,
    pub max_depth: Option<usize>,
    pub skip_system_dll_dependencies: bool,
    #[serde(skip)]
    pub compiler_finder: Option<Box<dyn CompilerFinder>>,
    pub prefix_path_list: Vec<PathBuf>,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            exclude_msvc_runtime: true,
            exclude_windows_api_sets: true,
            include_host_path_on_windows: cfg!(windows),
            max_depth: None,
            skip_system_dll_dependencies: true,
            compiler_finder: None,
            prefix_path_list: Vec::new(),
        }
    }
}

impl DeployConfig {
    pub fn prefix_paths(&self) -> PathList {
        PathList::from_paths(self.prefix_path_list.iter().cloned())
    }
}

/// Destination-tree shape for the stager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageLayout {
    /// Relative subdirectory dependencies are copied into; empty for a flat layout.
    pub lib_dir: Option<String>,
    /// Whether a discovered Qt distribution's `plugins/` tree is also staged.
    pub copy_qt_plugins: bool,
}

impl Default for StageLayout {
    fn default() -> Self {
        Self {
            lib_dir: None,
            copy_qt_plugins: false,
        }
    }
}

/// Controls whether [`crate::stager::stage`] will act on an unsolved result.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageOptions {
    pub allow_unsolved: bool,
}
