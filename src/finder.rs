//! `SharedLibraryFinder`: given a library name and the binary that referenced it,
//! return its absolute path, or report it unfindable / excluded.
//!
//! A shared "validate candidate" step (existence + Qt-tree membership) with
//! platform-specific search-order and alternate-name logic layered on top.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::common::FindDependencyError;
use crate::compiler::BuildType;
use crate::config::DeployConfig;
use crate::exclude;
use crate::platform::Platform;
use crate::qt::QtDistributionDirectory;
use crate::reader::IsExistingValidSharedLibrary;
use crate::rpath::RPath;
use crate::searchpath::{PathList, SearchPathList};
use crate::sinks::MessageSinks;

pub trait SharedLibraryFinder {
    fn platform(&self) -> Platform;

    fn should_distribute(&self, name: &str) -> bool;

    /// `referring_binary` is the absolute path of the binary that declared this
    /// dependency; `referring_rpath` is its already-read RPATH (empty on Windows).
    fn find(
        &mut self,
        name: &str,
        referring_binary: &Path,
        referring_rpath: &RPath,
    ) -> Result<PathBuf, FindDependencyError>;
}

/// Shared validation: the candidate must exist and parse as a shared library, and
/// if it looks like a Qt library it must belong to the frozen Qt distribution.
fn validate_candidate(
    candidate: &Path,
    platform: &Platform,
    validator: &dyn IsExistingValidSharedLibrary,
    qt: &Rc<RefCell<QtDistributionDirectory>>,
) -> bool {
    if !validator.is_valid(candidate) {
        return false;
    }
    let name = candidate.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if QtDistributionDirectory::is_qt_library_name(name, platform) {
        let mut qt_ref = qt.borrow_mut();
        if qt_ref.is_null() {
            // First Qt library encountered in this solve: adopt it as the
            // distribution. First one wins.
            let _ = qt_ref.setup_from_qt_shared_library(candidate);
            return true;
        }
        return qt_ref.contains(candidate);
    }
    true
}

pub struct LinuxFinder {
    platform: Platform,
    search_path_list: PathList,
    validator: Box<dyn IsExistingValidSharedLibrary>,
    qt: Rc<RefCell<QtDistributionDirectory>>,
    sinks: MessageSinks,
}

impl LinuxFinder {
    pub fn new(
        platform: Platform,
        prefix_paths: PathList,
        validator: Box<dyn IsExistingValidSharedLibrary>,
        qt: Rc<RefCell<QtDistributionDirectory>>,
        sinks: MessageSinks,
    ) -> Self {
        let mut spl = SearchPathList::new();
        spl.set_include_path_prefixes(true);
        spl.set_path_suffix_list(vec!["lib", "qt5/lib"]);
        spl.set_path_prefix_list(prefix_paths.iter().cloned());

        let mut search_path_list = spl.path_list();
        search_path_list.extend(&system_library_known_path_list_linux());
        search_path_list.remove_non_existing();

        Self {
            platform,
            search_path_list,
            validator,
            qt,
            sinks,
        }
    }
}

/// Conventional Linux loader search path, used as the tail of the finder's search
/// list once RPATH and user prefixes have been exhausted.
fn system_library_known_path_list_linux() -> PathList {
    PathList::from_paths(
        ["/lib", "/lib64", "/usr/lib", "/usr/lib64", "/usr/local/lib"]
            .into_iter()
            .map(PathBuf::from),
    )
}

impl SharedLibraryFinder for LinuxFinder {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn should_distribute(&self, name: &str) -> bool {
        exclude::should_distribute(name, &self.platform, false, false)
    }

    fn find(
        &mut self,
        name: &str,
        referring_binary: &Path,
        referring_rpath: &RPath,
    ) -> Result<PathBuf, FindDependencyError> {
        self.sinks.verbose(format!(" searching {name}"));

        let referring_dir = referring_binary
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let rpath_dirs = referring_rpath.expand(&referring_dir);

        for dir in rpath_dirs.iter().chain(self.search_path_list.iter()) {
            let candidate = dir.join(name);
            self.sinks.debug(format!("  try {}", candidate.display()));
            if validate_candidate(&candidate, &self.platform, self.validator.as_ref(), &self.qt) {
                return Ok(candidate);
            }
        }

        Err(FindDependencyError(name.to_owned()))
    }
}

pub struct WindowsFinder {
    platform: Platform,
    config: ExcludeFlags,
    search_path_list: PathList,
    validator: Box<dyn IsExistingValidSharedLibrary>,
    qt: Rc<RefCell<QtDistributionDirectory>>,
    sinks: MessageSinks,
}

struct ExcludeFlags {
    exclude_msvc_runtime: bool,
    exclude_windows_api_sets: bool,
}

impl WindowsFinder {
    pub fn new(
        platform: Platform,
        config: &DeployConfig,
        target_dir: &Path,
        validator: Box<dyn IsExistingValidSharedLibrary>,
        qt: Rc<RefCell<QtDistributionDirectory>>,
        sinks: MessageSinks,
    ) -> Self {
        let mut search_path_list = PathList::new();

        if let Some(compiler) = config.compiler_finder.as_ref() {
            if compiler.has_install_dir() {
                search_path_list.extend(&PathList::from_paths(
                    compiler.find_redist_directories(platform.isa, BuildType::Release),
                ));
                search_path_list.extend(&PathList::from_paths(
                    compiler.find_redist_directories(platform.isa, BuildType::Debug),
                ));
            }
        }

        let mut spl = SearchPathList::new();
        spl.set_include_path_prefixes(true);
        spl.set_path_suffix_list(vec!["bin", "qt5/bin"]);
        spl.set_path_prefix_list(config.prefix_path_list.iter().cloned());
        spl.append_path(target_dir.to_path_buf());
        search_path_list.extend(&spl.path_list());

        if config.include_host_path_on_windows {
            let mut path_spl = SearchPathList::new();
            path_spl.set_include_path_prefixes(true);
            path_spl.set_path_suffix_list(vec!["bin", "qt5/bin"]);
            path_spl.set_path_prefix_list(host_path_entries());
            search_path_list.extend(&path_spl.path_list());
        }

        search_path_list.remove_non_existing();

        Self {
            platform,
            config: ExcludeFlags {
                exclude_msvc_runtime: config.exclude_msvc_runtime,
                exclude_windows_api_sets: config.exclude_windows_api_sets,
            },
            search_path_list,
            validator,
            qt,
            sinks,
        }
    }

    /// The three-probe alternate-name dance: exact, lowercased, uppercased.
    fn find_by_alternate_names(&self, dir: &Path, name: &str) -> Option<PathBuf> {
        for candidate_name in [name.to_owned(), name.to_lowercase(), name.to_uppercase()] {
            let candidate = dir.join(&candidate_name);
            self.sinks.debug(format!("  try {}", candidate.display()));
            if validate_candidate(&candidate, &self.platform, self.validator.as_ref(), &self.qt) {
                return Some(candidate);
            }
        }
        None
    }
}

fn host_path_entries() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|p| std::env::split_paths(&p).collect())
        .unwrap_or_default()
}

impl SharedLibraryFinder for WindowsFinder {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn should_distribute(&self, name: &str) -> bool {
        exclude::should_distribute(
            name,
            &self.platform,
            self.config.exclude_msvc_runtime,
            self.config.exclude_windows_api_sets,
        )
    }

    fn find(
        &mut self,
        name: &str,
        _referring_binary: &Path,
        _referring_rpath: &RPath,
    ) -> Result<PathBuf, FindDependencyError> {
        self.sinks.verbose(format!(" searching {name}"));

        let dirs: Vec<PathBuf> = self.search_path_list.iter().cloned().collect();
        for dir in &dirs {
            if let Some(found) = self.find_by_alternate_names(dir, name) {
                return Ok(found);
            }
        }

        Err(FindDependencyError(name.to_owned()))
    }
}
