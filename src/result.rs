//! `DependencyResult` (+`List`): the per-target, BFS-ordered output of a solve.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::{DependencyGraph, NodeIndex, SearchState};
use crate::platform::{OperatingSystem, Platform};
use crate::rpath::RPath;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyStatus {
    Found { path: PathBuf },
    NotFound,
    ExcludedFromRedistribution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEntry {
    pub library_name: String,
    pub status: DependencyStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyResult {
    pub target_path: PathBuf,
    pub entries: Vec<ResultEntry>,
    pub is_solved: bool,
}

impl DependencyResult {
    /// Build a result for one target by walking the solved graph in BFS order,
    /// starting from `target_idx`, excluding the target itself.
    pub fn from_graph(graph: &DependencyGraph, target_idx: NodeIndex, platform: Platform) -> Self {
        use std::collections::{HashSet, VecDeque};

        let target_path = graph
            .node(target_idx)
            .absolute_path()
            .map(std::path::Path::to_path_buf)
            .unwrap_or_default();

        let mut entries = Vec::new();
        let mut seen_names: HashSet<String> = HashSet::new();
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();
        visited.insert(target_idx);
        queue.push_back(target_idx);

        let mut is_solved = true;

        while let Some(u) = queue.pop_front() {
            for v in graph.out_edges(u) {
                if !visited.insert(v) {
                    continue;
                }
                queue.push_back(v);
                let node = graph.node(v);
                let key = platform.fold_name(&node.file_name);
                if !seen_names.insert(key) {
                    continue;
                }
                let status = match &node.search_state {
                    SearchState::Found(path) => DependencyStatus::Found { path: path.clone() },
                    SearchState::NotFound => {
                        is_solved = false;
                        DependencyStatus::NotFound
                    }
                    SearchState::ExcludedFromRedistribution => {
                        DependencyStatus::ExcludedFromRedistribution
                    }
                    SearchState::NotSearched => {
                        // Can only happen for a vertex never reached by the BFS,
                        // i.e. unreachable via out_edges(); defensively treat the
                        // same as not-found rather than silently dropping it.
                        is_solved = false;
                        DependencyStatus::NotFound
                    }
                };
                entries.push(ResultEntry {
                    library_name: node.file_name.clone(),
                    status,
                });
            }
        }

        Self {
            target_path,
            entries,
            is_solved,
        }
    }

    pub fn libraries_to_redistribute(&self) -> Vec<&PathBuf> {
        self.entries
            .iter()
            .filter_map(|e| match &e.status {
                DependencyStatus::Found { path } => Some(path),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyResultList {
    pub results: Vec<DependencyResult>,
}

impl DependencyResultList {
    pub fn new(results: Vec<DependencyResult>) -> Self {
        Self { results }
    }

    pub fn is_solved(&self) -> bool {
        self.results.iter().all(|r| r.is_solved)
    }

    /// Union of every result's redistributable paths, deduplicated in insertion
    /// order using OS-aware equality.
    pub fn redistribute_paths(&self, platform: Platform) -> Vec<PathBuf> {
        let mut out: Vec<PathBuf> = Vec::new();
        for result in &self.results {
            for path in result.libraries_to_redistribute() {
                let already_present = out.iter().any(|p| {
                    let a = p.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                    let b = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                    platform.names_equal(a, b)
                });
                if !already_present {
                    out.push(path.clone());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;
    use crate::finder::SharedLibraryFinder;
    use crate::platform::ProcessorIsa;
    use crate::reader::{BinaryInfo, ExecutableFileReader};
    use crate::sinks::MessageSinks;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    struct FakeReader(HashMap<String, Vec<String>>);
    impl ExecutableFileReader for FakeReader {
        fn read(&self, path: &Path) -> Result<BinaryInfo, crate::common::LookupError> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap().to_owned();
            Ok(BinaryInfo {
                platform: Platform::new(OperatingSystem::Linux, ProcessorIsa::X86_64),
                is_executable_or_shared_library: true,
                needed_shared_libraries: self.0.get(&name).cloned().unwrap_or_default(),
                rpath: RPath::empty(),
            })
        }
    }

    struct FakeFinder(HashMap<String, PathBuf>);
    impl SharedLibraryFinder for FakeFinder {
        fn platform(&self) -> Platform {
            Platform::new(OperatingSystem::Linux, ProcessorIsa::X86_64)
        }
        fn should_distribute(&self, _name: &str) -> bool {
            true
        }
        fn find(
            &mut self,
            name: &str,
            _referring_binary: &Path,
            _referring_rpath: &RPath,
        ) -> Result<PathBuf, crate::common::FindDependencyError> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| crate::common::FindDependencyError(name.to_owned()))
        }
    }

    #[test]
    fn solved_result_excludes_target_and_dedups() {
        let mut deps = HashMap::new();
        deps.insert("app".to_string(), vec!["liba.so".to_string()]);
        deps.insert("liba.so".to_string(), vec![]);
        let reader = FakeReader(deps);
        let mut locations = HashMap::new();
        locations.insert("liba.so".to_string(), PathBuf::from("/lib/liba.so"));
        let mut finder = FakeFinder(locations);

        let platform = Platform::new(OperatingSystem::Linux, ProcessorIsa::X86_64);
        let mut graph = DependencyGraph::new(platform);
        let target = graph.add_target(PathBuf::from("/bin/app"));
        let config = DeployConfig::default();
        let sinks = MessageSinks::default();
        graph.build(&reader, &mut finder, &config, &sinks).unwrap();

        let result = DependencyResult::from_graph(&graph, target, platform);
        assert!(result.is_solved);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].library_name, "liba.so");
        assert!(!result.entries.iter().any(|e| e.library_name == "app"));
    }
}
