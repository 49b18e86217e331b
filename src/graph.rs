//! `DependencyGraph`: the core two-phase BFS dependency-graph builder.
//!
//! A BFS visitor may not mutate the graph it is iterating, so each round
//! collects newly-discovered `(parent, dependency-names)` tuples during one BFS
//! pass, then extends the graph once the pass has finished. `build()`'s `loop`
//! repeats this to a fixed point.
//!
//! Vertex indices are plain integers into a `Vec`; no separate graph crate is
//! needed for an adjacency structure this simple.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use crate::common::LookupError;
use crate::config::DeployConfig;
use crate::finder::SharedLibraryFinder;
use crate::platform::Platform;
use crate::reader::ExecutableFileReader;
use crate::rpath::RPath;
use crate::sinks::MessageSinks;

pub type NodeIndex = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchState {
    NotSearched,
    Found(PathBuf),
    NotFound,
    ExcludedFromRedistribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    Unread,
    Read,
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub file_name: String,
    pub read_state: ReadState,
    pub search_state: SearchState,
    pub rpath: RPath,
}

impl GraphNode {
    fn new(file_name: String) -> Self {
        Self {
            file_name,
            read_state: ReadState::Unread,
            search_state: SearchState::NotSearched,
            rpath: RPath::empty(),
        }
    }

    pub fn absolute_path(&self) -> Option<&std::path::Path> {
        match &self.search_state {
            SearchState::Found(p) => Some(p.as_path()),
            _ => None,
        }
    }
}

pub struct DependencyGraph {
    platform: Platform,
    nodes: Vec<GraphNode>,
    index: HashMap<String, NodeIndex>,
    /// Insertion-ordered adjacency: iteration order must match the order
    /// dependencies were declared, since it decides which parent's RPATH a
    /// shared child resolves against, and result/BFS ordering must be
    /// deterministic across runs.
    out_edges: Vec<Vec<NodeIndex>>,
    targets: Vec<NodeIndex>,
}

impl DependencyGraph {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            nodes: Vec::new(),
            index: HashMap::new(),
            out_edges: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn node(&self, idx: NodeIndex) -> &GraphNode {
        &self.nodes[idx]
    }

    pub fn targets(&self) -> &[NodeIndex] {
        &self.targets
    }

    pub fn out_edges(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.out_edges[idx].iter().copied()
    }

    /// `add_vertex` / `findVertex`: returns the existing vertex for this
    /// case-folded name, or creates a fresh one in `{Unread, NotSearched}`.
    fn add_vertex(&mut self, file_name: &str) -> NodeIndex {
        let key = self.platform.fold_name(file_name);
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(GraphNode::new(file_name.to_owned()));
        self.out_edges.push(Vec::new());
        self.index.insert(key, idx);
        idx
    }

    /// Keeps set semantics (no duplicate edge) while preserving the order
    /// edges were first declared in.
    fn add_edge(&mut self, parent: NodeIndex, child: NodeIndex) {
        let edges = &mut self.out_edges[parent];
        if !edges.contains(&child) {
            edges.push(child);
        }
    }

    /// Registers one binary as a resolve target: already "found" at its own
    /// absolute path, not yet read.
    pub fn add_target(&mut self, absolute_path: PathBuf) -> NodeIndex {
        let file_name = absolute_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_owned();
        let idx = self.add_vertex(&file_name);
        self.nodes[idx].search_state = SearchState::Found(absolute_path);
        self.targets.push(idx);
        idx
    }

    /// The core build loop, run to a fixed point: BFS once, collect discoveries,
    /// extend the graph, repeat until a pass discovers nothing new.
    pub fn build(
        &mut self,
        reader: &dyn ExecutableFileReader,
        finder: &mut dyn SharedLibraryFinder,
        config: &DeployConfig,
        sinks: &MessageSinks,
    ) -> Result<(), LookupError> {
        loop {
            let pending = self.run_bfs_pass(reader, finder, config, sinks)?;
            if pending.is_empty() {
                break;
            }
            for (parent, names) in pending {
                for name in names {
                    let child = self.add_vertex(&name);
                    self.add_edge(parent, child);
                }
            }
        }
        Ok(())
    }

    /// One BFS pass over the graph as it stands today. Never mutates the vertex
    /// or edge set; returns `(vertex, needed-names)` pairs for vertices read
    /// during this pass, to be applied by the caller once the pass is done.
    fn run_bfs_pass(
        &mut self,
        reader: &dyn ExecutableFileReader,
        finder: &mut dyn SharedLibraryFinder,
        config: &DeployConfig,
        sinks: &MessageSinks,
    ) -> Result<Vec<(NodeIndex, Vec<String>)>, LookupError> {
        let mut pending = Vec::new();
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        for &t in &self.targets {
            if visited.insert(t) {
                queue.push_back(t);
                self.discover_vertex(t, reader, sinks, &mut pending)?;
            }
        }

        while let Some(u) = queue.pop_front() {
            if let Some(depth_limit) = config.max_depth {
                if self.depth_of(u) > depth_limit {
                    continue;
                }
            }
            let children: Vec<NodeIndex> = self.out_edges[u].clone();
            for v in children {
                self.examine_edge(u, v, finder);
                if visited.insert(v) {
                    self.discover_vertex(v, reader, sinks, &mut pending)?;
                    queue.push_back(v);
                }
            }
        }

        Ok(pending)
    }

    /// `examine_edge`: resolve the child's absolute path the first time it is
    /// reached, skipping the probe entirely if the exclusion policy already
    /// rules it out by name alone, with no disk access.
    fn examine_edge(&mut self, parent: NodeIndex, child: NodeIndex, finder: &mut dyn SharedLibraryFinder) {
        if self.nodes[child].search_state != SearchState::NotSearched {
            return;
        }
        let name = self.nodes[child].file_name.clone();
        if !finder.should_distribute(&name) {
            self.nodes[child].search_state = SearchState::ExcludedFromRedistribution;
            return;
        }
        let referring_binary = self.nodes[parent]
            .absolute_path()
            .map(std::path::Path::to_path_buf)
            .unwrap_or_default();
        let referring_rpath = self.nodes[parent].rpath.clone();
        match finder.find(&name, &referring_binary, &referring_rpath) {
            Ok(path) => self.nodes[child].search_state = SearchState::Found(path),
            Err(_) => self.nodes[child].search_state = SearchState::NotFound,
        }
    }

    /// `discover_vertex`: read a freshly-found, not-yet-read vertex exactly once.
    fn discover_vertex(
        &mut self,
        v: NodeIndex,
        reader: &dyn ExecutableFileReader,
        sinks: &MessageSinks,
        pending: &mut Vec<(NodeIndex, Vec<String>)>,
    ) -> Result<(), LookupError> {
        if self.nodes[v].read_state == ReadState::Read {
            return Ok(());
        }
        let Some(path) = self.nodes[v].absolute_path().map(std::path::Path::to_path_buf) else {
            return Ok(());
        };
        sinks.status(format!("reading {}", path.display()));
        let info = reader.read(&path)?;
        self.nodes[v].rpath = info.rpath;
        self.nodes[v].read_state = ReadState::Read;
        pending.push((v, info.needed_shared_libraries));
        Ok(())
    }

    fn depth_of(&self, idx: NodeIndex) -> usize {
        // BFS shortest-path depth from any target; recomputed on demand since the
        // graph is small and this is only consulted when `max_depth` is set.
        let mut visited = HashSet::new();
        let mut queue: VecDeque<(NodeIndex, usize)> = self.targets.iter().map(|&t| (t, 0)).collect();
        while let Some((u, d)) = queue.pop_front() {
            if u == idx {
                return d;
            }
            if !visited.insert(u) {
                continue;
            }
            for v in self.out_edges[u].iter().copied() {
                queue.push_back((v, d + 1));
            }
        }
        usize::MAX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FindDependencyError;
    use crate::platform::{OperatingSystem, ProcessorIsa};
    use crate::reader::BinaryInfo;
    use std::cell::RefCell;
    use std::collections::HashMap as StdHashMap;

    struct FakeReader {
        deps: StdHashMap<String, Vec<String>>,
    }

    impl ExecutableFileReader for FakeReader {
        fn read(&self, path: &std::path::Path) -> Result<BinaryInfo, LookupError> {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap().to_owned();
            Ok(BinaryInfo {
                platform: Platform::new(OperatingSystem::Linux, ProcessorIsa::X86_64),
                is_executable_or_shared_library: true,
                needed_shared_libraries: self.deps.get(&name).cloned().unwrap_or_default(),
                rpath: RPath::empty(),
            })
        }
    }

    struct FakeFinder {
        locations: StdHashMap<String, PathBuf>,
        excluded: HashSet<String>,
        calls: RefCell<Vec<String>>,
    }

    impl SharedLibraryFinder for FakeFinder {
        fn platform(&self) -> Platform {
            Platform::new(OperatingSystem::Linux, ProcessorIsa::X86_64)
        }

        fn should_distribute(&self, name: &str) -> bool {
            !self.excluded.contains(name)
        }

        fn find(
            &mut self,
            name: &str,
            _referring_binary: &std::path::Path,
            _referring_rpath: &RPath,
        ) -> Result<PathBuf, FindDependencyError> {
            self.calls.borrow_mut().push(name.to_owned());
            self.locations
                .get(name)
                .cloned()
                .ok_or_else(|| FindDependencyError(name.to_owned()))
        }
    }

    fn platform() -> Platform {
        Platform::new(OperatingSystem::Linux, ProcessorIsa::X86_64)
    }

    #[test]
    fn diamond_dependency_is_read_once() {
        let mut deps = StdHashMap::new();
        deps.insert("app".to_string(), vec!["liba.so".to_string(), "libb.so".to_string()]);
        deps.insert("liba.so".to_string(), vec!["libshared.so".to_string()]);
        deps.insert("libb.so".to_string(), vec!["libshared.so".to_string()]);
        deps.insert("libshared.so".to_string(), vec![]);
        let reader = FakeReader { deps };

        let mut locations = StdHashMap::new();
        locations.insert("liba.so".to_string(), PathBuf::from("/lib/liba.so"));
        locations.insert("libb.so".to_string(), PathBuf::from("/lib/libb.so"));
        locations.insert("libshared.so".to_string(), PathBuf::from("/lib/libshared.so"));
        let mut finder = FakeFinder {
            locations,
            excluded: HashSet::new(),
            calls: RefCell::new(Vec::new()),
        };

        let mut graph = DependencyGraph::new(platform());
        graph.add_target(PathBuf::from("/bin/app"));
        let config = DeployConfig::default();
        let sinks = MessageSinks::default();
        graph.build(&reader, &mut finder, &config, &sinks).unwrap();

        // libshared.so is only looked up once despite two parents.
        let shared_lookups = finder.calls.borrow().iter().filter(|n| *n == "libshared.so").count();
        assert_eq!(shared_lookups, 1);
    }

    #[test]
    fn excluded_dependency_is_never_probed() {
        let mut deps = StdHashMap::new();
        deps.insert("app".to_string(), vec!["libc.so.6".to_string()]);
        let reader = FakeReader { deps };

        let mut excluded = HashSet::new();
        excluded.insert("libc.so.6".to_string());
        let mut finder = FakeFinder {
            locations: StdHashMap::new(),
            excluded,
            calls: RefCell::new(Vec::new()),
        };

        let mut graph = DependencyGraph::new(platform());
        graph.add_target(PathBuf::from("/bin/app"));
        let config = DeployConfig::default();
        let sinks = MessageSinks::default();
        graph.build(&reader, &mut finder, &config, &sinks).unwrap();

        assert!(finder.calls.borrow().is_empty());
    }

    #[test]
    fn not_found_dependency_is_recorded() {
        let mut deps = StdHashMap::new();
        deps.insert("app".to_string(), vec!["libmissing.so".to_string()]);
        let reader = FakeReader { deps };
        let mut finder = FakeFinder {
            locations: StdHashMap::new(),
            excluded: HashSet::new(),
            calls: RefCell::new(Vec::new()),
        };

        let mut graph = DependencyGraph::new(platform());
        graph.add_target(PathBuf::from("/bin/app"));
        let config = DeployConfig::default();
        let sinks = MessageSinks::default();
        graph.build(&reader, &mut finder, &config, &sinks).unwrap();

        let idx = *graph.index.get("libmissing.so").unwrap();
        assert_eq!(graph.node(idx).search_state, SearchState::NotFound);
    }
}
