//! Property-based coverage for the dependency-graph invariants: every binary
//! is read at most once, a solve's result is deterministic, a result never
//! lists the same library twice, and `is_solved` agrees with whether any
//! entry is unresolved.
//!
//! Driven through the same fake reader/finder shape as the scenario tests,
//! but over a randomly generated dependency script rather than a fixed one.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use arbtest::arbtest;

use bindeploy::common::{FindDependencyError, LookupError};
use bindeploy::config::DeployConfig;
use bindeploy::finder::SharedLibraryFinder;
use bindeploy::graph::DependencyGraph;
use bindeploy::platform::{OperatingSystem, Platform, ProcessorIsa};
use bindeploy::reader::{BinaryInfo, ExecutableFileReader};
use bindeploy::result::{DependencyResult, DependencyStatus};
use bindeploy::rpath::RPath;
use bindeploy::sinks::MessageSinks;

fn linux() -> Platform {
    Platform::new(OperatingSystem::Linux, ProcessorIsa::X86_64)
}

/// A fixed dependency script, node 0 is the resolve target: `deps[i]` are
/// the indices node `i` declares as needed, `available[i]` says whether the
/// finder can locate node `i` once probed. Edges may cycle back on
/// themselves; the graph builder must tolerate that without looping forever.
struct Script {
    names: Vec<String>,
    deps: Vec<Vec<usize>>,
    available: Vec<bool>,
}

struct ScriptReader<'a> {
    script: &'a Script,
    read_counts: RefCell<HashMap<String, u32>>,
}

impl ExecutableFileReader for ScriptReader<'_> {
    fn read(&self, path: &Path) -> Result<BinaryInfo, LookupError> {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap().to_owned();
        *self.read_counts.borrow_mut().entry(name.clone()).or_insert(0) += 1;
        let idx = self.script.names.iter().position(|n| *n == name).unwrap();
        Ok(BinaryInfo {
            platform: linux(),
            is_executable_or_shared_library: true,
            needed_shared_libraries: self.script.deps[idx]
                .iter()
                .map(|&j| self.script.names[j].clone())
                .collect(),
            rpath: RPath::empty(),
        })
    }
}

struct ScriptFinder<'a> {
    script: &'a Script,
}

impl SharedLibraryFinder for ScriptFinder<'_> {
    fn platform(&self) -> Platform {
        linux()
    }

    fn should_distribute(&self, _name: &str) -> bool {
        true
    }

    fn find(
        &mut self,
        name: &str,
        _referring_binary: &Path,
        _referring_rpath: &RPath,
    ) -> Result<PathBuf, FindDependencyError> {
        let idx = self.script.names.iter().position(|n| *n == name).unwrap();
        if self.script.available[idx] {
            Ok(PathBuf::from(format!("/lib/{name}")))
        } else {
            Err(FindDependencyError(name.to_owned()))
        }
    }
}

/// Builds a fresh graph from scratch and solves it, returning per-name read
/// counts alongside the target's result.
fn run(script: &Script) -> (HashMap<String, u32>, DependencyResult) {
    let reader = ScriptReader { script, read_counts: RefCell::new(HashMap::new()) };
    let mut finder = ScriptFinder { script };
    let mut graph = DependencyGraph::new(linux());
    let target = graph.add_target(PathBuf::from(format!("/bin/{}", script.names[0])));
    let config = DeployConfig::default();
    let sinks = MessageSinks::default();
    graph.build(&reader, &mut finder, &config, &sinks).unwrap();
    let result = DependencyResult::from_graph(&graph, target, linux());
    (reader.read_counts.into_inner(), result)
}

#[test]
fn graph_invariants_hold_for_arbitrary_dependency_scripts() {
    arbtest(|u| {
        let n: usize = u.int_in_range(1..=6)?;
        let names: Vec<String> = (0..n).map(|i| format!("node{i}.so")).collect();

        let mut deps: Vec<Vec<usize>> = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = Vec::new();
            for j in 0..n {
                if j != i && u.arbitrary::<bool>()? {
                    row.push(j);
                }
            }
            deps.push(row);
        }

        let mut available = Vec::with_capacity(n);
        for _ in 0..n {
            available.push(u.arbitrary::<bool>()?);
        }

        let script = Script { names, deps, available };

        let (counts_a, result_a) = run(&script);
        let (_, result_b) = run(&script);

        // At-most-once-read: no name is handed to the reader twice, however
        // many parents reference it or however the graph cycles.
        for (name, count) in &counts_a {
            assert!(*count <= 1, "{name} was read {count} times");
        }

        // Determinism: two fresh solves of the same script agree on both the
        // entry order and every entry's status.
        assert_eq!(result_a.entries.len(), result_b.entries.len());
        for (a, b) in result_a.entries.iter().zip(result_b.entries.iter()) {
            assert_eq!(a.library_name, b.library_name);
            assert_eq!(a.status, b.status);
        }
        assert_eq!(result_a.is_solved, result_b.is_solved);

        // No-dup-by-name: a result never lists the same library twice.
        let mut seen_names: HashSet<&str> = HashSet::new();
        for entry in &result_a.entries {
            assert!(seen_names.insert(&entry.library_name), "duplicate entry for {}", entry.library_name);
        }

        // Solvedness: is_solved is true exactly when no entry is unresolved.
        let has_unresolved = result_a.entries.iter().any(|e| e.status == DependencyStatus::NotFound);
        assert_eq!(result_a.is_solved, !has_unresolved);

        Ok(())
    });
}
