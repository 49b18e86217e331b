//! `Driver`: wires reader + finder + graph together into `find_dependencies`.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::common::LookupError;
use crate::config::DeployConfig;
use crate::finder::{LinuxFinder, SharedLibraryFinder, WindowsFinder};
use crate::graph::DependencyGraph;
use crate::platform::{OperatingSystem, Platform};
use crate::qt::QtDistributionDirectory;
use crate::reader::{ExecutableFileReader, GoblinReader};
use crate::result::{DependencyResult, DependencyResultList};
use crate::sinks::MessageSinks;

/// Resolve the transitive dependencies of a single target binary.
pub fn find_dependencies(
    target: &Path,
    config: &DeployConfig,
    sinks: &MessageSinks,
) -> Result<DependencyResult, LookupError> {
    let list = find_dependencies_many(std::slice::from_ref(&target.to_path_buf()), config, sinks)?;
    list.results
        .into_iter()
        .next()
        .ok_or_else(|| LookupError::ContextDeductionError("no target given".to_owned()))
}

/// Resolve the transitive dependencies of several targets sharing one graph, so
/// a dependency common to more than one target is read and resolved once.
pub fn find_dependencies_many(
    targets: &[PathBuf],
    config: &DeployConfig,
    sinks: &MessageSinks,
) -> Result<DependencyResultList, LookupError> {
    let Some(first) = targets.first() else {
        return Ok(DependencyResultList::new(Vec::new()));
    };

    let reader = GoblinReader;
    let info = reader.read(first)?;
    let platform = info.platform;

    let mut graph = DependencyGraph::new(platform);
    // A target that cannot even be canonicalized doesn't abort the whole call;
    // it is reported back as its own unsolved, dependency-less result while its
    // siblings are still resolved (§7: per-target failures don't propagate).
    let mut target_indices: Vec<Option<_>> = Vec::with_capacity(targets.len());
    for target in targets {
        match std::fs::canonicalize(target) {
            Ok(absolute) => target_indices.push(Some(graph.add_target(absolute))),
            Err(e) => {
                sinks.status(format!("could not open {}: {e}", target.display()));
                target_indices.push(None);
            }
        }
    }

    let qt = Rc::new(RefCell::new(QtDistributionDirectory::new()));
    let mut finder = build_finder(platform, config, first, &qt, sinks);

    graph.build(&reader, finder.as_mut(), config, sinks)?;

    let results = targets
        .iter()
        .zip(target_indices)
        .map(|(target, idx)| match idx {
            Some(idx) => DependencyResult::from_graph(&graph, idx, platform),
            None => DependencyResult {
                target_path: target.clone(),
                entries: Vec::new(),
                is_solved: false,
            },
        })
        .collect();

    Ok(DependencyResultList::new(results))
}

fn build_finder(
    platform: Platform,
    config: &DeployConfig,
    first_target: &Path,
    qt: &Rc<RefCell<QtDistributionDirectory>>,
    sinks: &MessageSinks,
) -> Box<dyn SharedLibraryFinder> {
    let validator = Box::new(GoblinReader);
    match platform.os {
        OperatingSystem::Linux => Box::new(LinuxFinder::new(
            platform,
            config.prefix_paths(),
            validator,
            qt.clone(),
            sinks.clone(),
        )),
        OperatingSystem::Windows => {
            let target_dir = first_target.parent().unwrap_or_else(|| Path::new("."));
            Box::new(WindowsFinder::new(
                platform,
                config,
                target_dir,
                validator,
                qt.clone(),
                sinks.clone(),
            ))
        }
    }
}
