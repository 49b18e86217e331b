//! Stager: copies a solved result into a destination directory and rewrites
//! RPATH so the staged tree is self-contained.

use std::ffi::CString;
use std::path::{Path, PathBuf};

use fs_err as fs;

use crate::common::LookupError;
use crate::config::{StageLayout, StageOptions};
use crate::platform::OperatingSystem;
use crate::result::DependencyResult;
use crate::sinks::MessageSinks;

#[derive(Debug, Default)]
pub struct StageReport {
    pub copied: Vec<PathBuf>,
    pub skipped_unchanged: Vec<PathBuf>,
}

/// Rewrites a staged shared library's dynamic RPATH/RUNPATH entry. Injected so
/// the core doesn't hard-depend on an ELF-patching backend; Windows binaries
/// have no RPATH concept, so a no-op rewriter is used there.
pub trait RPathRewriter {
    fn rewrite(&self, staged_path: &Path) -> Result<(), LookupError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRPathRewriter;

impl RPathRewriter for NoOpRPathRewriter {
    fn rewrite(&self, _staged_path: &Path) -> Result<(), LookupError> {
        Ok(())
    }
}

/// Rewrites RUNPATH to a single `$ORIGIN` entry now that every dependency lives
/// flattened alongside the file, using the `elb` crate's patcher rather than
/// hand-rolling dynamic-section surgery.
#[derive(Debug, Default, Clone, Copy)]
pub struct OriginRPathRewriter;

impl RPathRewriter for OriginRPathRewriter {
    fn rewrite(&self, staged_path: &Path) -> Result<(), LookupError> {
        let mut file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(staged_path)
            .map_err(|e| LookupError::CouldNotOpenFile { source: e })?;

        let elf = elb::Elf::read(&mut file, 0x1000)
            .map_err(|e| LookupError::InternalError(anyhow::anyhow!(e)))?;
        let mut patcher = elb::ElfPatcher::new(elf, file);

        let origin = CString::new("$ORIGIN").expect("no interior NUL");
        patcher
            .set_dynamic_c_str(elb::DynamicTag::Runpath, &origin)
            .map_err(|e| LookupError::InternalError(anyhow::anyhow!(e)))?;
        patcher
            .finish()
            .map_err(|e| LookupError::InternalError(anyhow::anyhow!(e)))?;
        Ok(())
    }
}

fn rewriter_for(os: OperatingSystem) -> Box<dyn RPathRewriter> {
    match os {
        OperatingSystem::Linux => Box::new(OriginRPathRewriter),
        OperatingSystem::Windows => Box::new(NoOpRPathRewriter),
    }
}

/// Stage a solved result's redistributable libraries (plus its target) into
/// `destination`, per `layout`. Refuses to touch an unsolved result unless
/// `options.allow_unsolved` is set.
pub fn stage(
    result: &DependencyResult,
    destination: &Path,
    layout: &StageLayout,
    options: &StageOptions,
    os: OperatingSystem,
    sinks: &MessageSinks,
) -> Result<StageReport, LookupError> {
    if !result.is_solved && !options.allow_unsolved {
        return Err(LookupError::ContextDeductionError(
            "refusing to stage an unsolved result; set StageOptions::allow_unsolved to override"
                .to_owned(),
        ));
    }

    fs::create_dir_all(destination)?;
    let lib_dir = match &layout.lib_dir {
        Some(rel) => {
            let dir = destination.join(rel);
            fs::create_dir_all(&dir)?;
            dir
        }
        None => destination.to_path_buf(),
    };

    let rewriter = rewriter_for(os);
    let mut report = StageReport::default();

    let mut to_copy: Vec<PathBuf> = result.libraries_to_redistribute().into_iter().cloned().collect();
    to_copy.push(result.target_path.clone());

    for source in to_copy {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let dest = if source == result.target_path {
            destination.join(file_name)
        } else {
            lib_dir.join(file_name)
        };

        if is_up_to_date(&source, &dest)? {
            report.skipped_unchanged.push(dest);
            continue;
        }

        sinks.status(format!("copying {} -> {}", source.display(), dest.display()));
        fs::copy(&source, &dest)?;
        if source != result.target_path {
            rewriter.rewrite(&dest)?;
        }
        report.copied.push(dest);
    }

    Ok(report)
}

fn is_up_to_date(source: &Path, dest: &Path) -> Result<bool, LookupError> {
    if !dest.is_file() {
        return Ok(false);
    }
    let src_meta = fs::metadata(source)?;
    let dest_meta = fs::metadata(dest)?;
    Ok(src_meta.len() == dest_meta.len() && src_meta.modified()? <= dest_meta.modified()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{DependencyStatus, ResultEntry};
    use tempfile::tempdir;

    #[test]
    fn staging_an_unsolved_result_is_rejected_by_default() {
        let src = tempdir().unwrap();
        let target_path = src.path().join("app");
        fs::write(&target_path, b"not a real binary").unwrap();

        let result = DependencyResult {
            target_path,
            entries: vec![ResultEntry {
                library_name: "missing.so".to_owned(),
                status: DependencyStatus::NotFound,
            }],
            is_solved: false,
        };

        let dest = tempdir().unwrap();
        let err = stage(
            &result,
            dest.path(),
            &StageLayout::default(),
            &StageOptions::default(),
            OperatingSystem::Linux,
            &MessageSinks::default(),
        );
        assert!(err.is_err());
    }
}
