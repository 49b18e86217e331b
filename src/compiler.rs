//! `CompilerFinder`: MSVC redist directory discovery.
//!
//! Finding an installed MSVC toolset normally means walking the Windows
//! registry; this keeps the trait boundary and the release/debug directory
//! ordering but backs it with a simple environment-variable probe
//! (`VCToolsInstallDir`, set by the MSVC developer prompt / `vcvarsall.bat`)
//! instead of a registry walk.

use std::path::PathBuf;

use crate::platform::ProcessorIsa;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    Release,
    Debug,
}

/// Abstraction over "where is the MSVC redist for this ISA/build type", so the
/// Windows finder never special-cases the host OS beyond the PATH inclusion
/// decision.
pub trait CompilerFinder: std::fmt::Debug + Send + Sync {
    fn has_install_dir(&self) -> bool;
    fn find_redist_directories(&self, isa: ProcessorIsa, build_type: BuildType) -> Vec<PathBuf>;
}

/// Always reports no install: the correct behavior on non-Windows hosts and the
/// default when no compiler was located.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCompilerFinder;

impl CompilerFinder for NoCompilerFinder {
    fn has_install_dir(&self) -> bool {
        false
    }

    fn find_redist_directories(&self, _isa: ProcessorIsa, _build_type: BuildType) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Probes the environment set up by the MSVC developer command prompt.
#[derive(Debug, Clone)]
pub struct EnvCompilerFinder {
    tools_install_dir: Option<PathBuf>,
}

impl EnvCompilerFinder {
    /// Reads `VCToolsInstallDir` from the process environment.
    pub fn from_env() -> Self {
        Self {
            tools_install_dir: std::env::var_os("VCToolsInstallDir").map(PathBuf::from),
        }
    }
}

impl CompilerFinder for EnvCompilerFinder {
    fn has_install_dir(&self) -> bool {
        self.tools_install_dir.is_some()
    }

    fn find_redist_directories(&self, isa: ProcessorIsa, build_type: BuildType) -> Vec<PathBuf> {
        let Some(root) = &self.tools_install_dir else {
            return Vec::new();
        };
        let arch = match isa {
            ProcessorIsa::X86_32 => "x86",
            ProcessorIsa::X86_64 => "x64",
        };
        let build = match build_type {
            BuildType::Release => "Microsoft.VC143.CRT",
            BuildType::Debug => "Microsoft.VC143.DebugCRT",
        };
        // VCToolsInstallDir\redist\<arch>\<build>
        vec![root.join("redist").join(arch).join(build)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_compiler_finder_reports_nothing() {
        let f = NoCompilerFinder;
        assert!(!f.has_install_dir());
        assert!(f.find_redist_directories(ProcessorIsa::X86_64, BuildType::Release).is_empty());
    }
}
