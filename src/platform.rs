//! `Platform`: the OS/ISA pair that drives case sensitivity and search rules.

use std::fmt;

use crate::common::LookupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Linux,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessorIsa {
    X86_32,
    X86_64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: OperatingSystem,
    pub isa: ProcessorIsa,
}

impl Platform {
    pub fn new(os: OperatingSystem, isa: ProcessorIsa) -> Self {
        Self { os, isa }
    }

    /// The platform of the host this code is compiled for.
    pub fn native() -> Self {
        let os = if cfg!(windows) {
            OperatingSystem::Windows
        } else {
            OperatingSystem::Linux
        };
        let isa = if cfg!(target_pointer_width = "64") {
            ProcessorIsa::X86_64
        } else {
            ProcessorIsa::X86_32
        };
        Self::new(os, isa)
    }

    /// The single choke-point for name comparison: case-sensitive on Linux,
    /// case-insensitive on Windows. Every place in the crate that needs to decide
    /// whether two library names denote the same file must go through this.
    pub fn names_equal(&self, a: &str, b: &str) -> bool {
        match self.os {
            OperatingSystem::Linux => a == b,
            OperatingSystem::Windows => a.eq_ignore_ascii_case(b),
        }
    }

    /// Case-folded form of a name suitable for use as a `HashMap` key, consistent
    /// with [`Platform::names_equal`].
    pub fn fold_name(&self, name: &str) -> String {
        match self.os {
            OperatingSystem::Linux => name.to_owned(),
            OperatingSystem::Windows => name.to_lowercase(),
        }
    }

    pub fn is_windows(&self) -> bool {
        self.os == OperatingSystem::Windows
    }

    pub fn is_linux(&self) -> bool {
        self.os == OperatingSystem::Linux
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let os = match self.os {
            OperatingSystem::Linux => "linux",
            OperatingSystem::Windows => "windows",
        };
        let isa = match self.isa {
            ProcessorIsa::X86_32 => "x86",
            ProcessorIsa::X86_64 => "x86_64",
        };
        write!(f, "{os}-{isa}")
    }
}

/// Used by readers when a binary's machine type cannot be mapped to a supported
/// [`Platform`].
pub fn unsupported(what: impl Into<String>) -> LookupError {
    LookupError::UnsupportedPlatform(what.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_names_equal_ignores_case() {
        let p = Platform::new(OperatingSystem::Windows, ProcessorIsa::X86_64);
        assert!(p.names_equal("LibA.dll", "liba.DLL"));
    }

    #[test]
    fn linux_names_equal_is_exact() {
        let p = Platform::new(OperatingSystem::Linux, ProcessorIsa::X86_64);
        assert!(!p.names_equal("LibA.so", "liba.so"));
        assert!(p.names_equal("liba.so", "liba.so"));
    }

    #[test]
    fn fold_name_consistent_with_names_equal() {
        let p = Platform::new(OperatingSystem::Windows, ProcessorIsa::X86_64);
        assert_eq!(p.fold_name("LibA.DLL"), p.fold_name("liba.dll"));
    }
}
