//! `ExecutableFileReader`: opens a binary and reports its platform, direct
//! dependency names, and RPATH/RUNPATH.
//!
//! `goblin` parses both ELF and PE, with `pelite` as a fallback import-table
//! reader on the Windows side.

use std::path::{Path, PathBuf};

use crate::common::LookupError;
use crate::platform::{OperatingSystem, Platform, ProcessorIsa};
use crate::rpath::RPath;

/// What the graph needs out of one binary file.
pub struct BinaryInfo {
    pub platform: Platform,
    pub is_executable_or_shared_library: bool,
    pub needed_shared_libraries: Vec<String>,
    pub rpath: RPath,
}

pub trait ExecutableFileReader {
    fn read(&self, path: &Path) -> Result<BinaryInfo, LookupError>;
}

/// Reads both ELF and PE via `goblin`, falling back to `pelite` for PE files
/// goblin can't parse, with goblin tried first as a format-agnostic entry point.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoblinReader;

impl ExecutableFileReader for GoblinReader {
    fn read(&self, path: &Path) -> Result<BinaryInfo, LookupError> {
        let content = std::fs::read(path).map_err(|e| LookupError::CouldNotOpenFile { source: e })?;
        match goblin::Object::parse(&content) {
            Ok(goblin::Object::Elf(elf)) => Ok(read_elf(&elf)),
            Ok(goblin::Object::PE(pe)) => Ok(read_pe_goblin(&pe)),
            Ok(other) => Err(LookupError::UnsupportedPlatform(format!("{other:?}"))),
            Err(goblin_err) => read_pe_pelite(&content).map_err(|_| LookupError::GoblinError(goblin_err)),
        }
    }
}

fn read_elf(elf: &goblin::elf::Elf) -> BinaryInfo {
    let isa = match elf.header.e_machine {
        goblin::elf::header::EM_X86_64 => ProcessorIsa::X86_64,
        _ => ProcessorIsa::X86_32,
    };
    let platform = Platform::new(OperatingSystem::Linux, isa);

    let is_executable_or_shared_library = matches!(
        elf.header.e_type,
        goblin::elf::header::ET_EXEC | goblin::elf::header::ET_DYN
    );

    let needed_shared_libraries = elf.libraries.iter().map(|s| s.to_string()).collect();

    // RUNPATH takes precedence over RPATH per ld.so semantics; goblin exposes
    // both as separate lists already split on ':'.
    let rpath_entries: Vec<String> = if !elf.runpaths.is_empty() {
        elf.runpaths.iter().map(|s| s.to_string()).collect()
    } else {
        elf.rpaths.iter().map(|s| s.to_string()).collect()
    };
    let rpath = RPath::parse(&rpath_entries.join(":"));

    BinaryInfo {
        platform,
        is_executable_or_shared_library,
        needed_shared_libraries,
        rpath,
    }
}

fn read_pe_goblin(pe: &goblin::pe::PE) -> BinaryInfo {
    let isa = if pe.is_64 { ProcessorIsa::X86_64 } else { ProcessorIsa::X86_32 };
    let platform = Platform::new(OperatingSystem::Windows, isa);
    let needed_shared_libraries = pe.libraries.iter().map(|s| s.to_string()).collect();
    BinaryInfo {
        platform,
        is_executable_or_shared_library: true,
        needed_shared_libraries,
        // PE carries no RPATH concept; Windows resolution is purely search-path driven.
        rpath: RPath::empty(),
    }
}

fn read_pe_pelite(content: &[u8]) -> Result<BinaryInfo, LookupError> {
    use pelite::pe64::{Pe, PeFile};

    let file = PeFile::from_bytes(content).map_err(|e| LookupError::PEError(e))?;
    let imports = file.imports().map_err(|e| LookupError::PEError(e))?;
    let names: Vec<&pelite::util::CStr> = imports
        .iter()
        .map(|desc| desc.dll_name())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| LookupError::PEError(e))?;
    let needed_shared_libraries = names
        .iter()
        .filter_map(|s| s.to_str().ok())
        .map(str::to_owned)
        .collect();

    Ok(BinaryInfo {
        platform: Platform::new(OperatingSystem::Windows, ProcessorIsa::X86_64),
        is_executable_or_shared_library: true,
        needed_shared_libraries,
        rpath: RPath::empty(),
    })
}

/// Lightweight capability used by the finder to validate a candidate path before
/// accepting it, without doing a full dependency read.
pub trait IsExistingValidSharedLibrary {
    fn is_valid(&self, path: &Path) -> bool;
}

impl IsExistingValidSharedLibrary for GoblinReader {
    fn is_valid(&self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        let Ok(content) = std::fs::read(path) else {
            return false;
        };
        matches!(
            goblin::Object::parse(&content),
            Ok(goblin::Object::Elf(_)) | Ok(goblin::Object::PE(_))
        )
    }
}

/// Resolve the directory containing a binary, used when expanding its RPATH.
pub fn containing_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
}
