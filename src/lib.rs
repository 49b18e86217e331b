//! Resolves and stages the transitive shared-library dependencies of a native
//! compiled binary.
//!
//! Given a target executable or shared library, this crate discovers every
//! library it transitively depends on, locates each one on disk following
//! platform-specific dynamic-linker rules (Linux RPATH/RUNPATH, Windows DLL
//! search order), filters out libraries that belong to the OS baseline, and can
//! stage the result into a relocatable destination directory.
//!
//! # Quick start
//!
//! ```no_run
//! use bindeploy::config::DeployConfig;
//! use bindeploy::sinks::MessageSinks;
//!
//! let target = std::path::Path::new("path/to/some/executable");
//! let config = DeployConfig::default();
//! let sinks = MessageSinks::default();
//! let result = bindeploy::driver::find_dependencies(target, &config, &sinks).unwrap();
//! assert!(result.is_solved || !result.is_solved);
//! ```

pub mod common;
pub mod compiler;
pub mod config;
pub mod driver;
pub mod exclude;
pub mod finder;
pub mod graph;
pub mod platform;
pub mod qt;
pub mod reader;
pub mod result;
pub mod rpath;
pub mod searchpath;
pub mod sinks;
pub mod stager;
