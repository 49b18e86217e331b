use std::ffi::OsStr;
use std::path::Path;
use thiserror::Error;

/// Top-level error type for the whole crate.
///
/// Per-dependency resolution failures are *not* represented here: a library that
/// cannot be found becomes a [`crate::result::DependencyStatus::NotFound`] entry in
/// the result, not an `Err`. This enum only carries conditions that abort a whole
/// target solve.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("unsupported platform for {0}")]
    UnsupportedPlatform(String),

    #[error("could not read binary file")]
    CouldNotOpenFile { source: std::io::Error },

    #[error("binary file could not be parsed")]
    UnreadableBinary { source: anyhow::Error },

    #[error("file system access error while scanning")]
    ScanError(String),

    #[error("qt.conf parse error")]
    ParseError(String),

    #[error("error trying to render a file path in readable form")]
    PathConversionError(String),

    #[error("lookup context building error")]
    ContextDeductionError(String),

    #[error(transparent)]
    VarError(#[from] std::env::VarError),
    #[error(transparent)]
    RegexError(#[from] regex::Error),
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error(transparent)]
    GoblinError(#[from] goblin::error::Error),
    #[error(transparent)]
    PEError(#[from] pelite::Error),
    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

/// Internal-only error raised while probing a single candidate dependency path.
///
/// Caught by [`crate::graph`] and translated into a `NotFound` status; never
/// surfaces to a caller of [`crate::driver`].
#[derive(Error, Debug)]
#[error("could not find the absolute path for {0}")]
pub struct FindDependencyError(pub String);

/// Remove the extended path prefix (`\\?\`) for readability.
pub fn decanonicalize(s: &str) -> String {
    s.replacen(r"\\?\", "", 1)
}

pub fn readable_canonical_path<P: AsRef<Path>>(p: P) -> Result<String, LookupError> {
    Ok(decanonicalize(
        std::fs::canonicalize(&p)?.to_str().ok_or_else(|| {
            LookupError::PathConversionError(format!(
                "can't compute canonic path for {:?}",
                p.as_ref()
            ))
        })?,
    ))
}

pub fn path_to_string<P: AsRef<Path>>(p: P) -> String {
    p.as_ref()
        .to_str()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("{:?}", p.as_ref()))
}

pub fn osstring_to_string(p: &OsStr) -> String {
    p.to_str()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("{:?}", p))
}
