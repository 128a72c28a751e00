//! Error type shared by every build component.
//!
//! Each [`BuildError`] belongs to exactly one [`ErrorKind`], so callers can
//! branch on the category without matching every variant.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Broad category of a [`BuildError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Persisted state was missing or unparsable. Recovered by the state store.
    StateCorruption,
    /// A directory or file could not be read or written.
    Filesystem,
    /// The compiler or linker could not be spawned or reported failure.
    ExternalProcess,
    /// Bad command or configuration.
    Usage,
}

/// Error type for build operations
#[derive(Debug)]
pub enum BuildError {
    /// State file missing or malformed
    CorruptState { path: PathBuf, reason: String },
    /// IO error on a specific path
    Io { path: PathBuf, source: io::Error },
    /// Could not parse the configuration file
    Config { path: PathBuf, reason: String },
    /// External program could not be started
    Spawn { program: String, source: io::Error },
    /// External program exited unsuccessfully
    ProcessFailed {
        program: String,
        target: String,
        code: Option<i32>,
    },
    /// One or more sources failed to compile
    CompileFailed { sources: Vec<String> },
    /// Leading command token was not recognized
    UnknownCommand(String),
}

impl BuildError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        BuildError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::CorruptState { .. } => ErrorKind::StateCorruption,
            BuildError::Io { .. } => ErrorKind::Filesystem,
            BuildError::Spawn { .. }
            | BuildError::ProcessFailed { .. }
            | BuildError::CompileFailed { .. } => ErrorKind::ExternalProcess,
            BuildError::Config { .. } | BuildError::UnknownCommand(_) => ErrorKind::Usage,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::CorruptState { path, reason } => {
                write!(f, "Build state {} is unusable: {}", path.display(), reason)
            }
            BuildError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            BuildError::Config { path, reason } => {
                write!(f, "Failed to parse {}: {}", path.display(), reason)
            }
            BuildError::Spawn { program, source } => {
                write!(f, "Failed to execute '{}': {}", program, source)
            }
            BuildError::ProcessFailed {
                program,
                target,
                code,
            } => match code {
                Some(code) => write!(f, "'{}' failed on {} (exit code {})", program, target, code),
                None => write!(f, "'{}' was terminated while processing {}", program, target),
            },
            BuildError::CompileFailed { sources } => {
                write!(f, "{} source file(s) failed to compile", sources.len())
            }
            BuildError::UnknownCommand(cmd) => write!(f, "Unknown command: {}", cmd),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Io { source, .. } | BuildError::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}
