//! Persisted per-file build state (`modinfo.json`).
//!
//! ```json
//! {
//!     "inc": { "/proj/include/x.h": { "ifl": ["y.h"], "mt": 1700000000000000000 } },
//!     "src": { "/proj/src/a.c": { "ifl": ["x.h"], "mt": 1700000000000000000 } }
//! }
//! ```

use crate::error::BuildError;
use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Last observed state of one tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Quoted include strings as written in the file
    #[serde(rename = "ifl")]
    pub includes: Vec<String>,
    /// Modification time, nanoseconds since the Unix epoch
    #[serde(rename = "mt")]
    pub modified: u64,
}

// Field order is serialization order; kept alphabetical by JSON key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildState {
    #[serde(rename = "inc", default)]
    pub includes: BTreeMap<String, FileRecord>,
    #[serde(rename = "src", default)]
    pub sources: BTreeMap<String, FileRecord>,
}

impl BuildState {
    /// Drop records of files that no longer exist on disk.
    pub fn prune_missing(&mut self) -> usize {
        let before = self.sources.len() + self.includes.len();
        self.sources.retain(|path, _| Path::new(path).exists());
        self.includes.retain(|path, _| Path::new(path).exists());
        before - (self.sources.len() + self.includes.len())
    }
}

/// Filesystem-reported modification time of `path` in nanoseconds.
pub fn modified_time(path: &Path) -> Result<u64, BuildError> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| BuildError::io(path, e))?;
    // Times before the epoch collapse to zero; they still compare consistently.
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0))
}

/// Loads and saves [`BuildState`] at a fixed location.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state file, reporting why it is unusable.
    pub fn try_load(&self) -> Result<BuildState, BuildError> {
        let content = fs::read_to_string(&self.path).map_err(|e| BuildError::CorruptState {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| BuildError::CorruptState {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Read the state file. A missing or malformed file is replaced by an
    /// empty state, which is also written back.
    pub fn load(&self) -> BuildState {
        match self.try_load() {
            Ok(state) => state,
            Err(e) => {
                let name = self
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                println!("{} Created '{}' ({})", "!".yellow(), name, e);
                let state = BuildState::default();
                if let Err(e) = self.save(&state) {
                    println!("{} Could not write fresh build state: {}", "!".yellow(), e);
                }
                state
            }
        }
    }

    /// Overwrite the state file. The new content is written to a sibling
    /// temporary file first and renamed into place.
    pub fn save(&self, state: &BuildState) -> Result<(), BuildError> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        state
            .serialize(&mut ser)
            .map_err(|e| BuildError::io(&self.path, e.into()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &buf).map_err(|e| BuildError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| BuildError::io(&self.path, e))
    }
}
