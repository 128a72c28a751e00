//! Decides which sources need recompiling.
//!
//! A file is *directly modified* when it has no stored record or its mtime
//! differs from the stored one. Modification then spreads through the
//! include-suffix relation: a recorded include string `r` refers to a tracked
//! path `p` whenever `p` ends with `r`. This is a plain string comparison, so
//! `"util.h"` refers to both `lib/util.h` and `other/util.h`.
//!
//! ## Passes
//!
//! 1. Classify every include file as modified or unmodified, re-parsing the
//!    modified ones so their records hold post-change include lists.
//! 2. Promote unmodified includes that refer to a modified one, until a full
//!    pass promotes nothing.
//! 3. Select sources that are directly modified or refer to any modified
//!    include.

use super::includes;
use super::scan::{ProjectFiles, path_key};
use super::state::{BuildState, FileRecord, modified_time};
use crate::error::BuildError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Why a source was selected for recompilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Never compiled before
    New,
    /// Timestamp differs from the stored record
    Modified,
    /// Includes (possibly transitively) the given modified header
    HeaderChanged(String),
    /// Every source is rebuilt on request
    FullRebuild,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::New => write!(f, "new"),
            Reason::Modified => write!(f, "modified"),
            Reason::HeaderChanged(header) => write!(f, "header changed: {}", header),
            Reason::FullRebuild => write!(f, "full rebuild"),
        }
    }
}

/// A source selected for recompilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleSource {
    pub path: PathBuf,
    pub key: String,
    /// Mtime observed during selection; stored once the compile succeeds.
    pub modified: u64,
    pub reason: Reason,
}

/// Partition of the discovered include files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IncludeSets {
    pub modified: Vec<String>,
    pub unmodified: Vec<String>,
}

/// Result of one invalidation run.
#[derive(Debug, Default, Clone)]
pub struct Invalidation {
    pub includes: IncludeSets,
    pub sources: Vec<StaleSource>,
}

/// First path in `paths` that ends with one of the include strings in `refs`.
pub fn find_reference<'a>(refs: &[String], paths: &'a [String]) -> Option<&'a str> {
    refs.iter().find_map(|r| {
        paths
            .iter()
            .find(|p| p.ends_with(r.as_str()))
            .map(String::as_str)
    })
}

/// Pass 1: compare every include file with its stored record.
///
/// Modified includes get a fresh record; unmodified ones keep theirs.
pub fn classify_includes(
    files: &[PathBuf],
    records: &mut BTreeMap<String, FileRecord>,
) -> Result<IncludeSets, BuildError> {
    let mut sets = IncludeSets::default();
    for path in files {
        let key = path_key(path);
        let mtime = modified_time(path)?;
        let unchanged = records.get(&key).is_some_and(|r| r.modified == mtime);
        if unchanged {
            sets.unmodified.push(key);
        } else {
            let record = FileRecord {
                includes: includes::parse_file(path)?,
                modified: mtime,
            };
            records.insert(key.clone(), record);
            sets.modified.push(key);
        }
    }
    Ok(sets)
}

/// Pass 2: move unmodified includes referring to a modified include into the
/// modified set until nothing changes. Returns the number of promotions.
pub fn propagate(sets: &mut IncludeSets, records: &BTreeMap<String, FileRecord>) -> usize {
    let mut promoted_total = 0;
    loop {
        let (promoted, remaining): (Vec<String>, Vec<String>) =
            sets.unmodified.drain(..).partition(|key| {
                records
                    .get(key)
                    .is_some_and(|r| find_reference(&r.includes, &sets.modified).is_some())
            });
        sets.unmodified = remaining;
        if promoted.is_empty() {
            return promoted_total;
        }
        promoted_total += promoted.len();
        sets.modified.extend(promoted);
    }
}

/// Pass 3: pick the sources that need recompiling.
pub fn select_sources(
    files: &[PathBuf],
    records: &BTreeMap<String, FileRecord>,
    modified_includes: &[String],
    full_rebuild: bool,
) -> Result<Vec<StaleSource>, BuildError> {
    let mut stale = Vec::new();
    for path in files {
        let key = path_key(path);
        let mtime = modified_time(path)?;
        let reason = if full_rebuild {
            Some(Reason::FullRebuild)
        } else {
            match records.get(&key) {
                None => Some(Reason::New),
                Some(r) if r.modified != mtime => Some(Reason::Modified),
                Some(r) => find_reference(&r.includes, modified_includes)
                    .map(|header| Reason::HeaderChanged(header.to_string())),
            }
        };
        if let Some(reason) = reason {
            stale.push(StaleSource {
                path: path.clone(),
                key,
                modified: mtime,
                reason,
            });
        }
    }
    Ok(stale)
}

/// Run all passes over `files`, refreshing include records in `state`.
///
/// Source records are left alone; they are only replaced after a source
/// compiles successfully.
pub fn invalidate(
    files: &ProjectFiles,
    state: &mut BuildState,
    full_rebuild: bool,
) -> Result<Invalidation, BuildError> {
    let mut sets = classify_includes(&files.includes, &mut state.includes)?;
    propagate(&mut sets, &state.includes);
    let sources = select_sources(&files.sources, &state.sources, &sets.modified, full_rebuild)?;
    Ok(Invalidation {
        includes: sets,
        sources,
    })
}
