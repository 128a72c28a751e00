//! Source and header discovery.
//!
//! Only the top level of each configured directory is scanned. Files are kept
//! when their name ends with one of the accepted extensions, so `"c"` also
//! accepts `mesh.cc` and `abc`.

use crate::config::Config;
use crate::error::BuildError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files found in the configured source and include directories.
#[derive(Debug, Default, Clone)]
pub struct ProjectFiles {
    pub sources: Vec<PathBuf>,
    pub includes: Vec<PathBuf>,
}

/// Every regular file directly inside `dirs` whose name ends with one of
/// `extensions`.
///
/// A missing or unreadable directory is an error; nothing is salvaged.
pub fn scan_dirs(dirs: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>, BuildError> {
    let mut found = Vec::new();
    for dir in dirs {
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| BuildError::io(dir, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if has_extension(path, extensions) {
                found.push(path.to_path_buf());
            }
        }
    }
    Ok(found)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.file_name().is_some_and(|name| {
        let name = name.to_string_lossy();
        extensions.iter().any(|accepted| name.ends_with(accepted.as_str()))
    })
}

/// Scan sources (plus configured extra sources) and includes for a project.
pub fn scan_project(config: &Config) -> Result<ProjectFiles, BuildError> {
    let mut sources = scan_dirs(&config.source_dirs(), &config.build.source_extensions)?;
    sources.extend(config.build.extra_sources.iter().map(|s| config.resolve(s)));

    let includes = scan_dirs(&config.include_dirs(), &config.build.include_extensions)?;

    Ok(ProjectFiles { sources, includes })
}

/// String key a file is tracked under in the build state.
pub fn path_key(path: &Path) -> String {
    let key = path.to_string_lossy();
    if cfg!(windows) {
        key.replace('\\', "/")
    } else {
        key.into_owned()
    }
}
