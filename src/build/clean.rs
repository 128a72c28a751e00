//! Build artifact cleanup.
//!
//! `ccd clean` removes the object directory, the build state file, the
//! compilation database and the linked program. The next `compile` is then a
//! full build.

use super::core::COMPILE_COMMANDS;
use crate::config::Config;
use crate::error::BuildError;
use colored::*;
use std::fs;
use std::path::Path;

fn remove_file_if_exists(path: &Path) -> Result<bool, BuildError> {
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).map_err(|e| BuildError::io(path, e))?;
    Ok(true)
}

/// Returns whether anything was removed.
pub fn clean(config: &Config) -> Result<bool, BuildError> {
    let mut cleaned = false;

    let obj_dir = config.object_dir();
    if obj_dir.exists() {
        fs::remove_dir_all(&obj_dir).map_err(|e| BuildError::io(&obj_dir, e))?;
        cleaned = true;
    }

    cleaned |= remove_file_if_exists(&config.state_path())?;
    cleaned |= remove_file_if_exists(&config.root.join(COMPILE_COMMANDS))?;
    cleaned |= remove_file_if_exists(&config.program_path())?;

    if cleaned {
        println!("{} Clean complete.", "✓".green());
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(cleaned)
}
