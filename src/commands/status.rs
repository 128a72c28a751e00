//! Status command handler
//!
//! Handles `ccd status` (alias `s`): lists the sources the next `compile`
//! would rebuild, without compiling or touching the build state.

use crate::build;
use crate::build::invalidate::Reason;
use crate::config::Config;
use anyhow::Result;
use colored::*;

fn describe(reason: &Reason) -> ColoredString {
    match reason {
        Reason::New => "new".green(),
        Reason::Modified => "modified".yellow(),
        Reason::HeaderChanged(_) => reason.to_string().cyan(),
        Reason::FullRebuild => "full rebuild".magenta(),
    }
}

/// Handle the `ccd status` command
pub fn handle_status(config: &Config) -> Result<()> {
    let stale = build::status(config)?;
    if stale.is_empty() {
        println!("{} Up to date", "⚡".green());
        return Ok(());
    }

    println!("{} {} source(s) need compiling:", "ℹ".blue(), stale.len());
    let width = stale.iter().map(|s| s.key.len()).max().unwrap_or(0);
    for source in &stale {
        println!(
            "   {:<width$}  {}",
            source.key,
            describe(&source.reason),
            width = width
        );
    }
    Ok(())
}
