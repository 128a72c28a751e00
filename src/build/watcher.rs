use super::core::{CompileOptions, compile_project};
use crate::config::Config;
use anyhow::Result;
use colored::*;
use notify::{Config as NotifyConfig, RecursiveMode, Watcher};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Rebuild incrementally whenever a watched source or include directory changes.
pub fn watch(config: &Config, verbose: bool) -> Result<()> {
    let (tx, rx) = channel();
    let config_notify = NotifyConfig::default().with_poll_interval(Duration::from_secs(1));
    let mut watcher = notify::RecommendedWatcher::new(tx, config_notify)?;

    for dir in config.source_dirs().iter().chain(config.include_dirs().iter()) {
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        println!("{} Watching {}", "👀".cyan(), dir.display());
    }

    let options = CompileOptions {
        verbose,
        ..Default::default()
    };

    rebuild(config, &options);

    while rx.recv().is_ok() {
        // Debounce simple
        std::thread::sleep(Duration::from_millis(100));
        while rx.try_recv().is_ok() {}
        println!("{} File changed. Rebuilding...", "🔄".yellow());
        rebuild(config, &options);
    }
    Ok(())
}

fn rebuild(config: &Config, options: &CompileOptions) {
    if let Err(e) = compile_project(config, options) {
        println!("{} Error: {}", "x".red(), e);
    }
}
