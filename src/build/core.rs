use super::compiler::{
    collect_objects, compile_args, display_command, link_args, object_path, run_tool,
};
use super::feedback::FeedbackAnalyzer;
use super::includes;
use super::invalidate::{Invalidation, StaleSource, invalidate};
use super::scan::{ProjectFiles, scan_project};
use super::state::{BuildState, FileRecord, StateStore};
use crate::config::Config;
use crate::error::BuildError;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::fs;
use std::time::Instant;

pub const COMPILE_COMMANDS: &str = "compile_commands.json";

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Ignore stored state and recompile every source
    pub full_rebuild: bool,
    /// Print invalidation decisions and command lines
    pub verbose: bool,
    /// Show what would run without compiling, linking or saving state
    pub dry_run: bool,
}

/// What a compile run did.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Sources compiled this run, in compile order
    pub compiled: Vec<String>,
    /// Sources that were selected for compilation
    pub selected: Vec<StaleSource>,
    /// Include files found modified (directly or transitively)
    pub modified_includes: Vec<String>,
    pub linked: bool,
}

/// Discover files and load state the way a compile run would, without
/// writing anything. Used by `compile --dry-run` and `status`.
fn plan(config: &Config, full_rebuild: bool) -> Result<Invalidation, BuildError> {
    let files = scan_project(config)?;
    let mut state = if full_rebuild {
        BuildState::default()
    } else {
        StateStore::new(config.state_path())
            .try_load()
            .unwrap_or_default()
    };
    invalidate(&files, &mut state, full_rebuild)
}

/// Sources the next `compile` would rebuild, with reasons. Touches nothing.
pub fn status(config: &Config) -> Result<Vec<StaleSource>, BuildError> {
    Ok(plan(config, false)?.sources)
}

fn print_decisions(invalidation: &Invalidation) {
    for include in &invalidation.includes.modified {
        println!("   {} {}", "~".cyan(), include.dimmed());
    }
    for stale in &invalidation.sources {
        println!(
            "   {} {} ({})",
            "+".cyan(),
            stale.key,
            stale.reason.to_string().dimmed()
        );
    }
}

fn write_compile_commands(config: &Config, files: &ProjectFiles) -> Result<(), BuildError> {
    let directory = config.root.to_string_lossy().to_string();
    let entries: Vec<serde_json::Value> = files
        .sources
        .iter()
        .map(|src| {
            let mut arguments = vec![config.build.compiler.clone()];
            arguments.extend(compile_args(config, src, &object_path(config, src)));
            json!({
                "directory": directory,
                "arguments": arguments,
                "file": src.to_string_lossy()
            })
        })
        .collect();
    let path = config.root.join(COMPILE_COMMANDS);
    let json_str =
        serde_json::to_string_pretty(&entries).map_err(|e| BuildError::io(&path, e.into()))?;
    fs::write(&path, json_str).map_err(|e| BuildError::io(&path, e))
}

fn print_dry_run(config: &Config, invalidation: &Invalidation) -> Result<(), BuildError> {
    println!("{} DRY RUN: nothing will be compiled", "ℹ".blue());
    let compiler = &config.build.compiler;
    for stale in &invalidation.sources {
        let args = compile_args(config, &stale.path, &object_path(config, &stale.path));
        println!("   Would execute: {}", display_command(compiler, &args));
    }

    let mut objects = if config.object_dir().exists() {
        collect_objects(config)?
    } else {
        Vec::new()
    };
    for stale in &invalidation.sources {
        let obj = object_path(config, &stale.path);
        if !objects.contains(&obj) {
            objects.push(obj);
        }
    }
    objects.sort();
    println!(
        "   Would execute: {}",
        display_command(compiler, &link_args(config, &objects))
    );
    Ok(())
}

/// Compile every stale source, save state and link.
///
/// A source that fails to compile loses its stored record, so the next run
/// picks it up again. When any source fails the link step is skipped and
/// [`BuildError::CompileFailed`] is returned after state has been saved.
pub fn compile_project(config: &Config, options: &CompileOptions) -> Result<BuildReport, BuildError> {
    let start_time = Instant::now();

    if options.dry_run {
        let invalidation = plan(config, options.full_rebuild)?;
        if options.verbose {
            print_decisions(&invalidation);
        }
        print_dry_run(config, &invalidation)?;
        return Ok(BuildReport {
            modified_includes: invalidation.includes.modified,
            selected: invalidation.sources,
            ..Default::default()
        });
    }

    // 1. Discover and invalidate
    let files = scan_project(config)?;
    let store = StateStore::new(config.state_path());
    let mut state = if options.full_rebuild {
        BuildState::default()
    } else {
        store.load()
    };
    let invalidation = invalidate(&files, &mut state, options.full_rebuild)?;
    if options.verbose {
        print_decisions(&invalidation);
    }

    let mut report = BuildReport {
        modified_includes: invalidation.includes.modified.clone(),
        selected: invalidation.sources.clone(),
        ..Default::default()
    };

    if files.sources.is_empty() {
        println!("{} No source files found.", "!".yellow());
        state.prune_missing();
        store.save(&state)?;
        return Ok(report);
    }

    write_compile_commands(config, &files)?;

    // 2. Compile
    let obj_dir = config.object_dir();
    if !obj_dir.exists() {
        println!("{} Object directory wasn't found. Creating one.", "!".yellow());
        fs::create_dir_all(&obj_dir).map_err(|e| BuildError::io(&obj_dir, e))?;
    }

    let compiler = &config.build.compiler;
    let pb = ProgressBar::new(invalidation.sources.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }

    let mut failed = Vec::new();
    for stale in &invalidation.sources {
        let obj = object_path(config, &stale.path);
        let args = compile_args(config, &stale.path, &obj);
        pb.set_message(format!("Compiling {}", stale.key));
        if options.verbose {
            pb.suspend(|| println!("   {}", display_command(compiler, &args).dimmed()));
        }

        let output = run_tool(compiler, &args, &config.root)?;
        if output.success {
            let record = FileRecord {
                includes: includes::parse_file(&stale.path)?,
                modified: stale.modified,
            };
            state.sources.insert(stale.key.clone(), record);
            pb.suspend(|| {
                println!("{} compiled", stale.key);
                if !output.stderr.is_empty() {
                    println!(
                        "{} Warning in {}:\n{}",
                        "!".yellow(),
                        stale.key,
                        output.stderr
                    );
                }
            });
            report.compiled.push(stale.key.clone());
        } else {
            state.sources.remove(&stale.key);
            pb.suspend(|| {
                println!(
                    "{} Error compiling {}:\n{}",
                    "x".red(),
                    stale.key,
                    output.stderr
                );
                if let Some(hint) = FeedbackAnalyzer::analyze(&output.stderr) {
                    println!("{} {}", "💡".yellow(), hint);
                }
            });
            failed.push(stale.key.clone());
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    // 3. Persist state
    state.prune_missing();
    store.save(&state)?;

    if !failed.is_empty() {
        println!("{} {} file(s) failed to compile", "x".red(), failed.len());
        return Err(BuildError::CompileFailed { sources: failed });
    }

    // 4. Link everything in the object directory
    let objects = collect_objects(config)?;
    let args = link_args(config, &objects);
    println!("   {} Linking {} object(s)...", "🔗".cyan(), objects.len());
    if options.verbose {
        println!("   {}", display_command(compiler, &args).dimmed());
    }
    let output = run_tool(compiler, &args, &config.root)?;
    if !output.success {
        println!("{}", output.stderr);
        if let Some(hint) = FeedbackAnalyzer::analyze(&output.stderr) {
            println!("{} {}", "💡".yellow(), hint);
        }
        println!("{} Linking failed", "x".red());
        return Err(BuildError::ProcessFailed {
            program: compiler.clone(),
            target: config.program_path().to_string_lossy().to_string(),
            code: output.code,
        });
    }
    report.linked = true;

    println!(
        "{} Build finished in {:.2?} ({} compiled)",
        "✓".green(),
        start_time.elapsed(),
        report.compiled.len()
    );
    Ok(report)
}
