//! End-to-end tests for the incremental compile driver.
//!
//! The `true` and `false` utilities (or a small shell script that records its
//! arguments) stand in for the compiler and linker, so these tests only
//! exercise invalidation, state handling and the driver's reaction to tool
//! results.
#![cfg(unix)]

use ccdrive::build::{self, BuildReport, CompileOptions};
use ccdrive::build::compiler::object_path;
use ccdrive::build::state::StateStore;
use ccdrive::config::Config;
use ccdrive::error::{BuildError, ErrorKind};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, UNIX_EPOCH};
use tempfile::TempDir;

const T0: u64 = 1_700_000_000;

fn set_mtime(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    set_mtime(&path, T0);
}

/// sources {a.c, b.c}, includes {x.h, y.h}; a.c -> x.h -> y.h
fn scenario_project() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "src/a.c", "#include \"x.h\"\nint a(void) { return X; }\n");
    write(root, "src/b.c", "#include <stdio.h>\nint b(void) { return 0; }\n");
    write(root, "include/x.h", "#pragma once\n#include \"y.h\"\n#define X Y\n");
    write(root, "include/y.h", "#pragma once\n#define Y 1\n");

    let mut config = Config::with_root(root);
    config.build.compiler = "true".to_string();
    config.build.source_extensions = vec!["c".to_string()];
    config.build.include_extensions = vec!["h".to_string()];
    (dir, config)
}

fn compile(config: &Config) -> Result<BuildReport, BuildError> {
    build::compile_project(config, &CompileOptions::default())
}

fn names(keys: &[String]) -> Vec<String> {
    keys.iter()
        .map(|k| Path::new(k).file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

#[test]
fn test_scenario_first_second_third_run() {
    let (dir, config) = scenario_project();

    let first = compile(&config).unwrap();
    assert_eq!(names(&first.compiled), vec!["a.c", "b.c"]);
    assert!(first.linked);

    let state = StateStore::new(config.state_path()).try_load().unwrap();
    assert_eq!(state.sources.len(), 2);
    assert_eq!(state.includes.len(), 2);
    let x_key = dir.path().join("include/x.h").to_string_lossy().to_string();
    assert_eq!(state.includes[&x_key].includes, vec!["y.h"]);

    let second = compile(&config).unwrap();
    assert!(second.compiled.is_empty());
    assert!(second.modified_includes.is_empty());

    set_mtime(&dir.path().join("include/y.h"), T0 + 10);
    let third = compile(&config).unwrap();
    assert_eq!(names(&third.compiled), vec!["a.c"]);
    assert_eq!(names(&third.modified_includes), vec!["y.h", "x.h"]);
}

#[test]
fn test_unreferenced_header_invalidates_only_itself() {
    let (dir, config) = scenario_project();
    write(dir.path(), "include/z.h", "#define Z 3\n");
    compile(&config).unwrap();

    set_mtime(&dir.path().join("include/z.h"), T0 + 5);
    let report = compile(&config).unwrap();
    assert!(report.compiled.is_empty());
    assert_eq!(names(&report.modified_includes), vec!["z.h"]);
}

#[test]
fn test_modified_source_recompiled_alone() {
    let (dir, config) = scenario_project();
    compile(&config).unwrap();

    set_mtime(&dir.path().join("src/b.c"), T0 + 1);
    let report = compile(&config).unwrap();
    assert_eq!(names(&report.compiled), vec!["b.c"]);
}

#[test]
fn test_suffix_match_spans_directories() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "src/a.c", "#include \"util.h\"\n");
    write(root, "lib/util.h", "");
    write(root, "other/util.h", "");

    let mut config = Config::with_root(root);
    config.build.compiler = "true".to_string();
    config.build.include_dirs = vec!["lib".to_string(), "other".to_string()];
    compile(&config).unwrap();

    set_mtime(&root.join("lib/util.h"), T0 + 1);
    assert_eq!(names(&compile(&config).unwrap().compiled), vec!["a.c"]);

    // Not the header a.c actually gets, but it shares the tail "util.h".
    set_mtime(&root.join("other/util.h"), T0 + 1);
    assert_eq!(names(&compile(&config).unwrap().compiled), vec!["a.c"]);
}

#[test]
fn test_full_rebuild_ignores_state() {
    let (_dir, config) = scenario_project();
    compile(&config).unwrap();
    fs::write(config.state_path(), "not json").unwrap();

    let options = CompileOptions {
        full_rebuild: true,
        ..Default::default()
    };
    let report = build::compile_project(&config, &options).unwrap();
    assert_eq!(names(&report.compiled), vec!["a.c", "b.c"]);
    assert!(StateStore::new(config.state_path()).try_load().is_ok());
}

#[test]
fn test_full_rebuild_without_state_file() {
    let (_dir, config) = scenario_project();
    let options = CompileOptions {
        full_rebuild: true,
        ..Default::default()
    };
    let report = build::compile_project(&config, &options).unwrap();
    assert_eq!(report.compiled.len(), 2);
}

#[test]
fn test_corrupt_state_rebuilds_everything() {
    let (_dir, config) = scenario_project();
    compile(&config).unwrap();

    fs::write(config.state_path(), "{\"src\": {").unwrap();
    let report = compile(&config).unwrap();
    assert_eq!(names(&report.compiled), vec!["a.c", "b.c"]);

    let state = StateStore::new(config.state_path()).try_load().unwrap();
    assert_eq!(state.sources.len(), 2);
    assert!(compile(&config).unwrap().compiled.is_empty());
}

#[test]
fn test_deleted_state_rebuilds_everything() {
    let (_dir, config) = scenario_project();
    compile(&config).unwrap();
    fs::remove_file(config.state_path()).unwrap();

    assert_eq!(compile(&config).unwrap().compiled.len(), 2);
}

#[test]
fn test_failed_compile_is_retried() {
    let (dir, mut config) = scenario_project();
    compile(&config).unwrap();

    set_mtime(&dir.path().join("include/x.h"), T0 + 1);
    config.build.compiler = "false".to_string();
    let err = compile(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExternalProcess);
    match err {
        BuildError::CompileFailed { sources } => assert_eq!(names(&sources), vec!["a.c"]),
        other => panic!("unexpected error: {other}"),
    }

    // x.h is now recorded as seen, but a.c must still be rebuilt.
    config.build.compiler = "true".to_string();
    let report = compile(&config).unwrap();
    assert_eq!(names(&report.compiled), vec!["a.c"]);
    assert!(compile(&config).unwrap().compiled.is_empty());
}

#[test]
fn test_link_failure_is_reported() {
    let (_dir, mut config) = scenario_project();
    compile(&config).unwrap();

    config.build.compiler = "false".to_string();
    let err = compile(&config).unwrap_err();
    assert!(matches!(err, BuildError::ProcessFailed { code: Some(1), .. }));
}

/// Install a stand-in compiler that appends its arguments to `log` and
/// creates the object file of each `-o <obj> -c <src>` call.
fn recording_compiler(dir: &Path, log: &Path) -> PathBuf {
    let script = dir.join("cc.sh");
    let body = format!(
        "#!/bin/sh\necho \"$@\" >> '{}'\nif [ \"$3\" = \"-c\" ]; then : > \"$2\"; fi\n",
        log.display()
    );
    fs::write(&script, body).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    // Another test thread may fork while the write handle is still open.
    for _ in 0..100 {
        match Command::new(&script).status() {
            Err(e) if e.raw_os_error() == Some(26) => {
                std::thread::sleep(Duration::from_millis(10))
            }
            other => {
                other.unwrap();
                break;
            }
        }
    }
    let _ = fs::remove_file(log);
    script
}

#[test]
fn test_link_uses_every_object_in_object_dir() {
    let (dir, mut config) = scenario_project();
    let tools = tempfile::tempdir().unwrap();
    let log = tools.path().join("calls.log");
    config.build.compiler = recording_compiler(tools.path(), &log)
        .to_string_lossy()
        .to_string();
    let a = dir.path().join("src/a.c");
    let b = dir.path().join("src/b.c");
    compile(&config).unwrap();
    fs::remove_file(&log).unwrap();

    set_mtime(&a, T0 + 1);
    let report = compile(&config).unwrap();
    assert_eq!(names(&report.compiled), vec!["a.c"]);
    assert!(report.linked);

    let calls = fs::read_to_string(&log).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls.len(), 2, "one compile and one link: {:?}", calls);
    assert!(calls[0].contains(&format!("-c {}", a.display())));

    let link = calls[1];
    assert!(link.starts_with(&format!("-o {}", config.program_path().display())));
    for obj in [object_path(&config, &a), object_path(&config, &b)] {
        assert!(
            link.contains(&obj.to_string_lossy().to_string()),
            "link line {:?} misses {}",
            link,
            obj.display()
        );
    }
}

#[test]
fn test_dry_run_changes_nothing() {
    let (_dir, config) = scenario_project();
    let options = CompileOptions {
        dry_run: true,
        ..Default::default()
    };
    let report = build::compile_project(&config, &options).unwrap();
    assert_eq!(report.selected.len(), 2);
    assert!(report.compiled.is_empty());
    assert!(!config.state_path().exists());
    assert!(!config.object_dir().exists());
}

#[test]
fn test_status_matches_next_compile() {
    let (dir, config) = scenario_project();
    compile(&config).unwrap();
    set_mtime(&dir.path().join("include/x.h"), T0 + 3);

    let stale = build::status(&config).unwrap();
    let keys: Vec<String> = stale.iter().map(|s| s.key.clone()).collect();
    assert_eq!(names(&keys), vec!["a.c"]);

    assert_eq!(names(&compile(&config).unwrap().compiled), vec!["a.c"]);
}

#[test]
fn test_deleted_source_record_is_pruned() {
    let (dir, config) = scenario_project();
    compile(&config).unwrap();

    fs::remove_file(dir.path().join("src/b.c")).unwrap();
    compile(&config).unwrap();

    let state = StateStore::new(config.state_path()).try_load().unwrap();
    assert_eq!(state.sources.len(), 1);
}

#[test]
fn test_missing_source_dir_is_fatal() {
    let (dir, config) = scenario_project();
    fs::remove_dir_all(dir.path().join("src")).unwrap();

    let err = compile(&config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Filesystem);
}

#[test]
fn test_compile_commands_written_for_all_sources() {
    let (dir, config) = scenario_project();
    compile(&config).unwrap();

    let db = fs::read_to_string(dir.path().join(build::COMPILE_COMMANDS)).unwrap();
    let entries: serde_json::Value = serde_json::from_str(&db).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 2);
    assert_eq!(entries[0]["arguments"][0], "true");
}
