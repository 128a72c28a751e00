//! Command dispatch tests for the `ccd` binary.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn ccd() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ccd"))
}

#[test]
fn test_unknown_command_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    for args in [
        &["frobnicate", "--with", "stuff"][..],
        &["-x"][..],
        &["--frob", "c"][..],
    ] {
        let output = Command::new(ccd())
            .args(args)
            .current_dir(dir.path())
            .output()
            .expect("Failed to execute ccd");

        assert!(output.status.success(), "{:?} failed", args);
        assert!(output.stdout.is_empty(), "{:?} printed output", args);
        assert!(output.stderr.is_empty(), "{:?} printed errors", args);
    }
}

#[test]
fn test_unknown_flags_after_command_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(ccd())
        .args(["print", "--nope"])
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute ccd print");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        std::env::consts::OS
    );
    assert!(output.stderr.is_empty());
}

#[test]
fn test_no_arguments_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(ccd())
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute ccd");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_print_os_alias() {
    let dir = tempfile::tempdir().unwrap();
    for args in [&["print", "--os"][..], &["p", "--os"][..]] {
        let output = Command::new(ccd())
            .args(args)
            .current_dir(dir.path())
            .output()
            .expect("Failed to execute ccd print");

        assert!(output.status.success());
        assert_eq!(
            String::from_utf8_lossy(&output.stdout).trim(),
            std::env::consts::OS
        );
    }
}

#[test]
fn test_run_without_build_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(ccd())
        .args(["r", "--flag"])
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute ccd run");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ccd compile"));
}

#[test]
fn test_malformed_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ccd.toml"), "[build\n").unwrap();

    let output = Command::new(ccd())
        .arg("status")
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute ccd status");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ccd.toml"));
}

#[cfg(unix)]
#[test]
fn test_compile_alias_with_config_file_and_stray_flag() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::create_dir_all(dir.path().join("include")).unwrap();
    fs::write(dir.path().join("src").join("main.cpp"), "int main() {}\n").unwrap();
    fs::write(
        dir.path().join("ccd.toml"),
        "[package]\nname = \"app\"\n\n[build]\ncompiler = \"true\"\n",
    )
    .unwrap();

    let output = Command::new(ccd())
        .args(["c", "-a", "--bogus"])
        .current_dir(dir.path())
        .output()
        .expect("Failed to execute ccd compile");

    assert!(
        output.status.success(),
        "Compile failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("main.cpp compiled"));
    assert!(dir.path().join("modinfo.json").exists());
    assert!(dir.path().join("obj").is_dir());
}
