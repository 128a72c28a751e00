use super::scan::path_key;
use crate::config::Config;
use crate::error::BuildError;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Object file for `source`: its root-relative path flattened with `_`.
///
/// `src/gfx/mesh.cpp` becomes `<object_dir>/src_gfx_mesh.cpp.o`.
pub fn object_path(config: &Config, source: &Path) -> PathBuf {
    let relative = source.strip_prefix(&config.root).unwrap_or(source);
    let flat: String = path_key(relative)
        .trim_start_matches('/')
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            _ => c,
        })
        .collect();
    config.object_dir().join(format!("{}.o", flat))
}

/// Arguments after the compiler name for one translation unit.
pub fn compile_args(config: &Config, source: &Path, object: &Path) -> Vec<String> {
    let build = &config.build;
    let mut args = vec![
        "-o".to_string(),
        object.to_string_lossy().to_string(),
        "-c".to_string(),
        source.to_string_lossy().to_string(),
    ];
    args.extend(build.flags.iter().cloned());
    for dir in config.include_dirs() {
        args.push(format!("-I{}", dir.display()));
    }
    for define in &build.defines {
        args.push(format!("-D{}", define));
    }
    args
}

/// Every `.o` file in the object directory, sorted by name.
pub fn collect_objects(config: &Config) -> Result<Vec<PathBuf>, BuildError> {
    let obj_dir = config.object_dir();
    let mut objects = Vec::new();
    for entry in WalkDir::new(&obj_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| BuildError::io(&obj_dir, e.into()))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|ext| ext == "o") {
            objects.push(path.to_path_buf());
        }
    }
    Ok(objects)
}

/// Arguments after the compiler name for the final link.
pub fn link_args(config: &Config, objects: &[PathBuf]) -> Vec<String> {
    let build = &config.build;
    let mut args = vec![
        "-o".to_string(),
        config.program_path().to_string_lossy().to_string(),
    ];
    args.extend(objects.iter().map(|o| o.to_string_lossy().to_string()));
    args.extend(
        build
            .extra_objects
            .iter()
            .map(|o| config.resolve(o).to_string_lossy().to_string()),
    );
    for dir in &build.library_dirs {
        args.push(format!("-L{}", config.resolve(dir).display()));
    }
    for lib in &build.libs {
        args.push(format!("-l{}", lib));
    }
    args
}

/// Captured result of one external tool invocation.
#[derive(Debug)]
pub struct ToolOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stderr: String,
}

/// Run `program` with `args` in `cwd` and wait for it. No shell is involved.
pub fn run_tool(program: &str, args: &[String], cwd: &Path) -> Result<ToolOutput, BuildError> {
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|e| BuildError::Spawn {
            program: program.to_string(),
            source: e,
        })?;
    Ok(ToolOutput {
        success: output.status.success(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Command line as it would be typed, for display only.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        if arg.contains(' ') {
            line.push_str(&format!("\"{}\"", arg));
        } else {
            line.push_str(arg);
        }
    }
    line
}
