use crate::config::Config;
use crate::error::BuildError;
use colored::*;
use std::io;
use std::process::Command;

/// Run the previously linked program with `args`. Does not build.
///
/// Returns the program's exit code (`None` if it was killed by a signal).
pub fn run_program(config: &Config, args: &[String]) -> Result<Option<i32>, BuildError> {
    let program = config.program_path();
    if !program.exists() {
        return Err(BuildError::Spawn {
            program: program.to_string_lossy().to_string(),
            source: io::Error::new(
                io::ErrorKind::NotFound,
                "program has not been built yet, run 'ccd compile' first",
            ),
        });
    }

    println!("{} Running...\n", "▶".green());
    let status = Command::new(&program)
        .args(args)
        .current_dir(&config.root)
        .status()
        .map_err(|e| BuildError::Spawn {
            program: program.to_string_lossy().to_string(),
            source: e,
        })?;
    Ok(status.code())
}
