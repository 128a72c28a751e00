//! Print command handler
//!
//! Handles `ccd print` (alias `p`), which reports facts about the host.

/// Which host facts to print
#[derive(Clone, Debug, Default)]
pub struct PrintOp {
    pub os: bool,
    pub arch: bool,
    pub family: bool,
}

/// Lines `ccd print` writes for `op`. With no flag set the OS is printed.
pub fn host_info(op: &PrintOp) -> Vec<String> {
    let mut lines = Vec::new();
    if op.os || !(op.arch || op.family) {
        lines.push(std::env::consts::OS.to_string());
    }
    if op.family {
        lines.push(std::env::consts::FAMILY.to_string());
    }
    if op.arch {
        lines.push(std::env::consts::ARCH.to_string());
    }
    lines
}

/// Handle the `ccd print` command
pub fn handle_print(op: &PrintOp) {
    for line in host_info(op) {
        println!("{}", line);
    }
}
