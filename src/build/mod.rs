mod clean;
pub mod compiler;
mod core;
mod feedback;
pub mod includes;
pub mod invalidate;
mod run;
pub mod scan;
pub mod state;
mod watcher;

pub use clean::clean;
pub use core::{BuildReport, COMPILE_COMMANDS, CompileOptions, compile_project, status};
pub use feedback::FeedbackAnalyzer;
pub use run::run_program;
pub use watcher::watch;
