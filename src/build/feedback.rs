use colored::*;

/// Turns raw compiler/linker stderr into a short hint for common mistakes.
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    pub fn analyze(output: &str) -> Option<String> {
        if output.contains("undefined reference to `main'")
            || output.contains("entry point must be defined")
            || output.contains("_main\", referenced from")
        {
            return Some(format!(
                "None of the compiled sources defines {}.\nCheck {} and {} in ccd.toml.",
                "main()".bold().yellow(),
                "source_dirs".bold().green(),
                "extra_sources".bold().green()
            ));
        }

        if output.contains("undefined reference to") || output.contains("Undefined symbols") {
            return Some(format!(
                "It looks like a {} error.\nA library may be missing from {} or {} in ccd.toml.",
                "Linker".bold().red(),
                "libs".bold().yellow(),
                "library_dirs".bold().yellow()
            ));
        }

        if output.contains("fatal error: ")
            && (output.contains("No such file or directory") || output.contains("file not found"))
        {
            return Some(format!(
                "It looks like a {} error.\nAdd the header's directory to {} in ccd.toml.",
                "Missing Header".bold().red(),
                "include_dirs".bold().yellow()
            ));
        }

        None
    }
}
