//! # ccd CLI Entry Point
//!
//! Parses CLI arguments using clap and routes commands to the handlers in the
//! `ccdrive` library. Tokens that are not a known command or flag are ignored
//! without output.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use ccdrive::build;
use ccdrive::commands;
use ccdrive::config;
use ccdrive::error::BuildError;

#[derive(Parser)]
#[command(name = "ccd")]
#[command(about = "Incremental C/C++ build driver", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
#[command(allow_external_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print host information (OS by default)
    #[command(visible_alias = "p")]
    Print {
        /// Print the operating system
        #[arg(long)]
        os: bool,
        /// Print the CPU architecture
        #[arg(long)]
        arch: bool,
        /// Print the OS family (unix, windows)
        #[arg(long)]
        family: bool,
        #[arg(hide = true, num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
        _ignored: Vec<String>,
    },
    /// Compile changed sources and link the program
    #[command(visible_alias = "c")]
    Compile {
        /// Ignore stored state and recompile every source
        #[arg(short = 'a', long = "all")]
        all: bool,
        /// Show invalidation decisions and command lines
        #[arg(short, long)]
        verbose: bool,
        /// Show what would be executed without running
        #[arg(long)]
        dry_run: bool,
        #[arg(hide = true, num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
        _ignored: Vec<String>,
    },
    /// Run the previously built program
    #[command(visible_alias = "r")]
    Run {
        /// Arguments passed to the program
        #[arg(num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
        args: Vec<String>,
    },
    /// List sources the next compile would rebuild
    #[command(visible_alias = "s")]
    Status,
    /// Remove objects, build state and the linked program
    Clean,
    /// Rebuild whenever a source or include directory changes
    Watch {
        /// Show invalidation decisions and command lines
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate shell completion scripts
    Completion { shell: Shell },
    #[command(external_subcommand)]
    External(Vec<String>),
}

fn project_config() -> Result<config::Config> {
    let root = std::env::current_dir().context("Could not determine current directory")?;
    Ok(config::load_config(&root)?)
}

fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        return Ok(());
    };

    match command {
        Commands::Print { os, arch, family, .. } => {
            commands::print::handle_print(&commands::print::PrintOp { os, arch, family });
            Ok(())
        }
        Commands::Compile {
            all,
            verbose,
            dry_run,
            ..
        } => {
            let options = build::CompileOptions {
                full_rebuild: all,
                verbose,
                dry_run,
            };
            build::compile_project(&project_config()?, &options)?;
            Ok(())
        }
        Commands::Run { args } => match build::run_program(&project_config()?, &args)? {
            Some(0) => Ok(()),
            Some(code) => std::process::exit(code),
            None => std::process::exit(1),
        },
        Commands::Status => commands::status::handle_status(&project_config()?),
        Commands::Clean => {
            build::clean(&project_config()?)?;
            Ok(())
        }
        Commands::Watch { verbose } => build::watch(&project_config()?, verbose),
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
            Ok(())
        }
        Commands::External(tokens) => {
            let name = tokens.into_iter().next().unwrap_or_default();
            Err(BuildError::UnknownCommand(name).into())
        }
    }
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                ErrorKind::UnknownArgument | ErrorKind::InvalidSubcommand
            ) =>
        {
            return Ok(());
        }
        Err(e) => e.exit(),
    };
    match execute(cli) {
        Err(e)
            if matches!(
                e.downcast_ref::<BuildError>(),
                Some(BuildError::UnknownCommand(_))
            ) =>
        {
            Ok(())
        }
        other => other,
    }
}
