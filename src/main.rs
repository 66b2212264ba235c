//! glint - command line front end for shader splicing and offline checking

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glint::commands;
use glint_config::Config;
use glint_program::NagaDriver;

#[derive(Parser)]
#[command(name = "glint")]
#[command(version)]
#[command(about = "GLSL shader include splicing and program checking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Splice an include file after the #version line of a shader
    Splice {
        /// Shader source file
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// File inserted after the #version line
        #[arg(short, long, value_name = "PATH")]
        include: Option<PathBuf>,

        /// Write the combined source here instead of stdout
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Build manifest programs with the offline validator
    Check {
        /// Manifest file (defaults to ./glint.toml, then ~/.glint/config.toml)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Programs to check (all when omitted)
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },

    /// List manifest programs
    List {
        /// Manifest file (defaults to ./glint.toml, then ~/.glint/config.toml)
        #[arg(short, long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Peek at the manifest for its log level before logging is up.
/// Errors surface again when the command loads it for real.
fn log_level(command: &Commands) -> String {
    let config = match command {
        Commands::Check { config, .. } | Commands::List { config } => {
            load_config(config.as_deref()).ok()
        }
        Commands::Splice { .. } => None,
    };
    config.map_or_else(|| "info".to_string(), |c| c.general.log_level)
}

fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Splice {
            path,
            include,
            output,
        } => {
            match output {
                Some(output) => {
                    let mut file = fs::File::create(&output)
                        .with_context(|| format!("Failed to create {}", output.display()))?;
                    commands::splice(&path, include.as_deref(), &mut file)?;
                    log::info!("Wrote {}", output.display());
                }
                None => {
                    let mut stdout = io::stdout().lock();
                    commands::splice(&path, include.as_deref(), &mut stdout)?;
                    stdout.flush()?;
                }
            }
            Ok(true)
        }

        Commands::Check { config, names } => {
            let config = load_config(config.as_deref())?;
            let mut driver = NagaDriver::new();
            let outcomes = commands::check(&mut driver, &config, &names);
            commands::report(&outcomes, &mut io::stdout().lock())
        }

        Commands::List { config } => {
            let config = load_config(config.as_deref())?;
            commands::list(&config, &mut io::stdout().lock())?;
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = log_level(&cli.command);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
