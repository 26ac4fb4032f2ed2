//! Docket CLI
//!
//! Usage:
//!   docket render <TEMPLATE> [-c CONTEXT] [--config FILE]
//!   docket vars <TEMPLATE>
//!   docket check <TEMPLATE>
//!
//! `TEMPLATE` may be `-` to read from stdin.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use docket::{extract_variable_names, lint, render_with_config, RenderConfig, RenderError};

#[derive(Parser)]
#[command(name = "docket")]
#[command(about = "Render and inspect document templates")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a template to stdout
    Render {
        /// Template file, or `-` for stdin
        template: PathBuf,

        /// Context file (JSON, or TOML with a .toml extension)
        #[arg(short, long)]
        context: Option<PathBuf>,

        /// Render limits (TOML format)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the variables a template references
    Vars {
        /// Template file, or `-` for stdin
        template: PathBuf,
    },

    /// Report authoring defects in a template
    Check {
        /// Template file, or `-` for stdin
        template: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Command) -> Result<ExitCode> {
    match command {
        Command::Render {
            template,
            context,
            config,
        } => {
            let source = read_template(&template)?;
            let context = match &context {
                Some(path) => docket::context::from_file(path)
                    .with_context(|| format!("loading context '{}'", path.display()))?,
                None => Value::Object(Default::default()),
            };
            let config = match &config {
                Some(path) => RenderConfig::from_file(path)
                    .with_context(|| format!("loading config '{}'", path.display()))?,
                None => RenderConfig::default(),
            };

            match render_with_config(&source, &context, &config) {
                Ok(output) => {
                    print!("{}", output);
                    Ok(ExitCode::SUCCESS)
                }
                Err(RenderError::Parse(errors)) => {
                    let name = display_name(&template);
                    for err in &errors {
                        eprint!("{}", err.format(&source, &name));
                    }
                    Ok(ExitCode::FAILURE)
                }
                Err(e) => Err(e.into()),
            }
        }
        Command::Vars { template } => {
            let source = read_template(&template)?;
            for name in extract_variable_names(&source) {
                println!("{}", name);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { template } => {
            let source = read_template(&template)?;
            let warnings = lint::check(&source);
            let name = display_name(&template);
            for warning in &warnings {
                eprint!("{}", warning.format(&source, &name));
            }
            if warnings.is_empty() {
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("{} warning(s)", warnings.len());
                Ok(ExitCode::FAILURE)
            }
        }
    }
}

fn read_template(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("reading template from stdin")?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).with_context(|| format!("reading template '{}'", path.display()))
    }
}

fn display_name(path: &Path) -> String {
    if path.as_os_str() == "-" {
        "<stdin>".to_string()
    } else {
        path.display().to_string()
    }
}
