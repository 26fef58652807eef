//! Lab Shell
//!
//! Usage:
//!   labsh        Interactive shell
//!   labsh -v     Print version

use std::env;
use std::process;

use anyhow::Result;
use colored::Colorize;
use tracing::info;

use lab_shell::cli::{self, CliAction};
use lab_shell::shell::input::ReadlineInput;
use lab_shell::{Shell, ShellError};

fn init_logging() {
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    match cli::parse_args(&args) {
        CliAction::Run => {}
        CliAction::Version => {
            println!("Shell version {}", cli::version_string());
            return Ok(());
        }
        CliAction::Usage(program) => {
            eprintln!("{}", ShellError::Usage(program));
            process::exit(1);
        }
    }

    init_logging();
    info!("starting labsh v{}", env!("CARGO_PKG_VERSION"));

    let mut shell = match Shell::init() {
        Ok(shell) => shell,
        Err(e) => {
            eprintln!("{}: {}", "error".red(), e);
            process::exit(1);
        }
    };

    let mut input = ReadlineInput::new()?;
    if let Err(e) = shell.run(&mut input) {
        eprintln!("{}: {}", "error".red(), e);
    }

    shell.destroy();
    Ok(())
}
