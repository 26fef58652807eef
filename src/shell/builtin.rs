//! Built-in commands
//!
//! These run inside the shell process because they act on the shell itself:
//! - `exit` tears the session down and ends the process
//! - `cd` changes the shell's working directory
//! - `history` lists the lines recorded so far

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing::debug;

use super::input::HistorySource;
use super::Shell;
use crate::error::{ShellError, ShellResult};

/// All builtin command names
pub const BUILTINS: &[&str] = &["exit", "cd", "history"];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Try to execute a builtin command
/// Returns Some(exit_code) if it was a builtin, None if not
pub fn try_builtin<H: HistorySource + ?Sized>(
    shell: &mut Shell,
    argv: &[String],
    history: &H,
) -> Option<i32> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_builtin_io(shell, argv, history, &mut stdout.lock(), &mut stderr.lock())
}

/// Run a builtin with explicit output streams.
pub fn run_builtin_io<H: HistorySource + ?Sized>(
    shell: &mut Shell,
    argv: &[String],
    history: &H,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Option<i32> {
    let name = argv.first()?;
    let args = &argv[1..];

    let code = match name.as_str() {
        "exit" => builtin_exit(shell),
        "cd" => builtin_cd_impl(args, stderr),
        "history" => builtin_history_impl(history, stdout, stderr),
        _ => {
            debug!(command = %name, "not a builtin");
            return None;
        }
    };
    debug!(command = %name, code, "builtin finished");
    Some(code)
}

/// exit - restore the terminal, release session resources, terminate with success
fn builtin_exit(shell: &mut Shell) -> ! {
    shell.destroy();
    std::process::exit(0)
}

/// Directory `cd` goes to when given no argument.
///
/// `HOME` when set and non-empty, otherwise the home directory in the user's
/// account record.
pub fn home_dir() -> ShellResult<PathBuf> {
    dirs::home_dir().ok_or(ShellError::NoHome)
}

/// Change the process working directory; extra arguments are ignored.
pub fn change_dir(args: &[String]) -> ShellResult<PathBuf> {
    let target = match args.first() {
        Some(dir) => PathBuf::from(dir),
        None => home_dir()?,
    };

    env::set_current_dir(&target).map_err(|source| ShellError::Directory {
        path: target.clone(),
        source,
    })?;
    Ok(target)
}

/// cd - change directory
fn builtin_cd_impl(args: &[String], err: &mut dyn Write) -> i32 {
    match change_dir(args) {
        Ok(target) => {
            debug!(dir = %target.display(), "changed directory");
            0
        }
        Err(e) => {
            let _ = writeln!(err, "{}", e);
            1
        }
    }
}

/// history - show recorded lines, oldest first
fn builtin_history_impl<H: HistorySource + ?Sized>(
    history: &H,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> i32 {
    let result = history
        .history_entries()
        .iter()
        .try_for_each(|line| writeln!(out, "{}", line));
    match result {
        Ok(()) => 0,
        Err(e) => {
            let _ = writeln!(err, "history: {}", e);
            1
        }
    }
}
