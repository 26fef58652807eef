//! Command launcher - runs non-builtin commands in the foreground

use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, warn};

use super::Shell;
use crate::error::{ShellError, ShellResult};

/// Status reported when a program cannot be started
pub const NOT_FOUND_STATUS: i32 = 127;

/// Run `argv[0]` with the remaining tokens as arguments and wait for it.
///
/// In an interactive session the child gets its own process group and the
/// terminal foreground; the shell takes the terminal back once the child exits.
pub fn execute(shell: &Shell, argv: &[String]) -> ShellResult<i32> {
    let Some((program, args)) = argv.split_first() else {
        return Ok(0);
    };

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    #[cfg(unix)]
    {
        if shell.is_interactive() {
            run_in_foreground_group(&mut cmd, shell.terminal().raw_fd());
        }
    }

    let mut child = cmd.spawn().map_err(|source| ShellError::Spawn {
        program: program.clone(),
        source,
    })?;
    debug!(program = %program, pid = child.id(), "spawned");

    #[cfg(unix)]
    {
        // Parent and child both hand the terminal to the child's group.
        if shell.is_interactive() {
            let pid = nix::unistd::Pid::from_raw(child.id() as i32);
            if let Err(e) = shell.terminal().give_foreground(pid) {
                debug!(error = %e, "terminal handover from parent failed");
            }
        }
    }

    let status = child.wait();
    if shell.is_interactive() {
        shell.reclaim_terminal();
    }
    let status = status?;

    let code = exit_code(status);
    if code != 0 {
        warn!(program = %program, code, "command exited with failure");
    } else {
        debug!(program = %program, "command finished");
    }
    Ok(code)
}

#[cfg(unix)]
fn run_in_foreground_group(cmd: &mut Command, terminal: std::os::fd::RawFd) {
    use std::os::unix::process::CommandExt;

    cmd.process_group(0);
    // SAFETY: the hook only issues async-signal-safe syscalls (tcsetpgrp, signal).
    unsafe {
        cmd.pre_exec(move || super::jobctl::prepare_foreground_child(terminal));
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .unwrap_or_else(|| 128 + status.signal().unwrap_or(0))
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}
