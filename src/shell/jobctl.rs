//! Terminal ownership and job-control signal handling.
//!
//! On unix the shell takes the terminal's foreground process group at startup,
//! ignores the job-control signals meant for its foreground children and keeps a
//! copy of the terminal modes so they can be put back on exit. Other targets have
//! no equivalent primitives, so every operation there is a no-op and the session
//! behaves as if it were attached to a plain pipe.

#[cfg(unix)]
mod imp {
    use std::io::{self, IsTerminal};
    use std::os::fd::{AsFd, AsRawFd, BorrowedFd, OwnedFd, RawFd};

    use nix::sys::signal::{killpg, signal, SigHandler, Signal};
    use nix::sys::termios::{tcgetattr, tcsetattr, SetArg, Termios};
    use nix::unistd::{getpgrp, tcgetpgrp, tcsetpgrp, Pid};
    use tracing::debug;

    use crate::error::{ShellError, ShellResult};

    pub type ProcessGroup = Pid;
    pub type TerminalModes = Termios;

    /// Signals a foreground job should receive but the shell itself must survive.
    const JOB_SIGNALS: [Signal; 5] = [
        Signal::SIGINT,
        Signal::SIGQUIT,
        Signal::SIGTSTP,
        Signal::SIGTTIN,
        Signal::SIGTTOU,
    ];

    /// Upper bound on stop/continue rounds while waiting to be moved to the foreground.
    const MAX_FOREGROUND_ATTEMPTS: usize = 64;

    /// Handle on the controlling terminal (a private duplicate of the descriptor).
    #[derive(Debug)]
    pub struct Terminal {
        fd: OwnedFd,
    }

    impl Terminal {
        /// Duplicate standard input; the shell treats it as its controlling terminal.
        pub fn stdin() -> ShellResult<Self> {
            let fd = io::stdin().as_fd().try_clone_to_owned()?;
            Ok(Self { fd })
        }

        pub fn from_fd(fd: OwnedFd) -> Self {
            Self { fd }
        }

        pub fn raw_fd(&self) -> RawFd {
            self.fd.as_raw_fd()
        }

        pub fn is_interactive(&self) -> bool {
            self.fd.is_terminal()
        }

        /// Block until this process group owns the terminal.
        ///
        /// While the shell sits in a background group it stops itself with SIGTTIN;
        /// the job-control shell that launched it continues it once it is put in
        /// the foreground.
        pub fn acquire_foreground(&self) -> ShellResult<ProcessGroup> {
            for _ in 0..MAX_FOREGROUND_ATTEMPTS {
                let pgid = getpgrp();
                let owner = tcgetpgrp(&self.fd)?;
                if owner == pgid {
                    debug!(pgid = pgid.as_raw(), "terminal foreground acquired");
                    return Ok(pgid);
                }
                debug!(
                    pgid = pgid.as_raw(),
                    owner = owner.as_raw(),
                    "not in foreground, stopping until continued"
                );
                killpg(pgid, Signal::SIGTTIN)?;
            }
            Err(ShellError::NotForeground)
        }

        pub fn give_foreground(&self, pgid: ProcessGroup) -> ShellResult<()> {
            tcsetpgrp(&self.fd, pgid)?;
            Ok(())
        }

        pub fn capture_modes(&self) -> ShellResult<TerminalModes> {
            Ok(tcgetattr(&self.fd)?)
        }

        /// Apply `modes` immediately (TCSANOW).
        pub fn restore_modes(&self, modes: &TerminalModes) -> ShellResult<()> {
            tcsetattr(&self.fd, SetArg::TCSANOW, modes)?;
            Ok(())
        }
    }

    fn set_job_signals(handler: SigHandler) -> nix::Result<()> {
        for sig in JOB_SIGNALS {
            // SAFETY: only SIG_IGN / SIG_DFL are installed, no handler code runs.
            unsafe { signal(sig, handler) }?;
        }
        Ok(())
    }

    pub fn ignore_job_signals() -> ShellResult<()> {
        set_job_signals(SigHandler::SigIgn)?;
        debug!("job-control signals ignored");
        Ok(())
    }

    /// Runs in a freshly forked child, after it has moved into its own process
    /// group and before exec: claim the terminal and restore default dispositions.
    ///
    /// Only async-signal-safe calls are made here.
    pub fn prepare_foreground_child(terminal: RawFd) -> io::Result<()> {
        // SAFETY: `terminal` is the shell's duplicate of stdin, open for the
        // lifetime of the parent and inherited by this child until exec.
        let tty = unsafe { BorrowedFd::borrow_raw(terminal) };
        tcsetpgrp(tty, getpgrp())?;
        set_job_signals(SigHandler::SigDfl)?;
        Ok(())
    }
}

#[cfg(not(unix))]
mod imp {
    use std::io::{self, IsTerminal};

    use crate::error::ShellResult;

    pub type ProcessGroup = u32;
    pub type TerminalModes = ();

    #[derive(Debug)]
    pub struct Terminal;

    impl Terminal {
        pub fn stdin() -> ShellResult<Self> {
            Ok(Self)
        }

        pub fn is_interactive(&self) -> bool {
            io::stdin().is_terminal()
        }

        pub fn acquire_foreground(&self) -> ShellResult<ProcessGroup> {
            Ok(std::process::id())
        }

        pub fn give_foreground(&self, _pgid: ProcessGroup) -> ShellResult<()> {
            Ok(())
        }

        pub fn capture_modes(&self) -> ShellResult<TerminalModes> {
            Ok(())
        }

        pub fn restore_modes(&self, _modes: &TerminalModes) -> ShellResult<()> {
            Ok(())
        }
    }

    pub fn ignore_job_signals() -> ShellResult<()> {
        Ok(())
    }
}

pub use imp::*;
