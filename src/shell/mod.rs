//! Shell core module

pub mod builtin;
pub mod completer;
pub mod input;
pub mod jobctl;
pub mod launcher;
pub mod parser;

use std::env;

use tracing::{debug, info, warn};

use crate::error::{ShellError, ShellResult};
use input::{HistorySource, InputResult, LineReader};
use jobctl::{ProcessGroup, Terminal, TerminalModes};

/// Environment variable holding a custom prompt
pub const PROMPT_VAR: &str = "MY_PROMPT";

/// Prompt used when `MY_PROMPT` is unset
pub const DEFAULT_PROMPT: &str = "shell>";

/// Main shell state
///
/// Created once by [`Shell::init`] and torn down once by [`Shell::destroy`]
/// (dropping the session also tears it down).
#[derive(Debug)]
pub struct Shell {
    /// Controlling terminal (standard input)
    terminal: Terminal,
    /// Whether `terminal` is a terminal device
    interactive: bool,
    /// Process group that owns the terminal, set for interactive sessions
    pgid: Option<ProcessGroup>,
    /// Terminal modes captured at init, put back at destroy
    saved_modes: Option<TerminalModes>,
    /// Released (set to `None`) by destroy
    prompt: Option<String>,
}

impl Shell {
    /// Set up a session on standard input.
    pub fn init() -> ShellResult<Self> {
        Self::with_terminal(Terminal::stdin()?)
    }

    /// Set up a session on `terminal`.
    ///
    /// Interactive sessions wait for the terminal foreground, ignore the
    /// job-control signals and capture the current terminal modes.
    pub fn with_terminal(terminal: Terminal) -> ShellResult<Self> {
        let interactive = terminal.is_interactive();
        info!(interactive, "initializing shell session");

        let mut pgid = None;
        let mut saved_modes = None;
        if interactive {
            pgid = Some(terminal.acquire_foreground()?);
            jobctl::ignore_job_signals()?;
            saved_modes = Some(terminal.capture_modes()?);
            debug!("terminal modes captured");
        }

        let prompt = get_prompt(PROMPT_VAR)?;

        Ok(Self {
            terminal,
            interactive,
            pgid,
            saved_modes,
            prompt: Some(prompt),
        })
    }

    /// Session that is never attached to a terminal.
    #[cfg(unix)]
    pub fn detached() -> ShellResult<Self> {
        let null = std::fs::File::open("/dev/null")?;
        Self::with_terminal(Terminal::from_fd(null.into()))
    }

    #[cfg(not(unix))]
    pub fn detached() -> ShellResult<Self> {
        let prompt = get_prompt(PROMPT_VAR)?;
        Ok(Self {
            terminal: Terminal,
            interactive: false,
            pgid: None,
            saved_modes: None,
            prompt: Some(prompt),
        })
    }

    /// Release the prompt and restore the terminal modes captured at init.
    ///
    /// Safe to call more than once; later calls only re-apply the modes.
    pub fn destroy(&mut self) {
        if self.prompt.take().is_some() {
            debug!("prompt released");
        }
        if let Some(modes) = &self.saved_modes {
            match self.terminal.restore_modes(modes) {
                Ok(()) => debug!("terminal modes restored"),
                Err(e) => warn!(error = %e, "failed to restore terminal modes"),
            }
        }
    }

    /// Current prompt, empty after destroy
    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or("")
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn pgid(&self) -> Option<ProcessGroup> {
        self.pgid
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn saved_modes(&self) -> Option<&TerminalModes> {
        self.saved_modes.as_ref()
    }

    /// Take the terminal back after a foreground job and re-apply the saved modes.
    pub fn reclaim_terminal(&self) {
        if let Some(pgid) = self.pgid {
            if let Err(e) = self.terminal.give_foreground(pgid) {
                warn!(error = %e, "failed to reclaim terminal foreground");
            }
        }
        if let Some(modes) = &self.saved_modes {
            if let Err(e) = self.terminal.restore_modes(modes) {
                warn!(error = %e, "failed to reset terminal modes");
            }
        }
    }

    /// Execute one raw input line and return its exit status.
    ///
    /// Blank lines do nothing. A line that parses is recorded in history
    /// before it runs.
    pub fn execute<R>(&mut self, mut line: String, reader: &mut R) -> ShellResult<i32>
    where
        R: LineReader + HistorySource + ?Sized,
    {
        parser::trim_white(&mut line);
        if line.is_empty() {
            return Ok(0);
        }

        let Some(argv) = parser::cmd_parse(Some(line.as_str())) else {
            eprintln!("error: could not parse command line");
            return Ok(1);
        };
        reader.add_history(&line);

        if let Some(code) = builtin::try_builtin(self, &argv, &*reader) {
            return Ok(code);
        }

        match launcher::execute(self, &argv) {
            Ok(code) => Ok(code),
            Err(e @ ShellError::Spawn { .. }) => {
                eprintln!("{}", e);
                Ok(launcher::NOT_FOUND_STATUS)
            }
            Err(e) => Err(e),
        }
    }

    /// Read-eval loop: prompt, execute, repeat until end of input.
    pub fn run<R>(&mut self, reader: &mut R) -> ShellResult<()>
    where
        R: LineReader + HistorySource + ?Sized,
    {
        loop {
            let prompt = self.prompt().to_string();
            match reader.read_line(&prompt)? {
                InputResult::Line(line) => {
                    if let Err(e) = self.execute(line, reader) {
                        eprintln!("error: {}", e);
                    }
                }
                InputResult::Interrupt => continue,
                InputResult::Eof => break,
            }
        }
        Ok(())
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Prompt from the environment variable `var`, or [`DEFAULT_PROMPT`] when unset.
pub fn get_prompt(var: &str) -> ShellResult<String> {
    let value = env::var_os(var);
    let value = value
        .as_deref()
        .map(|v| v.to_string_lossy())
        .unwrap_or(DEFAULT_PROMPT.into());

    let mut prompt = String::new();
    prompt
        .try_reserve_exact(value.len())
        .map_err(|_| ShellError::Allocation)?;
    prompt.push_str(&value);
    Ok(prompt)
}

/// Serialises tests that touch the working directory or the environment.
#[cfg(test)]
pub(crate) fn lock_process_state() -> std::sync::MutexGuard<'static, ()> {
    static PROCESS_STATE: std::sync::Mutex<()> = std::sync::Mutex::new(());
    PROCESS_STATE.lock().unwrap_or_else(|p| p.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Feeds canned lines and records history in memory.
    struct ScriptedInput {
        lines: VecDeque<InputResult>,
        history: Vec<String>,
        prompts: Vec<String>,
    }

    impl ScriptedInput {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines
                    .iter()
                    .map(|l| InputResult::Line(l.to_string()))
                    .collect(),
                history: Vec::new(),
                prompts: Vec::new(),
            }
        }
    }

    impl LineReader for ScriptedInput {
        fn read_line(&mut self, prompt: &str) -> ShellResult<InputResult> {
            self.prompts.push(prompt.to_string());
            Ok(self.lines.pop_front().unwrap_or(InputResult::Eof))
        }

        fn add_history(&mut self, line: &str) {
            self.history.push(line.to_string());
        }
    }

    impl HistorySource for ScriptedInput {
        fn history_entries(&self) -> Vec<String> {
            self.history.clone()
        }
    }

    #[test]
    fn test_get_prompt_default_and_override() {
        let _guard = lock_process_state();
        assert_eq!(
            get_prompt("LAB_SHELL_TEST_PROMPT_UNSET_1234").unwrap(),
            DEFAULT_PROMPT
        );

        env::set_var("LAB_SHELL_TEST_PROMPT", "foo> ");
        assert_eq!(get_prompt("LAB_SHELL_TEST_PROMPT").unwrap(), "foo> ");
        env::remove_var("LAB_SHELL_TEST_PROMPT");
    }

    #[test]
    fn test_detached_session() {
        let shell = Shell::detached().unwrap();
        assert!(!shell.is_interactive());
        assert!(shell.pgid().is_none());
        assert!(shell.saved_modes().is_none());
        assert!(!shell.prompt().is_empty());
    }

    #[test]
    fn test_destroy_releases_prompt_and_is_repeatable() {
        let mut shell = Shell::detached().unwrap();
        shell.destroy();
        assert_eq!(shell.prompt(), "");
        shell.destroy();
        assert_eq!(shell.prompt(), "");
    }

    #[cfg(unix)]
    #[test]
    fn test_destroy_restores_captured_modes() {
        use nix::pty::openpty;
        use nix::sys::termios::{tcgetattr, tcsetattr, LocalFlags, SetArg};
        use std::os::fd::AsFd;

        let pty = openpty(None, None).unwrap();
        let probe = pty.slave.try_clone().unwrap();
        let terminal = Terminal::from_fd(pty.slave);
        let captured = terminal.capture_modes().unwrap();

        let mut shell = Shell {
            terminal,
            interactive: true,
            pgid: None,
            saved_modes: Some(captured.clone()),
            prompt: Some(DEFAULT_PROMPT.to_string()),
        };

        let mut changed = captured.clone();
        changed.local_flags.remove(LocalFlags::ECHO | LocalFlags::ICANON);
        tcsetattr(probe.as_fd(), SetArg::TCSANOW, &changed).unwrap();

        shell.destroy();

        let restored = tcgetattr(probe.as_fd()).unwrap();
        assert_eq!(restored.input_flags, captured.input_flags);
        assert_eq!(restored.output_flags, captured.output_flags);
        assert_eq!(restored.control_flags, captured.control_flags);
        assert_eq!(restored.local_flags, captured.local_flags);
        assert_eq!(restored.control_chars, captured.control_chars);
        assert!(shell.prompt.is_none());
    }

    #[test]
    fn test_run_records_parsed_lines() {
        let mut shell = Shell::detached().unwrap();
        let mut input = ScriptedInput::new(&["   ", "  history  ", "\thistory extra"]);
        shell.run(&mut input).unwrap();

        assert_eq!(input.history, vec!["history", "history extra"]);
        assert_eq!(input.prompts.len(), 4);
        assert!(input.prompts.iter().all(|p| p == shell.prompt()));
    }

    #[test]
    fn test_run_continues_after_interrupt() {
        let mut shell = Shell::detached().unwrap();
        let mut input = ScriptedInput::new(&[]);
        input.lines = VecDeque::from(vec![
            InputResult::Interrupt,
            InputResult::Line("history".to_string()),
        ]);
        shell.run(&mut input).unwrap();
        assert_eq!(input.history, vec!["history"]);
    }

    #[test]
    fn test_execute_unknown_program() {
        let mut shell = Shell::detached().unwrap();
        let mut input = ScriptedInput::new(&[]);
        let code = shell
            .execute("lab-shell-no-such-program-xyz".to_string(), &mut input)
            .unwrap();
        assert_eq!(code, launcher::NOT_FOUND_STATUS);
        assert_eq!(input.history, vec!["lab-shell-no-such-program-xyz"]);
    }

    #[test]
    fn test_execute_blank_line_is_skipped() {
        let mut shell = Shell::detached().unwrap();
        let mut input = ScriptedInput::new(&[]);
        assert_eq!(shell.execute(" \t ".to_string(), &mut input).unwrap(), 0);
        assert!(input.history.is_empty());
    }
}
