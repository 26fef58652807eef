//! Interactive line input with history.
//!
//! The REPL only depends on the [`LineReader`] and [`HistorySource`] traits;
//! [`ReadlineInput`] is the rustyline-backed implementation used by the binary.

use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, Editor};
use tracing::warn;

use super::completer::ShellHelper;
use crate::error::{ShellError, ShellResult};

/// Outcome of one prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
    Line(String),
    /// Ctrl+C at the prompt: abandon the current line
    Interrupt,
    /// Ctrl+D or end of input
    Eof,
}

pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> ShellResult<InputResult>;

    /// Record a successfully parsed line
    fn add_history(&mut self, line: &str);
}

/// Read access to recorded history, oldest entry first.
pub trait HistorySource {
    fn history_entries(&self) -> Vec<String>;
}

impl HistorySource for [String] {
    fn history_entries(&self) -> Vec<String> {
        self.to_vec()
    }
}

impl HistorySource for Vec<String> {
    fn history_entries(&self) -> Vec<String> {
        self.clone()
    }
}

pub struct ReadlineInput {
    editor: Editor<ShellHelper, DefaultHistory>,
    /// Every recorded line; the editor's own history drops consecutive duplicates.
    history: Vec<String>,
}

impl ReadlineInput {
    pub fn new() -> ShellResult<Self> {
        // History is added explicitly once a line has parsed.
        let config = Config::builder().auto_add_history(false).build();
        let mut editor = Editor::with_config(config)
            .map_err(|e| ShellError::Input(format!("Failed to create readline editor: {}", e)))?;
        editor.set_helper(Some(ShellHelper::new()));
        editor.set_completion_type(CompletionType::List);

        Ok(Self {
            editor,
            history: Vec::new(),
        })
    }
}

impl LineReader for ReadlineInput {
    fn read_line(&mut self, prompt: &str) -> ShellResult<InputResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(InputResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(InputResult::Interrupt),
            Err(ReadlineError::Eof) => Ok(InputResult::Eof),
            Err(e) => Err(ShellError::Input(format!("Readline error: {}", e))),
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(e) = self.editor.add_history_entry(line) {
            warn!(error = %e, "editor rejected history entry");
        }
        self.history.push(line.to_string());
    }
}

impl HistorySource for ReadlineInput {
    fn history_entries(&self) -> Vec<String> {
        self.history.clone()
    }
}
