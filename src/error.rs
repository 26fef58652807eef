use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error type shared by the session, parser, builtins and launcher
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("memory allocation failed")]
    Allocation,

    #[error("cd: {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cd: HOME not set and no home directory recorded for the current user")]
    NoHome,

    #[error("could not become the terminal's foreground process group")]
    NotForeground,

    #[cfg(unix)]
    #[error("terminal: {0}")]
    Terminal(#[from] nix::Error),

    #[error("{program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Usage: {0} [-v]")]
    Usage(String),

    #[error("Input error: {0}")]
    Input(String),
}

pub type ShellResult<T> = Result<T, ShellError>;
