//! Lab Shell - minimal interactive shell
//!
//! Features:
//! - Whitespace tokenizer with in-place line trimming
//! - Built-in `exit`, `cd` and `history`
//! - POSIX job-control aware session: foreground terminal ownership, ignored
//!   job-control signals, terminal modes restored on exit

pub mod cli;
pub mod error;
pub mod shell;

pub use error::{ShellError, ShellResult};
pub use shell::Shell;

pub const VERSION_MAJOR: &str = env!("CARGO_PKG_VERSION_MAJOR");
pub const VERSION_MINOR: &str = env!("CARGO_PKG_VERSION_MINOR");
