//! Program flag scanning.
//!
//! Only `-v` is recognised. Option letters may be clustered (`-vv`), `--` ends
//! option scanning and plain words are ignored.

/// What `main` should do after looking at the program arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// Start the shell
    Run,
    /// Print the version and exit successfully
    Version,
    /// Print usage for the named program and exit with failure
    Usage(String),
}

/// Scan `args` (including the program name at index 0).
///
/// Options are handled left to right and the first one that ends the program
/// wins, so `-v -x` prints the version while `-x -v` prints usage.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> CliAction {
    let program = args
        .first()
        .map(|p| p.as_ref().to_string())
        .unwrap_or_else(|| "labsh".to_string());

    for arg in args.iter().skip(1).map(AsRef::as_ref) {
        if arg == "--" {
            break;
        }
        let Some(letters) = arg.strip_prefix('-') else {
            continue;
        };
        if letters.is_empty() {
            continue;
        }
        for letter in letters.chars() {
            match letter {
                'v' => return CliAction::Version,
                _ => return CliAction::Usage(program),
            }
        }
    }

    CliAction::Run
}

/// `MAJOR.MINOR` of this build
pub fn version_string() -> String {
    format!("{}.{}", crate::VERSION_MAJOR, crate::VERSION_MINOR)
}
