//! Tab completion: builtin and PATH command names for the first word,
//! file system paths for the rest.

use std::borrow::Cow;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::Context;
use rustyline::Helper;

use super::builtin::BUILTINS;

#[derive(Debug, Default)]
pub struct ShellHelper;

impl ShellHelper {
    pub fn new() -> Self {
        Self
    }

    /// Builtins plus every executable on PATH starting with `prefix`, sorted and deduplicated.
    fn complete_command(&self, prefix: &str) -> Vec<Pair> {
        let mut names: Vec<String> = BUILTINS
            .iter()
            .filter(|b| b.starts_with(prefix))
            .map(|b| b.to_string())
            .collect();

        if let Some(path_env) = env::var_os("PATH") {
            for dir in env::split_paths(&path_env) {
                let Ok(entries) = fs::read_dir(&dir) else {
                    continue;
                };
                for entry in entries.flatten() {
                    let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                        continue;
                    };
                    if name.starts_with(prefix) && is_executable(&entry.path()) {
                        names.push(name);
                    }
                }
            }
        }

        names.sort();
        names.dedup();
        names
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect()
    }

    /// Entries of the directory named by `partial` (relative to the cwd) matching its last component.
    fn complete_path(&self, partial: &str) -> Vec<Pair> {
        let (dir_part, prefix) = match partial.rfind('/') {
            Some(idx) => (&partial[..=idx], &partial[idx + 1..]),
            None => ("", partial),
        };
        let search_dir = if dir_part.is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(dir_part)
        };

        let Ok(entries) = fs::read_dir(&search_dir) else {
            return Vec::new();
        };

        let mut candidates: Vec<Pair> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?.to_string();
                if !name.starts_with(prefix) || (prefix.is_empty() && name.starts_with('.')) {
                    return None;
                }
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                let display = if is_dir { format!("{}/", name) } else { name };
                Some(Pair {
                    replacement: format!("{}{}", dir_part, display),
                    display,
                })
            })
            .collect();

        candidates.sort_by(|a, b| a.display.cmp(&b.display));
        candidates
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];
        let start = line_to_cursor
            .rfind(char::is_whitespace)
            .map(|idx| idx + line_to_cursor[idx..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        let word = &line_to_cursor[start..];
        let is_first_word = line_to_cursor[..start].trim().is_empty();

        let candidates = if is_first_word && !word.contains('/') {
            self.complete_command(word)
        } else {
            self.complete_path(word)
        };
        Ok((start, candidates))
    }
}

impl Highlighter for ShellHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{}\x1b[0m", hint))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
