//! Command line parsing - trimming and whitespace tokenization
//!
//! Whitespace is anything `char::is_whitespace` accepts (space, tab, newline,
//! carriage return, vertical tab, form feed and the Unicode separators), for both
//! trimming and splitting. Runs of whitespace collapse into one separator, so no
//! empty tokens are ever produced. There is no quoting, escaping or operator
//! syntax.

use std::ops::Deref;

use tracing::warn;

use crate::error::{ShellError, ShellResult};

/// Parsed command line: one owned string per whitespace-delimited token.
///
/// Dropping the vector releases every token and the container together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgVector {
    tokens: Vec<String>,
}

impl ArgVector {
    /// Command name (first token), if any
    pub fn command(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Tokens after the command name
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tokens
    }
}

impl Deref for ArgVector {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.tokens
    }
}

impl IntoIterator for ArgVector {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArgVector {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Strip leading and trailing whitespace in place.
///
/// Leading whitespace is removed by shifting the remaining bytes to the front
/// of the buffer, trailing whitespace by truncating. The buffer is never
/// reallocated.
pub fn trim_white(line: &mut String) -> &mut String {
    let leading = line.len() - line.trim_start().len();
    line.drain(..leading);
    let end = line.trim_end().len();
    line.truncate(end);
    line
}

/// Number of maximal non-whitespace runs in `line`
pub fn count_tokens(line: &str) -> usize {
    let mut count = 0;
    let mut in_token = false;
    for c in line.chars() {
        if c.is_whitespace() {
            in_token = false;
        } else if !in_token {
            in_token = true;
            count += 1;
        }
    }
    count
}

/// Split `line` into independently owned tokens.
///
/// Storage is reserved up front from [`count_tokens`] and every token is
/// copied into its own allocation. If any reservation fails, everything built
/// so far is dropped before the error is returned, so the caller never sees a
/// partial vector.
pub fn tokenize(line: &str) -> ShellResult<ArgVector> {
    let mut tokens: Vec<String> = Vec::new();
    tokens
        .try_reserve_exact(count_tokens(line))
        .map_err(|_| ShellError::Allocation)?;

    for word in line.split(char::is_whitespace).filter(|w| !w.is_empty()) {
        tokens.push(copy_token(word)?);
    }

    Ok(ArgVector { tokens })
}

fn copy_token(word: &str) -> ShellResult<String> {
    let mut token = String::new();
    token
        .try_reserve_exact(word.len())
        .map_err(|_| ShellError::Allocation)?;
    token.push_str(word);
    Ok(token)
}

/// Parse a line as read from the input collaborator.
///
/// `None` in gives `None` out ("nothing to parse"). A tokenizer failure is
/// logged and also yields `None`; the caller should skip the line.
pub fn cmd_parse(line: Option<&str>) -> Option<ArgVector> {
    let line = line?;
    match tokenize(line) {
        Ok(argv) => Some(argv),
        Err(e) => {
            warn!(error = %e, "failed to tokenize command line");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trimmed(s: &str) -> String {
        let mut line = s.to_string();
        trim_white(&mut line);
        line
    }

    #[test]
    fn test_simple_split() {
        let argv = tokenize("ls -la /tmp").unwrap();
        assert_eq!(argv.as_slice(), &["ls", "-la", "/tmp"]);
        assert_eq!(argv.command(), Some("ls"));
        assert_eq!(argv.args(), &["-la", "/tmp"]);
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(tokenize("  a   b  ").unwrap().as_slice(), &["a", "b"]);
        assert_eq!(
            tokenize("echo\thello \n\x0bworld").unwrap().as_slice(),
            &["echo", "hello", "world"]
        );
    }

    #[test]
    fn test_empty_and_blank_lines() {
        let empty = tokenize("").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.command(), None);
        assert!(empty.args().is_empty());

        assert!(tokenize("   \t\n").unwrap().is_empty());
    }

    #[test]
    fn test_cmd_parse_none() {
        assert_eq!(cmd_parse(None), None);
        assert_eq!(cmd_parse(Some("")), Some(ArgVector::default()));
        assert_eq!(
            cmd_parse(Some("cd /tmp")).unwrap().into_vec(),
            vec!["cd".to_string(), "/tmp".to_string()]
        );
    }

    #[test]
    fn test_source_line_untouched() {
        let line = String::from("  git   status ");
        let argv = tokenize(&line).unwrap();
        assert_eq!(line, "  git   status ");
        assert_eq!(argv.len(), 2);
    }

    #[test]
    fn test_count_tokens() {
        assert_eq!(count_tokens(""), 0);
        assert_eq!(count_tokens("   "), 0);
        assert_eq!(count_tokens("a"), 1);
        assert_eq!(count_tokens(" a\tb\nc "), 3);
    }

    #[test]
    fn test_trim_white() {
        assert_eq!(trimmed("  ls -la \n"), "ls -la");
        assert_eq!(trimmed("\t\t"), "");
        assert_eq!(trimmed(""), "");
        assert_eq!(trimmed("pwd"), "pwd");
        assert_eq!(trimmed("  a  b  "), "a  b");
    }

    #[test]
    fn test_trim_white_keeps_buffer() {
        let mut line = String::with_capacity(64);
        line.push_str("   echo hi   ");
        let ptr = line.as_ptr();
        let cap = line.capacity();
        trim_white(&mut line);
        assert_eq!(line, "echo hi");
        assert_eq!(line.as_ptr(), ptr);
        assert_eq!(line.capacity(), cap);
    }
}
