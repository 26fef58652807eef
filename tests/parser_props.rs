//! Property-based tests for line trimming and tokenizing

use lab_shell::shell::parser::{cmd_parse, count_tokens, tokenize, trim_white};
use proptest::prelude::*;

fn trimmed(s: &str) -> String {
    let mut line = s.to_string();
    trim_white(&mut line);
    line
}

proptest! {
    #[test]
    fn test_trim_is_idempotent(s in "[ \\t\\na-z/\\-.]{0,40}") {
        let once = trimmed(&s);
        let twice = trimmed(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(once.as_str(), s.trim());
    }

    #[test]
    fn test_trim_handles_any_text(s in "\\PC*") {
        let out = trimmed(&s);
        prop_assert!(out.len() <= s.len());
        prop_assert_eq!(out.as_str(), s.trim());
    }

    #[test]
    fn test_rejoined_tokens_collapse_whitespace(s in "[ \\t\\na-z0-9\\-/]{0,60}") {
        let argv = tokenize(&s).unwrap();
        let rejoined = argv.join(" ");
        let expected = s.split_whitespace().collect::<Vec<_>>().join(" ");
        prop_assert_eq!(&rejoined, &expected);

        let again = tokenize(&rejoined).unwrap();
        prop_assert_eq!(again, argv);
    }

    #[test]
    fn test_tokens_are_nonempty_and_whitespace_free(s in "\\PC*") {
        let argv = tokenize(&s).unwrap();
        prop_assert_eq!(argv.len(), count_tokens(&s));
        for token in &argv {
            prop_assert!(!token.is_empty());
            prop_assert!(!token.chars().any(char::is_whitespace));
        }
    }

    #[test]
    fn test_cmd_parse_matches_tokenize(
        cmd in "[a-z]{1,10}",
        args in prop::collection::vec("[a-zA-Z0-9]{1,10}", 0..5),
    ) {
        let line = format!("  {}   {} ", cmd, args.join("\t"));
        let argv = cmd_parse(Some(line.as_str())).unwrap();
        prop_assert_eq!(argv.command(), Some(cmd.as_str()));
        prop_assert_eq!(argv.args(), args.as_slice());
    }
}
