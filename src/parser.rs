//! Turning a token sequence into a [`Command`].
//!
//! Two passes over the tokens: the redirection resolver first, then the
//! background detector on the already-truncated argument list. Both mirror the
//! order a user types them, so `cmd arg > file` keeps `file` out of argv and
//! `cmd arg &` strips the trailing marker.

use crate::command::Command;
use thiserror::Error;

/// Errors that abandon the current line without executing anything.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A `>` operator with no filename after it.
    #[error("usage: command ... > filename")]
    RedirectWithoutTarget,
}

/// Build a [`Command`] from a token sequence.
///
/// Returns `Ok(None)` when the line is a no-op: no tokens at all, a redirect
/// with an empty argument list (`> file`), or a line reduced to nothing after
/// stripping the background marker (`&`).
pub(crate) fn parse(tokens: Vec<String>) -> Result<Option<Command>, ParseError> {
    if tokens.is_empty() {
        return Ok(None);
    }

    let (mut argv, redirect_out) = resolve_redirect(tokens)?;
    let background = detect_background(&mut argv);
    if argv.is_empty() {
        return Ok(None);
    }

    Ok(Some(Command {
        argv,
        redirect_out,
        background,
    }))
}

/// Scan for the first `>` token. Everything from the operator onward is
/// removed from the argument list; the token right after it becomes the
/// redirection target.
fn resolve_redirect(mut tokens: Vec<String>) -> Result<(Vec<String>, Option<String>), ParseError> {
    let Some(pos) = tokens.iter().position(|t| t == ">") else {
        return Ok((tokens, None));
    };
    if pos + 1 >= tokens.len() {
        return Err(ParseError::RedirectWithoutTarget);
    }
    let target = tokens[pos + 1].clone();
    tokens.truncate(pos);
    Ok((tokens, Some(target)))
}

/// Strip a trailing `&` marker, reporting whether one was present.
fn detect_background(argv: &mut Vec<String>) -> bool {
    if argv.last().is_some_and(|t| t == "&") {
        argv.pop();
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn plain_command_has_no_redirect_or_background() {
        let cmd = parse(toks(&["ls", "-l"])).unwrap().unwrap();
        assert_eq!(cmd.argv, toks(&["ls", "-l"]));
        assert_eq!(cmd.redirect_out, None);
        assert!(!cmd.background);
    }

    #[test]
    fn empty_token_sequence_is_noop() {
        assert_eq!(parse(Vec::new()), Ok(None));
    }

    #[test]
    fn redirect_target_is_extracted_and_argv_truncated() {
        let cmd = parse(toks(&["ls", "-l", ">", "out.txt"])).unwrap().unwrap();
        assert_eq!(cmd.argv, toks(&["ls", "-l"]));
        assert_eq!(cmd.redirect_out.as_deref(), Some("out.txt"));
    }

    #[test]
    fn tokens_after_redirect_target_are_dropped() {
        let cmd = parse(toks(&["ls", ">", "out.txt", "ignored"]))
            .unwrap()
            .unwrap();
        assert_eq!(cmd.argv, toks(&["ls"]));
        assert_eq!(cmd.redirect_out.as_deref(), Some("out.txt"));
    }

    #[test]
    fn first_redirect_wins() {
        let cmd = parse(toks(&["ls", ">", "a", ">", "b"])).unwrap().unwrap();
        assert_eq!(cmd.redirect_out.as_deref(), Some("a"));
    }

    #[test]
    fn trailing_redirect_is_usage_error() {
        assert_eq!(
            parse(toks(&["ls", ">"])),
            Err(ParseError::RedirectWithoutTarget)
        );
    }

    #[test]
    fn redirect_with_no_command_is_noop() {
        assert_eq!(parse(toks(&[">", "out.txt"])), Ok(None));
    }

    #[test]
    fn trailing_ampersand_marks_background() {
        let cmd = parse(toks(&["sleep", "5", "&"])).unwrap().unwrap();
        assert_eq!(cmd.argv, toks(&["sleep", "5"]));
        assert!(cmd.background);
    }

    #[test]
    fn ampersand_mid_line_is_a_plain_argument() {
        let cmd = parse(toks(&["echo", "&", "x"])).unwrap().unwrap();
        assert_eq!(cmd.argv, toks(&["echo", "&", "x"]));
        assert!(!cmd.background);
    }

    #[test]
    fn lone_ampersand_is_noop() {
        assert_eq!(parse(toks(&["&"])), Ok(None));
    }

    #[test]
    fn ampersand_after_redirect_tail_is_dropped_with_it() {
        // `cmd > file &` — the marker sits past the redirect operator, so the
        // resolver drops it along with the rest of the tail.
        let cmd = parse(toks(&["sleep", "5", ">", "f", "&"])).unwrap().unwrap();
        assert_eq!(cmd.argv, toks(&["sleep", "5"]));
        assert!(!cmd.background);
    }
}
