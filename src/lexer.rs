//! Splitting an input line into expanded tokens.
//!
//! The grammar is flat: tokens are separated by whitespace and every token is
//! passed through the expander exactly once. Per-line limits are explicit
//! values rather than buffer geometry; exceeding them never corrupts adjacent
//! tokens.

use crate::env::Environment;
use crate::expand::expand_token;

/// Maximum number of input bytes considered per line; the rest is dropped.
pub const MAX_LINE_LEN: usize = 1024;
/// Maximum number of tokens taken from one line; further tokens are dropped
/// silently.
pub const MAX_TOKENS: usize = 128;
/// Maximum byte length of a single token after expansion.
pub const MAX_TOKEN_LEN: usize = 4096;

/// Split a raw input line into an ordered sequence of expanded tokens.
///
/// Delimiters are space, tab, carriage return and newline. Runs of delimiters
/// are collapsed, so a line consisting only of delimiters (or nothing) yields
/// an empty sequence, which the caller must treat as a no-op. Each token is
/// expanded via the environment and clamped to [`MAX_TOKEN_LEN`].
pub(crate) fn split_into_tokens(line: &str, env: &Environment) -> Vec<String> {
    let line = clamp(line, MAX_LINE_LEN);
    line.split(is_delimiter)
        .filter(|t| !t.is_empty())
        .take(MAX_TOKENS)
        .map(|t| {
            let mut expanded = expand_token(env, t);
            let end = clamp(&expanded, MAX_TOKEN_LEN).len();
            expanded.truncate(end);
            expanded
        })
        .collect()
}

fn is_delimiter(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// Truncate `s` to at most `max` bytes without splitting a character.
fn clamp(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
