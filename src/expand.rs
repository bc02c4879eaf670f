use crate::env::Environment;

/// Expand a single token against the environment.
///
/// A token beginning with `$` is looked up (minus the marker) as an
/// environment variable and replaced by its value, or by the empty string if
/// the variable is unset. Any other token passes through unchanged.
///
/// Expansion is single-pass and whole-token only: `$NAME` occurring mid-token
/// is not expanded, values are not re-expanded, and there is no escaping.
pub(crate) fn expand_token(env: &Environment, token: &str) -> String {
    match token.strip_prefix('$') {
        Some(name) => env.get_var(name).unwrap_or_default(),
        None => token.to_owned(),
    }
}
