use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Interpreter-owned state spanning the whole session.
///
/// Holds the variable map that expansion reads and spawned children receive,
/// the working directory shown in the prompt and used for execution, and the
/// flag the prompt loop polls to stop. Seeded once from the real process
/// environment; after that `setenv` is the only writer, and since the
/// interpreter is single-threaded, plain fields suffice.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Variable map handed to every spawned child (PATH, HOME, ...).
    pub vars: HashMap<String, String>,
    /// Working directory for the prompt and for command execution.
    pub current_dir: PathBuf,
    /// Set by the `exit` builtin; ends the prompt loop.
    pub should_exit: bool,
}

impl Environment {
    /// Snapshot the running process: its variables and working directory.
    pub fn new() -> Self {
        let mut vars = HashMap::new();
        for (k, v) in stdenv::vars() {
            vars.insert(k, v);
        }
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            vars,
            current_dir,
            should_exit: false,
        }
    }

    /// Look a variable up, preferring the interpreter's own map over the
    /// process environment.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .cloned()
            .or_else(|| stdenv::var(key).ok())
    }

    /// Insert or overwrite a variable in the interpreter's map.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
