use crate::env::Environment;
use anyhow::Result;
use std::io::Write;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line
/// tools.
pub type ExitCode = i32;

/// A fully parsed command line, ready for dispatch.
///
/// Invariants: `argv` is never empty; the redirection target and the
/// background marker have already been stripped from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Program name followed by its arguments.
    pub argv: Vec<String>,
    /// Output redirection target, if a `> FILE` pair was present.
    pub redirect_out: Option<String>,
    /// Whether the command should run without the interpreter waiting for it.
    pub background: bool,
}

impl Command {
    /// The program name (first token of the line).
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// The arguments following the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Object-safe trait for any command the interpreter can execute in-process.
///
/// Implemented by built-ins via a blanket impl in the `builtin` module.
pub trait ExecutableCommand {
    /// Executes the command, writing its output to `stdout`.
    fn execute(self: Box<Self>, stdout: &mut dyn Write, env: &mut Environment)
    -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`, letting the
/// interpreter fall through to the external program launcher.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and
    /// arguments.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
