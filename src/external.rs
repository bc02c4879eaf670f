use crate::command::{Command, ExitCode};
use crate::env::Environment;
use crate::jobs;
use anyhow::{Result, anyhow};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::fs::File;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};

/// Reserved exit status meaning the child could not set up redirection or
/// could not execute the requested program.
pub const COMMAND_START_FAILED: ExitCode = 127;

/// Spawn an external program for a non-builtin command.
///
/// The child inherits the interpreter's environment map, working directory and
/// standard streams, except that a redirection target replaces its standard
/// output with a freshly truncated file. Default signal dispositions are
/// restored in the child before the program image takes over, so Ctrl-C and
/// the watchdog behave normally for it regardless of the interpreter's own
/// signal policy.
///
/// Failures to resolve the program or to open the redirection target surface
/// as an error here, before anything runs; the caller reports them and returns
/// to the prompt.
pub(crate) fn spawn(env: &Environment, cmd: &Command) -> Result<Child> {
    let search_paths = env.get_var("PATH").unwrap_or_default();
    let program = find_command_path(OsStr::new(&search_paths), Path::new(cmd.program()))
        .ok_or_else(|| anyhow!("{}: command not found", cmd.program()))?;

    let mut child = std::process::Command::new(program.as_ref());
    child
        .args(cmd.args())
        .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&env.current_dir);

    if let Some(target) = &cmd.redirect_out {
        let path = resolve_target(env, target);
        let file = File::create(&path)
            .map_err(|e| anyhow!("{}: cannot open for writing: {e}", path.display()))?;
        child.stdout(Stdio::from(file));
    }

    unsafe {
        child.pre_exec(jobs::reset_child_signals);
    }

    Ok(child.spawn()?)
}

/// Redirection targets are interpreted relative to the interpreter's working
/// directory, like every other path the user types.
fn resolve_target(env: &Environment, target: &str) -> PathBuf {
    let path = Path::new(target);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        env.current_dir.join(path)
    }
}

/// Resolve a command path the way `execvp` would.
///
/// Behavior:
/// - Absolute path: returns it if it exists.
/// - Relative with multiple components (e.g., `bin/sh`): returns it if it exists.
/// - `./foo`: returns it if it exists.
/// - Single path component (no separators): search each directory in
///   `search_paths` (PATH) and return the first existing match.
/// - Empty path: returns `None`.
pub(crate) fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    if path.starts_with("./") && path.exists() {
        return Some(Cow::Borrowed(path));
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) => find_in_path(search_paths, x.as_os_str()).map(Cow::Owned),
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    for dir in std::env::split_paths(search_paths) {
        let path = dir.join(cmd);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.exists() { Some(path) } else { None }
}
