use crate::command::CommandFactory;
use crate::env::Environment;
use crate::external;
use crate::jobs::{self, JobController};
use crate::lexer;
use crate::parser;
use anyhow::Result;
use log::debug;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports the builtin commands defined in this crate; external
/// programs go through the process launcher instead.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// The interactive command interpreter.
///
/// Owns the [`Environment`], the builtin command factories and the job
/// controller. [`Interpreter::repl`] runs the prompt loop; a single line can
/// be evaluated directly with [`Interpreter::eval_line`], which is also how
/// the tests drive it.
pub struct Interpreter {
    env: Environment,
    builtins: Vec<Box<dyn CommandFactory>>,
    jobs: JobController,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of builtin factories.
    pub fn new(builtins: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            builtins,
            jobs: JobController::new(),
        }
    }

    /// The Read-Eval-Print Loop.
    ///
    /// The prompt is the absolute working directory followed by `"> "`. A
    /// delivered interrupt prints a newline and re-prompts; end-of-input
    /// prints a trailing newline and exits cleanly; any other read failure is
    /// fatal.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        while !self.env.should_exit {
            let prompt = format!("{}> ", self.env.current_dir.display());
            match rl.readline(&prompt) {
                Ok(line) => self.eval_line(&line, &mut std::io::stdout()),
                Err(ReadlineError::Interrupted) => println!(),
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(())
    }

    /// Evaluate one input line: tokenize, parse, then dispatch to a builtin
    /// or to the external launcher. Errors are reported and absorbed; nothing
    /// here ends the loop.
    pub fn eval_line(&mut self, line: &str, out: &mut dyn Write) {
        self.eval_line_with(line, out, &mut std::io::stderr());
    }

    /// Like [`Interpreter::eval_line`], with the error stream injectable too,
    /// so callers can capture what the user would see on stderr.
    pub fn eval_line_with(&mut self, line: &str, out: &mut dyn Write, err: &mut dyn Write) {
        let tokens = lexer::split_into_tokens(line, &self.env);
        let cmd = match parser::parse(tokens) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return,
            Err(e) => {
                let _ = writeln!(err, "{e}");
                return;
            }
        };
        debug!("dispatching {cmd:?}");

        let name = cmd.program().to_owned();
        let args: Vec<&str> = cmd.args().iter().map(String::as_str).collect();
        for factory in &self.builtins {
            if let Some(builtin) = factory.try_create(&self.env, &name, &args) {
                if let Err(e) = builtin.execute(out, &mut self.env) {
                    let _ = writeln!(err, "{e}");
                }
                return;
            }
        }

        match external::spawn(&self.env, &cmd) {
            Ok(child) => {
                if cmd.background {
                    let pid = jobs::detach_background(child);
                    let _ = writeln!(out, "[bg] started pid {pid}");
                } else {
                    match self.jobs.wait_foreground(child) {
                        Ok(status) if status.code() == Some(external::COMMAND_START_FAILED) => {
                            let _ = writeln!(err, "An error occurred.");
                        }
                        Ok(_) => {}
                        Err(e) => {
                            let _ = writeln!(err, "wait: {e}");
                        }
                    }
                }
            }
            Err(e) => {
                debug!("spawn failed: {e}");
                let _ = writeln!(err, "An error occurred.");
            }
        }
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of builtins:
    /// `exit`, `pwd`, `cd`, `echo`, `env`, `setenv`.
    fn default() -> Self {
        use crate::builtin::*;
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Pwd>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Env>::default()),
            Box::new(Factory::<SetEnv>::default()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;

    fn eval(sh: &mut Interpreter, line: &str) -> String {
        eval_capture(sh, line).0
    }

    /// Evaluate one line, returning (stdout, stderr) as seen by the user.
    fn eval_capture(sh: &mut Interpreter, line: &str) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        sh.eval_line_with(line, &mut out, &mut err);
        (
            String::from_utf8(out).expect("utf8 output"),
            String::from_utf8(err).expect("utf8 error output"),
        )
    }

    #[test]
    fn whitespace_only_line_is_a_noop() {
        let mut sh = Interpreter::default();
        assert_eq!(eval(&mut sh, "   \t  "), "");
        assert_eq!(eval(&mut sh, ""), "");
    }

    #[test]
    fn echo_joins_arguments() {
        let mut sh = Interpreter::default();
        assert_eq!(eval(&mut sh, "echo hello world"), "hello world\n");
    }

    #[test]
    fn setenv_then_expansion_round_trip() {
        let mut sh = Interpreter::default();
        assert_eq!(eval(&mut sh, "setenv MINISH_RT_FOO=bar"), "");
        assert_eq!(eval(&mut sh, "echo $MINISH_RT_FOO"), "bar\n");
    }

    #[test]
    fn unset_variable_expands_to_empty_argument() {
        let mut sh = Interpreter::default();
        assert_eq!(eval(&mut sh, "echo hi $MINISH_UNSET_VAR_98765"), "hi \n");
    }

    #[test]
    fn env_builtin_reports_setenv_result() {
        let mut sh = Interpreter::default();
        eval(&mut sh, "setenv MINISH_ENV_PROBE=42");
        assert_eq!(eval(&mut sh, "env MINISH_ENV_PROBE"), "42\n");
    }

    #[test]
    fn exit_sets_the_loop_flag() {
        let mut sh = Interpreter::default();
        eval(&mut sh, "exit");
        assert!(sh.env.should_exit);
    }

    #[test]
    fn echo_prints_dash_arguments_verbatim() {
        let mut sh = Interpreter::default();
        let (out, err) = eval_capture(&mut sh, "echo -n hi");
        assert_eq!(out, "-n hi\n");
        assert_eq!(err, "");
    }

    #[test]
    fn expanded_dash_value_is_printed_verbatim() {
        let mut sh = Interpreter::default();
        eval(&mut sh, "setenv MINISH_DASH_VAL=-v");
        let (out, err) = eval_capture(&mut sh, "echo $MINISH_DASH_VAL");
        assert_eq!(out, "-v\n");
        assert_eq!(err, "");
    }

    #[test]
    fn redirect_missing_target_discards_the_line() {
        let mut sh = Interpreter::default();
        let (out, err) = eval_capture(&mut sh, "echo oops >");
        assert_eq!(out, "", "nothing may be dispatched");
        assert_eq!(err, "usage: command ... > filename\n");
    }

    #[test]
    fn lone_ampersand_is_a_noop() {
        let mut sh = Interpreter::default();
        assert_eq!(eval(&mut sh, "&"), "");
    }

    #[test]
    fn unknown_command_is_reported_and_absorbed() {
        let mut sh = Interpreter::default();
        let (out, err) = eval_capture(&mut sh, "definitely_not_a_real_program_31415");
        assert_eq!(out, "");
        assert_eq!(err, "An error occurred.\n");
    }

    #[test]
    fn observed_child_status_127_prints_generic_notice() {
        use std::os::unix::fs::PermissionsExt;

        let mut sh = Interpreter::default();
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail127.sh");
        fs::write(&script, "#!/bin/sh\nexit 127\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let (out, err) = eval_capture(&mut sh, &script.display().to_string());
        assert_eq!(out, "");
        assert_eq!(err, "An error occurred.\n");
    }

    #[test]
    fn redirect_sends_external_output_to_file() {
        let mut sh = Interpreter::default();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        let output = eval(&mut sh, &format!("/bin/echo listing > {}", target.display()));
        assert_eq!(output, "", "redirected output must not reach the console");
        assert_eq!(fs::read_to_string(&target).unwrap(), "listing\n");
    }

    #[test]
    fn rerunning_redirect_truncates_previous_contents() {
        let mut sh = Interpreter::default();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");

        eval(&mut sh, &format!("/bin/echo first run > {}", target.display()));
        eval(&mut sh, &format!("/bin/echo second > {}", target.display()));
        assert_eq!(fs::read_to_string(&target).unwrap(), "second\n");
    }

    #[test]
    fn background_command_reports_pid_without_blocking() {
        let mut sh = Interpreter::default();

        let start = Instant::now();
        let output = eval(&mut sh, "sleep 2 &");

        assert!(start.elapsed() < std::time::Duration::from_secs(1));
        assert!(
            output.starts_with("[bg] started pid "),
            "unexpected output: {output:?}"
        );
        let pid: u32 = output
            .trim()
            .rsplit(' ')
            .next()
            .unwrap()
            .parse()
            .expect("reported pid should be numeric");
        assert!(pid > 0);
    }

    #[test]
    fn builtin_error_does_not_end_evaluation() {
        let mut sh = Interpreter::default();
        let before = sh.env.current_dir.clone();
        let output = eval(&mut sh, "cd /does/not/exist/minish");
        // The failure is written through the builtin's output stream.
        assert!(output.contains("cd:"), "unexpected output: {output:?}");
        assert_eq!(sh.env.current_dir, before);
    }
}
