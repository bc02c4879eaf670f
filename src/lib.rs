//! A small interactive shell.
//!
//! This crate provides the building blocks of a line-oriented command
//! interpreter: a whitespace tokenizer with `$NAME` expansion, a parser that
//! recognizes output redirection (`> FILE`) and background launch (`&`), a set
//! of built-in commands executed in-process, a launcher for external programs,
//! and a job controller that enforces a wall-clock deadline on foreground
//! children.
//!
//! The main entry point is [`Interpreter`], which owns the environment and the
//! prompt loop. The public modules [`command`] and [`env`] expose the traits
//! and types needed to implement additional built-in commands.

mod builtin;
pub mod command;
pub mod env;
mod expand;
mod external;
mod interpreter;
pub mod jobs;
mod lexer;
mod parser;

/// Convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;
pub use jobs::install_signal_policy;
