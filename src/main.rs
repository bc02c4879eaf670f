use anyhow::Result;
use minish::{Interpreter, install_signal_policy};

fn main() -> Result<()> {
    env_logger::init();
    install_signal_policy()?;
    Interpreter::default().repl()
}
