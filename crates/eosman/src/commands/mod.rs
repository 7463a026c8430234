//! Command dispatch: bridges CLI args -> engine calls -> output formatting.

pub mod apply;
pub mod catalog;
pub mod compile;
pub mod config_cmd;
pub mod devices;
pub mod exec;
pub mod script;
pub mod util;

use eosman_core::Engine;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a switch-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, engine: &Engine, global: &GlobalOpts) -> Result<(), CliError> {
    let outcome = match cmd {
        Command::Exec(args) => exec::handle(engine, args, global).await,
        Command::Script(args) => script::handle(engine, args, global).await,
        Command::Apply(args) => apply::handle(engine, args, global).await,
        // Offline commands are handled before an engine is built
        Command::Devices(_)
        | Command::Commands
        | Command::Compile(_)
        | Command::Config(_)
        | Command::Completions(_) => unreachable!(),
    };

    // The ledger is written even when the run itself failed.
    if let Some(ref path) = global.history_out {
        util::write_history(engine, path)?;
    }
    outcome
}
