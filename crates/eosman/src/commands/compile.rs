//! Offline intent compilation.

use serde::Serialize;

use eosman_core::compiler;

use crate::cli::{CompileArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct Compiled {
    intents: Vec<&'static str>,
    config: String,
    commands: Vec<String>,
}

pub fn handle(args: &CompileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let intents = util::read_intents(&args.file)?;
    let config = compiler::compile_all(&intents)?;

    let compiled = Compiled {
        intents: intents.iter().map(eosman_core::ConfigIntent::kind).collect(),
        commands: compiler::to_commands(&config),
        config,
    };
    let out = output::render_single(
        &global.output,
        &compiled,
        |c| c.config.trim_end().to_owned(),
        |c| c.commands.join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
