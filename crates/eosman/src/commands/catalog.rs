//! Quick command catalogue.

use tabled::Tabled;

use eosman_core::{QuickCommand, quick_commands};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct QuickRow {
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Command")]
    command: &'static str,
}

impl From<&QuickCommand> for QuickRow {
    fn from(q: &QuickCommand) -> Self {
        Self {
            name: q.name,
            command: q.command,
        }
    }
}

pub fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(
        &global.output,
        quick_commands(),
        |q| QuickRow::from(q),
        |q| q.command.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
