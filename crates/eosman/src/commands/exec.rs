//! Single-command execution.

use eosman_core::{CommandResult, Engine, find_quick_command};

use crate::cli::{ExecArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(r: &CommandResult, color: bool) -> String {
    let mut out = format!(
        "{} on {} ({}) in {:.3}s\n",
        output::status_label(r.status, color),
        r.device_name,
        r.device_id,
        r.duration.as_secs_f64(),
    );
    out.push_str(r.output.trim_end());
    out
}

/// Command text from the positional words or `--quick <name>`.
fn command_text(args: &ExecArgs) -> Result<String, CliError> {
    match args.quick {
        Some(ref name) => find_quick_command(name)
            .map(|q| q.command.to_owned())
            .ok_or_else(|| CliError::NotFound {
                resource_type: "quick command".into(),
                identifier: name.clone(),
                list_command: "commands".into(),
            }),
        None => Ok(args.command.join(" ")),
    }
}

pub async fn handle(engine: &Engine, args: ExecArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let command = command_text(&args)?;
    let device_id = util::resolve_device(engine, &args.device)?;

    let spinner = util::spinner(&format!("{device_id}: {command}"), global);
    let result = engine.execute(&device_id, &command).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let result = result?;

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        result.as_ref(),
        |r| detail(r, color),
        |r| r.output.trim_end().to_owned(),
    )?;
    output::print_output(&out, global.quiet);

    if result.is_success() {
        Ok(())
    } else {
        Err(CliError::CommandsFailed {
            device: device_id.to_string(),
            failed: 1,
            total: 1,
        })
    }
}
