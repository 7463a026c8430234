//! Script execution and the shared run-summary rendering.

use std::io::Read;
use std::sync::Arc;

use tabled::Tabled;

use eosman_core::{CommandResult, Engine, ScriptJob, ScriptRunSummary};

use crate::cli::{GlobalOpts, ScriptArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Output")]
    output: String,
}

fn summary_rows(summary: &ScriptRunSummary, color: bool) -> Vec<ResultRow> {
    summary
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| ResultRow {
            index: i + 1,
            command: r.command.clone(),
            status: output::status_label(r.status, color),
            time: format!("{:.3}s", r.duration.as_secs_f64()),
            output: output::summarize(&r.output, 60),
        })
        .collect()
}

fn footer(summary: &ScriptRunSummary) -> String {
    let mut line = format!(
        "{}/{} executed, {} succeeded, {} failed",
        summary.executed, summary.total, summary.succeeded, summary.failed
    );
    if summary.stopped_early {
        line.push_str(" (stopped on error)");
    }
    if summary.cancelled {
        line.push_str(" (cancelled)");
    }
    line
}

/// Render a run summary in the selected format and print it.
pub fn print_summary(summary: &ScriptRunSummary, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        summary,
        |s| {
            let table = tabled::Table::new(summary_rows(s, color))
                .with(tabled::settings::Style::rounded())
                .to_string();
            format!("{table}\n{}", footer(s))
        },
        |s| {
            s.results
                .iter()
                .map(|r: &Arc<CommandResult>| format!("{}\t{}", r.status, r.command))
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn read_script(args: &ScriptArgs) -> Result<String, CliError> {
    match args.file {
        Some(ref path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

pub async fn handle(engine: &Engine, args: ScriptArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let text = read_script(&args)?;
    let job = ScriptJob::parse(&text)?;
    let device_id = util::resolve_device(engine, &args.device)?;

    let mut options = engine
        .default_script_options()
        .stop_on_error(args.stop_on_error);
    if let Some(spacing) = args.spacing {
        options = options.min_spacing(spacing);
    }

    let (cancel, ctrl_c) = util::cancel_on_ctrl_c();
    let progress = util::ScriptProgress::start(engine, job.len(), global);
    let summary = engine
        .run_script_with(&device_id, &text, options, &cancel)
        .await;
    if let Some(progress) = progress {
        progress.finish();
    }
    ctrl_c.abort();
    let summary = summary?;

    print_summary(&summary, global)?;
    util::check_summary(&summary)
}
