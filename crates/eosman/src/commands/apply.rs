//! Compile an intent document and push it to a switch.

use eosman_core::{Engine, ScriptRunSummary, compiler};

use crate::cli::{ApplyArgs, GlobalOpts};
use crate::error::CliError;

use super::{script, util};

pub async fn handle(engine: &Engine, args: ApplyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let intents = util::read_intents(&args.file)?;
    let config = compiler::compile_all(&intents)?;
    let device_id = util::resolve_device(engine, &args.device)?;

    if !global.quiet {
        eprintln!("{}", config.trim_end());
    }
    let line_count = compiler::to_commands(&config).len();
    if !util::confirm(
        &format!("Apply {line_count} configuration line(s) to {device_id}?"),
        global.yes,
    )? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let options = engine
        .default_script_options()
        .stop_on_error(args.stop_on_error);
    let (cancel, ctrl_c) = util::cancel_on_ctrl_c();

    // Each intent runs in its own configure session.
    let mut runs: Vec<ScriptRunSummary> = Vec::with_capacity(intents.len());
    for intent in &intents {
        let summary = match engine.apply_with(&device_id, intent, options, &cancel).await {
            Ok(summary) => summary,
            // Nothing to push for this intent, e.g. an empty system block.
            Err(eosman_core::CoreError::EmptyScript) => continue,
            Err(err) => {
                ctrl_c.abort();
                return Err(err.into());
            }
        };
        let halt = summary.cancelled || (args.stop_on_error && summary.failed > 0);
        runs.push(summary);
        if halt {
            break;
        }
    }
    ctrl_c.abort();

    let Some(combined) = merge(runs) else {
        return Err(CliError::EmptyScript);
    };
    script::print_summary(&combined, global)?;
    util::check_summary(&combined)
}

/// Fold per-intent runs into one summary, results in execution order.
fn merge(runs: Vec<ScriptRunSummary>) -> Option<ScriptRunSummary> {
    let mut runs = runs.into_iter();
    let mut acc = runs.next()?;
    for run in runs {
        acc.total += run.total;
        acc.executed += run.executed;
        acc.succeeded += run.succeeded;
        acc.failed += run.failed;
        acc.cancelled |= run.cancelled;
        acc.stopped_early |= run.stopped_early;
        acc.results.extend(run.results);
    }
    Some(acc)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use eosman_core::DeviceId;

    use super::*;

    fn run(total: usize, failed: usize) -> ScriptRunSummary {
        ScriptRunSummary {
            device_id: DeviceId::from("sw1"),
            total,
            executed: total,
            succeeded: total - failed,
            failed,
            cancelled: false,
            stopped_early: false,
            results: Vec::new(),
        }
    }

    #[test]
    fn merge_adds_counts() {
        let merged = merge(vec![run(5, 0), run(4, 1)]).unwrap();
        assert_eq!(merged.total, 9);
        assert_eq!(merged.succeeded, 8);
        assert_eq!(merged.failed, 1);
        assert!(!merged.is_complete_success());
    }

    #[test]
    fn merge_of_nothing_is_none() {
        assert!(merge(Vec::new()).is_none());
    }
}
