// ── History ledger ──
//
// Newest-first record of every dispatched command. The whole sequence
// lives behind a `watch` channel: each mutation swaps in a new snapshot
// under the channel's write lock, so readers only ever see a complete
// sequence and subscribers are notified on every change.

use std::num::NonZeroUsize;
use std::sync::Arc;

use chrono::SecondsFormat;
use serde::Serialize;
use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::{CommandResult, CommandStatus};

/// Immutable ledger snapshot, most recent first.
pub type HistorySnapshot = Arc<Vec<Arc<CommandResult>>>;

/// Serialization format for [`HistoryLedger::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    /// Pretty-printed JSON array.
    Json,
    /// Comma-separated values with a header row.
    Csv,
}

/// One exported history entry. Field set and order are stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub device_name: String,
    pub command: String,
    pub output: String,
    pub status: CommandStatus,
    /// RFC 3339 / ISO-8601 completion time.
    pub timestamp: String,
    pub duration_secs: f64,
}

impl From<&CommandResult> for HistoryRecord {
    fn from(r: &CommandResult) -> Self {
        Self {
            device_name: r.device_name.clone(),
            command: r.command.clone(),
            output: r.output.clone(),
            status: r.status,
            timestamp: r.completed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            duration_secs: r.duration.as_secs_f64(),
        }
    }
}

/// Append-only, optionally bounded, history of command results.
pub struct HistoryLedger {
    capacity: Option<NonZeroUsize>,
    entries: watch::Sender<HistorySnapshot>,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl HistoryLedger {
    /// Ledger that keeps at most `capacity` entries (`None` = unbounded).
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        let (entries, _) = watch::channel(Arc::new(Vec::new()));
        Self { capacity, entries }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self::new(Some(capacity))
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    /// Put `result` at the front, evicting the oldest entries past capacity.
    pub fn append(&self, result: CommandResult) -> Arc<CommandResult> {
        let result = Arc::new(result);
        let capacity = self.capacity;
        self.entries.send_modify(|snap| {
            let entries = Arc::make_mut(snap);
            entries.insert(0, Arc::clone(&result));
            if let Some(cap) = capacity {
                entries.truncate(cap.get());
            }
        });
        result
    }

    /// Current contents, most recent first.
    pub fn all(&self) -> HistorySnapshot {
        self.entries.borrow().clone()
    }

    pub fn latest(&self) -> Option<Arc<CommandResult>> {
        self.entries.borrow().first().cloned()
    }

    /// Drop every entry in one step.
    pub fn clear(&self) {
        self.entries.send_replace(Arc::new(Vec::new()));
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Watch the ledger; the receiver yields a fresh snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<HistorySnapshot> {
        self.entries.subscribe()
    }

    /// Exportable records, most recent first.
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.all().iter().map(|r| HistoryRecord::from(r.as_ref())).collect()
    }

    pub fn export(&self, format: ExportFormat) -> Result<String, CoreError> {
        let records = self.records();
        match format {
            ExportFormat::Json => serde_json::to_string_pretty(&records)
                .map_err(|e| CoreError::Internal(format!("history export failed: {e}"))),
            ExportFormat::Csv => Ok(to_csv(&records)),
        }
    }
}

// ── CSV ─────────────────────────────────────────────────────────────

const CSV_HEADER: &str = "device_name,command,output,status,timestamp,duration_secs";

fn to_csv(records: &[HistoryRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for r in records {
        let row = [
            csv_field(&r.device_name),
            csv_field(&r.command),
            csv_field(&r.output),
            r.status.to_string(),
            r.timestamp.clone(),
            format!("{:.3}", r.duration_secs),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::model::DeviceId;

    fn result(command: &str) -> CommandResult {
        CommandResult {
            id: Uuid::new_v4(),
            device_id: DeviceId::from("sw1"),
            device_name: "Core-Switch-01".into(),
            command: command.into(),
            output: "ok".into(),
            status: CommandStatus::Success,
            duration: Duration::from_millis(800),
            completed_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn commands(ledger: &HistoryLedger) -> Vec<String> {
        ledger.all().iter().map(|r| r.command.clone()).collect()
    }

    #[test]
    fn newest_entry_comes_first() {
        let ledger = HistoryLedger::unbounded();
        ledger.append(result("show version"));
        ledger.append(result("show vlan"));

        assert_eq!(commands(&ledger), ["show vlan", "show version"]);
        assert_eq!(ledger.latest().unwrap().command, "show vlan");
    }

    #[test]
    fn bounded_ledger_evicts_oldest() {
        let ledger = HistoryLedger::with_capacity(NonZeroUsize::new(2).unwrap());
        ledger.append(result("a"));
        ledger.append(result("b"));
        ledger.append(result("c"));

        assert_eq!(commands(&ledger), ["c", "b"]);
    }

    #[test]
    fn clear_empties_regardless_of_size() {
        let ledger = HistoryLedger::unbounded();
        for i in 0..50 {
            ledger.append(result(&format!("cmd {i}")));
        }
        ledger.clear();
        assert!(ledger.all().is_empty());
        assert!(ledger.latest().is_none());
    }

    #[test]
    fn snapshots_are_not_affected_by_later_appends() {
        let ledger = HistoryLedger::unbounded();
        ledger.append(result("a"));
        let before = ledger.all();
        ledger.append(result("b"));
        ledger.clear();

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].command, "a");
    }

    #[tokio::test]
    async fn subscribers_see_every_change() {
        let ledger = HistoryLedger::unbounded();
        let mut rx = ledger.subscribe();

        ledger.append(result("show version"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        ledger.clear();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_all_kept() {
        let ledger = Arc::new(HistoryLedger::unbounded());
        let tasks: Vec<_> = (0..8)
            .map(|t| {
                let ledger = Arc::clone(&ledger);
                tokio::spawn(async move {
                    for i in 0..25 {
                        ledger.append(result(&format!("{t}-{i}")));
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let all = ledger.all();
        assert_eq!(all.len(), 200);
        // Each writer's own entries stay in recency order.
        let mine: Vec<_> = all
            .iter()
            .filter(|r| r.command.starts_with("3-"))
            .map(|r| r.command.clone())
            .collect();
        let expected: Vec<_> = (0..25).rev().map(|i| format!("3-{i}")).collect();
        assert_eq!(mine, expected);
    }

    #[test]
    fn json_export_has_stable_fields() {
        let ledger = HistoryLedger::unbounded();
        ledger.append(result("show version"));

        let json: serde_json::Value =
            serde_json::from_str(&ledger.export(ExportFormat::Json).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "device_name": "Core-Switch-01",
                "command": "show version",
                "output": "ok",
                "status": "success",
                "timestamp": "2024-05-01T12:00:00.000Z",
                "duration_secs": 0.8,
            }])
        );
    }

    #[test]
    fn csv_export_quotes_multiline_output() {
        let ledger = HistoryLedger::unbounded();
        let mut r = result("show vlan");
        r.output = "VLAN  Name\n1     \"default\"".into();
        ledger.append(r);

        let csv = ledger.export(ExportFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "device_name,command,output,status,timestamp,duration_secs\n\
             Core-Switch-01,show vlan,\"VLAN  Name\n1     \"\"default\"\"\",success,2024-05-01T12:00:00.000Z,0.800\n"
        );
    }
}
