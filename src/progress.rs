//! Sync progress reporting.
//!
//! Every processed record produces exactly one [`SyncEvent`], and the run
//! ends with a [`SyncEvent::Complete`] carrying the totals. Reporters write
//! to stdout, either as human-readable lines or as one JSON object per line.

use std::io::Write;

use serde::Serialize;

/// Totals for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub total: u64,
    pub inserted: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub skipped: u64,
}

/// A single progress event.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Inserted {
        stock_code: String,
        name: String,
    },
    Updated {
        stock_code: String,
        name: String,
        fields: Vec<&'static str>,
    },
    Unchanged {
        stock_code: String,
        name: String,
    },
    /// The record was not synchronized. `stock_code` is absent when the
    /// record has no identifier to report.
    Skipped {
        stock_code: Option<String>,
        reason: String,
    },
    Complete(SyncSummary),
}

/// Reports sync progress. Called from the sync loop.
pub trait SyncReporter: Send + Sync {
    fn report(&self, event: SyncEvent);
}

/// Human-friendly lines: "updated A1 (Shirt): quantity, updatedAt".
pub struct HumanReporter;

impl SyncReporter for HumanReporter {
    fn report(&self, event: SyncEvent) {
        let line = human_line(&event);
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", line);
        let _ = out.flush();
    }
}

/// Machine-readable progress: one JSON object per line.
pub struct JsonReporter;

impl SyncReporter for JsonReporter {
    fn report(&self, event: SyncEvent) {
        if let Ok(line) = serde_json::to_string(&json_event(&event)) {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }
}

pub fn human_line(event: &SyncEvent) -> String {
    match event {
        SyncEvent::Inserted { stock_code, name } => {
            format!("inserted {} ({})", stock_code, name)
        }
        SyncEvent::Updated {
            stock_code,
            name,
            fields,
        } => format!("updated {} ({}): {}", stock_code, name, fields.join(", ")),
        SyncEvent::Unchanged { stock_code, name } => {
            format!("unchanged {} ({})", stock_code, name)
        }
        SyncEvent::Skipped { stock_code, reason } => format!(
            "skipped {}: {}",
            stock_code.as_deref().unwrap_or("<no ProductId>"),
            reason
        ),
        SyncEvent::Complete(s) => format!(
            "sync complete: {} records, {} inserted, {} updated, {} unchanged, {} skipped",
            s.total, s.inserted, s.updated, s.unchanged, s.skipped
        ),
    }
}

pub fn json_event(event: &SyncEvent) -> serde_json::Value {
    match event {
        SyncEvent::Inserted { stock_code, name } => serde_json::json!({
            "event": "inserted",
            "stock_code": stock_code,
            "name": name
        }),
        SyncEvent::Updated {
            stock_code,
            name,
            fields,
        } => serde_json::json!({
            "event": "updated",
            "stock_code": stock_code,
            "name": name,
            "fields": fields
        }),
        SyncEvent::Unchanged { stock_code, name } => serde_json::json!({
            "event": "unchanged",
            "stock_code": stock_code,
            "name": name
        }),
        SyncEvent::Skipped { stock_code, reason } => serde_json::json!({
            "event": "skipped",
            "stock_code": stock_code,
            "reason": reason
        }),
        SyncEvent::Complete(summary) => serde_json::json!({
            "event": "complete",
            "summary": summary
        }),
    }
}

/// Output format selected on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum ProgressFormat {
    Human,
    Json,
}

impl ProgressFormat {
    pub fn reporter(&self) -> Box<dyn SyncReporter> {
        match self {
            ProgressFormat::Human => Box::new(HumanReporter),
            ProgressFormat::Json => Box::new(JsonReporter),
        }
    }
}
