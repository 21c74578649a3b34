//! Result records and the sinks that render them.
//!
//! The orchestrator hands every finished run to a [`ResultSink`] as one
//! ordered batch.  Rendering belongs to the sink:
//!
//! * [`LogSink`]: human-readable lines through `log`.
//! * [`JsonLinesSink`]: one JSON object per record on any `Write`.
//! * [`MemorySink`]: keeps batches in memory; handy for embedding and tests.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use super::runner::PipelineError;

// ---------------------------------------------------------------------------
// ResultRecord
// ---------------------------------------------------------------------------

/// What happened to one message in the translate stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum TranslationOutcome {
    Translated(String),
    Failed(String),
}

impl TranslationOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, TranslationOutcome::Translated(_))
    }
}

/// One emitted line: its 1-based label, the recognised text and the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultRecord {
    pub index: usize,
    pub original: String,
    pub outcome: TranslationOutcome,
}

// ---------------------------------------------------------------------------
// ResultSink trait
// ---------------------------------------------------------------------------

/// Append-only consumer of run output.
pub trait ResultSink: Send + Sync {
    /// Receive one run's records, top to bottom.  May be empty.
    fn emit(&self, batch: &[ResultRecord]);

    /// Receive a run-level failure (capture or recognition).
    fn report(&self, error: &PipelineError) {
        log::error!("pipeline: run aborted: {error}");
    }
}

// ---------------------------------------------------------------------------
// LogSink
// ---------------------------------------------------------------------------

const RULE_WIDTH: usize = 60;

/// Renders batches through the `log` facade at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl LogSink {
    /// The lines one batch is logged as, with their levels.
    fn render(batch: &[ResultRecord]) -> Vec<(log::Level, String)> {
        use log::Level::{Error, Info};

        if batch.is_empty() {
            return vec![(Info, "No readable messages found.".into())];
        }

        let rule = "─".repeat(RULE_WIDTH);
        let mut lines = vec![
            (Info, rule.clone()),
            (Info, "TRANSLATION RESULTS".into()),
            (Info, rule.clone()),
        ];
        for record in batch {
            match &record.outcome {
                TranslationOutcome::Translated(text) => {
                    lines.push((Info, format!("Message {}:", record.index)));
                    lines.push((Info, format!("   Original:   {}", record.original)));
                    lines.push((Info, format!("   Translated: {text}")));
                }
                TranslationOutcome::Failed(err) => {
                    lines.push((
                        Error,
                        format!("Translation failed for message {}: {err}", record.index),
                    ));
                    lines.push((Info, format!("   Original text: {}", record.original)));
                }
            }
        }
        lines.push((Info, rule));
        lines
    }
}

impl ResultSink for LogSink {
    fn emit(&self, batch: &[ResultRecord]) {
        for (level, line) in Self::render(batch) {
            log::log!(level, "{line}");
        }
    }
}

// ---------------------------------------------------------------------------
// JsonLinesSink
// ---------------------------------------------------------------------------

/// Writes each record as a single JSON line.
///
/// Run-level errors become `{"error": "..."}` lines so nothing is lost.
pub struct JsonLinesSink<W: Write + Send> {
    out: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_line(&self, value: &impl Serialize) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let written = serde_json::to_writer(&mut *out, value)
            .map_err(std::io::Error::from)
            .and_then(|_| out.write_all(b"\n"))
            .and_then(|_| out.flush());
        if let Err(e) = written {
            log::warn!("sink: failed to write json line: {e}");
        }
    }
}

impl<W: Write + Send> ResultSink for JsonLinesSink<W> {
    fn emit(&self, batch: &[ResultRecord]) {
        for record in batch {
            self.write_line(record);
        }
    }

    fn report(&self, error: &PipelineError) {
        log::error!("pipeline: run aborted: {error}");
        self.write_line(&serde_json::json!({ "error": error.to_string() }));
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Collects batches and errors in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Vec<ResultRecord>>>,
    errors: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<Vec<ResultRecord>> {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultSink for MemorySink {
    fn emit(&self, batch: &[ResultRecord]) {
        self.batches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(batch.to_vec());
    }

    fn report(&self, error: &PipelineError) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureError;

    fn records() -> Vec<ResultRecord> {
        vec![
            ResultRecord {
                index: 1,
                original: "привет".into(),
                outcome: TranslationOutcome::Translated("hello".into()),
            },
            ResultRecord {
                index: 3,
                original: "пока".into(),
                outcome: TranslationOutcome::Failed("HTTP request failed: refused".into()),
            },
        ]
    }

    #[test]
    fn json_lines_one_object_per_record() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.emit(&records());
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["index"], 1);
        assert_eq!(first["original"], "привет");
        assert_eq!(first["outcome"]["status"], "translated");
        assert_eq!(first["outcome"]["text"], "hello");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["outcome"]["status"], "failed");
    }

    #[test]
    fn json_lines_reports_errors() {
        let sink = JsonLinesSink::new(Vec::new());
        sink.report(&PipelineError::Capture(CaptureError::Backend("denied".into())));
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert!(value["error"].as_str().unwrap().contains("denied"));
    }

    #[test]
    fn memory_sink_keeps_batches_in_order() {
        let sink = MemorySink::new();
        sink.emit(&records());
        sink.emit(&[]);
        let batches = sink.batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0], records());
        assert!(batches[1].is_empty());
    }

    #[test]
    fn log_sink_reports_empty_batch() {
        assert_eq!(
            LogSink::render(&[]),
            vec![(log::Level::Info, "No readable messages found.".to_string())]
        );
    }

    #[test]
    fn log_sink_renders_successes_and_failures() {
        let lines = LogSink::render(&records());
        let text: Vec<&str> = lines.iter().map(|(_, l)| l.as_str()).collect();

        assert_eq!(text[1], "TRANSLATION RESULTS");
        assert_eq!(text[0], text[text.len() - 1]);
        assert!(text.contains(&"Message 1:"));
        assert!(text.contains(&"   Original:   привет"));
        assert!(text.contains(&"   Translated: hello"));
        assert!(text.contains(&"   Original text: пока"));
        assert!(!text.contains(&"Message 3:"));

        let errors: Vec<&str> = lines
            .iter()
            .filter(|(level, _)| *level == log::Level::Error)
            .map(|(_, l)| l.as_str())
            .collect();
        assert_eq!(
            errors,
            vec!["Translation failed for message 3: HTTP request failed: refused"]
        );
    }

    #[test]
    fn outcome_is_ok() {
        assert!(TranslationOutcome::Translated("x".into()).is_ok());
        assert!(!TranslationOutcome::Failed("x".into()).is_ok());
    }
}
