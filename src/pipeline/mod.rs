//! Pipeline orchestrator module.
//!
//! Wires capture → OCR → line clustering → noise filter → translation and
//! hands each run's ordered results to a [`ResultSink`].
//!
//! # Architecture
//!
//! ```text
//! stdin ("c")  ──┐
//!                ├─ Trigger (mpsc) ─▶ PipelineOrchestrator::run()  ← tokio task
//! HotkeyPoller ──┘                          │ one task per trigger
//!                                           ▼
//!                               PipelineOrchestrator::trigger()
//!                                           │
//!                         RunGuard (SharedRunState) ─ busy → dropped
//!                                           │
//!            spawn_blocking(grab) → spawn_blocking(recognize)
//!                 → LineClusterer → filter_messages → Translator × N
//!                                           │
//!                                           ▼
//!                                  ResultSink::emit(batch)
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use chat_translator::capture::{CaptureRegion, RegionHandle, ScreenCapture};
//! use chat_translator::config::AppConfig;
//! use chat_translator::ocr::UnavailableEngine;
//! use chat_translator::pipeline::{LogSink, PipelineOrchestrator, Trigger};
//! use chat_translator::translate::build_translator;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let region = RegionHandle::new(CaptureRegion::default_chat_area(1920, 1080), None);
//!
//!     let orchestrator = Arc::new(PipelineOrchestrator::new(
//!         region,
//!         Arc::new(ScreenCapture::new()),
//!         Arc::new(UnavailableEngine { reason: "no OCR in this example".into() }),
//!         build_translator(&config.translator),
//!         Arc::new(LogSink),
//!     ));
//!
//!     let (trigger_tx, trigger_rx) = mpsc::channel(4);
//!     tokio::spawn(Arc::clone(&orchestrator).run(trigger_rx));
//!     trigger_tx.send(Trigger::Manual).await.unwrap();
//! }
//! ```

pub mod runner;
pub mod sink;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{
    IgnoreReason, PipelineError, PipelineOrchestrator, RunSummary, Trigger, TriggerOutcome,
};
pub use sink::{JsonLinesSink, LogSink, MemorySink, ResultRecord, ResultSink, TranslationOutcome};
pub use state::{RunGuard, RunState, SharedRunState};
