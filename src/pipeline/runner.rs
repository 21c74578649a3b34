//! Pipeline orchestrator: drives capture → OCR → cluster → filter →
//! translate → emit for one trigger at a time.
//!
//! [`PipelineOrchestrator`] is shared as `Arc` between the manual trigger and
//! the hotkey loop.  Both end up in [`trigger`](PipelineOrchestrator::trigger).
//!
//! # Pipeline flow
//!
//! ```text
//! Trigger (manual / hotkey)
//!   ├─ engines not ready      → Ignored(NotReady)     (silent)
//!   ├─ run already active     → Ignored(Busy)         (dropped, not queued)
//!   └─ RunGuard acquired
//!        ├─ spawn_blocking(capture.grab)        [Capturing]   ─Err→ Aborted
//!        ├─ spawn_blocking(engine.recognize)    [Recognizing] ─Err→ Aborted
//!        ├─ LineClusterer::cluster              [Clustering]
//!        ├─ filter_messages                     [Filtering]
//!        ├─ translator.translate per message    [Translating] ─Err→ record only
//!        └─ sink.emit(batch)                    [Emitting]
//!   guard dropped → Idle
//! ```
//!
//! Capture and recognition are pushed onto `tokio::task::spawn_blocking` so
//! the runtime never stalls; translations are awaited one after another.

use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::capture::{CaptureError, CaptureService, RegionHandle};
use crate::ocr::{OcrError, RecognitionEngine, TextFragment};
use crate::text::{filter_messages, LineClusterer, NumberedMessage};
use crate::translate::Translator;

use super::sink::{ResultRecord, ResultSink, TranslationOutcome};
use super::state::{RunGuard, RunState, SharedRunState};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Failures that abort a whole run.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("text recognition failed: {0}")]
    Recognition(#[from] OcrError),

    /// A blocking stage panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// Trigger / TriggerOutcome
// ---------------------------------------------------------------------------

/// Where a run request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    Hotkey,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Manual => f.write_str("manual"),
            Trigger::Hotkey => f.write_str("hotkey"),
        }
    }
}

/// Why a trigger did not start a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// OCR or translator is not ready yet (or failed to start).
    NotReady,
    /// Another run is in flight.
    Busy,
}

/// Counters for a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub fragments: usize,
    pub lines: usize,
    pub messages: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// What a call to [`PipelineOrchestrator::trigger`] did.
#[derive(Debug)]
pub enum TriggerOutcome {
    Completed(RunSummary),
    Aborted(PipelineError),
    Ignored(IgnoreReason),
}

// ---------------------------------------------------------------------------
// PipelineRun
// ---------------------------------------------------------------------------

/// Everything one run accumulates between trigger and emit.
#[derive(Debug, Default)]
struct PipelineRun {
    fragments: Vec<TextFragment>,
    lines: Vec<String>,
    messages: Vec<NumberedMessage>,
    records: Vec<ResultRecord>,
}

impl PipelineRun {
    fn summary(&self, started: Instant) -> RunSummary {
        RunSummary {
            fragments: self.fragments.len(),
            lines: self.lines.len(),
            messages: self.messages.len(),
            failed: self.records.iter().filter(|r| !r.outcome.is_ok()).count(),
            elapsed: started.elapsed(),
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Drives the capture-to-translation pipeline with a single-flight guard.
pub struct PipelineOrchestrator {
    state: SharedRunState,
    region: RegionHandle,
    capture: Arc<dyn CaptureService>,
    engine: Arc<dyn RecognitionEngine>,
    translator: Arc<dyn Translator>,
    sink: Arc<dyn ResultSink>,
    clusterer: LineClusterer,
    target_language: String,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `region`: shared capture region, read once per run.
    /// * `capture`: screen grabber (e.g. `ScreenCapture`).
    /// * `engine`: OCR engine (e.g. `TesseractEngine`).
    /// * `translator`: per-message translator.
    /// * `sink`: receives one batch per completed run.
    pub fn new(
        region: RegionHandle,
        capture: Arc<dyn CaptureService>,
        engine: Arc<dyn RecognitionEngine>,
        translator: Arc<dyn Translator>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            state: SharedRunState::new(),
            region,
            capture,
            engine,
            translator,
            sink,
            clusterer: LineClusterer::default(),
            target_language: "en".into(),
        }
    }

    pub fn with_clusterer(mut self, clusterer: LineClusterer) -> Self {
        self.clusterer = clusterer;
        self
    }

    pub fn with_target_language(mut self, language: impl Into<String>) -> Self {
        self.target_language = language.into();
        self
    }

    /// Handle to the run state, for status display.
    pub fn state(&self) -> SharedRunState {
        self.state.clone()
    }

    /// `true` when both OCR and the translator accept work.
    pub fn is_ready(&self) -> bool {
        self.engine.is_ready() && self.translator.is_ready()
    }

    // -----------------------------------------------------------------------
    // Dispatch loop
    // -----------------------------------------------------------------------

    /// Spawn a run for every trigger received until `trigger_rx` closes.
    ///
    /// Each trigger gets its own task so that one arriving mid-run hits the
    /// guard and is dropped rather than waiting in the channel.
    pub async fn run(self: Arc<Self>, mut trigger_rx: mpsc::Receiver<Trigger>) {
        while let Some(trigger) = trigger_rx.recv().await {
            let orchestrator = Arc::clone(&self);
            tokio::spawn(async move {
                orchestrator.trigger(trigger).await;
            });
        }

        log::info!("pipeline: trigger channel closed, orchestrator shutting down");
    }

    // -----------------------------------------------------------------------
    // Entry point
    // -----------------------------------------------------------------------

    /// Run the pipeline once, unless not ready or already running.
    pub async fn trigger(&self, trigger: Trigger) -> TriggerOutcome {
        if !self.is_ready() {
            log::debug!("pipeline: {trigger} trigger ignored, engines not ready");
            return TriggerOutcome::Ignored(IgnoreReason::NotReady);
        }

        let Some(guard) = RunGuard::acquire(&self.state) else {
            log::debug!("pipeline: {trigger} trigger dropped, run already active");
            return TriggerOutcome::Ignored(IgnoreReason::Busy);
        };

        log::info!("pipeline: {trigger} trigger, capturing");
        let started = Instant::now();

        match self.execute(&guard).await {
            Ok(run) => {
                let summary = run.summary(started);
                log::info!(
                    "pipeline: run finished in {:.2?} ({} frags, {} lines, {} msgs, {} failed)",
                    summary.elapsed,
                    summary.fragments,
                    summary.lines,
                    summary.messages,
                    summary.failed
                );
                TriggerOutcome::Completed(summary)
            }
            Err(e) => {
                self.sink.report(&e);
                TriggerOutcome::Aborted(e)
            }
        }
        // `guard` drops here → Idle
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    async fn execute(&self, guard: &RunGuard) -> Result<PipelineRun, PipelineError> {
        let mut run = PipelineRun::default();

        // ── 1. Capture (blocking → thread pool) ──────────────────────────
        let frame = self.capture_frame().await?;

        // ── 2. Recognise (blocking → thread pool) ────────────────────────
        guard.advance(RunState::Recognizing);
        run.fragments = self.recognize(frame).await?;
        if run.fragments.is_empty() {
            log::info!("pipeline: no text detected in capture area");
        }

        // ── 3. Cluster ───────────────────────────────────────────────────
        guard.advance(RunState::Clustering);
        run.lines = self.clusterer.cluster(&run.fragments);

        // ── 4. Filter ────────────────────────────────────────────────────
        guard.advance(RunState::Filtering);
        run.messages = filter_messages(&run.lines);

        // ── 5. Translate, one message at a time ──────────────────────────
        guard.advance(RunState::Translating);
        run.records = Vec::with_capacity(run.messages.len());
        for message in &run.messages {
            let outcome = match self
                .translator
                .translate(&message.text, &self.target_language)
                .await
            {
                Ok(text) => TranslationOutcome::Translated(text),
                Err(e) => {
                    log::warn!(
                        "pipeline: translation failed for message {}: {e}",
                        message.index
                    );
                    TranslationOutcome::Failed(e.to_string())
                }
            };
            run.records.push(ResultRecord {
                index: message.index,
                original: message.text.clone(),
                outcome,
            });
        }

        // ── 6. Emit ──────────────────────────────────────────────────────
        guard.advance(RunState::Emitting);
        self.sink.emit(&run.records);

        Ok(run)
    }

    async fn capture_frame(&self) -> Result<RgbaImage, PipelineError> {
        let region = self.region.snapshot();
        let capture = Arc::clone(&self.capture);

        let frame = tokio::task::spawn_blocking(move || capture.grab(&region))
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))??;
        Ok(frame)
    }

    async fn recognize(&self, frame: RgbaImage) -> Result<Vec<TextFragment>, PipelineError> {
        let engine = Arc::clone(&self.engine);

        let fragments = tokio::task::spawn_blocking(move || engine.recognize(&frame))
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))??;
        Ok(fragments)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
