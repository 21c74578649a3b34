//! Run state machine and the single-flight guard.
//!
//! [`RunState`] is process-wide and lives behind a `std::sync::Mutex`.  The
//! only way to leave `Idle` is [`RunGuard::acquire`]; the only way back is
//! dropping the guard.  While a guard exists every other `acquire` fails, so
//! at most one run is ever active.
//!
//! ```text
//! Idle ──acquire──▶ Capturing ─▶ Recognizing ─▶ Clustering ─▶ Filtering
//!                                                               │
//!  ▲                                                            ▼
//!  └──────────── drop(guard) ◀── Emitting ◀──────────── Translating
//!  (also on any abort)
//! ```

use std::sync::{Arc, Mutex, PoisonError};

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run active; triggers are accepted.
    #[default]
    Idle,
    Capturing,
    Recognizing,
    Clustering,
    Filtering,
    Translating,
    Emitting,
}

impl RunState {
    /// `true` for every state except `Idle`.
    ///
    /// ```
    /// use chat_translator::pipeline::RunState;
    ///
    /// assert!(!RunState::Idle.is_busy());
    /// assert!(RunState::Translating.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        !matches!(self, RunState::Idle)
    }

    /// A short human-readable label for status output.
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Idle => "Idle",
            RunState::Capturing => "Capturing",
            RunState::Recognizing => "Recognizing",
            RunState::Clustering => "Clustering",
            RunState::Filtering => "Filtering",
            RunState::Translating => "Translating",
            RunState::Emitting => "Emitting",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// SharedRunState
// ---------------------------------------------------------------------------

/// Thread-safe handle to the current [`RunState`].
///
/// Cheap to clone.  The lock is only ever held for a read or a single
/// assignment, never across `.await`.
#[derive(Debug, Clone, Default)]
pub struct SharedRunState {
    inner: Arc<Mutex<RunState>>,
}

impl SharedRunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> RunState {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// RunGuard
// ---------------------------------------------------------------------------

/// Exclusive right to drive one run.  Dropping it returns the state to Idle.
#[derive(Debug)]
pub struct RunGuard {
    state: SharedRunState,
}

impl RunGuard {
    /// Move `Idle → Capturing` and hand out the guard, or `None` if a run is
    /// already active.
    pub fn acquire(state: &SharedRunState) -> Option<Self> {
        let mut st = state.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if st.is_busy() {
            return None;
        }
        *st = RunState::Capturing;
        Some(Self {
            state: state.clone(),
        })
    }

    /// Move to the next stage.
    pub fn advance(&self, next: RunState) {
        let mut st = self
            .state
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        log::debug!("pipeline: {} → {}", *st, next);
        *st = next;
    }

    pub fn state(&self) -> RunState {
        self.state.current()
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut st = self
            .state
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *st = RunState::Idle;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
