//! OCR module: turns a captured frame into unordered text fragments.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              RecognitionEngine (trait)                   │
//! │                                                          │
//! │  initialize_with_fallback ──▶ TesseractEngine            │
//! │     (accelerated, then cpu)      │                       │
//! │            │ fatal               ▼                       │
//! │            ▼               recognize(frame)              │
//! │     UnavailableEngine      → Vec<TextFragment>           │
//! │     (is_ready = false)                                   │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod engine;
pub mod init;
pub mod tesseract;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{OcrError, Point, RecognitionEngine, TextFragment, UnavailableEngine};
pub use init::{initialize_with_fallback, Initialized};
pub use tesseract::TesseractEngine;

#[cfg(test)]
pub use engine::MockEngine;
