//! Core recognition trait, fragment type and error enum.
//!
//! # Overview
//!
//! [`RecognitionEngine`] is the public interface used by the pipeline.  It is
//! object-safe and `Send + Sync` so it can be held behind an
//! `Arc<dyn RecognitionEngine>` and called from the blocking thread pool.
//!
//! [`UnavailableEngine`] stands in when initialisation failed for good: it
//! reports "not ready", so triggers are ignored instead of erroring.
//!
//! [`MockEngine`] (available under `#[cfg(test)]`) returns a pre-configured
//! fragment list, which keeps pipeline tests free of a real OCR install.

use image::RgbaImage;
use thiserror::Error;

// ---------------------------------------------------------------------------
// OcrError
// ---------------------------------------------------------------------------

/// All errors that can arise from the OCR subsystem.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// The engine could not be brought up, even after the fallback attempt.
    #[error("OCR initialisation failed: {0}")]
    Initialization(String),

    /// The engine does not offer an accelerated mode on this machine.
    #[error("accelerated OCR is not available: {0}")]
    AccelerationUnavailable(String),

    /// The engine was asked to recognise text before it was ready.
    #[error("OCR engine is not ready")]
    NotReady,

    /// Recognition of a captured frame failed.
    #[error("recognition failed: {0}")]
    Recognition(String),
}

// ---------------------------------------------------------------------------
// Point / TextFragment
// ---------------------------------------------------------------------------

/// A polygon vertex in capture-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One OCR-detected text span.
///
/// `polygon` is expected in clockwise order starting at the top-left corner:
/// top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub polygon: Vec<Point>,
    pub text: String,
    /// Recognition confidence in `[0, 1]`.
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(polygon: Vec<Point>, text: impl Into<String>, confidence: f32) -> Self {
        Self {
            polygon,
            text: text.into(),
            confidence,
        }
    }

    /// Axis-aligned quad from a `left, top, width, height` box.
    pub fn from_box(
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        text: impl Into<String>,
        confidence: f32,
    ) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self::new(
            vec![
                Point::new(left, top),
                Point::new(right, top),
                Point::new(right, bottom),
                Point::new(left, bottom),
            ],
            text,
            confidence,
        )
    }
}

// ---------------------------------------------------------------------------
// RecognitionEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for OCR engines.
///
/// # Contract
///
/// - Fragments come back in whatever order the engine emits them; callers
///   must not rely on reading order.
/// - `is_ready` must be cheap: the orchestrator checks it on every trigger.
pub trait RecognitionEngine: Send + Sync {
    /// Detect and recognise all text spans in `frame`.
    fn recognize(&self, frame: &RgbaImage) -> Result<Vec<TextFragment>, OcrError>;

    /// Whether the engine can accept work.
    fn is_ready(&self) -> bool {
        true
    }
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn RecognitionEngine>) {}
};

// ---------------------------------------------------------------------------
// UnavailableEngine
// ---------------------------------------------------------------------------

/// Placeholder engine used when OCR failed to initialise.
#[derive(Debug, Clone)]
pub struct UnavailableEngine {
    pub reason: String,
}

impl RecognitionEngine for UnavailableEngine {
    fn recognize(&self, _frame: &RgbaImage) -> Result<Vec<TextFragment>, OcrError> {
        Err(OcrError::NotReady)
    }

    fn is_ready(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// MockEngine (test only)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub struct MockEngine {
    response: Result<Vec<TextFragment>, OcrError>,
    ready: bool,
}

#[cfg(test)]
impl MockEngine {
    pub fn ok(fragments: Vec<TextFragment>) -> Self {
        Self {
            response: Ok(fragments),
            ready: true,
        }
    }

    pub fn err(message: &str) -> Self {
        Self {
            response: Err(OcrError::Recognition(message.into())),
            ready: true,
        }
    }

    pub fn not_ready() -> Self {
        Self {
            response: Ok(Vec::new()),
            ready: false,
        }
    }
}

#[cfg(test)]
impl RecognitionEngine for MockEngine {
    fn recognize(&self, _frame: &RgbaImage) -> Result<Vec<TextFragment>, OcrError> {
        self.response.clone()
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}
