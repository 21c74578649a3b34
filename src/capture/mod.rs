//! Screen capture: grabs the pixels of the configured chat region.
//!
//! # Overview
//!
//! [`CaptureService`] is the seam the pipeline talks to.  It is blocking and
//! `Send + Sync`, so the orchestrator holds it as `Arc<dyn CaptureService>`
//! and calls it from `tokio::task::spawn_blocking`.
//!
//! [`ScreenCapture`] is the production implementation backed by `xcap`.
//! Every call captures fresh; nothing is cached between runs.

pub mod region;
pub mod screen;

pub use region::{CaptureRegion, RegionError, RegionHandle, MIN_REGION_SIDE};
pub use screen::{primary_screen_size, ScreenCapture};

use image::RgbaImage;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors raised while grabbing the capture region.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// No monitor is attached or none could be enumerated.
    #[error("no monitor available: {0}")]
    NoMonitor(String),

    /// The region does not overlap the monitor it starts on.
    #[error("capture region {0} lies outside the screen")]
    OutOfBounds(CaptureRegion),

    /// The platform capture API failed.
    #[error("screen capture failed: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// CaptureService trait
// ---------------------------------------------------------------------------

/// Grabs an RGBA pixel buffer for a screen rectangle.
pub trait CaptureService: Send + Sync {
    fn grab(&self, region: &CaptureRegion) -> Result<RgbaImage, CaptureError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CaptureService>) {}
};
