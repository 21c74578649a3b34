//! Capture rectangle and the shared handle the pipeline reads it through.
//!
//! [`CaptureRegion`] is plain data owned by configuration.  The pipeline only
//! ever sees a copy taken through [`RegionHandle::snapshot`] at the start of a
//! run, so a configuration change never lands in the middle of a capture.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest width or height accepted for a user-selected region, in pixels.
pub const MIN_REGION_SIDE: u32 = 50;

// ---------------------------------------------------------------------------
// RegionError
// ---------------------------------------------------------------------------

/// Rejection reasons for a user-selected capture region.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    #[error(
        "capture region {width}x{height} is smaller than the {min}x{min} minimum",
        min = MIN_REGION_SIDE
    )]
    TooSmall { width: u32, height: u32 },

    #[error("expected `left top width height`, got {0:?}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// CaptureRegion
// ---------------------------------------------------------------------------

/// Rectangle in absolute screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    /// Build a region, enforcing the minimum size for user selections.
    ///
    /// ```
    /// use chat_translator::capture::CaptureRegion;
    ///
    /// assert!(CaptureRegion::new(10, 20, 300, 120).is_ok());
    /// assert!(CaptureRegion::new(10, 20, 49, 120).is_err());
    /// ```
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Result<Self, RegionError> {
        let region = Self {
            left,
            top,
            width,
            height,
        };
        region.validate()?;
        Ok(region)
    }

    /// Check the 50×50 minimum.
    pub fn validate(&self) -> Result<(), RegionError> {
        if self.width < MIN_REGION_SIDE || self.height < MIN_REGION_SIDE {
            return Err(RegionError::TooSmall {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Default chat-box area for a screen of `screen_width` × `screen_height`.
    ///
    /// The box hugs the bottom-left corner: 23.6 % of the width, the bottom
    /// 21 % of the height, starting at 79 % down.
    pub fn default_chat_area(screen_width: u32, screen_height: u32) -> Self {
        let w = screen_width as f64;
        let h = screen_height as f64;
        Self {
            left: 0,
            top: (h * 0.79).round() as i32,
            width: (w * 0.236).round() as u32,
            height: (h * 0.21).round() as u32,
        }
    }

    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }
}

impl std::fmt::Display for CaptureRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.left, self.top
        )
    }
}

/// Parses `left top width height`, separated by spaces or commas, and
/// applies the minimum-size check.
///
/// ```
/// use chat_translator::capture::CaptureRegion;
///
/// let region: CaptureRegion = "0, 850, 450, 230".parse().unwrap();
/// assert_eq!(region.top, 850);
/// ```
impl std::str::FromStr for CaptureRegion {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || RegionError::Parse(s.to_string());
        let parts: Vec<&str> = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        let [left, top, width, height] = parts.as_slice() else {
            return Err(parse_err());
        };

        Self::new(
            left.parse().map_err(|_| parse_err())?,
            top.parse().map_err(|_| parse_err())?,
            width.parse().map_err(|_| parse_err())?,
            height.parse().map_err(|_| parse_err())?,
        )
    }
}

// ---------------------------------------------------------------------------
// RegionHandle
// ---------------------------------------------------------------------------

/// Shared, cheaply clonable handle to the active capture region.
///
/// Written only through [`set`](Self::set) / [`reset`](Self::reset) by
/// configuration code; read once per run by the orchestrator.
#[derive(Debug, Clone)]
pub struct RegionHandle {
    inner: Arc<RwLock<RegionSlot>>,
}

#[derive(Debug)]
struct RegionSlot {
    active: CaptureRegion,
    fallback: CaptureRegion,
    custom: bool,
}

impl RegionHandle {
    /// `fallback` is the region used when no custom selection is active.
    pub fn new(fallback: CaptureRegion, custom: Option<CaptureRegion>) -> Self {
        let slot = RegionSlot {
            active: custom.unwrap_or(fallback),
            fallback,
            custom: custom.is_some(),
        };
        Self {
            inner: Arc::new(RwLock::new(slot)),
        }
    }

    /// Copy of the region to capture right now.
    pub fn snapshot(&self) -> CaptureRegion {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active
    }

    /// `true` while a user-selected region is active.
    pub fn is_custom(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .custom
    }

    /// Replace the active region with a user selection.
    pub fn set(&self, region: CaptureRegion) -> Result<(), RegionError> {
        region.validate()?;
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        slot.active = region;
        slot.custom = true;
        log::info!("capture: region set to {region}");
        Ok(())
    }

    /// Drop the user selection and go back to the default area.
    pub fn reset(&self) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        slot.active = slot.fallback;
        slot.custom = false;
        log::info!("capture: region reset to default {}", slot.fallback);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_regions_below_minimum() {
        assert_eq!(
            CaptureRegion::new(0, 0, 49, 200),
            Err(RegionError::TooSmall {
                width: 49,
                height: 200
            })
        );
        assert!(CaptureRegion::new(0, 0, 200, 10).is_err());
        assert!(CaptureRegion::new(0, 0, 50, 50).is_ok());
    }

    #[test]
    fn default_chat_area_for_1080p() {
        let region = CaptureRegion::default_chat_area(1920, 1080);
        assert_eq!(region.left, 0);
        assert_eq!(region.top, 853);
        assert_eq!(region.width, 453);
        assert_eq!(region.height, 227);
    }

    #[test]
    fn handle_prefers_custom_region() {
        let fallback = CaptureRegion::default_chat_area(1920, 1080);
        let custom = CaptureRegion::new(100, 100, 400, 200).unwrap();
        let handle = RegionHandle::new(fallback, Some(custom));

        assert!(handle.is_custom());
        assert_eq!(handle.snapshot(), custom);
    }

    #[test]
    fn set_and_reset_round_trip() {
        let fallback = CaptureRegion::default_chat_area(1920, 1080);
        let handle = RegionHandle::new(fallback, None);
        let clone = handle.clone();

        let custom = CaptureRegion::new(5, 6, 300, 150).unwrap();
        handle.set(custom).unwrap();
        assert_eq!(clone.snapshot(), custom);

        clone.reset();
        assert!(!handle.is_custom());
        assert_eq!(handle.snapshot(), fallback);
    }

    #[test]
    fn set_rejects_small_region_and_keeps_previous() {
        let fallback = CaptureRegion::default_chat_area(1920, 1080);
        let handle = RegionHandle::new(fallback, None);

        let tiny = CaptureRegion {
            left: 0,
            top: 0,
            width: 10,
            height: 10,
        };
        assert!(handle.set(tiny).is_err());
        assert_eq!(handle.snapshot(), fallback);
    }

    #[test]
    fn parses_space_or_comma_separated_regions() {
        let expected = CaptureRegion::new(-1920, 800, 400, 200).unwrap();
        assert_eq!("-1920 800 400 200".parse::<CaptureRegion>(), Ok(expected));
        assert_eq!(" -1920, 800,400 ,200 ".parse::<CaptureRegion>(), Ok(expected));
    }

    #[test]
    fn rejects_malformed_region_strings() {
        for input in ["", "1 2 3", "1 2 3 4 5", "a b c d", "0 0 -5 100"] {
            assert!(
                matches!(input.parse::<CaptureRegion>(), Err(RegionError::Parse(_))),
                "{input:?} should not parse"
            );
        }
        assert!(matches!(
            "0 0 20 20".parse::<CaptureRegion>(),
            Err(RegionError::TooSmall { .. })
        ));
    }
}
