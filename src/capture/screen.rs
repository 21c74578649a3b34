//! `xcap`-backed screen capture.
//!
//! The monitor containing the region's top-left corner is captured whole and
//! then cropped, so a region never spans two monitors.

use image::RgbaImage;
use xcap::Monitor;

use super::{CaptureError, CaptureRegion, CaptureService};

/// Production [`CaptureService`] using the `xcap` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenCapture;

impl ScreenCapture {
    pub fn new() -> Self {
        Self
    }
}

impl CaptureService for ScreenCapture {
    fn grab(&self, region: &CaptureRegion) -> Result<RgbaImage, CaptureError> {
        let monitor = Monitor::from_point(region.left, region.top)
            .map_err(|e| CaptureError::NoMonitor(e.to_string()))?;
        let origin_x = monitor
            .x()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;
        let origin_y = monitor
            .y()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        let shot = monitor
            .capture_image()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        let (x, y, w, h) = clip_to_monitor(region, origin_x, origin_y, shot.width(), shot.height())
            .ok_or(CaptureError::OutOfBounds(*region))?;

        log::debug!("capture: {w}x{h} at monitor offset ({x}, {y})");
        Ok(image::imageops::crop_imm(&shot, x, y, w, h).to_image())
    }
}

/// Width and height of the primary monitor, used for the default chat area.
pub fn primary_screen_size() -> Result<(u32, u32), CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::NoMonitor(e.to_string()))?;

    let mut first = None;
    for monitor in monitors {
        if monitor.is_primary().unwrap_or(false) {
            return monitor_size(&monitor);
        }
        if first.is_none() {
            first = Some(monitor);
        }
    }

    match first {
        Some(monitor) => monitor_size(&monitor),
        None => Err(CaptureError::NoMonitor("no monitors detected".into())),
    }
}

fn monitor_size(monitor: &Monitor) -> Result<(u32, u32), CaptureError> {
    let width = monitor
        .width()
        .map_err(|e| CaptureError::Backend(e.to_string()))?;
    let height = monitor
        .height()
        .map_err(|e| CaptureError::Backend(e.to_string()))?;
    Ok((width, height))
}

/// Intersect `region` with a monitor at (`origin_x`, `origin_y`) of the given
/// size.  Returns the crop rectangle relative to the monitor, or `None` when
/// the two do not overlap.
fn clip_to_monitor(
    region: &CaptureRegion,
    origin_x: i32,
    origin_y: i32,
    monitor_width: u32,
    monitor_height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let left = (region.left as i64 - origin_x as i64).max(0);
    let top = (region.top as i64 - origin_y as i64).max(0);
    let right = (region.right() - origin_x as i64).min(monitor_width as i64);
    let bottom = (region.bottom() - origin_y as i64).min(monitor_height as i64);

    if right <= left || bottom <= top {
        return None;
    }

    Some((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(left: i32, top: i32, width: u32, height: u32) -> CaptureRegion {
        CaptureRegion {
            left,
            top,
            width,
            height,
        }
    }

    #[test]
    fn region_inside_monitor_is_unchanged() {
        let r = region(0, 853, 453, 227);
        assert_eq!(clip_to_monitor(&r, 0, 0, 1920, 1080), Some((0, 853, 453, 227)));
    }

    #[test]
    fn region_is_translated_for_secondary_monitor() {
        let r = region(2000, 100, 300, 200);
        assert_eq!(
            clip_to_monitor(&r, 1920, 0, 1920, 1080),
            Some((80, 100, 300, 200))
        );
    }

    #[test]
    fn region_overhanging_edge_is_clipped() {
        let r = region(1800, 1000, 300, 200);
        assert_eq!(
            clip_to_monitor(&r, 0, 0, 1920, 1080),
            Some((1800, 1000, 120, 80))
        );
    }

    #[test]
    fn region_outside_monitor_is_rejected() {
        let r = region(5000, 5000, 100, 100);
        assert_eq!(clip_to_monitor(&r, 0, 0, 1920, 1080), None);
    }
}
