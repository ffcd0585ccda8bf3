//! Screen capture.
//!
//! Thin wrapper over the `screenshots` crate. Capture failures (no display,
//! permission denied) surface as [`AppError::ScreenCapture`] so callers can
//! abort before showing any overlay.

use crate::error::{AppError, Result};
use image::DynamicImage;
use screenshots::Screen;

/// Enumerates monitors and grabs full-screen snapshots.
pub struct ScreenCapturer {
    screens: Vec<Screen>,
}

impl ScreenCapturer {
    /// Detects available monitors.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ScreenCapture`] if enumeration fails or no
    /// monitor is present.
    pub fn new() -> Result<Self> {
        let screens = Screen::all()
            .map_err(|e| AppError::capture(format!("Failed to enumerate screens: {}", e)))?;

        if screens.is_empty() {
            return Err(AppError::capture("No screens detected"));
        }

        Ok(Self { screens })
    }

    /// Human-readable monitor descriptions, one per monitor.
    pub fn list_monitors(&self) -> Vec<String> {
        self.screens
            .iter()
            .enumerate()
            .map(|(i, s)| {
                format!(
                    "Monitor {}: {}x{} (scale: {})",
                    i, s.display_info.width, s.display_info.height, s.display_info.scale_factor
                )
            })
            .collect()
    }

    /// Number of detected monitors.
    pub fn monitor_count(&self) -> usize {
        self.screens.len()
    }

    /// Captures the full contents of the monitor at `index`.
    ///
    /// # Errors
    ///
    /// [`AppError::ScreenNotFound`] for an out-of-range index,
    /// [`AppError::ScreenCapture`] when the grab itself fails.
    pub fn capture_monitor(&self, index: usize) -> Result<DynamicImage> {
        let screen = self
            .screens
            .get(index)
            .ok_or(AppError::ScreenNotFound(index))?;

        let captured = screen
            .capture()
            .map_err(|e| AppError::capture(format!("Failed to capture screen: {}", e)))?;

        let width = captured.width();
        let height = captured.height();
        let rgba = captured.into_raw();

        let buffer = image::ImageBuffer::from_raw(width, height, rgba)
            .ok_or_else(|| AppError::capture("Captured frame had unexpected length"))?;

        Ok(DynamicImage::ImageRgba8(buffer))
    }
}
