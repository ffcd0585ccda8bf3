//! Image cropping, encoding and on-disk persistence.
//!
//! The overlay reports selections in UI points while the captured image may
//! be at a higher pixel resolution (HiDPI), so cropping first maps the
//! selection into image coordinates, then clamps it to the image bounds.

use crate::error::{AppError, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use chrono::Local;
use eframe::egui;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::PathBuf;

/// How a capture was produced; decides the output file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureMode {
    FullScreen,
    Area,
}

impl CaptureMode {
    fn file_stem(&self) -> &'static str {
        match self {
            CaptureMode::FullScreen => "screenshot",
            CaptureMode::Area => "screenshot_area",
        }
    }
}

/// Crops `original` to the region selected in UI coordinates.
///
/// `ui_size` is the size of the surface the selection was drawn on; the
/// ratio between it and the image dimensions gives the HiDPI scale.
///
/// # Errors
///
/// [`AppError::EmptySelection`] if the mapped region has zero area after
/// clamping; [`AppError::ImageProcessing`] for degenerate UI sizes.
pub fn crop_to_selection(
    original: &DynamicImage,
    selection: egui::Rect,
    ui_size: egui::Vec2,
) -> Result<DynamicImage> {
    if ui_size.x <= 0.0 || ui_size.y <= 0.0 {
        return Err(AppError::image("Overlay surface has zero size"));
    }

    let scale_x = original.width() as f32 / ui_size.x;
    let scale_y = original.height() as f32 / ui_size.y;

    let x = (selection.min.x * scale_x).max(0.0) as u32;
    let y = (selection.min.y * scale_y).max(0.0) as u32;

    let mut width = (selection.width() * scale_x) as u32;
    let mut height = (selection.height() * scale_y) as u32;

    // Clamp to image bounds
    if x + width > original.width() {
        width = original.width().saturating_sub(x);
    }
    if y + height > original.height() {
        height = original.height().saturating_sub(y);
    }

    if width == 0 || height == 0 {
        return Err(AppError::EmptySelection);
    }

    Ok(original.crop_imm(x, y, width, height))
}

/// Encodes an image as PNG and returns the base64 string the providers embed.
pub fn encode_png_base64(image: &DynamicImage) -> Result<String> {
    let mut buffer: Vec<u8> = Vec::new();
    let mut cursor = Cursor::new(&mut buffer);

    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| AppError::image(format!("Failed to encode image: {}", e)))?;

    Ok(BASE64.encode(buffer))
}

/// File name for a capture: `screenshot_<ts>.png` or `screenshot_area_<ts>.png`.
pub fn capture_filename(mode: CaptureMode, timestamp: &str) -> String {
    format!("{}_{}.png", mode.file_stem(), timestamp)
}

/// Writes the capture to the working directory and returns its path.
pub fn save_capture(image: &DynamicImage, mode: CaptureMode) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let path = PathBuf::from(capture_filename(mode, &timestamp));

    image
        .save_with_format(&path, ImageFormat::Png)
        .map_err(|e| AppError::image(format!("Failed to save screenshot: {}", e)))?;

    Ok(path)
}

/// Aspect-preserving fit of `(width, height)` into `(max_width, max_height)`.
///
/// Never returns a zero dimension.
pub fn fit_preview(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (1, 1);
    }

    let scale_x = max_width as f32 / width as f32;
    let scale_y = max_height as f32 / height as f32;
    let scale = scale_x.min(scale_y);

    let fitted_w = ((width as f32 * scale) as u32).max(1);
    let fitted_h = ((height as f32 * scale) as u32).max(1);
    (fitted_w, fitted_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn checker(width: u32, height: u32) -> DynamicImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn crop_maps_ui_points_one_to_one_at_native_scale() {
        let image = checker(800, 600);
        let selection =
            egui::Rect::from_min_max(egui::pos2(100.0, 100.0), egui::pos2(250.0, 300.0));
        let cropped =
            crop_to_selection(&image, selection, egui::vec2(800.0, 600.0)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (150, 200));
    }

    #[test]
    fn crop_scales_for_hidpi_capture() {
        // 2x capture: 1600x1200 image shown on an 800x600 surface
        let image = checker(1600, 1200);
        let selection = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(400.0, 300.0));
        let cropped =
            crop_to_selection(&image, selection, egui::vec2(800.0, 600.0)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (800, 600));
    }

    #[test]
    fn crop_clamps_to_image_bounds() {
        let image = checker(200, 200);
        let selection =
            egui::Rect::from_min_max(egui::pos2(150.0, 150.0), egui::pos2(400.0, 400.0));
        let cropped =
            crop_to_selection(&image, selection, egui::vec2(200.0, 200.0)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (50, 50));
    }

    #[test]
    fn zero_area_selection_is_rejected() {
        let image = checker(200, 200);
        let selection =
            egui::Rect::from_min_max(egui::pos2(50.0, 50.0), egui::pos2(50.0, 50.0));
        let result = crop_to_selection(&image, selection, egui::vec2(200.0, 200.0));
        assert!(matches!(result, Err(AppError::EmptySelection)));
    }

    #[test]
    fn png_base64_decodes_back_to_valid_png() {
        let image = checker(16, 16);
        let encoded = encode_png_base64(&image).unwrap();
        let bytes = BASE64.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 16));
    }

    #[test]
    fn capture_filenames_follow_mode_and_timestamp() {
        assert_eq!(
            capture_filename(CaptureMode::FullScreen, "20260829_120000"),
            "screenshot_20260829_120000.png"
        );
        assert_eq!(
            capture_filename(CaptureMode::Area, "20260829_120000"),
            "screenshot_area_20260829_120000.png"
        );
    }

    #[test]
    fn preview_fit_preserves_aspect_ratio() {
        // wide image bound by width
        assert_eq!(fit_preview(400, 100, 200, 150), (200, 50));
        // tall image bound by height
        assert_eq!(fit_preview(100, 300, 200, 150), (50, 150));
        // degenerate input stays non-zero
        assert_eq!(fit_preview(0, 0, 200, 150), (1, 1));
    }
}
