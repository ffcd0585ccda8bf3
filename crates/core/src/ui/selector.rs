//! The area-selection overlay.
//!
//! A fullscreen, borderless, topmost surface showing the snapshot that was
//! grabbed *before* the overlay appeared, so the overlay never shows up in
//! the crop. The shell constructs an [`AreaSelector`] with that snapshot and
//! calls [`AreaSelector::show`] every frame until [`AreaSelector::is_closed`]
//! turns true; the overlay viewport exists only while `show` is being called,
//! so teardown is unconditional on both the commit and cancel paths.

use super::rendering::{draw_selection_border, draw_selection_overlay};
use super::selection::{DragState, PointerUpdate, SelectionEvent};
use crate::image_processing;
use eframe::egui;
use image::DynamicImage;
use std::sync::Arc;

const OVERLAY_DIM_ALPHA: u8 = 150;
const HINT_TEXT: &str = "Click and drag to select an area. Press ESC to cancel.";

/// Interactive state of the overlay while it is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Overlay visible, no button held.
    Idle,
    /// Primary button held, rectangle live-updating.
    Dragging,
    /// Finished (committed or cancelled); viewport is being torn down.
    Closed,
}

/// Owns one overlay surface and produces at most one cropped image.
pub struct AreaSelector {
    snapshot: Arc<DynamicImage>,
    color_image: Option<egui::ColorImage>,
    texture: Option<egui::TextureHandle>,
    drag: DragState,
    phase: Phase,
    crop: Option<DynamicImage>,
}

impl AreaSelector {
    /// Wraps a pre-grabbed screen snapshot.
    ///
    /// The expensive RGBA conversion happens here, before the first frame,
    /// so the overlay appears without a visible stall.
    pub fn new(snapshot: Arc<DynamicImage>) -> Self {
        let buffer = snapshot.to_rgba8();
        let size = [snapshot.width() as usize, snapshot.height() as usize];
        let pixels = buffer.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());

        Self {
            snapshot,
            color_image: Some(color_image),
            texture: None,
            drag: DragState::default(),
            phase: Phase::Idle,
            crop: None,
        }
    }

    /// Whether the overlay has finished (committed or cancelled).
    pub fn is_closed(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// The committed crop, if the user confirmed a large-enough rectangle.
    pub fn take_crop(&mut self) -> Option<DynamicImage> {
        self.crop.take()
    }

    /// Runs the overlay viewport for this frame.
    ///
    /// Must be called from the owning window's `update` every frame until
    /// the selector reports closed; the viewport disappears as soon as it
    /// stops being shown.
    pub fn show(&mut self, ctx: &egui::Context) {
        let builder = egui::ViewportBuilder::default()
            .with_title("Select area")
            .with_fullscreen(true)
            .with_decorations(false)
            .with_always_on_top();

        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("askshot_area_selector"),
            builder,
            |ctx, _class| {
                self.overlay_ui(ctx);
            },
        );
    }

    fn overlay_ui(&mut self, ctx: &egui::Context) {
        // Upload the snapshot texture on the first frame
        if self.texture.is_none()
            && let Some(color_image) = self.color_image.take()
        {
            self.texture =
                Some(ctx.load_texture("overlay_snapshot", color_image, egui::TextureOptions::LINEAR));
        }

        let panel_frame = egui::Frame::default()
            .inner_margin(egui::Margin::ZERO)
            .outer_margin(egui::Margin::ZERO);

        egui::CentralPanel::default()
            .frame(panel_frame)
            .show(ctx, |ui| {
                let surface = ui.max_rect();

                if let Some(texture) = &self.texture {
                    ui.painter().image(
                        texture.id(),
                        surface,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        egui::Color32::WHITE,
                    );
                }

                if self.phase != Phase::Closed {
                    let response = ui.interact(surface, ui.id(), egui::Sense::drag());
                    self.handle_drag(&response, surface.size());
                }

                // Escape cancels from any state
                if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                    self.drag.cancel();
                    self.phase = Phase::Closed;
                }

                // External close (window manager) counts as cancel too
                if ctx.input(|i| i.viewport().close_requested()) {
                    self.drag.cancel();
                    self.phase = Phase::Closed;
                }

                if let Some(live) = self.drag.active_rect() {
                    draw_selection_overlay(ui.painter(), surface, live, OVERLAY_DIM_ALPHA);
                    draw_selection_border(ui.painter(), live, 2.0, egui::Color32::WHITE);
                } else {
                    ui.painter().text(
                        egui::pos2(surface.center().x, 50.0),
                        egui::Align2::CENTER_CENTER,
                        HINT_TEXT,
                        egui::FontId::proportional(16.0),
                        egui::Color32::WHITE,
                    );
                }
            });

        if self.phase == Phase::Closed {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    fn handle_drag(&mut self, response: &egui::Response, ui_size: egui::Vec2) {
        let pointer = response.interact_pointer_pos();

        let update = if response.drag_started() {
            pointer.map(PointerUpdate::Pressed)
        } else if response.dragged() {
            pointer.map(PointerUpdate::Moved)
        } else if response.drag_stopped() {
            // The pointer may already be gone on release; fall back to the
            // last position the drag saw.
            pointer.or(self.drag.current_pos()).map(PointerUpdate::Released)
        } else {
            None
        };

        let Some(update) = update else { return };

        match self.drag.apply(update) {
            SelectionEvent::Started => self.phase = Phase::Dragging,
            SelectionEvent::Dragging => {}
            SelectionEvent::Committed(rect) => {
                match image_processing::crop_to_selection(&self.snapshot, rect, ui_size) {
                    Ok(cropped) => self.crop = Some(cropped),
                    // A selection that maps to zero pixels is dropped the
                    // same way a sub-threshold one is.
                    Err(e) => log::debug!("selection produced no crop: {}", e),
                }
                self.phase = Phase::Closed;
            }
            SelectionEvent::Dropped => {
                // Below the minimum size: close silently, no callback.
                self.phase = Phase::Closed;
            }
            SelectionEvent::None => {}
        }
    }
}
