//! Drawing helpers for the selection overlay.

use eframe::egui;

/// The four rectangles that dim everything outside the selection.
///
/// Order: above, below, left, right. Together with the selection they tile
/// the whole surface without overlap.
pub fn cutout_regions(surface: egui::Rect, selection: egui::Rect) -> [egui::Rect; 4] {
    [
        // above
        egui::Rect::from_min_max(surface.min, egui::pos2(surface.max.x, selection.min.y)),
        // below
        egui::Rect::from_min_max(egui::pos2(surface.min.x, selection.max.y), surface.max),
        // left
        egui::Rect::from_min_max(
            egui::pos2(surface.min.x, selection.min.y),
            egui::pos2(selection.min.x, selection.max.y),
        ),
        // right
        egui::Rect::from_min_max(
            egui::pos2(selection.max.x, selection.min.y),
            egui::pos2(surface.max.x, selection.max.y),
        ),
    ]
}

/// Dims the surface around the selection, leaving the selection clear.
pub fn draw_selection_overlay(
    painter: &egui::Painter,
    surface: egui::Rect,
    selection: egui::Rect,
    alpha: u8,
) {
    let color = egui::Color32::from_black_alpha(alpha);
    for region in cutout_regions(surface, selection) {
        painter.rect_filled(region, 0.0, color);
    }
}

/// Draws the border around the live selection rectangle.
pub fn draw_selection_border(
    painter: &egui::Painter,
    selection: egui::Rect,
    stroke_width: f32,
    color: egui::Color32,
) {
    painter.rect_stroke(
        selection,
        0.0,
        egui::Stroke::new(stroke_width, color),
        egui::StrokeKind::Middle,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn cutout_regions_tile_the_surface_around_the_selection() {
        let surface = egui::Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0));
        let selection = egui::Rect::from_min_max(pos2(100.0, 100.0), pos2(300.0, 200.0));
        let [above, below, left, right] = cutout_regions(surface, selection);

        assert_eq!(above, egui::Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 100.0)));
        assert_eq!(below, egui::Rect::from_min_max(pos2(0.0, 200.0), pos2(800.0, 600.0)));
        assert_eq!(left, egui::Rect::from_min_max(pos2(0.0, 100.0), pos2(100.0, 200.0)));
        assert_eq!(right, egui::Rect::from_min_max(pos2(300.0, 100.0), pos2(800.0, 200.0)));

        let tiled: f32 = [above, below, left, right]
            .iter()
            .map(|r| r.area())
            .sum::<f32>()
            + selection.area();
        assert_eq!(tiled, surface.area());
    }
}
