//! Selection geometry and drag state.
//!
//! Pure logic for the area-selection overlay: the drag state machine, the
//! minimum-size rule and rectangle normalization. Kept free of egui widget
//! state so the drag scenarios can be tested directly.

use eframe::egui;

/// A drag must exceed this many points on BOTH axes to produce a crop.
pub const MIN_SELECTION_PX: f32 = 10.0;

/// Whether a completed drag is large enough to commit.
///
/// Matches the per-axis rule: `|Δx| > 10 && |Δy| > 10`, strictly greater.
pub fn is_valid_selection(start: egui::Pos2, end: egui::Pos2) -> bool {
    (end.x - start.x).abs() > MIN_SELECTION_PX && (end.y - start.y).abs() > MIN_SELECTION_PX
}

/// Normalizes two drag corners into a top-left/bottom-right rectangle.
///
/// Corners are clamped to non-negative coordinates first, so a drag that
/// leaves the surface can never produce a negative origin.
pub fn normalize_selection(a: egui::Pos2, b: egui::Pos2) -> egui::Rect {
    let a = egui::pos2(a.x.max(0.0), a.y.max(0.0));
    let b = egui::pos2(b.x.max(0.0), b.y.max(0.0));
    egui::Rect::from_two_pos(a, b)
}

/// A pointer event delivered to the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerUpdate {
    Pressed(egui::Pos2),
    Moved(egui::Pos2),
    Released(egui::Pos2),
}

/// What a pointer update produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    /// A new drag was anchored.
    Started,
    /// The live rectangle moved.
    Dragging,
    /// The drag finished above the minimum size; holds the normalized rect.
    Committed(egui::Rect),
    /// The drag finished below the minimum size; silently dropped.
    Dropped,
    /// Nothing relevant happened.
    None,
}

/// Drag state for the overlay: `Idle` when `start` is empty, `Dragging`
/// while it holds the anchor point.
#[derive(Debug, Default, Clone, Copy)]
pub struct DragState {
    start: Option<egui::Pos2>,
    current: Option<egui::Pos2>,
}

impl DragState {
    /// Last known pointer position of an in-progress drag.
    pub fn current_pos(&self) -> Option<egui::Pos2> {
        self.current
    }

    /// The live rectangle during a drag, if one is in progress.
    pub fn active_rect(&self) -> Option<egui::Rect> {
        match (self.start, self.current) {
            (Some(start), Some(current)) => Some(normalize_selection(start, current)),
            _ => None,
        }
    }

    /// Discards any in-progress drag (cancel path).
    pub fn cancel(&mut self) {
        self.start = None;
        self.current = None;
    }

    /// Folds one pointer update into the state machine.
    pub fn apply(&mut self, update: PointerUpdate) -> SelectionEvent {
        match update {
            PointerUpdate::Pressed(pos) => {
                self.start = Some(pos);
                self.current = Some(pos);
                SelectionEvent::Started
            }
            PointerUpdate::Moved(pos) => {
                if self.start.is_some() {
                    self.current = Some(pos);
                    SelectionEvent::Dragging
                } else {
                    SelectionEvent::None
                }
            }
            PointerUpdate::Released(pos) => {
                let Some(start) = self.start.take() else {
                    return SelectionEvent::None;
                };
                self.current = None;

                if is_valid_selection(start, pos) {
                    SelectionEvent::Committed(normalize_selection(start, pos))
                } else {
                    SelectionEvent::Dropped
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    fn run_drag(start: egui::Pos2, end: egui::Pos2) -> SelectionEvent {
        let mut state = DragState::default();
        assert_eq!(state.apply(PointerUpdate::Pressed(start)), SelectionEvent::Started);
        assert_eq!(state.apply(PointerUpdate::Moved(end)), SelectionEvent::Dragging);
        state.apply(PointerUpdate::Released(end))
    }

    #[test]
    fn large_drag_commits_the_normalized_rect() {
        let event = run_drag(pos2(100.0, 100.0), pos2(250.0, 300.0));
        let SelectionEvent::Committed(rect) = event else {
            panic!("expected commit, got {:?}", event);
        };
        assert_eq!(rect.min, pos2(100.0, 100.0));
        assert_eq!(rect.max, pos2(250.0, 300.0));
        assert_eq!(rect.width(), 150.0);
        assert_eq!(rect.height(), 200.0);
    }

    #[test]
    fn drag_direction_does_not_change_the_rect() {
        let down_right = run_drag(pos2(100.0, 100.0), pos2(250.0, 300.0));
        let up_left = run_drag(pos2(250.0, 300.0), pos2(100.0, 100.0));
        assert_eq!(down_right, up_left);
    }

    #[test]
    fn tiny_drag_is_silently_dropped() {
        // 5 x 2 points: both axes under the threshold
        assert_eq!(
            run_drag(pos2(100.0, 100.0), pos2(105.0, 102.0)),
            SelectionEvent::Dropped
        );
    }

    #[test]
    fn threshold_applies_per_axis_not_diagonally() {
        // wide but flat: |dy| = 5
        assert_eq!(
            run_drag(pos2(0.0, 0.0), pos2(200.0, 5.0)),
            SelectionEvent::Dropped
        );
        // tall but narrow: |dx| = 5
        assert_eq!(
            run_drag(pos2(0.0, 0.0), pos2(5.0, 200.0)),
            SelectionEvent::Dropped
        );
        // exactly 10 on one axis is still too small (strictly greater)
        assert_eq!(
            run_drag(pos2(0.0, 0.0), pos2(10.0, 200.0)),
            SelectionEvent::Dropped
        );
        // 11 x 11 passes
        assert!(matches!(
            run_drag(pos2(0.0, 0.0), pos2(11.0, 11.0)),
            SelectionEvent::Committed(_)
        ));
    }

    #[test]
    fn corners_are_clamped_to_non_negative_coordinates() {
        let rect = normalize_selection(pos2(-20.0, -5.0), pos2(100.0, 100.0));
        assert_eq!(rect.min, pos2(0.0, 0.0));
        assert_eq!(rect.max, pos2(100.0, 100.0));
    }

    #[test]
    fn cancel_discards_the_drag_and_release_is_inert_afterwards() {
        let mut state = DragState::default();
        state.apply(PointerUpdate::Pressed(pos2(10.0, 10.0)));
        state.apply(PointerUpdate::Moved(pos2(300.0, 300.0)));
        state.cancel();

        assert!(state.active_rect().is_none());
        assert_eq!(
            state.apply(PointerUpdate::Released(pos2(300.0, 300.0))),
            SelectionEvent::None
        );
    }

    #[test]
    fn moves_before_press_are_ignored() {
        let mut state = DragState::default();
        assert_eq!(
            state.apply(PointerUpdate::Moved(pos2(50.0, 50.0))),
            SelectionEvent::None
        );
        assert!(state.active_rect().is_none());
    }
}
