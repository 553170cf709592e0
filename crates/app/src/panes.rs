//! Split-pane geometry and the render-hint plumbing for the two panes.
//!
//! The panes themselves are opaque: the paper pane gets the PDF bytes plus a
//! fragment-style zoom hint, the app pane gets the markup bytes. This module
//! only decides where they go.

use eframe::egui;
use texhtml_model::Orientation;

pub const DIVIDER_THICKNESS: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneRects {
    pub first: egui::Rect,
    pub divider: egui::Rect,
    pub second: egui::Rect,
}

/// Splits the container into two panes and a divider strip. `split_percent`
/// is the share of the container extent allocated to the first pane.
pub fn split_rects(container: egui::Rect, orientation: Orientation, split_percent: u8) -> PaneRects {
    let fraction = split_percent as f32 / 100.0;
    let half = DIVIDER_THICKNESS / 2.0;

    match orientation {
        Orientation::Horizontal => {
            let divider_center = container.min.x + container.width() * fraction;
            PaneRects {
                first: egui::Rect::from_min_max(
                    container.min,
                    egui::pos2(divider_center - half, container.max.y),
                ),
                divider: egui::Rect::from_min_max(
                    egui::pos2(divider_center - half, container.min.y),
                    egui::pos2(divider_center + half, container.max.y),
                ),
                second: egui::Rect::from_min_max(
                    egui::pos2(divider_center + half, container.min.y),
                    container.max,
                ),
            }
        }
        Orientation::Vertical => {
            let divider_center = container.min.y + container.height() * fraction;
            PaneRects {
                first: egui::Rect::from_min_max(
                    container.min,
                    egui::pos2(container.max.x, divider_center - half),
                ),
                divider: egui::Rect::from_min_max(
                    egui::pos2(container.min.x, divider_center - half),
                    egui::pos2(container.max.x, divider_center + half),
                ),
                second: egui::Rect::from_min_max(
                    egui::pos2(container.min.x, divider_center + half),
                    container.max,
                ),
            }
        }
    }
}

/// Pointer offset along the split axis, measured from the container's
/// leading edge, plus the container extent along that axis.
pub fn pointer_offset_and_extent(
    container: egui::Rect,
    orientation: Orientation,
    pointer: egui::Pos2,
) -> (f32, f32) {
    match orientation {
        Orientation::Horizontal => (pointer.x - container.min.x, container.width()),
        Orientation::Vertical => (pointer.y - container.min.y, container.height()),
    }
}

pub fn resize_cursor(orientation: Orientation) -> egui::CursorIcon {
    match orientation {
        Orientation::Horizontal => egui::CursorIcon::ResizeHorizontal,
        Orientation::Vertical => egui::CursorIcon::ResizeVertical,
    }
}

/// The fragment-style parameter handed to the paper renderer alongside the
/// byte source, mirroring `#zoom=NNN` viewer URLs.
pub fn paper_zoom_fragment(zoom_percent: u16) -> String {
    format!("#zoom={zoom_percent}")
}
