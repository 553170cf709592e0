use crate::clamp_split;

/// Converts a pointer offset within the container into a divider position.
///
/// `offset_px` is measured along the split axis from the container's leading
/// edge; `extent_px` is the container's size along the same axis.
pub fn split_from_pointer(offset_px: f32, extent_px: f32) -> u8 {
    if extent_px <= 0.0 {
        return 50;
    }

    clamp_split(offset_px / extent_px * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
}

/// Two-state machine driving the divider: press starts a drag, every pointer
/// move while dragging yields a new split percent, release always returns to
/// idle regardless of where the pointer ended up.
#[derive(Debug, Clone, Copy, Default)]
pub struct DividerDrag {
    phase: DragPhase,
}

impl DividerDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    pub fn press(&mut self) {
        self.phase = DragPhase::Dragging;
    }

    /// Returns the new split percent while dragging, `None` when idle.
    pub fn pointer_moved(&mut self, offset_px: f32, extent_px: f32) -> Option<u8> {
        if self.phase != DragPhase::Dragging {
            return None;
        }

        Some(split_from_pointer(offset_px, extent_px))
    }

    pub fn release(&mut self) {
        self.phase = DragPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SPLIT_MAX, SPLIT_MIN};

    #[test]
    fn moves_while_idle_produce_no_split() {
        let mut drag = DividerDrag::new();
        assert_eq!(drag.pointer_moved(400.0, 1000.0), None);
    }

    #[test]
    fn drag_across_container_is_monotonic_and_clamped() {
        let mut drag = DividerDrag::new();
        drag.press();

        let extent = 1000.0;
        let mut previous = SPLIT_MIN;

        for step in 0..=80 {
            // Sweep from 10% to 90% of the container width.
            let offset = extent * (0.10 + step as f32 * 0.01);
            let split = drag.pointer_moved(offset, extent).expect("dragging should yield splits");

            assert!((SPLIT_MIN..=SPLIT_MAX).contains(&split));
            assert!(split >= previous);
            previous = split;
        }

        assert_eq!(previous, SPLIT_MAX);
    }

    #[test]
    fn drag_endpoints_clamp_to_bounds() {
        let mut drag = DividerDrag::new();
        drag.press();

        assert_eq!(drag.pointer_moved(100.0, 1000.0), Some(SPLIT_MIN));
        assert_eq!(drag.pointer_moved(900.0, 1000.0), Some(SPLIT_MAX));
        assert_eq!(drag.pointer_moved(-50.0, 1000.0), Some(SPLIT_MIN));
        assert_eq!(drag.pointer_moved(2000.0, 1000.0), Some(SPLIT_MAX));
    }

    #[test]
    fn release_outside_hit_area_still_returns_to_idle() {
        let mut drag = DividerDrag::new();
        drag.press();
        assert!(drag.is_dragging());

        // The release handler is global, so it fires no matter where the
        // pointer is when the button comes up.
        drag.release();
        assert!(!drag.is_dragging());
        assert_eq!(drag.pointer_moved(500.0, 1000.0), None);
    }

    #[test]
    fn release_while_idle_is_a_no_op() {
        let mut drag = DividerDrag::new();
        drag.release();
        assert_eq!(drag.phase(), DragPhase::Idle);
    }

    #[test]
    fn degenerate_container_extent_falls_back_to_center() {
        assert_eq!(split_from_pointer(120.0, 0.0), 50);
        assert_eq!(split_from_pointer(120.0, -5.0), 50);
    }
}
