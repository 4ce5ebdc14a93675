#[cfg(feature = "egui")]
use egui::{Align2, Vec2};

/// Corner of the map a control is docked to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[cfg(feature = "egui")]
impl ControlPosition {
    pub fn align(&self) -> Align2 {
        match self {
            ControlPosition::TopLeft => Align2::LEFT_TOP,
            ControlPosition::TopRight => Align2::RIGHT_TOP,
            ControlPosition::BottomLeft => Align2::LEFT_BOTTOM,
            ControlPosition::BottomRight => Align2::RIGHT_BOTTOM,
        }
    }

    /// Offset for `egui::Window::anchor`, pointing inward from the corner
    pub fn anchor_offset(&self, margin: f32) -> Vec2 {
        match self {
            ControlPosition::TopLeft => Vec2::new(margin, margin),
            ControlPosition::TopRight => Vec2::new(-margin, margin),
            ControlPosition::BottomLeft => Vec2::new(margin, -margin),
            ControlPosition::BottomRight => Vec2::new(-margin, -margin),
        }
    }
}

#[cfg(all(test, feature = "egui"))]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_offsets_point_inward() {
        assert_eq!(ControlPosition::TopRight.align(), Align2::RIGHT_TOP);
        assert_eq!(ControlPosition::BottomRight.align(), Align2::RIGHT_BOTTOM);

        assert_eq!(
            ControlPosition::TopLeft.anchor_offset(10.0),
            Vec2::new(10.0, 10.0)
        );
        assert_eq!(
            ControlPosition::BottomRight.anchor_offset(10.0),
            Vec2::new(-10.0, -10.0)
        );
        assert_eq!(
            ControlPosition::BottomLeft.anchor_offset(4.0),
            Vec2::new(4.0, -4.0)
        );
    }
}
