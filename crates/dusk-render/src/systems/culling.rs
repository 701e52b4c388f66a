//! Viewport culling.
//!
//! A cheap rectangular test in camera-relative space: a point is visible when
//! it lies strictly within `half_size + margin` on both axes. Corners of the
//! enlarged rectangle give false positives, which only cost a wasted quad.

use glam::Vec2;

use crate::components::drawable::Drawable;
use crate::renderer::viewport::Viewport;

/// Whether a world-space point is inside the viewport enlarged by `margin`.
pub fn is_visible(viewport: &Viewport, point: Vec2, margin: f32) -> bool {
    let rel = viewport.relative_to_focus(point).abs();
    let half = viewport.half_size();
    rel.x < half.x + margin && rel.y < half.y + margin
}

/// Whether a drawable's position is inside the viewport enlarged by `margin`.
pub fn is_drawable_visible<D: Drawable + ?Sized>(viewport: &Viewport, drawable: &D, margin: f32) -> bool {
    is_visible(viewport, drawable.position(), margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::UVec2;

    fn viewport_200x100() -> Viewport {
        // Half-width 100, half-height 50.
        Viewport::new(UVec2::new(200, 100), 1.0)
    }

    #[test]
    fn margin_boundary_is_exclusive() {
        let vp = viewport_200x100();
        assert!(is_visible(&vp, Vec2::new(115.0, 0.0), 16.0));
        assert!(!is_visible(&vp, Vec2::new(116.0, 0.0), 16.0));
        assert!(!is_visible(&vp, Vec2::new(117.0, 0.0), 16.0));
        assert!(is_visible(&vp, Vec2::new(-115.0, 0.0), 16.0));
        assert!(!is_visible(&vp, Vec2::new(-117.0, 0.0), 16.0));
    }

    #[test]
    fn tests_both_axes() {
        let vp = viewport_200x100();
        assert!(is_visible(&vp, Vec2::new(0.0, 65.0), 16.0));
        assert!(!is_visible(&vp, Vec2::new(0.0, 66.0), 16.0));
        assert!(!is_visible(&vp, Vec2::new(117.0, 65.0), 16.0));
    }

    #[test]
    fn follows_focus() {
        let mut vp = viewport_200x100();
        vp.set_focus(Vec2::new(1000.0, 1000.0));
        assert!(!is_visible(&vp, Vec2::ZERO, 16.0));
        assert!(is_visible(&vp, Vec2::new(1115.0, 1000.0), 16.0));
        assert!(!is_visible(&vp, Vec2::new(1117.0, 1000.0), 16.0));
    }

    #[test]
    fn corner_false_positive_is_accepted() {
        let vp = viewport_200x100();
        // Outside the circle of radius margin around the corner, but inside the rectangle.
        assert!(is_visible(&vp, Vec2::new(115.0, 65.0), 16.0));
    }

    #[test]
    fn drawable_uses_its_position() {
        let vp = viewport_200x100();
        assert!(is_drawable_visible(&vp, &Vec2::new(115.0, 0.0), 16.0));
        assert!(!is_drawable_visible(&vp, &Vec2::new(116.0, 0.0), 16.0));
    }

    #[test]
    fn everything_strictly_inside_is_visible() {
        let vp = viewport_200x100();
        for x in (-99..100).step_by(11) {
            for y in (-49..50).step_by(7) {
                assert!(is_visible(&vp, Vec2::new(x as f32, y as f32), 0.0), "({x}, {y})");
            }
        }
    }
}
