use glam::Vec2;

use crate::renderer::vertex::{Color, Quad, TexRect};

/// Anything with a world position the renderer can cull and draw.
///
/// The render core only depends on this capability, never on concrete
/// entity types.
pub trait Drawable {
    /// Position in world space.
    fn position(&self) -> Vec2;

    /// Facing in radians.
    fn angle(&self) -> f32 {
        0.0
    }

    /// Quad of `size` centred on the drawable and rotated by its angle.
    fn sprite_quad(&self, size: Vec2, tex: TexRect, color: Color) -> Quad {
        Quad::sprite(self.position(), size, self.angle(), tex, color)
    }
}

impl Drawable for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Turret {
        pos: Vec2,
        facing: f32,
    }

    impl Drawable for Turret {
        fn position(&self) -> Vec2 {
            self.pos
        }

        fn angle(&self) -> f32 {
            self.facing
        }
    }

    #[test]
    fn point_is_drawable() {
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(Drawable::position(&p), p);
        assert_eq!(Drawable::angle(&p), 0.0);
    }

    #[test]
    fn sprite_quad_uses_position_and_angle() {
        let turret = Turret {
            pos: Vec2::new(10.0, 10.0),
            facing: std::f32::consts::PI,
        };
        let quad = turret.sprite_quad(Vec2::splat(2.0), TexRect::full(4, 4), Color::WHITE);
        assert!((quad.center() - turret.pos).length() < 1e-4);
        // Half a turn puts the top-left corner at the bottom-right.
        assert!((quad.vertices[0].position() - Vec2::new(11.0, 11.0)).length() < 1e-4);
    }
}
