//! Camera that follows the selected control with exponential ease-out.
//!
//! Each tick the offset moves a fixed fraction of the remaining distance
//! toward the target, so it decelerates smoothly and never passes it.
//! Callers draw items at `position − offset + base`.

use crate::core::control::Point;

/// One easing step: move `factor` of the way from `current` to `target`.
pub fn ease(current: f32, target: f32, factor: f32) -> f32 {
    let next = current + (target - current) * factor;
    // float rounding can step past the target
    if (target - next) * (target - current) < 0.0 {
        target
    } else {
        next
    }
}

/// Scroll-offset follower.
#[derive(Debug, Clone)]
pub struct CameraTracker {
    offset: Point,
    /// Fraction of the remaining distance covered per tick.
    factor: f32,
}

impl CameraTracker {
    pub fn new(factor: f32) -> Self {
        Self {
            offset: Point::default(),
            factor: factor.clamp(0.01, 0.99),
        }
    }

    /// Jump straight to `target` (used when a screen is built).
    pub fn snap_to(&mut self, target: Point) {
        self.offset = target;
    }

    /// Advance one tick toward `target`.  Call once per frame.
    pub fn advance(&mut self, target: Point) -> Point {
        self.offset = Point::new(
            ease(self.offset.x, target.x, self.factor),
            ease(self.offset.y, target.y, self.factor),
        );
        self.offset
    }

    /// Where `position` lands on screen.
    pub fn to_screen(&self, position: Point, base: Point) -> Point {
        Point::new(
            position.x - self.offset.x + base.x,
            position.y - self.offset.y + base.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn moves_fixed_fraction() {
        let mut cam = CameraTracker::new(0.5);
        let o = cam.advance(Point::new(8.0, -4.0));
        assert_eq!(o, Point::new(4.0, -2.0));
        let o = cam.advance(Point::new(8.0, -4.0));
        assert_eq!(o, Point::new(6.0, -3.0));
    }

    #[test]
    fn screen_position_is_relative_to_offset() {
        let mut cam = CameraTracker::new(0.1);
        cam.snap_to(Point::new(0.0, 12.0));
        let p = cam.to_screen(Point::new(0.0, 15.0), Point::new(40.0, 6.0));
        assert_eq!(p, Point::new(40.0, 9.0));
    }

    #[test]
    fn factor_is_kept_inside_unit_interval() {
        let mut cam = CameraTracker::new(1.5);
        let o = cam.advance(Point::new(10.0, 0.0));
        assert!(o.x < 10.0);
        let mut cam = CameraTracker::new(0.0);
        assert!(cam.advance(Point::new(10.0, 0.0)).x > 0.0);
    }

    proptest! {
        #[test]
        fn converges_without_overshoot(
            start in -1000.0f32..1000.0,
            target in -1000.0f32..1000.0,
            factor in 0.05f32..0.95,
        ) {
            let eps = 0.01;
            let mut cam = CameraTracker::new(factor);
            cam.snap_to(Point::new(start, start));
            let goal = Point::new(target, start);
            let mut offset = Point::new(start, start);
            let mut dist = (start - target).abs();
            let mut ticks = 0;
            while (offset.x - target).abs() > eps {
                let before = offset.x;
                offset = cam.advance(goal);
                let after = offset.x;
                // same side of the target, never further away
                prop_assert!((target - after) * (target - before) >= 0.0);
                let d = (after - target).abs();
                prop_assert!(d <= dist);
                dist = d;
                ticks += 1;
                prop_assert!(ticks < 1000, "did not converge");
            }
            // the y axis never moved
            prop_assert_eq!(offset.y, start);
        }
    }
}
