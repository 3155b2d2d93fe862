// Catmull-Rom curve tessellation for flame outlines and haze strands

use bevy::prelude::*;

/// Tessellation steps between two consecutive control points
pub const CURVE_STEPS: usize = 4;

/// Catmull-Rom interpolation between `p1` and `p2`
pub fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

/// Tessellate a curve-vertex list into a polyline.
/// The first and last entries only steer the tangents; the curve runs from the
/// second point to the second-to-last. Fewer than four points yields nothing.
pub fn tessellate(controls: &[Vec2], steps: usize) -> Vec<Vec2> {
    if controls.len() < 4 || steps == 0 {
        return Vec::new();
    }

    let spans = controls.len() - 3;
    let mut out = Vec::with_capacity(spans * steps + 1);
    out.push(controls[1]);
    for window in controls.windows(4) {
        let [p0, p1, p2, p3] = [window[0], window[1], window[2], window[3]];
        for step in 1..=steps {
            let t = step as f32 / steps as f32;
            out.push(catmull_rom(p0, p1, p2, p3, t));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_inner_control_points() {
        let controls = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 2.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(4.0, 1.0),
            Vec2::new(6.0, 0.0),
        ];
        let line = tessellate(&controls, 5);
        assert_eq!(line.len(), 2 * 5 + 1);
        assert_eq!(line[0], controls[1]);
        assert!(line[5].distance(controls[2]) < 1e-5);
        assert!(line[10].distance(controls[3]) < 1e-5);
    }

    #[test]
    fn collinear_controls_stay_on_the_line() {
        let controls: Vec<Vec2> = (0..6).map(|i| Vec2::new(i as f32, 2.0 * i as f32)).collect();
        for p in tessellate(&controls, 8) {
            assert!((p.y - 2.0 * p.x).abs() < 1e-4);
        }
    }

    #[test]
    fn too_few_points_yield_nothing() {
        assert!(tessellate(&[Vec2::ZERO, Vec2::ONE, Vec2::X], 4).is_empty());
        assert!(tessellate(&[Vec2::ZERO; 5], 0).is_empty());
    }
}
