//! Planar landmark geometry.

use nalgebra::Vector2;

use crate::types::Landmark;

/// Product of leg lengths below which an angle is treated as degenerate
const MIN_NORM_PRODUCT: f64 = 1e-12;

/// Calculate angle between two vectors in radians.
///
/// Returns 0 when either vector is degenerate.
pub fn angle_between(v1: &Vector2<f64>, v2: &Vector2<f64>) -> f64 {
    let norms = v1.norm() * v2.norm();
    if !(norms > MIN_NORM_PRODUCT) || !norms.is_finite() {
        return 0.0;
    }

    let cos = v1.dot(v2) / norms;
    if !cos.is_finite() {
        return 0.0;
    }
    cos.clamp(-1.0, 1.0).acos()
}

/// Angle at `p2` formed by `p1` and `p3`, in degrees within `[0, 180]`.
///
/// Any absent point, or a zero-length leg, yields 0.
pub fn angle(p1: Option<&Landmark>, p2: Option<&Landmark>, p3: Option<&Landmark>) -> f64 {
    let (Some(a), Some(vertex), Some(c)) = (p1, p2, p3) else {
        return 0.0;
    };

    let to_a = a.planar() - vertex.planar();
    let to_c = c.planar() - vertex.planar();
    angle_between(&to_a, &to_c).to_degrees()
}

/// Absolute horizontal separation of two landmarks
pub fn horizontal_distance(a: &Landmark, b: &Landmark) -> f64 {
    (a.x - b.x).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lm(x: f64, y: f64) -> Landmark {
        Landmark::new(x, y)
    }

    #[test]
    fn test_right_angle() {
        let deg = angle(Some(&lm(0.0, 0.0)), Some(&lm(1.0, 0.0)), Some(&lm(1.0, 1.0)));
        assert_relative_eq!(deg, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_straight_and_folded() {
        let straight = angle(Some(&lm(-1.0, 0.0)), Some(&lm(0.0, 0.0)), Some(&lm(2.0, 0.0)));
        assert_relative_eq!(straight, 180.0, epsilon = 1e-9);

        let folded = angle(Some(&lm(1.0, 0.0)), Some(&lm(0.0, 0.0)), Some(&lm(3.0, 0.0)));
        assert_relative_eq!(folded, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_point_is_zero() {
        assert_eq!(angle(None, Some(&lm(0.0, 0.0)), Some(&lm(1.0, 1.0))), 0.0);
        assert_eq!(angle(Some(&lm(0.0, 0.0)), None, Some(&lm(1.0, 1.0))), 0.0);
        assert_eq!(angle(Some(&lm(0.0, 0.0)), Some(&lm(1.0, 1.0)), None), 0.0);
    }

    #[test]
    fn test_zero_length_leg_is_zero() {
        let p = lm(0.5, 0.5);
        assert_eq!(angle(Some(&p), Some(&p), Some(&lm(1.0, 1.0))), 0.0);
        assert_eq!(angle(Some(&lm(1.0, 1.0)), Some(&p), Some(&p)), 0.0);
    }

    #[test]
    fn test_depth_is_ignored() {
        let a = Landmark::with_depth(0.0, 0.0, 5.0);
        let b = Landmark::with_depth(1.0, 0.0, -3.0);
        let c = Landmark::with_depth(1.0, 1.0, 0.0);
        assert_relative_eq!(angle(Some(&a), Some(&b), Some(&c)), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_near_collinear_clamped() {
        // cosine lands a hair outside [-1, 1] without clamping
        let deg = angle(
            Some(&lm(0.1, 0.1)),
            Some(&lm(0.2, 0.2)),
            Some(&lm(0.30000000000000004, 0.30000000000000004)),
        );
        assert!(!deg.is_nan());
        assert!((0.0..=180.0).contains(&deg));
    }

    #[test]
    fn test_horizontal_distance() {
        assert_relative_eq!(horizontal_distance(&lm(0.2, 0.0), &lm(0.5, 9.0)), 0.3, epsilon = 1e-12);
    }
}
