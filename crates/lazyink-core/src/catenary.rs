//! Hanging-chain guide between the brush and the pointer.
//!
//! Screen space has y growing downward, so the chain sags toward larger y.

use crate::shapes::quadratic_path;
use kurbo::{BezPath, Point};

/// Horizontal separation below which the chain is treated as vertical.
const MIN_HORIZONTAL_SPAN: f64 = 0.01;
const EPSILON: f64 = 1e-6;

/// Catenary sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catenary {
    /// Number of samples along a sagging chain.
    pub segments: usize,
    /// Newton iteration cap when solving for the chain parameter.
    pub iteration_limit: usize,
}

impl Default for Catenary {
    fn default() -> Self {
        Self {
            segments: 50,
            iteration_limit: 100,
        }
    }
}

impl Catenary {
    /// Sample points of a chain of `length` hung between `p1` and `p2`.
    ///
    /// Returns the two endpoints when the chain is pulled straight, three
    /// points (with the fold below the lower end) when the ends are vertically
    /// aligned, otherwise `segments + 1` samples ordered by x.
    pub fn points(&self, p1: Point, p2: Point, length: f64) -> Vec<Point> {
        let (left, right) = if p1.x > p2.x { (p2, p1) } else { (p1, p2) };
        let distance = left.distance(right);

        if distance >= length {
            return vec![left, right];
        }

        let h = right.x - left.x;
        if h < MIN_HORIZONTAL_SPAN {
            let slack = (length - distance) / 2.0;
            let fold = Point::new((left.x + right.x) / 2.0, left.y.max(right.y) + slack);
            return vec![left, fold, right];
        }

        // Work in y-up coordinates where the chain is a convex cosh curve
        let v = -(right.y - left.y);
        let a = self.parameter(h, v, length);
        let slope = (v / length).clamp(-1.0 + EPSILON, 1.0 - EPSILON);
        let x0 = (left.x + right.x) / 2.0 - a * slope.atanh();
        let c = -left.y - a * ((left.x - x0) / a).cosh();
        let y_at = |x: f64| -(a * ((x - x0) / a).cosh() + c);

        let segments = self.segments.max(2);
        let mut samples = Vec::with_capacity(segments + 1);
        samples.push(left);
        for i in 1..segments {
            let x = left.x + h * i as f64 / segments as f64;
            samples.push(Point::new(x, y_at(x)));
        }
        samples.push(right);
        samples
    }

    /// Smooth drawable path through [`points`](Self::points).
    pub fn curve(&self, brush: Point, pointer: Point, length: f64) -> BezPath {
        quadratic_path(&self.points(brush, pointer, length))
    }

    /// Solve `sqrt(L^2 - v^2) = 2a sinh(h / 2a)` for `a` by Newton's method
    /// on `z = h / 2a`.
    fn parameter(&self, h: f64, v: f64, length: f64) -> f64 {
        let m = (length * length - v * v).sqrt() / h;
        let mut z = m.acosh() + 1.0;
        for _ in 0..self.iteration_limit {
            let step = (z.sinh() - m * z) / (z.cosh() - m);
            z -= step;
            if step.abs() < EPSILON {
                break;
            }
        }
        h / (2.0 * z)
    }
}

/// Guide path between brush and pointer with the default sampler.
pub fn curve(brush: Point, pointer: Point, string_length: f64) -> BezPath {
    Catenary::default().curve(brush, pointer, string_length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arc_length(points: &[Point]) -> f64 {
        points.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    #[test]
    fn test_taut_chain_is_straight() {
        let points = Catenary::default().points(Point::new(0.0, 0.0), Point::new(30.0, 40.0), 50.0);
        assert_eq!(points, vec![Point::new(0.0, 0.0), Point::new(30.0, 40.0)]);
    }

    #[test]
    fn test_slack_chain_sags_down() {
        let catenary = Catenary::default();
        let points = catenary.points(Point::new(0.0, 100.0), Point::new(40.0, 100.0), 60.0);

        assert_eq!(points.len(), catenary.segments + 1);
        let lowest = points.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert!(lowest > 100.0);

        // Sampled length matches the chain length closely
        assert!((arc_length(&points) - 60.0).abs() < 0.5);
    }

    #[test]
    fn test_endpoints_are_preserved_for_uneven_heights() {
        let points =
            Catenary::default().points(Point::new(50.0, 10.0), Point::new(10.0, 30.0), 80.0);
        let first = points[0];
        let last = points[points.len() - 1];

        assert_eq!(first, Point::new(10.0, 30.0));
        assert_eq!(last, Point::new(50.0, 10.0));
        assert!((arc_length(&points) - 80.0).abs() < 1.0);
    }

    #[test]
    fn test_more_slack_sags_further() {
        let catenary = Catenary::default();
        let sag = |len: f64| {
            catenary
                .points(Point::new(0.0, 0.0), Point::new(20.0, 0.0), len)
                .iter()
                .map(|p| p.y)
                .fold(f64::MIN, f64::max)
        };
        assert!(sag(40.0) > sag(25.0));
        assert!(sag(25.0) > 0.0);
    }

    #[test]
    fn test_vertical_fold() {
        let points = Catenary::default().points(Point::new(5.0, 0.0), Point::new(5.0, 10.0), 30.0);
        assert_eq!(points.len(), 3);
        assert!((points[1].y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_curve_is_drawable() {
        let path = curve(Point::new(0.0, 0.0), Point::new(20.0, 0.0), 30.0);
        assert!(!path.elements().is_empty());
    }
}
