//! Point and vector math shared by the stroke samplers and shape tools.

use serde::{Deserialize, Serialize};

/// A device-independent canvas coordinate (already scaled from client
/// pixels by the host). Immutable value type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

/// Angle of the vector `a → b` in radians.
pub fn angle(a: Point, b: Point) -> f32 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Dense point interpolation along the segment `a → b`.
///
/// Steps are at most one pixel apart and both endpoints are included, so
/// stamping a circle of any radius ≥ 0.5 at every returned point leaves no
/// gaps. This exists for the pencil/eraser segment samplers.
pub fn interpolate(a: Point, b: Point) -> Vec<Point> {
    let dist = distance(a, b);
    if dist < 0.1 {
        return vec![a];
    }
    let steps = dist.ceil() as usize;
    let mut points = Vec::with_capacity(steps + 1);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        points.push(Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t));
    }
    points
}

/// Normalize two drag corners into `(min, max)`. Negative spans are allowed
/// on input; the output is always a well-ordered box.
pub fn rect_corners(a: Point, b: Point) -> (Point, Point) {
    (
        Point::new(a.x.min(b.x), a.y.min(b.y)),
        Point::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// Triangle construction variants for the shape tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriangleType {
    #[default]
    Equilateral,
    Isosceles,
    Right,
}

impl TriangleType {
    pub fn label(&self) -> &'static str {
        match self {
            TriangleType::Equilateral => "Equilateral",
            TriangleType::Isosceles => "Isosceles",
            TriangleType::Right => "Right",
        }
    }

    pub fn all() -> &'static [TriangleType] {
        &[
            TriangleType::Equilateral,
            TriangleType::Isosceles,
            TriangleType::Right,
        ]
    }
}

/// Compute the three vertices for a triangle dragged from `start` to `end`.
///
/// These are fixed constructions, not "any triangle through three points":
/// * `Equilateral` — apex at `start`, second vertex at `end`, third at +60°
///   from the start→end vector at the same length.
/// * `Isosceles` — apex at `start`; base centered on `end` with half-width
///   `|end.x - start.x|`.
/// * `Right` — `start`, `(start.x, end.y)`, `end`, with the right angle at
///   the second vertex.
pub fn triangle_points(kind: TriangleType, start: Point, end: Point) -> [Point; 3] {
    match kind {
        TriangleType::Equilateral => {
            let len = distance(start, end);
            let theta = angle(start, end) + std::f32::consts::FRAC_PI_3;
            let third = Point::new(start.x + len * theta.cos(), start.y + len * theta.sin());
            [start, end, third]
        }
        TriangleType::Isosceles => {
            let half = (end.x - start.x).abs();
            [
                start,
                Point::new(end.x - half, end.y),
                Point::new(end.x + half, end.y),
            ]
        }
        TriangleType::Right => [start, Point::new(start.x, end.y), end],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn distance_and_angle() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!(approx(distance(a, b), 5.0));
        assert!(approx(angle(a, Point::new(0.0, 2.0)), std::f32::consts::FRAC_PI_2));
    }

    #[test]
    fn interpolation_leaves_no_gaps() {
        let a = Point::new(2.5, 7.0);
        let b = Point::new(40.0, -13.5);
        let points = interpolate(a, b);
        assert_eq!(points[0], a);
        assert_eq!(*points.last().unwrap(), b);
        for pair in points.windows(2) {
            assert!(distance(pair[0], pair[1]) <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn interpolation_of_a_dot() {
        let a = Point::new(5.0, 5.0);
        assert_eq!(interpolate(a, Point::new(5.05, 5.0)), vec![a]);
    }

    #[test]
    fn equilateral_triangle_has_equal_sides() {
        let start = Point::new(10.0, 10.0);
        let end = Point::new(50.0, 30.0);
        let [a, b, c] = triangle_points(TriangleType::Equilateral, start, end);
        let ab = distance(a, b);
        assert!(approx(distance(b, c), ab));
        assert!(approx(distance(c, a), ab));
    }

    #[test]
    fn isosceles_base_is_centered_on_cursor() {
        let start = Point::new(20.0, 0.0);
        let end = Point::new(30.0, 40.0);
        let [apex, left, right] = triangle_points(TriangleType::Isosceles, start, end);
        assert_eq!(apex, start);
        assert!(approx((left.x + right.x) / 2.0, end.x));
        assert!(approx(left.y, end.y));
        assert!(approx(right.y, end.y));
        assert!(approx(distance(apex, left), distance(apex, right)));
    }

    #[test]
    fn right_triangle_has_right_angle_at_second_vertex() {
        let start = Point::new(5.0, 5.0);
        let end = Point::new(25.0, 45.0);
        let [a, b, c] = triangle_points(TriangleType::Right, start, end);
        assert_eq!(b, Point::new(start.x, end.y));
        assert_eq!(c, end);
        // Legs b→a and b→c are axis-aligned, hence perpendicular.
        let dot = (a.x - b.x) * (c.x - b.x) + (a.y - b.y) * (c.y - b.y);
        assert!(approx(dot, 0.0));
    }
}
