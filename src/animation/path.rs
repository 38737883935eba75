use smallvec::SmallVec;

use crate::foundation::core::Point;

/// Polyline points of a sub-segment. Never longer than the 4 path vertices plus 2 cut points.
pub type Polyline = SmallVec<[Point; 6]>;

/// Fixed 4-point child → parent connector path used for glow travel.
///
/// Vertices: child anchor, trunk at child height, trunk at parent height, parent anchor.
#[derive(Clone, Debug, PartialEq)]
pub struct GlowPath {
    /// Child the pulse starts from.
    pub child_id: String,
    /// Polyline vertices.
    pub points: [Point; 4],
    /// Arc length from `points[0]` to each vertex.
    pub cumulative: [f64; 4],
    /// Total arc length.
    pub total_length: f64,
}

impl GlowPath {
    /// Build the path from a child's left-middle anchor to a parent's right-middle anchor.
    pub fn new(child_id: impl Into<String>, child: Point, trunk_x: f64, parent: Point) -> Self {
        let points = [
            child,
            Point::new(trunk_x, child.y),
            Point::new(trunk_x, parent.y),
            parent,
        ];
        let mut cumulative = [0.0; 4];
        for i in 1..4 {
            cumulative[i] = cumulative[i - 1] + points[i - 1].distance(points[i]);
        }
        Self {
            child_id: child_id.into(),
            points,
            total_length: cumulative[3],
            cumulative,
        }
    }

    /// Point at arc-length `dist`, clamped to the path.
    pub fn point_at(&self, dist: f64) -> Point {
        if self.total_length <= 0.0 || dist <= 0.0 {
            return self.points[0];
        }
        if dist >= self.total_length {
            return self.points[3];
        }
        for i in 0..3 {
            let (a, b) = (self.cumulative[i], self.cumulative[i + 1]);
            if dist <= b && b > a {
                let t = (dist - a) / (b - a);
                return self.points[i].lerp(self.points[i + 1], t);
            }
        }
        self.points[3]
    }

    /// Polyline covering arc-length range `[from, to]`. Empty when the range is degenerate.
    pub fn sub_path(&self, from: f64, to: f64) -> Polyline {
        let from = from.clamp(0.0, self.total_length);
        let to = to.clamp(0.0, self.total_length);
        let mut out = Polyline::new();
        if to <= from {
            return out;
        }
        out.push(self.point_at(from));
        for i in 1..3 {
            let c = self.cumulative[i];
            if c > from && c < to {
                out.push(self.points[i]);
            }
        }
        out.push(self.point_at(to));
        out
    }
}

/// Total length of an arbitrary polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
#[path = "../../tests/unit/animation/path.rs"]
mod tests;
