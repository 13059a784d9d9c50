//! Simple (possibly non-convex) polygons.
//!
//! The swept safety border along a curved path is not convex, so overlap is
//! tested with edge crossings plus vertex containment instead of SAT.

use serde::{Deserialize, Serialize};

use crate::{Point2, Pose, Segment};

/// A closed polygon; the last vertex connects back to the first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<Point2>,
}

impl Polygon {
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Oriented rectangle of `length × width` centred on `pose`.
    pub fn rectangle(pose: Pose, length: f64, width: f64) -> Self {
        let fwd = Point2::from_heading(pose.yaw);
        let left = fwd.perp();
        let c = pose.position();
        let (hl, hw) = (length * 0.5, width * 0.5);
        Self::new(vec![
            c + fwd * hl + left * hw,
            c - fwd * hl + left * hw,
            c - fwd * hl - left * hw,
            c + fwd * hl - left * hw,
        ])
    }

    /// Close a left boundary and a right boundary (both ordered from back to
    /// front) into one ring.
    pub fn from_boundaries(left: &[Point2], right: &[Point2]) -> Self {
        let mut points = Vec::with_capacity(left.len() + right.len());
        points.extend_from_slice(left);
        points.extend(right.iter().rev().copied());
        Self::new(points)
    }

    pub fn is_empty(&self) -> bool {
        self.points.len() < 3
    }

    /// Iterator over the closed ring's edges.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| Segment::new(self.points[i], self.points[(i + 1) % n]))
    }

    /// Even-odd point containment (ray cast towards +x).
    pub fn contains(&self, p: Point2) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut inside = false;
        let n = self.points.len();
        let mut j = n - 1;
        for i in 0..n {
            let (pi, pj) = (self.points[i], self.points[j]);
            if (pi.y > p.y) != (pj.y > p.y) {
                let x_cross = pj.x + (p.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// `true` when the two polygons share any area or touch along an edge.
    pub fn intersects(&self, other: &Polygon) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if other.points.iter().any(|&p| self.contains(p))
            || self.points.iter().any(|&p| other.contains(p))
        {
            return true;
        }
        self.edges()
            .any(|e| other.edges().any(|f| e.intersection(&f).is_some()))
    }

    /// Arithmetic mean of the vertices.
    pub fn centroid(&self) -> Point2 {
        if self.points.is_empty() {
            return Point2::default();
        }
        let sum = self.points.iter().fold(Point2::default(), |acc, &p| acc + p);
        sum * (1.0 / self.points.len() as f64)
    }
}
