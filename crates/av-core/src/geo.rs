//! Planar geometry in the global (map) frame.
//!
//! Everything is metres and radians, `f64`.  The simulator is flat: `z` is
//! carried on waypoints for output only and never enters the geometry.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Wrap an angle to `(-π, π]`.
pub fn normalize_angle(a: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = (a + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

// ── Point2 ────────────────────────────────────────────────────────────────────

/// A point (or vector) in the map plane.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point2) -> f64 {
        (other - self).length()
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    pub fn dot(self, other: Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3-D cross product.  Positive when `other` lies
    /// counter-clockwise (to the left) of `self`.
    #[inline]
    pub fn cross(self, other: Point2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Unit vector in the same direction; the zero vector stays zero.
    pub fn normalized(self) -> Point2 {
        let len = self.length();
        if len <= f64::EPSILON { Point2::default() } else { self * (1.0 / len) }
    }

    /// Left-hand normal (rotated +90°).
    #[inline]
    pub fn perp(self) -> Point2 {
        Point2::new(-self.y, self.x)
    }

    #[inline]
    pub fn lerp(self, other: Point2, t: f64) -> Point2 {
        self + (other - self) * t
    }

    /// Heading of the vector from `self` to `other`.
    #[inline]
    pub fn heading_to(self, other: Point2) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Unit vector pointing along `heading`.
    #[inline]
    pub fn from_heading(heading: f64) -> Point2 {
        Point2::new(heading.cos(), heading.sin())
    }
}

impl Add for Point2 {
    type Output = Point2;
    #[inline]
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;
    #[inline]
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Point2;
    #[inline]
    fn mul(self, rhs: f64) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

impl std::fmt::Display for Point2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Pose ──────────────────────────────────────────────────────────────────────

/// Position plus heading.  For the ego vehicle the position is the centre of
/// the footprint.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose {
    #[inline]
    pub const fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    #[inline]
    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// Point `dist` metres ahead of the pose along its heading.
    #[inline]
    pub fn ahead(&self, dist: f64) -> Point2 {
        self.position() + Point2::from_heading(self.yaw) * dist
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3} rad)", self.x, self.y, self.yaw)
    }
}

// ── Segment ───────────────────────────────────────────────────────────────────

/// A straight line segment, used for stop lines and polygon edges.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point2,
    pub b: Point2,
}

impl Segment {
    #[inline]
    pub const fn new(a: Point2, b: Point2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn midpoint(&self) -> Point2 {
        self.a.lerp(self.b, 0.5)
    }

    /// Intersection point of two segments, if they touch.
    ///
    /// Collinear overlapping segments report the first endpoint of `other`
    /// that lies on `self`.
    pub fn intersection(&self, other: &Segment) -> Option<Point2> {
        let r = self.b - self.a;
        let s = other.b - other.a;
        let denom = r.cross(s);
        let qp = other.a - self.a;

        if denom.abs() < 1e-12 {
            if qp.cross(r).abs() > 1e-9 {
                return None; // parallel, not collinear
            }
            let rr = r.dot(r);
            if rr <= f64::EPSILON {
                return (self.a.distance(other.a) < 1e-9).then_some(self.a);
            }
            for p in [other.a, other.b] {
                let t = (p - self.a).dot(r) / rr;
                if (0.0..=1.0).contains(&t) {
                    return Some(p);
                }
            }
            return None;
        }

        let t = qp.cross(s) / denom;
        let u = qp.cross(r) / denom;
        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some(self.a + r * t)
        } else {
            None
        }
    }
}
