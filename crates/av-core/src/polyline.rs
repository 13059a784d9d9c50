//! Operations on open polylines given as `&[Point2]`.
//!
//! Both the decision maker (along-path distances, safety border) and the
//! trajectory follower (closest-point projection, lookahead target) work on
//! the same point slices, so the helpers live here rather than in either
//! consumer.

use crate::Point2;

/// Closest-point projection of a query point onto a polyline.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    /// Index of the segment `[segment, segment + 1]` holding the foot point.
    pub segment: usize,
    /// Position of the foot point on that segment, in `[0, 1]`.
    pub t: f64,
    /// The foot point itself.
    pub point: Point2,
    /// Arc length from the first vertex to the foot point.
    pub s: f64,
    /// Signed distance from the foot point to the query; positive = left.
    pub lateral: f64,
    /// Heading of the segment holding the foot point.
    pub heading: f64,
}

/// Cumulative arc length at every vertex (`out[0] == 0`).
pub fn arc_lengths(points: &[Point2]) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            acc += points[i - 1].distance(*p);
        }
        out.push(acc);
    }
    out
}

/// Total length of the polyline.
pub fn length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Project `p` onto the polyline.  Returns `None` for an empty slice.
///
/// Ties between equally close segments resolve to the earliest one so the
/// result is stable along overlapping geometry.
pub fn project(points: &[Point2], p: Point2) -> Option<Projection> {
    match points {
        [] => None,
        [only] => Some(Projection {
            segment: 0,
            t: 0.0,
            point: *only,
            s: 0.0,
            lateral: 0.0,
            heading: 0.0,
        }),
        _ => {
            let mut best: Option<(f64, Projection)> = None;
            let mut s_start = 0.0;
            for (i, w) in points.windows(2).enumerate() {
                let (a, b) = (w[0], w[1]);
                let ab = b - a;
                let len2 = ab.dot(ab);
                let t = if len2 <= f64::EPSILON {
                    0.0
                } else {
                    ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
                };
                let foot = a + ab * t;
                let d = foot.distance(p);
                let seg_len = len2.sqrt();
                if best.as_ref().is_none_or(|(bd, _)| d < *bd - 1e-12) {
                    let dir = ab.normalized();
                    best = Some((d, Projection {
                        segment: i,
                        t,
                        point: foot,
                        s: s_start + seg_len * t,
                        lateral: dir.cross(p - foot),
                        heading: a.heading_to(b),
                    }));
                }
                s_start += seg_len;
            }
            best.map(|(_, proj)| proj)
        }
    }
}

/// Point and heading at arc length `s`.
///
/// `s` below zero clamps to the first vertex; `s` past the end extrapolates
/// along the last segment so lookahead targets stay ahead of the vehicle.
pub fn point_at(points: &[Point2], s: f64) -> Option<(Point2, f64)> {
    match points {
        [] => None,
        [only] => Some((*only, 0.0)),
        _ => {
            let s = s.max(0.0);
            let mut acc = 0.0;
            for w in points.windows(2) {
                let seg = w[0].distance(w[1]);
                if seg > f64::EPSILON && acc + seg >= s {
                    let t = (s - acc) / seg;
                    return Some((w[0].lerp(w[1], t), w[0].heading_to(w[1])));
                }
                acc += seg;
            }
            // Past the end: extrapolate along the last non-degenerate segment.
            let n = points.len();
            let (a, b) = points[..n]
                .windows(2)
                .rev()
                .find(|w| w[0].distance(w[1]) > f64::EPSILON)
                .map(|w| (w[0], w[1]))
                .unwrap_or((points[n - 2], points[n - 1]));
            let heading = a.heading_to(b);
            Some((points[n - 1] + Point2::from_heading(heading) * (s - acc), heading))
        }
    }
}

/// Signed curvature at interior vertex `i` from its two neighbours
/// (Menger curvature).  End vertices and degenerate triples return 0.
pub fn curvature(points: &[Point2], i: usize) -> f64 {
    if i == 0 || i + 1 >= points.len() {
        return 0.0;
    }
    let (a, b, c) = (points[i - 1], points[i], points[i + 1]);
    let denom = a.distance(b) * b.distance(c) * a.distance(c);
    if denom <= 1e-12 {
        return 0.0;
    }
    2.0 * (b - a).cross(c - b) / denom
}

/// Sub-polyline between arc lengths `from` and `to` (both clamped to the
/// polyline), with interpolated endpoints.
pub fn slice(points: &[Point2], from: f64, to: f64) -> Vec<Point2> {
    let total = length(points);
    let from = from.clamp(0.0, total);
    let to = to.clamp(from, total);
    let (Some((start, _)), Some((end, _))) = (point_at(points, from), point_at(points, to)) else {
        return vec![];
    };
    let lengths = arc_lengths(points);
    let mut out = vec![start];
    for (p, s) in points.iter().zip(&lengths) {
        if *s > from + 1e-9 && *s < to - 1e-9 {
            out.push(*p);
        }
    }
    if end.distance(start) > 1e-9 || out.len() > 1 {
        out.push(end);
    }
    out
}
