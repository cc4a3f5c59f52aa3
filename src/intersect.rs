//! Pairwise curve intersection.
//!
//! All intersectors report parameter pairs, primary curve first. The
//! line/line intersector has one extra duty: when the operands are collinear
//! and overlap, it reports the two endpoints of the shared interval, which is
//! what the caller uses to recognize a coincident run of edges.

use arrayvec::ArrayVec;
use kurbo::common::{solve_cubic, solve_quadratic};
use kurbo::{CubicBez, Line, ParamCurve, ParamCurveExtrema, PathSeg, Point, Rect};

/// Two cubics can meet in at most 9 points.
pub(crate) const MAX_INTERSECTIONS: usize = 9;

pub(crate) type TPairs = ArrayVec<(f64, f64), MAX_INTERSECTIONS>;

/// Acceptance slop for parameters that land just outside `[0, 1]`.
const T_SLOP: f64 = 1e-9;

/// Parameters closer than this on the primary curve are the same hit.
const T_DEDUP: f64 = 1e-5;

/// Flatness threshold below which a cubic is intersected as its chord.
const FLATNESS: f64 = 1e-6;

/// How much of the parameter range is shaved off around an exactly shared
/// endpoint before subdividing, so the recursion doesn't chase the touching
/// corner to full depth.
const ENDPOINT_TRIM: f64 = 1e-4;

fn unit_clamp(t: f64) -> Option<f64> {
    if !(-T_SLOP..=1.0 + T_SLOP).contains(&t) {
        return None;
    }
    if t <= T_SLOP {
        Some(0.0)
    } else if t >= 1.0 - T_SLOP {
        Some(1.0)
    } else {
        Some(t)
    }
}

fn push_pair(out: &mut TPairs, t0: f64, t1: f64) {
    if out.iter().any(|&(a, _)| (a - t0).abs() < T_DEDUP) {
        return;
    }
    if !out.is_full() {
        out.push((t0, t1));
    }
}

/// Intersects two line segments.
///
/// Collinear overlapping lines report the overlap's endpoints (two pairs);
/// a single shared point reports one pair; disjoint parallels report none.
pub(crate) fn line_line(a: Line, b: Line) -> TPairs {
    let mut out = TPairs::new();
    let d0 = a.p1 - a.p0;
    let d1 = b.p1 - b.p0;
    let offset = b.p0 - a.p0;
    let denom = d0.cross(d1);

    if denom.abs() <= 1e-12 * d0.hypot() * d1.hypot() {
        // Parallel. Coincident only if b's start sits on a's carrier line.
        if offset.cross(d0).abs() > 1e-9 * d0.hypot() * (offset.hypot() + d1.hypot()) {
            return out;
        }
        let len2 = d0.hypot2();
        if len2 == 0.0 {
            return out;
        }
        let tb0 = offset.dot(d0) / len2;
        let tb1 = (b.p1 - a.p0).dot(d0) / len2;
        let lo = tb0.min(tb1).max(0.0);
        let hi = tb0.max(tb1).min(1.0);
        if lo > hi {
            return out;
        }
        let other_t = |t: f64| {
            let p = a.p0 + d0 * t;
            ((p - b.p0).dot(d1) / d1.hypot2()).clamp(0.0, 1.0)
        };
        out.push((lo, other_t(lo)));
        if hi - lo > T_SLOP {
            out.push((hi, other_t(hi)));
        }
        return out;
    }

    let t = offset.cross(d1) / denom;
    let s = offset.cross(d0) / denom;
    if let (Some(t), Some(s)) = (unit_clamp(t), unit_clamp(s)) {
        out.push((t, s));
    }
    out
}

fn bernstein_quad_roots(c0: f64, c1: f64, c2: f64) -> ArrayVec<f64, 2> {
    solve_quadratic(c0, 2.0 * (c1 - c0), c0 - 2.0 * c1 + c2)
}

fn bernstein_cubic_roots(c0: f64, c1: f64, c2: f64, c3: f64) -> ArrayVec<f64, 3> {
    solve_cubic(
        c0,
        3.0 * (c1 - c0),
        3.0 * (c2 - 2.0 * c1 + c0),
        c3 - 3.0 * c2 + 3.0 * c1 - c0,
    )
}

/// Intersects a quad or cubic with a line segment. Pairs are
/// `(curve_t, line_t)`.
pub(crate) fn line_curve(seg: &PathSeg, line: Line) -> TPairs {
    let mut out = TPairs::new();
    let d = line.p1 - line.p0;

    // Exactly shared endpoints first; adjacency in a contour depends on
    // these being reported with exact parameters.
    let ends = [
        (seg.start(), line.p0, 0.0, 0.0),
        (seg.start(), line.p1, 0.0, 1.0),
        (seg.end(), line.p0, 1.0, 0.0),
        (seg.end(), line.p1, 1.0, 1.0),
    ];
    for (p, q, t, s) in ends {
        if p == q {
            push_pair(&mut out, t, s);
        }
    }

    let dist = |p: Point| (p - line.p0).cross(d);
    let roots: ArrayVec<f64, 3> = match seg {
        PathSeg::Line(_) => {
            debug_assert!(false, "line/line pairs take the line_line path");
            return out;
        }
        PathSeg::Quad(q) => bernstein_quad_roots(dist(q.p0), dist(q.p1), dist(q.p2))
            .into_iter()
            .collect(),
        PathSeg::Cubic(c) => bernstein_cubic_roots(dist(c.p0), dist(c.p1), dist(c.p2), dist(c.p3)),
    };

    for root in roots {
        let Some(t) = unit_clamp(root) else { continue };
        let p = seg.eval(t);
        let s = if d.x.abs() >= d.y.abs() {
            (p.x - line.p0.x) / d.x
        } else {
            (p.y - line.p0.y) / d.y
        };
        if let Some(s) = unit_clamp(s) {
            push_pair(&mut out, t, s);
        }
    }
    out
}

fn boxes_touch(a: Rect, b: Rect) -> bool {
    a.min_x() <= b.max_x() + T_SLOP
        && b.min_x() <= a.max_x() + T_SLOP
        && a.min_y() <= b.max_y() + T_SLOP
        && b.min_y() <= a.max_y() + T_SLOP
}

fn flat_enough(c: &CubicBez) -> bool {
    let d = c.p3 - c.p0;
    let len = d.hypot();
    if len <= FLATNESS {
        return (c.p1 - c.p0).hypot() <= FLATNESS && (c.p2 - c.p0).hypot() <= FLATNESS;
    }
    let d1 = (c.p1 - c.p0).cross(d).abs() / len;
    let d2 = (c.p2 - c.p0).cross(d).abs() / len;
    d1.max(d2) <= FLATNESS
}

#[allow(clippy::too_many_arguments)]
fn curve_curve_rec(
    a: &CubicBez,
    (ta0, ta1): (f64, f64),
    b: &CubicBez,
    (tb0, tb1): (f64, f64),
    depth: u32,
    out: &mut TPairs,
) {
    if out.is_full() {
        return;
    }
    let ca = a.subsegment(ta0..ta1);
    let cb = b.subsegment(tb0..tb1);
    if !boxes_touch(ca.bounding_box(), cb.bounding_box()) {
        return;
    }
    if depth == 0 || (flat_enough(&ca) && flat_enough(&cb)) {
        let chord_a = Line::new(ca.p0, ca.p3);
        let chord_b = Line::new(cb.p0, cb.p3);
        for (u, v) in line_line(chord_a, chord_b) {
            push_pair(out, ta0 + u * (ta1 - ta0), tb0 + v * (tb1 - tb0));
        }
        return;
    }
    let ta_mid = 0.5 * (ta0 + ta1);
    let tb_mid = 0.5 * (tb0 + tb1);
    curve_curve_rec(a, (ta0, ta_mid), b, (tb0, tb_mid), depth - 1, out);
    curve_curve_rec(a, (ta0, ta_mid), b, (tb_mid, tb1), depth - 1, out);
    curve_curve_rec(a, (ta_mid, ta1), b, (tb0, tb_mid), depth - 1, out);
    curve_curve_rec(a, (ta_mid, ta1), b, (tb_mid, tb1), depth - 1, out);
}

/// Intersects two cubics by recursive subdivision with bounding-box pruning.
pub(crate) fn curve_curve(a: &CubicBez, b: &CubicBez) -> TPairs {
    let mut out = TPairs::new();
    let mut a_range: (f64, f64) = (0.0, 1.0);
    let mut b_range: (f64, f64) = (0.0, 1.0);

    let ends = [
        (a.p0, b.p0, 0.0, 0.0),
        (a.p0, b.p3, 0.0, 1.0),
        (a.p3, b.p0, 1.0, 0.0),
        (a.p3, b.p3, 1.0, 1.0),
    ];
    for (p, q, t, s) in ends {
        if p == q {
            out.push((t, s));
            // Trim the touching corner out of the subdivision ranges so the
            // recursion doesn't grind against an intersection it already has.
            if t == 0.0 {
                a_range.0 = a_range.0.max(ENDPOINT_TRIM);
            } else {
                a_range.1 = a_range.1.min(1.0 - ENDPOINT_TRIM);
            }
            if s == 0.0 {
                b_range.0 = b_range.0.max(ENDPOINT_TRIM);
            } else {
                b_range.1 = b_range.1.min(1.0 - ENDPOINT_TRIM);
            }
        }
    }

    if a_range.0 < a_range.1 && b_range.0 < b_range.1 {
        curve_curve_rec(a, a_range, b, b_range, 48, &mut out);
    }
    out
}

/// Intersects a segment with the horizontal span `[left, right]` at height
/// `y`. Pairs are `(curve_t, span_t)`; `flipped` reverses the span parameter
/// for horizontal input lines stored right-to-left.
pub(crate) fn horizontal_intersect(
    seg: &PathSeg,
    left: f64,
    right: f64,
    y: f64,
    flipped: bool,
) -> TPairs {
    let mut out = TPairs::new();
    debug_assert!(left < right);
    let span_t = |x: f64| {
        let s = ((x - left) / (right - left)).clamp(0.0, 1.0);
        if flipped {
            1.0 - s
        } else {
            s
        }
    };

    if let PathSeg::Line(l) = seg {
        if l.p0.y == l.p1.y {
            // Horizontal against horizontal: coincident or nothing.
            if l.p0.y != y {
                return out;
            }
            let (x0, x1) = if l.p0.x <= l.p1.x {
                (l.p0.x, l.p1.x)
            } else {
                (l.p1.x, l.p0.x)
            };
            let lo = x0.max(left);
            let hi = x1.min(right);
            if lo > hi {
                return out;
            }
            let line_t = |x: f64| ((x - l.p0.x) / (l.p1.x - l.p0.x)).clamp(0.0, 1.0);
            out.push((line_t(lo), span_t(lo)));
            if hi > lo {
                out.push((line_t(hi), span_t(hi)));
            }
            return out;
        }
    }

    let roots: ArrayVec<f64, 3> = match seg {
        PathSeg::Line(l) => {
            let mut r = ArrayVec::new();
            r.push((y - l.p0.y) / (l.p1.y - l.p0.y));
            r
        }
        PathSeg::Quad(q) => bernstein_quad_roots(q.p0.y - y, q.p1.y - y, q.p2.y - y)
            .into_iter()
            .collect(),
        PathSeg::Cubic(c) => bernstein_cubic_roots(c.p0.y - y, c.p1.y - y, c.p2.y - y, c.p3.y - y),
    };
    for root in roots {
        let Some(t) = unit_clamp(root) else { continue };
        let x = seg.eval(t).x;
        if (left - T_SLOP..=right + T_SLOP).contains(&x) {
            push_pair(&mut out, t, span_t(x));
        }
    }
    out
}

/// The vertical counterpart of [`horizontal_intersect`].
pub(crate) fn vertical_intersect(
    seg: &PathSeg,
    top: f64,
    bottom: f64,
    x: f64,
    flipped: bool,
) -> TPairs {
    let mut out = TPairs::new();
    debug_assert!(top < bottom);
    let span_t = |y: f64| {
        let s = ((y - top) / (bottom - top)).clamp(0.0, 1.0);
        if flipped {
            1.0 - s
        } else {
            s
        }
    };

    if let PathSeg::Line(l) = seg {
        if l.p0.x == l.p1.x {
            if l.p0.x != x {
                return out;
            }
            let (y0, y1) = if l.p0.y <= l.p1.y {
                (l.p0.y, l.p1.y)
            } else {
                (l.p1.y, l.p0.y)
            };
            let lo = y0.max(top);
            let hi = y1.min(bottom);
            if lo > hi {
                return out;
            }
            let line_t = |y: f64| ((y - l.p0.y) / (l.p1.y - l.p0.y)).clamp(0.0, 1.0);
            out.push((line_t(lo), span_t(lo)));
            if hi > lo {
                out.push((line_t(hi), span_t(hi)));
            }
            return out;
        }
    }

    let roots: ArrayVec<f64, 3> = match seg {
        PathSeg::Line(l) => {
            let mut r = ArrayVec::new();
            r.push((x - l.p0.x) / (l.p1.x - l.p0.x));
            r
        }
        PathSeg::Quad(q) => bernstein_quad_roots(q.p0.x - x, q.p1.x - x, q.p2.x - x)
            .into_iter()
            .collect(),
        PathSeg::Cubic(c) => bernstein_cubic_roots(c.p0.x - x, c.p1.x - x, c.p2.x - x, c.p3.x - x),
    };
    for root in roots {
        let Some(t) = unit_clamp(root) else { continue };
        let y = seg.eval(t).y;
        if (top - T_SLOP..=bottom + T_SLOP).contains(&y) {
            push_pair(&mut out, t, span_t(y));
        }
    }
    out
}

/// Where does the vertical line `x = ray_x` cross `edge`?
///
/// Used by the winding pass against already subdivided sub-edges. A vertical
/// line edge lying exactly on the ray reports both endpoints; the caller
/// treats multiple line hits as edge-on and skips them.
pub(crate) fn vertical_ray_hits(edge: &PathSeg, ray_x: f64) -> ArrayVec<f64, 3> {
    let mut out = ArrayVec::new();
    match edge {
        PathSeg::Line(l) => {
            if l.p0.x == l.p1.x {
                if l.p0.x == ray_x {
                    out.push(0.0);
                    out.push(1.0);
                }
                return out;
            }
            if let Some(t) = unit_clamp((ray_x - l.p0.x) / (l.p1.x - l.p0.x)) {
                out.push(t);
            }
        }
        PathSeg::Quad(q) => {
            for root in bernstein_quad_roots(q.p0.x - ray_x, q.p1.x - ray_x, q.p2.x - ray_x) {
                if let Some(t) = unit_clamp(root) {
                    if !out.iter().any(|u| (u - t).abs() < T_DEDUP) {
                        out.push(t);
                    }
                }
            }
        }
        PathSeg::Cubic(c) => {
            for root in bernstein_cubic_roots(
                c.p0.x - ray_x,
                c.p1.x - ray_x,
                c.p2.x - ray_x,
                c.p3.x - ray_x,
            ) {
                if let Some(t) = unit_clamp(root) {
                    if !out.iter().any(|u| (u - t).abs() < T_DEDUP) {
                        out.push(t);
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::QuadBez;

    #[test]
    fn crossing_lines() {
        let a = Line::new((0.0, 0.0), (10.0, 10.0));
        let b = Line::new((0.0, 10.0), (10.0, 0.0));
        let hits = line_line(a, b);
        assert_eq!(hits.len(), 1);
        let (t, s) = hits[0];
        assert!((t - 0.5).abs() < 1e-12);
        assert!((s - 0.5).abs() < 1e-12);
    }

    #[test]
    fn shared_endpoint_is_exact() {
        let a = Line::new((0.0, 0.0), (10.0, 0.0));
        let b = Line::new((10.0, 0.0), (10.0, 10.0));
        let hits = line_line(a, b);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0], (1.0, 0.0));
    }

    #[test]
    fn collinear_overlap_reports_interval() {
        let a = Line::new((0.0, 0.0), (10.0, 0.0));
        let b = Line::new((5.0, 0.0), (15.0, 0.0));
        let hits = line_line(a, b);
        assert_eq!(hits.len(), 2);
        assert!((hits[0].0 - 0.5).abs() < 1e-12);
        assert!((hits[0].1 - 0.0).abs() < 1e-12);
        assert!((hits[1].0 - 1.0).abs() < 1e-12);
        assert!((hits[1].1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn parallel_disjoint_lines() {
        let a = Line::new((0.0, 0.0), (10.0, 0.0));
        let b = Line::new((0.0, 1.0), (10.0, 1.0));
        assert!(line_line(a, b).is_empty());
    }

    #[test]
    fn quad_through_line() {
        let q = PathSeg::Quad(QuadBez::new((0.0, 0.0), (5.0, 10.0), (10.0, 0.0)));
        let l = Line::new((0.0, 2.5), (10.0, 2.5));
        let hits = line_curve(&q, l);
        assert_eq!(hits.len(), 2);
        for &(t, _) in &hits {
            let p = q.eval(t);
            assert!((p.y - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn cubics_crossing_once() {
        let a = CubicBez::new((0.0, 0.0), (3.0, 4.0), (7.0, 4.0), (10.0, 0.0));
        let b = CubicBez::new((0.0, 3.0), (3.0, -1.0), (7.0, -1.0), (10.0, 3.0));
        let hits = curve_curve(&a, &b);
        assert_eq!(hits.len(), 2);
        for &(t, s) in &hits {
            let p = a.eval(t);
            let q = b.eval(s);
            assert!((p - q).hypot() < 1e-4, "{p:?} vs {q:?}");
        }
    }

    #[test]
    fn adjacent_cubics_share_endpoint() {
        let a = CubicBez::new((0.0, 0.0), (1.0, 2.0), (3.0, 2.0), (4.0, 0.0));
        let b = CubicBez::new((4.0, 0.0), (5.0, -2.0), (7.0, -2.0), (8.0, 0.0));
        let hits = curve_curve(&a, &b);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0], (1.0, 0.0));
    }

    #[test]
    fn horizontal_span_against_diagonal() {
        let l = PathSeg::Line(Line::new((0.0, 0.0), (10.0, 10.0)));
        let hits = horizontal_intersect(&l, 0.0, 10.0, 5.0, false);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].0 - 0.5).abs() < 1e-12);
        assert!((hits[0].1 - 0.5).abs() < 1e-12);

        let flipped = horizontal_intersect(&l, 0.0, 10.0, 5.0, true);
        assert!((flipped[0].1 - 0.5).abs() < 1e-12);
    }

    #[test]
    fn vertical_ray_through_quad() {
        let q = PathSeg::Quad(QuadBez::new((0.0, 0.0), (5.0, 10.0), (10.0, 0.0)));
        let hits = vertical_ray_hits(&q, 5.0);
        assert_eq!(hits.len(), 1);
        assert!((hits[0] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn edge_on_vertical_line() {
        let v = PathSeg::Line(Line::new((5.0, 0.0), (5.0, 10.0)));
        let hits = vertical_ray_hits(&v, 5.0);
        assert_eq!(hits.len(), 2);
    }
}
