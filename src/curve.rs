//! Verb-generic helpers over [`kurbo::PathSeg`].
//!
//! Everything downstream manipulates segments through this thin layer:
//! evaluation, derivatives, subdivision, bounds, order reduction. The
//! reference tables live in kurbo; this module only adds what kurbo does not
//! express directly (reduction, promotion, verb classification).

use kurbo::{
    CubicBez, Line, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, PathSeg, Point, QuadBez, Rect,
    Vec2,
};

/// Which intersection fast path a segment takes.
///
/// Axis-aligned lines get dedicated intersectors; the ordering of the checks
/// (horizontal before vertical) decides which one a degenerate-but-nonempty
/// line lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum SegmentKind {
    HorizontalLine,
    VerticalLine,
    Line,
    Quad,
    Cubic,
}

impl SegmentKind {
    pub fn is_line(self) -> bool {
        self <= SegmentKind::Line
    }
}

pub(crate) fn kind(seg: &PathSeg) -> SegmentKind {
    match seg {
        PathSeg::Line(line) => {
            if line.p0.y == line.p1.y {
                SegmentKind::HorizontalLine
            } else if line.p0.x == line.p1.x {
                SegmentKind::VerticalLine
            } else {
                SegmentKind::Line
            }
        }
        PathSeg::Quad(_) => SegmentKind::Quad,
        PathSeg::Cubic(_) => SegmentKind::Cubic,
    }
}

pub(crate) fn xy_at_t(seg: &PathSeg, t: f64) -> Point {
    seg.eval(t)
}

pub(crate) fn dxdy_at_t(seg: &PathSeg, t: f64) -> Vec2 {
    match seg {
        PathSeg::Line(line) => line.p1 - line.p0,
        PathSeg::Quad(q) => q.deriv().eval(t).to_vec2(),
        PathSeg::Cubic(c) => c.deriv().eval(t).to_vec2(),
    }
}

pub(crate) fn dx_at_t(seg: &PathSeg, t: f64) -> f64 {
    dxdy_at_t(seg, t).x
}

pub(crate) fn sub_segment(seg: &PathSeg, t0: f64, t1: f64) -> PathSeg {
    seg.subsegment(t0..t1)
}

pub(crate) fn seg_bounds(seg: &PathSeg) -> Rect {
    seg.bounding_box()
}

fn collinear(a: Point, b: Point, c: Point) -> bool {
    let ab = b - a;
    let ac = c - a;
    ab.cross(ac).abs() <= 1e-9 * ab.hypot() * ac.hypot()
}

/// Does the subdivided piece of `seg` between `t0` and `t1` trace a line?
pub(crate) fn is_linear(seg: &PathSeg, t0: f64, t1: f64) -> bool {
    match sub_segment(seg, t0, t1) {
        PathSeg::Line(_) => true,
        PathSeg::Quad(q) => collinear(q.p0, q.p1, q.p2),
        PathSeg::Cubic(c) => collinear(c.p0, c.p1, c.p3) && collinear(c.p0, c.p2, c.p3),
    }
}

/// The result of order reduction.
///
/// `Point` means the curve is degenerate and contributes no edge at all.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Reduced {
    Point,
    Line(Line),
    Quad(QuadBez),
    Cubic(CubicBez),
}

fn within_box(p: Point, a: Point, b: Point) -> bool {
    let (x0, x1) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
    let (y0, y1) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
    (x0..=x1).contains(&p.x) && (y0..=y1).contains(&p.y)
}

/// Reduces a quadratic to a line or a point where the control net allows it.
///
/// A collinear control point that sticks out past the endpoints makes the
/// trace double back on itself; such quads are kept as quads rather than
/// mislabeled as their chord.
pub(crate) fn reduce_quad(q: &QuadBez) -> Reduced {
    if q.p0 == q.p2 && q.p0 == q.p1 {
        return Reduced::Point;
    }
    if collinear(q.p0, q.p1, q.p2) && within_box(q.p1, q.p0, q.p2) {
        if q.p0 == q.p2 {
            return Reduced::Point;
        }
        return Reduced::Line(Line::new(q.p0, q.p2));
    }
    Reduced::Quad(*q)
}

/// Reduces a cubic to a quadratic, a line, or a point where possible.
pub(crate) fn reduce_cubic(c: &CubicBez) -> Reduced {
    if c.p0 == c.p3 && c.p0 == c.p1 && c.p0 == c.p2 {
        return Reduced::Point;
    }
    if collinear(c.p0, c.p1, c.p3)
        && collinear(c.p0, c.p2, c.p3)
        && within_box(c.p1, c.p0, c.p3)
        && within_box(c.p2, c.p0, c.p3)
    {
        if c.p0 == c.p3 {
            return Reduced::Point;
        }
        return Reduced::Line(Line::new(c.p0, c.p3));
    }
    // A cubic whose third difference vanishes is an elevated quadratic;
    // recover the quad control point by averaging the two candidates.
    let ddd = (c.p3 - c.p0) + (c.p1 - c.p2) * 3.0;
    let scale = (c.p3 - c.p0).hypot() + (c.p1 - c.p0).hypot() + (c.p2 - c.p3).hypot();
    if ddd.hypot() <= 1e-9 * scale {
        let c1 = Point::new(3.0 * c.p1.x - c.p0.x, 3.0 * c.p1.y - c.p0.y);
        let c2 = Point::new(3.0 * c.p2.x - c.p3.x, 3.0 * c.p2.y - c.p3.y);
        let control = Point::new((c1.x + c2.x) / 4.0, (c1.y + c2.y) / 4.0);
        return reduce_quad(&QuadBez::new(c.p0, control, c.p3));
    }
    Reduced::Cubic(*c)
}

/// Exact degree elevation, used when a quad meets a cubic in the
/// intersection pass.
pub(crate) fn promote_to_cubic(q: &QuadBez) -> CubicBez {
    q.raise()
}

pub(crate) fn as_cubic(seg: &PathSeg) -> CubicBez {
    match seg {
        PathSeg::Quad(q) => promote_to_cubic(q),
        _ => seg.to_cubic(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_lines() {
        let h = PathSeg::Line(Line::new((0.0, 1.0), (5.0, 1.0)));
        let v = PathSeg::Line(Line::new((2.0, 0.0), (2.0, 5.0)));
        let d = PathSeg::Line(Line::new((0.0, 0.0), (1.0, 1.0)));
        assert_eq!(kind(&h), SegmentKind::HorizontalLine);
        assert_eq!(kind(&v), SegmentKind::VerticalLine);
        assert_eq!(kind(&d), SegmentKind::Line);
        assert!(kind(&h).is_line());
        assert!(!kind(&PathSeg::Quad(QuadBez::new(
            (0.0, 0.0),
            (1.0, 1.0),
            (2.0, 0.0)
        )))
        .is_line());
    }

    #[test]
    fn reduce_degenerate_quad() {
        let q = QuadBez::new((1.0, 1.0), (1.0, 1.0), (1.0, 1.0));
        assert!(matches!(reduce_quad(&q), Reduced::Point));

        let q = QuadBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 2.0));
        match reduce_quad(&q) {
            Reduced::Line(line) => {
                assert_eq!(line.p0, Point::new(0.0, 0.0));
                assert_eq!(line.p1, Point::new(2.0, 2.0));
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn quad_that_doubles_back_stays_a_quad() {
        // Control point collinear but outside the chord.
        let q = QuadBez::new((0.0, 0.0), (4.0, 0.0), (2.0, 0.0));
        assert!(matches!(reduce_quad(&q), Reduced::Quad(_)));
    }

    #[test]
    fn reduce_elevated_quad() {
        let q = QuadBez::new((0.0, 0.0), (3.0, 6.0), (6.0, 0.0));
        let c = promote_to_cubic(&q);
        match reduce_cubic(&c) {
            Reduced::Quad(r) => {
                assert!((r.p1 - q.p1).hypot() < 1e-9);
            }
            other => panic!("expected quad, got {other:?}"),
        }
    }

    #[test]
    fn reduce_collinear_cubic() {
        let c = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0));
        assert!(matches!(reduce_cubic(&c), Reduced::Line(_)));
    }

    #[test]
    fn subdivision_matches_eval() {
        let c = PathSeg::Cubic(CubicBez::new(
            (0.0, 0.0),
            (1.0, 3.0),
            (3.0, -1.0),
            (4.0, 2.0),
        ));
        let sub = sub_segment(&c, 0.25, 0.75);
        let mid_whole = xy_at_t(&c, 0.5);
        let mid_sub = xy_at_t(&sub, 0.5);
        assert!((mid_whole - mid_sub).hypot() < 1e-12);
    }
}
