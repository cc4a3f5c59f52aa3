#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

mod angle;
mod bridge;
mod builder;
mod contour;
mod cross;
mod curve;
mod intersect;
mod num;
mod segments;

#[cfg(any(test, feature = "arbitrary"))]
pub mod arbitrary;

use kurbo::{BezPath, Point};

/// How the input path decides what is inside.
///
/// The output is always to be interpreted even-odd; the inverse variants
/// exist because callers carry them around, but the inverse bit has no
/// effect on the emitted outline (inverting is a fill-time concern).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FillRule {
    /// A point is inside iff a generic ray from it crosses the boundary an
    /// odd number of times.
    EvenOdd,
    /// A point is inside iff its winding number is non-zero.
    Winding,
    /// The complement of [`FillRule::EvenOdd`].
    InverseEvenOdd,
    /// The complement of [`FillRule::Winding`].
    InverseWinding,
}

impl FillRule {
    fn base_winding(self) -> i32 {
        match self {
            FillRule::EvenOdd | FillRule::InverseEvenOdd => 1,
            FillRule::Winding | FillRule::InverseWinding => -1,
        }
    }
}

/// The input coordinates were faulty.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Error {
    /// At least one of the inputs was infinite.
    Infinity,
    /// At least one of the inputs was not a number.
    NaN,
}

/// Receives the simplified outline, verb by verb.
///
/// Every contour is delivered as one `move_to`, a run of `line_to` /
/// `quad_to` / `curve_to`, and a final `close`.
pub trait PathSink {
    /// Starts a new contour at `p`.
    fn move_to(&mut self, p: Point);
    /// Appends a line to `p`.
    fn line_to(&mut self, p: Point);
    /// Appends a quadratic Bézier through control point `p1` to `p2`.
    fn quad_to(&mut self, p1: Point, p2: Point);
    /// Appends a cubic Bézier through `p1` and `p2` to `p3`.
    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point);
    /// Closes the current contour.
    fn close(&mut self);
}

impl PathSink for BezPath {
    fn move_to(&mut self, p: Point) {
        BezPath::move_to(self, p);
    }

    fn line_to(&mut self, p: Point) {
        BezPath::line_to(self, p);
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        BezPath::quad_to(self, p1, p2);
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        BezPath::curve_to(self, p1, p2, p3);
    }

    fn close(&mut self) {
        self.close_path();
    }
}

/// Rewrites `path` as one or more simple closed contours that cover the
/// same region under the even-odd fill rule.
///
/// Self-intersections become explicit vertices, coincident edge runs are
/// merged or cancelled, and enclosed windings are resolved so the result
/// renders identically whether the input used even-odd or winding fill.
pub fn simplify(path: &BezPath, fill_rule: FillRule) -> Result<BezPath, Error> {
    let mut out = BezPath::new();
    simplify_into(path, fill_rule, &mut out)?;
    Ok(out)
}

/// Like [`simplify`], but delivers the outline to any [`PathSink`].
pub fn simplify_into<S: PathSink>(
    path: &BezPath,
    fill_rule: FillRule,
    sink: &mut S,
) -> Result<(), Error> {
    // Reject junk coordinates up front. Checked point by point: min/max
    // folds (as in a bounding box) silently discard NaN.
    let mut nan = false;
    let mut infinite = false;
    let mut check = |p: Point| {
        if p.x.is_nan() || p.y.is_nan() {
            nan = true;
        } else if !p.x.is_finite() || !p.y.is_finite() {
            infinite = true;
        }
    };
    for el in path.elements() {
        match *el {
            kurbo::PathEl::MoveTo(p) | kurbo::PathEl::LineTo(p) => check(p),
            kurbo::PathEl::QuadTo(p1, p2) => {
                check(p1);
                check(p2);
            }
            kurbo::PathEl::CurveTo(p1, p2, p3) => {
                check(p1);
                check(p2);
                check(p3);
            }
            kurbo::PathEl::ClosePath => {}
        }
    }
    if nan {
        return Err(Error::NaN);
    }
    if infinite {
        return Err(Error::Infinity);
    }

    let base_winding = fill_rule.base_winding();
    let mut segments = segments::Segments::default();
    let mut contours = Vec::new();
    builder::build(path, &mut segments, &mut contours);
    if contours.is_empty() {
        return Ok(());
    }
    let order = contour::sorted_contours(&contours);

    for i in 0..order.len() {
        for j in i..order.len() {
            if !cross::add_intersect_ts(&mut segments, &mut contours, order[i], order[j]) {
                break;
            }
        }
    }
    segments.fix_other_t_index();
    cross::coincidence_check(&mut segments, &contours, base_winding);
    // Coincidence resolution may have inserted spans; repair the links
    // again before anything walks them.
    segments.fix_other_t_index();
    bridge::bridge(
        &mut segments,
        &mut contours,
        &order,
        base_winding > 0,
        sink,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    #[test]
    fn empty_path() {
        let out = simplify(&BezPath::new(), FillRule::EvenOdd).unwrap();
        assert!(out.elements().is_empty());
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((f64::INFINITY, 0.0));
        p.line_to((1.0, 1.0));
        p.close_path();
        assert_eq!(simplify(&p, FillRule::EvenOdd), Err(Error::Infinity));

        let mut p = BezPath::new();
        p.move_to((0.0, f64::NAN));
        p.line_to((1.0, 0.0));
        p.close_path();
        assert_eq!(simplify(&p, FillRule::EvenOdd), Err(Error::NaN));
    }

    #[test]
    fn lone_square_survives() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((10.0, 0.0));
        p.line_to((10.0, 10.0));
        p.line_to((0.0, 10.0));
        p.close_path();
        let out = simplify(&p, FillRule::EvenOdd).unwrap();

        let mut moves = 0;
        let mut lines = 0;
        let mut closes = 0;
        for el in out.elements() {
            match el {
                kurbo::PathEl::MoveTo(_) => moves += 1,
                kurbo::PathEl::LineTo(_) => lines += 1,
                kurbo::PathEl::ClosePath => closes += 1,
                other => panic!("unexpected verb {other:?}"),
            }
        }
        assert_eq!(moves, 1);
        assert_eq!(closes, 1);
        assert!(lines >= 3);
        // Same region: a point inside stays inside, outside stays outside.
        assert_ne!(out.winding(Point::new(5.0, 5.0)) % 2, 0);
        assert_eq!(out.winding(Point::new(15.0, 5.0)) % 2, 0);
    }
}
