//! Numeric odds and ends shared by the whole pipeline.

/// The tolerance used for every equality-of-T comparison.
///
/// Spans whose T values differ by less than this belong to the same
/// equivalence cluster and are treated as one junction by every consumer
/// (`next_span`, `mark_done`, `mark_winding`, angle building, and the
/// coincidence walks). Having exactly one constant here is load-bearing:
/// two walks disagreeing about adjacency produces inconsistent span graphs.
pub(crate) const T_EPSILON: f64 = f32::EPSILON as f64;

/// Rounds a coordinate to single precision.
///
/// Input points are rounded on ingestion and output points on emission, so
/// exact `==` comparisons of stored coordinates behave like the
/// single-precision boundary they model. Geometry in between is all `f64`.
pub(crate) fn scalar(x: f64) -> f64 {
    x as f32 as f64
}

pub(crate) fn scalar_pt(p: kurbo::Point) -> kurbo::Point {
    kurbo::Point::new(scalar(p.x), scalar(p.y))
}

/// A wrapper for `f64` that implements `Ord`.
///
/// Unlike the more principled wrappers in the `ordered_float` crate, this
/// one just declares NaNs equal to everything instead of ordering or
/// rejecting them. The pipeline never produces NaN sort keys (inputs are
/// validated finite), so paying for NaN handling on every comparison buys
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub(crate) struct CheapOrderedFloat(f64);

impl Eq for CheapOrderedFloat {}

impl PartialOrd for CheapOrderedFloat {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CheapOrderedFloat {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.0 < other.0 {
            std::cmp::Ordering::Less
        } else if self.0 > other.0 {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    }
}

impl From<f64> for CheapOrderedFloat {
    fn from(value: f64) -> Self {
        CheapOrderedFloat(value)
    }
}

/// Orders points by `y` and then by `x`.
///
/// The bridge starts every output contour from the topmost, then leftmost,
/// unprocessed point, so this ordering shows up anywhere a "top" is chosen.
pub(crate) fn point_cmp(a: kurbo::Point, b: kurbo::Point) -> std::cmp::Ordering {
    (CheapOrderedFloat::from(a.y), CheapOrderedFloat::from(a.x)).cmp(&(
        CheapOrderedFloat::from(b.y),
        CheapOrderedFloat::from(b.x),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cheap_ordering() {
        let a = CheapOrderedFloat::from(1.0);
        let b = CheapOrderedFloat::from(2.0);
        assert!(a < b);
        assert!(a == a);
        assert!(b > a);
    }

    #[test]
    fn points_order_by_y_first() {
        use kurbo::Point;
        let top = Point::new(10.0, 0.0);
        let bottom = Point::new(0.0, 1.0);
        assert_eq!(point_cmp(top, bottom), std::cmp::Ordering::Less);
        assert_eq!(
            point_cmp(Point::new(0.0, 1.0), Point::new(1.0, 1.0)),
            std::cmp::Ordering::Less
        );
    }

    #[test]
    fn scalar_rounds_to_f32() {
        let x = 0.1f64 + 1e-12;
        assert_eq!(scalar(x), 0.1f32 as f64);
    }
}
