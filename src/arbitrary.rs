//! Utilities for fuzz and/or property testing using `arbitrary`.

use arbitrary::Unstructured;
use kurbo::BezPath;

/// Generate an arbitrary float in some range.
pub fn float_in_range(
    start: f64,
    end: f64,
    u: &mut Unstructured<'_>,
) -> Result<f64, arbitrary::Error> {
    let num: u32 = u.arbitrary()?;
    let t = num as f64 / u32::MAX as f64;
    Ok((1.0 - t) * start + t * end)
}

fn coord(u: &mut Unstructured<'_>) -> Result<f64, arbitrary::Error> {
    float_in_range(-1e3, 1e3, u)
}

fn point(u: &mut Unstructured<'_>) -> Result<(f64, f64), arbitrary::Error> {
    Ok((coord(u)?, coord(u)?))
}

/// Generate a path of a few closed contours mixing lines and quads.
///
/// The coordinates are bounded, so the result always passes input
/// validation; everything else (self-intersections, coincident edges,
/// degenerate verbs) is fair game.
pub fn closed_path(u: &mut Unstructured<'_>) -> Result<BezPath, arbitrary::Error> {
    let contour_count = u.int_in_range(1..=3)?;
    let mut path = BezPath::new();
    for _ in 0..contour_count {
        let vertex_count = u.int_in_range(3..=8)?;
        let first = point(u)?;
        path.move_to(first);
        for _ in 1..vertex_count {
            let p = point(u)?;
            if u.arbitrary()? {
                path.quad_to(point(u)?, p);
            } else {
                path.line_to(p);
            }
        }
        path.close_path();
    }
    Ok(path)
}
