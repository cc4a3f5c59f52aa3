//! The pairwise intersection pass and coincidence resolution.

use kurbo::{Line, PathSeg, Rect};

use crate::contour::{Contour, ContourIdx};
use crate::curve::{self, SegmentKind};
use crate::intersect::{self, TPairs};
use crate::num::T_EPSILON;
use crate::segments::Segments;

/// Closed-interval bounds overlap; a degenerate (line) box still counts.
fn bounds_intersect(a: Rect, b: Rect) -> bool {
    a.min_x() <= b.max_x()
        && b.min_x() <= a.max_x()
        && a.min_y() <= b.max_y()
        && b.min_y() <= a.max_y()
}

fn h_params(line: &Line) -> (f64, f64, f64, bool) {
    if line.p0.x <= line.p1.x {
        (line.p0.x, line.p1.x, line.p0.y, false)
    } else {
        (line.p1.x, line.p0.x, line.p0.y, true)
    }
}

fn v_params(line: &Line) -> (f64, f64, f64, bool) {
    if line.p0.y <= line.p1.y {
        (line.p0.y, line.p1.y, line.p0.x, false)
    } else {
        (line.p1.y, line.p0.y, line.p0.x, true)
    }
}

/// Dispatches one segment pair to the right intersector.
///
/// The returned flag says the *secondary* parameters belong to `wt`: the
/// axis-aligned fast paths and the quad/cubic-against-line paths want the
/// curve as primary operand, so the operands are swapped as needed.
fn dispatch(wt: &PathSeg, wn: &PathSeg) -> (TPairs, bool) {
    use SegmentKind::*;
    match (curve::kind(wt), curve::kind(wn)) {
        (HorizontalLine, _) => {
            let PathSeg::Line(l) = wt else { unreachable!() };
            let (left, right, y, flipped) = h_params(l);
            (intersect::horizontal_intersect(wn, left, right, y, flipped), true)
        }
        (VerticalLine, _) => {
            let PathSeg::Line(l) = wt else { unreachable!() };
            let (top, bottom, x, flipped) = v_params(l);
            (intersect::vertical_intersect(wn, top, bottom, x, flipped), true)
        }
        (_, HorizontalLine) => {
            let PathSeg::Line(l) = wn else { unreachable!() };
            let (left, right, y, flipped) = h_params(l);
            (intersect::horizontal_intersect(wt, left, right, y, flipped), false)
        }
        (_, VerticalLine) => {
            let PathSeg::Line(l) = wn else { unreachable!() };
            let (top, bottom, x, flipped) = v_params(l);
            (intersect::vertical_intersect(wt, top, bottom, x, flipped), false)
        }
        (Line, Line) => {
            let (PathSeg::Line(la), PathSeg::Line(lb)) = (wt, wn) else {
                unreachable!()
            };
            (intersect::line_line(*la, *lb), false)
        }
        (Line, _) => {
            let PathSeg::Line(l) = wt else { unreachable!() };
            (intersect::line_curve(wn, *l), true)
        }
        (_, Line) => {
            let PathSeg::Line(l) = wn else { unreachable!() };
            (intersect::line_curve(wt, *l), false)
        }
        _ => (
            intersect::curve_curve(&curve::as_cubic(wt), &curve::as_cubic(wn)),
            false,
        ),
    }
}

/// Intersects every segment of `test` against every segment of `next`
/// (starting past the diagonal when they are the same contour), recording
/// span pairs, coincident intervals, and cross links.
///
/// Returns `false` when `next` lies entirely below `test`; contours are
/// visited in (top, left) order, so the caller can stop scanning.
pub(crate) fn add_intersect_ts(
    segments: &mut Segments,
    contours: &mut [Contour],
    test: ContourIdx,
    next: ContourIdx,
) -> bool {
    if test != next {
        if contours[test.0].bounds.max_y() < contours[next.0].bounds.min_y() {
            return false;
        }
        if !bounds_intersect(contours[test.0].bounds, contours[next.0].bounds) {
            return true;
        }
    }
    let test_segs = contours[test.0].segs.clone();
    let next_segs = contours[next.0].segs.clone();
    let same = test == next;
    let mut found_common = same;
    let last = test_segs.len();

    for (wt_pos, &wt) in test_segs.iter().enumerate() {
        let wn_start = if same { wt_pos + 1 } else { 0 };
        for (wn_off, &wn) in next_segs[wn_start..].iter().enumerate() {
            let wn_pos = wn_start + wn_off;
            if !bounds_intersect(segments[wt].bounds(), segments[wn].bounds()) {
                continue;
            }
            let wt_curve = *segments[wt].curve();
            let wn_curve = *segments[wn].curve();
            let (hits, swap) = dispatch(&wt_curve, &wn_curve);

            if !found_common && !hits.is_empty() {
                contours[test.0].add_cross(next);
                contours[next.0].add_cross(test);
                found_common = true;
            }

            let both_lines = curve::kind(&wt_curve).is_line() && curve::kind(&wn_curve).is_line();
            let coincident = hits.len() == 2 && both_lines;
            if coincident {
                // A shared run of line geometry. Consecutive edges of one
                // contour still need their junction spans before the run is
                // handed to coincidence resolution.
                if same && wn_pos == wt_pos + 1 {
                    segments.add_t_pair(wt, 1.0, wn, 0.0);
                }
                if same && wt_pos == 0 && wn_pos == last - 1 {
                    segments.add_t_pair(wt, 0.0, wn, 1.0);
                }
                contours[test.0].add_coincidence(wt, wn, &hits, swap);
                // Fall through: the interval endpoints become spans, so the
                // coincidence walks have clusters to anchor on even when the
                // overlap covers only part of an edge.
            }

            for &(t0, t1) in &hits {
                let (wt_t, wn_t) = if swap { (t1, t0) } else { (t0, t1) };
                debug_assert!((0.0..=1.0).contains(&wt_t));
                debug_assert!((0.0..=1.0).contains(&wn_t));
                segments.add_t_pair(wt, wt_t, wn, wn_t);
            }
        }
    }
    true
}

/// Applies every recorded coincidence, then sweeps for runs the intersectors
/// were too imprecise to report.
pub(crate) fn coincidence_check(segments: &mut Segments, contours: &[Contour], base_winding: i32) {
    for contour in contours {
        for c in &contour.coincidences {
            let [s0, s1] = c.segs;
            let (mut t0, mut t1) = (c.ts[0][0], c.ts[0][1]);
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            let (mut o0, mut o1) = (c.ts[1][0], c.ts[1][1]);
            if o0 > o1 {
                std::mem::swap(&mut o0, &mut o1);
            }
            if t1 - t0 < T_EPSILON || o1 - o0 < T_EPSILON {
                log::debug!("degenerate coincident interval between {s0:?} and {s1:?}");
                continue;
            }
            if base_winding > 0 || segments.cancels(s0, s1) {
                segments.add_t_cancel(s0, t0, t1, s1, o0, o1);
            } else {
                segments.add_t_coincident(s0, t0, t1, s1, o0, o1);
            }
        }
    }
    for contour in contours {
        for &s in &contour.segs {
            segments.find_too_close(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder;
    use kurbo::BezPath;

    fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        let mut p = BezPath::new();
        p.move_to((x0, y0));
        p.line_to((x1, y0));
        p.line_to((x1, y1));
        p.line_to((x0, y1));
        p.close_path();
        p
    }

    fn run_pass(path: &BezPath) -> (Segments, Vec<Contour>) {
        let mut segments = Segments::default();
        let mut contours = Vec::new();
        builder::build(path, &mut segments, &mut contours);
        let n = contours.len();
        for i in 0..n {
            for j in i..n {
                if !add_intersect_ts(&mut segments, &mut contours, ContourIdx(i), ContourIdx(j)) {
                    break;
                }
            }
        }
        segments.fix_other_t_index();
        (segments, contours)
    }

    #[test]
    fn square_edges_meet_their_neighbors() {
        let (segments, contours) = run_pass(&rect_path(0.0, 0.0, 10.0, 10.0));
        assert_eq!(contours.len(), 1);
        for &s in &contours[0].segs {
            let spans = segments[s].spans();
            assert_eq!(spans.len(), 2, "each edge meets exactly its neighbors");
            assert_eq!(spans[0].t, 0.0);
            assert_eq!(spans[1].t, 1.0);
        }
    }

    #[test]
    fn figure_eight_crossing_recorded() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((10.0, 10.0));
        p.line_to((10.0, 0.0));
        p.line_to((0.0, 10.0));
        p.close_path();
        let (segments, contours) = run_pass(&p);
        // The two diagonals cross mid-way.
        let diag0 = contours[0].segs[0];
        let diag1 = contours[0].segs[2];
        let mid0: Vec<f64> = segments[diag0]
            .spans()
            .iter()
            .map(|s| s.t)
            .filter(|t| (0.0 < *t && *t < 1.0))
            .collect();
        assert_eq!(mid0.len(), 1);
        assert!((mid0[0] - 0.5).abs() < 1e-9);
        assert!(segments[diag0]
            .spans()
            .iter()
            .any(|s| s.other == diag1 && (s.other_t - 0.5).abs() < 1e-9));
    }

    #[test]
    fn overlapping_rectangles_cross_link() {
        let mut p = rect_path(0.0, 0.0, 10.0, 10.0);
        p.extend(rect_path(5.0, 5.0, 15.0, 15.0));
        let (_, contours) = run_pass(&p);
        assert_eq!(contours.len(), 2);
        assert!(contours[0].crosses(ContourIdx(1)));
        assert!(contours[1].crosses(ContourIdx(0)));
    }

    #[test]
    fn disjoint_rectangles_do_not_cross_link() {
        let mut p = rect_path(0.0, 0.0, 10.0, 10.0);
        p.extend(rect_path(20.0, 0.0, 30.0, 10.0));
        let (_, contours) = run_pass(&p);
        assert!(!contours[0].crosses(ContourIdx(1)));
        assert!(contours[0].coincidences.is_empty());
    }

    #[test]
    fn shared_edge_records_coincidence() {
        let mut p = rect_path(0.0, 0.0, 10.0, 10.0);
        p.extend(rect_path(10.0, 0.0, 20.0, 10.0));
        let (_, contours) = run_pass(&p);
        let total: usize = contours.iter().map(|c| c.coincidences.len()).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn identical_squares_cancel_under_even_odd() {
        let mut p = rect_path(0.0, 0.0, 10.0, 10.0);
        p.extend(rect_path(0.0, 0.0, 10.0, 10.0));
        let (mut segments, contours) = run_pass(&p);
        coincidence_check(&mut segments, &contours, 1);
        segments.fix_other_t_index();
        for contour in &contours {
            for &s in &contour.segs {
                assert!(segments[s].done(), "{s:?} should be fully cancelled");
            }
        }
    }
}
