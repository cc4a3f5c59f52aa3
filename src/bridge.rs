//! The winding pass and the bridge walker that emits the output.

use kurbo::{PathSeg, Point};

use crate::angle::sort_angles;
use crate::contour::{Contour, ContourIdx};
use crate::curve;
use crate::num::scalar_pt;
use crate::segments::{is_outside, SegIdx, Segments};
use crate::PathSink;

/// The contour and segment owning the topmost live point, scanning the
/// (top, left)-ordered contour list.
fn find_top_contour(
    segments: &Segments,
    contours: &[Contour],
    order: &[ContourIdx],
) -> Option<(ContourIdx, SegIdx)> {
    let mut best: Option<(ContourIdx, SegIdx)> = None;
    let mut best_y = f64::MAX;
    for &c_idx in order {
        let contour = &contours[c_idx.0];
        if best.is_some() && best_y < contour.bounds.min_y() {
            continue;
        }
        let mut test_y = f64::MAX;
        let Some(seg) = contour.top_segment(segments, &mut test_y) else {
            continue;
        };
        if best.is_none() || test_y < best_y {
            best = Some((c_idx, seg));
            best_y = test_y;
        }
    }
    best
}

/// A contour crossed by this one shares its enclosing winding; reuse it
/// rather than ray-casting again.
fn propagated_winding(contours: &mut [Contour], idx: ContourIdx) -> Option<i32> {
    if let Some(w) = contours[idx.0].winding_sum {
        return Some(w);
    }
    for i in 0..contours[idx.0].crosses.len() {
        let crosser = contours[idx.0].crosses[i];
        if let Some(w) = contours[crosser.0].winding_sum {
            contours[idx.0].winding_sum = Some(w);
            return Some(w);
        }
    }
    None
}

/// Shoots a vertical ray up from `base_pt` and accumulates the winding of
/// whatever encloses the base contour. Contours cross-linked to the base
/// cannot enclose it and are skipped.
fn inner_contour_check(
    segments: &Segments,
    contours: &mut [Contour],
    order: &[ContourIdx],
    base: ContourIdx,
    base_pt: Point,
) -> i32 {
    let mut winding = 0;
    let mut best_y = f64::MIN;
    for &c_idx in order {
        let contour = &contours[c_idx.0];
        if base_pt.y < contour.bounds.min_y() {
            continue;
        }
        if best_y > contour.bounds.max_y() {
            continue;
        }
        if c_idx == base || contours[base.0].crosses(c_idx) {
            continue;
        }
        let mut t_index = 0usize;
        let mut hit_t = 0.0f64;
        let Some(hit_seg) =
            contour.crossed_segment(segments, base_pt, &mut best_y, &mut t_index, &mut hit_t)
        else {
            continue;
        };

        let seg = &segments[hit_seg];
        let probe_seg;
        if hit_t == seg.t(t_index) {
            // The ray struck a junction; the span on either side may carry
            // the winding, so consult the sorted wheel and take the edge
            // with a usable horizontal derivative.
            let Some(end) = seg
                .next_span(t_index, 1)
                .or_else(|| seg.next_span(t_index, -1))
            else {
                continue;
            };
            let mut angles = Vec::new();
            segments.add_two_angles(hit_seg, t_index, end, &mut angles);
            segments.build_angles(hit_seg, t_index, &mut angles);
            sort_angles(&mut angles);
            let Some(mut angle) = angles.first().copied() else {
                continue;
            };
            if curve::dx_at_t(segments[angle.segment()].curve(), hit_t) == 0.0 {
                angle = *angles.last().unwrap();
            }
            probe_seg = angle.segment();
            let min = angle.start().min(angle.end());
            winding = segments[probe_seg].spans()[min]
                .wind_sum
                .unwrap_or_default();
        } else {
            probe_seg = hit_seg;
            winding = seg.spans()[t_index].wind_sum.unwrap_or_default();
        }

        // A positive-dX exit (or negative-dX entry) means the ray left the
        // enclosing region rather than entering it; compensate.
        let dx = curve::dx_at_t(segments[probe_seg].curve(), hit_t);
        if dx == 0.0 {
            log::debug!("flat ray hit on {probe_seg:?}; winding left unadjusted");
            continue;
        }
        if (winding > 0 && dx > 0.0) || (winding < 0 && dx < 0.0) {
            winding += if dx > 0.0 { -1 } else { 1 };
        }
    }
    contours[base.0].winding_sum = Some(winding);
    winding
}

fn add_curve_to<S: PathSink>(
    segments: &Segments,
    seg_idx: SegIdx,
    start: usize,
    end: usize,
    sink: &mut S,
    active: bool,
) -> Point {
    let seg = &segments[seg_idx];
    let edge = curve::sub_segment(seg.curve(), seg.t(start), seg.t(end));
    if active {
        match edge {
            PathSeg::Line(l) => sink.line_to(scalar_pt(l.p1)),
            PathSeg::Quad(q) => sink.quad_to(scalar_pt(q.p1), scalar_pt(q.p2)),
            PathSeg::Cubic(c) => sink.curve_to(scalar_pt(c.p1), scalar_pt(c.p2), scalar_pt(c.p3)),
        }
    }
    scalar_pt(match edge {
        PathSeg::Line(l) => l.p1,
        PathSeg::Quad(q) => q.p2,
        PathSeg::Cubic(c) => c.p3,
    })
}

/// Repeatedly seeds at the topmost live edge and traces output contours,
/// following inside/outside transitions of the fill rule, until nothing is
/// left.
pub(crate) fn bridge<S: PathSink>(
    segments: &mut Segments,
    contours: &mut [Contour],
    order: &[ContourIdx],
    even_odd: bool,
    sink: &mut S,
) {
    let mut first_contour = true;
    while let Some((top_contour, top_start)) = find_top_contour(segments, contours, order) {
        let Some((mut current, mut index, mut end_index)) = segments.find_top(top_start) else {
            log::debug!("unusable top seed {top_start:?}; retiring it");
            segments.seg_mut(top_start).retire();
            continue;
        };

        // Above the top point is outside. The first contour of the output
        // seeds the winding bookkeeping; later traces prefer the winding
        // already recorded on the seed span (valid for either traversal
        // direction, since the recorded sum sits right of the forward
        // direction), then a winding propagated across crossings, then a
        // ray cast.
        let mut winding = 0;
        let seed = index.min(end_index);
        let seed_span = &segments[current].spans()[seed];
        if let Some(w) = seed_span.wind_sum {
            winding = if index < end_index {
                w + seed_span.wind_value
            } else {
                w
            };
        } else if !first_contour {
            winding = match propagated_winding(contours, top_contour) {
                Some(w) => w,
                None => {
                    let top_point = segments[current].xy_at_index(end_index);
                    inner_contour_check(segments, contours, order, top_contour, top_point)
                }
            };
        }
        let mut span_winding = segments[current].span_sign(index, end_index);
        if first_contour {
            contours[top_contour.0].winding_sum = Some(span_winding);
            first_contour = false;
        }
        // The traced edge is part of the output iff it separates inside
        // from outside.
        let active = if even_odd {
            is_outside(winding, true) != is_outside(winding + span_winding, true)
        } else {
            winding * span_winding <= 0
        };

        let mut first_pt: Option<Point> = None;
        loop {
            if segments[current].done() {
                log::debug!("trace re-entered consumed {current:?}; abandoning");
                break;
            }
            let next =
                segments.find_next(current, winding + span_winding, index, end_index, even_odd);
            let Some((next_seg, next_start, next_end)) = next else {
                // Consume the stuck edge so this seed cannot recur.
                segments
                    .seg_mut(current)
                    .mark_done(index.min(end_index), winding);
                break;
            };
            if first_pt.is_none() {
                let p = segments[current].xy_at_index(index);
                if active {
                    sink.move_to(p);
                }
                first_pt = Some(p);
            }
            let last_pt = add_curve_to(segments, current, index, end_index, sink, active);
            current = next_seg;
            index = next_start;
            end_index = next_end;
            span_winding =
                span_winding.signum() * segments[current].wind_value_min(index, end_index);
            if first_pt == Some(last_pt) {
                break;
            }
        }
        if active && first_pt.is_some() {
            sink.close();
        }
    }
}
