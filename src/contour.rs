//! Contours: ordered runs of segments with their shared bookkeeping.

use kurbo::{Point, Rect};

use crate::intersect::TPairs;
use crate::num::CheapOrderedFloat;
use crate::segments::{SegIdx, Segments};

/// An index into the contour list.
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub(crate) struct ContourIdx(pub usize);

impl std::fmt::Debug for ContourIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c_{}", self.0)
    }
}

/// A pair of segments found to share a run of geometry, with the T interval
/// of the run on each side. Recorded during the intersection pass, applied
/// during coincidence resolution.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Coincidence {
    pub segs: [SegIdx; 2],
    /// `ts[i]` is the interval on `segs[i]`, unordered.
    pub ts: [[f64; 2]; 2],
}

pub(crate) struct Contour {
    pub segs: Vec<SegIdx>,
    pub bounds: Rect,
    /// The winding of the region just outside this contour, once known.
    pub winding_sum: Option<i32>,
    /// Contours sharing an intersection with this one. They cannot enclose
    /// each other, so the winding ray skips them.
    pub crosses: Vec<ContourIdx>,
    pub coincidences: Vec<Coincidence>,
}

impl Contour {
    pub fn new() -> Self {
        Contour {
            segs: Vec::new(),
            bounds: Rect::ZERO,
            winding_sum: None,
            crosses: Vec::new(),
            coincidences: Vec::new(),
        }
    }

    /// Finalizes the contour: its bounds become the union of its segments'.
    pub fn complete(&mut self, segments: &Segments) {
        let mut iter = self.segs.iter();
        let Some(&first) = iter.next() else {
            return;
        };
        let mut bounds = segments[first].bounds();
        for &idx in iter {
            bounds = bounds.union(segments[idx].bounds());
        }
        self.bounds = bounds;
    }

    pub fn add_cross(&mut self, other: ContourIdx) {
        if !self.crosses.contains(&other) {
            self.crosses.push(other);
        }
    }

    pub fn crosses(&self, other: ContourIdx) -> bool {
        self.crosses.contains(&other)
    }

    /// Records a coincident run between `seg` (ours) and `other_seg`.
    /// `swap` says the intersector's primary operand was `other_seg`.
    pub fn add_coincidence(&mut self, seg: SegIdx, other_seg: SegIdx, hits: &TPairs, swap: bool) {
        debug_assert_eq!(hits.len(), 2);
        let primary = [hits[0].0, hits[1].0];
        let secondary = [hits[0].1, hits[1].1];
        let ts = if swap {
            [secondary, primary]
        } else {
            [primary, secondary]
        };
        self.coincidences.push(Coincidence {
            segs: [seg, other_seg],
            ts,
        });
    }

    /// The not-done segment with the smallest live y, if any.
    pub fn top_segment(&self, segments: &Segments, best_y: &mut f64) -> Option<SegIdx> {
        let mut live = self.segs.iter().filter(|&&s| !segments[s].done());
        let mut best = *live.next()?;
        let mut best_top = segments[best].active_top();
        for &s in live {
            if segments[s].bounds().min_y() > best_top {
                continue;
            }
            let test_top = segments[s].active_top();
            if best_top > test_top {
                best_top = test_top;
                best = s;
            }
        }
        *best_y = best_top;
        Some(best)
    }

    /// Probes every segment whose bounds straddle the vertical ray through
    /// `base_pt`, keeping the best hit across the whole contour.
    pub fn crossed_segment(
        &self,
        segments: &Segments,
        base_pt: Point,
        best_y: &mut f64,
        t_index: &mut usize,
        hit_t: &mut f64,
    ) -> Option<SegIdx> {
        let mut best = None;
        for &s in &self.segs {
            let bounds = segments[s].bounds();
            if bounds.min_y() < *best_y {
                continue;
            }
            if bounds.min_y() > base_pt.y {
                continue;
            }
            if bounds.min_x() > base_pt.x || bounds.max_x() < base_pt.x {
                continue;
            }
            let mut test_hit_t = 0.0;
            if let Some(test_t) = segments.crossed_span(s, base_pt, best_y, &mut test_hit_t) {
                best = Some(s);
                *t_index = test_t;
                *hit_t = test_hit_t;
            }
        }
        best
    }
}

/// Contour indices sorted by (top, left) of their bounds, the order the
/// intersection pass and the bridge consume them in.
pub(crate) fn sorted_contours(contours: &[Contour]) -> Vec<ContourIdx> {
    let mut order: Vec<ContourIdx> = (0..contours.len()).map(ContourIdx).collect();
    order.sort_by_key(|&idx| {
        let b = contours[idx.0].bounds;
        (
            CheapOrderedFloat::from(b.min_y()),
            CheapOrderedFloat::from(b.min_x()),
        )
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contour_with_bounds(x0: f64, y0: f64, x1: f64, y1: f64) -> Contour {
        let mut c = Contour::new();
        c.bounds = Rect::new(x0, y0, x1, y1);
        c
    }

    #[test]
    fn contours_sort_top_then_left() {
        let contours = vec![
            contour_with_bounds(5.0, 1.0, 6.0, 2.0),
            contour_with_bounds(0.0, 0.0, 1.0, 1.0),
            contour_with_bounds(3.0, 0.0, 4.0, 1.0),
        ];
        let order = sorted_contours(&contours);
        assert_eq!(order, vec![ContourIdx(1), ContourIdx(2), ContourIdx(0)]);
    }

    #[test]
    fn cross_links_deduplicate() {
        let mut c = Contour::new();
        c.add_cross(ContourIdx(2));
        c.add_cross(ContourIdx(2));
        assert_eq!(c.crosses.len(), 1);
        assert!(c.crosses(ContourIdx(2)));
        assert!(!c.crosses(ContourIdx(3)));
    }

    #[test]
    fn coincidence_swap_orientation() {
        let mut c = Contour::new();
        let mut hits = TPairs::new();
        hits.push((0.25, 0.75));
        hits.push((0.5, 1.0));
        c.add_coincidence(SegIdx(0), SegIdx(1), &hits, false);
        c.add_coincidence(SegIdx(0), SegIdx(1), &hits, true);
        // Unswapped: primary Ts belong to our segment.
        assert_eq!(c.coincidences[0].ts[0], [0.25, 0.5]);
        assert_eq!(c.coincidences[0].ts[1], [0.75, 1.0]);
        // Swapped: primary Ts belong to the other segment.
        assert_eq!(c.coincidences[1].ts[0], [0.75, 1.0]);
        assert_eq!(c.coincidences[1].ts[1], [0.25, 0.5]);
    }
}
