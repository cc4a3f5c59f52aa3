//! Segments, spans, and the arena that owns them.
//!
//! A segment is one line/quad/cubic piece of a contour. Every place another
//! segment touches it is recorded as a [`Span`] on its sorted T-list; the
//! sub-edge between consecutive spans is the unit the bridge walks and
//! consumes. Spans refer to their mates through arena indices, never
//! pointers, so the whole structure is owned by one [`Segments`] value per
//! driver call.

use std::cell::Cell;

use kurbo::{ParamCurve, PathSeg, Point, Rect};

use crate::angle::{sort_angles, Angle};
use crate::curve;
use crate::intersect;
use crate::num::{point_cmp, scalar_pt, T_EPSILON};

/// Is a sector with this accumulated winding outside the filled region?
///
/// For winding fill that means winding zero; for even-odd it means even
/// parity. Both the bridge's activity test and the successor scan use this,
/// so the two always agree on which side of an edge is filled.
pub(crate) fn is_outside(winding: i32, even_odd: bool) -> bool {
    if even_odd {
        winding % 2 == 0
    } else {
        winding == 0
    }
}

/// An index into the segment arena.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub(crate) struct SegIdx(pub usize);

impl std::fmt::Debug for SegIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s_{}", self.0)
    }
}

/// One entry on a segment's T-list.
#[derive(Clone, Debug)]
pub(crate) struct Span {
    /// Parameter on the owning segment, in `[0, 1]`.
    pub t: f64,
    /// The segment met at this T.
    pub other: SegIdx,
    /// The mate's parameter at this meeting.
    pub other_t: f64,
    /// Index of the mirrored span on the mate. Unreliable while insertions
    /// are still happening; `fix_other_t_index` repairs it.
    pub other_index: usize,
    /// Lazily cached point at `t`.
    pt: Cell<Option<Point>>,
    /// Edge multiplicity: 0 = cancelled, 1 = normal, ≥2 = coincident stack.
    pub wind_value: i32,
    /// Accumulated winding on the outside of the forward direction;
    /// `None` until the bridge or the chase assigns it.
    pub wind_sum: Option<i32>,
    /// The sub-edge from this span to the next has been consumed.
    pub done: bool,
}

pub(crate) struct Segment {
    curve: PathSeg,
    bounds: Rect,
    spans: Vec<Span>,
    done_spans: usize,
}

impl Segment {
    fn new(curve: PathSeg) -> Self {
        Segment {
            bounds: curve::seg_bounds(&curve),
            curve,
            spans: Vec::new(),
            done_spans: 0,
        }
    }

    pub fn curve(&self) -> &PathSeg {
        &self.curve
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn t(&self, index: usize) -> f64 {
        self.spans[index].t
    }

    pub fn done(&self) -> bool {
        debug_assert!(self.done_spans <= self.spans.len());
        self.done_spans == self.spans.len()
    }

    pub fn xy_at_span(&self, span: &Span) -> Point {
        if let Some(p) = span.pt.get() {
            return p;
        }
        let p = if span.t == 0.0 {
            self.curve.start()
        } else if span.t == 1.0 {
            self.curve.end()
        } else {
            scalar_pt(curve::xy_at_t(&self.curve, span.t))
        };
        span.pt.set(Some(p));
        p
    }

    pub fn xy_at_index(&self, index: usize) -> Point {
        self.xy_at_span(&self.spans[index])
    }

    /// The smallest y reached by any span that still has live work around it.
    pub fn active_top(&self) -> f64 {
        debug_assert!(!self.done());
        let mut result = f64::MAX;
        let mut last_done = true;
        for span in &self.spans {
            if !span.done || !last_done {
                result = result.min(self.xy_at_span(span).y);
            }
            last_done = span.done;
        }
        debug_assert!(result < f64::MAX);
        result
    }

    /// The half-open range of span indices within epsilon of `index`'s T.
    fn cluster(&self, index: usize) -> std::ops::Range<usize> {
        let reference_t = self.spans[index].t;
        let mut lo = index;
        while lo > 0 && reference_t - self.spans[lo - 1].t < T_EPSILON {
            lo -= 1;
        }
        let mut hi = index + 1;
        while hi < self.spans.len() && self.spans[hi].t - reference_t < T_EPSILON {
            hi += 1;
        }
        lo..hi
    }

    /// The nearest span index in the `step` direction whose T leaves the
    /// current equivalence cluster, or `None` at the segment boundary.
    pub fn next_span(&self, from: usize, step: i32) -> Option<usize> {
        let from_t = self.spans[from].t;
        if step > 0 {
            (from + 1..self.spans.len()).find(|&to| self.spans[to].t - from_t >= T_EPSILON)
        } else {
            (0..from).rev().find(|&to| from_t - self.spans[to].t >= T_EPSILON)
        }
    }

    /// A junction is "simple" when the mate can be taken directly: the
    /// T-list has only the two endpoints, or `end` is a pure endpoint T.
    pub fn is_simple(&self, end: usize) -> bool {
        let count = self.spans.len();
        if count == 2 {
            return true;
        }
        let t = self.spans[end].t;
        if t < T_EPSILON {
            return self.spans[1].t >= T_EPSILON;
        }
        if t > 1.0 - T_EPSILON {
            return self.spans[count - 2].t <= 1.0 - T_EPSILON;
        }
        false
    }

    /// Are there further spans beyond `end` in the `step` direction?
    fn multiple_spans(&self, end: usize, step: i32) -> bool {
        if step > 0 {
            end + 1 < self.spans.len()
        } else {
            end > 0
        }
    }

    /// Marks the whole cluster at `index` done and records the winding.
    pub fn mark_done(&mut self, index: usize, winding: i32) {
        let range = self.cluster(index);
        for i in range {
            let span = &mut self.spans[i];
            if span.done {
                continue;
            }
            span.done = true;
            if span.wind_sum.is_none() {
                span.wind_sum = Some(winding);
            }
            self.done_spans += 1;
        }
    }

    /// Records the winding on the whole cluster at `index` without
    /// consuming it.
    pub fn mark_winding(&mut self, index: usize, winding: i32) {
        let range = self.cluster(index);
        for i in range {
            let span = &mut self.spans[i];
            if span.done {
                continue;
            }
            if span.wind_sum.is_none() {
                span.wind_sum = Some(winding);
            }
        }
    }

    /// Consumes every remaining span without assigning windings. Only used
    /// to guarantee forward progress when a trace seed turns out unusable.
    pub fn retire(&mut self) {
        let mut newly = 0;
        for span in &mut self.spans {
            if !span.done {
                span.done = true;
                newly += 1;
            }
        }
        self.done_spans += newly;
    }

    /// The winding contribution of the directed sub-edge `start → end`:
    /// negative when traversed forward.
    pub fn span_sign(&self, start: usize, end: usize) -> i32 {
        if start < end {
            -self.spans[start].wind_value
        } else {
            self.spans[end].wind_value
        }
    }

    pub fn wind_value_min(&self, start: usize, end: usize) -> i32 {
        self.spans[start.min(end)].wind_value
    }

    pub fn wind_sum_min(&self, start: usize, end: usize) -> Option<i32> {
        self.spans[start.min(end)].wind_sum
    }

    /// Returns true when the decrement retired the span.
    fn decrement_wind(&mut self, index: usize) -> bool {
        let span = &mut self.spans[index];
        if span.wind_value == 0 {
            return false;
        }
        span.wind_value -= 1;
        if span.wind_value == 0 {
            span.done = true;
            self.done_spans += 1;
            return true;
        }
        false
    }
}

/// The arena of all segments built for one `simplify` call.
#[derive(Default)]
pub(crate) struct Segments {
    segs: Vec<Segment>,
}

impl std::ops::Index<SegIdx> for Segments {
    type Output = Segment;

    fn index(&self, index: SegIdx) -> &Segment {
        &self.segs[index.0]
    }
}

impl Segments {
    pub fn len(&self) -> usize {
        self.segs.len()
    }

    pub fn push(&mut self, curve: PathSeg) -> SegIdx {
        self.segs.push(Segment::new(curve));
        SegIdx(self.segs.len() - 1)
    }

    pub fn seg_mut(&mut self, idx: SegIdx) -> &mut Segment {
        &mut self.segs[idx.0]
    }

    fn total_spans(&self) -> usize {
        self.segs.iter().map(|s| s.spans.len()).sum()
    }

    fn pair_mut(&mut self, a: SegIdx, b: SegIdx) -> (&mut Segment, &mut Segment) {
        debug_assert_ne!(a, b);
        if a.0 < b.0 {
            let (lo, hi) = self.segs.split_at_mut(b.0);
            (&mut lo[a.0], &mut hi[0])
        } else {
            let (lo, hi) = self.segs.split_at_mut(a.0);
            (&mut hi[0], &mut lo[b.0])
        }
    }

    /// Inserts a span at the sorted position; equal T's land after their
    /// peers. Returns the insertion index.
    pub fn add_t(&mut self, idx: SegIdx, new_t: f64, other: SegIdx) -> usize {
        debug_assert!((0.0..=1.0).contains(&new_t));
        let seg = &mut self.segs[idx.0];
        let insert_at = seg
            .spans
            .iter()
            .position(|span| new_t < span.t)
            .unwrap_or(seg.spans.len());
        let done = new_t == 1.0;
        seg.spans.insert(
            insert_at,
            Span {
                t: new_t,
                other,
                other_t: 0.0,
                other_index: 0,
                pt: Cell::new(None),
                wind_value: 1,
                wind_sum: None,
                done,
            },
        );
        if done {
            seg.done_spans += 1;
        }
        insert_at
    }

    pub fn add_other_t(&mut self, idx: SegIdx, index: usize, other_t: f64, other_index: usize) {
        let span = &mut self.segs[idx.0].spans[index];
        span.other_t = other_t;
        span.other_index = other_index;
    }

    /// Adds the two mirrored spans of one intersection and links them. The
    /// recorded `other_index` values go stale as later insertions shift the
    /// lists; `fix_other_t_index` restores them.
    pub fn add_t_pair(&mut self, idx: SegIdx, t: f64, other: SegIdx, other_t: f64) -> usize {
        let inserted = self.add_t(idx, t, other);
        let other_inserted = self.add_t(other, other_t, idx);
        self.add_other_t(idx, inserted, other_t, other_inserted);
        self.add_other_t(other, other_inserted, t, inserted);
        inserted
    }

    /// Rebuilds every span's `other_index` by searching the mate's T-list
    /// for the `(t, segment)` pair recorded at insertion time.
    pub fn fix_other_t_index(&mut self) {
        for i in 0..self.len() {
            for s in 0..self.segs[i].spans.len() {
                let (other, other_t) = {
                    let span = &self.segs[i].spans[s];
                    (span.other, span.other_t)
                };
                let mirror = self.segs[other.0]
                    .spans
                    .iter()
                    .position(|os| os.t == other_t && os.other.0 == i);
                match mirror {
                    Some(oi) => self.segs[i].spans[s].other_index = oi,
                    None => log::debug!("span {s} of s_{i} has no mirror on {other:?}"),
                }
            }
        }
    }

    /// Cancels two overlapping runs traversed in opposite directions: walks
    /// both T-intervals cluster by cluster (the mate backwards) and
    /// decrements both sides wherever both are still live.
    pub fn add_t_cancel(
        &mut self,
        this: SegIdx,
        start_t: f64,
        end_t: f64,
        other: SegIdx,
        o_start_t: f64,
        o_end_t: f64,
    ) {
        debug_assert!(end_t - start_t >= T_EPSILON);
        debug_assert!(o_end_t - o_start_t >= T_EPSILON);
        let (seg, oth) = self.pair_mut(this, other);

        let mut index = 0;
        while start_t - seg.spans[index].t >= T_EPSILON {
            index += 1;
            if index >= seg.spans.len() {
                log::debug!("cancel interval start {start_t} not found on {this:?}");
                return;
            }
        }
        // Position the mate walk on the cluster just below its end T; the
        // sub-edges pair up start-to-end because the traversals oppose.
        let mut o_index = oth.spans.len();
        loop {
            if o_index == 0 {
                log::debug!("cancel interval end {o_end_t} not found on {other:?}");
                return;
            }
            o_index -= 1;
            if oth.spans[o_index].t - o_end_t < T_EPSILON {
                break;
            }
        }
        loop {
            if o_index == 0 {
                log::debug!("cancel interval on {other:?} shorter than on {this:?}");
                return;
            }
            o_index -= 1;
            if oth.spans[o_index].t - o_end_t <= -T_EPSILON {
                break;
            }
        }

        loop {
            let decrement = seg.spans[index].wind_value != 0 && oth.spans[o_index].wind_value != 0;
            let cluster_t = seg.spans[index].t;
            loop {
                if decrement {
                    seg.decrement_wind(index);
                }
                index += 1;
                if index >= seg.spans.len() {
                    log::debug!("cancel walk ran off the end of {this:?}");
                    return;
                }
                if seg.spans[index].t - cluster_t >= T_EPSILON {
                    break;
                }
            }
            let o_cluster_t = oth.spans[o_index].t;
            loop {
                if decrement {
                    oth.decrement_wind(o_index);
                }
                if o_index == 0 {
                    break;
                }
                o_index -= 1;
                if o_cluster_t - oth.spans[o_index].t >= T_EPSILON {
                    break;
                }
            }
            if seg.spans[index].t >= end_t - T_EPSILON {
                break;
            }
        }
    }

    /// Merges two overlapping runs traversed in the same direction: the side
    /// with the larger multiplicity absorbs the other. T values present on
    /// only one side are collected and mirrored onto the partner afterwards
    /// so both segments keep aligned span structures.
    pub fn add_t_coincident(
        &mut self,
        this: SegIdx,
        start_t: f64,
        end_t: f64,
        other: SegIdx,
        o_start_t: f64,
        o_end_t: f64,
    ) {
        debug_assert!(end_t - start_t >= T_EPSILON);
        debug_assert!(o_end_t - o_start_t >= T_EPSILON);
        let mut outside: Vec<(f64, f64)> = Vec::new();
        let mut o_outside: Vec<(f64, f64)> = Vec::new();
        {
            let (seg, oth) = self.pair_mut(this, other);
            let mut index = 0;
            while start_t - seg.spans[index].t >= T_EPSILON {
                index += 1;
                if index >= seg.spans.len() {
                    log::debug!("coincident interval start {start_t} not found on {this:?}");
                    return;
                }
            }
            let mut o_index = 0;
            while o_start_t - oth.spans[o_index].t >= T_EPSILON {
                o_index += 1;
                if o_index >= oth.spans.len() {
                    log::debug!("coincident interval start {o_start_t} not found on {other:?}");
                    return;
                }
            }
            loop {
                let decrement_other =
                    seg.spans[index].wind_value >= oth.spans[o_index].wind_value;
                let cluster_t = seg.spans[index].t;
                let o_cluster_t = oth.spans[o_index].t;
                loop {
                    if decrement_other {
                        seg.spans[index].wind_value += 1;
                    } else if seg.decrement_wind(index) {
                        outside.push((seg.spans[index].t, o_cluster_t));
                    }
                    index += 1;
                    if index >= seg.spans.len() {
                        log::debug!("coincident walk ran off the end of {this:?}");
                        return;
                    }
                    if seg.spans[index].t - cluster_t >= T_EPSILON {
                        break;
                    }
                }
                loop {
                    if decrement_other {
                        if oth.decrement_wind(o_index) {
                            o_outside.push((oth.spans[o_index].t, cluster_t));
                        }
                    } else {
                        oth.spans[o_index].wind_value += 1;
                    }
                    o_index += 1;
                    if o_index >= oth.spans.len() {
                        log::debug!("coincident walk ran off the end of {other:?}");
                        return;
                    }
                    if oth.spans[o_index].t - o_cluster_t >= T_EPSILON {
                        break;
                    }
                }
                if seg.spans[index].t >= end_t - T_EPSILON {
                    break;
                }
            }
        }
        if !self[this].done() && !outside.is_empty() {
            self.add_t_outsides(this, &outside, other, o_end_t);
        }
        if !self[other].done() && !o_outside.is_empty() {
            self.add_t_outsides(other, &o_outside, this, end_t);
        }
    }

    /// Inserts mate spans for T values that were cancelled on one side of a
    /// coincident run but had no counterpart on the partner.
    fn add_t_outsides(
        &mut self,
        idx: SegIdx,
        outside_ts: &[(f64, f64)],
        other: SegIdx,
        other_end: f64,
    ) {
        let mut end_t = 0.0;
        let mut end_span = 0usize;
        for &(t, other_t) in outside_ts {
            if t > 1.0 - T_EPSILON {
                return;
            }
            if t - end_t > T_EPSILON {
                end_span = self.add_t_pair(idx, t, other, other_t);
            }
            loop {
                end_span += 1;
                if end_span >= self[idx].spans.len() {
                    log::debug!("outside-T walk ran off the end of {idx:?}");
                    return;
                }
                end_t = self[idx].spans[end_span].t;
                if end_t - t >= T_EPSILON {
                    break;
                }
            }
        }
        self.add_t_pair(idx, end_t, other, other_end);
    }

    /// Do the two segments traverse their shared geometry in opposite
    /// directions? Decided from the angles of the whole segments.
    pub fn cancels(&self, a: SegIdx, b: SegIdx) -> bool {
        let mut angles = Vec::with_capacity(2);
        self.add_angle(a, 0, self[a].spans.len() - 1, &mut angles);
        self.add_angle(b, 0, self[b].spans.len() - 1, &mut angles);
        angles[0].cancels(&angles[1])
    }

    fn add_angle(&self, idx: SegIdx, start: usize, end: usize, angles: &mut Vec<Angle>) {
        debug_assert_ne!(start, end);
        let seg = &self[idx];
        let edge = curve::sub_segment(&seg.curve, seg.spans[start].t, seg.spans[end].t);
        angles.push(Angle::new(&edge, idx, start, end));
    }

    /// Adds the edge leading into the junction at `end` and the edge leading
    /// away from it, skipping cancelled sub-edges.
    pub fn add_two_angles(&self, idx: SegIdx, start: usize, end: usize, angles: &mut Vec<Angle>) {
        let seg = &self[idx];
        if seg.spans[end.min(start)].wind_value > 0 {
            self.add_angle(idx, end, start, angles);
        }
        let step: i32 = if end > start { 1 } else { -1 };
        if let Some(t_index) = seg.next_span(end, step) {
            if seg.spans[end.min(t_index)].wind_value > 0 {
                self.add_angle(idx, end, t_index, angles);
            }
        }
    }

    /// Collects every angle at the junction: each mate contributes its two
    /// adjacent sub-edges, and the closure follows mates-of-mates across the
    /// whole T-equivalence cluster. The transitive step matters when a
    /// direct mate's edges are cancelled: segments further along the
    /// junction are still reachable through its spans.
    pub fn build_angles(&self, idx: SegIdx, index: usize, angles: &mut Vec<Angle>) {
        let mut visited: Vec<(SegIdx, usize)> = vec![(idx, index)];
        let mut pending: Vec<(SegIdx, usize)> = vec![(idx, index)];
        while let Some((seg, i)) = pending.pop() {
            for s in self[seg].cluster(i) {
                let span = &self[seg].spans[s];
                let other = span.other;
                let o_index = span.other_index;
                if o_index >= self[other].spans.len() {
                    log::debug!("stale mirror index on {seg:?} span {s}");
                    continue;
                }
                let seen = visited
                    .iter()
                    .any(|&(vs, vi)| vs == other && self[other].cluster(vi).contains(&o_index));
                if seen {
                    continue;
                }
                visited.push((other, o_index));
                pending.push((other, o_index));
                let next = self[other]
                    .next_span(o_index, 1)
                    .or_else(|| self[other].next_span(o_index, -1));
                if let Some(next) = next {
                    self.add_two_angles(other, next, o_index, angles);
                }
            }
        }
    }

    /// Follows an unambiguous chain of simple junctions, then applies
    /// `mark` (done or winding) to every sub-edge along it, deepest first.
    fn chase(&mut self, from: SegIdx, index: usize, step: i32, winding: i32, consume: bool) {
        let mut seg_idx = from;
        let mut index = index;
        let mut marks: Vec<(SegIdx, usize)> = Vec::new();
        let mut limit = self.total_spans();
        loop {
            let Some(end) = self[seg_idx].next_span(index, step) else {
                break;
            };
            if self[seg_idx].multiple_spans(end, step) {
                break;
            }
            let (other, o_index) = {
                let span = &self[seg_idx].spans[end];
                (span.other, span.other_index)
            };
            if o_index >= self[other].spans.len() {
                break;
            }
            let Some(other_end) = self[other].next_span(o_index, step) else {
                break;
            };
            let min = o_index.min(other_end);
            if !consume && self[other].spans[min].wind_sum.is_some() {
                break;
            }
            marks.push((other, min));
            seg_idx = other;
            index = o_index;
            if limit == 0 {
                log::debug!("chase from {from:?} did not terminate");
                break;
            }
            limit -= 1;
        }
        for (s, i) in marks.into_iter().rev() {
            if consume {
                self.seg_mut(s).mark_done(i, winding);
            } else {
                self.seg_mut(s).mark_winding(i, winding);
            }
        }
    }

    /// The sub-edge is excluded by the winding rule; consume it and chase
    /// unambiguous continuations, giving them the same winding value.
    pub fn mark_and_chase_done(&mut self, angle: &Angle, winding: i32) {
        let index = angle.start();
        let end_index = angle.end();
        let step: i32 = if end_index > index { 1 } else { -1 };
        self.chase(angle.segment(), index, step, winding, true);
        self.seg_mut(angle.segment())
            .mark_done(index.min(end_index), winding);
    }

    pub fn mark_and_chase_winding(&mut self, angle: &Angle, winding: i32) {
        let index = angle.start();
        let end_index = angle.end();
        let step: i32 = if end_index > index { 1 } else { -1 };
        self.chase(angle.segment(), index, step, winding, false);
        self.seg_mut(angle.segment())
            .mark_winding(index.min(end_index), winding);
    }

    /// Advances the bridge walk by one sub-edge.
    ///
    /// At a simple junction the mate is taken directly. Otherwise the full
    /// angle wheel at the junction is sorted and scanned circularly from the
    /// incoming edge, accumulating winding contributions; the successor is
    /// the first live edge whose far sector counts as outside under the fill
    /// rule (parity when `even_odd`, winding-number zero otherwise). Edges
    /// passed over with an inside sector are marked with the
    /// larger-magnitude interim winding and chased.
    pub fn find_next(
        &mut self,
        seg_idx: SegIdx,
        winding: i32,
        start_index: usize,
        end_index: usize,
        even_odd: bool,
    ) -> Option<(SegIdx, usize, usize)> {
        debug_assert_ne!(start_index, end_index);
        let step: i32 = if end_index > start_index { 1 } else { -1 };
        let end = self[seg_idx].next_span(start_index, step)?;

        if self[seg_idx].is_simple(end) {
            self.seg_mut(seg_idx)
                .mark_done(start_index.min(end_index), winding);
            let span = &self[seg_idx].spans[end];
            let other = span.other;
            let next_start = span.other_index;
            let next_end = next_start as i64 + step as i64;
            if next_end < 0 || next_end >= self[other].spans.len() as i64 {
                log::debug!("simple continuation off the end of {other:?}");
                return None;
            }
            return Some((other, next_start, next_end as usize));
        }

        let mut angles = Vec::new();
        self.add_two_angles(seg_idx, start_index, end, &mut angles);
        self.build_angles(seg_idx, end, &mut angles);
        sort_angles(&mut angles);

        let first_index = angles.iter().position(|a| {
            a.segment() == seg_idx && a.start() == end && a.end() == start_index
        })?;
        let angle_count = angles.len();
        let last_index = if first_index != 0 {
            first_index
        } else {
            angle_count
        };
        let start_winding = winding;
        let mut winding = winding;
        let mut found: Option<Angle> = None;
        let mut next_index = first_index + 1;
        loop {
            if next_index == angle_count {
                next_index = 0;
            }
            let next_angle = angles[next_index];
            let mut max_winding = winding;
            let next_seg = next_angle.segment();
            let wind_value = self[next_seg].wind_value_min(next_angle.start(), next_angle.end());
            debug_assert!(wind_value > 0);
            winding -= next_angle.sign() * wind_value;
            if is_outside(winding, even_odd) {
                let min = next_angle.start().min(next_angle.end());
                if found.is_none() && !self[next_seg].spans[min].done {
                    found = Some(next_angle);
                }
            } else if !self[next_seg].done()
                && self[next_seg]
                    .wind_sum_min(next_angle.start(), next_angle.end())
                    .is_none()
            {
                if max_winding.abs() < winding.abs() {
                    max_winding = winding;
                }
                if found.is_some() {
                    self.mark_and_chase_winding(&next_angle, max_winding);
                } else {
                    self.mark_and_chase_done(&next_angle, max_winding);
                }
            }
            next_index += 1;
            if next_index == last_index {
                break;
            }
        }
        self.seg_mut(seg_idx)
            .mark_done(start_index.min(end_index), start_winding);
        found.map(|angle| (angle.segment(), angle.start(), angle.end()))
    }

    /// Finds the topmost (then leftmost) live point of `seg_idx` and picks
    /// the leftmost not-yet-done edge of its angle wheel as the starting
    /// directed sub-edge of a trace.
    pub fn find_top(&self, seg_idx: SegIdx) -> Option<(SegIdx, usize, usize)> {
        let seg = &self[seg_idx];
        debug_assert!(!seg.done());
        let mut top_pt = Point::new(f64::MAX, f64::MAX);
        let mut first_t: Option<usize> = None;
        let mut last_done = true;
        for (i, span) in seg.spans.iter().enumerate() {
            if !span.done || !last_done {
                let p = seg.xy_at_span(span);
                if first_t.is_none() || point_cmp(p, top_pt) == std::cmp::Ordering::Less {
                    top_pt = p;
                    first_t = Some(i);
                }
            }
            last_done = span.done;
        }
        let first_t = first_t?;
        let end = seg
            .next_span(first_t, 1)
            .or_else(|| seg.next_span(first_t, -1))?;

        let mut angles = Vec::new();
        self.add_two_angles(seg_idx, end, first_t, &mut angles);
        self.build_angles(seg_idx, first_t, &mut angles);
        sort_angles(&mut angles);

        angles
            .iter()
            .find(|a| {
                let min = a.start().min(a.end());
                !self[a.segment()].spans[min].done
            })
            .map(|a| (a.segment(), a.end(), a.start()))
    }

    /// Intersects the vertical ray `x = base_pt.x` with every live sub-edge
    /// of `seg_idx`, keeping the hit with the largest y not below `base_pt`.
    /// Returns the span index anchoring the hit sub-edge.
    pub fn crossed_span(
        &self,
        seg_idx: SegIdx,
        base_pt: Point,
        best_y: &mut f64,
        hit_t: &mut f64,
    ) -> Option<usize> {
        let seg = &self[seg_idx];
        let mut best = None;
        let mut start = 0usize;
        loop {
            let Some(end) = seg.next_span(start, 1) else {
                break;
            };
            let t0 = seg.spans[start].t;
            let t1 = seg.spans[end].t;
            let edge = curve::sub_segment(&seg.curve, t0, t1);
            let hits = intersect::vertical_ray_hits(&edge, base_pt.x);
            // An edge-on vertical line reports both endpoints; wait for a
            // transversal hit instead.
            let edge_on = matches!(edge, PathSeg::Line(_)) && hits.len() > 1;
            if !edge_on {
                for local in hits {
                    let t = t0 + local * (t1 - t0);
                    let p = scalar_pt(curve::xy_at_t(&seg.curve, t));
                    if p.y <= base_pt.y && *best_y < p.y {
                        *best_y = p.y;
                        best = Some(if local < 1.0 { start } else { end });
                        *hit_t = t;
                    }
                }
            }
            if seg.spans[end].t == 1.0 {
                break;
            }
            start = end;
        }
        best
    }

    pub fn is_linear_between(&self, idx: SegIdx, start: usize, end: usize) -> bool {
        let seg = &self[idx];
        curve::is_linear(&seg.curve, seg.spans[start].t, seg.spans[end].t)
    }

    /// Looks for pairs of nearby T values mapping to one point whose mates
    /// also share a common interval: a coincident run that was too short for
    /// the intersectors to report as one. Acting on it is unimplemented
    /// (matching the reference behavior); the condition is only reported.
    pub fn find_too_close(&self, seg_idx: SegIdx) {
        let seg = &self[seg_idx];
        let count = seg.spans.len();
        if count < 3 {
            return;
        }
        let mut match_index = 0;
        loop {
            if self[seg.spans[match_index].other].spans.len() >= 3 {
                break;
            }
            match_index += 1;
            if match_index >= count {
                return;
            }
        }
        let mut match_pt = seg.xy_at_index(match_index);
        for index in match_index + 1..count {
            let test = &seg.spans[index];
            if test.done {
                continue;
            }
            let t_other = test.other;
            if self[t_other].spans.len() < 3 {
                continue;
            }
            let test_pt = seg.xy_at_index(index);
            if match_pt != test_pt {
                match_index = index;
                match_pt = test_pt;
                continue;
            }
            let m_span = &seg.spans[match_index];
            let m_other = m_span.other;

            let mut mo_start = None;
            let mut mo_end = None;
            let mut mo_start_t = 0.0;
            let mut mo_end_t = 0.0;
            for (mo_index, mo_span) in self[m_other].spans.iter().enumerate() {
                if mo_span.done {
                    continue;
                }
                if mo_span.other == seg_idx {
                    if mo_span.other_t == m_span.t {
                        mo_start = Some(mo_index);
                        mo_start_t = mo_span.t;
                    }
                    continue;
                }
                if mo_span.other == t_other {
                    mo_end = Some(mo_index);
                    mo_end_t = mo_span.t;
                }
            }
            let (Some(mo_start), Some(mo_end)) = (mo_start, mo_end) else {
                continue;
            };
            if mo_start_t == mo_end_t {
                continue;
            }

            let mut to_start = None;
            let mut to_end = None;
            let mut to_start_t = 0.0;
            let mut to_end_t = 0.0;
            for (to_index, to_span) in self[t_other].spans.iter().enumerate() {
                if to_span.other == seg_idx {
                    if to_span.other_t == test.t {
                        to_start = Some(to_index);
                        to_start_t = to_span.t;
                    }
                    continue;
                }
                if to_span.other == m_other && to_span.other_t == mo_end_t {
                    to_end = Some(to_index);
                    to_end_t = to_span.t;
                }
            }
            let (Some(to_start), Some(to_end)) = (to_start, to_end) else {
                continue;
            };
            if to_start == 0 || to_end == 0 || to_start_t == to_end_t {
                continue;
            }
            if !self.is_linear_between(m_other, mo_start, mo_end)
                || !self.is_linear_between(t_other, to_start, to_end)
            {
                continue;
            }
            log::debug!(
                "near-coincident interval between {m_other:?} and {t_other:?} \
                 at {match_pt:?} left unresolved"
            );
        }
    }
}
