//! Turns an input path into contours of reduced, non-degenerate segments.

use kurbo::{BezPath, CubicBez, Line, PathEl, PathSeg, Point, QuadBez};

use crate::contour::{Contour, ContourIdx};
use crate::curve::{reduce_cubic, reduce_quad, Reduced};
use crate::num::scalar_pt;
use crate::segments::Segments;

/// Walks the path's verbs, order-reducing curves and dropping degenerates,
/// and populates the segment arena and contour list.
pub(crate) fn build(path: &BezPath, segments: &mut Segments, contours: &mut Vec<Contour>) {
    Builder {
        segments,
        contours,
        current: None,
        pen: Point::ZERO,
        move_pt: Point::ZERO,
    }
    .walk(path);
}

struct Builder<'a> {
    segments: &'a mut Segments,
    contours: &'a mut Vec<Contour>,
    current: Option<ContourIdx>,
    pen: Point,
    move_pt: Point,
}

impl Builder<'_> {
    fn walk(mut self, path: &BezPath) {
        for el in path.elements() {
            match *el {
                PathEl::MoveTo(p) => {
                    self.complete();
                    let p = scalar_pt(p);
                    self.pen = p;
                    self.move_pt = p;
                }
                PathEl::LineTo(p) => {
                    let p = scalar_pt(p);
                    // Exact float equality: zero-length lines contribute nothing.
                    if p != self.pen {
                        self.add(PathSeg::Line(Line::new(self.pen, p)));
                    }
                    self.pen = p;
                }
                PathEl::QuadTo(p1, p2) => {
                    let p1 = scalar_pt(p1);
                    let p2 = scalar_pt(p2);
                    match reduce_quad(&QuadBez::new(self.pen, p1, p2)) {
                        Reduced::Point => {}
                        Reduced::Line(line) => self.add(PathSeg::Line(line)),
                        Reduced::Quad(q) => self.add(PathSeg::Quad(q)),
                        Reduced::Cubic(_) => unreachable!(),
                    }
                    self.pen = p2;
                }
                PathEl::CurveTo(p1, p2, p3) => {
                    let p1 = scalar_pt(p1);
                    let p2 = scalar_pt(p2);
                    let p3 = scalar_pt(p3);
                    match reduce_cubic(&CubicBez::new(self.pen, p1, p2, p3)) {
                        Reduced::Point => {}
                        Reduced::Line(line) => self.add(PathSeg::Line(line)),
                        Reduced::Quad(q) => self.add(PathSeg::Quad(q)),
                        Reduced::Cubic(c) => self.add(PathSeg::Cubic(c)),
                    }
                    self.pen = p3;
                }
                PathEl::ClosePath => {
                    if self.pen != self.move_pt {
                        self.add(PathSeg::Line(Line::new(self.pen, self.move_pt)));
                    }
                    self.complete();
                    self.pen = self.move_pt;
                }
            }
        }
        self.complete();
    }

    fn add(&mut self, seg: PathSeg) {
        let contour_idx = match self.current {
            Some(idx) => idx,
            None => {
                self.contours.push(Contour::new());
                let idx = ContourIdx(self.contours.len() - 1);
                self.current = Some(idx);
                idx
            }
        };
        let seg_idx = self.segments.push(seg);
        self.contours[contour_idx.0].segs.push(seg_idx);
    }

    fn complete(&mut self) {
        if let Some(idx) = self.current.take() {
            self.contours[idx.0].complete(self.segments);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built(path: &BezPath) -> (Segments, Vec<Contour>) {
        let mut segments = Segments::default();
        let mut contours = Vec::new();
        build(path, &mut segments, &mut contours);
        (segments, contours)
    }

    #[test]
    fn square_becomes_four_lines() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((10.0, 0.0));
        p.line_to((10.0, 10.0));
        p.line_to((0.0, 10.0));
        p.close_path();
        let (segments, contours) = built(&p);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].segs.len(), 4);
        assert_eq!(segments.len(), 4);
        assert_eq!(contours[0].bounds, kurbo::Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn close_synthesizes_the_missing_edge() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((10.0, 0.0));
        p.line_to((10.0, 10.0));
        p.close_path();
        let (_, contours) = built(&p);
        assert_eq!(contours[0].segs.len(), 3);
    }

    #[test]
    fn degenerate_lines_are_dropped() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((0.0, 0.0));
        p.line_to((10.0, 0.0));
        p.close_path();
        let (segments, contours) = built(&p);
        assert_eq!(contours.len(), 1);
        // The zero-length line vanished; the close edge mirrors the real one.
        assert_eq!(contours[0].segs.len(), 2);
        assert_eq!(segments.len(), 2);
    }

    #[test]
    fn collinear_quad_reduces_to_line() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.quad_to((5.0, 0.0), (10.0, 0.0));
        p.line_to((10.0, 10.0));
        p.close_path();
        let (segments, contours) = built(&p);
        assert_eq!(contours[0].segs.len(), 3);
        for &s in &contours[0].segs {
            assert!(matches!(segments[s].curve(), PathSeg::Line(_)));
        }
    }

    #[test]
    fn elevated_cubic_reduces_to_quad() {
        let q = QuadBez::new((0.0, 0.0), (5.0, 10.0), (10.0, 0.0));
        let c = q.raise();
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.curve_to(c.p1, c.p2, c.p3);
        p.close_path();
        let (segments, contours) = built(&p);
        assert!(matches!(
            segments[contours[0].segs[0]].curve(),
            PathSeg::Quad(_)
        ));
    }

    #[test]
    fn moves_without_segments_leave_no_contour() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.move_to((5.0, 5.0));
        p.line_to((6.0, 5.0));
        p.line_to((6.0, 6.0));
        p.close_path();
        let (_, contours) = built(&p);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].segs.len(), 3);
    }
}
