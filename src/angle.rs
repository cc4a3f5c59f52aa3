//! Sorting the edges that meet at a junction.
//!
//! Each directed sub-edge leaving a junction is summarized by the first,
//! second, and third differences of its subdivided control points. Sorting
//! those records angularly (starting from the downward direction, proceeding
//! counterclockwise) is what lets the bridge pick the successor edge whose
//! accumulated winding crosses zero.

use std::cmp::Ordering;

use kurbo::PathSeg;

use crate::segments::SegIdx;

/// A directed sub-edge at a junction, reduced to its derivative vectors.
///
/// If the control tangents of two curves coincide, the ordering falls back to
/// the higher differences; two cubics agreeing through the third difference
/// sort arbitrarily. That configuration is a known limitation inherited from
/// the derivative-only comparison.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Angle {
    dx: f64,
    dy: f64,
    ddx: f64,
    ddy: f64,
    dddx: f64,
    dddy: f64,
    seg: SegIdx,
    start: usize,
    end: usize,
}

impl Angle {
    /// Builds an angle from a sub-edge already subdivided to the junction:
    /// `edge` must start at the junction point.
    pub fn new(edge: &PathSeg, seg: SegIdx, start: usize, end: usize) -> Self {
        debug_assert_ne!(start, end);
        let mut angle = Angle {
            dx: 0.0,
            dy: 0.0,
            ddx: 0.0,
            ddy: 0.0,
            dddx: 0.0,
            dddy: 0.0,
            seg,
            start,
            end,
        };
        match edge {
            PathSeg::Line(l) => {
                angle.dx = l.p1.x - l.p0.x;
                angle.dy = l.p1.y - l.p0.y;
            }
            PathSeg::Quad(q) => {
                angle.dx = q.p1.x - q.p0.x;
                angle.dy = q.p1.y - q.p0.y;
                angle.ddx = q.p2.x - q.p1.x - angle.dx;
                angle.ddy = q.p2.y - q.p1.y - angle.dy;
            }
            PathSeg::Cubic(c) => {
                angle.dx = c.p1.x - c.p0.x;
                angle.dy = c.p1.y - c.p0.y;
                angle.ddx = c.p2.x - c.p1.x - angle.dx;
                angle.ddy = c.p2.y - c.p1.y - angle.dy;
                angle.dddx = c.p3.x + 3.0 * (c.p1.x - c.p2.x) - c.p0.x;
                angle.dddy = c.p3.y + 3.0 * (c.p1.y - c.p2.y) - c.p0.y;
            }
        }
        angle
    }

    pub fn segment(&self) -> SegIdx {
        self.seg
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// `+1` when the sub-edge is traversed against increasing T.
    pub fn sign(&self) -> i32 {
        if self.start > self.end {
            1
        } else {
            -1
        }
    }

    /// Do the two initial tangents point in opposing directions?
    ///
    /// Used to distinguish cancelling coincident runs from stacking ones.
    pub fn cancels(&self, rh: &Angle) -> bool {
        self.dx * rh.dx < 0.0 || self.dy * rh.dy < 0.0
    }

    fn less_than(&self, rh: &Angle) -> bool {
        if (self.dy < 0.0) ^ (rh.dy < 0.0) {
            return self.dy < 0.0;
        }
        if self.dy == 0.0 && rh.dy == 0.0 && self.dx != rh.dx {
            return self.dx < rh.dx;
        }
        let cmp = self.dx * rh.dy - rh.dx * self.dy;
        if cmp != 0.0 {
            return cmp < 0.0;
        }
        if (self.ddy < 0.0) ^ (rh.ddy < 0.0) {
            return self.ddy < 0.0;
        }
        if self.ddy == 0.0 && rh.ddy == 0.0 && self.ddx != rh.ddx {
            return self.ddx < rh.ddx;
        }
        let cmp = self.ddx * rh.ddy - rh.ddx * self.ddy;
        if cmp != 0.0 {
            return cmp < 0.0;
        }
        if (self.dddy < 0.0) ^ (rh.dddy < 0.0) {
            return self.dddy < 0.0;
        }
        if self.dddy == 0.0 && rh.dddy == 0.0 {
            return self.dddx < rh.dddx;
        }
        self.dddx * rh.dddy < rh.dddx * self.dddy
    }

    pub fn angle_cmp(&self, rh: &Angle) -> Ordering {
        if self.less_than(rh) {
            Ordering::Less
        } else if rh.less_than(self) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

pub(crate) fn sort_angles(angles: &mut [Angle]) {
    angles.sort_by(Angle::angle_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Line;

    fn line_angle(dx: f64, dy: f64) -> Angle {
        Angle::new(
            &PathSeg::Line(Line::new((0.0, 0.0), (dx, dy))),
            SegIdx(0),
            0,
            1,
        )
    }

    #[test]
    fn downward_sorts_first() {
        // The wheel starts at straight down and proceeds counterclockwise.
        let down = line_angle(0.0, -1.0);
        let up = line_angle(0.0, 1.0);
        let left = line_angle(-1.0, 0.0);
        let right = line_angle(1.0, 0.0);
        assert_eq!(down.angle_cmp(&up), Ordering::Less);
        assert_eq!(left.angle_cmp(&right), Ordering::Less);
        assert_eq!(down.angle_cmp(&left), Ordering::Less);
    }

    #[test]
    fn full_wheel_order() {
        let mut angles = vec![
            line_angle(1.0, 1.0),
            line_angle(-1.0, -1.0),
            line_angle(-1.0, 1.0),
            line_angle(1.0, -1.0),
        ];
        sort_angles(&mut angles);
        // Both lower-half-plane edges precede both upper-half-plane ones.
        assert!(angles[0].dy < 0.0);
        assert!(angles[1].dy < 0.0);
        assert!(angles[2].dy > 0.0);
        assert!(angles[3].dy > 0.0);
    }

    #[test]
    fn coincident_tangents_fall_back_to_curvature() {
        use kurbo::QuadBez;
        // Same initial tangent, bending opposite ways.
        let bend_up = Angle::new(
            &PathSeg::Quad(QuadBez::new((0.0, 0.0), (1.0, 0.0), (2.0, 1.0))),
            SegIdx(0),
            0,
            1,
        );
        let bend_down = Angle::new(
            &PathSeg::Quad(QuadBez::new((0.0, 0.0), (1.0, 0.0), (2.0, -1.0))),
            SegIdx(1),
            0,
            1,
        );
        assert_ne!(bend_up.angle_cmp(&bend_down), Ordering::Equal);
        assert_eq!(bend_down.angle_cmp(&bend_up), Ordering::Less);
    }

    #[test]
    fn sign_tracks_direction() {
        let forward = line_angle(1.0, 0.0);
        assert_eq!(forward.sign(), -1);
        let backward = Angle::new(
            &PathSeg::Line(Line::new((0.0, 0.0), (1.0, 0.0))),
            SegIdx(0),
            3,
            2,
        );
        assert_eq!(backward.sign(), 1);
    }

    #[test]
    fn opposing_tangents_cancel() {
        let a = line_angle(1.0, 0.5);
        assert!(a.cancels(&line_angle(-1.0, -0.5)));
        assert!(!a.cancels(&line_angle(1.0, 0.5)));
        assert!(!a.cancels(&line_angle(2.0, 1.0)));
    }
}
