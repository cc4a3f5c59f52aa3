#![no_main]

use arbitrary::Unstructured;
use kurbo::PathEl;
use libfuzzer_sys::fuzz_target;
use untangle::{simplify, FillRule};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(path) = untangle::arbitrary::closed_path(&mut u) else {
        return;
    };
    let fill = if u.arbitrary().unwrap_or(false) {
        FillRule::EvenOdd
    } else {
        FillRule::Winding
    };
    let out = simplify(&path, fill).unwrap();

    // Whatever comes out must be a well-formed sequence of closed contours.
    let mut open = false;
    for el in out.elements() {
        match el {
            PathEl::MoveTo(_) => {
                assert!(!open, "move inside an open contour");
                open = true;
            }
            PathEl::ClosePath => {
                assert!(open, "close without a move");
                open = false;
            }
            _ => assert!(open, "edge outside a contour"),
        }
    }
    assert!(!open, "unclosed trailing contour");
});
