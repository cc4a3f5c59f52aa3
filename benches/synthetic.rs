use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kurbo::BezPath;
use untangle::{simplify, FillRule};

fn cubes((x0, y0): (f64, f64), size: f64, offset: f64, count: usize) -> BezPath {
    let mut path = BezPath::new();
    for i in 0..count {
        let x = x0 + i as f64 * offset;
        for j in 0..count {
            let y = y0 + j as f64 * offset;
            path.move_to((x, y));
            path.line_to((x + size, y));
            path.line_to((x + size, y + size));
            path.line_to((x, y + size));
            path.close_path();
        }
    }
    path
}

fn checkerboard(n: usize) -> BezPath {
    let mut path = cubes((0.0, 0.0), 30.0, 40.0, n);
    path.extend(cubes((20.0, 20.0), 30.0, 40.0, n - 1));
    path
}

fn blob(petals: usize) -> BezPath {
    let mut path = BezPath::new();
    for p in 0..petals {
        let theta = p as f64 * std::f64::consts::TAU / petals as f64;
        let (sin, cos) = theta.sin_cos();
        let (cx, cy) = (100.0 + 60.0 * cos, 100.0 + 60.0 * sin);
        path.move_to((100.0, 100.0));
        path.curve_to(
            (cx - 30.0 * sin, cy + 30.0 * cos),
            (cx + 30.0 * sin, cy - 30.0 * cos),
            (100.0, 100.0),
        );
        path.close_path();
    }
    path
}

fn squares(c: &mut Criterion) {
    let path = checkerboard(6);
    c.bench_function("checkerboard", |b| {
        b.iter(|| simplify(black_box(&path), FillRule::Winding).unwrap())
    });
}

fn petals(c: &mut Criterion) {
    let path = blob(8);
    c.bench_function("petal blob", |b| {
        b.iter(|| simplify(black_box(&path), FillRule::EvenOdd).unwrap())
    });
}

criterion_group!(benches, squares, petals);
criterion_main!(benches);
