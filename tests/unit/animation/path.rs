use super::*;

fn sample() -> GlowPath {
    // child at (100, 50), trunk at x=80, parent at (60, 10)
    GlowPath::new("c", Point::new(100.0, 50.0), 80.0, Point::new(60.0, 10.0))
}

#[test]
fn cumulative_lengths_add_up() {
    let p = sample();
    assert_eq!(p.cumulative, [0.0, 20.0, 60.0, 80.0]);
    assert_eq!(p.total_length, 80.0);
    assert_eq!(p.points[1], Point::new(80.0, 50.0));
    assert_eq!(p.points[2], Point::new(80.0, 10.0));
}

#[test]
fn point_at_interpolates_by_distance() {
    let p = sample();
    assert_eq!(p.point_at(0.0), Point::new(100.0, 50.0));
    assert_eq!(p.point_at(10.0), Point::new(90.0, 50.0));
    assert_eq!(p.point_at(40.0), Point::new(80.0, 30.0));
    assert_eq!(p.point_at(70.0), Point::new(70.0, 10.0));
    assert_eq!(p.point_at(500.0), Point::new(60.0, 10.0));
    assert_eq!(p.point_at(-1.0), Point::new(100.0, 50.0));
}

#[test]
fn sub_path_includes_interior_corners() {
    let p = sample();
    let s = p.sub_path(10.0, 70.0);
    assert_eq!(
        s.as_slice(),
        &[
            Point::new(90.0, 50.0),
            Point::new(80.0, 50.0),
            Point::new(80.0, 10.0),
            Point::new(70.0, 10.0),
        ]
    );
    assert!((polyline_length(&s) - 60.0).abs() < 1e-9);
}

#[test]
fn sub_path_degenerate_ranges_are_empty() {
    let p = sample();
    assert!(p.sub_path(30.0, 30.0).is_empty());
    assert!(p.sub_path(50.0, 10.0).is_empty());
    assert_eq!(p.sub_path(-10.0, 1000.0).len(), 4);
}

#[test]
fn straight_path_skips_zero_length_segments() {
    let p = GlowPath::new("c", Point::new(50.0, 0.0), 50.0, Point::new(0.0, 0.0));
    assert_eq!(p.total_length, 50.0);
    assert_eq!(p.point_at(25.0), Point::new(25.0, 0.0));
}
