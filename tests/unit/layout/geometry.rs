use super::*;
use crate::layout::grid::GridPosition;

fn grid() -> GridAssignments {
    let mut g = GridAssignments::new();
    g.insert(
        "a".to_string(),
        GridPosition {
            grid_row: 1,
            grid_column: 1,
        },
    );
    g.insert(
        "b".to_string(),
        GridPosition {
            grid_row: 3,
            grid_column: 2,
        },
    );
    g
}

#[test]
fn item_rects_follow_cells() {
    let geo = GridGeometry::new(grid(), GridMetrics::default());
    let a = geo.item_rect("a").unwrap();
    assert_eq!(a, Rect::new(16.0, 22.0, 176.0, 50.0));
    let b = geo.item_rect("b").unwrap();
    assert_eq!(b.x0, 16.0 + 220.0);
    assert_eq!(b.y0, 16.0 + 80.0 + 6.0);
    assert!(geo.item_rect("missing").is_none());
}

#[test]
fn checkbox_sits_inside_item() {
    let geo = GridGeometry::new(grid(), GridMetrics::default());
    let item = geo.item_rect("a").unwrap();
    let cb = geo.fill_rect("a").unwrap();
    assert_eq!(cb.width(), 16.0);
    assert!(cb.x0 >= item.x0 && cb.y1 <= item.y1);
}

#[test]
fn content_size_covers_grid() {
    let geo = GridGeometry::new(grid(), GridMetrics::default());
    let s = geo.content_size();
    assert_eq!(s.width, 32.0 + 440.0);
    assert_eq!(s.height, 32.0 + 120.0);
}

#[test]
fn maps_are_lookups_without_checkboxes() {
    let mut m = HashMap::new();
    m.insert("y".to_string(), Rect::new(0.0, 0.0, 2.0, 2.0));
    assert_eq!(m.item_rect("y").map(|r| r.width()), Some(2.0));
    assert!(m.fill_rect("y").is_none());
}
