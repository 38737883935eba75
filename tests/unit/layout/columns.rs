use super::*;
use crate::model::tree::TodoItem;

fn chain(depth: usize) -> Vec<TodoItem> {
    let mut node = TodoItem::new(format!("n{depth}"), 0.0);
    for d in (0..depth).rev() {
        node = TodoItem::new(format!("n{d}"), 0.0).with_children(vec![node]);
    }
    vec![node]
}

fn ids(col: &[ColumnEntry<'_>]) -> Vec<String> {
    col.iter().map(|e| e.id().to_string()).collect()
}

#[test]
fn empty_tree_has_no_columns() {
    assert!(compute_columns(&[], &ExpandedSet::new()).is_empty());
}

#[test]
fn roots_are_sorted_and_collapsed_parents_hide_children() {
    let roots = vec![
        TodoItem::new("z", 9.0).with_children(vec![TodoItem::new("z1", 0.0)]),
        TodoItem::new("a", 1.0),
    ];
    let cols = compute_columns(&roots, &ExpandedSet::new());
    assert_eq!(cols.len(), 1);
    assert_eq!(ids(&cols[0]), vec!["a", "z"]);
    assert!(cols[0].iter().all(|e| e.parent_id.is_none() && e.depth == 0));
}

#[test]
fn children_follow_parent_column_order() {
    let roots = vec![
        TodoItem::new("p2", 2.0).with_children(vec![
            TodoItem::new("p2b", 2.0),
            TodoItem::new("p2a", 1.0),
        ]),
        TodoItem::new("p1", 1.0).with_children(vec![TodoItem::new("p1a", 0.0)]),
    ];
    let expanded: ExpandedSet = ["p1", "p2"].iter().map(|s| s.to_string()).collect();
    let cols = compute_columns(&roots, &expanded);
    assert_eq!(ids(&cols[1]), vec!["p1a", "p2a", "p2b"]);
    assert_eq!(cols[1][0].parent_id, Some("p1"));
    assert_eq!(cols[1][2].parent_id, Some("p2"));
    assert!(cols[1].iter().all(|e| e.depth == 1));
}

#[test]
fn projection_never_exceeds_max_columns() {
    let roots = chain(10);
    let expanded: ExpandedSet = (0..10).map(|d| format!("n{d}")).collect();
    let cols = compute_columns(&roots, &expanded);
    assert_eq!(cols.len(), MAX_COLUMNS);
    for col in &cols {
        for e in col {
            assert!(e.depth < MAX_COLUMNS);
        }
    }
    assert_eq!(ids(&cols[MAX_COLUMNS - 1]), vec![format!("n{}", MAX_COLUMNS - 1)]);
}

#[test]
fn stops_at_first_empty_column() {
    let roots = chain(3);
    let expanded: ExpandedSet = ["n0"].iter().map(|s| s.to_string()).collect();
    assert_eq!(compute_columns(&roots, &expanded).len(), 2);
}
