use super::*;

fn sample() -> Vec<TodoItem> {
    vec![
        TodoItem::new("b", 2.0),
        TodoItem::new("a", 1.0).with_children(vec![
            TodoItem::new("a2", 5.0).with_checked(true),
            TodoItem::new("a1", 3.0),
        ]),
    ]
}

fn set(ids: &[&str]) -> ExpandedSet {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn sort_by_order_is_by_key_not_storage() {
    let roots = sample();
    let ids: Vec<&str> = sort_by_order(&roots).iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    let kids: Vec<&str> = roots[1]
        .sorted_children()
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(kids, vec!["a1", "a2"]);
}

#[test]
fn checked_fraction_counts_direct_children() {
    let roots = sample();
    assert_eq!(roots[1].checked_fraction(), Some(0.5));
    assert_eq!(roots[0].checked_fraction(), None);
}

#[test]
fn tree_index_resolves_parents() {
    let idx = TreeIndex::build(&sample());
    assert_eq!(idx.len(), 4);
    assert_eq!(idx.parent_of("a1"), Some("a"));
    assert_eq!(idx.parent_of("a"), None);
    assert!(idx.contains("b"));
    assert!(!idx.contains("zzz"));
}

#[test]
fn find_item_walks_descendants() {
    let roots = sample();
    assert_eq!(find_item(&roots, "a2").map(|i| i.checked), Some(true));
    assert!(find_item(&roots, "nope").is_none());
}

#[test]
fn structure_fingerprint_ignores_text_and_checked() {
    let a = sample();
    let mut b = sample();
    b[1].children[0].checked = false;
    b[1].text = "renamed".to_string();
    assert_eq!(
        structure_fingerprint(&a, &set(&["a"])),
        structure_fingerprint(&b, &set(&["a"]))
    );
}

#[test]
fn structure_fingerprint_tracks_order_and_expansion() {
    let a = sample();
    let mut b = sample();
    b[1].children[0].order = 1.0;
    assert_ne!(
        structure_fingerprint(&a, &ExpandedSet::new()),
        structure_fingerprint(&b, &ExpandedSet::new())
    );
    assert_ne!(
        structure_fingerprint(&a, &ExpandedSet::new()),
        structure_fingerprint(&a, &set(&["a"]))
    );
}

#[test]
fn doc_validation_rejects_duplicates() {
    let doc = OutlineDoc {
        items: vec![
            TodoItem::new("x", 0.0),
            TodoItem::new("y", 1.0).with_children(vec![TodoItem::new("x", 0.0)]),
        ],
        expanded: vec![],
    };
    let err = doc.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate item id 'x'"));
}

#[test]
fn doc_parses_with_defaults() {
    let doc = OutlineDoc::from_json(
        r#"{ "items": [ { "id": "r", "order": 1, "children": [ { "id": "c" } ] } ],
             "expanded": ["r"] }"#,
    )
    .unwrap();
    assert_eq!(doc.items[0].children[0].order, 0.0);
    assert!(doc.expanded_set().contains("r"));
    assert_eq!(doc.all_parents(), set(&["r"]));
}
