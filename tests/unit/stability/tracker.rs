use super::*;
use crate::layout::columns::compute_columns;
use crate::model::tree::TodoItem;

fn tree() -> Vec<TodoItem> {
    vec![
        TodoItem::new("a", 0.0)
            .with_children(vec![TodoItem::new("a1", 0.0), TodoItem::new("a2", 1.0)]),
        TodoItem::new("b", 1.0).with_children(vec![TodoItem::new("b1", 0.0)]),
        TodoItem::new("c", 2.0).with_children(vec![TodoItem::new("c1", 0.0)]),
    ]
}

fn set(ids: &[&str]) -> ExpandedSet {
    ids.iter().map(|s| s.to_string()).collect()
}

fn observe(t: &mut StabilityTracker, roots: &[TodoItem], expanded: &ExpandedSet) -> StructuralPlan {
    let cols = compute_columns(roots, expanded);
    t.observe(&cols, expanded)
}

#[test]
fn key_strings_match_reference_format() {
    let roots = tree();
    let expanded = set(&["a", "b"]);
    let mut t = StabilityTracker::new();
    let plan = observe(&mut t, &roots, &expanded);

    let brackets: Vec<String> = plan.brackets.iter().map(|b| b.key.to_string()).collect();
    assert_eq!(brackets, vec!["a@0:0#2->a1@0,a2@1", "b@0:1#2->b1@2"]);

    let seps: Vec<String> = plan.separators.iter().map(|s| s.key.to_string()).collect();
    assert_eq!(seps, vec!["1:a-b"]);
    assert_eq!(plan.separators[0].above_id, "a2");
    assert_eq!(plan.separators[0].below_id, "b1");
}

#[test]
fn first_observation_staggers_everything() {
    let roots = tree();
    let mut t = StabilityTracker::new();
    let plan = observe(&mut t, &roots, &set(&["a"]));
    assert_eq!(plan.generation, 1);
    assert!(plan.stable_keys().is_empty());
    assert_eq!(plan.staggered_count(), 1);
}

#[test]
fn unchanged_structure_is_idempotently_stable() {
    let roots = tree();
    let expanded = set(&["a", "b", "c"]);
    let mut t = StabilityTracker::new();
    observe(&mut t, &roots, &expanded);
    let second = observe(&mut t, &roots, &expanded);
    let third = observe(&mut t, &roots, &expanded);

    assert_eq!(second.staggered_count(), 0);
    assert_eq!(second.stable_keys(), third.stable_keys());
    assert_eq!(third.generation, 3);
    assert_eq!(t.generation(), 3);
}

#[test]
fn adding_a_group_rekeys_every_bracket_in_the_pair() {
    let roots = tree();
    let mut t = StabilityTracker::new();
    observe(&mut t, &roots, &set(&["a", "b"]));
    let plan = observe(&mut t, &roots, &set(&["a", "b", "c"]));

    assert_eq!(plan.brackets.len(), 3);
    assert!(
        plan.brackets
            .iter()
            .all(|b| b.stability == Stability::Staggered && b.group_count == 3)
    );
    // The a|b separator survived, b|c is new.
    let stable: Vec<String> = plan
        .separators
        .iter()
        .filter(|s| s.stability == Stability::Stable)
        .map(|s| s.key.to_string())
        .collect();
    assert_eq!(stable, vec!["1:a-b"]);
}

#[test]
fn deeper_pair_is_unaffected_by_shallower_groups() {
    let roots = vec![
        TodoItem::new("a", 0.0).with_children(vec![
            TodoItem::new("a1", 0.0).with_children(vec![TodoItem::new("a1x", 0.0)]),
        ]),
        TodoItem::new("b", 1.0).with_children(vec![TodoItem::new("b1", 0.0)]),
    ];
    let mut t = StabilityTracker::new();
    observe(&mut t, &roots, &set(&["a", "a1"]));
    let plan = observe(&mut t, &roots, &set(&["a", "a1", "b"]));

    let deep = plan.brackets.iter().find(|b| b.parent_id == "a1").unwrap();
    assert_eq!(deep.stability, Stability::Stable);
    let top = plan.brackets.iter().find(|b| b.parent_id == "a").unwrap();
    assert_eq!(top.stability, Stability::Staggered);
}

#[test]
fn reset_forgets_history() {
    let roots = tree();
    let expanded = set(&["a"]);
    let mut t = StabilityTracker::new();
    observe(&mut t, &roots, &expanded);
    t.reset();
    assert_eq!(observe(&mut t, &roots, &expanded).staggered_count(), 1);
}

#[test]
fn bracket_lookup_by_child() {
    let roots = tree();
    let mut t = StabilityTracker::new();
    let plan = observe(&mut t, &roots, &set(&["a", "b"]));
    assert_eq!(plan.bracket_for_child("a2").map(|b| b.parent_id.as_str()), Some("a"));
    assert!(plan.bracket_for_child("c1").is_none());
}

#[test]
fn fingerprints_distinguish_group_counts() {
    let k = |n| ShapeKey::Bracket {
        parent_id: "p".to_string(),
        column: 0,
        parent_index: 0,
        group_count: n,
        children: vec![("c".to_string(), 0)],
    };
    assert_ne!(k(1).fingerprint(), k(2).fingerprint());
    assert_eq!(k(2).fingerprint(), k(2).fingerprint());
}
