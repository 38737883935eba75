use super::*;
use crate::layout::geometry::{GridGeometry, GridMetrics};
use crate::stability::tracker::Stability;

fn tree() -> Vec<TodoItem> {
    vec![TodoItem::new("root", 0.0).with_children(vec![
        TodoItem::new("c1", 0.0)
            .with_children(vec![TodoItem::new("g11", 0.0), TodoItem::new("g12", 1.0)]),
        TodoItem::new("c2", 1.0)
            .with_children(vec![TodoItem::new("g21", 0.0), TodoItem::new("g22", 1.0)]),
    ])]
}

fn all_expanded() -> ExpandedSet {
    ["root", "c1", "c2"].iter().map(|s| s.to_string()).collect()
}

fn mounted(opts: OutlinerOpts) -> OutlinerView {
    let mut view = OutlinerView::new(opts);
    view.set_state(tree(), all_expanded(), 0.0);
    view
}

fn geometry(view: &OutlinerView) -> GridGeometry {
    GridGeometry::new(view.grid().clone(), GridMetrics::default())
}

fn size() -> SurfaceSize {
    SurfaceSize::new(800.0, 300.0)
}

fn pos(row: u32, column: u32) -> GridPosition {
    GridPosition {
        grid_row: row,
        grid_column: column,
    }
}

#[test]
fn mounting_is_a_structural_event() {
    let view = mounted(OutlinerOpts::default());
    assert_eq!(view.generation(), 1);
    assert_eq!(view.position_of("root").unwrap(), pos(1, 1));
    assert_eq!(view.position_of("c2").unwrap(), pos(3, 2));
    assert_eq!(view.position_of("g22").unwrap(), pos(4, 3));
    assert_eq!(view.parent_of("g21"), Some("c2"));
    assert_eq!(view.plan().brackets.len(), 3);
    assert_eq!(
        view.plan().staggered_count(),
        view.plan().brackets.len() + view.plan().separators.len()
    );
    assert!(view.needs_frame(0.0));
}

#[test]
fn content_edits_keep_the_plan() {
    let mut view = mounted(OutlinerOpts::default());
    let mut edited = tree();
    edited[0].children[0].text = "renamed".into();
    edited[0].children[0].children[1].checked = true;
    view.set_tree(edited, 50.0);
    assert_eq!(view.generation(), 1);

    view.set_expanded(all_expanded(), 60.0);
    assert_eq!(view.generation(), 1);
}

#[test]
fn collapsing_restaggers_only_changed_groups() {
    let mut view = mounted(OutlinerOpts::default());
    let mut expanded = all_expanded();
    expanded.remove("c2");
    view.set_expanded(expanded, 100.0);
    assert_eq!(view.generation(), 2);

    let root = view
        .plan()
        .brackets
        .iter()
        .find(|b| b.parent_id == "root")
        .unwrap();
    assert_eq!(root.stability, Stability::Stable);

    // c1 lost its sibling group, so its key changed.
    let c1 = view
        .plan()
        .brackets
        .iter()
        .find(|b| b.parent_id == "c1")
        .unwrap();
    assert_eq!(c1.stability, Stability::Staggered);
    assert!(view.plan().brackets.iter().all(|b| b.parent_id != "c2"));

    assert!(matches!(
        view.position_of("g21"),
        Err(TrellisError::Layout(_))
    ));
}

#[test]
fn view_idles_after_the_settle_window() {
    let mut view = mounted(OutlinerOpts::default());
    let geo = geometry(&view);
    let mut t = 0.0;
    while t < 1000.0 {
        assert!(view.tick(t, &geo, size()).is_some(), "no frame at {t}");
        t += 16.0;
    }
    assert!(view.tick(1000.0, &geo, size()).is_none());
    assert!(!view.needs_frame(2000.0));

    view.notify_scroll();
    assert!(view.tick(2000.0, &geo, size()).is_some());
    assert!(view.tick(2016.0, &geo, size()).is_none());

    view.notify_resize(3000.0);
    assert!(view.tick(3500.0, &geo, size()).is_some());
    assert_eq!(view.generation(), 1);
}

#[test]
fn glow_arrival_releases_pending_fill() {
    let mut view = mounted(OutlinerOpts::default());
    let geo = geometry(&view);

    view.set_fill_level("c1", 0.0, 0.0);
    view.touch("g11", 0.0);
    assert_eq!(view.set_fill_level("c1", 0.5, 0.0), FillChange::Deferred);

    let mut arrived_at = None;
    let mut t = 0.0;
    while t <= 1500.0 {
        if let Some(frame) = view.tick(t, &geo, size()) {
            assert!(frame.fallbacks.is_empty(), "fallback fired at {t}");
            let target = view.fills().blob("c1").unwrap().target_fill();
            if frame.arrivals.iter().any(|p| p == "c1") {
                assert!(arrived_at.is_none(), "arrived twice");
                assert_eq!(target, 0.5, "arrival frame did not release the rise");
                arrived_at = Some(t);
            } else if arrived_at.is_none() {
                assert_eq!(target, 0.0, "rise applied before the glow at {t}");
                assert_eq!(view.fills().pending_level("c1"), Some(0.5));
            }
        }
        t += 16.0;
    }

    let arrived_at = arrived_at.expect("glow never arrived");
    assert!((390.0..410.0).contains(&arrived_at));
    assert!(arrived_at < view.opts().fill.fallback_ms);
    assert_eq!(view.fills().pending_count(), 0);
    assert_eq!(view.next_deadline(), None);
    assert!(view.connector().touches().is_empty());
}

#[test]
fn fallback_fills_when_no_glow_arrives() {
    let mut view = mounted(OutlinerOpts::default());
    let geo = geometry(&view);
    view.set_fill_level("c1", 0.0, 0.0);

    let start = 5000.0;
    assert!(view.tick(start, &geo, size()).is_some());
    assert_eq!(view.set_fill_level("c1", 0.5, start), FillChange::Deferred);
    assert_eq!(view.next_deadline(), Some(start + 500.0));

    assert!(view.tick(start + 10.0, &geo, size()).is_some());
    assert!(view.tick(start + 250.0, &geo, size()).is_none());
    assert!(view.tick(start + 499.0, &geo, size()).is_none());

    let frame = view.tick(start + 500.0, &geo, size()).expect("fallback frame");
    assert_eq!(frame.fallbacks, vec!["c1".to_owned()]);
    assert_eq!(view.fills().blob("c1").unwrap().target_fill(), 0.5);

    let mut t = start + 516.0;
    let mut fired = 0;
    while let Some(frame) = view.tick(t, &geo, size()) {
        fired += frame.fallbacks.len();
        t += 16.0;
        assert!(t < start + 60_000.0, "physics never settled");
    }
    assert_eq!(fired, 0);
    assert_eq!(view.next_deadline(), None);
}

#[test]
fn liquid_is_drawn_into_checkboxes() {
    let mut view = mounted(OutlinerOpts::default());
    let geo = geometry(&view);
    view.rush_fill("c1", 0.5);
    let frame = view.tick(0.0, &geo, size()).unwrap();
    assert_eq!(frame.plan.ops_in(Layer::Liquid).count(), 1);
    let last = frame.plan.ops.last().and_then(DrawOp::layer);
    assert_eq!(last, Some(Layer::Liquid));
}

#[test]
fn removed_nodes_drop_touches_and_fills() {
    let mut view = mounted(OutlinerOpts::default());
    view.touch("g11", 0.0);
    view.set_fill_level("c1", 0.2, 0.0);
    view.set_fill_level("c1", 0.9, 0.0);

    let mut pruned = tree();
    pruned[0].children.remove(0);
    view.set_tree(pruned, 10.0);

    assert_eq!(view.generation(), 2);
    assert!(view.connector().touches().is_empty());
    assert!(view.fills().blob("c1").is_none());
    assert_eq!(view.next_deadline(), None);
}

#[test]
fn dispose_cancels_everything() {
    let mut view = mounted(OutlinerOpts::default());
    let geo = geometry(&view);
    view.set_fill_level("c1", 0.0, 0.0);
    view.set_fill_level("c1", 0.5, 0.0);
    view.touch("g11", 0.0);

    view.dispose();
    assert!(view.is_disposed());
    assert_eq!(view.next_deadline(), None);
    assert!(!view.needs_frame(10.0));
    assert!(view.tick(600.0, &geo, size()).is_none());

    view.touch("g12", 700.0);
    view.set_tree(Vec::new(), 700.0);
    assert!(view.connector().touches().is_empty());
    assert_eq!(view.generation(), 1);
    view.dispose();
}

#[test]
fn opts_load_from_partial_json() {
    let opts =
        OutlinerOpts::from_json(r#"{"settle_window_ms": 250, "fill": {"fallback_ms": 800}}"#)
            .unwrap();
    assert_eq!(opts.settle_window_ms, 250.0);
    assert_eq!(opts.fill.fallback_ms, 800.0);
    assert_eq!(opts.blob, BlobParams::default());
    assert_eq!(opts.connector, ConnectorOpts::default());
}

#[test]
fn opts_reject_bad_values() {
    let err = OutlinerOpts::from_json(r#"{"settle_window_ms": -1}"#).unwrap_err();
    assert!(matches!(err, TrellisError::Validation(_)));

    let err = OutlinerOpts::from_json(r#"{"blob": {"samples": 1}}"#).unwrap_err();
    assert!(matches!(err, TrellisError::Validation(_)));

    // The fallback must not beat the glow it is standing in for.
    let err = OutlinerOpts::from_json(r#"{"fill": {"fallback_ms": 390}}"#).unwrap_err();
    assert!(matches!(err, TrellisError::Validation(_)));
    let err = OutlinerOpts::from_json(r#"{"connector": {"glow": {"head_duration_ms": 400}}}"#)
        .unwrap_err();
    assert!(matches!(err, TrellisError::Validation(_)));
    assert!(
        OutlinerOpts::from_json(r#"{"fill": {"fallback_ms": 391}}"#)
            .unwrap()
            .validate()
            .is_ok()
    );

    let err = OutlinerOpts::from_json("{").unwrap_err();
    assert!(matches!(err, TrellisError::Serde(_)));
}
