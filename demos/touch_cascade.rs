//! Checks the children of one parent one by one and reports glow arrivals, fallback fills
//! and the liquid level frame by frame.
//!
//! Run with `cargo run --example touch_cascade`.

fn tree() -> Vec<trellis::TodoItem> {
    use trellis::TodoItem;

    vec![
        TodoItem::new("groceries", 0.0).with_children(vec![
            TodoItem::new("milk", 0.0),
            TodoItem::new("bread", 1.0),
            TodoItem::new("eggs", 2.0),
            TodoItem::new("fruit", 3.0)
                .with_children(vec![TodoItem::new("apples", 0.0), TodoItem::new("pears", 1.0)]),
        ]),
        TodoItem::new("chores", 1.0).with_children(vec![TodoItem::new("laundry", 0.0)]),
    ]
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let doc = trellis::OutlineDoc {
        items: tree(),
        expanded: Vec::new(),
    };
    doc.validate()?;

    let mut view = trellis::OutlinerView::new(trellis::OutlinerOpts::default());
    let mut items = doc.items.clone();
    view.set_state(items.clone(), doc.all_parents(), 0.0);
    view.set_fill_level("groceries", 0.0, 0.0);

    let geometry = trellis::GridGeometry::new(view.grid().clone(), trellis::GridMetrics::default());
    let size = geometry.content_size();

    let checks = ["milk", "bread", "eggs", "fruit"];
    let mut t = 0.0;
    let mut next_check = 1200.0;
    let mut checked = 0;

    while t < 6000.0 {
        if checked < checks.len() && t >= next_check {
            let id = checks[checked];
            if let Some(item) = items[0].children.iter_mut().find(|c| c.id == id) {
                item.checked = true;
            }
            view.set_tree(items.clone(), t);
            view.touch(id, t);
            let level = items[0].checked_fraction().unwrap_or(0.0);
            let change = view.set_fill_level("groceries", level, t);
            println!("{t:>6.0}ms  checked {id:<6} -> level {level:.2} ({change:?})");
            checked += 1;
            next_check += 700.0;
        }

        if let Some(frame) = view.tick(t, &geometry, size) {
            for parent in &frame.arrivals {
                println!("{t:>6.0}ms  glow reached {parent}");
            }
            for parent in &frame.fallbacks {
                println!("{t:>6.0}ms  fallback filled {parent}");
            }
        }
        t += 16.0;
    }

    if let Some(blob) = view.fills().blob("groceries") {
        println!("final fill {:.3} settled={}", blob.fill(), blob.is_settled());
    }
    view.dispose();
    Ok(())
}
