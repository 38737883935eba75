use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use trellis::RenderBackend as _;

const FRAME_STEP_MS: f64 = 16.0;

#[derive(Parser, Debug)]
#[command(name = "trellis", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the grid assignment of an outline as JSON.
    Layout(LayoutArgs),
    /// Simulate a mounted view and write one frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input outline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Expand every parent instead of using the document's expanded list.
    #[arg(long)]
    expand_all: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input outline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Simulated time of the written frame.
    #[arg(long, default_value_t = 600.0)]
    at_ms: f64,

    /// Check an item right after mounting; pulses toward its parent and raises its fill.
    #[arg(long = "check")]
    check: Vec<String>,

    /// Expand every parent instead of using the document's expanded list.
    #[arg(long)]
    expand_all: bool,

    /// Device pixels per logical pixel.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Options JSON; missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Layout(args) => cmd_layout(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_doc(path: &Path) -> anyhow::Result<trellis::OutlineDoc> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read outline '{}'", path.display()))?;
    trellis::OutlineDoc::from_json(&s).with_context(|| format!("parse outline '{}'", path.display()))
}

fn read_opts(path: Option<&Path>) -> anyhow::Result<trellis::OutlinerOpts> {
    let Some(path) = path else {
        return Ok(trellis::OutlinerOpts::default());
    };
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read options '{}'", path.display()))?;
    trellis::OutlinerOpts::from_json(&s)
        .with_context(|| format!("parse options '{}'", path.display()))
}

fn expanded_for(doc: &trellis::OutlineDoc, expand_all: bool) -> trellis::ExpandedSet {
    if expand_all {
        doc.all_parents()
    } else {
        doc.expanded_set()
    }
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let doc = read_doc(&args.in_path)?;
    let expanded = expanded_for(&doc, args.expand_all);
    let columns = trellis::compute_columns(&doc.items, &expanded);
    let grid: BTreeMap<String, trellis::GridPosition> =
        trellis::compute_grid_assignments(&columns, &expanded)
            .into_iter()
            .collect();
    let json = serde_json::to_string_pretty(&grid).context("serialize grid")?;
    println!("{json}");
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.at_ms.is_finite() && args.at_ms >= 0.0,
        "--at-ms must be a non-negative number"
    );
    let doc = read_doc(&args.in_path)?;
    let opts = read_opts(args.config.as_deref())?;
    let expanded = expanded_for(&doc, args.expand_all);

    let mut view = trellis::OutlinerView::new(opts);
    let mut items = doc.items;
    view.set_state(items.clone(), expanded, 0.0);
    for (id, level) in parent_levels(&items) {
        view.set_fill_level(&id, level, 0.0);
    }

    for id in &args.check {
        view.position_of(id)
            .with_context(|| format!("--check '{id}'"))?;
        anyhow::ensure!(mark_checked(&mut items, id), "unknown item '{id}'");
        view.set_tree(items.clone(), 0.0);
        view.touch(id, 0.0);
        if let Some(parent) = view.parent_of(id).map(str::to_owned) {
            let level = trellis::find_item(&items, &parent)
                .and_then(trellis::TodoItem::checked_fraction)
                .unwrap_or(0.0);
            view.set_fill_level(&parent, level, 0.0);
        }
    }

    let geometry = trellis::GridGeometry::new(view.grid().clone(), trellis::GridMetrics::default());
    let size = geometry.content_size().with_scale(args.scale);

    let mut t = 0.0;
    while t < args.at_ms {
        view.tick(t, &geometry, size);
        t += FRAME_STEP_MS;
    }
    view.notify_scroll();
    let out = view
        .tick(args.at_ms, &geometry, size)
        .context("view produced no frame")?;
    eprintln!(
        "frame at {}ms: {} brackets, {} separators, {} pulses, {} ops",
        args.at_ms,
        out.stats.brackets,
        out.stats.separators,
        out.stats.pulses,
        out.plan.ops.len()
    );

    let mut backend = trellis::CpuBackend::new(
        trellis::CpuBackendOpts::default().with_clear_rgba(Some([18, 20, 28, 255])),
    );
    let frame = backend.render(&out.plan)?.into_straight();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

/// Fill level of every parent, from its checked children.
fn parent_levels(items: &[trellis::TodoItem]) -> Vec<(String, f64)> {
    let mut out = Vec::new();
    let mut stack: Vec<&trellis::TodoItem> = items.iter().collect();
    while let Some(item) = stack.pop() {
        if let Some(level) = item.checked_fraction() {
            out.push((item.id.clone(), level));
        }
        stack.extend(item.children.iter());
    }
    out
}

fn mark_checked(items: &mut [trellis::TodoItem], id: &str) -> bool {
    for item in items {
        if item.id == id {
            item.checked = true;
            return true;
        }
        if mark_checked(&mut item.children, id) {
            return true;
        }
    }
    false
}
