use crate::foundation::core::{Rgba8Premul, SurfaceSize};
use crate::foundation::error::{TrellisError, TrellisResult};
use crate::foundation::hash::Fingerprint;
use crate::layout::columns::compute_columns;
use crate::layout::geometry::GeometryLookup;
use crate::layout::grid::{GridAssignments, GridPosition, compute_grid_assignments};
use crate::model::tree::{ExpandedSet, TodoItem, TreeIndex, structure_fingerprint};
use crate::physics::blob::BlobParams;
use crate::physics::fill::{FillChange, FillController, FillOpts};
use crate::render::connector::{ConnectorOpts, ConnectorRenderer, ConnectorStats};
use crate::render::plan::{DrawOp, FramePlan, Layer};
use crate::session::scheduler::FrameScheduler;
use crate::stability::tracker::{StabilityTracker, StructuralPlan};

/// Options of a mounted outliner view.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutlinerOpts {
    /// Bracket, reveal and glow settings.
    pub connector: ConnectorOpts,
    /// Liquid physics constants.
    pub blob: BlobParams,
    /// Fill gating.
    pub fill: FillOpts,
    /// How long frames keep running after a structural or resize event.
    pub settle_window_ms: f64,
    /// Liquid colour (straight RGBA).
    pub liquid_rgba: [u8; 4],
}

impl Default for OutlinerOpts {
    fn default() -> Self {
        Self {
            connector: ConnectorOpts::default(),
            blob: BlobParams::default(),
            fill: FillOpts::default(),
            settle_window_ms: 1000.0,
            liquid_rgba: [56, 189, 248, 220],
        }
    }
}

impl OutlinerOpts {
    /// Parse and validate options from JSON; missing fields take their defaults.
    pub fn from_json(s: &str) -> TrellisResult<Self> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject timings and sizes the animation cannot run with.
    pub fn validate(&self) -> TrellisResult<()> {
        let durations = [
            ("settle_window_ms", self.settle_window_ms),
            ("fill.fallback_ms", self.fill.fallback_ms),
            ("connector.reveal_duration_ms", self.connector.reveal_duration_ms),
            ("connector.stagger_ms", self.connector.stagger_ms),
            ("connector.glow.head_duration_ms", self.connector.glow.head_duration_ms),
            ("connector.glow.hold_ms", self.connector.glow.hold_ms),
            ("connector.glow.fade_ms", self.connector.glow.fade_ms),
        ];
        for (name, v) in durations {
            if !v.is_finite() || v < 0.0 {
                return Err(TrellisError::validation(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        if self.blob.samples < 2 {
            return Err(TrellisError::validation("blob.samples must be at least 2"));
        }
        if !(0.0..1.0).contains(&self.blob.damping) || !(0.0..1.0).contains(&self.blob.bulge_damping)
        {
            return Err(TrellisError::validation("damping factors must lie in [0, 1)"));
        }
        // Timers are polled before glow arrivals, so a tie also goes to the fallback.
        let travel = self.connector.glow.travel_total();
        if travel >= self.fill.fallback_ms {
            return Err(TrellisError::validation(format!(
                "fill.fallback_ms ({}) must exceed the glow travel time ({travel})",
                self.fill.fallback_ms
            )));
        }
        Ok(())
    }
}

/// One drawn frame.
#[derive(Clone, Debug)]
pub struct FrameOutput {
    /// Ops to paint, connectors first and liquid last.
    pub plan: FramePlan,
    /// Parents reached by a glow pulse this frame.
    pub arrivals: Vec<String>,
    /// Parents whose pending fill was applied by the fallback timer this frame.
    pub fallbacks: Vec<String>,
    /// Connector counters.
    pub stats: ConnectorStats,
}

/// A mounted outliner: owns the tree snapshot, the frozen structural plan, the touch queue,
/// the fill physics and the frame scheduler.
///
/// Drive it with explicit timestamps: mutate between frames, then call
/// [`OutlinerView::tick`] whenever [`OutlinerView::needs_frame`] is true or
/// [`OutlinerView::next_deadline`] has passed. Dropping the view disposes it.
#[derive(Debug)]
pub struct OutlinerView {
    opts: OutlinerOpts,
    tree: Vec<TodoItem>,
    expanded: ExpandedSet,
    index: TreeIndex,
    structure: Option<Fingerprint>,
    tracker: StabilityTracker,
    structural: StructuralPlan,
    grid: GridAssignments,
    connector: ConnectorRenderer,
    fills: FillController,
    scheduler: FrameScheduler,
    disposed: bool,
}

impl OutlinerView {
    /// An empty, unmounted view; the first `set_state` is its mount.
    pub fn new(opts: OutlinerOpts) -> Self {
        Self {
            connector: ConnectorRenderer::new(opts.connector.clone()),
            fills: FillController::new(opts.fill, opts.blob),
            scheduler: FrameScheduler::new(opts.settle_window_ms),
            opts,
            tree: Vec::new(),
            expanded: ExpandedSet::new(),
            index: TreeIndex::default(),
            structure: None,
            tracker: StabilityTracker::new(),
            structural: StructuralPlan::default(),
            grid: GridAssignments::new(),
            disposed: false,
        }
    }

    /// Options the view was created with.
    pub fn opts(&self) -> &OutlinerOpts {
        &self.opts
    }

    /// Replace the tree snapshot.
    pub fn set_tree(&mut self, tree: Vec<TodoItem>, now: f64) {
        if self.disposed {
            return;
        }
        self.tree = tree;
        self.refresh(now);
    }

    /// Replace the expanded set.
    pub fn set_expanded(&mut self, expanded: ExpandedSet, now: f64) {
        if self.disposed {
            return;
        }
        self.expanded = expanded;
        self.refresh(now);
    }

    /// Replace both tree and expanded set as one event.
    pub fn set_state(&mut self, tree: Vec<TodoItem>, expanded: ExpandedSet, now: f64) {
        if self.disposed {
            return;
        }
        self.tree = tree;
        self.expanded = expanded;
        self.refresh(now);
    }

    pub fn tree(&self) -> &[TodoItem] {
        &self.tree
    }

    pub fn expanded(&self) -> &ExpandedSet {
        &self.expanded
    }

    /// Grid positions of the current structural generation.
    pub fn grid(&self) -> &GridAssignments {
        &self.grid
    }

    /// Grid position of a visible item.
    pub fn position_of(&self, id: &str) -> TrellisResult<GridPosition> {
        self.grid
            .get(id)
            .copied()
            .ok_or_else(|| TrellisError::layout(format!("item '{id}' is not visible")))
    }

    /// The frozen plan of the current structural generation.
    pub fn plan(&self) -> &StructuralPlan {
        &self.structural
    }

    pub fn generation(&self) -> u64 {
        self.tracker.generation()
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.index.parent_of(id)
    }

    pub fn fills(&self) -> &FillController {
        &self.fills
    }

    pub fn connector(&self) -> &ConnectorRenderer {
        &self.connector
    }

    /// Start a glow pulse from `id` toward its parent.
    pub fn touch(&mut self, id: &str, now: f64) {
        if self.disposed {
            return;
        }
        self.connector.touch(id, now);
        self.scheduler.request_redraw();
    }

    /// Report the fill level of a parent, computed by the caller.
    pub fn set_fill_level(&mut self, id: &str, level: f64, now: f64) -> FillChange {
        if self.disposed {
            return FillChange::Unchanged;
        }
        let change = self.fills.set_level(id, level, now);
        if change != FillChange::Unchanged {
            self.scheduler.request_redraw();
        }
        change
    }

    /// Fill or empty a parent instantly, e.g. for check-all and clear-all actions.
    pub fn rush_fill(&mut self, id: &str, level: f64) -> FillChange {
        if self.disposed {
            return FillChange::Unchanged;
        }
        self.scheduler.request_redraw();
        self.fills.rush(id, level)
    }

    /// Request one redraw so connectors follow scrolled geometry.
    pub fn notify_scroll(&mut self) {
        if !self.disposed {
            self.scheduler.note_scroll();
        }
    }

    /// Reopen the settle window after the surface or item sizes changed.
    pub fn notify_resize(&mut self, now: f64) {
        if !self.disposed {
            self.scheduler.note_resize(now);
        }
    }

    /// Return `true` when a frame should be drawn at `now`.
    pub fn needs_frame(&self, now: f64) -> bool {
        !self.disposed
            && self.scheduler.needs_frame(
                now,
                self.connector.glow_active(),
                self.fills.physics_active(),
            )
    }

    /// Earliest fallback timer, for hosts that idle between frames.
    pub fn next_deadline(&self) -> Option<f64> {
        if self.disposed {
            return None;
        }
        self.fills.next_deadline()
    }

    /// Fire due timers and, if anything is animating, draw a frame.
    ///
    /// Returns `None` when idle or disposed. Geometry is read from `geometry` for this frame
    /// only.
    pub fn tick(
        &mut self,
        now: f64,
        geometry: &dyn GeometryLookup,
        size: SurfaceSize,
    ) -> Option<FrameOutput> {
        if self.disposed {
            return None;
        }
        let fallbacks: Vec<String> = self
            .fills
            .poll_timers(now)
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        if fallbacks.is_empty() && !self.needs_frame(now) {
            return None;
        }

        let settle_start = self.scheduler.settle_start().unwrap_or(now);
        let frame = self
            .connector
            .draw(&self.structural, settle_start, geometry, size, now);

        for parent in &frame.arrivals {
            let change = self.fills.on_arrival(parent);
            tracing::debug!(parent = %parent, ?change, "glow arrived");
        }
        self.fills.step();

        let mut plan = frame.plan;
        let liquid = Rgba8Premul::from_straight(self.opts.liquid_rgba);
        for (id, blob) in self.fills.blobs() {
            let Some(rect) = geometry.fill_rect(id) else {
                continue;
            };
            if let Some(path) = blob.liquid_path(rect) {
                plan.ops.push(DrawOp::FillPath {
                    path,
                    color: liquid,
                    opacity: 1.0,
                    layer: Layer::Liquid,
                });
            }
        }

        self.scheduler.frame_drawn();
        Some(FrameOutput {
            plan,
            arrivals: frame.arrivals,
            fallbacks,
            stats: frame.stats,
        })
    }

    /// Cancel every timer and pending frame and drop all animation state.
    ///
    /// Later calls on the view are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.fills.clear();
        self.connector.clear_touches();
        self.scheduler.cancel();
        tracing::debug!(generation = self.tracker.generation(), "outliner disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[tracing::instrument(skip_all)]
    fn refresh(&mut self, now: f64) {
        let fingerprint = structure_fingerprint(&self.tree, &self.expanded);
        if self.structure == Some(fingerprint) {
            // Content-only edit: redraw, keep the plan.
            self.scheduler.request_redraw();
            return;
        }
        self.structure = Some(fingerprint);

        let columns = compute_columns(&self.tree, &self.expanded);
        self.structural = self.tracker.observe(&columns, &self.expanded);
        self.grid = compute_grid_assignments(&columns, &self.expanded);
        self.index = TreeIndex::build(&self.tree);

        let index = &self.index;
        self.connector.retain_touches(|id| index.contains(id));
        self.fills.retain(|id| index.contains(id));
        self.scheduler.note_structural(now);

        tracing::debug!(
            generation = self.structural.generation,
            brackets = self.structural.brackets.len(),
            separators = self.structural.separators.len(),
            staggered = self.structural.staggered_count(),
            "structural event"
        );
    }
}

impl Drop for OutlinerView {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/outliner.rs"]
mod tests;
