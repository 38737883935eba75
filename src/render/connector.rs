use std::collections::{BTreeMap, HashMap};

use kurbo::Shape;

use crate::foundation::core::{BezPath, Point, Rgba8Premul, RoundedRect, SurfaceSize};
use crate::layout::geometry::GeometryLookup;
use crate::render::bracket::{BracketGroup, resolve_brackets};
use crate::render::glow::{GlowPhase, GlowTiming, SegmentKind, TouchLog, sample_pulse};
use crate::render::plan::{DrawOp, FramePlan, Layer};
use crate::render::reveal::{RevealTiming, wipe_clip};
use crate::stability::tracker::{Stability, StructuralPlan};

/// Connector appearance and animation timing.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConnectorOpts {
    /// Bracket and separator line width.
    pub stroke_width: f64,
    /// Bracket colour (straight RGBA).
    pub bracket_rgba: [u8; 4],
    /// Separator colour (straight RGBA).
    pub separator_rgba: [u8; 4],
    /// Glow and highlight colour (straight RGBA).
    pub glow_rgba: [u8; 4],
    /// Padding of the parent highlight around the item box.
    pub highlight_padding: f64,
    /// Corner radius of the parent highlight.
    pub highlight_radius: f64,
    /// Fill alpha of the parent highlight at full glow.
    pub highlight_fill: f64,
    /// Per-shape reveal duration.
    pub reveal_duration_ms: f64,
    /// Delay between consecutive staggered shapes.
    pub stagger_ms: f64,
    /// Glow pulse timing.
    pub glow: GlowTiming,
}

impl Default for ConnectorOpts {
    fn default() -> Self {
        Self {
            stroke_width: 1.5,
            bracket_rgba: [148, 163, 184, 255],
            separator_rgba: [100, 116, 139, 160],
            glow_rgba: [250, 204, 21, 255],
            highlight_padding: 4.0,
            highlight_radius: 6.0,
            highlight_fill: 0.18,
            reveal_duration_ms: 100.0,
            stagger_ms: 30.0,
            glow: GlowTiming::default(),
        }
    }
}

impl ConnectorOpts {
    /// Reveal timing derived from these options.
    pub fn reveal(&self) -> RevealTiming {
        RevealTiming {
            duration_ms: self.reveal_duration_ms,
            stagger_ms: self.stagger_ms,
        }
    }
}

/// Per-frame counters, mostly for tracing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectorStats {
    /// Brackets drawn (stable and staggered).
    pub brackets: usize,
    /// Separators drawn.
    pub separators: usize,
    /// Planned shapes skipped because geometry was missing.
    pub skipped: usize,
    /// Pulses sampled.
    pub pulses: usize,
}

/// Output of one [`ConnectorRenderer::draw`] call.
#[derive(Clone, Debug)]
pub struct ConnectorFrame {
    /// Ops to paint.
    pub plan: FramePlan,
    /// Parents whose pulse entered hold this frame, one entry per pulse.
    pub arrivals: Vec<String>,
    /// Whether any pulse is still pending after this frame.
    pub glow_active: bool,
    /// Counters.
    pub stats: ConnectorStats,
}

struct SeparatorLine {
    from: Point,
    to: Point,
    stability: Stability,
}

enum Staggered<'a> {
    Bracket(&'a BracketGroup),
    Separator(&'a SeparatorLine),
}

/// Draws brackets, separators, traveling glows and parent highlights.
///
/// Owns the touch queue. Structural classification comes from a frozen [`StructuralPlan`];
/// geometry is read fresh from the lookup on every call.
#[derive(Debug, Default)]
pub struct ConnectorRenderer {
    opts: ConnectorOpts,
    touches: TouchLog,
}

impl ConnectorRenderer {
    /// Create a renderer.
    pub fn new(opts: ConnectorOpts) -> Self {
        Self {
            opts,
            touches: TouchLog::default(),
        }
    }

    /// Options in use.
    pub fn opts(&self) -> &ConnectorOpts {
        &self.opts
    }

    /// Queue a glow pulse from `id` toward its parent.
    pub fn touch(&mut self, id: impl Into<String>, now: f64) {
        self.touches.touch(id, now);
    }

    /// The pending touches.
    pub fn touches(&self) -> &TouchLog {
        &self.touches
    }

    /// Return `true` while any pulse is pending.
    pub fn glow_active(&self) -> bool {
        !self.touches.is_empty()
    }

    /// Drop touches of nodes rejected by `keep`.
    pub fn retain_touches(&mut self, keep: impl FnMut(&str) -> bool) {
        self.touches.retain_ids(keep);
    }

    /// Drop every pending touch.
    pub fn clear_touches(&mut self) {
        self.touches.clear();
    }

    /// Paint one frame.
    ///
    /// `settle_start` is the time of the structural event that produced `plan`; staggered
    /// shapes reveal relative to it.
    pub fn draw(
        &mut self,
        plan: &StructuralPlan,
        settle_start: f64,
        geometry: &dyn GeometryLookup,
        size: SurfaceSize,
        now: f64,
    ) -> ConnectorFrame {
        let mut out = FramePlan::new(size);
        let mut stats = ConnectorStats::default();

        let brackets = resolve_brackets(&plan.brackets, geometry);
        stats.skipped += plan.brackets.len() - brackets.len();

        let separators: Vec<SeparatorLine> = plan
            .separators
            .iter()
            .filter_map(|s| {
                let above = geometry.item_rect(&s.above_id)?;
                let below = geometry.item_rect(&s.below_id)?;
                let y = (above.y1 + below.y0) / 2.0;
                Some(SeparatorLine {
                    from: Point::new(above.x0.min(below.x0), y),
                    to: Point::new(above.x1.max(below.x1), y),
                    stability: s.stability,
                })
            })
            .collect();
        stats.skipped += plan.separators.len() - separators.len();
        stats.brackets = brackets.len();
        stats.separators = separators.len();

        let bracket_color = Rgba8Premul::from_straight(self.opts.bracket_rgba);
        let separator_color = Rgba8Premul::from_straight(self.opts.separator_rgba);
        let width = self.opts.stroke_width;

        // Stable shapes: immediately, full opacity.
        let mut staggered: Vec<(f64, Staggered<'_>)> = Vec::new();
        for (i, group) in &brackets {
            if plan.brackets[*i].stability == Stability::Stable {
                out.ops.push(stroke(group.shape(), bracket_color, width, 1.0, Layer::Bracket));
            } else {
                staggered.push((group.bounds().y0, Staggered::Bracket(group)));
            }
        }
        for sep in &separators {
            if sep.stability == Stability::Stable {
                out.ops
                    .push(stroke(sep.path(), separator_color, width, 1.0, Layer::Separator));
            } else {
                staggered.push((sep.from.y, Staggered::Separator(sep)));
            }
        }

        // Staggered shapes: top to bottom, each revealing after the previous one.
        staggered.sort_by(|a, b| a.0.total_cmp(&b.0));
        let reveal = self.opts.reveal();
        for (order, (_, shape)) in staggered.iter().enumerate() {
            let t = reveal.progress(now, settle_start, order);
            if t <= 0.0 {
                continue;
            }
            match shape {
                Staggered::Bracket(group) => {
                    let wipe = t < 1.0;
                    if wipe {
                        out.ops.push(DrawOp::PushClip {
                            rect: wipe_clip(group.bounds(), t, width),
                        });
                    }
                    out.ops
                        .push(stroke(group.shape(), bracket_color, width, t, Layer::Bracket));
                    if wipe {
                        out.ops.push(DrawOp::PopClip);
                    }
                }
                Staggered::Separator(sep) => {
                    out.ops
                        .push(stroke(sep.path(), separator_color, width, t, Layer::Separator));
                }
            }
        }

        // Traveling glows.
        let glow_color = Rgba8Premul::from_straight(self.opts.glow_rgba);
        let timing = self.opts.glow;
        let by_child: HashMap<&str, &BracketGroup> = brackets
            .iter()
            .flat_map(|(_, g)| g.children.iter().map(move |c| (c.id.as_str(), g)))
            .collect();

        let mut parent_alpha: BTreeMap<String, f64> = BTreeMap::new();
        let mut arrivals = Vec::new();
        let mut touched: Vec<String> = self.touches.touched_ids().map(str::to_owned).collect();
        touched.sort_unstable();

        for child in &touched {
            let Some(group) = by_child.get(child.as_str()) else {
                continue;
            };
            let Some(path) = group.glow_path_for(child) else {
                continue;
            };
            let Some(pulses) = self.touches.pulses_mut(child) else {
                continue;
            };
            for pulse in pulses.iter_mut() {
                let elapsed = now - pulse.started_at;
                let frame = sample_pulse(&path, elapsed, &timing);
                stats.pulses += 1;

                if frame.phase != GlowPhase::Travel && !pulse.arrived {
                    pulse.arrived = true;
                    tracing::trace!(child = %child, parent = %group.parent_id, "glow arrived");
                    arrivals.push(group.parent_id.clone());
                }

                for seg in &frame.segments {
                    let mut p = BezPath::new();
                    let mut pts = seg.points.iter();
                    if let Some(first) = pts.next() {
                        p.move_to(*first);
                    }
                    for pt in pts {
                        p.line_to(*pt);
                    }
                    let w = match seg.kind {
                        SegmentKind::Wake => width * 1.5,
                        SegmentKind::Trail => width * 2.0,
                        SegmentKind::Head => width * 2.5,
                    };
                    out.ops.push(stroke(p, glow_color, w, seg.alpha, Layer::Glow));
                }

                if frame.parent_alpha > 0.0 {
                    let a = parent_alpha.entry(group.parent_id.clone()).or_insert(0.0);
                    *a = a.max(frame.parent_alpha);
                }
            }
        }

        // Parent highlights.
        for (parent, alpha) in &parent_alpha {
            let Some(rect) = geometry.item_rect(parent) else {
                continue;
            };
            let pad = self.opts.highlight_padding;
            let rr = RoundedRect::from_rect(rect.inflate(pad, pad), self.opts.highlight_radius);
            let path = rr.to_path(0.1);
            out.ops.push(DrawOp::FillPath {
                path: path.clone(),
                color: glow_color,
                opacity: (alpha * self.opts.highlight_fill) as f32,
                layer: Layer::Highlight,
            });
            out.ops
                .push(stroke(path, glow_color, width, *alpha, Layer::Highlight));
        }

        self.touches.prune(now, timing.total());

        ConnectorFrame {
            plan: out,
            arrivals,
            glow_active: !self.touches.is_empty(),
            stats,
        }
    }
}

impl SeparatorLine {
    fn path(&self) -> BezPath {
        let mut p = BezPath::new();
        p.move_to(self.from);
        p.line_to(self.to);
        p
    }
}

fn stroke(path: BezPath, color: Rgba8Premul, width: f64, opacity: f64, layer: Layer) -> DrawOp {
    DrawOp::StrokePath {
        path,
        color,
        width,
        opacity: opacity.clamp(0.0, 1.0) as f32,
        layer,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/connector.rs"]
mod tests;
