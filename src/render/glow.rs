//! Traveling glow pulses along child → parent connector paths.
//!
//! A pulse runs in three phases measured from its touch timestamp:
//!
//! - **travel**: a bright head advances at a constant rate with a dimmer trail behind it. Once
//!   the head has reached the parent, a wake behind the trail brightens until the whole path is
//!   lit, so the lit "energy" flows continuously into the hold phase.
//! - **hold**: the whole path at full alpha.
//! - **fade**: linear decay to zero.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::animation::ease::progress;
use crate::animation::path::{GlowPath, Polyline, polyline_length};

/// Pulse timing. The default travel (390 ms) lands inside the default fill fallback (500 ms),
/// so the parent's rise follows the pulse rather than the timer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlowTiming {
    /// Time for the head to cover the whole path.
    pub head_duration_ms: f64,
    /// Trail length as a fraction of the path length.
    pub tail_fraction: f64,
    /// Full-path hold after travel.
    pub hold_ms: f64,
    /// Linear fade after hold.
    pub fade_ms: f64,
    /// Head progress at which the parent glow starts ramping in.
    pub parent_ramp_start: f64,
    /// Trail alpha while the head is still traveling.
    pub dim_alpha: f64,
    /// Bright head length as a fraction of the trail length.
    pub head_fraction: f64,
}

impl Default for GlowTiming {
    fn default() -> Self {
        Self {
            head_duration_ms: 300.0,
            tail_fraction: 0.3,
            hold_ms: 100.0,
            fade_ms: 500.0,
            parent_ramp_start: 0.7,
            dim_alpha: 0.35,
            head_fraction: 0.25,
        }
    }
}

impl GlowTiming {
    /// Duration of the travel phase: the head plus the trail draining into the parent.
    pub fn travel_total(&self) -> f64 {
        self.head_duration_ms * (1.0 + self.tail_fraction)
    }

    /// Full pulse lifetime.
    pub fn total(&self) -> f64 {
        self.travel_total() + self.hold_ms + self.fade_ms
    }

    /// Phase of a pulse `elapsed` ms after its touch.
    pub fn phase_at(&self, elapsed: f64) -> GlowPhase {
        let travel = self.travel_total();
        if elapsed < travel {
            GlowPhase::Travel
        } else if elapsed < travel + self.hold_ms {
            GlowPhase::Hold
        } else if elapsed < self.total() {
            GlowPhase::Fade
        } else {
            GlowPhase::Expired
        }
    }

    /// Alpha of the fully lit path during hold and fade.
    fn lit_alpha(&self, elapsed: f64) -> f64 {
        let fade_start = self.travel_total() + self.hold_ms;
        1.0 - progress(elapsed - fade_start, self.fade_ms)
    }
}

/// Phase of one pulse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlowPhase {
    /// Head moving toward the parent.
    Travel,
    /// Whole path lit.
    Hold,
    /// Whole path fading out.
    Fade,
    /// Past the end; to be pruned.
    Expired,
}

/// Visual role of a lit segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Brightened path behind the trail, and the whole path in hold/fade.
    Wake,
    /// Dim trail following the head.
    Trail,
    /// Bright leading edge.
    Head,
}

/// One lit piece of a pulse.
#[derive(Clone, Debug, PartialEq)]
pub struct GlowSegment {
    /// Role.
    pub kind: SegmentKind,
    /// Polyline to stroke.
    pub points: Polyline,
    /// Alpha in `[0, 1]`.
    pub alpha: f64,
}

/// Sampled state of one pulse at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct PulseFrame {
    /// Phase at the sample time.
    pub phase: GlowPhase,
    /// Lit segments, back to front.
    pub segments: SmallVec<[GlowSegment; 3]>,
    /// Glow alpha this pulse contributes to the parent node.
    pub parent_alpha: f64,
}

impl PulseFrame {
    /// Alpha-weighted lit length: `sum(alpha * length)` over all segments.
    pub fn energy(&self) -> f64 {
        self.segments
            .iter()
            .map(|s| s.alpha * polyline_length(&s.points))
            .sum()
    }
}

/// Sample a pulse on `path` at `elapsed` ms after its touch.
pub fn sample_pulse(path: &GlowPath, elapsed: f64, timing: &GlowTiming) -> PulseFrame {
    let phase = timing.phase_at(elapsed);
    let len = path.total_length;
    let mut segments = SmallVec::new();

    match phase {
        GlowPhase::Travel => {
            let elapsed = elapsed.max(0.0);
            let virtual_head = if timing.head_duration_ms > 0.0 {
                elapsed / timing.head_duration_ms * len
            } else {
                len * (1.0 + timing.tail_fraction)
            };
            let head = virtual_head.min(len);
            let tail_len = timing.tail_fraction * len;
            let trail_start = virtual_head - tail_len;

            let drain = progress(
                elapsed - timing.head_duration_ms,
                timing.travel_total() - timing.head_duration_ms,
            );
            push_segment(&mut segments, path, SegmentKind::Wake, 0.0, trail_start, drain);
            let trail_alpha = timing.dim_alpha + (1.0 - timing.dim_alpha) * drain;
            push_segment(
                &mut segments,
                path,
                SegmentKind::Trail,
                trail_start,
                head,
                trail_alpha,
            );
            push_segment(
                &mut segments,
                path,
                SegmentKind::Head,
                virtual_head - tail_len * timing.head_fraction,
                head,
                1.0,
            );

            let frac = if len > 0.0 {
                (virtual_head / len).min(1.0)
            } else {
                progress(elapsed, timing.head_duration_ms)
            };
            let ramp = 1.0 - timing.parent_ramp_start;
            let parent_alpha = if ramp > 0.0 {
                ((frac - timing.parent_ramp_start) / ramp).clamp(0.0, 1.0)
            } else if frac >= 1.0 {
                1.0
            } else {
                0.0
            };
            PulseFrame {
                phase,
                segments,
                parent_alpha,
            }
        }
        GlowPhase::Hold | GlowPhase::Fade => {
            let alpha = timing.lit_alpha(elapsed);
            push_segment(&mut segments, path, SegmentKind::Wake, 0.0, len, alpha);
            PulseFrame {
                phase,
                segments,
                parent_alpha: alpha,
            }
        }
        GlowPhase::Expired => PulseFrame {
            phase,
            segments,
            parent_alpha: 0.0,
        },
    }
}

fn push_segment(
    out: &mut SmallVec<[GlowSegment; 3]>,
    path: &GlowPath,
    kind: SegmentKind,
    from: f64,
    to: f64,
    alpha: f64,
) {
    if alpha <= 0.0 {
        return;
    }
    let points = path.sub_path(from, to);
    if points.len() < 2 {
        return;
    }
    out.push(GlowSegment {
        kind,
        points,
        alpha: alpha.min(1.0),
    });
}

/// One touch of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    /// Touch timestamp.
    pub started_at: f64,
    /// Whether the arrival at the parent was already reported.
    pub arrived: bool,
}

/// Touch timestamps per node id.
///
/// A node keeps a list so overlapping pulses animate and expire independently.
#[derive(Clone, Debug, Default)]
pub struct TouchLog {
    pulses: HashMap<String, Vec<Pulse>>,
}

impl TouchLog {
    /// Record a touch of `id` at `now`.
    pub fn touch(&mut self, id: impl Into<String>, now: f64) {
        self.pulses.entry(id.into()).or_default().push(Pulse {
            started_at: now,
            arrived: false,
        });
    }

    /// Pulses of `id`, oldest first.
    pub fn pulses(&self, id: &str) -> &[Pulse] {
        self.pulses.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn pulses_mut(&mut self, id: &str) -> Option<&mut Vec<Pulse>> {
        self.pulses.get_mut(id)
    }

    /// Ids with at least one pulse.
    pub fn touched_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.pulses.keys().map(String::as_str)
    }

    /// Drop pulses older than `lifetime`; returns how many were removed.
    pub fn prune(&mut self, now: f64, lifetime: f64) -> usize {
        let mut removed = 0;
        self.pulses.retain(|_, list| {
            let before = list.len();
            list.retain(|p| now - p.started_at < lifetime);
            removed += before - list.len();
            !list.is_empty()
        });
        removed
    }

    /// Drop every pulse of ids rejected by `keep`.
    pub fn retain_ids(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.pulses.retain(|id, _| keep(id));
    }

    /// Return `true` when no pulse is pending.
    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.pulses.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/glow.rs"]
mod tests;
