use crate::animation::ease::{Ease, progress};
use crate::foundation::core::Rect;

/// Timing of the staggered reveal of newly appeared shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealTiming {
    /// Length of one shape's reveal.
    pub duration_ms: f64,
    /// Delay between consecutive shapes in top-to-bottom order.
    pub stagger_ms: f64,
}

impl RevealTiming {
    /// Eased reveal progress of the `order`-th staggered shape.
    ///
    /// Starts at `settle_start + order * stagger`; `0` before that, exactly `1` once complete.
    pub fn progress(&self, now: f64, settle_start: f64, order: usize) -> f64 {
        let start = settle_start + order as f64 * self.stagger_ms;
        Ease::OutQuad.apply(progress(now - start, self.duration_ms))
    }

    /// Time at which every one of `count` staggered shapes has finished revealing.
    pub fn finished_at(&self, settle_start: f64, count: usize) -> f64 {
        settle_start + count.saturating_sub(1) as f64 * self.stagger_ms + self.duration_ms
    }
}

/// Left-to-right wipe clip: `bounds` widened by `pad`, cut to a `t` fraction of its width.
pub fn wipe_clip(bounds: Rect, t: f64, pad: f64) -> Rect {
    let outer = bounds.inflate(pad, pad);
    Rect::new(
        outer.x0,
        outer.y0,
        outer.x0 + outer.width() * t.clamp(0.0, 1.0),
        outer.y1,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/reveal.rs"]
mod tests;
