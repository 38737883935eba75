use std::collections::{BTreeMap, HashMap};

use crate::physics::blob::{BlobParams, ViscousBlob};
use crate::session::scheduler::{TimerId, TimerQueue};

/// Fill gating options.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FillOpts {
    /// A pending rise is applied after this long even if no glow arrives.
    pub fallback_ms: f64,
}

impl Default for FillOpts {
    fn default() -> Self {
        Self { fallback_ms: 500.0 }
    }
}

/// What a fill update did to a blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillChange {
    /// First sighting; the blob starts at the level without animation.
    Created,
    /// A rise is waiting for a glow arrival or the fallback timer.
    Deferred,
    /// Animated toward the level.
    Animated,
    /// Jumped to full.
    Snapped,
    /// Animated down.
    Drained,
    /// Emptied instantly.
    Flushed,
    /// Nothing to do.
    Unchanged,
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    level: f64,
    timer: TimerId,
}

const LEVEL_EPSILON: f64 = 1e-9;

/// Owns one [`ViscousBlob`] per parent and gates rises on glow arrival.
///
/// A rise is held as pending until [`FillController::on_arrival`] or the fallback timer
/// applies it; falls apply immediately.
#[derive(Debug, Default)]
pub struct FillController {
    opts: FillOpts,
    params: BlobParams,
    blobs: BTreeMap<String, ViscousBlob>,
    pending: HashMap<String, Pending>,
    timers: TimerQueue<String>,
}

impl FillController {
    /// An empty controller; blobs appear on the first level reported for a parent.
    pub fn new(opts: FillOpts, params: BlobParams) -> Self {
        Self {
            opts,
            params,
            blobs: BTreeMap::new(),
            pending: HashMap::new(),
            timers: TimerQueue::new(),
        }
    }

    /// Gating options.
    pub fn opts(&self) -> &FillOpts {
        &self.opts
    }

    /// Report the externally computed fill level of `id` at time `now`.
    pub fn set_level(&mut self, id: &str, level: f64, now: f64) -> FillChange {
        if !level.is_finite() {
            return FillChange::Unchanged;
        }
        let level = level.clamp(0.0, 1.0);

        let Some(blob) = self.blobs.get_mut(id) else {
            let mut blob = ViscousBlob::new(self.params);
            blob.rush_fill(level);
            self.blobs.insert(id.to_owned(), blob);
            tracing::trace!(id, level, "blob created");
            return FillChange::Created;
        };

        let effective = self
            .pending
            .get(id)
            .map_or(blob.target_fill(), |p| p.level);

        if level > effective + LEVEL_EPSILON {
            match self.pending.get_mut(id) {
                Some(p) => p.level = level,
                None => {
                    let timer = self.timers.schedule(now + self.opts.fallback_ms, id.to_owned());
                    self.pending.insert(id.to_owned(), Pending { level, timer });
                }
            }
            return FillChange::Deferred;
        }
        if level < effective - LEVEL_EPSILON {
            if let Some(p) = self.pending.remove(id) {
                self.timers.cancel(p.timer);
            }
            return if level <= 0.0 {
                blob.flush();
                FillChange::Flushed
            } else if level < blob.target_fill() - LEVEL_EPSILON {
                blob.drain(level);
                FillChange::Drained
            } else if level <= blob.target_fill() + LEVEL_EPSILON {
                // Back on the blob's own target: the cancelled rise never moved it.
                FillChange::Unchanged
            } else {
                blob.set_target_fill(level);
                FillChange::Animated
            };
        }
        FillChange::Unchanged
    }

    /// A glow pulse reached `id`; apply its pending rise, if any.
    pub fn on_arrival(&mut self, id: &str) -> FillChange {
        let Some(p) = self.pending.remove(id) else {
            return FillChange::Unchanged;
        };
        self.timers.cancel(p.timer);
        self.apply(id, p.level)
    }

    /// Apply every pending rise whose fallback deadline has passed.
    pub fn poll_timers(&mut self, now: f64) -> Vec<(String, FillChange)> {
        let mut fired = Vec::new();
        for id in self.timers.take_due(now) {
            let Some(p) = self.pending.remove(&id) else {
                continue;
            };
            tracing::debug!(id = %id, level = p.level, "fill fallback fired");
            let change = self.apply(&id, p.level);
            fired.push((id, change));
        }
        fired
    }

    /// Jump `id` to `level` immediately, dropping any pending rise.
    pub fn rush(&mut self, id: &str, level: f64) -> FillChange {
        if let Some(p) = self.pending.remove(id) {
            self.timers.cancel(p.timer);
        }
        let blob = self
            .blobs
            .entry(id.to_owned())
            .or_insert_with(|| ViscousBlob::new(self.params));
        if level.is_finite() && level <= 0.0 {
            blob.flush();
            FillChange::Flushed
        } else {
            blob.rush_fill(level);
            FillChange::Snapped
        }
    }

    /// Step every moving blob. Returns `true` while any is still moving.
    pub fn step(&mut self) -> bool {
        let mut active = false;
        for blob in self.blobs.values_mut() {
            active |= blob.step();
        }
        active
    }

    /// Return `true` while any blob is moving.
    pub fn physics_active(&self) -> bool {
        self.blobs.values().any(|b| !b.is_settled())
    }

    /// Level of the rise waiting on `id`, if any.
    pub fn pending_level(&self, id: &str) -> Option<f64> {
        self.pending.get(id).map(|p| p.level)
    }

    /// Number of parents with a rise waiting.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest fallback deadline.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    /// Blob of parent `id`.
    pub fn blob(&self, id: &str) -> Option<&ViscousBlob> {
        self.blobs.get(id)
    }

    /// Blobs in id order.
    pub fn blobs(&self) -> impl Iterator<Item = (&str, &ViscousBlob)> + '_ {
        self.blobs.iter().map(|(id, b)| (id.as_str(), b))
    }

    /// Drop blobs, pending rises and timers of nodes rejected by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        let before = self.blobs.len();
        self.blobs.retain(|id, _| keep(id));
        let timers = &mut self.timers;
        self.pending.retain(|id, p| {
            let live = keep(id);
            if !live {
                timers.cancel(p.timer);
            }
            live
        });
        let removed = before - self.blobs.len();
        if removed > 0 {
            tracing::trace!(removed, "blobs removed");
        }
    }

    /// Drop everything, cancelling every timer.
    pub fn clear(&mut self) {
        self.blobs.clear();
        self.pending.clear();
        self.timers.clear();
    }

    fn apply(&mut self, id: &str, level: f64) -> FillChange {
        let Some(blob) = self.blobs.get_mut(id) else {
            return FillChange::Unchanged;
        };
        if level >= 1.0 {
            blob.rush_fill(1.0);
            FillChange::Snapped
        } else {
            blob.set_target_fill(level);
            FillChange::Animated
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/physics/fill.rs"]
mod tests;
