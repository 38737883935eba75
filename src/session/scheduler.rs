/// Handle of a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Timer<K> {
    id: TimerId,
    deadline: f64,
    key: K,
}

/// One-shot timers keyed by caller data, driven by explicit timestamps.
#[derive(Clone, Debug)]
pub struct TimerQueue<K> {
    next_id: u64,
    timers: Vec<Timer<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            next_id: 0,
            timers: Vec::new(),
        }
    }
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `key` once `now >= deadline`.
    pub fn schedule(&mut self, deadline: f64, key: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { id, deadline, key });
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Remove and return every due timer, earliest first.
    pub fn take_due(&mut self, now: f64) -> Vec<K> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.timers.len() {
            if self.timers[i].deadline <= now {
                due.push(self.timers.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.deadline.total_cmp(&b.deadline).then(a.id.cmp(&b.id)));
        due.into_iter().map(|t| t.key).collect()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers
            .iter()
            .map(|t| t.deadline)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

/// Decides whether the view needs another animation frame.
///
/// Frames run while a settle window is open (after structural or resize events), while a
/// redraw was requested, or while glow or physics report activity. Otherwise the view idles.
#[derive(Clone, Debug)]
pub struct FrameScheduler {
    settle_window_ms: f64,
    settle_start: Option<f64>,
    settle_until: f64,
    dirty: bool,
}

impl FrameScheduler {
    pub fn new(settle_window_ms: f64) -> Self {
        Self {
            settle_window_ms: settle_window_ms.max(0.0),
            settle_start: None,
            settle_until: f64::NEG_INFINITY,
            dirty: false,
        }
    }

    /// Start of the latest structural settle window; reveal animations run relative to it.
    pub fn settle_start(&self) -> Option<f64> {
        self.settle_start
    }

    /// A structural event restarts the settle window and the reveal clock.
    pub fn note_structural(&mut self, now: f64) {
        self.settle_start = Some(now);
        self.extend(now);
    }

    /// A resize keeps drawing for a settle window without restarting reveals.
    pub fn note_resize(&mut self, now: f64) {
        self.extend(now);
    }

    /// A scroll only needs one redraw.
    pub fn note_scroll(&mut self) {
        self.dirty = true;
    }

    /// Request a single redraw.
    pub fn request_redraw(&mut self) {
        self.dirty = true;
    }

    /// Return `true` until the settle window opened by the last structural or resize event ends.
    pub fn in_settle_window(&self, now: f64) -> bool {
        now < self.settle_until
    }

    /// Return `true` when a frame should be drawn at `now`.
    pub fn needs_frame(&self, now: f64, glow_active: bool, physics_active: bool) -> bool {
        self.dirty || self.in_settle_window(now) || glow_active || physics_active
    }

    /// Record that a frame was drawn.
    pub fn frame_drawn(&mut self) {
        self.dirty = false;
    }

    /// Forget every pending request.
    pub fn cancel(&mut self) {
        self.dirty = false;
        self.settle_until = f64::NEG_INFINITY;
    }

    fn extend(&mut self, now: f64) {
        self.settle_until = self.settle_until.max(now + self.settle_window_ms);
        self.dirty = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/scheduler.rs"]
mod tests;
