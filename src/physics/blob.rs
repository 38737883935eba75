use crate::foundation::core::{BezPath, Point, Rect};

/// Tunables of the liquid surface simulation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlobParams {
    /// Number of surface samples (at least 2 are used).
    pub samples: usize,
    /// Fraction of the remaining fill distance covered per step.
    pub ease_rate: f64,
    /// Spring constant pulling each sample back to rest.
    pub stiffness: f64,
    /// Per-step velocity multiplier.
    pub damping: f64,
    /// Surface tension passes per step.
    pub relax_passes: usize,
    /// How far each pass pulls a sample toward its neighbours' mean.
    pub relax_strength: f64,
    /// Spring constant of the bulge oscillator.
    pub bulge_stiffness: f64,
    /// Per-step velocity multiplier of the bulge oscillator.
    pub bulge_damping: f64,
    /// Velocity kick per unit of fill rise.
    pub rise_impulse: f64,
    /// Velocity kick per unit of fill fall.
    pub drain_impulse: f64,
    /// Hard bound on any sample velocity.
    pub max_velocity: f64,
    /// Surface displacement in pixels per unit of sample height.
    pub surface_amplitude: f64,
    /// Rest tolerance for positions (fill, heights, bulge).
    pub position_epsilon: f64,
    /// Rest tolerance for velocities.
    pub velocity_epsilon: f64,
}

impl Default for BlobParams {
    fn default() -> Self {
        Self {
            samples: 40,
            ease_rate: 0.035,
            stiffness: 0.008,
            damping: 0.94,
            relax_passes: 6,
            relax_strength: 0.5,
            bulge_stiffness: 0.03,
            bulge_damping: 0.9,
            rise_impulse: 0.6,
            drain_impulse: 0.35,
            max_velocity: 0.5,
            surface_amplitude: 6.0,
            position_epsilon: 1e-3,
            velocity_epsilon: 1e-4,
        }
    }
}

/// Where liquid enters on a rise, as a fraction of the sample span.
const INFLOW_AT: f64 = 0.85;
/// Where liquid leaves on a drain.
const OUTFLOW_AT: f64 = 0.15;
/// Width of the impulse bell, as a fraction of the sample count.
const KICK_WIDTH: f64 = 0.12;
/// The secondary nudge trails the main kick by this fraction of the span, at this strength.
const NUDGE_OFFSET: f64 = 0.25;
const NUDGE_STRENGTH: f64 = 0.35;
/// Per-step easing of the bulge centre back to the middle.
const BULGE_RECENTER: f64 = 0.02;

/// Spring-network liquid surface inside a checkbox.
///
/// `fill` eases toward `target_fill`; rises and drains inject velocity into the surface
/// samples, which ring down under spring, damping and neighbour relaxation.
#[derive(Clone, Debug)]
pub struct ViscousBlob {
    params: BlobParams,
    fill: f64,
    target_fill: f64,
    heights: Vec<f64>,
    velocities: Vec<f64>,
    scratch: Vec<f64>,
    bulge: f64,
    bulge_velocity: f64,
    bulge_center: f64,
}

impl ViscousBlob {
    /// A settled, empty blob.
    pub fn new(params: BlobParams) -> Self {
        let n = params.samples.max(2);
        Self {
            params,
            fill: 0.0,
            target_fill: 0.0,
            heights: vec![0.0; n],
            velocities: vec![0.0; n],
            scratch: vec![0.0; n],
            bulge: 0.0,
            bulge_velocity: 0.0,
            bulge_center: 0.5,
        }
    }

    pub fn params(&self) -> &BlobParams {
        &self.params
    }

    /// Current (eased) fill level in `[0, 1]`.
    pub fn fill(&self) -> f64 {
        self.fill
    }

    /// Level the fill is easing toward.
    pub fn target_fill(&self) -> f64 {
        self.target_fill
    }

    /// Surface sample heights; positive is raised.
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    pub fn bulge(&self) -> f64 {
        self.bulge
    }

    /// Bulge centre as a fraction of the width.
    pub fn bulge_center(&self) -> f64 {
        self.bulge_center
    }

    /// Animate toward `level`. Only a rise disturbs the surface.
    pub fn set_target_fill(&mut self, level: f64) {
        let Some(level) = clamp_level(level) else {
            return;
        };
        let delta = level - self.target_fill;
        self.target_fill = level;
        if delta <= 0.0 {
            return;
        }

        let kick = self.params.rise_impulse * delta;
        let n = self.heights.len();
        let span = (n - 1) as f64;
        let main = INFLOW_AT * span;
        let nudge = main - NUDGE_OFFSET * span;
        self.kick(main, kick);
        self.kick(nudge, -kick * NUDGE_STRENGTH);
        self.bulge_velocity += kick;
        self.bulge_center = 0.8;
    }

    /// Animate a fall to `level` with a weaker disturbance near the left edge.
    pub fn drain(&mut self, level: f64) {
        let Some(level) = clamp_level(level) else {
            return;
        };
        let delta = self.target_fill - level;
        self.target_fill = level;
        if delta <= 0.0 {
            return;
        }

        let kick = self.params.drain_impulse * delta;
        let span = (self.heights.len() - 1) as f64;
        self.kick(OUTFLOW_AT * span, -kick);
        self.bulge_velocity -= kick;
        self.bulge_center = 0.2;
    }

    /// Jump to `level` without any surface motion.
    pub fn rush_fill(&mut self, level: f64) {
        let level = clamp_level(level).unwrap_or(self.target_fill);
        self.fill = level;
        self.target_fill = level;
        self.rest();
    }

    /// Empty instantly.
    pub fn flush(&mut self) {
        self.rush_fill(0.0);
    }

    /// Advance one animation frame. Returns `true` while still moving.
    pub fn step(&mut self) -> bool {
        if self.is_settled() {
            self.fill = self.target_fill;
            self.rest();
            return false;
        }
        let p = self.params;

        self.fill += (self.target_fill - self.fill) * p.ease_rate;
        self.fill = self.fill.clamp(0.0, 1.0);

        for (h, v) in self.heights.iter_mut().zip(self.velocities.iter_mut()) {
            *v -= p.stiffness * *h;
            *v *= p.damping;
            *v = v.clamp(-p.max_velocity, p.max_velocity);
            *h += *v;
        }

        let n = self.heights.len();
        for _ in 0..p.relax_passes {
            for i in 0..n {
                let neighbours = match i {
                    0 => self.heights[1],
                    i if i == n - 1 => self.heights[n - 2],
                    i => (self.heights[i - 1] + self.heights[i + 1]) * 0.5,
                };
                let h = self.heights[i];
                self.scratch[i] = h + (neighbours - h) * p.relax_strength;
            }
            std::mem::swap(&mut self.heights, &mut self.scratch);
        }

        self.bulge_velocity -= p.bulge_stiffness * self.bulge;
        self.bulge_velocity *= p.bulge_damping;
        self.bulge += self.bulge_velocity;
        self.bulge_center += (0.5 - self.bulge_center) * BULGE_RECENTER;

        true
    }

    /// Return `true` when fill, bulge and every sample are at rest.
    pub fn is_settled(&self) -> bool {
        let pos = self.params.position_epsilon;
        let vel = self.params.velocity_epsilon;
        (self.fill - self.target_fill).abs() < pos
            && self.bulge.abs() < pos
            && self.bulge_velocity.abs() < vel
            && self.heights.iter().all(|h| h.abs() < pos)
            && self.velocities.iter().all(|v| v.abs() < vel)
    }

    /// Filled liquid shape inside `rect`, or `None` when there is nothing to draw.
    pub fn liquid_path(&self, rect: Rect) -> Option<BezPath> {
        if self.fill <= self.params.position_epsilon || rect.width() <= 0.0 || rect.height() <= 0.0
        {
            return None;
        }
        let amp = self.params.surface_amplitude;
        let level_y = rect.y1 - self.fill * rect.height();
        let n = self.heights.len();
        let span = (n - 1) as f64;

        let mut path = BezPath::new();
        path.move_to(Point::new(rect.x0, rect.y1));
        for (i, h) in self.heights.iter().enumerate() {
            let u = i as f64 / span;
            let swell = self.bulge * bell(u, self.bulge_center, 0.25);
            let y = (level_y - (h + swell) * amp).clamp(rect.y0, rect.y1);
            path.line_to(Point::new(rect.x0 + u * rect.width(), y));
        }
        path.line_to(Point::new(rect.x1, rect.y1));
        path.close_path();
        Some(path)
    }

    fn kick(&mut self, center: f64, amount: f64) {
        let width = (self.heights.len() as f64 * KICK_WIDTH).max(1.0);
        let max = self.params.max_velocity;
        for (i, v) in self.velocities.iter_mut().enumerate() {
            *v = (*v + amount * bell(i as f64, center, width)).clamp(-max, max);
        }
    }

    fn rest(&mut self) {
        self.heights.fill(0.0);
        self.velocities.fill(0.0);
        self.bulge = 0.0;
        self.bulge_velocity = 0.0;
        self.bulge_center = 0.5;
    }
}

fn clamp_level(level: f64) -> Option<f64> {
    level.is_finite().then(|| level.clamp(0.0, 1.0))
}

fn bell(x: f64, center: f64, width: f64) -> f64 {
    let d = (x - center) / width;
    (-0.5 * d * d).exp()
}

#[cfg(test)]
#[path = "../../tests/unit/physics/blob.rs"]
mod tests;
