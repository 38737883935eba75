use crate::foundation::core::{BezPath, Rect, Rgba8Premul, SurfaceSize};

/// Logical layer a draw op belongs to. Backends ignore it; it exists for inspection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Bracket connectors.
    Bracket,
    /// Separators between sibling groups.
    Separator,
    /// Traveling glow pulses.
    Glow,
    /// Parent highlight behind a glowing node.
    Highlight,
    /// Viscous liquid inside a parent checkbox.
    Liquid,
}

/// One backend-agnostic drawing command, in logical coordinates.
#[derive(Clone, Debug)]
pub enum DrawOp {
    /// Stroke a path with mitered (angular) joins.
    StrokePath {
        /// Path to stroke; may hold several subpaths.
        path: BezPath,
        /// Stroke colour.
        color: Rgba8Premul,
        /// Line width in logical pixels.
        width: f64,
        /// Extra opacity in `[0, 1]`.
        opacity: f32,
        /// Logical layer.
        layer: Layer,
    },
    /// Fill a closed path.
    FillPath {
        /// Path to fill.
        path: BezPath,
        /// Fill colour.
        color: Rgba8Premul,
        /// Extra opacity in `[0, 1]`.
        opacity: f32,
        /// Logical layer.
        layer: Layer,
    },
    /// Restrict subsequent ops to `rect` until the matching [`DrawOp::PopClip`].
    PushClip {
        /// Clip rectangle.
        rect: Rect,
    },
    /// End the innermost clip.
    PopClip,
}

impl DrawOp {
    /// Layer of a drawing op; clip ops have none.
    pub fn layer(&self) -> Option<Layer> {
        match self {
            Self::StrokePath { layer, .. } | Self::FillPath { layer, .. } => Some(*layer),
            Self::PushClip { .. } | Self::PopClip => None,
        }
    }

    /// Opacity of a drawing op; clip ops have none.
    pub fn opacity(&self) -> Option<f32> {
        match self {
            Self::StrokePath { opacity, .. } | Self::FillPath { opacity, .. } => Some(*opacity),
            Self::PushClip { .. } | Self::PopClip => None,
        }
    }
}

/// Everything needed to paint one frame: the surface size and an ordered op list.
///
/// The surface is cleared to transparent before the ops run.
#[derive(Clone, Debug)]
pub struct FramePlan {
    /// Surface size for this frame.
    pub size: SurfaceSize,
    /// Ops in paint order.
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    /// Empty plan for a surface.
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    /// Ops on a given layer, in paint order.
    pub fn ops_in(&self, layer: Layer) -> impl Iterator<Item = &DrawOp> + '_ {
        self.ops.iter().filter(move |op| op.layer() == Some(layer))
    }

    /// Return `true` when clip pushes and pops balance.
    pub fn clips_balanced(&self) -> bool {
        let mut depth = 0i64;
        for op in &self.ops {
            match op {
                DrawOp::PushClip { .. } => depth += 1,
                DrawOp::PopClip => {
                    depth -= 1;
                    if depth < 0 {
                        return false;
                    }
                }
                _ => {}
            }
        }
        depth == 0
    }
}
