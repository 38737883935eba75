//! Trellis lays out a collapsible todo tree as a column grid and animates the connectors
//! between parents and children.
//!
//! The pipeline runs once per structural event and once per animation frame:
//!
//! - Project the tree into columns and assign grid cells ([`compute_columns`],
//!   [`compute_grid_assignments`])
//! - Freeze a [`StructuralPlan`] that marks each connector shape stable or staggered
//! - Per frame, draw brackets, reveal wipes, traveling glows and liquid fills into a
//!   backend-agnostic [`FramePlan`], and optionally rasterize it with [`CpuBackend`]
//!
//! [`OutlinerView`] ties the pieces together behind an explicit-timestamp, idle-aware frame
//! loop.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod layout;
pub(crate) mod model;
pub(crate) mod physics;
pub(crate) mod render;
pub(crate) mod session;
pub(crate) mod stability;

pub use crate::foundation::core::{BezPath, Point, Rect, Rgba8Premul, SurfaceSize, Vec2};
pub use crate::foundation::error::{TrellisError, TrellisResult};
pub use crate::foundation::hash::Fingerprint;

pub use crate::animation::ease::{Ease, progress};
pub use crate::animation::path::{GlowPath, Polyline, polyline_length};
pub use crate::layout::columns::{ColumnEntry, Columns, MAX_COLUMNS, compute_columns};
pub use crate::layout::geometry::{GeometryLookup, GridGeometry, GridMetrics};
pub use crate::layout::grid::{GridAssignments, GridPosition, compute_grid_assignments};
pub use crate::model::tree::{
    ExpandedSet, OutlineDoc, TodoItem, TreeIndex, find_item, sort_by_order, structure_fingerprint,
};
pub use crate::physics::blob::{BlobParams, ViscousBlob};
pub use crate::physics::fill::{FillChange, FillController, FillOpts};
pub use crate::render::backend::{FrameRGBA, RenderBackend};
pub use crate::render::bracket::{BracketGroup, ChildAnchor, PairSpan, resolve_brackets};
pub use crate::render::connector::{
    ConnectorFrame, ConnectorOpts, ConnectorRenderer, ConnectorStats,
};
pub use crate::render::cpu::{CpuBackend, CpuBackendOpts};
pub use crate::render::glow::{
    GlowPhase, GlowSegment, GlowTiming, Pulse, PulseFrame, SegmentKind, TouchLog, sample_pulse,
};
pub use crate::render::plan::{DrawOp, FramePlan, Layer};
pub use crate::render::reveal::{RevealTiming, wipe_clip};
pub use crate::session::outliner::{FrameOutput, OutlinerOpts, OutlinerView};
pub use crate::session::scheduler::{FrameScheduler, TimerId, TimerQueue};
pub use crate::stability::tracker::{
    PlannedBracket, PlannedSeparator, ShapeKey, Stability, StabilityTracker, StructuralPlan,
};
